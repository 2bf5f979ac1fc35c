//! Listener fan-out
//!
//! Each listener set is a copy-on-write list behind an [`ArcSwap`]. Dispatch
//! walks a snapshot taken when the pass starts, so callbacks may add or remove
//! listeners (themselves included) without affecting the pass in progress.

use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::domain::{CloseEvent, NormalizedMessage};

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

pub struct ListenerSet<E: ?Sized> {
    entries: ArcSwap<Vec<(u64, Callback<E>)>>,
    next_id: AtomicU64,
}

impl<E: ?Sized + 'static> ListenerSet<E> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: ArcSwap::from_pointee(Vec::new()),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn add<F>(self: &Arc<Self>, callback: F) -> ListenerHandle
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let callback: Callback<E> = Arc::new(callback);
        self.entries.rcu(|current| {
            let mut next = current.to_vec();
            next.push((id, Arc::clone(&callback)));
            next
        });

        let set: Weak<dyn RemoveListener> = Arc::downgrade(self) as Weak<dyn RemoveListener>;
        ListenerHandle {
            set,
            id,
            removed: AtomicBool::new(false),
        }
    }

    /// Invoke every listener registered when the call starts, exactly once
    pub fn dispatch(&self, event: &E) {
        let snapshot = self.entries.load_full();
        for (_, callback) in snapshot.iter() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

trait RemoveListener: Send + Sync {
    fn remove_listener(&self, id: u64);
}

impl<E: ?Sized + 'static> RemoveListener for ListenerSet<E> {
    fn remove_listener(&self, id: u64) {
        self.entries.rcu(|current| {
            current
                .iter()
                .filter(|(entry_id, _)| *entry_id != id)
                .cloned()
                .collect::<Vec<_>>()
        });
    }
}

/// De-registration handle for one listener.
///
/// `remove()` is idempotent. Dropping the handle leaves the listener
/// registered.
pub struct ListenerHandle {
    set: Weak<dyn RemoveListener>,
    id: u64,
    removed: AtomicBool,
}

impl ListenerHandle {
    pub fn remove(&self) {
        if self.removed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(set) = self.set.upgrade() {
            set.remove_listener(self.id);
        }
    }

    pub fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("id", &self.id)
            .field("removed", &self.is_removed())
            .finish()
    }
}

/// Message, open, close and error listeners for one controller
pub struct ListenerHub {
    messages: Arc<ListenerSet<NormalizedMessage>>,
    opens: Arc<ListenerSet<()>>,
    closes: Arc<ListenerSet<CloseEvent>>,
    errors: Arc<ListenerSet<str>>,
}

impl Default for ListenerHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerHub {
    pub fn new() -> Self {
        Self {
            messages: ListenerSet::new(),
            opens: ListenerSet::new(),
            closes: ListenerSet::new(),
            errors: ListenerSet::new(),
        }
    }

    pub fn add_message_listener<F>(&self, listener: F) -> ListenerHandle
    where
        F: Fn(&NormalizedMessage) + Send + Sync + 'static,
    {
        self.messages.add(listener)
    }

    pub fn add_open_listener<F>(&self, listener: F) -> ListenerHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.opens.add(move |_: &()| listener())
    }

    pub fn add_close_listener<F>(&self, listener: F) -> ListenerHandle
    where
        F: Fn(&CloseEvent) + Send + Sync + 'static,
    {
        self.closes.add(listener)
    }

    pub fn add_error_listener<F>(&self, listener: F) -> ListenerHandle
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.errors.add(listener)
    }

    pub fn dispatch_message(&self, message: &NormalizedMessage) {
        self.messages.dispatch(message);
    }

    pub fn dispatch_open(&self) {
        self.opens.dispatch(&());
    }

    pub fn dispatch_close(&self, event: &CloseEvent) {
        self.closes.dispatch(event);
    }

    pub fn dispatch_error(&self, error: &str) {
        self.errors.dispatch(error);
    }

    pub fn message_listener_count(&self) -> usize {
        self.messages.len()
    }

    pub fn open_listener_count(&self) -> usize {
        self.opens.len()
    }

    pub fn close_listener_count(&self) -> usize {
        self.closes.len()
    }
}
