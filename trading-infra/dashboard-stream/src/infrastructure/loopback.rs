//! In-process transport pair for tests and demos
//!
//! [`LoopbackTransport`] hands each opened link to the matching
//! [`LoopbackServer`], which plays the server side of the socket.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

use crate::domain::{Directive, OutboundFrame, Transport, TransportEvent, TransportLink};
use crate::error::StreamError;

const INBOUND_BUFFER: usize = 256;

struct Shared {
    opens: AtomicUsize,
    refusals: AtomicUsize,
}

/// Create a connected transport / server pair
pub fn loopback_pair() -> (LoopbackTransport, LoopbackServer) {
    let (session_tx, session_rx) = mpsc::unbounded_channel();
    let shared = Arc::new(Shared {
        opens: AtomicUsize::new(0),
        refusals: AtomicUsize::new(0),
    });

    (
        LoopbackTransport {
            sessions: session_tx,
            shared: Arc::clone(&shared),
        },
        LoopbackServer {
            sessions: session_rx,
            shared,
        },
    )
}

pub struct LoopbackTransport {
    sessions: mpsc::UnboundedSender<LoopbackSession>,
    shared: Arc<Shared>,
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn open(&self) -> Result<TransportLink, StreamError> {
        self.shared.opens.fetch_add(1, Ordering::SeqCst);

        let refused = self
            .shared
            .refusals
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(StreamError::Connection("loopback refused connection".into()));
        }

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(INBOUND_BUFFER);

        self.sessions
            .send(LoopbackSession {
                from_client: out_rx,
                to_client: event_tx,
            })
            .map_err(|_| StreamError::Connection("loopback server dropped".into()))?;

        Ok(TransportLink {
            outbound: out_tx,
            inbound: event_rx,
        })
    }
}

/// Server side of the loopback pair
pub struct LoopbackServer {
    sessions: mpsc::UnboundedReceiver<LoopbackSession>,
    shared: Arc<Shared>,
}

impl LoopbackServer {
    /// Wait for the client's next successful `open()`
    pub async fn accept(&mut self) -> Option<LoopbackSession> {
        self.sessions.recv().await
    }

    pub fn try_accept(&mut self) -> Option<LoopbackSession> {
        self.sessions.try_recv().ok()
    }

    /// Make the next `n` open attempts fail
    pub fn refuse_next(&self, n: usize) {
        self.shared.refusals.store(n, Ordering::SeqCst);
    }

    /// Open attempts so far, refused ones included
    pub fn open_count(&self) -> usize {
        self.shared.opens.load(Ordering::SeqCst)
    }
}

/// One accepted connection, seen from the server
pub struct LoopbackSession {
    from_client: mpsc::UnboundedReceiver<OutboundFrame>,
    to_client: mpsc::Sender<TransportEvent>,
}

impl LoopbackSession {
    /// Send a text frame to the client. False once the client is gone.
    pub async fn push_frame(&self, text: impl Into<String>) -> bool {
        self.to_client
            .send(TransportEvent::Frame(text.into()))
            .await
            .is_ok()
    }

    pub async fn push_error(&self, error: impl Into<String>) -> bool {
        self.to_client
            .send(TransportEvent::Error(error.into()))
            .await
            .is_ok()
    }

    pub async fn push_close(&self, reason: Option<&str>) -> bool {
        self.to_client
            .send(TransportEvent::Closed(reason.map(str::to_string)))
            .await
            .is_ok()
    }

    /// Next frame the client wrote, or `None` once the client dropped the link
    pub async fn next_frame(&mut self) -> Option<OutboundFrame> {
        self.from_client.recv().await
    }

    /// Next directive the client sent. `None` on a close frame, a dropped
    /// link, or a text frame that is not a directive.
    pub async fn next_directive(&mut self) -> Option<Directive> {
        match self.from_client.recv().await? {
            OutboundFrame::Text(json) => serde_json::from_str(&json).ok(),
            OutboundFrame::Close => None,
        }
    }

    /// Directives already queued, without waiting
    pub fn drain_directives(&mut self) -> Vec<Directive> {
        let mut directives = Vec::new();
        while let Ok(frame) = self.from_client.try_recv() {
            if let OutboundFrame::Text(json) = frame {
                if let Ok(directive) = serde_json::from_str(&json) {
                    directives.push(directive);
                }
            }
        }
        directives
    }
}
