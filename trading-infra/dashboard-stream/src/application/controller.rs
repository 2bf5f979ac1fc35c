//! Connection controller
//!
//! Owns the single transport link and the merged channel registry. The state
//! machine:
//!
//! ```text
//!  Idle ──connect──▶ Connecting ──open ok──▶ Open ──disconnect──▶ Closing
//!                        │                    │                      │
//!                   open failed          server close            close ack
//!                        ▼                    ▼                      ▼
//!               ClosedUnintentional ◀─────────┘             ClosedIntentional
//!                        │
//!              reconnect timer (one token)
//!                        ▼
//!                    Connecting
//! ```
//!
//! All shared state sits behind one mutex. Listener callbacks always run with
//! the mutex released, so a callback may call back into the controller.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::listeners::ListenerHub;
use crate::config::StreamConfig;
use crate::domain::{
    Channel, ChannelRegistry, CloseEvent, ConnectionState, Directive, FilterDelta, OutboundFrame,
    Transport, TransportEvent, TransportLink,
};
use crate::error::StreamError;
use crate::infrastructure::MessageClassifier;

struct PendingReconnect {
    token: u64,
    task: AbortHandle,
}

struct Inner {
    state: ConnectionState,
    registry: ChannelRegistry,
    link: Option<mpsc::UnboundedSender<OutboundFrame>>,
    /// Incremented by every `connect()`; events from older sessions are ignored
    session: u64,
    reconnect: Option<PendingReconnect>,
    next_token: u64,
    intentional: bool,
}

pub struct ConnectionController {
    config: StreamConfig,
    transport: Arc<dyn Transport>,
    classifier: MessageClassifier,
    hub: ListenerHub,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<ConnectionState>,
}

impl ConnectionController {
    pub fn new(config: StreamConfig, transport: Arc<dyn Transport>) -> Arc<Self> {
        let (state_tx, _) = watch::channel(ConnectionState::Idle);
        Arc::new(Self {
            config,
            transport,
            classifier: MessageClassifier::new(),
            hub: ListenerHub::new(),
            inner: Mutex::new(Inner {
                state: ConnectionState::Idle,
                registry: ChannelRegistry::new(),
                link: None,
                session: 0,
                reconnect: None,
                next_token: 0,
                intentional: false,
            }),
            state_tx,
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn hub(&self) -> &ListenerHub {
        &self.hub
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_open()
    }

    /// True while a reconnect timer is outstanding
    pub fn reconnect_pending(&self) -> bool {
        self.inner.lock().reconnect.is_some()
    }

    /// Connection status feed for status indicators
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Copy of the merged filter state
    pub fn registry(&self) -> ChannelRegistry {
        self.inner.lock().registry.clone()
    }

    /// Start connecting unless already open or connecting. Returns at once;
    /// the outcome arrives through the open / close / error listeners.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(self: &Arc<Self>) {
        let session = {
            let mut inner = self.inner.lock();
            if inner.state.is_active() {
                return;
            }
            inner.intentional = false;
            cancel_reconnect(&mut inner);
            inner.link = None;
            inner.session += 1;
            self.set_state(&mut inner, ConnectionState::Connecting);
            inner.session
        };

        debug!(session, url = %self.config.url, "Connecting stream");
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run_session(session).await });
    }

    /// Close the connection and suppress reconnection until the next `connect()`
    pub fn disconnect(&self) {
        let event = {
            let mut inner = self.inner.lock();
            inner.intentional = true;
            cancel_reconnect(&mut inner);

            match inner.link.take() {
                Some(link) => {
                    let _ = link.send(OutboundFrame::Close);
                    self.set_state(&mut inner, ConnectionState::Closing);
                    None
                }
                None => {
                    let was_connecting = inner.state == ConnectionState::Connecting;
                    self.set_state(&mut inner, ConnectionState::ClosedIntentional);
                    was_connecting.then_some(CloseEvent {
                        intentional: true,
                        reason: None,
                    })
                }
            }
        };

        info!("Stream disconnect requested");
        if let Some(event) = event {
            self.hub.dispatch_close(&event);
        }
    }

    /// Merge `delta` into every channel in `channels`. The merged state is sent
    /// right away when open and replayed on the next open otherwise.
    pub fn subscribe(&self, channels: &[Channel], delta: &FilterDelta) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        for channel in channels {
            inner.registry.merge(*channel, delta);
        }

        if !inner.state.is_open() {
            return;
        }
        if let Some(link) = &inner.link {
            for directive in inner.registry.directives_for(channels) {
                send_or_log(link, &directive);
            }
        }
    }

    /// Drop the channels' merged state and tell the server when open
    pub fn unsubscribe(&self, channels: &[Channel]) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let removed: Vec<Channel> = channels
            .iter()
            .copied()
            .filter(|channel| inner.registry.remove(*channel).is_some())
            .collect();

        // A carrier still feeding a remaining channel stays subscribed
        let remaining = inner.registry.channels();
        let removed: Vec<Channel> = removed
            .into_iter()
            .filter(|channel| !remaining.iter().any(|r| r.carrier() == channel.carrier()))
            .collect();

        if removed.is_empty() || !inner.state.is_open() {
            return;
        }
        if let Some(link) = &inner.link {
            send_or_log(link, &Directive::unsubscribe(removed));
        }
    }

    async fn run_session(self: Arc<Self>, session: u64) {
        let link = match self.transport.open().await {
            Ok(link) => link,
            Err(e) => {
                warn!(session, error = %e, "Failed to open stream connection");
                self.hub.dispatch_error(&e.to_string());
                self.handle_close(session, Some(e.to_string()));
                return;
            }
        };
        let TransportLink {
            outbound,
            mut inbound,
        } = link;

        {
            let mut inner = self.inner.lock();
            if inner.session != session || inner.state != ConnectionState::Connecting {
                // Superseded or disconnected while dialing
                let _ = outbound.send(OutboundFrame::Close);
                return;
            }

            let replay = inner.registry.replay_directives();
            for directive in &replay {
                send_or_log(&outbound, directive);
            }
            inner.link = Some(outbound);
            self.set_state(&mut inner, ConnectionState::Open);
            info!(session, replayed = replay.len(), "Stream connection open");
        }
        self.hub.dispatch_open();

        while let Some(event) = inbound.recv().await {
            match event {
                TransportEvent::Frame(text) => self.dispatch_frame(session, &text),
                TransportEvent::Error(error) => {
                    if self.is_current(session) {
                        warn!(session, error = %error, "Stream transport error");
                        self.hub.dispatch_error(&error);
                    }
                }
                TransportEvent::Closed(reason) => self.handle_close(session, reason),
            }
        }

        self.handle_close(session, None);
    }

    fn dispatch_frame(&self, session: u64, frame: &str) {
        if !self.is_current(session) {
            return;
        }
        match self.classifier.classify(frame) {
            Ok(Some(message)) => self.hub.dispatch_message(&message),
            Ok(None) => {}
            Err(e) => {
                warn!(session, error = %e, "Dropping malformed frame");
            }
        }
    }

    /// Record a close for `session`. Repeated closes are harmless: listeners
    /// hear about the first one and the reconnect timer is only armed once.
    fn handle_close(self: &Arc<Self>, session: u64, reason: Option<String>) {
        let event = {
            let mut inner = self.inner.lock();
            if inner.session != session {
                return;
            }

            let first = !inner.state.is_closed();
            if first {
                inner.link = None;
                let next = if inner.intentional {
                    ConnectionState::ClosedIntentional
                } else {
                    ConnectionState::ClosedUnintentional
                };
                self.set_state(&mut inner, next);
            }

            if !inner.intentional && self.config.reconnect {
                self.schedule_reconnect(&mut inner);
            }

            first.then(|| CloseEvent {
                intentional: inner.intentional,
                reason,
            })
        };

        if let Some(event) = event {
            info!(
                session,
                intentional = event.intentional,
                reason = ?event.reason,
                "Stream connection closed"
            );
            self.hub.dispatch_close(&event);
        }
    }

    fn schedule_reconnect(self: &Arc<Self>, inner: &mut Inner) {
        if inner.reconnect.is_some() {
            return;
        }

        inner.next_token += 1;
        let token = inner.next_token;
        let delay = self.config.reconnect_interval();
        let controller = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(controller) = controller.upgrade() {
                controller.fire_reconnect(token);
            }
        });

        inner.reconnect = Some(PendingReconnect {
            token,
            task: task.abort_handle(),
        });
        debug!(token, delay_ms = delay.as_millis() as u64, "Reconnect scheduled");
    }

    fn fire_reconnect(self: &Arc<Self>, token: u64) {
        {
            let mut inner = self.inner.lock();
            match &inner.reconnect {
                Some(pending) if pending.token == token => inner.reconnect = None,
                _ => return,
            }
            if inner.intentional {
                return;
            }
        }
        info!(token, "Reconnecting stream");
        self.connect();
    }

    fn is_current(&self, session: u64) -> bool {
        self.inner.lock().session == session
    }

    fn set_state(&self, inner: &mut Inner, state: ConnectionState) {
        inner.state = state;
        self.state_tx.send_replace(state);
    }
}

impl Drop for ConnectionController {
    fn drop(&mut self) {
        cancel_reconnect(self.inner.get_mut());
    }
}

fn cancel_reconnect(inner: &mut Inner) {
    if let Some(pending) = inner.reconnect.take() {
        pending.task.abort();
    }
}

fn send_directive(
    link: &mpsc::UnboundedSender<OutboundFrame>,
    directive: &Directive,
) -> Result<(), StreamError> {
    let json = directive.to_json()?;
    link.send(OutboundFrame::Text(json)).map_err(|_| StreamError::ChannelClosed)
}

/// Send and log; a lost directive is replayed on the next open
fn send_or_log(link: &mpsc::UnboundedSender<OutboundFrame>, directive: &Directive) {
    match send_directive(link, directive) {
        Ok(()) => {}
        Err(StreamError::ChannelClosed) => {
            debug!(channels = ?directive.channels(), "Link closed, directive dropped");
        }
        Err(e) => warn!(error = %e, "Failed to send directive"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{LoopbackServer, LoopbackSession, loopback_pair};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn controller() -> (Arc<ConnectionController>, LoopbackServer) {
        let (transport, server) = loopback_pair();
        (
            ConnectionController::new(StreamConfig::default(), Arc::new(transport)),
            server,
        )
    }

    async fn open(
        controller: &Arc<ConnectionController>,
        server: &mut LoopbackServer,
    ) -> LoopbackSession {
        controller.connect();
        let session = server.accept().await.unwrap();
        wait_for(controller, ConnectionState::Open).await;
        session
    }

    async fn wait_for(controller: &ConnectionController, state: ConnectionState) {
        let mut rx = controller.watch_state();
        tokio::time::timeout(Duration::from_secs(30), rx.wait_for(|s| *s == state))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_is_noop_when_active() {
        let (controller, mut server) = controller();
        let _session = open(&controller, &mut server).await;

        controller.connect();
        controller.connect();
        tokio::task::yield_now().await;
        assert_eq!(server.open_count(), 1);
        assert!(controller.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_before_open_is_replayed() {
        let (controller, mut server) = controller();
        controller.subscribe(
            &[Channel::PriceCandles],
            &FilterDelta::new().with_instruments([6u64]).with_history(500),
        );

        let mut session = open(&controller, &mut server).await;
        let directives = session.drain_directives();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].channels(), &[Channel::PriceCandles]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_close_arms_one_timer() {
        let (controller, mut server) = controller();
        let session = open(&controller, &mut server).await;

        session.push_close(Some("server restart")).await;
        session.push_close(None).await;
        wait_for(&controller, ConnectionState::ClosedUnintentional).await;
        tokio::task::yield_now().await;

        assert!(controller.reconnect_pending());
        assert_eq!(controller.inner.lock().next_token, 1);

        tokio::time::sleep(Duration::from_millis(3100)).await;
        let _reopened = server.accept().await.unwrap();
        assert_eq!(server.open_count(), 2);
        assert!(server.try_accept().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_suppresses_reconnect() {
        let (controller, mut server) = controller();
        let mut session = open(&controller, &mut server).await;

        controller.disconnect();
        assert_eq!(controller.state(), ConnectionState::Closing);
        assert_eq!(session.next_frame().await, Some(OutboundFrame::Close));

        session.push_close(None).await;
        wait_for(&controller, ConnectionState::ClosedIntentional).await;

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!controller.reconnect_pending());
        assert_eq!(server.open_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_cancels_pending_timer() {
        let (controller, mut server) = controller();
        let session = open(&controller, &mut server).await;

        session.push_close(None).await;
        wait_for(&controller, ConnectionState::ClosedUnintentional).await;
        assert!(controller.reconnect_pending());

        controller.disconnect();
        assert!(!controller.reconnect_pending());
        assert_eq!(controller.state(), ConnectionState::ClosedIntentional);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(server.open_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_open_retries() {
        let (controller, mut server) = controller();
        let errors = Arc::new(AtomicUsize::new(0));
        let _errors = {
            let errors = Arc::clone(&errors);
            controller.hub().add_error_listener(move |_| {
                errors.fetch_add(1, Ordering::SeqCst);
            })
        };

        server.refuse_next(2);
        controller.connect();
        let _session = server.accept().await.unwrap();
        wait_for(&controller, ConnectionState::Open).await;

        assert_eq!(server.open_count(), 3);
        assert_eq!(errors.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_disabled() {
        let (transport, mut server) = loopback_pair();
        let controller = ConnectionController::new(
            StreamConfig::default().with_reconnect(false),
            Arc::new(transport),
        );
        let session = open(&controller, &mut server).await;

        session.push_close(None).await;
        wait_for(&controller, ConnectionState::ClosedUnintentional).await;
        assert!(!controller.reconnect_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_does_not_reconnect() {
        let (controller, mut server) = controller();
        let session = open(&controller, &mut server).await;

        session.push_error("read timeout").await;
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(controller.is_connected());
        assert!(!controller.reconnect_pending());
        assert_eq!(server.open_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_sends_only_registered_channels() {
        let (controller, mut server) = controller();
        controller.subscribe(&[Channel::TradeEvents], &FilterDelta::new());
        let mut session = open(&controller, &mut server).await;
        session.drain_directives();

        controller.unsubscribe(&[Channel::TradeEvents, Channel::Signals]);
        assert_eq!(
            session.next_directive().await,
            Some(Directive::unsubscribe(vec![Channel::TradeEvents]))
        );
        assert!(controller.registry().is_empty());

        controller.unsubscribe(&[Channel::TradeEvents]);
        assert!(session.drain_directives().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_prices_stays_subscribed_while_funding_remains() {
        let (controller, mut server) = controller();
        controller.subscribe(&[Channel::PriceCandles], &FilterDelta::new());
        controller.subscribe(&[Channel::FundingRates], &FilterDelta::new());
        let mut session = open(&controller, &mut server).await;
        session.drain_directives();

        controller.unsubscribe(&[Channel::PriceCandles]);
        assert!(session.drain_directives().is_empty());

        controller.unsubscribe(&[Channel::FundingRates]);
        assert_eq!(
            session.next_directive().await,
            Some(Directive::unsubscribe(vec![Channel::PriceCandles]))
        );
    }

    #[test]
    fn test_send_directive_reports_closed_link() {
        let (tx, rx) = mpsc::unbounded_channel();
        let directive = Directive::unsubscribe(vec![Channel::Signals]);

        assert!(send_directive(&tx, &directive).is_ok());
        drop(rx);
        assert!(matches!(
            send_directive(&tx, &directive),
            Err(StreamError::ChannelClosed)
        ));
    }
}
