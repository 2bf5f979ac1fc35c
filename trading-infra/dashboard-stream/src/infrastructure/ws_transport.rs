use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, trace};

use crate::domain::{OutboundFrame, Transport, TransportEvent, TransportLink};
use crate::error::StreamError;

/// WebSocket adapter for the [`Transport`] port.
///
/// Each `open()` dials a fresh socket and spawns one writer and one reader
/// task. The link ends when either side closes.
pub struct WsTransport {
    url: String,
    connect_timeout: Duration,
    inbound_buffer: usize,
}

impl WsTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(10),
            inbound_buffer: 1024,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_inbound_buffer(mut self, capacity: usize) -> Self {
        self.inbound_buffer = capacity.max(1);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn open(&self) -> Result<TransportLink, StreamError> {
        let (ws_stream, _) = tokio::time::timeout(self.connect_timeout, connect_async(&self.url))
            .await
            .map_err(|_| StreamError::Timeout)??;
        let (mut write, mut read) = ws_stream.split();

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<OutboundFrame>();
        let (event_tx, event_rx) = mpsc::channel::<TransportEvent>(self.inbound_buffer);

        // Writer: drains queued frames until Close or the controller drops the link
        let writer_events = event_tx.clone();
        tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                match frame {
                    OutboundFrame::Text(json) => {
                        if let Err(e) = write.send(Message::Text(json.into())).await {
                            let _ = writer_events.send(TransportEvent::Error(e.to_string())).await;
                            break;
                        }
                    }
                    OutboundFrame::Close => {
                        if let Err(e) = write.send(Message::Close(None)).await {
                            debug!(error = %e, "Close frame not sent");
                        }
                        break;
                    }
                }
            }
            let _ = write.close().await;
        });

        tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if event_tx
                            .send(TransportEvent::Frame(text.to_string()))
                            .await
                            .is_err()
                        {
                            return;
                        }
                    }
                    Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                        Ok(text) => {
                            if event_tx.send(TransportEvent::Frame(text)).await.is_err() {
                                return;
                            }
                        }
                        Err(_) => {
                            let _ = event_tx
                                .send(TransportEvent::Error("non-UTF-8 binary frame".into()))
                                .await;
                        }
                    },
                    Ok(Message::Close(frame)) => {
                        let reason = frame
                            .map(|f| f.reason.to_string())
                            .filter(|r| !r.is_empty());
                        let _ = event_tx.send(TransportEvent::Closed(reason)).await;
                        return;
                    }
                    Ok(Message::Ping(data)) => {
                        trace!("Received ping: {:?}", data);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        let _ = event_tx.send(TransportEvent::Error(e.to_string())).await;
                        let _ = event_tx.send(TransportEvent::Closed(Some(e.to_string()))).await;
                        return;
                    }
                }
            }
            let _ = event_tx.send(TransportEvent::Closed(None)).await;
        });

        Ok(TransportLink {
            outbound: out_tx,
            inbound: event_rx,
        })
    }
}
