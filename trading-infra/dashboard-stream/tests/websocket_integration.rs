//! WebSocket integration tests
//!
//! Runs the client against a real tokio-tungstenite server on a local port.

use dashboard_stream::domain::PriceHistory;
use dashboard_stream::{
    Channel, ConnectionState, StreamClient, StreamConfig, SubscriptionHandler,
    SubscriptionRequest,
};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Default)]
struct HistoryRecorder {
    times: Mutex<Vec<i64>>,
}

impl SubscriptionHandler for HistoryRecorder {
    fn on_price_history(&self, history: &PriceHistory) {
        self.times
            .lock()
            .extend(history.candles.iter().map(|c| c.time));
    }
}

fn history_frame() -> String {
    json!({
        "type": "price.historical",
        "channel": "prices",
        "data": {
            "starlisting_id": 6,
            "coin": "BTC",
            "interval": "1m",
            "count": 3,
            "candles": [
                {"time": "2024-01-01T00:01:00Z", "open": 2.0, "high": 2.0, "low": 2.0, "close": 2.0},
                {"time": "2024-01-01T00:00:00Z", "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0},
                {"time": "2024-01-01T00:02:00Z", "open": 3.0, "high": 3.0, "low": 3.0, "close": 3.0}
            ]
        }
    })
    .to_string()
}

// ============================================================================
// WebSocket Connection Tests
// ============================================================================

#[tokio::test]
async fn test_subscribe_receive_and_shutdown_over_websocket() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        let first = ws.next().await.unwrap().unwrap();
        let directive: Value = serde_json::from_str(first.to_text().unwrap()).unwrap();

        ws.send(Message::Text(history_frame().into())).await.unwrap();

        let mut saw_close = false;
        while let Some(Ok(msg)) = ws.next().await {
            if msg.is_close() {
                saw_close = true;
                break;
            }
        }
        (directive, saw_close)
    });

    let config = StreamConfig {
        url: format!("ws://{addr}/ws"),
        ..Default::default()
    };
    let client = StreamClient::websocket(config);
    let recorder = Arc::new(HistoryRecorder::default());
    let _sub = client.subscribe(
        SubscriptionRequest::new([Channel::PriceCandles])
            .with_instruments([6u64])
            .with_history(500),
        Arc::clone(&recorder),
    );

    tokio::time::timeout(Duration::from_secs(5), async {
        while recorder.times.lock().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("history delivered");
    assert_eq!(
        *recorder.times.lock(),
        vec![1_704_067_200, 1_704_067_260, 1_704_067_320]
    );

    client.shutdown();
    let mut state = client.controller().watch_state();
    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == ConnectionState::ClosedIntentional),
    )
    .await
    .expect("closed")
    .unwrap();

    let (directive, saw_close) = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server finished")
        .unwrap();
    assert!(saw_close);
    assert_eq!(
        directive,
        json!({
            "action": "subscribe",
            "channels": ["prices"],
            "history": 500,
            "starlisting_ids": [6]
        })
    );
}

#[tokio::test]
async fn test_refused_connection_schedules_reconnect() {
    // Bind then drop to get a port with nothing listening
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let config = StreamConfig {
        url: format!("ws://{addr}/ws"),
        reconnect_interval_ms: 60_000,
        ..Default::default()
    };
    let client = StreamClient::websocket(config);
    let errors = Arc::new(Mutex::new(Vec::new()));
    let _errors = {
        let errors = Arc::clone(&errors);
        client
            .controller()
            .hub()
            .add_error_listener(move |e| errors.lock().push(e.to_string()))
    };

    client.controller().connect();
    let mut state = client.controller().watch_state();
    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == ConnectionState::ClosedUnintentional),
    )
    .await
    .expect("open attempt failed")
    .unwrap();

    assert!(client.controller().reconnect_pending());
    assert_eq!(errors.lock().len(), 1);
    client.shutdown();
    assert!(!client.controller().reconnect_pending());
}
