//! End-to-end tests against an in-process fake bridge.

use std::time::Duration;

use bridgesync_sdk::notification::NotificationReceiver;
use bridgesync_sdk::ws::WsConfig;
use bridgesync_sdk::{
    ConnectionState, NotificationKind, OrderCommand, SyncClient, SyncConfig, Timeframe,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

const WAIT: Duration = Duration::from_secs(5);

struct FakeBridge {
    listener: TcpListener,
}

impl FakeBridge {
    async fn bind() -> (Self, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let url = format!("ws://{}", listener.local_addr().expect("addr"));
        (Self { listener }, url)
    }

    async fn accept(&self) -> Session {
        let (stream, _) = timeout(WAIT, self.listener.accept())
            .await
            .expect("accept timed out")
            .expect("accept");
        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .expect("handshake");
        Session { ws }
    }
}

struct Session {
    ws: WebSocketStream<TcpStream>,
}

impl Session {
    async fn recv(&mut self) -> Value {
        loop {
            let message = timeout(WAIT, self.ws.next())
                .await
                .expect("no frame from client")
                .expect("stream ended")
                .expect("socket error");
            if let Message::Text(text) = message {
                return serde_json::from_str(text.as_str()).expect("client sent json");
            }
        }
    }

    async fn send(&mut self, frame: Value) {
        self.ws
            .send(Message::Text(frame.to_string().into()))
            .await
            .expect("send");
    }

    async fn hang_up(mut self) {
        let _ = self.ws.close(None).await;
    }
}

async fn wait_until<T>(rx: &mut watch::Receiver<T>, mut predicate: impl FnMut(&T) -> bool) {
    timeout(WAIT, rx.wait_for(|value| predicate(value)))
        .await
        .expect("condition not reached")
        .expect("sender alive");
}

fn candles(times: &[i64], close: f64) -> Value {
    times
        .iter()
        .map(|t| {
            json!({
                "time": t, "open": close, "high": close + 1.0, "low": close - 1.0,
                "close": close, "volume": 10
            })
        })
        .collect()
}

async fn connect(
    bridge: &FakeBridge,
    config: SyncConfig,
) -> (SyncClient, Session, NotificationReceiver) {
    let (client, notifications) = SyncClient::start(config).expect("client");
    let (connected, session) = tokio::join!(client.connect(), bridge.accept());
    connected.expect("connect");
    (client, session, notifications)
}

#[tokio::test]
async fn test_connect_resyncs_and_fills_stores() {
    let (bridge, url) = FakeBridge::bind().await;
    let (client, mut session, _notifications) = connect(&bridge, SyncConfig::new(url)).await;
    assert_eq!(client.connection_state(), ConnectionState::Connected);

    let get_rates = session.recv().await;
    assert_eq!(get_rates["action"], "get_rates");
    assert_eq!(get_rates["symbol"], "XAUUSDc");
    assert_eq!(get_rates["timeframe"], "M15");
    assert_eq!(get_rates["count"], 500);

    let get_positions = session.recv().await;
    assert_eq!(get_positions["action"], "get_positions");

    session
        .send(json!({
            "type": "rates",
            "request_id": get_rates["request_id"],
            "data": candles(&[1_700_000_000_000, 1_700_000_900_000], 2350.0)
        }))
        .await;
    session
        .send(json!({
            "type": "positions",
            "request_id": get_positions["request_id"],
            "data": [
                {"ticket": 1, "symbol": "XAUUSDc", "type": "BUY", "volume": 0.1,
                 "price_open": 2340.0, "price_current": 2350.0, "profit": 100.0, "sl": 0.0, "tp": 0.0},
                {"ticket": 2, "symbol": "XAUUSDc", "type": "SELL", "volume": 0.2,
                 "price_open": 2345.0, "price_current": 2350.0, "profit": -25.5}
            ]
        }))
        .await;
    session
        .send(json!({"type": "tick_update", "symbol": "XAUUSDc", "data": {"bid": 2350.1, "ask": 2350.4}}))
        .await;

    let mut market = client.watch_market();
    wait_until(&mut market, |m| m.series.len() == 2 && m.quote.is_some()).await;
    let mut positions = client.watch_positions();
    wait_until(&mut positions, |p| p.len() == 2).await;

    assert!((client.positions().total_pnl() - 74.5).abs() < 1e-9);
    assert_eq!(
        client.market().quote.and_then(|q| q.symbol).as_deref(),
        Some("XAUUSDc")
    );
}

#[tokio::test]
async fn test_order_round_trip() {
    let (bridge, url) = FakeBridge::bind().await;
    let (client, mut session, mut notifications) =
        connect(&bridge, SyncConfig::new(url).with_resync_on_connect(false)).await;

    let command = OrderCommand::buy("XAUUSDc", 0.1).with_stop_loss(2300.0);
    assert!(client.place_order(&command).expect("valid").is_sent());

    let place_order = session.recv().await;
    assert_eq!(place_order["action"], "place_order");
    assert_eq!(place_order["order_type"], "BUY");
    assert_eq!(place_order["sl"], 2300.0);
    assert!(place_order["tp"].is_null());

    session
        .send(json!({
            "type": "order_result",
            "data": {"success": true, "ticket": 77, "volume": 0.1, "price": 2350.4}
        }))
        .await;

    let refresh = session.recv().await;
    assert_eq!(refresh["action"], "get_positions");

    let notification = timeout(WAIT, notifications.recv())
        .await
        .expect("notification timed out")
        .expect("notification");
    assert_eq!(notification.kind, NotificationKind::OrderPlaced);
    assert!(notification.message.contains("77"));

    session
        .send(json!({
            "type": "order_result",
            "data": {"success": false, "error": "Insufficient margin"}
        }))
        .await;

    let notification = timeout(WAIT, notifications.recv())
        .await
        .expect("notification timed out")
        .expect("notification");
    assert_eq!(notification.kind, NotificationKind::OrderRejected);
    assert!(notification.message.contains("Insufficient margin"));
}

#[tokio::test]
async fn test_subscription_change_keeps_series_until_new_rates() {
    let (bridge, url) = FakeBridge::bind().await;
    let (client, mut session, _notifications) = connect(&bridge, SyncConfig::new(url)).await;

    let first = session.recv().await;
    let _ = session.recv().await;
    session
        .send(json!({"type": "rates", "request_id": first["request_id"], "data": candles(&[1, 2, 3], 1.0)}))
        .await;

    let mut market = client.watch_market();
    wait_until(&mut market, |m| m.series.len() == 3).await;

    assert!(client
        .change_subscription("XAUUSDc", Timeframe::H1)
        .expect("valid")
        .is_sent());

    let second = session.recv().await;
    assert_eq!(second["action"], "get_rates");
    assert_eq!(second["timeframe"], "H1");
    assert_eq!(client.market().series.len(), 3);
    assert_eq!(client.market().subscription.timeframe, Timeframe::H1);

    // A late answer to the first request must not overwrite anything.
    session
        .send(json!({"type": "rates", "request_id": first["request_id"], "data": candles(&[9], 9.0)}))
        .await;
    session
        .send(json!({"type": "rates", "request_id": second["request_id"], "data": candles(&[10, 20], 2.0)}))
        .await;

    wait_until(&mut market, |m| m.series.len() == 2).await;
    assert_eq!(client.metrics().frames_stale, 1);
}

#[tokio::test]
async fn test_reconnect_resyncs() {
    let (bridge, url) = FakeBridge::bind().await;
    let config = SyncConfig::default().with_ws(
        WsConfig::new(url)
            .with_reconnect_delay(Duration::from_millis(50))
            .with_reconnect_jitter(0.0),
    );
    let (client, mut session, _notifications) = connect(&bridge, config).await;

    assert_eq!(session.recv().await["action"], "get_rates");
    assert_eq!(session.recv().await["action"], "get_positions");

    let mut state = client.watch_state();
    session.hang_up().await;

    let mut session = bridge.accept().await;
    assert_eq!(session.recv().await["action"], "get_rates");
    assert_eq!(session.recv().await["action"], "get_positions");

    wait_until(&mut state, ConnectionState::is_connected).await;
    assert_eq!(client.metrics().reconnects, 1);
}

#[tokio::test]
async fn test_lost_socket_without_reconnect_stays_disconnected() {
    let (bridge, url) = FakeBridge::bind().await;
    let config = SyncConfig::default().with_ws(WsConfig::new(url).with_auto_reconnect(false));
    let (client, mut session, _notifications) = connect(&bridge, config).await;

    assert_eq!(session.recv().await["action"], "get_rates");
    assert_eq!(session.recv().await["action"], "get_positions");

    let mut state = client.watch_state();
    session.hang_up().await;
    wait_until(&mut state, |s| *s == ConnectionState::Disconnected).await;

    assert!(timeout(Duration::from_millis(300), bridge.listener.accept())
        .await
        .is_err());
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    assert!(!client.refresh_positions().is_sent());
    assert_eq!(client.metrics().reconnects, 0);

    let (connected, mut session) = tokio::join!(client.connect(), bridge.accept());
    connected.expect("manual connect");
    assert_eq!(client.connection_state(), ConnectionState::Connected);
    assert_eq!(session.recv().await["action"], "get_rates");
    assert_eq!(session.recv().await["action"], "get_positions");
}

#[tokio::test]
async fn test_close_stops_reconnecting() {
    let (bridge, url) = FakeBridge::bind().await;
    let (client, session, _notifications) = connect(
        &bridge,
        SyncConfig::new(url).with_resync_on_connect(false),
    )
    .await;

    client.close();
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    session.hang_up().await;

    assert!(!client.refresh_positions().is_sent());
    assert!(timeout(Duration::from_millis(300), bridge.listener.accept())
        .await
        .is_err());
}
