// Common test utilities and helper functions
//
// A scripted in-memory receiver standing in for the managed Cast client,
// plus recording discovery and error-reporting collaborators.

#![allow(dead_code)]

use castsession::{
    CastConfig, CastContext, Collaborators, ConnectionError, ErrorReporter, GameManagerClient,
    GameManagerResult, GameManagerState, GameMessage, PlayerInfo, PlayerState, ReceiverConnector,
    ReceiverDevice, ReceiverDiscovery, RouteSelector, SendError, TransportLossSignal,
};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum ConnectBehavior {
    Accept,
    Fail(ConnectionError),
    /// Never completes; exercises the connect timeout
    Hang,
}

#[derive(Debug, Clone)]
pub enum JoinBehavior {
    /// Accept and seat a controllable player
    Accept,
    /// Accept without seating anyone
    AcceptEmpty,
    Reject(String),
    /// Never answers; exercises the join timeout
    Hang,
}

/// Shared state of the fake receiver.
pub struct MockReceiver {
    pub connect: Mutex<ConnectBehavior>,
    pub connect_delay: Mutex<Duration>,
    pub send_delay: Mutex<Duration>,
    pub join: Mutex<JoinBehavior>,
    pub players: Mutex<Vec<PlayerInfo>>,
    pub sent: Mutex<Vec<Value>>,
    pub failing_payloads: Mutex<Vec<Value>>,
    pub disconnects: Mutex<Vec<bool>>,
    pub join_requests: AtomicUsize,
    pub connects: AtomicUsize,
    pub loss_signal: Mutex<Option<TransportLossSignal>>,
}

impl MockReceiver {
    pub fn new() -> Arc<Self> {
        Arc::new(MockReceiver {
            connect: Mutex::new(ConnectBehavior::Accept),
            connect_delay: Mutex::new(Duration::ZERO),
            send_delay: Mutex::new(Duration::ZERO),
            join: Mutex::new(JoinBehavior::Accept),
            players: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            failing_payloads: Mutex::new(Vec::new()),
            disconnects: Mutex::new(Vec::new()),
            join_requests: AtomicUsize::new(0),
            connects: AtomicUsize::new(0),
            loss_signal: Mutex::new(None),
        })
    }

    pub fn set_connect(&self, behavior: ConnectBehavior) {
        *self.connect.lock().unwrap() = behavior;
    }

    pub fn set_connect_delay(&self, delay: Duration) {
        *self.connect_delay.lock().unwrap() = delay;
    }

    pub fn set_send_delay(&self, delay: Duration) {
        *self.send_delay.lock().unwrap() = delay;
    }

    pub fn set_join(&self, behavior: JoinBehavior) {
        *self.join.lock().unwrap() = behavior;
    }

    pub fn fail_payload(&self, payload: Value) {
        self.failing_payloads.lock().unwrap().push(payload);
    }

    pub fn sent(&self) -> Vec<Value> {
        self.sent.lock().unwrap().clone()
    }

    pub fn disconnects(&self) -> Vec<bool> {
        self.disconnects.lock().unwrap().clone()
    }

    pub fn join_requests(&self) -> usize {
        self.join_requests.load(Ordering::SeqCst)
    }

    /// Simulate the transport dropping under the current session
    pub fn drop_transport(&self, reason: &str) {
        if let Some(signal) = self.loss_signal.lock().unwrap().as_ref() {
            signal.signal(reason);
        }
    }
}

#[async_trait::async_trait]
impl GameManagerClient for MockReceiver {
    async fn send_player_available_request(&self, _extra: Option<Value>) -> GameManagerResult {
        self.join_requests.fetch_add(1, Ordering::SeqCst);
        let behavior = self.join.lock().unwrap().clone();
        match behavior {
            JoinBehavior::Accept => {
                self.players.lock().unwrap().push(PlayerInfo {
                    player_id: "player-1".to_string(),
                    state: PlayerState::Available,
                    controllable: true,
                });
                GameManagerResult::accepted("player-1")
            }
            JoinBehavior::AcceptEmpty => GameManagerResult::accepted("player-1"),
            JoinBehavior::Reject(reason) => GameManagerResult::failed(reason),
            JoinBehavior::Hang => std::future::pending().await,
        }
    }

    fn current_state(&self) -> GameManagerState {
        GameManagerState {
            players: self.players.lock().unwrap().clone(),
        }
    }

    async fn send_game_message(&self, message: &GameMessage) -> Result<(), SendError> {
        if self.failing_payloads.lock().unwrap().contains(&message.payload) {
            return Err(SendError::TransportFailure("packet lost".to_string()));
        }
        self.sent.lock().unwrap().push(message.payload.clone());
        let delay = *self.send_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn disconnect(&self, stop_application: bool) {
        self.players.lock().unwrap().clear();
        self.disconnects.lock().unwrap().push(stop_application);
    }
}

/// Connector handing out the shared mock receiver.
pub struct MockConnector {
    pub receiver: Arc<MockReceiver>,
}

#[async_trait::async_trait]
impl ReceiverConnector for MockConnector {
    async fn connect(
        &self,
        _device: &ReceiverDevice,
        _app_id: &str,
        lost: TransportLossSignal,
    ) -> Result<Arc<dyn GameManagerClient>, ConnectionError> {
        self.receiver.connects.fetch_add(1, Ordering::SeqCst);
        let delay = *self.receiver.connect_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let behavior = self.receiver.connect.lock().unwrap().clone();
        match behavior {
            ConnectBehavior::Accept => {
                *self.receiver.loss_signal.lock().unwrap() = Some(lost);
                let client: Arc<dyn GameManagerClient> = self.receiver.clone();
                Ok(client)
            }
            ConnectBehavior::Fail(err) => Err(err),
            ConnectBehavior::Hang => std::future::pending().await,
        }
    }
}

#[derive(Default)]
pub struct RecordingDiscovery {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub selectors: Mutex<Vec<RouteSelector>>,
}

impl ReceiverDiscovery for RecordingDiscovery {
    fn start_discovery(&self, selector: &RouteSelector) {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.selectors.lock().unwrap().push(selector.clone());
    }

    fn stop_discovery(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report_error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

pub struct Harness {
    pub context: CastContext,
    pub receiver: Arc<MockReceiver>,
    pub discovery: Arc<RecordingDiscovery>,
    pub reporter: Arc<RecordingReporter>,
}

/// Short timeouts so failure paths finish quickly
pub fn test_config() -> CastConfig {
    CastConfig::builder()
        .app_id("4F8B3483")
        .connect_timeout(Duration::from_millis(200))
        .disconnect_timeout(Duration::from_millis(200))
        .join_timeout(Duration::from_millis(200))
        .send_timeout(Duration::from_millis(200))
        .build()
        .expect("Failed to create test config")
}

pub fn start_harness(config: CastConfig) -> Harness {
    let receiver = MockReceiver::new();
    let discovery = Arc::new(RecordingDiscovery::default());
    let reporter = Arc::new(RecordingReporter::default());

    let collaborators = Collaborators::new(Arc::new(MockConnector {
        receiver: receiver.clone(),
    }))
    .with_discovery(discovery.clone())
    .with_error_reporter(reporter.clone());

    let context = CastContext::start(config, collaborators).expect("Failed to start context");
    Harness {
        context,
        receiver,
        discovery,
        reporter,
    }
}

pub fn living_room() -> ReceiverDevice {
    ReceiverDevice::new("route-living-room", "Living Room TV")
}

pub fn action(n: i64) -> GameMessage {
    GameMessage::new(json!({ "n": n }))
}

/// Fail the test instead of hanging
pub async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), future)
        .await
        .expect("Timed out waiting for session state")
}

/// Connect to the living room receiver and wait for Connected
pub async fn connect(harness: &Harness) {
    let manager = harness.context.manager();
    let epoch = manager.snapshot().epoch;
    manager.connect(living_room()).unwrap();
    within(manager.wait_until(|s| s.is_connected() && s.epoch > epoch))
        .await
        .unwrap();
}
