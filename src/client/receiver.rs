use std::sync::Arc;
use serde_json::Value;
use crate::{ConnectionError, SendError};
use crate::message::GameMessage;
use crate::session::TransportLossSignal;

/// A receiver found by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReceiverDevice {
    /// Stable route identifier
    pub id: String,

    /// Name shown in the device selector
    pub friendly_name: String,
}

impl ReceiverDevice {
    pub fn new(id: impl Into<String>, friendly_name: impl Into<String>) -> Self {
        ReceiverDevice {
            id: id.into(),
            friendly_name: friendly_name.into(),
        }
    }
}

/// Opaque route filter handed to discovery and to the device selector UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSelector {
    app_id: String,
}

impl RouteSelector {
    pub fn for_app(app_id: impl Into<String>) -> Self {
        RouteSelector { app_id: app_id.into() }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Control category matching receivers able to run the app.
    pub fn category(&self) -> String {
        format!("com.google.cast.CATEGORY_CAST/{}", self.app_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Unknown,
    Dropped,
    Quit,
    Available,
    Ready,
    Idle,
    Playing,
}

impl PlayerState {
    /// Check if the player still holds a seat in the game
    pub fn is_connected(&self) -> bool {
        !matches!(self,
            PlayerState::Unknown |
            PlayerState::Dropped |
            PlayerState::Quit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    pub player_id: String,
    pub state: PlayerState,

    /// Whether this sender controls the player
    pub controllable: bool,
}

/// Receiver-side game state as last reported by the managed client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameManagerState {
    pub players: Vec<PlayerInfo>,
}

impl GameManagerState {
    pub fn connected_controllable_players(&self) -> Vec<&PlayerInfo> {
        self.players
            .iter()
            .filter(|p| p.controllable && p.state.is_connected())
            .collect()
    }
}

/// Completion status of a managed client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestStatus {
    pub success: bool,
    pub message: Option<String>,
}

impl RequestStatus {
    pub fn success() -> Self {
        RequestStatus { success: true, message: None }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        RequestStatus {
            success: false,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameManagerResult {
    pub status: RequestStatus,

    /// Player the request applied to, if any
    pub player_id: Option<String>,
}

impl GameManagerResult {
    pub fn accepted(player_id: impl Into<String>) -> Self {
        GameManagerResult {
            status: RequestStatus::success(),
            player_id: Some(player_id.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        GameManagerResult {
            status: RequestStatus::failure(message),
            player_id: None,
        }
    }
}

/// Session capability exposed by the managed Cast client.
#[async_trait::async_trait]
pub trait GameManagerClient: Send + Sync {
    async fn send_player_available_request(&self, extra: Option<Value>) -> GameManagerResult;
    fn current_state(&self) -> GameManagerState;
    async fn send_game_message(&self, message: &GameMessage) -> Result<(), SendError>;
    async fn disconnect(&self, stop_application: bool);
}

/// Establishes sessions with a selected receiver.
#[async_trait::async_trait]
pub trait ReceiverConnector: Send + Sync {
    /// Launch or join `app_id` on `device`.
    ///
    /// The connector keeps `lost` and fires it when the transport drops
    /// after the session was handed out.
    async fn connect(
        &self,
        device: &ReceiverDevice,
        app_id: &str,
        lost: TransportLossSignal,
    ) -> Result<Arc<dyn GameManagerClient>, ConnectionError>;
}

/// Device discovery collaborator.
pub trait ReceiverDiscovery: Send + Sync {
    fn start_discovery(&self, selector: &RouteSelector);
    fn stop_discovery(&self);
}

/// Receives human-readable failure messages for the user.
pub trait ErrorReporter: Send + Sync {
    fn report_error(&self, message: &str);
}

/// Discovery that does nothing, for hosts that select devices by other means.
pub struct NoDiscovery;

impl ReceiverDiscovery for NoDiscovery {
    fn start_discovery(&self, _selector: &RouteSelector) {}
    fn stop_discovery(&self) {}
}

/// Error reporter that only logs.
pub struct LogErrorReporter;

impl ErrorReporter for LogErrorReporter {
    fn report_error(&self, message: &str) {
        log::warn!("CastSession: {}", message);
    }
}
