// Game Controller Example
//
// This example demonstrates:
// - Starting a cast session against a simulated receiver
// - Following connection notifications and the selected view
// - Sending player actions once the player has joined
// - Graceful shutdown
//
// Usage:
//   cargo run --example controller

use async_trait::async_trait;
use castsession::presentation::{ControllerView, ViewObserver};
use castsession::{
    CastConfig, CastContext, Collaborators, ConnectionError, ConnectionNotification,
    GameManagerClient, GameManagerResult, GameManagerState, GameMessage, PlayerInfo, PlayerState,
    ReceiverConnector, ReceiverDevice, Result, SendError, TransportLossSignal,
};
use log::{info, warn};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// In-process stand-in for a receiver running the game
struct SimulatedReceiver {
    players: Mutex<Vec<PlayerInfo>>,
}

#[async_trait]
impl GameManagerClient for SimulatedReceiver {
    async fn send_player_available_request(&self, _extra: Option<Value>) -> GameManagerResult {
        let mut players = match self.players.lock() {
            Ok(players) => players,
            Err(poisoned) => poisoned.into_inner(),
        };
        players.push(PlayerInfo {
            player_id: "controller-1".to_string(),
            state: PlayerState::Available,
            controllable: true,
        });
        GameManagerResult::accepted("controller-1")
    }

    fn current_state(&self) -> GameManagerState {
        let players = match self.players.lock() {
            Ok(players) => players.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        GameManagerState { players }
    }

    async fn send_game_message(&self, message: &GameMessage) -> std::result::Result<(), SendError> {
        info!("Receiver got: {}", message.payload);
        Ok(())
    }

    async fn disconnect(&self, stop_application: bool) {
        info!("Receiver session closed (stop_application={})", stop_application);
    }
}

struct SimulatedConnector;

#[async_trait]
impl ReceiverConnector for SimulatedConnector {
    async fn connect(
        &self,
        device: &ReceiverDevice,
        app_id: &str,
        _lost: TransportLossSignal,
    ) -> std::result::Result<Arc<dyn GameManagerClient>, ConnectionError> {
        info!("Launching {} on '{}'", app_id, device.friendly_name);
        Ok(Arc::new(SimulatedReceiver {
            players: Mutex::new(Vec::new()),
        }))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // Create session configuration
    let config = CastConfig::builder()
        .app_id("4F8B3483")
        .start_in_foreground(true)
        .player_available_extra(json!({ "name": "demo" }))
        .build()?;

    info!("Starting cast session for app {}", config.app_id);

    let context = CastContext::start(config, Collaborators::new(Arc::new(SimulatedConnector)))?;
    let manager = context.manager().clone();

    manager.add_observer(Arc::new(|n: &ConnectionNotification| {
        info!("Connection: {:?} ({:?})", n.phase, n.cause);
        if let Some(err) = n.error() {
            warn!("{}", err);
        }
    }));
    manager.add_observer(Arc::new(ViewObserver::new(manager.clone(), |view| match view {
        ControllerView::Connection => info!("Showing connection screen"),
        ControllerView::Game => info!("Showing game pad"),
    })));

    context.enter_foreground()?;
    manager.connect(ReceiverDevice::new("route-1", "Living Room TV"))?;
    manager.wait_until(|s| s.has_player_connected()).await?;

    // Send a few player actions
    let messages = context.message_handler();
    for direction in ["left", "right", "jump"] {
        messages.enqueue(GameMessage::player_action(direction, json!({})))?;
    }
    messages.wait_until(|s| s.delivered == 3).await?;

    manager.disconnect_from_receiver(true)?;
    manager.wait_until(|s| !s.is_connected() && s.session.is_none()).await?;

    context.shutdown().await?;
    info!("Session stopped");
    Ok(())
}
