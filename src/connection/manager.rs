use std::sync::Arc;
use tokio::sync::watch;
use crate::{ConnectionError, Error, Result};
use crate::client::{ReceiverDevice, RouteSelector};
use crate::connection::observable::{ConnectionObservable, ConnectionObserver, ListenerId, Subscription};
use crate::connection::state::{ConnectionPhase, ConnectionState};
use crate::session::{player_connected, Command, CommandSender, SessionHandle};

/// Committed connection state as seen from outside the actor.
#[derive(Debug, Clone)]
pub struct ConnectionSnapshot {
    pub phase: ConnectionPhase,
    pub selected_device: Option<ReceiverDevice>,
    pub session: Option<SessionHandle>,
    pub scanning: bool,
    pub epoch: u64,
}

impl ConnectionSnapshot {
    pub(crate) fn from_state(state: &ConnectionState) -> Self {
        ConnectionSnapshot {
            phase: state.phase(),
            selected_device: state.selected_device().cloned(),
            session: state.session().cloned(),
            scanning: state.is_scanning(),
            epoch: state.epoch(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.phase.is_connected()
    }

    /// Whether a controllable local player is active in the remote game
    pub fn has_player_connected(&self) -> bool {
        self.is_connected() && player_connected(self.session.as_ref())
    }
}

/// Handle to the connection state machine. Cheap to clone.
///
/// Mutating calls are queued to the session actor and return at once;
/// their effect is observed through notifications or [`snapshot`].
///
/// [`snapshot`]: CastConnectionManager::snapshot
#[derive(Clone)]
pub struct CastConnectionManager {
    commands: CommandSender,
    snapshot: watch::Receiver<ConnectionSnapshot>,
    observable: Arc<ConnectionObservable>,
    selector: RouteSelector,
}

impl CastConnectionManager {
    pub(crate) fn new(
        commands: CommandSender,
        snapshot: watch::Receiver<ConnectionSnapshot>,
        observable: Arc<ConnectionObservable>,
        selector: RouteSelector,
    ) -> Self {
        CastConnectionManager {
            commands,
            snapshot,
            observable,
            selector,
        }
    }

    /// Start receiver discovery. Repeated calls are no-ops.
    pub fn start_scan(&self) -> Result<()> {
        self.commands.send(Command::StartScan)
    }

    /// Stop receiver discovery. Repeated calls are no-ops.
    pub fn stop_scan(&self) -> Result<()> {
        self.commands.send(Command::StopScan)
    }

    /// Connect to `device`. The outcome arrives as a notification.
    pub fn connect(&self, device: ReceiverDevice) -> Result<()> {
        self.commands.send(Command::Connect { device })
    }

    /// Tear down the session; `stop_application` is passed to the managed client.
    pub fn disconnect_from_receiver(&self, stop_application: bool) -> Result<()> {
        self.commands.send(Command::Disconnect { stop_application })
    }

    pub fn is_connected_to_receiver(&self) -> bool {
        self.snapshot.borrow().is_connected()
    }

    /// Live session handle. Fails with `NotConnected` outside Connected.
    pub fn game_manager_client(&self) -> std::result::Result<SessionHandle, ConnectionError> {
        self.snapshot
            .borrow()
            .session
            .clone()
            .filter(|session| session.is_valid())
            .ok_or(ConnectionError::NotConnected)
    }

    pub fn has_player_connected(&self) -> bool {
        self.snapshot.borrow().has_player_connected()
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.snapshot.borrow().phase
    }

    pub fn selected_device(&self) -> Option<ReceiverDevice> {
        self.snapshot.borrow().selected_device.clone()
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Selector for the device-selection UI
    pub fn route_selector(&self) -> &RouteSelector {
        &self.selector
    }

    pub fn add_observer(&self, observer: Arc<dyn ConnectionObserver>) -> ListenerId {
        self.observable.subscribe(observer)
    }

    pub fn delete_observer(&self, id: ListenerId) -> bool {
        self.observable.unsubscribe(id)
    }

    /// Subscribe through a channel instead of a callback
    pub fn subscribe(&self) -> Subscription {
        self.observable.subscribe_channel()
    }

    /// Wait until the committed state satisfies `predicate`
    pub async fn wait_until<F>(&self, predicate: F) -> Result<ConnectionSnapshot>
    where
        F: FnMut(&ConnectionSnapshot) -> bool,
    {
        let mut rx = self.snapshot.clone();
        let snapshot = rx.wait_for(predicate).await.map_err(|_| Error::Shutdown)?;
        Ok((*snapshot).clone())
    }

    /// Wait until every command queued so far has been handled
    pub async fn settled(&self) -> Result<()> {
        self.commands.barrier().await
    }
}
