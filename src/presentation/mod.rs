use std::sync::Mutex;
use crate::connection::{CastConnectionManager, ConnectionNotification, ConnectionObserver, ConnectionSnapshot};

/// Screen shown by the controller UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerView {
    /// Device selection and connection status
    Connection,

    /// Player input surface
    Game,
}

/// Connection screen until the local player has joined the remote game,
/// then the game pad. Only reads session state.
pub fn select_view(snapshot: &ConnectionSnapshot) -> ControllerView {
    if snapshot.has_player_connected() {
        ControllerView::Game
    } else {
        ControllerView::Connection
    }
}

/// Observer that re-renders when the selected view changes.
pub struct ViewObserver<F> {
    manager: CastConnectionManager,
    current: Mutex<Option<ControllerView>>,
    render: F,
}

impl<F> ViewObserver<F>
where
    F: Fn(ControllerView) + Send + Sync,
{
    pub fn new(manager: CastConnectionManager, render: F) -> Self {
        ViewObserver {
            manager,
            current: Mutex::new(None),
            render,
        }
    }

    pub fn current(&self) -> Option<ControllerView> {
        match self.current.lock() {
            Ok(current) => *current,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Re-evaluate against the latest committed state
    pub fn refresh(&self) {
        let view = select_view(&self.manager.snapshot());
        let mut current = match self.current.lock() {
            Ok(current) => current,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *current != Some(view) {
            *current = Some(view);
            drop(current);
            (self.render)(view);
        }
    }
}

impl<F> ConnectionObserver for ViewObserver<F>
where
    F: Fn(ControllerView) + Send + Sync,
{
    fn on_connection_changed(&self, _notification: &ConnectionNotification) {
        self.refresh();
    }
}
