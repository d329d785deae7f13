use crate::JoinRejected;
use crate::client::GameManagerResult;
use crate::connection::ConnectionState;
use crate::session::SessionHandle;

/// Reason reported when the receiver fails the request without one.
pub const DEFAULT_JOIN_FAILURE: &str = "Player available request failed";

/// True iff `session` is live and has a connected controllable player.
///
/// Participation is never stored; it is read from the live session each
/// time it is asked for.
pub fn player_connected(session: Option<&SessionHandle>) -> bool {
    match session {
        Some(handle) if handle.is_valid() => {
            !handle.current_state().connected_controllable_players().is_empty()
        }
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Accepted,
    Rejected(JoinRejected),

    /// The session the request was issued for is gone
    Stale,
}

/// Bridges "connected to a receiver" with "a controllable player is active
/// in the remote game" by owning the once-per-connection join flag.
#[derive(Debug, Default)]
pub struct GameSessionTracker {
    /// Epoch a join request was issued for
    requested_epoch: Option<u64>,
}

impl GameSessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called after every notification. Returns the session to send the
    /// join request on, at most once per Connected phase.
    pub fn poll_join(&mut self, state: &ConnectionState) -> Option<SessionHandle> {
        let session = state.session()?;
        if self.requested_epoch == Some(session.epoch()) {
            return None;
        }
        if player_connected(Some(session)) {
            return None;
        }
        self.requested_epoch = Some(session.epoch());
        Some(session.clone())
    }

    /// Classify a join completion against the current state.
    pub fn complete_join(
        &self,
        epoch: u64,
        state: &ConnectionState,
        result: &GameManagerResult,
    ) -> JoinOutcome {
        let current = state.session().map(|s| s.epoch());
        if current != Some(epoch) || self.requested_epoch != Some(epoch) {
            return JoinOutcome::Stale;
        }
        if result.status.is_success() {
            JoinOutcome::Accepted
        } else {
            let reason = result
                .status
                .message
                .clone()
                .unwrap_or_else(|| DEFAULT_JOIN_FAILURE.to_string());
            JoinOutcome::Rejected(JoinRejected::new(reason))
        }
    }

    pub fn join_requested(&self) -> bool {
        self.requested_epoch.is_some()
    }

    /// Clear the per-connection flag on disconnect
    pub fn reset(&mut self) {
        self.requested_epoch = None;
    }
}
