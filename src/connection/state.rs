use std::sync::Arc;
use crate::{Error, Result};
use crate::client::{GameManagerClient, ReceiverDevice};
use crate::session::SessionHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionPhase {
    /// No receiver selected
    Idle,

    /// Discovering receivers
    Scanning,

    /// Waiting for the managed client to connect
    Connecting,

    /// Session established, outbound traffic allowed
    Connected,

    /// Tearing the session down
    Disconnecting,
}

impl ConnectionPhase {
    /// Check if connected
    pub fn is_connected(&self) -> bool {
        *self == ConnectionPhase::Connected
    }

    /// Check if a connect may start from here
    pub fn can_connect(&self) -> bool {
        matches!(self, ConnectionPhase::Idle | ConnectionPhase::Scanning)
    }

    /// Check if a disconnect may start from here
    pub fn can_disconnect(&self) -> bool {
        matches!(self, ConnectionPhase::Connecting | ConnectionPhase::Connected)
    }

    /// Validate transition
    pub fn can_transition_to(&self, next: ConnectionPhase) -> bool {
        match (*self, next) {
            (ConnectionPhase::Idle, ConnectionPhase::Scanning) => true,
            (ConnectionPhase::Scanning, ConnectionPhase::Idle) => true,
            (ConnectionPhase::Idle, ConnectionPhase::Connecting) => true,
            (ConnectionPhase::Scanning, ConnectionPhase::Connecting) => true,
            (ConnectionPhase::Connecting, ConnectionPhase::Connected) => true,
            (ConnectionPhase::Connecting, ConnectionPhase::Idle) => true,
            (ConnectionPhase::Connecting, ConnectionPhase::Disconnecting) => true,
            (ConnectionPhase::Connected, ConnectionPhase::Disconnecting) => true,
            (ConnectionPhase::Disconnecting, ConnectionPhase::Idle) => true,
            _ => false,
        }
    }
}

/// A committed phase change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ConnectionPhase,
    pub to: ConnectionPhase,
}

/// Connection state owned by the session actor.
///
/// `session` is `Some` exactly while `phase` is `Connected`; every method
/// that leaves Connected invalidates the handle before returning.
#[derive(Debug)]
pub struct ConnectionState {
    phase: ConnectionPhase,
    selected_device: Option<ReceiverDevice>,
    session: Option<SessionHandle>,
    scanning: bool,
    epoch: u64,
}

impl ConnectionState {
    pub fn new() -> Self {
        ConnectionState {
            phase: ConnectionPhase::Idle,
            selected_device: None,
            session: None,
            scanning: false,
            epoch: 0,
        }
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub fn selected_device(&self) -> Option<&ReceiverDevice> {
        self.selected_device.as_ref()
    }

    pub fn session(&self) -> Option<&SessionHandle> {
        self.session.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.phase.is_connected()
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Current connect attempt
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Check the handle/phase invariant
    pub fn is_consistent(&self) -> bool {
        self.session.is_some() == self.phase.is_connected()
    }

    fn transition(&mut self, next: ConnectionPhase) -> Result<Transition> {
        if !self.phase.can_transition_to(next) {
            return Err(Error::invalid_state(format!(
                "Invalid transition from {:?} to {:?}",
                self.phase, next
            )));
        }
        let transition = Transition { from: self.phase, to: next };
        self.phase = next;
        Ok(transition)
    }

    /// Toggle discovery. Returns the phase change, if the phase moved.
    pub fn set_scanning(&mut self, scanning: bool) -> Option<Transition> {
        self.scanning = scanning;
        match (scanning, self.phase) {
            (true, ConnectionPhase::Idle) => self.transition(ConnectionPhase::Scanning).ok(),
            (false, ConnectionPhase::Scanning) => self.transition(ConnectionPhase::Idle).ok(),
            _ => None,
        }
    }

    /// Return to Scanning after landing in Idle with discovery still on.
    pub fn resume_scanning(&mut self) -> Option<Transition> {
        if self.scanning && self.phase == ConnectionPhase::Idle {
            self.transition(ConnectionPhase::Scanning).ok()
        } else {
            None
        }
    }

    /// Idle/Scanning -> Connecting. Starts a new epoch.
    pub fn begin_connect(&mut self, device: ReceiverDevice) -> Result<Transition> {
        if !self.phase.can_connect() {
            return Err(Error::invalid_state(format!(
                "Cannot connect while {:?}",
                self.phase
            )));
        }
        let transition = self.transition(ConnectionPhase::Connecting)?;
        self.epoch += 1;
        self.selected_device = Some(device);
        Ok(transition)
    }

    /// Connecting -> Connected, wrapping `client` in a fresh session handle.
    pub fn complete_connect(
        &mut self,
        epoch: u64,
        client: Arc<dyn GameManagerClient>,
    ) -> Result<Transition> {
        if self.phase != ConnectionPhase::Connecting || epoch != self.epoch {
            return Err(Error::invalid_state(format!(
                "Stale connect completion for epoch {} (current {} while {:?})",
                epoch, self.epoch, self.phase
            )));
        }
        let device = self
            .selected_device
            .clone()
            .ok_or_else(|| Error::invalid_state("Connecting without a selected device"))?;
        let transition = self.transition(ConnectionPhase::Connected)?;
        self.session = Some(SessionHandle::new(epoch, device, client));
        Ok(transition)
    }

    /// Connecting -> Idle after a failed attempt for `epoch`.
    pub fn fail_connect(&mut self, epoch: u64) -> Result<Transition> {
        if self.phase != ConnectionPhase::Connecting || epoch != self.epoch {
            return Err(Error::invalid_state(format!(
                "Stale connect failure for epoch {} (current {} while {:?})",
                epoch, self.epoch, self.phase
            )));
        }
        let transition = self.transition(ConnectionPhase::Idle)?;
        self.selected_device = None;
        Ok(transition)
    }

    /// Connecting/Connected -> Disconnecting. Returns the invalidated handle.
    pub fn begin_disconnect(&mut self) -> Result<(Transition, Option<SessionHandle>)> {
        if !self.phase.can_disconnect() {
            return Err(Error::invalid_state(format!(
                "Cannot disconnect while {:?}",
                self.phase
            )));
        }
        let session = self.session.take();
        if let Some(ref handle) = session {
            handle.invalidate();
        }
        let transition = self.transition(ConnectionPhase::Disconnecting)?;
        Ok((transition, session))
    }

    /// Disconnecting -> Idle once teardown for `epoch` finished.
    pub fn finish_disconnect(&mut self, epoch: u64) -> Result<Transition> {
        if self.phase != ConnectionPhase::Disconnecting || epoch != self.epoch {
            return Err(Error::invalid_state(format!(
                "Stale disconnect completion for epoch {} (current {} while {:?})",
                epoch, self.epoch, self.phase
            )));
        }
        let transition = self.transition(ConnectionPhase::Idle)?;
        self.selected_device = None;
        Ok(transition)
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}
