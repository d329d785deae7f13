use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;
use crate::client::{GameManagerClient, GameManagerState, ReceiverDevice};

struct HandleInner {
    epoch: u64,
    session_id: Uuid,
    device: ReceiverDevice,
    client: Arc<dyn GameManagerClient>,
    valid: AtomicBool,
}

/// Capability for the live receiver session.
///
/// Valid only while the manager is Connected. Clones share validity, so a
/// handle kept past disconnect reports `is_valid() == false`.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<HandleInner>,
}

impl SessionHandle {
    pub(crate) fn new(epoch: u64, device: ReceiverDevice, client: Arc<dyn GameManagerClient>) -> Self {
        SessionHandle {
            inner: Arc::new(HandleInner {
                epoch,
                session_id: Uuid::new_v4(),
                device,
                client,
                valid: AtomicBool::new(true),
            }),
        }
    }

    /// Connect attempt this handle belongs to
    pub fn epoch(&self) -> u64 {
        self.inner.epoch
    }

    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    pub fn device(&self) -> &ReceiverDevice {
        &self.inner.device
    }

    pub fn client(&self) -> &Arc<dyn GameManagerClient> {
        &self.inner.client
    }

    pub fn is_valid(&self) -> bool {
        self.inner.valid.load(Ordering::Acquire)
    }

    pub fn current_state(&self) -> GameManagerState {
        self.inner.client.current_state()
    }

    pub(crate) fn invalidate(&self) {
        self.inner.valid.store(false, Ordering::Release);
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("epoch", &self.inner.epoch)
            .field("session_id", &self.inner.session_id)
            .field("device", &self.inner.device.id)
            .field("valid", &self.is_valid())
            .finish()
    }
}
