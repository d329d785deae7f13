use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use crate::{ConnectionError, Error, JoinRejected};
use crate::client::ReceiverDevice;
use crate::connection::state::ConnectionPhase;

/// Why observers are being notified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationCause {
    /// The phase moved from `from` to the notification's phase
    PhaseChanged { from: ConnectionPhase },

    /// Discovery was toggled without a phase change
    ScanChanged,

    /// A connect attempt failed; the phase is back to Idle
    ConnectFailed(ConnectionError),

    /// The transport dropped; the phase is Disconnecting
    TransportLost(String),

    /// The receiver accepted the local player
    JoinAccepted,

    /// The receiver refused the local player
    JoinRejected(JoinRejected),
}

/// A state-change notification, delivered after the change committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionNotification {
    pub phase: ConnectionPhase,
    pub device: Option<ReceiverDevice>,
    pub cause: NotificationCause,
}

impl ConnectionNotification {
    /// The failure this notification reports, if any
    pub fn error(&self) -> Option<Error> {
        match &self.cause {
            NotificationCause::ConnectFailed(err) => Some(err.clone().into()),
            NotificationCause::JoinRejected(rejected) => Some(rejected.clone().into()),
            _ => None,
        }
    }
}

/// Receives connection notifications synchronously.
///
/// Runs on the session actor; implementations must not block. Calling
/// back into the manager is fine, those calls are queued.
pub trait ConnectionObserver: Send + Sync {
    fn on_connection_changed(&self, notification: &ConnectionNotification);
}

impl<F> ConnectionObserver for F
where
    F: Fn(&ConnectionNotification) + Send + Sync,
{
    fn on_connection_changed(&self, notification: &ConnectionNotification) {
        self(notification)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Channel-backed subscription.
pub struct Subscription {
    pub id: ListenerId,
    pub receiver: mpsc::UnboundedReceiver<ConnectionNotification>,
}

#[derive(Clone)]
enum Listener {
    Callback(Arc<dyn ConnectionObserver>),
    Channel(mpsc::UnboundedSender<ConnectionNotification>),
}

pub struct ConnectionObservable {
    /// Listener ID counter
    next_id: AtomicU64,

    /// Listeners by ID, in subscription order
    listeners: Mutex<BTreeMap<ListenerId, Listener>>,
}

impl ConnectionObservable {
    pub fn new() -> Self {
        ConnectionObservable {
            next_id: AtomicU64::new(0),
            listeners: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ListenerId, Listener>> {
        match self.listeners.lock() {
            Ok(locked) => locked,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn insert(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.lock().insert(id, listener);
        id
    }

    /// Register a callback observer
    pub fn subscribe(&self, observer: Arc<dyn ConnectionObserver>) -> ListenerId {
        self.insert(Listener::Callback(observer))
    }

    /// Register a channel; dropped receivers are pruned on the next notify
    pub fn subscribe_channel(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.insert(Listener::Channel(tx));
        Subscription { id, receiver: rx }
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.lock().remove(&id).is_some()
    }

    pub fn observer_count(&self) -> usize {
        self.lock().len()
    }

    /// Deliver to every listener. Returns the number of deliveries.
    pub fn notify_all(&self, notification: &ConnectionNotification) -> usize {
        // Snapshot so observers may (un)subscribe while being notified
        let snapshot: Vec<ListenerId> = self.lock().keys().copied().collect();
        let mut delivered = 0;
        let mut closed = Vec::new();

        for id in snapshot {
            let listener = match self.lock().get(&id) {
                Some(listener) => listener.clone(),
                None => continue,
            };
            match listener {
                Listener::Callback(observer) => {
                    observer.on_connection_changed(notification);
                    delivered += 1;
                }
                Listener::Channel(tx) => {
                    if tx.send(notification.clone()).is_ok() {
                        delivered += 1;
                    } else {
                        closed.push(id);
                    }
                }
            }
        }

        if !closed.is_empty() {
            let mut listeners = self.lock();
            for id in closed {
                listeners.remove(&id);
            }
        }

        delivered
    }
}

impl Default for ConnectionObservable {
    fn default() -> Self {
        Self::new()
    }
}
