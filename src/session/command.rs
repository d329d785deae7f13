use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use crate::{ConnectionError, Error, Result, SendError};
use crate::client::{GameManagerClient, GameManagerResult, ReceiverDevice};
use crate::message::GameMessage;

/// Commands processed by the session actor, in arrival order.
pub(crate) enum Command {
    StartScan,
    StopScan,
    Connect {
        device: ReceiverDevice,
    },
    Disconnect {
        stop_application: bool,
    },
    Enqueue(GameMessage),
    Resume,
    Flush,

    /// Replies once every earlier command has been handled
    Barrier(oneshot::Sender<()>),
    Shutdown,

    // Completions posted back by spawned tasks
    ConnectCompleted {
        epoch: u64,
        result: std::result::Result<Arc<dyn GameManagerClient>, ConnectionError>,
    },
    DisconnectCompleted {
        epoch: u64,
    },
    TransportLost {
        epoch: u64,
        reason: String,
    },
    JoinCompleted {
        epoch: u64,
        result: GameManagerResult,
    },
    SendCompleted {
        epoch: u64,
        seq: u64,
        result: std::result::Result<(), SendError>,
    },
}

#[derive(Clone)]
pub(crate) struct CommandSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl CommandSender {
    pub(crate) fn channel() -> (CommandSender, mpsc::UnboundedReceiver<Command>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (CommandSender { tx }, rx)
    }

    pub(crate) fn send(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|_| Error::Shutdown)
    }

    /// Post a completion; dropped silently once the actor is gone.
    pub(crate) fn complete(&self, command: Command) {
        if self.tx.send(command).is_err() {
            log::debug!("CastSession: completion dropped after shutdown");
        }
    }

    pub(crate) async fn barrier(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Barrier(tx))?;
        rx.await.map_err(|_| Error::Shutdown)
    }
}

/// Handed to the connector on connect; fire it when the transport drops.
///
/// Scoped to one connect attempt, so a late signal from an old session
/// cannot tear down a newer one.
#[derive(Clone)]
pub struct TransportLossSignal {
    epoch: u64,
    commands: CommandSender,
}

impl TransportLossSignal {
    pub(crate) fn new(epoch: u64, commands: CommandSender) -> Self {
        TransportLossSignal { epoch, commands }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn signal(&self, reason: impl Into<String>) {
        self.commands.complete(Command::TransportLost {
            epoch: self.epoch,
            reason: reason.into(),
        });
    }
}
