use tokio::sync::watch;
use crate::{Error, Result};
use crate::message::queue::QueueStatus;
use crate::message::types::GameMessage;
use crate::session::{Command, CommandSender};

/// Outbound game message handle. Cheap to clone.
///
/// Messages are buffered while sending is suspended (app in background or
/// no receiver session) and flushed in enqueue order once both the app is
/// in the foreground and a session exists. Each message is attempted once.
#[derive(Clone)]
pub struct SendMessageHandler {
    commands: CommandSender,
    status: watch::Receiver<QueueStatus>,
}

impl SendMessageHandler {
    pub(crate) fn new(commands: CommandSender, status: watch::Receiver<QueueStatus>) -> Self {
        SendMessageHandler { commands, status }
    }

    pub fn enqueue(&self, message: impl Into<GameMessage>) -> Result<()> {
        self.commands.send(Command::Enqueue(message.into()))
    }

    /// App entered the foreground: deliver anything buffered
    pub fn resume_sending_messages(&self) -> Result<()> {
        self.commands.send(Command::Resume)
    }

    /// App left the foreground: buffer from now on, keeping what is queued
    pub fn flush_messages(&self) -> Result<()> {
        self.commands.send(Command::Flush)
    }

    pub fn status(&self) -> QueueStatus {
        *self.status.borrow()
    }

    pub async fn wait_until<F>(&self, predicate: F) -> Result<QueueStatus>
    where
        F: FnMut(&QueueStatus) -> bool,
    {
        let mut rx = self.status.clone();
        let status = rx.wait_for(predicate).await.map_err(|_| Error::Shutdown)?;
        Ok(*status)
    }

    /// Wait until every command queued so far has been handled
    pub async fn settled(&self) -> Result<()> {
        self.commands.barrier().await
    }
}
