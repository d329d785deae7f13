use std::time::Duration;
use log::debug;
use tokio::sync::mpsc;
use tokio::time::timeout;
use crate::SendError;
use crate::message::types::QueuedMessage;
use crate::session::{Command, CommandSender, SessionHandle};

/// Sequential sender for one session.
///
/// Messages are sent one at a time in submission order. Once the session
/// handle is invalidated every remaining message fails as `NotConnected`.
/// Dropping the lane lets the worker drain and exit.
pub(crate) struct DeliveryLane {
    tx: mpsc::UnboundedSender<QueuedMessage>,
}

impl DeliveryLane {
    pub(crate) fn spawn(session: SessionHandle, commands: CommandSender, send_timeout: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<QueuedMessage>();
        let epoch = session.epoch();

        tokio::spawn(async move {
            while let Some(queued) = rx.recv().await {
                let waited = queued.enqueued_at.elapsed();
                let result = send_one(&session, &queued, send_timeout).await;
                debug!(
                    "CastSession: message {} attempted {:?} after enqueue (ok={})",
                    queued.seq,
                    waited,
                    result.is_ok()
                );
                commands.complete(Command::SendCompleted {
                    epoch,
                    seq: queued.seq,
                    result,
                });
            }
            debug!("CastSession: delivery lane for session {} closed", session.session_id());
        });

        DeliveryLane { tx }
    }

    /// Hand a message to the worker. Gives it back if the worker is gone.
    pub(crate) fn submit(&self, queued: QueuedMessage) -> Result<(), QueuedMessage> {
        self.tx.send(queued).map_err(|e| e.0)
    }
}

async fn send_one(
    session: &SessionHandle,
    queued: &QueuedMessage,
    send_timeout: Duration,
) -> Result<(), SendError> {
    if !session.is_valid() {
        return Err(SendError::NotConnected);
    }
    match timeout(send_timeout, session.client().send_game_message(&queued.message)).await {
        Ok(result) => result,
        Err(_) => Err(SendError::TransportFailure(format!(
            "send timed out after {:?}",
            send_timeout
        ))),
    }
}
