use std::sync::Arc;
use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use crate::{ConnectionError, SendError};
use crate::client::{CastConfig, GameManagerClient, GameManagerResult, ReceiverDevice, RouteSelector};
use crate::connection::{
    ConnectionNotification, ConnectionObservable, ConnectionPhase, ConnectionSnapshot,
    ConnectionState, NotificationCause, Transition,
};
use crate::message::{DeliveryLane, GameMessage, OutboundQueue, QueueStatus};
use crate::session::command::{Command, CommandSender, TransportLossSignal};
use crate::session::context::Collaborators;
use crate::session::tracker::{GameSessionTracker, JoinOutcome};

/// Single writer for connection state, the outbound queue and the
/// participation flag.
///
/// `handle` never awaits. Anything asynchronous runs in a spawned task that
/// posts its completion back to the inbox with the epoch it was issued for.
pub(crate) struct SessionActor {
    config: Arc<CastConfig>,
    selector: RouteSelector,
    collaborators: Collaborators,
    observable: Arc<ConnectionObservable>,

    state: ConnectionState,
    queue: OutboundQueue,
    tracker: GameSessionTracker,
    delivery: Option<DeliveryLane>,

    /// Connect attempt given up while Connecting, with the caller's stop flag
    abandoned: Option<(u64, bool)>,

    connection_tx: watch::Sender<ConnectionSnapshot>,
    queue_tx: watch::Sender<QueueStatus>,
    commands: CommandSender,
    inbox: mpsc::UnboundedReceiver<Command>,
}

impl SessionActor {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: Arc<CastConfig>,
        selector: RouteSelector,
        collaborators: Collaborators,
        observable: Arc<ConnectionObservable>,
        connection_tx: watch::Sender<ConnectionSnapshot>,
        queue_tx: watch::Sender<QueueStatus>,
        commands: CommandSender,
        inbox: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        let queue = OutboundQueue::new(!config.start_in_foreground);
        SessionActor {
            config,
            selector,
            collaborators,
            observable,
            state: ConnectionState::new(),
            queue,
            tracker: GameSessionTracker::new(),
            delivery: None,
            abandoned: None,
            connection_tx,
            queue_tx,
            commands,
            inbox,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("CastSession: started (app {})", self.config.app_id);
        self.publish();

        while let Some(command) = self.inbox.recv().await {
            if let Command::Shutdown = command {
                break;
            }
            self.handle(command);
        }

        self.shutdown();
        info!("CastSession: stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::StartScan => self.start_scan(),
            Command::StopScan => self.stop_scan(),
            Command::Connect { device } => self.connect(device),
            Command::Disconnect { stop_application } => self.disconnect(stop_application, None),
            Command::Enqueue(message) => self.enqueue(message),
            Command::Resume => self.resume(),
            Command::Flush => self.flush(),
            Command::Barrier(reply) => {
                let _ = reply.send(());
            }
            Command::Shutdown => {}
            Command::ConnectCompleted { epoch, result } => self.on_connect_completed(epoch, result),
            Command::DisconnectCompleted { epoch } => self.on_disconnect_completed(epoch),
            Command::TransportLost { epoch, reason } => self.on_transport_lost(epoch, reason),
            Command::JoinCompleted { epoch, result } => self.on_join_completed(epoch, result),
            Command::SendCompleted { epoch, seq, result } => self.on_send_completed(epoch, seq, result),
        }
    }

    fn publish(&self) {
        self.connection_tx.send_replace(ConnectionSnapshot::from_state(&self.state));
        self.publish_queue();
    }

    fn publish_queue(&self) {
        self.queue_tx.send_replace(self.queue.status(self.state.is_connected()));
    }

    /// Publish the committed state, then notify, then let the tracker react.
    fn commit(&mut self, cause: NotificationCause) {
        self.publish();
        let notification = ConnectionNotification {
            phase: self.state.phase(),
            device: self.state.selected_device().cloned(),
            cause,
        };
        self.observable.notify_all(&notification);
        self.poll_join();
    }

    fn commit_transition(&mut self, transition: Transition) {
        debug!("CastSession: {:?} -> {:?}", transition.from, transition.to);
        self.commit(NotificationCause::PhaseChanged { from: transition.from });
    }

    fn settle_scanning(&mut self) {
        if let Some(transition) = self.state.resume_scanning() {
            self.commit_transition(transition);
        }
    }

    fn start_scan(&mut self) {
        if self.state.is_scanning() {
            debug!("CastSession: scan already running");
            return;
        }
        self.collaborators.discovery.start_discovery(&self.selector);
        match self.state.set_scanning(true) {
            Some(transition) => self.commit_transition(transition),
            None => self.commit(NotificationCause::ScanChanged),
        }
    }

    fn stop_scan(&mut self) {
        if !self.state.is_scanning() {
            debug!("CastSession: scan not running");
            return;
        }
        self.collaborators.discovery.stop_discovery();
        match self.state.set_scanning(false) {
            Some(transition) => self.commit_transition(transition),
            None => self.commit(NotificationCause::ScanChanged),
        }
    }

    fn connect(&mut self, device: ReceiverDevice) {
        let transition = match self.state.begin_connect(device.clone()) {
            Ok(transition) => transition,
            Err(e) => {
                warn!("CastSession: connect to '{}' ignored: {}", device.friendly_name, e);
                return;
            }
        };
        let epoch = self.state.epoch();
        info!("CastSession: connecting to '{}' ({})", device.friendly_name, device.id);
        self.commit_transition(transition);

        let connector = self.collaborators.connector.clone();
        let commands = self.commands.clone();
        let signal = TransportLossSignal::new(epoch, self.commands.clone());
        let app_id = self.config.app_id.clone();
        let connect_timeout = self.config.connect_timeout;

        tokio::spawn(async move {
            let result = match timeout(connect_timeout, connector.connect(&device, &app_id, signal)).await {
                Ok(result) => result,
                Err(_) => Err(ConnectionError::Timeout),
            };
            commands.complete(Command::ConnectCompleted { epoch, result });
        });
    }

    fn on_connect_completed(
        &mut self,
        epoch: u64,
        result: Result<Arc<dyn GameManagerClient>, ConnectionError>,
    ) {
        let current = self.state.phase() == ConnectionPhase::Connecting && self.state.epoch() == epoch;

        match result {
            Ok(client) if !current => {
                let stop_application = self.take_abandoned(epoch);
                debug!(
                    "CastSession: discarding session from abandoned attempt {} (stop_application={})",
                    epoch, stop_application
                );
                tokio::spawn(async move {
                    client.disconnect(stop_application).await;
                });
            }
            Err(err) if !current => {
                self.take_abandoned(epoch);
                debug!("CastSession: ignoring failure of abandoned attempt {}: {}", epoch, err);
            }
            Ok(client) => {
                let transition = match self.state.complete_connect(epoch, client) {
                    Ok(transition) => transition,
                    Err(e) => {
                        warn!("CastSession: {}", e);
                        return;
                    }
                };
                if let Some(session) = self.state.session() {
                    info!(
                        "CastSession: connected to '{}' (session {})",
                        session.device().friendly_name,
                        session.session_id()
                    );
                    self.delivery = Some(DeliveryLane::spawn(
                        session.clone(),
                        self.commands.clone(),
                        self.config.send_timeout,
                    ));
                }
                self.commit_transition(transition);
                self.drain_queue();
                self.publish_queue();
            }
            Err(err) => {
                if let Err(e) = self.state.fail_connect(epoch) {
                    warn!("CastSession: {}", e);
                    return;
                }
                warn!("CastSession: connect failed: {}", err);
                self.commit(NotificationCause::ConnectFailed(err.clone()));
                self.collaborators.errors.report_error(&err.to_string());
                self.settle_scanning();
            }
        }
    }

    /// Stop flag requested when `epoch` was abandoned; false if none was recorded.
    fn take_abandoned(&mut self, epoch: u64) -> bool {
        match self.abandoned {
            Some((abandoned, stop_application)) if abandoned == epoch => {
                self.abandoned = None;
                stop_application
            }
            _ => false,
        }
    }

    /// Leave Connected/Connecting. `cause` overrides the phase-change cause.
    fn disconnect(&mut self, stop_application: bool, cause: Option<NotificationCause>) {
        let (transition, session) = match self.state.begin_disconnect() {
            Ok(result) => result,
            Err(e) => {
                debug!("CastSession: disconnect ignored: {}", e);
                return;
            }
        };
        // Handle is already invalid; closing the lane fails what it still holds.
        self.delivery = None;
        self.tracker.reset();
        let epoch = self.state.epoch();
        if transition.from == ConnectionPhase::Connecting {
            // The connector may still hand back a session for this attempt
            self.abandoned = Some((epoch, stop_application));
        }
        info!("CastSession: disconnecting (stop_application={})", stop_application);
        self.commit(cause.unwrap_or(NotificationCause::PhaseChanged { from: transition.from }));

        let commands = self.commands.clone();
        let disconnect_timeout = self.config.disconnect_timeout;
        tokio::spawn(async move {
            if let Some(session) = session {
                let teardown = session.client().disconnect(stop_application);
                if timeout(disconnect_timeout, teardown).await.is_err() {
                    warn!("CastSession: receiver teardown timed out after {:?}", disconnect_timeout);
                }
            }
            commands.complete(Command::DisconnectCompleted { epoch });
        });
    }

    fn on_disconnect_completed(&mut self, epoch: u64) {
        match self.state.finish_disconnect(epoch) {
            Ok(transition) => {
                info!("CastSession: disconnected");
                self.commit_transition(transition);
                self.settle_scanning();
            }
            Err(e) => debug!("CastSession: {}", e),
        }
    }

    fn on_transport_lost(&mut self, epoch: u64, reason: String) {
        if epoch != self.state.epoch() || !self.state.phase().can_disconnect() {
            debug!("CastSession: ignoring transport loss for attempt {}: {}", epoch, reason);
            return;
        }
        warn!("CastSession: transport lost: {}", reason);
        self.disconnect(false, Some(NotificationCause::TransportLost(reason)));
    }

    fn poll_join(&mut self) {
        let Some(session) = self.tracker.poll_join(&self.state) else {
            return;
        };
        debug!("CastSession: requesting player slot on session {}", session.session_id());

        let commands = self.commands.clone();
        let extra = self.config.player_available_extra.clone();
        let join_timeout = self.config.join_timeout;
        tokio::spawn(async move {
            let epoch = session.epoch();
            let request = session.client().send_player_available_request(extra);
            let result = match timeout(join_timeout, request).await {
                Ok(result) => result,
                Err(_) => GameManagerResult::failed("Player available request timed out"),
            };
            commands.complete(Command::JoinCompleted { epoch, result });
        });
    }

    fn on_join_completed(&mut self, epoch: u64, result: GameManagerResult) {
        match self.tracker.complete_join(epoch, &self.state, &result) {
            JoinOutcome::Stale => {
                debug!("CastSession: ignoring join result for attempt {}", epoch);
            }
            JoinOutcome::Accepted => {
                info!(
                    "CastSession: player {} available",
                    result.player_id.as_deref().unwrap_or("<unknown>")
                );
                self.commit(NotificationCause::JoinAccepted);
            }
            JoinOutcome::Rejected(rejected) => {
                warn!("CastSession: join rejected: {}", rejected.reason);
                self.disconnect(false, None);
                self.collaborators.errors.report_error(&rejected.reason);
                self.commit(NotificationCause::JoinRejected(rejected));
            }
        }
    }

    fn enqueue(&mut self, message: GameMessage) {
        let seq = self.queue.push(message);
        debug!("CastSession: queued message {}", seq);
        self.drain_queue();
        self.publish_queue();
    }

    fn resume(&mut self) {
        self.queue.resume();
        self.drain_queue();
        self.publish_queue();
    }

    fn flush(&mut self) {
        self.queue.suspend();
        self.publish_queue();
    }

    /// Hand every buffered message to the delivery lane, if sending is allowed.
    fn drain_queue(&mut self) {
        if self.queue.is_suspended(self.state.is_connected()) {
            return;
        }
        let Some(lane) = self.delivery.as_ref() else {
            return;
        };
        for queued in self.queue.drain() {
            if let Err(queued) = lane.submit(queued) {
                warn!("CastSession: delivery lane closed, dropping message {}", queued.seq);
                self.queue.record_result(&Err(SendError::NotConnected));
            }
        }
    }

    fn on_send_completed(&mut self, epoch: u64, seq: u64, result: Result<(), SendError>) {
        if let Err(ref e) = result {
            // Fire-and-forget: a stale control message is not worth retrying
            warn!("CastSession: dropping message {} (attempt {}): {}", seq, epoch, e);
        }
        self.queue.record_result(&result);
        self.publish_queue();
    }

    fn shutdown(&mut self) {
        if self.state.is_scanning() {
            self.collaborators.discovery.stop_discovery();
        }
        // Teardown still runs; its completion is dropped with the inbox
        self.disconnect(false, None);
    }
}
