use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use crate::{Error, Result};
use crate::client::{
    CastConfig, ErrorReporter, LogErrorReporter, NoDiscovery, ReceiverConnector,
    ReceiverDiscovery, RouteSelector,
};
use crate::connection::{CastConnectionManager, ConnectionObservable, ConnectionSnapshot, ConnectionState};
use crate::message::{QueueStatus, SendMessageHandler};
use crate::session::actor::SessionActor;
use crate::session::command::{Command, CommandSender};

/// External capabilities the session core drives.
#[derive(Clone)]
pub struct Collaborators {
    pub discovery: Arc<dyn ReceiverDiscovery>,
    pub connector: Arc<dyn ReceiverConnector>,
    pub errors: Arc<dyn ErrorReporter>,
}

impl Collaborators {
    /// Connector only; no discovery, errors are logged
    pub fn new(connector: Arc<dyn ReceiverConnector>) -> Self {
        Collaborators {
            discovery: Arc::new(NoDiscovery),
            connector,
            errors: Arc::new(LogErrorReporter),
        }
    }

    pub fn with_discovery(mut self, discovery: Arc<dyn ReceiverDiscovery>) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_error_reporter(mut self, errors: Arc<dyn ErrorReporter>) -> Self {
        self.errors = errors;
        self
    }
}

/// The cast session: one per process, passed to whatever needs it.
///
/// Owns the session actor task. Must be started inside a Tokio runtime.
pub struct CastContext {
    config: Arc<CastConfig>,
    manager: CastConnectionManager,
    messages: SendMessageHandler,
    commands: CommandSender,
    task: JoinHandle<()>,
}

impl CastContext {
    /// Validate `config` and spawn the session actor
    pub fn start(config: CastConfig, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let selector = RouteSelector::for_app(config.app_id.clone());
        let observable = Arc::new(ConnectionObservable::new());
        let (commands, inbox) = CommandSender::channel();

        let (connection_tx, connection_rx) =
            watch::channel(ConnectionSnapshot::from_state(&ConnectionState::new()));
        let (queue_tx, queue_rx) = watch::channel(QueueStatus {
            suspended: true,
            foreground_suspended: !config.start_in_foreground,
            ..QueueStatus::default()
        });

        let manager = CastConnectionManager::new(
            commands.clone(),
            connection_rx,
            observable.clone(),
            selector.clone(),
        );
        let messages = SendMessageHandler::new(commands.clone(), queue_rx);

        let actor = SessionActor::new(
            config.clone(),
            selector,
            collaborators,
            observable,
            connection_tx,
            queue_tx,
            commands.clone(),
            inbox,
        );
        let task = tokio::spawn(actor.run());

        Ok(CastContext {
            config,
            manager,
            messages,
            commands,
            task,
        })
    }

    pub fn config(&self) -> &CastConfig {
        &self.config
    }

    pub fn manager(&self) -> &CastConnectionManager {
        &self.manager
    }

    pub fn message_handler(&self) -> &SendMessageHandler {
        &self.messages
    }

    /// App came to the foreground: scan and resume sending
    pub fn enter_foreground(&self) -> Result<()> {
        self.manager.start_scan()?;
        self.messages.resume_sending_messages()
    }

    /// App left the foreground: stop scanning and buffer messages
    pub fn exit_foreground(&self) -> Result<()> {
        self.manager.stop_scan()?;
        self.messages.flush_messages()
    }

    /// Stop the actor, tearing down any live session without stopping the receiver app
    pub async fn shutdown(self) -> Result<()> {
        self.commands.send(Command::Shutdown)?;
        self.task
            .await
            .map_err(|e| Error::invalid_state(format!("Session task failed: {}", e)))
    }
}
