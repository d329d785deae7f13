use thiserror::Error;

/// Why a connection attempt or a session lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("Connection timed out")]
    Timeout,

    #[error("Connection rejected: {0}")]
    Rejected(String),

    #[error("Protocol mismatch: {0}")]
    ProtocolMismatch(String),

    #[error("Not connected to a receiver")]
    NotConnected,
}

/// Why a single outbound game message was not delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("Not connected to a receiver")]
    NotConnected,

    #[error("Transport failure: {0}")]
    TransportFailure(String),
}

/// The receiver refused to make the local player available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct JoinRejected {
    pub reason: String,
}

impl JoinRejected {
    pub fn new(reason: impl Into<String>) -> Self {
        JoinRejected { reason: reason.into() }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Join rejected: {0}")]
    JoinRejected(#[from] JoinRejected),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Session shut down")]
    Shutdown,
}

impl Error {
    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Error::InvalidState(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
