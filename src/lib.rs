mod utils;
mod client;
mod connection;
mod message;
mod session;
pub mod presentation;

// Re-export commonly used types at crate root
pub use utils::*;
pub use client::*;
pub use connection::*;
pub use message::*;

// Session exports
pub use session::{
    CastContext, Collaborators, GameSessionTracker, JoinOutcome, SessionHandle,
    TransportLossSignal, player_connected, DEFAULT_JOIN_FAILURE,
};
