mod actor;
mod command;
mod context;
mod handle;
mod tracker;

pub(crate) use command::{Command, CommandSender};
pub use command::TransportLossSignal;
pub use context::{CastContext, Collaborators};
pub use handle::SessionHandle;
pub use tracker::*;
