mod delivery;
mod handler;
mod queue;
mod types;

pub(crate) use delivery::DeliveryLane;
pub use handler::*;
pub use queue::*;
pub use types::*;
