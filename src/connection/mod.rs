mod manager;
mod observable;
mod state;

pub use manager::*;
pub use observable::*;
pub use state::*;
