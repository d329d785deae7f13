mod config;
mod receiver;

pub use config::{CastConfig, CastConfigBuilder, DEFAULT_RECEIVER_APP_ID};
pub use receiver::*;
