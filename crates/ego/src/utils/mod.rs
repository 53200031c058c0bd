mod misc;

pub use misc::*;

/// Env variable to enable logging feature
pub const SAFEBO_LOG: &str = "SAFEBO_LOG";
