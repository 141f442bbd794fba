#![forbid(unsafe_code)]

pub mod engine;
pub mod model;
pub mod time;

pub use engine::{SessionEngine, SessionPhase, TickOutcome};
pub use time::Clock;
