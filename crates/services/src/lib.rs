#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod leaderboard_store;
pub mod question_picker;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{AppServicesError, LeaderboardError};
pub use leaderboard_store::LeaderboardStore;
pub use question_picker::{categories, pick_questions};
pub use sessions::{SessionLoopService, SessionSnapshot};
