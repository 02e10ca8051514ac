pub mod game;
pub mod result;
pub mod tracker;

pub use game::{RoundResult, Session, SessionContext, SessionReport};
pub use tracker::PerformanceTracker;
