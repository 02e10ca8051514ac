//! Adaptive arithmetic practice: puzzle generation, performance tracking,
//! difficulty adjustment and session rating.
//!
//! The terminal front end lives in the binary; everything it drives is here.

pub mod config;
pub mod engine;
pub mod generator;
pub mod logging;
pub mod session;
pub mod store;
