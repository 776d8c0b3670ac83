//! Wiring for the Forcelog server binary: configuration loading, one-shot
//! refreshes, and the periodic refresh task.

pub mod config;
pub mod run;
pub mod schedule;

pub use crate::config::ServerConfig;
