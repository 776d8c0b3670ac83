//! Core types and trait definitions for forcelog.
//!
//! Holds the incident model, the row normalizer, the race aggregation and the
//! [`store::IncidentStore`] abstraction. Free of HTTP and database
//! dependencies; every other crate in the workspace builds on it.

pub mod error;
pub mod incident;
pub mod normalize;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
