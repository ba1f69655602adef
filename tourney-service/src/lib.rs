//! TOURNEY Service - Tournament workflow over a persistence gateway
//!
//! This crate provides the layer callers talk to:
//! - Create / apply / approve / reject / start workflow with owner checks
//! - Result reporting with automatic round advancement
//! - Whole-aggregate stores (in memory, JSON file)
//! - Per-tournament serialisation of load-mutate-save cycles

mod application;
mod config;
mod error;
mod locks;
mod service;
pub mod store;

pub use application::Application;
pub use config::ServiceConfig;
pub use error::{ServiceError, StoreError};
pub use locks::LockRegistry;
pub use service::{Progress, ReportOutcome, Service};
pub use store::{JsonFileStore, MemoryStore, TournamentStore, TournamentSummary};
