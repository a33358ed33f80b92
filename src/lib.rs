//! # Voice Admin Library
//!
//! Organization-scoped administration backend for voice agents: the scoped
//! resource store, its HTTP surface and the ambient runtime (configuration,
//! tracing, database pool).

pub mod auth;
pub mod config;
pub mod cursor;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod telemetry;
pub use migration;
