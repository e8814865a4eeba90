//! HTTP front end for the `worduel` duel engine.
//!
//! The binary wires [`config::ServerConfig`] to a storage backend, installs
//! logging and metrics, and serves [`api::create_router`].

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
