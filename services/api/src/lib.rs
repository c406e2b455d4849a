//! Ward Simulation API Library Crate
//!
//! This library contains all the logic for the training web service: the
//! application state, the JSON-file data store, instructor authentication,
//! REST handlers for scenario management, the WebSocket playback session,
//! and routing. The `api` binary is a thin wrapper around this library.

pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod seed;
pub mod state;
pub mod store;
pub mod ws;
