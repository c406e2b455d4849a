//! WebSocket Simulation Sessions
//!
//! This module contains the real-time playback loop for simulation sessions
//! over WebSockets. It is structured into submodules for clarity:
//!
//! - `protocol`: Defines the JSON-based message format for client-server communication.
//! - `session`: Manages the WebSocket connection lifecycle, from handshake to termination.
//! - `driver`: Runs the simulation engine, interpreting its effects as timers,
//!   pacing delays and outbound messages.

mod driver;
pub mod protocol;
pub mod session;

pub use session::ws_handler;
