#![warn(missing_docs)]
//! Client-side protocol engine for a bridge simulator: turns the byte stream
//! from a game server into typed packets and keeps a merged model of the
//! world objects those packets describe.
//!
//! Framing and packets live in `artemis-net`, the object model in
//! `artemis-world`; this crate wires them into a session.

pub mod config;
pub mod session;

pub use config::{LinkConfig, DEFAULT_CONFIG_PATH};
pub use session::{ClientSession, SessionError, SessionEvent};
