#![warn(missing_docs)]
//! Test support: hex capture fixtures, round-trip assertions and log capture.

mod capture;
mod logging;

pub use capture::*;
pub use logging::*;
