//! Structured logging facility for failkit
//!
//! This module provides:
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_hook_event!`, `log_internal!`)
//! - Hook listeners that forward `log`/`trace` events to `tracing`
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use failkit_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```

pub mod init;
pub mod listeners;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
