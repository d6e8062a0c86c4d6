//! Core types shared across failkit facilities
//!
//! This crate provides the vocabulary used by both the error registry and
//! the logging facility:
//!
//! - **Metadata values**: `MetaValue`, the tagged value stored in error metadata
//! - **Validation records**: `ValidationRecord` field/message pairs
//! - **Schema constants**: Canonical field keys and event names

pub mod meta;
pub mod schema;

pub use meta::{MetaMap, MetaValue, ValidationRecord};
