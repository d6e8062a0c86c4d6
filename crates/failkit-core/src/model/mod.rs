//! Canonical error types
//!
//! - `FailError`: an error instance copied from a registered template
//! - `ErrorDefinition`: what gets registered

mod builder;
mod definition;
mod fail_error;

pub use definition::ErrorDefinition;
pub use fail_error::{as_fail, is, FailError};
