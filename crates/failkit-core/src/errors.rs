use thiserror::Error;

use crate::id::ErrorKind;
use crate::model::FailError;

/// Result type alias for runtime registry operations
pub type Result<T> = std::result::Result<T, FailError>;

/// Foreign error handed to `from_error`, before it is shared with mappers
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Foreign error as seen by mappers and kept as a cause
pub type SharedError = std::sync::Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Allocation-time contract violations
///
/// These describe mistakes in the static catalogue of error identifiers.
/// `Allocator::allocate` turns every variant except `RuntimeAllocation`
/// into a panic; `Allocator::try_allocate` hands them back to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// Category is reserved for the library's own identifiers
    #[error("category '{category}' is reserved for internal errors and cannot be used")]
    ReservedCategory { category: String },

    /// Severity does not fit the single-digit slot
    #[error("error '{name}' has severity {severity}; severity must be 0-9")]
    SeverityOutOfRange { name: String, severity: u8 },

    /// Name does not start with its category
    #[error("error name '{name}' must start with category '{category}' (e.g. {category}InvalidCredentials)")]
    PrefixMismatch { name: String, category: String },

    /// Name already allocated
    #[error("error name '{name}' already allocated as {existing}")]
    DuplicateName { name: String, existing: String },

    /// Name within the similarity threshold of an existing name
    #[error("error name '{name}' is too similar to existing name '{existing}' (distance: {distance}, must be > {threshold})")]
    TooSimilar {
        name: String,
        existing: String,
        distance: usize,
        threshold: usize,
    },

    /// Sequence number already used in the (category, kind) group
    #[error("number {sequence} already used in {category} ({kind}) by '{existing_name}' ({existing_id})")]
    SequenceCollision {
        category: String,
        kind: ErrorKind,
        sequence: u32,
        existing_name: String,
        existing_id: String,
    },

    /// Sequence number would leave a hole in the (category, kind) group
    #[error("ID numbering gap detected in {category} ({kind}): missing {missing} (requested {requested})")]
    SequenceGap {
        category: String,
        kind: ErrorKind,
        missing: u32,
        requested: u32,
    },

    /// Allocation attempted after the start-up phase ended
    #[error("error ID '{name}' in category '{category}' requested at runtime; all error IDs must be allocated during start-up")]
    RuntimeAllocation { name: String, category: String },
}

/// Failures loading configuration or catalogue documents
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_error_messages() {
        let err = AllocationError::ReservedCategory {
            category: "FAIL".to_string(),
        };
        assert!(err.to_string().contains("reserved for internal errors"));

        let err = AllocationError::SequenceGap {
            category: "AUTH".to_string(),
            kind: ErrorKind::Static,
            missing: 3,
            requested: 4,
        };
        assert_eq!(
            err.to_string(),
            "ID numbering gap detected in AUTH (static): missing 3 (requested 4)"
        );
    }

    #[test]
    fn test_too_similar_message_carries_distance() {
        let err = AllocationError::TooSimilar {
            name: "UserNotFounds".to_string(),
            existing: "UserNotFound".to_string(),
            distance: 1,
            threshold: 3,
        };
        assert!(err.to_string().contains("distance: 1, must be > 3"));
    }
}
