//! Error identifiers and their allocator
//!
//! An `ErrorId` is minted once per distinct error name and renders as
//! `{severity}_{category}_{sequence:04}_{S|D}`, e.g. `0_AUTH_0042_S`.
//! Severity and category are descriptive; identity is the rendered string.

mod allocator;
mod internal;
pub mod similarity;

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

pub use allocator::{Allocator, MAX_SEVERITY, SIMILARITY_THRESHOLD};
pub use internal::{default_allocator, internal_ids, InternalIds, RESERVED_CATEGORY};

/// Whether an error's message is fixed at registration or may vary per instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Static,
    Dynamic,
}

impl ErrorKind {
    /// Kind letter used in the rendered identifier
    pub fn letter(&self) -> char {
        match self {
            ErrorKind::Static => 'S',
            ErrorKind::Dynamic => 'D',
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, ErrorKind::Static)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Static => write!(f, "static"),
            ErrorKind::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Immutable error identifier
///
/// Only an [`Allocator`] produces identifiers with `is_allocated() == true`,
/// and only those are accepted by a registry.
#[derive(Clone)]
pub struct ErrorId {
    name: String,
    category: String,
    severity: u8,
    kind: ErrorKind,
    sequence: u32,
    allocated: bool,
}

impl ErrorId {
    pub(crate) fn minted(
        severity: u8,
        category: &str,
        sequence: u32,
        kind: ErrorKind,
        name: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            severity,
            kind,
            sequence,
            allocated: true,
        }
    }

    /// Describe an identifier that did not come from an allocator
    ///
    /// Useful for external catalogues and tooling. Registries reject these.
    pub fn unallocated(
        severity: u8,
        category: impl Into<String>,
        sequence: u32,
        kind: ErrorKind,
        name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            severity,
            kind,
            sequence,
            allocated: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Leading digit of the rendered form, 0-9
    pub fn severity(&self) -> u8 {
        self.severity
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn is_static(&self) -> bool {
        self.kind.is_static()
    }

    /// True only for identifiers minted by an allocator
    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Rendered form, the registry key
    pub fn rendered(&self) -> String {
        self.to_string()
    }

    /// Flat record used by the export
    pub fn export_record(&self) -> ExportRecord {
        ExportRecord {
            name: self.name.clone(),
            category: self.category.clone(),
            is_static: self.is_static(),
            severity: self.severity,
            sequence_number: self.sequence,
            rendered_id: self.rendered(),
        }
    }

    /// Export ordering: category, static before dynamic, then sequence
    pub(crate) fn export_order(a: &ErrorId, b: &ErrorId) -> std::cmp::Ordering {
        a.category
            .cmp(&b.category)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.sequence.cmp(&b.sequence))
    }
}

impl fmt::Display for ErrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{:04}_{}",
            self.severity,
            self.category,
            self.sequence,
            self.kind.letter()
        )
    }
}

impl fmt::Debug for ErrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self)
    }
}

// Equality follows the rendered string, so the name does not participate.
impl PartialEq for ErrorId {
    fn eq(&self, other: &Self) -> bool {
        self.severity == other.severity
            && self.category == other.category
            && self.sequence == other.sequence
            && self.kind == other.kind
    }
}

impl Eq for ErrorId {}

impl Hash for ErrorId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.severity.hash(state);
        self.category.hash(state);
        self.sequence.hash(state);
        self.kind.hash(state);
    }
}

/// One row of the allocator export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub name: String,
    pub category: String,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub severity: u8,
    pub sequence_number: u32,
    pub rendered_id: String,
}
