//! failkit core: error identity and dispatch
//!
//! - [`Allocator`] mints stable identifiers such as `1_AUTH_0000_S` and
//!   rejects names or numbers that would make the catalogue ambiguous.
//! - [`Registry`] stores one template per identifier and creates instances.
//! - The mapper chain converts foreign errors via [`Registry::from_error`].
//! - The hook engine lets observers watch the error lifecycle without being
//!   able to break the caller.
//!
//! The free functions below operate on the process-wide default allocator
//! and registry.
//!
//! ```
//! use failkit_core::{ErrorDefinition, ErrorKind};
//!
//! let id = failkit_core::allocate(1, "DOCS", 0, ErrorKind::Static, "DocsMissingPage");
//! failkit_core::register(ErrorDefinition::new(id.clone(), "page not found")).unwrap();
//!
//! let err = failkit_core::new_error(&id);
//! assert_eq!(err.to_string(), "[1_DOCS_0000_S] page not found");
//! ```

pub mod catalog;
pub mod config;
pub mod errors;
pub mod group;
pub mod hooks;
pub mod id;
mod locks;
pub mod logging_facility;
pub mod mapper;
pub mod matcher;
pub mod model;
pub mod policy;
pub mod registry;
pub mod translator;

// Re-export commonly used types
pub use failkit_core_types::{MetaMap, MetaValue, ValidationRecord};

pub use catalog::{Catalog, CatalogReport};
pub use config::RegistryConfig;
pub use errors::{AllocationError, BoxError, ConfigError, Result, SharedError};
pub use group::ErrorGroup;
pub use hooks::{HookData, HookEngine, HookEvent, Listener};
pub use id::{
    default_allocator, internal_ids, Allocator, ErrorId, ErrorKind, ExportRecord,
    MAX_SEVERITY, RESERVED_CATEGORY, SIMILARITY_THRESHOLD,
};
pub use mapper::{FnMapper, IdMapper, MapOutcome, Mapper};
pub use matcher::ErrorMatcher;
pub use model::{as_fail, is, ErrorDefinition, FailError};
pub use policy::StaticMutationPolicy;
pub use registry::{default_registry, Registry};
pub use translator::Translator;

/// Allocate on the default allocator
///
/// Runtime allocation is only detected once the host has called
/// [`seal_allocations`] at the end of start-up. Until then every call is
/// treated as start-up allocation.
///
/// # Panics
///
/// Panics on any naming or numbering violation; see [`Allocator::allocate`].
pub fn allocate(
    severity: u8,
    category: &str,
    sequence: u32,
    kind: ErrorKind,
    name: &str,
) -> ErrorId {
    default_allocator().allocate(severity, category, sequence, kind, name)
}

/// End the start-up phase of the default allocator
///
/// Nothing calls this implicitly. Later `allocate` calls return the
/// `FailRuntimeIDInvalid` sentinel (or panic, when runtime panics are
/// enabled).
pub fn seal_allocations() {
    default_allocator().seal();
}

/// Export records of every identifier in the default allocator
pub fn export_ids() -> Vec<ExportRecord> {
    default_allocator().export()
}

/// # Errors
///
/// See [`Registry::register`].
pub fn register(def: ErrorDefinition) -> Result<()> {
    default_registry().register(def)
}

/// # Errors
///
/// See [`Registry::register_many`].
pub fn register_many(defs: impl IntoIterator<Item = ErrorDefinition>) -> Result<()> {
    default_registry().register_many(defs)
}

pub fn new_error(id: &ErrorId) -> FailError {
    default_registry().new_error(id)
}

pub fn from_error(err: impl Into<BoxError>) -> FailError {
    default_registry().from_error(err)
}

pub fn form(
    id: &ErrorId,
    default_message: impl Into<String>,
    is_system: bool,
    meta: MetaMap,
) -> FailError {
    default_registry().form(id, default_message, is_system, meta)
}

pub fn wrap(id: &ErrorId, cause: impl Into<BoxError>) -> FailError {
    default_registry().wrap(id, cause)
}

pub fn add_mapper(mapper: impl Mapper + 'static) {
    default_registry().add_mapper(mapper);
}

/// Hook engine of the default registry
pub fn hooks() -> &'static HookEngine {
    default_registry().hooks()
}
