//! Library-owned identifiers in the reserved category
//!
//! Minted through the internal allocation path the first time the default
//! allocator is touched, so their numbering is fixed for the process.

use std::sync::OnceLock;

use super::{Allocator, ErrorId, ErrorKind};

/// Category reserved for the library's own identifiers
pub const RESERVED_CATEGORY: &str = "FAIL";

/// Sentinel identifiers used by registries, mappers and translators
#[derive(Debug, Clone)]
pub struct InternalIds {
    pub unregistered: ErrorId,
    pub translate_untrusted: ErrorId,
    pub translator_not_found: ErrorId,
    pub translate_unsupported: ErrorId,
    pub translator_panicked: ErrorId,
    pub translate_wrong_type: ErrorId,
    pub not_matched_in_any_mapper: ErrorId,
    pub no_mapper_registered: ErrorId,
    pub translator_already_registered: ErrorId,
    pub runtime_id_invalid: ErrorId,
    pub id_not_allocated: ErrorId,
    pub register_many: ErrorId,
    pub registry_already_registered: ErrorId,
    pub translator_name_empty: ErrorId,
}

impl InternalIds {
    fn allocate(allocator: &Allocator) -> Self {
        use ErrorKind::{Dynamic, Static};
        let a = |severity: u8, sequence: u32, kind: ErrorKind, name: &str| {
            allocator.allocate_internal(severity, sequence, kind, name)
        };

        Self {
            unregistered: a(0, 0, Dynamic, "FailUnregisteredError"),
            translate_untrusted: a(0, 1, Dynamic, "FailTranslateUntrustedError"),
            translator_not_found: a(0, 2, Dynamic, "FailTranslatorNotFound"),
            translate_unsupported: a(0, 3, Dynamic, "FailTranslateUnsupportedError"),
            translator_panicked: a(0, 4, Dynamic, "FailTranslatorPanicked"),
            translate_wrong_type: a(0, 5, Dynamic, "FailTranslateWrongType"),
            not_matched_in_any_mapper: a(0, 6, Dynamic, "FailNotMatchedInAnyMapper"),
            no_mapper_registered: a(0, 7, Dynamic, "FailNoMapperRegistered"),
            translator_already_registered: a(0, 8, Dynamic, "FailTranslatorAlreadyRegistered"),
            runtime_id_invalid: a(9, 9, Dynamic, "FailRuntimeIDInvalid"),
            id_not_allocated: a(9, 10, Dynamic, "FailIDNotAllocatedError"),
            register_many: a(9, 11, Dynamic, "FailRegisterManyError"),
            registry_already_registered: a(9, 12, Dynamic, "FailRegistryAlreadyRegistered"),
            translator_name_empty: a(0, 0, Static, "FailTranslatorNameEmpty"),
        }
    }

    /// Every sentinel with its default message and system flag
    pub(crate) fn sentinel_templates(&self) -> [(&ErrorId, &'static str, bool); 14] {
        [
            (&self.unregistered, "error not registered", true),
            (&self.translate_untrusted, "cannot translate untrusted error", true),
            (&self.translator_not_found, "translator not found", true),
            (&self.translate_unsupported, "translator does not support this error", true),
            (&self.translator_panicked, "translator panicked", true),
            (&self.translate_wrong_type, "translation produced an unexpected type", true),
            (&self.not_matched_in_any_mapper, "error not matched by any mapper", true),
            (&self.no_mapper_registered, "no mappers registered", true),
            (&self.translator_already_registered, "translator already registered", true),
            (&self.runtime_id_invalid, "error ID allocated at runtime", true),
            (&self.id_not_allocated, "error ID was not produced by an allocator", true),
            (&self.register_many, "one or more registrations failed", true),
            (&self.registry_already_registered, "registry name already in use", true),
            (&self.translator_name_empty, "translator name must not be empty", true),
        ]
    }
}

struct Internal {
    allocator: Allocator,
    ids: InternalIds,
}

static INTERNAL: OnceLock<Internal> = OnceLock::new();

fn internal() -> &'static Internal {
    INTERNAL.get_or_init(|| {
        let allocator = Allocator::new();
        let ids = InternalIds::allocate(&allocator);
        Internal { allocator, ids }
    })
}

/// The process-wide allocator used by the top-level `allocate`
pub fn default_allocator() -> &'static Allocator {
    &internal().allocator
}

pub fn internal_ids() -> &'static InternalIds {
    &internal().ids
}
