use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use failkit_core_types::schema::EVENT_RUNTIME_ALLOCATION;

use super::internal::{internal_ids, RESERVED_CATEGORY};
use super::similarity::levenshtein;
use super::{ErrorId, ErrorKind, ExportRecord};
use crate::errors::AllocationError;
use crate::locks;
use crate::policy;

/// Names at this edit distance or closer to an existing name are rejected
pub const SIMILARITY_THRESHOLD: usize = 3;

/// Severity is the single leading digit of a rendered identifier
pub const MAX_SEVERITY: u8 = 9;

#[derive(Debug, Clone)]
struct GroupEntry {
    sequence: u32,
    name: String,
    rendered: String,
}

#[derive(Debug, Default)]
struct AllocatorState {
    by_name: HashMap<String, ErrorId>,
    /// (category, kind) -> entries sorted by sequence
    groups: HashMap<(String, ErrorKind), Vec<GroupEntry>>,
    sealed: bool,
    runtime_allowed: bool,
    runtime_panics: Option<bool>,
}

/// Mints identifiers and enforces naming and numbering rules
///
/// One exclusive lock covers the whole validate-and-insert sequence, so two
/// callers can never both fill the same numbering slot.
#[derive(Debug, Default)]
pub struct Allocator {
    state: Mutex<AllocatorState>,
}

impl Allocator {
    /// Create an isolated allocator in its start-up phase
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, AllocatorState> {
        locks::lock(&self.state)
    }

    /// Allocate an identifier, returning violations instead of panicking
    ///
    /// Rules are checked in order: reserved category, severity range (0-9),
    /// name prefix, duplicate name, name similarity, sequence collision,
    /// sequence gap.
    ///
    /// # Errors
    ///
    /// Returns the first `AllocationError` the request violates, or
    /// `RuntimeAllocation` if the allocator has been sealed.
    pub fn try_allocate(
        &self,
        severity: u8,
        category: &str,
        sequence: u32,
        kind: ErrorKind,
        name: &str,
    ) -> Result<ErrorId, AllocationError> {
        let mut state = self.lock();

        if state.sealed && !state.runtime_allowed {
            return Err(AllocationError::RuntimeAllocation {
                name: name.to_string(),
                category: category.to_string(),
            });
        }

        if category == RESERVED_CATEGORY {
            return Err(AllocationError::ReservedCategory {
                category: category.to_string(),
            });
        }

        if severity > MAX_SEVERITY {
            return Err(AllocationError::SeverityOutOfRange {
                name: name.to_string(),
                severity,
            });
        }

        insert(&mut state, severity, category, sequence, kind, name)
    }

    /// Allocate an identifier during start-up
    ///
    /// The start-up phase lasts until `seal()` is called; an allocator that
    /// is never sealed accepts allocations at any time.
    ///
    /// # Panics
    ///
    /// Panics on any naming or numbering violation. After `seal()`, returns
    /// the `FailRuntimeIDInvalid` sentinel instead, or panics when runtime
    /// panics are permitted for this allocator.
    pub fn allocate(
        &self,
        severity: u8,
        category: &str,
        sequence: u32,
        kind: ErrorKind,
        name: &str,
    ) -> ErrorId {
        match self.try_allocate(severity, category, sequence, kind, name) {
            Ok(id) => id,
            Err(err @ AllocationError::RuntimeAllocation { .. }) => self.runtime_misuse(err),
            Err(err) => panic!("{}", err),
        }
    }

    fn runtime_misuse(&self, err: AllocationError) -> ErrorId {
        tracing::error!(
            component = module_path!(),
            event = EVENT_RUNTIME_ALLOCATION,
            "{}",
            err
        );

        let allow_panics = self
            .lock()
            .runtime_panics
            .unwrap_or_else(policy::runtime_panics_allowed);
        if allow_panics {
            panic!("{}", err);
        }

        internal_ids().runtime_id_invalid.clone()
    }

    /// Internal-only path for the reserved category
    pub(crate) fn allocate_internal(
        &self,
        severity: u8,
        sequence: u32,
        kind: ErrorKind,
        name: &str,
    ) -> ErrorId {
        let result = {
            let mut state = self.lock();
            insert(&mut state, severity, RESERVED_CATEGORY, sequence, kind, name)
        };
        match result {
            Ok(id) => id,
            Err(err) => panic!("internal id: {}", err),
        }
    }

    /// End the start-up phase
    pub fn seal(&self) {
        self.lock().sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.lock().sealed
    }

    /// Testing override: accept allocations even after `seal()`
    pub fn allow_runtime_allocation(&self, allow: bool) {
        self.lock().runtime_allowed = allow;
    }

    /// Per-allocator override of the process-wide runtime-panic flag
    pub fn override_runtime_panics(&self, allow: Option<bool>) {
        self.lock().runtime_panics = allow;
    }

    /// Identifier previously allocated under `name`
    pub fn lookup(&self, name: &str) -> Option<ErrorId> {
        self.lock().by_name.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All identifiers sorted by category, static first, then sequence
    pub fn ids(&self) -> Vec<ErrorId> {
        let state = self.lock();
        let mut ids: Vec<ErrorId> = state.by_name.values().cloned().collect();
        ids.sort_by(ErrorId::export_order);
        ids
    }

    pub fn export(&self) -> Vec<ExportRecord> {
        self.ids().iter().map(ErrorId::export_record).collect()
    }

    /// Pretty-printed JSON array of export records
    ///
    /// # Errors
    ///
    /// Returns the serializer error, which does not occur for these records
    /// in practice.
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.export())
    }

    /// Re-check every (category, kind) group for holes
    ///
    /// # Errors
    ///
    /// Returns `SequenceGap` for the first group that does not start at 0 or
    /// skips a number.
    pub fn validate(&self) -> Result<(), AllocationError> {
        let state = self.lock();
        let mut keys: Vec<&(String, ErrorKind)> = state.groups.keys().collect();
        keys.sort();

        for key in keys {
            let mut expected = 0;
            for entry in &state.groups[key] {
                if entry.sequence != expected {
                    return Err(AllocationError::SequenceGap {
                        category: key.0.clone(),
                        kind: key.1,
                        missing: expected,
                        requested: entry.sequence,
                    });
                }
                expected = entry.sequence + 1;
            }
        }
        Ok(())
    }

    /// Forget every allocation; phase flags are kept
    pub fn reset(&self) {
        let mut state = self.lock();
        state.by_name.clear();
        state.groups.clear();
    }
}

fn has_category_prefix(name: &str, category: &str) -> bool {
    name.get(..category.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(category))
}

fn insert(
    state: &mut AllocatorState,
    severity: u8,
    category: &str,
    sequence: u32,
    kind: ErrorKind,
    name: &str,
) -> Result<ErrorId, AllocationError> {
    if !has_category_prefix(name, category) {
        return Err(AllocationError::PrefixMismatch {
            name: name.to_string(),
            category: category.to_string(),
        });
    }

    if let Some(existing) = state.by_name.get(name) {
        return Err(AllocationError::DuplicateName {
            name: name.to_string(),
            existing: existing.to_string(),
        });
    }

    let mut existing_names: Vec<&String> = state.by_name.keys().collect();
    existing_names.sort();
    for existing in existing_names {
        let distance = levenshtein(name, existing);
        if distance <= SIMILARITY_THRESHOLD {
            return Err(AllocationError::TooSimilar {
                name: name.to_string(),
                existing: existing.clone(),
                distance,
                threshold: SIMILARITY_THRESHOLD,
            });
        }
    }

    let key = (category.to_string(), kind);
    let group = state.groups.get(&key).map(Vec::as_slice).unwrap_or(&[]);
    check_sequence(group, category, kind, sequence)?;

    let id = ErrorId::minted(severity, category, sequence, kind, name);
    let entry = GroupEntry {
        sequence,
        name: name.to_string(),
        rendered: id.to_string(),
    };

    let group = state.groups.entry(key).or_default();
    let pos = group.partition_point(|e| e.sequence < sequence);
    group.insert(pos, entry);
    state.by_name.insert(name.to_string(), id.clone());

    Ok(id)
}

/// Accept `sequence` only if it keeps the group contiguous from 0
///
/// With no holes the next number is `max + 1` (or 0 for an empty group).
/// With exactly one hole, only that number is accepted.
fn check_sequence(
    group: &[GroupEntry],
    category: &str,
    kind: ErrorKind,
    sequence: u32,
) -> Result<(), AllocationError> {
    if let Some(existing) = group.iter().find(|e| e.sequence == sequence) {
        return Err(AllocationError::SequenceCollision {
            category: category.to_string(),
            kind,
            sequence,
            existing_name: existing.name.clone(),
            existing_id: existing.rendered.clone(),
        });
    }

    let mut missing = Vec::new();
    let mut next = 0;
    for entry in group {
        while next < entry.sequence {
            missing.push(next);
            next += 1;
        }
        next = entry.sequence + 1;
    }

    let gap = |missing: u32| AllocationError::SequenceGap {
        category: category.to_string(),
        kind,
        missing,
        requested: sequence,
    };

    match missing.as_slice() {
        [] if sequence == next => Ok(()),
        [] => Err(gap(next)),
        [only] if sequence == *only => Ok(()),
        [first, ..] => Err(gap(*first)),
    }
}
