//! Canonical schema constants for structured logging and hook snapshots
//!
//! These constants keep the keys emitted by the logging facility and the
//! keys of hook snapshot maps in agreement.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_REGISTRY: &str = "registry";

// Error identity fields
pub const FIELD_ERR_ID: &str = "err_id";
pub const FIELD_ERR_NAME: &str = "err_name";
pub const FIELD_ERR_CATEGORY: &str = "err_category";
pub const FIELD_ERR_SEVERITY: &str = "err_severity";
pub const FIELD_IS_SYSTEM: &str = "is_system";
pub const FIELD_MESSAGE: &str = "message";

// Dispatch fields
pub const FIELD_MAPPER: &str = "mapper";
pub const FIELD_HOOK_EVENT: &str = "hook_event";
pub const FIELD_PANIC: &str = "panic";

// Hook snapshot keys
pub const SNAPSHOT_ID: &str = "id";
pub const SNAPSHOT_CATEGORY: &str = "category";
pub const SNAPSHOT_SEVERITY: &str = "severity";
pub const SNAPSHOT_MESSAGE: &str = "message";
pub const SNAPSHOT_IS_SYSTEM: &str = "is_system";

// Well-known metadata keys
pub const META_TRACES: &str = "traces";
pub const META_DEBUG: &str = "debug";
pub const META_VALIDATIONS: &str = "validations";

// Canonical event names
pub const EVENT_ERROR_LOGGED: &str = "error_logged";
pub const EVENT_ERROR_TRACED: &str = "error_traced";
pub const EVENT_HOOK_PANIC: &str = "hook_panic";
pub const EVENT_MAPPER_PANIC: &str = "mapper_panic";
pub const EVENT_MAPPER_CONTRACT_VIOLATION: &str = "mapper_contract_violation";
pub const EVENT_UNMAPPED: &str = "unmapped";
pub const EVENT_STATIC_MUTATION: &str = "static_mutation";
pub const EVENT_RUNTIME_ALLOCATION: &str = "runtime_allocation";
pub const EVENT_REDUNDANT_FROM: &str = "redundant_from";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_keys_are_distinct() {
        let keys = [
            SNAPSHOT_ID,
            SNAPSHOT_CATEGORY,
            SNAPSHOT_SEVERITY,
            SNAPSHOT_MESSAGE,
            SNAPSHOT_IS_SYSTEM,
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_ERROR_LOGGED, EVENT_ERROR_TRACED);
        assert_ne!(EVENT_HOOK_PANIC, EVENT_MAPPER_PANIC);
    }
}
