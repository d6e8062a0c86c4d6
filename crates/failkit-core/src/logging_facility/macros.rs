//! Canonical logging macros
//!
//! These macros keep the field names of error-related log lines consistent.

/// Log one structured event describing a `FailError`
///
/// The first argument is the `tracing` level macro to use.
///
/// # Example
///
/// ```
/// # use failkit_core::{log_hook_event, Allocator, ErrorDefinition, ErrorKind, Registry};
/// let allocator = Allocator::new();
/// let id = allocator.allocate(2, "DISK", 0, ErrorKind::Dynamic, "DiskFull");
/// let registry = Registry::new("macro-doc").unwrap();
/// registry.register(ErrorDefinition::new(id.clone(), "disk full").system()).unwrap();
///
/// let err = registry.new_error(&id);
/// log_hook_event!(error, "error_logged", err);
/// ```
#[macro_export]
macro_rules! log_hook_event {
    ($level:ident, $event:expr, $err:expr) => {{
        let err: &$crate::FailError = &$err;
        tracing::$level!(
            component = module_path!(),
            event = $event,
            err_id = %err.id(),
            err_name = err.id().name(),
            err_category = err.id().category(),
            err_severity = err.id().severity(),
            is_system = err.is_system(),
            message = err.message(),
        );
    }};
    ($level:ident, $event:expr, $err:expr, $($field:tt)*) => {{
        let err: &$crate::FailError = &$err;
        tracing::$level!(
            component = module_path!(),
            event = $event,
            err_id = %err.id(),
            err_name = err.id().name(),
            err_category = err.id().category(),
            err_severity = err.id().severity(),
            is_system = err.is_system(),
            message = err.message(),
            $($field)*
        );
    }};
}

/// Log a library diagnostic, only when the registry's internal logging is on
///
/// # Example
///
/// ```
/// # use failkit_core::{log_internal, Registry};
/// let registry = Registry::new("internal-doc").unwrap();
/// registry.set_internal_logging(true);
/// log_internal!(registry, "unmapped", mapper = "none", "nothing matched");
/// ```
#[macro_export]
macro_rules! log_internal {
    ($registry:expr, $event:expr, $($arg:tt)+) => {
        if $registry.internal_logging() {
            tracing::warn!(
                component = module_path!(),
                event = $event,
                registry = $registry.name(),
                $($arg)+
            );
        }
    };
}
