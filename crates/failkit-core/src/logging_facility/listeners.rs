//! Hook listeners that forward error lifecycle events to `tracing`
//!
//! `install` wires a registry's `log` and `trace` events to structured log
//! lines. System errors log at `error`, domain errors at `warn`; traces log
//! at `debug`.

use failkit_core_types::schema::{EVENT_ERROR_LOGGED, EVENT_ERROR_TRACED};

use crate::log_hook_event;
use crate::registry::Registry;

pub fn install(registry: &Registry) {
    let name = registry.name().to_string();
    registry.hooks().on_log(move |err, _data| {
        if err.is_system() {
            log_hook_event!(error, EVENT_ERROR_LOGGED, *err, registry = %name);
        } else {
            log_hook_event!(warn, EVENT_ERROR_LOGGED, *err, registry = %name);
        }
    });

    let name = registry.name().to_string();
    registry.hooks().on_trace(move |err, _data| {
        log_hook_event!(debug, EVENT_ERROR_TRACED, *err, registry = %name);
    });
}
