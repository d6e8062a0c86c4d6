use std::sync::Arc;

use failkit_core_types::schema::{
    EVENT_MAPPER_CONTRACT_VIOLATION, EVENT_REDUNDANT_FROM, EVENT_UNMAPPED,
};

use super::Registry;
use crate::errors::{BoxError, SharedError};
use crate::hooks::HookEvent;
use crate::id::{internal_ids, ErrorId};
use crate::log_internal;
use crate::mapper::MapOutcome;
use crate::model::FailError;

impl Registry {
    /// Convert any error into a `FailError`
    ///
    /// A `FailError` produced by this registry comes back unchanged and no
    /// hooks fire. Anything else fires `map` and walks the mapper chain:
    /// a match fires `map_success`; no match (or no mappers at all) yields a
    /// sentinel wrapping the input as its cause and fires `map_failure`.
    pub fn from_error(&self, err: impl Into<BoxError>) -> FailError {
        let err: BoxError = err.into();

        let foreign: SharedError = match err.downcast::<FailError>() {
            Ok(fail) if fail.belongs_to(&self.inner) => {
                log_internal!(
                    self,
                    EVENT_REDUNDANT_FROM,
                    err_id = %fail.id(),
                    "from_error called on an error this registry already owns"
                );
                return *fail;
            }
            Ok(fail) => Arc::new(*fail),
            Err(other) => Arc::from(other),
        };

        self.inner.hooks.run_foreign(HookEvent::Map, &foreign);

        if self.inner.mappers.is_empty() {
            return self.unmapped(&internal_ids().no_mapper_registered, foreign);
        }

        match self.inner.mappers.dispatch(self, &foreign) {
            Some(MapOutcome { error, mapper }) => {
                if !error.id().is_allocated() || !self.is_registered(error.id()) {
                    log_internal!(
                        self,
                        EVENT_MAPPER_CONTRACT_VIOLATION,
                        mapper = %mapper,
                        err_id = %error.id(),
                        "mapper returned an untrusted error"
                    );
                }

                let mut error = error;
                error.registry = Arc::downgrade(&self.inner);
                error.created_by_from = true;

                self.inner.hooks.run_map_success(&foreign, &error);
                error
            }
            None => self.unmapped(&internal_ids().not_matched_in_any_mapper, foreign),
        }
    }

    fn unmapped(&self, id: &ErrorId, foreign: SharedError) -> FailError {
        log_internal!(
            self,
            EVENT_UNMAPPED,
            err_id = %id,
            cause = %foreign,
            "no mapper matched"
        );
        self.inner.hooks.run_foreign(HookEvent::MapFailure, &foreign);

        let mut err = self.sentinel(id).with_shared_cause(foreign);
        err.created_by_from = true;
        err
    }
}
