//! Chainable setters for `FailError`
//!
//! Message and metadata setters go through `rejects_mutation` first; on a
//! static-kind instance they are ignored (the instance comes back unchanged),
//! allowed, or fatal, depending on the owning registry's policy.

use std::sync::Arc;

use failkit_core_types::schema::{EVENT_STATIC_MUTATION, META_DEBUG, META_TRACES, META_VALIDATIONS};
use failkit_core_types::{MetaMap, MetaValue, ValidationRecord};

use super::FailError;
use crate::errors::{BoxError, SharedError};
use crate::log_internal;
use crate::policy::{self, MutationVerdict};

impl FailError {
    /// Static-mutation check for the builder layer
    ///
    /// Returns `true` when the change named by `op` must be skipped. Dynamic
    /// instances never reject.
    ///
    /// # Panics
    ///
    /// Panics when the registry policy is `Panic` and runtime panics are
    /// permitted process-wide.
    pub fn rejects_mutation(&self, op: &str) -> bool {
        if !self.id.is_static() {
            return false;
        }

        let registry = self.owning_registry();
        match registry
            .static_mutation()
            .verdict(policy::runtime_panics_allowed())
        {
            MutationVerdict::Proceed => {
                log_internal!(
                    registry,
                    EVENT_STATIC_MUTATION,
                    err_id = %self.id,
                    op,
                    "allowing mutation of static error"
                );
                false
            }
            MutationVerdict::Ignore => {
                log_internal!(
                    registry,
                    EVENT_STATIC_MUTATION,
                    err_id = %self.id,
                    op,
                    "ignored mutation of static error"
                );
                true
            }
            MutationVerdict::Abort => {
                panic!("{}: cannot apply {} to static error", self.id, op)
            }
        }
    }

    pub fn msg(mut self, message: impl Into<String>) -> Self {
        if !self.rejects_mutation("msg") {
            self.message = message.into();
        }
        self
    }

    /// Message for operators, never shown to end users
    pub fn internal(mut self, message: impl Into<String>) -> Self {
        if !self.rejects_mutation("internal") {
            self.internal_message = Some(message.into());
        }
        self
    }

    pub fn with_cause(self, cause: impl Into<BoxError>) -> Self {
        let cause: BoxError = cause.into();
        self.with_shared_cause(Arc::from(cause))
    }

    pub fn with_shared_cause(mut self, cause: SharedError) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        if !self.rejects_mutation("with_meta") {
            self.meta.insert(key.into(), value.into());
        }
        self
    }

    /// Insert every entry of `meta`, overwriting existing keys
    pub fn merge_meta(mut self, meta: MetaMap) -> Self {
        if !self.rejects_mutation("merge_meta") {
            self.meta.extend(meta);
        }
        self
    }

    pub fn trace(self, entry: impl Into<String>) -> Self {
        self.traces([entry])
    }

    pub fn traces<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.rejects_mutation("traces") {
            append_strings(&mut self.meta, META_TRACES, entries);
        }
        self
    }

    pub fn debug(mut self, entry: impl Into<String>) -> Self {
        if !self.rejects_mutation("debug") {
            append_strings(&mut self.meta, META_DEBUG, [entry]);
        }
        self
    }

    pub fn validation(self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.validations([ValidationRecord::new(field, message)])
    }

    pub fn validations(mut self, records: impl IntoIterator<Item = ValidationRecord>) -> Self {
        if self.rejects_mutation("validations") {
            return self;
        }
        match self.meta.get_mut(META_VALIDATIONS) {
            Some(MetaValue::ValidationList(existing)) => existing.extend(records),
            _ => {
                self.meta.insert(
                    META_VALIDATIONS.to_string(),
                    MetaValue::ValidationList(records.into_iter().collect()),
                );
            }
        }
        self
    }

    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    pub fn domain(mut self) -> Self {
        self.is_system = false;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Arguments for the out-of-scope formatting layer
    pub fn with_args<I, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<MetaValue>,
    {
        if !self.rejects_mutation("with_args") {
            self.args = args.into_iter().map(Into::into).collect();
        }
        self
    }
}

fn append_strings<I, S>(meta: &mut MetaMap, key: &str, entries: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
    match meta.get_mut(key) {
        Some(MetaValue::StringList(existing)) => existing.extend(entries),
        _ => {
            meta.insert(key.to_string(), MetaValue::StringList(entries));
        }
    }
}
