//! The canonical error instance

use std::error::Error;
use std::fmt;
use std::sync::{Arc, Weak};

use failkit_core_types::schema::{
    META_DEBUG, META_TRACES, META_VALIDATIONS, SNAPSHOT_CATEGORY, SNAPSHOT_ID, SNAPSHOT_IS_SYSTEM,
    SNAPSHOT_MESSAGE, SNAPSHOT_SEVERITY,
};
use failkit_core_types::{MetaMap, MetaValue, ValidationRecord};

use crate::config::FALLBACK_LOCALE;
use crate::errors::SharedError;
use crate::hooks::{HookData, HookEvent};
use crate::id::ErrorId;
use crate::registry::{default_registry, Registry, RegistryInner};

/// Error value produced by a registry
///
/// Instances are copies of a registered template. They remember which
/// registry produced them, so lifecycle events (`log`, `record`, pattern
/// matches, translations) reach that registry's listeners.
#[derive(Clone)]
pub struct FailError {
    pub(crate) id: ErrorId,
    pub(crate) message: String,
    pub(crate) internal_message: Option<String>,
    pub(crate) cause: Option<SharedError>,
    pub(crate) is_system: bool,
    pub(crate) meta: MetaMap,
    pub(crate) locale: Option<String>,
    pub(crate) args: Vec<MetaValue>,
    pub(crate) registry: Weak<RegistryInner>,
    pub(crate) created_by_from: bool,
}

impl FailError {
    pub(crate) fn raw(
        id: ErrorId,
        message: impl Into<String>,
        is_system: bool,
        registry: Weak<RegistryInner>,
    ) -> Self {
        Self {
            id,
            message: message.into(),
            internal_message: None,
            cause: None,
            is_system,
            meta: MetaMap::new(),
            locale: None,
            args: Vec::new(),
            registry,
            created_by_from: false,
        }
    }

    /// Set metadata without the static-mutation check
    pub(crate) fn annotate(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }

    pub(crate) fn belongs_to(&self, inner: &Arc<RegistryInner>) -> bool {
        std::ptr::eq(self.registry.as_ptr(), Arc::as_ptr(inner))
    }

    pub fn id(&self) -> &ErrorId {
        &self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn internal_message(&self) -> Option<&str> {
        self.internal_message.as_deref()
    }

    pub fn cause(&self) -> Option<&SharedError> {
        self.cause.as_ref()
    }

    pub fn is_system(&self) -> bool {
        self.is_system
    }

    pub fn meta(&self) -> &MetaMap {
        &self.meta
    }

    pub fn meta_value(&self, key: &str) -> Option<&MetaValue> {
        self.meta.get(key)
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn args(&self) -> &[MetaValue] {
        &self.args
    }

    /// True when this instance came out of the mapper chain
    pub fn created_by_from(&self) -> bool {
        self.created_by_from
    }

    pub fn trace_entries(&self) -> &[String] {
        self.meta
            .get(META_TRACES)
            .and_then(MetaValue::as_string_list)
            .unwrap_or(&[])
    }

    pub fn debug_entries(&self) -> &[String] {
        self.meta
            .get(META_DEBUG)
            .and_then(MetaValue::as_string_list)
            .unwrap_or(&[])
    }

    pub fn validation_records(&self) -> &[ValidationRecord] {
        self.meta
            .get(META_VALIDATIONS)
            .and_then(MetaValue::as_validations)
            .unwrap_or(&[])
    }

    /// Registry that produced this instance, if it is still alive
    pub fn registry(&self) -> Option<Registry> {
        self.registry.upgrade().map(Registry::from_inner)
    }

    /// Owning registry, or the default registry once the owner is gone
    pub(crate) fn owning_registry(&self) -> Registry {
        self.registry().unwrap_or_else(|| default_registry().clone())
    }

    /// Instance locale, then the registry default, then `en-US`
    pub fn effective_locale(&self) -> String {
        if let Some(locale) = &self.locale {
            return locale.clone();
        }
        self.owning_registry()
            .default_locale()
            .unwrap_or_else(|| FALLBACK_LOCALE.to_string())
    }

    /// Identity fields handed to lifecycle listeners
    pub fn snapshot(&self) -> HookData {
        let mut data = HookData::new();
        data.insert(SNAPSHOT_ID.to_string(), self.id.rendered().into());
        data.insert(SNAPSHOT_CATEGORY.to_string(), self.id.category().into());
        data.insert(SNAPSHOT_SEVERITY.to_string(), self.id.severity().into());
        data.insert(SNAPSHOT_MESSAGE.to_string(), self.message.as_str().into());
        data.insert(SNAPSHOT_IS_SYSTEM.to_string(), self.is_system.into());
        data
    }

    /// Fire the `log` event on the owning registry
    pub fn log(self) -> Self {
        let data = self.snapshot();
        self.owning_registry()
            .hooks()
            .run_error(HookEvent::Log, &self, &data);
        self
    }

    /// Fire the `trace` event on the owning registry
    pub fn record(self) -> Self {
        let data = self.snapshot();
        self.owning_registry()
            .hooks()
            .run_error(HookEvent::Trace, &self, &data);
        self
    }
}

impl fmt::Display for FailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, ": {}", cause)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailError")
            .field("id", &self.id)
            .field("message", &self.message)
            .field("internal_message", &self.internal_message)
            .field("cause", &self.cause.as_ref().map(|c| c.to_string()))
            .field("is_system", &self.is_system)
            .field("meta", &self.meta)
            .field("locale", &self.locale)
            .field("created_by_from", &self.created_by_from)
            .finish()
    }
}

impl Error for FailError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| &**cause as &(dyn Error + 'static))
    }
}

/// First `FailError` in the source chain of `err`
pub fn as_fail<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a FailError> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(fail) = e.downcast_ref::<FailError>() {
            return Some(fail);
        }
        current = e.source();
    }
    None
}

/// True if any `FailError` in the source chain of `err` carries `id`
pub fn is(err: &(dyn Error + 'static), id: &ErrorId) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.downcast_ref::<FailError>().is_some_and(|fail| fail.id() == id) {
            return true;
        }
        current = e.source();
    }
    false
}
