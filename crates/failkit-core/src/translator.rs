//! Translators turn trusted `FailError`s into other representations
//!
//! A translator is registered on a registry under a unique name. Only errors
//! whose identifier was allocated and registered on that registry may be
//! translated. A panicking translator surfaces as `FailTranslatorPanicked`.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::errors::Result;
use crate::hooks::HookEvent;
use crate::id::internal_ids;
use crate::locks;
use crate::model::FailError;
use crate::registry::Registry;

pub trait Translator: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this translator handles `err`
    fn supports(&self, err: &FailError) -> bool;

    /// # Errors
    ///
    /// Translator-specific; returned to the caller unchanged.
    fn translate(&self, err: &FailError) -> Result<Box<dyn Any + Send>>;
}

impl Registry {
    /// # Errors
    ///
    /// Returns `FailTranslatorNameEmpty` for an empty name and
    /// `FailTranslatorAlreadyRegistered` when the name is taken.
    pub fn register_translator(&self, translator: impl Translator + 'static) -> Result<()> {
        self.register_shared_translator(Arc::new(translator))
    }

    /// # Errors
    ///
    /// Same as [`Registry::register_translator`].
    pub fn register_shared_translator(&self, translator: Arc<dyn Translator>) -> Result<()> {
        let ids = internal_ids();
        let name = translator.name().to_string();
        if name.trim().is_empty() {
            return Err(self.sentinel(&ids.translator_name_empty));
        }

        let mut translators = locks::write(&self.inner.translators);
        if translators.contains_key(&name) {
            drop(translators);
            return Err(self
                .sentinel(&ids.translator_already_registered)
                .annotate("translator", name));
        }
        translators.insert(name, translator);
        Ok(())
    }

    /// Names of registered translators, sorted
    pub fn translator_names(&self) -> Vec<String> {
        let mut names: Vec<String> = locks::read(&self.inner.translators).keys().cloned().collect();
        names.sort();
        names
    }

    /// Run the translator called `name` on `err`; fires `translate` on success
    ///
    /// # Errors
    ///
    /// Returns a library sentinel when `err` is untrusted
    /// (`FailTranslateUntrustedError`), the translator is unknown
    /// (`FailTranslatorNotFound`), does not support `err`
    /// (`FailTranslateUnsupportedError`) or panics (`FailTranslatorPanicked`).
    /// Errors returned by the translator itself pass through.
    pub fn translate(&self, err: &FailError, name: &str) -> Result<Box<dyn Any + Send>> {
        let ids = internal_ids();

        if !err.id().is_allocated() || !self.is_registered(err.id()) {
            return Err(self
                .sentinel(&ids.translate_untrusted)
                .annotate("requested_id", err.id().rendered()));
        }

        let translator = locks::read(&self.inner.translators).get(name).cloned();
        let Some(translator) = translator else {
            return Err(self
                .sentinel(&ids.translator_not_found)
                .annotate("translator", name));
        };

        if !translator.supports(err) {
            return Err(self
                .sentinel(&ids.translate_unsupported)
                .annotate("translator", name)
                .annotate("requested_id", err.id().rendered()));
        }

        let value = match catch_unwind(AssertUnwindSafe(|| translator.translate(err))) {
            Ok(result) => result?,
            Err(payload) => {
                return Err(self
                    .sentinel(&ids.translator_panicked)
                    .annotate("translator", name)
                    .annotate("panic", locks::panic_message(payload.as_ref())));
            }
        };

        let mut data = err.snapshot();
        data.insert("translator".to_string(), name.into());
        self.inner.hooks.run_error(HookEvent::Translate, err, &data);

        Ok(value)
    }

    /// [`Registry::translate`], then downcast to `T`
    ///
    /// # Errors
    ///
    /// Everything `translate` returns, plus `FailTranslateWrongType` when the
    /// translator produced something other than `T`.
    pub fn translate_as<T: Any + Send>(&self, err: &FailError, name: &str) -> Result<T> {
        let value = self.translate(err, name)?;
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(self
                .sentinel(&internal_ids().translate_wrong_type)
                .annotate("translator", name)
                .annotate("expected", std::any::type_name::<T>())),
        }
    }
}
