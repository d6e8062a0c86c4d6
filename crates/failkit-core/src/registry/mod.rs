//! Definition registry
//!
//! A `Registry` stores one template per rendered identifier and owns a mapper
//! chain, a hook engine, translators and its configuration. Registries are
//! cheap handles (`Arc` inside); clones share state. Two registries never
//! share state, so tests build their own instead of touching the default.

mod dispatch;
mod sentinels;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use failkit_core_types::{MetaMap, MetaValue};

use crate::config::RegistryConfig;
use crate::errors::{BoxError, Result};
use crate::hooks::{HookEngine, HookEvent};
use crate::id::{internal_ids, ErrorId};
use crate::locks;
use crate::mapper::{Mapper, MapperChain};
use crate::model::{ErrorDefinition, FailError};
use crate::policy::StaticMutationPolicy;
use crate::translator::Translator;

/// Name of the process-wide registry
pub const DEFAULT_REGISTRY_NAME: &str = "default";

fn claimed_names() -> &'static Mutex<HashSet<String>> {
    static NAMES: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();
    NAMES.get_or_init(|| Mutex::new(HashSet::new()))
}

pub(crate) struct RegistryInner {
    name: String,
    templates: RwLock<HashMap<String, FailError>>,
    pub(crate) mappers: MapperChain,
    pub(crate) hooks: HookEngine,
    pub(crate) translators: RwLock<HashMap<String, Arc<dyn Translator>>>,
    config: RwLock<RegistryConfig>,
}

impl Drop for RegistryInner {
    fn drop(&mut self) {
        locks::lock(claimed_names()).remove(&self.name);
    }
}

#[derive(Clone)]
pub struct Registry {
    pub(crate) inner: Arc<RegistryInner>,
}

impl Registry {
    /// Create an independent registry with default configuration
    ///
    /// # Errors
    ///
    /// Returns the `FailRegistryAlreadyRegistered` sentinel if another live
    /// registry already uses `name`. The default registry's name is always
    /// taken.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::with_config(name, RegistryConfig::default())
    }

    /// # Errors
    ///
    /// Same as [`Registry::new`].
    pub fn with_config(name: impl Into<String>, config: RegistryConfig) -> Result<Self> {
        let name = name.into();
        let claimed =
            name != DEFAULT_REGISTRY_NAME && locks::lock(claimed_names()).insert(name.clone());
        if !claimed {
            return Err(default_registry()
                .sentinel(&internal_ids().registry_already_registered)
                .annotate("registry", name));
        }
        Ok(Self::build(name, config))
    }

    fn build(name: String, config: RegistryConfig) -> Self {
        let registry = Self {
            inner: Arc::new(RegistryInner {
                hooks: HookEngine::new(name.clone()),
                name,
                templates: RwLock::new(HashMap::new()),
                mappers: MapperChain::new(),
                translators: RwLock::new(HashMap::new()),
                config: RwLock::new(config),
            }),
        };
        registry.install_sentinels();
        registry
    }

    pub(crate) fn from_inner(inner: Arc<RegistryInner>) -> Self {
        Self { inner }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn hooks(&self) -> &HookEngine {
        &self.inner.hooks
    }

    pub fn mappers(&self) -> &MapperChain {
        &self.inner.mappers
    }

    pub fn add_mapper(&self, mapper: impl Mapper + 'static) {
        self.inner.mappers.add(Arc::new(mapper));
    }

    pub fn add_shared_mapper(&self, mapper: Arc<dyn Mapper>) {
        self.inner.mappers.add(mapper);
    }

    /// Store the template for `def.id`; the first registration wins
    ///
    /// Fires `register_template` only when the template is actually stored.
    ///
    /// # Errors
    ///
    /// Returns the `FailIDNotAllocatedError` sentinel if `def.id` was not
    /// minted by an allocator.
    pub fn register(&self, def: ErrorDefinition) -> Result<()> {
        if !def.id.is_allocated() {
            return Err(self
                .sentinel(&internal_ids().id_not_allocated)
                .annotate("requested_id", def.id.rendered())
                .annotate("name", def.id.name()));
        }

        let template = self.template_from(def);
        let stored = {
            let mut templates = locks::write(&self.inner.templates);
            let key = template.id.rendered();
            if templates.contains_key(&key) {
                false
            } else {
                templates.insert(key, template.clone());
                true
            }
        };

        if stored {
            let data = template.snapshot();
            self.inner
                .hooks
                .run_error(HookEvent::RegisterTemplate, &template, &data);
        }
        Ok(())
    }

    /// Register every definition, collecting failures instead of stopping
    ///
    /// # Errors
    ///
    /// Returns the `FailRegisterManyError` aggregate. Its metadata holds
    /// `failures` (each failure rendered as text) and `failed_count`; its cause
    /// is the first failure.
    pub fn register_many(&self, defs: impl IntoIterator<Item = ErrorDefinition>) -> Result<()> {
        let mut total = 0usize;
        let mut failures = Vec::new();
        for def in defs {
            total += 1;
            if let Err(err) = self.register(def) {
                failures.push(err);
            }
        }

        if failures.is_empty() {
            return Ok(());
        }

        let rendered: Vec<String> = failures.iter().map(ToString::to_string).collect();
        let failed_count = failures.len();
        let first: BoxError = Box::new(failures.swap_remove(0));
        Err(self
            .sentinel(&internal_ids().register_many)
            .msg(format!("{} of {} registrations failed", failed_count, total))
            .annotate("failures", rendered)
            .annotate("failed_count", failed_count)
            .with_cause(first))
    }

    pub fn is_registered(&self, id: &ErrorId) -> bool {
        locks::read(&self.inner.templates).contains_key(&id.rendered())
    }

    /// Copy of the stored template
    pub fn template(&self, id: &ErrorId) -> Option<FailError> {
        locks::read(&self.inner.templates).get(&id.rendered()).cloned()
    }

    /// Rendered identifiers of every stored template, sorted
    pub fn registered_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = locks::read(&self.inner.templates).keys().cloned().collect();
        ids.sort();
        ids
    }

    /// New instance of the template registered for `id`
    ///
    /// Fires `create` on success. An unregistered identifier yields the
    /// `FailUnregisteredError` sentinel, an unallocated one the
    /// `FailIDNotAllocatedError` sentinel; both carry `requested_id`.
    pub fn new_error(&self, id: &ErrorId) -> FailError {
        if !id.is_allocated() {
            return self
                .sentinel(&internal_ids().id_not_allocated)
                .annotate("requested_id", id.rendered());
        }

        match self.instantiate(id) {
            Some(err) => {
                let data = err.snapshot();
                self.inner.hooks.run_error(HookEvent::Create, &err, &data);
                err
            }
            None => self
                .sentinel(&internal_ids().unregistered)
                .annotate("requested_id", id.rendered()),
        }
    }

    /// Register (first wins) and return a fresh instance
    pub fn form(
        &self,
        id: &ErrorId,
        default_message: impl Into<String>,
        is_system: bool,
        meta: MetaMap,
    ) -> FailError {
        let mut def = ErrorDefinition::new(id.clone(), default_message);
        def.is_system = is_system;
        def.meta = meta;
        if let Err(err) = self.register(def) {
            return err;
        }
        self.new_error(id)
    }

    /// New instance with `cause`; fires `wrap`
    pub fn wrap(&self, id: &ErrorId, cause: impl Into<BoxError>) -> FailError {
        let err = self.new_error(id).with_cause(cause);
        let mut data = err.snapshot();
        if let Some(cause) = err.cause() {
            data.insert("cause".to_string(), MetaValue::String(cause.to_string()));
        }
        self.inner.hooks.run_error(HookEvent::Wrap, &err, &data);
        err
    }

    pub(crate) fn instantiate(&self, id: &ErrorId) -> Option<FailError> {
        locks::read(&self.inner.templates)
            .get(&id.rendered())
            .cloned()
    }

    fn template_from(&self, def: ErrorDefinition) -> FailError {
        let mut template = FailError::raw(
            def.id,
            def.default_message,
            def.is_system,
            Arc::downgrade(&self.inner),
        );
        template.meta = def.meta;
        template.args = def.default_args;
        template
    }

    pub fn config(&self) -> RegistryConfig {
        locks::read(&self.inner.config).clone()
    }

    pub fn set_config(&self, config: RegistryConfig) {
        *locks::write(&self.inner.config) = config;
    }

    pub fn internal_logging(&self) -> bool {
        locks::read(&self.inner.config).internal_logging
    }

    pub fn set_internal_logging(&self, enabled: bool) {
        locks::write(&self.inner.config).internal_logging = enabled;
    }

    pub fn static_mutation(&self) -> StaticMutationPolicy {
        locks::read(&self.inner.config).static_mutation
    }

    pub fn set_static_mutation(&self, policy: StaticMutationPolicy) {
        locks::write(&self.inner.config).static_mutation = policy;
    }

    pub fn default_locale(&self) -> Option<String> {
        locks::read(&self.inner.config).default_locale.clone()
    }

    pub fn set_default_locale(&self, locale: Option<String>) {
        locks::write(&self.inner.config).default_locale = locale;
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.inner.name)
            .field("templates", &locks::read(&self.inner.templates).len())
            .field("mappers", &self.inner.mappers)
            .field("hooks", &self.inner.hooks)
            .finish()
    }
}

/// The process-wide registry, configured from the environment at first use
pub fn default_registry() -> &'static Registry {
    static DEFAULT: OnceLock<Registry> = OnceLock::new();
    DEFAULT.get_or_init(|| {
        Registry::build(DEFAULT_REGISTRY_NAME.to_string(), RegistryConfig::from_env())
    })
}
