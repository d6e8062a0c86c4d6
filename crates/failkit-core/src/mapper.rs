//! Priority-ordered mapper chain
//!
//! Mappers turn foreign errors into `FailError`s. The chain is kept sorted by
//! descending priority; equal priorities keep insertion order. `dispatch`
//! returns the first match.

use std::error::Error;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use failkit_core_types::schema::EVENT_MAPPER_PANIC;

use crate::errors::SharedError;
use crate::id::ErrorId;
use crate::locks;
use crate::model::FailError;
use crate::registry::Registry;

/// Converts foreign errors into canonical ones
///
/// Returning `None` means "not mine"; the chain moves on. A panic inside
/// `map` is logged and treated the same way.
pub trait Mapper: Send + Sync {
    fn name(&self) -> &str;

    /// Higher runs first
    fn priority(&self) -> i32;

    fn map(&self, registry: &Registry, err: &SharedError) -> Option<FailError>;
}

/// A successful dispatch
#[derive(Debug, Clone)]
pub struct MapOutcome {
    pub error: FailError,
    pub mapper: String,
}

#[derive(Default)]
pub struct MapperChain {
    mappers: RwLock<Vec<Arc<dyn Mapper>>>,
}

impl MapperChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert before the first mapper with strictly lower priority
    pub fn add(&self, mapper: Arc<dyn Mapper>) {
        let mut mappers = locks::write(&self.mappers);
        let priority = mapper.priority();
        let pos = mappers
            .iter()
            .position(|m| m.priority() < priority)
            .unwrap_or(mappers.len());
        mappers.insert(pos, mapper);
    }

    /// Mapper names in dispatch order
    pub fn names(&self) -> Vec<String> {
        locks::read(&self.mappers)
            .iter()
            .map(|m| m.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        locks::read(&self.mappers).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Walk the chain front to back and return the first match
    ///
    /// The list is copied under the read lock; mappers run outside it.
    pub fn dispatch(&self, registry: &Registry, err: &SharedError) -> Option<MapOutcome> {
        let mappers = locks::read(&self.mappers).clone();

        for mapper in mappers {
            match catch_unwind(AssertUnwindSafe(|| mapper.map(registry, err))) {
                Ok(Some(error)) => {
                    return Some(MapOutcome {
                        error,
                        mapper: mapper.name().to_string(),
                    })
                }
                Ok(None) => {}
                Err(payload) => {
                    tracing::error!(
                        component = module_path!(),
                        event = EVENT_MAPPER_PANIC,
                        registry = registry.name(),
                        mapper = mapper.name(),
                        panic = %locks::panic_message(payload.as_ref()),
                        "mapper panicked; treating as no match"
                    );
                }
            }
        }
        None
    }
}

impl fmt::Debug for MapperChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

type Predicate = Box<dyn Fn(&(dyn Error + Send + Sync + 'static)) -> bool + Send + Sync>;

/// Maps every foreign error accepted by `predicate` to one identifier
///
/// The foreign error becomes the cause. For dynamic identifiers its text is
/// also kept as a debug entry.
pub struct IdMapper {
    name: String,
    priority: i32,
    predicate: Predicate,
    id: ErrorId,
}

impl IdMapper {
    pub fn new(
        name: impl Into<String>,
        priority: i32,
        predicate: impl Fn(&(dyn Error + Send + Sync + 'static)) -> bool + Send + Sync + 'static,
        id: ErrorId,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            predicate: Box::new(predicate),
            id,
        }
    }

    /// Match foreign errors of concrete type `E`
    pub fn for_type<E: Error + Send + Sync + 'static>(
        name: impl Into<String>,
        priority: i32,
        id: ErrorId,
    ) -> Self {
        Self::new(name, priority, |err| err.is::<E>(), id)
    }
}

impl Mapper for IdMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn map(&self, registry: &Registry, err: &SharedError) -> Option<FailError> {
        if !(self.predicate)(&**err) {
            return None;
        }
        let mapped = registry
            .new_error(&self.id)
            .with_shared_cause(Arc::clone(err));
        if self.id.is_static() {
            Some(mapped)
        } else {
            Some(mapped.debug(err.to_string()))
        }
    }
}

type MapFn = Box<dyn Fn(&Registry, &SharedError) -> Option<FailError> + Send + Sync>;

/// Closure-backed mapper
pub struct FnMapper {
    name: String,
    priority: i32,
    f: MapFn,
}

impl FnMapper {
    pub fn new(
        name: impl Into<String>,
        priority: i32,
        f: impl Fn(&Registry, &SharedError) -> Option<FailError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            f: Box::new(f),
        }
    }
}

impl Mapper for FnMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn map(&self, registry: &Registry, err: &SharedError) -> Option<FailError> {
        (self.f)(registry, err)
    }
}
