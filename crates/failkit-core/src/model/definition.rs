use failkit_core_types::{MetaMap, MetaValue};

use crate::id::ErrorId;

/// Registration input: one canonical template per identifier
///
/// # Example
/// ```
/// use failkit_core::{Allocator, ErrorDefinition, ErrorKind};
///
/// let allocator = Allocator::new();
/// let id = allocator.allocate(1, "AUTH", 0, ErrorKind::Static, "AuthLocked");
/// let def = ErrorDefinition::new(id, "account locked").system().with_meta("retry", false);
/// assert!(def.is_system);
/// ```
#[derive(Debug, Clone)]
pub struct ErrorDefinition {
    pub id: ErrorId,
    pub default_message: String,
    pub is_system: bool,
    pub meta: MetaMap,
    pub default_args: Vec<MetaValue>,
}

impl ErrorDefinition {
    /// Domain error with no metadata
    pub fn new(id: ErrorId, default_message: impl Into<String>) -> Self {
        Self {
            id,
            default_message: default_message.into(),
            is_system: false,
            meta: MetaMap::new(),
            default_args: Vec::new(),
        }
    }

    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    pub fn domain(mut self) -> Self {
        self.is_system = false;
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn with_args<I, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<MetaValue>,
    {
        self.default_args = args.into_iter().map(Into::into).collect();
        self
    }
}
