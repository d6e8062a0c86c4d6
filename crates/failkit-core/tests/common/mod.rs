use std::sync::atomic::{AtomicUsize, Ordering};

use failkit_core::{Allocator, ErrorDefinition, ErrorId, ErrorKind, Registry};

static NEXT_REGISTRY: AtomicUsize = AtomicUsize::new(0);

/// Create a registry with a name no other test in this binary uses
#[allow(dead_code)]
pub fn fresh_registry(prefix: &str) -> Registry {
    let n = NEXT_REGISTRY.fetch_add(1, Ordering::SeqCst);
    Registry::new(format!("{}-{}", prefix, n)).expect("registry name should be unique")
}

/// Allocate on `allocator` and register a template on `registry` in one step
#[allow(dead_code)]
pub fn define(
    allocator: &Allocator,
    registry: &Registry,
    category: &str,
    sequence: u32,
    kind: ErrorKind,
    name: &str,
    message: &str,
) -> ErrorId {
    let id = allocator.allocate(1, category, sequence, kind, name);
    registry
        .register(ErrorDefinition::new(id.clone(), message))
        .expect("allocated id should register");
    id
}

/// A plain foreign error
#[derive(Debug)]
#[allow(dead_code)]
pub struct Upstream(pub &'static str);

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "upstream: {}", self.0)
    }
}

impl std::error::Error for Upstream {}
