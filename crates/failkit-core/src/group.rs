//! Collecting several errors into one
//!
//! Every added error goes through the owning registry's `from_error`, so
//! foreign errors are mapped the same way a single `?` site would map them.

use std::error::Error;
use std::fmt;

use crate::errors::BoxError;
use crate::model::FailError;
use crate::registry::{default_registry, Registry};

#[derive(Debug, Clone)]
pub struct ErrorGroup {
    registry: Registry,
    errors: Vec<FailError>,
}

impl ErrorGroup {
    /// Group that maps through the default registry
    pub fn new() -> Self {
        Self::for_registry(default_registry())
    }

    pub fn for_registry(registry: &Registry) -> Self {
        Self {
            registry: registry.clone(),
            errors: Vec::new(),
        }
    }

    /// Map `err` through the registry and keep the result
    pub fn add(&mut self, err: impl Into<BoxError>) {
        let fail = self.registry.from_error(err);
        self.errors.push(fail);
    }

    /// Add the error of a failed result; `Ok` values are dropped
    pub fn add_result<T, E: Into<BoxError>>(&mut self, result: std::result::Result<T, E>) {
        if let Err(err) = result {
            self.add(err);
        }
    }

    pub fn errors(&self) -> &[FailError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn first(&self) -> Option<&FailError> {
        self.errors.first()
    }

    /// `Ok` when empty, the lone error when there is one, otherwise the group
    ///
    /// # Errors
    ///
    /// Returns the collected error(s) when the group is not empty
    pub fn into_result(mut self) -> std::result::Result<(), BoxError> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(Box::new(self.errors.remove(0))),
            _ => Err(Box::new(self)),
        }
    }
}

impl Default for ErrorGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => Ok(()),
            [only] => write!(f, "{}", only),
            [first, rest @ ..] => write!(
                f,
                "{} errors occurred: {} (and {} more)",
                self.errors.len(),
                first,
                rest.len()
            ),
        }
    }
}

impl Error for ErrorGroup {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.errors.first().map(|e| e as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{Allocator, ErrorKind};
    use crate::mapper::IdMapper;
    use crate::model::{as_fail, ErrorDefinition};

    #[derive(Debug)]
    struct Disk(&'static str);

    impl fmt::Display for Disk {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "disk: {}", self.0)
        }
    }

    impl Error for Disk {}

    fn setup(name: &str) -> (Registry, FailError, FailError) {
        let allocator = Allocator::new();
        let registry = Registry::new(name).unwrap();
        let full = allocator.allocate(1, "GRP", 0, ErrorKind::Static, "GroupDiskFull");
        let slow = allocator.allocate(2, "GRP", 0, ErrorKind::Dynamic, "GroupUpstreamSlow");
        registry
            .register(ErrorDefinition::new(full.clone(), "disk full"))
            .unwrap();
        registry
            .register(ErrorDefinition::new(slow.clone(), "upstream slow"))
            .unwrap();
        registry.add_mapper(IdMapper::for_type::<Disk>("disk", 10, full.clone()));
        let a = registry.new_error(&full);
        let b = registry.new_error(&slow);
        (registry, a, b)
    }

    #[test]
    fn test_empty_group_is_ok() {
        let (registry, _, _) = setup("group-empty");
        let mut group = ErrorGroup::for_registry(&registry);
        group.add_result(Ok::<u8, Disk>(1));

        assert!(!group.has_errors());
        assert!(group.first().is_none());
        assert_eq!(group.to_string(), "");
        assert!(group.into_result().is_ok());
    }

    #[test]
    fn test_single_error_is_returned_unwrapped() {
        let (registry, a, _) = setup("group-single");
        let mut group = ErrorGroup::for_registry(&registry);
        group.add(a.clone());

        assert_eq!(group.to_string(), a.to_string());
        let err = group.into_result().unwrap_err();
        let fail = err.downcast_ref::<FailError>().unwrap();
        assert_eq!(fail.id(), a.id());
    }

    #[test]
    fn test_multiple_errors_summarised_and_foreign_mapped() {
        let (registry, a, b) = setup("group-many");
        let mut group = ErrorGroup::for_registry(&registry);
        group.add(b.clone());
        group.add_result(Err::<(), _>(Disk("sector 7")));
        group.add(a.clone());

        assert_eq!(group.len(), 3);
        // the foreign error went through the mapper chain
        assert_eq!(group.errors()[1].id(), a.id());
        assert!(group.errors()[1].created_by_from());
        assert_eq!(
            group.to_string(),
            format!("3 errors occurred: {} (and 2 more)", b)
        );

        let err = group.into_result().unwrap_err();
        let grouped = err.downcast_ref::<ErrorGroup>().unwrap();
        assert_eq!(grouped.first().map(FailError::id), Some(b.id()));
        assert_eq!(as_fail(&*err).map(FailError::id), Some(b.id()));
    }
}
