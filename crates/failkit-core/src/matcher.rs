//! Pattern matching over error identities
//!
//! ```
//! use failkit_core::{Allocator, ErrorDefinition, ErrorKind, ErrorMatcher, Registry};
//!
//! let allocator = Allocator::new();
//! let locked = allocator.allocate(1, "AUTH", 0, ErrorKind::Static, "AuthLocked");
//! let registry = Registry::new("matcher-doc").unwrap();
//! registry.register(ErrorDefinition::new(locked.clone(), "locked")).unwrap();
//!
//! let err = registry.new_error(&locked);
//! let status = ErrorMatcher::new(&err)
//!     .case(&locked, |_| 423)
//!     .case_system(|_| 500)
//!     .default(|_| 400);
//! assert_eq!(status, 423);
//! ```

use std::error::Error;

use crate::hooks::HookEvent;
use crate::id::ErrorId;
use crate::model::{as_fail, FailError};

/// First matching case wins; later cases are skipped
pub struct ErrorMatcher<'a, T> {
    err: &'a (dyn Error + 'static),
    fail: Option<&'a FailError>,
    result: Option<T>,
}

impl<'a, T> ErrorMatcher<'a, T> {
    pub fn new(err: &'a (dyn Error + 'static)) -> Self {
        Self {
            err,
            fail: as_fail(err),
            result: None,
        }
    }

    fn try_case(
        mut self,
        label: String,
        matches: impl FnOnce(&FailError) -> bool,
        f: impl FnOnce(&FailError) -> T,
    ) -> Self {
        if self.result.is_some() {
            return self;
        }
        let Some(fail) = self.fail else {
            return self;
        };
        if matches(fail) {
            let mut data = fail.snapshot();
            data.insert("case".to_string(), label.into());
            fail.owning_registry()
                .hooks()
                .run_error(HookEvent::PatternMatch, fail, &data);
            self.result = Some(f(fail));
        }
        self
    }

    pub fn case(self, id: &ErrorId, f: impl FnOnce(&FailError) -> T) -> Self {
        self.try_case(id.rendered(), |e| e.id() == id, f)
    }

    pub fn case_any(self, ids: &[ErrorId], f: impl FnOnce(&FailError) -> T) -> Self {
        let label = ids
            .iter()
            .map(ErrorId::rendered)
            .collect::<Vec<_>>()
            .join("|");
        self.try_case(label, |e| ids.contains(e.id()), f)
    }

    pub fn case_system(self, f: impl FnOnce(&FailError) -> T) -> Self {
        self.try_case("system".to_string(), FailError::is_system, f)
    }

    pub fn case_domain(self, f: impl FnOnce(&FailError) -> T) -> Self {
        self.try_case("domain".to_string(), |e| !e.is_system(), f)
    }

    /// Result of the matched case, or `f` applied to the original error
    pub fn default(self, f: impl FnOnce(&(dyn Error + 'static)) -> T) -> T {
        match self.result {
            Some(result) => result,
            None => f(self.err),
        }
    }

    /// Result of the matched case, if any
    pub fn finish(self) -> Option<T> {
        self.result
    }
}
