use std::sync::Arc;

use super::Registry;
use crate::id::{internal_ids, ErrorId};
use crate::locks;
use crate::model::FailError;

impl Registry {
    /// Store templates for every library identifier
    ///
    /// Runs before the registry is handed out, so no listener observes it.
    pub(super) fn install_sentinels(&self) {
        let weak = Arc::downgrade(&self.inner);
        let mut templates = locks::write(&self.inner.templates);
        for (id, message, is_system) in internal_ids().sentinel_templates() {
            templates
                .entry(id.rendered())
                .or_insert_with(|| FailError::raw(id.clone(), message, is_system, weak.clone()));
        }
    }

    /// Instance of a library identifier; never fires `create`
    pub(crate) fn sentinel(&self, id: &ErrorId) -> FailError {
        self.instantiate(id)
            .unwrap_or_else(|| FailError::raw(id.clone(), "", true, Arc::downgrade(&self.inner)))
    }
}
