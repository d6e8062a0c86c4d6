//! Error-ID catalogues
//!
//! A catalogue is a TOML document listing identifiers to allocate:
//!
//! ```toml
//! [[ids]]
//! name = "AuthLocked"
//! category = "AUTH"
//! severity = 1
//! sequence = 0
//! kind = "static"
//! message = "account locked"
//! system = false
//! ```
//!
//! Applying a catalogue allocates every entry in order with
//! `Allocator::try_allocate`, registers templates for the accepted entries
//! and audits the allocator for gaps.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{AllocationError, ConfigError};
use crate::id::{Allocator, ErrorId, ErrorKind};
use crate::model::ErrorDefinition;
use crate::registry::Registry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub severity: u8,
    pub sequence: u32,
    pub kind: ErrorKind,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub system: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub ids: Vec<CatalogEntry>,
}

/// A rejected catalogue entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogViolation {
    pub name: String,
    pub error: AllocationError,
}

#[derive(Debug, Default)]
pub struct CatalogReport {
    /// Accepted identifiers, in catalogue order
    pub allocated: Vec<ErrorId>,
    pub violations: Vec<CatalogViolation>,
    /// Registration failures, rendered
    pub registration_failures: Vec<String>,
    /// Post-allocation gap audit
    pub audit: Option<AllocationError>,
}

impl CatalogReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.registration_failures.is_empty() && self.audit.is_none()
    }
}

impl Catalog {
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read and
    /// `ConfigError::Toml` if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Toml` if the text does not parse.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Allocate every entry, then register the accepted ones
    pub fn apply(&self, allocator: &Allocator, registry: &Registry) -> CatalogReport {
        let mut report = CatalogReport::default();
        let mut definitions = Vec::new();

        for entry in &self.ids {
            match allocator.try_allocate(
                entry.severity,
                &entry.category,
                entry.sequence,
                entry.kind,
                &entry.name,
            ) {
                Ok(id) => {
                    let message = entry.message.clone().unwrap_or_else(|| entry.name.clone());
                    let mut def = ErrorDefinition::new(id.clone(), message);
                    def.is_system = entry.system;
                    definitions.push(def);
                    report.allocated.push(id);
                }
                Err(error) => {
                    tracing::debug!(
                        component = module_path!(),
                        name = %entry.name,
                        %error,
                        "catalogue entry rejected"
                    );
                    report.violations.push(CatalogViolation {
                        name: entry.name.clone(),
                        error,
                    });
                }
            }
        }

        if let Err(err) = registry.register_many(definitions) {
            report.registration_failures = err
                .meta_value("failures")
                .and_then(|v| v.as_string_list())
                .map(<[String]>::to_vec)
                .unwrap_or_else(|| vec![err.to_string()]);
        }

        report.audit = allocator.validate().err();
        report
    }
}
