//! Runtime policies
//!
//! Two switches decide whether misuse at run time may crash the process:
//! the per-registry `StaticMutationPolicy`, and the process-wide runtime-panic
//! flag. Fatal paths need both.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// What happens when code tries to change the message or metadata of a
/// static-kind error instance
///
/// # Example
/// ```
/// use failkit_core::policy::StaticMutationPolicy;
///
/// assert_eq!(StaticMutationPolicy::default(), StaticMutationPolicy::Reject);
/// assert_eq!("panic".parse::<StaticMutationPolicy>(), Ok(StaticMutationPolicy::Panic));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaticMutationPolicy {
    /// Ignore the mutation, logging it when internal logging is on
    #[default]
    Reject,
    /// Let the mutation through, logging it when internal logging is on
    Allow,
    /// Panic, but only when runtime panics are permitted; otherwise `Reject`
    Panic,
}

impl fmt::Display for StaticMutationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticMutationPolicy::Reject => write!(f, "reject"),
            StaticMutationPolicy::Allow => write!(f, "allow"),
            StaticMutationPolicy::Panic => write!(f, "panic"),
        }
    }
}

impl FromStr for StaticMutationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(StaticMutationPolicy::Reject),
            "allow" => Ok(StaticMutationPolicy::Allow),
            "panic" => Ok(StaticMutationPolicy::Panic),
            other => Err(format!(
                "unknown static mutation policy '{}' (expected reject, allow or panic)",
                other
            )),
        }
    }
}

static RUNTIME_PANICS: AtomicBool = AtomicBool::new(false);

/// Permit (or forbid) panics on runtime misuse, process-wide
pub fn set_runtime_panics(allow: bool) {
    RUNTIME_PANICS.store(allow, Ordering::SeqCst);
}

pub fn runtime_panics_allowed() -> bool {
    RUNTIME_PANICS.load(Ordering::SeqCst)
}

/// Outcome of the static-mutation check for one attempted change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationVerdict {
    Proceed,
    Ignore,
    Abort,
}

impl StaticMutationPolicy {
    /// Decide what a mutation of a static instance should do
    pub fn verdict(&self, runtime_panics: bool) -> MutationVerdict {
        match self {
            StaticMutationPolicy::Allow => MutationVerdict::Proceed,
            StaticMutationPolicy::Panic if runtime_panics => MutationVerdict::Abort,
            StaticMutationPolicy::Panic | StaticMutationPolicy::Reject => MutationVerdict::Ignore,
        }
    }
}
