//! Lifecycle hook engine
//!
//! Each registry owns one `HookEngine`. Listeners are kept per event in
//! registration order. `run_*` copies the listener list under a read lock and
//! calls every listener outside the lock, each behind its own unwind boundary:
//! a panicking listener is logged and the next one still runs.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use failkit_core_types::schema::EVENT_HOOK_PANIC;
use failkit_core_types::MetaMap;

use crate::errors::SharedError;
use crate::locks;
use crate::model::FailError;

/// Extra data passed to error listeners; at least the identity snapshot
pub type HookData = MetaMap;

pub type ErrorListener = Arc<dyn Fn(&FailError, &HookData) + Send + Sync>;
pub type ForeignListener = Arc<dyn Fn(&SharedError) + Send + Sync>;
pub type MapSuccessListener = Arc<dyn Fn(&SharedError, &FailError) + Send + Sync>;

/// Lifecycle points a listener can observe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    Create,
    Log,
    Trace,
    Map,
    Wrap,
    MapFailure,
    MapSuccess,
    RegisterTemplate,
    Translate,
    PatternMatch,
}

impl HookEvent {
    pub const ALL: [HookEvent; 10] = [
        HookEvent::Create,
        HookEvent::Log,
        HookEvent::Trace,
        HookEvent::Map,
        HookEvent::Wrap,
        HookEvent::MapFailure,
        HookEvent::MapSuccess,
        HookEvent::RegisterTemplate,
        HookEvent::Translate,
        HookEvent::PatternMatch,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::Create => "create",
            HookEvent::Log => "log",
            HookEvent::Trace => "trace",
            HookEvent::Map => "map",
            HookEvent::Wrap => "wrap",
            HookEvent::MapFailure => "map_failure",
            HookEvent::MapSuccess => "map_success",
            HookEvent::RegisterTemplate => "register_template",
            HookEvent::Translate => "translate",
            HookEvent::PatternMatch => "pattern_match",
        }
    }

    /// Listener shape this event calls
    pub fn expected_shape(&self) -> ListenerShape {
        match self {
            HookEvent::Map | HookEvent::MapFailure => ListenerShape::Foreign,
            HookEvent::MapSuccess => ListenerShape::MapSuccess,
            _ => ListenerShape::Error,
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback signature families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerShape {
    /// `Fn(&FailError, &HookData)`
    Error,
    /// `Fn(&SharedError)`
    Foreign,
    /// `Fn(&SharedError, &FailError)`
    MapSuccess,
}

/// A callback tagged with its signature
#[derive(Clone)]
pub enum Listener {
    Error(ErrorListener),
    Foreign(ForeignListener),
    MapSuccess(MapSuccessListener),
}

impl Listener {
    pub fn error(f: impl Fn(&FailError, &HookData) + Send + Sync + 'static) -> Self {
        Listener::Error(Arc::new(f))
    }

    pub fn foreign(f: impl Fn(&SharedError) + Send + Sync + 'static) -> Self {
        Listener::Foreign(Arc::new(f))
    }

    pub fn map_success(f: impl Fn(&SharedError, &FailError) + Send + Sync + 'static) -> Self {
        Listener::MapSuccess(Arc::new(f))
    }

    pub fn shape(&self) -> ListenerShape {
        match self {
            Listener::Error(_) => ListenerShape::Error,
            Listener::Foreign(_) => ListenerShape::Foreign,
            Listener::MapSuccess(_) => ListenerShape::MapSuccess,
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener::{:?}", self.shape())
    }
}

pub struct HookEngine {
    registry: String,
    lists: [RwLock<Vec<Listener>>; 10],
}

impl HookEngine {
    pub(crate) fn new(registry: impl Into<String>) -> Self {
        Self {
            registry: registry.into(),
            lists: std::array::from_fn(|_| RwLock::new(Vec::new())),
        }
    }

    /// Append `listener` to the list for `event`
    ///
    /// # Panics
    ///
    /// Panics if the listener's signature does not fit the event. That is a
    /// wiring mistake, so it fails immediately; the typed `on_*` helpers
    /// cannot hit it.
    pub fn on(&self, event: HookEvent, listener: Listener) {
        let expected = event.expected_shape();
        if listener.shape() != expected {
            panic!(
                "hook '{}' expects a {:?} listener, got {:?}",
                event,
                expected,
                listener.shape()
            );
        }
        locks::write(&self.lists[event.index()]).push(listener);
    }

    pub fn on_create(&self, f: impl Fn(&FailError, &HookData) + Send + Sync + 'static) {
        self.on(HookEvent::Create, Listener::error(f));
    }

    pub fn on_log(&self, f: impl Fn(&FailError, &HookData) + Send + Sync + 'static) {
        self.on(HookEvent::Log, Listener::error(f));
    }

    pub fn on_trace(&self, f: impl Fn(&FailError, &HookData) + Send + Sync + 'static) {
        self.on(HookEvent::Trace, Listener::error(f));
    }

    pub fn on_wrap(&self, f: impl Fn(&FailError, &HookData) + Send + Sync + 'static) {
        self.on(HookEvent::Wrap, Listener::error(f));
    }

    pub fn on_register_template(&self, f: impl Fn(&FailError, &HookData) + Send + Sync + 'static) {
        self.on(HookEvent::RegisterTemplate, Listener::error(f));
    }

    pub fn on_translate(&self, f: impl Fn(&FailError, &HookData) + Send + Sync + 'static) {
        self.on(HookEvent::Translate, Listener::error(f));
    }

    pub fn on_pattern_match(&self, f: impl Fn(&FailError, &HookData) + Send + Sync + 'static) {
        self.on(HookEvent::PatternMatch, Listener::error(f));
    }

    pub fn on_map(&self, f: impl Fn(&SharedError) + Send + Sync + 'static) {
        self.on(HookEvent::Map, Listener::foreign(f));
    }

    pub fn on_map_failure(&self, f: impl Fn(&SharedError) + Send + Sync + 'static) {
        self.on(HookEvent::MapFailure, Listener::foreign(f));
    }

    pub fn on_map_success(&self, f: impl Fn(&SharedError, &FailError) + Send + Sync + 'static) {
        self.on(HookEvent::MapSuccess, Listener::map_success(f));
    }

    pub fn listener_count(&self, event: HookEvent) -> usize {
        locks::read(&self.lists[event.index()]).len()
    }

    pub fn clear(&self, event: HookEvent) {
        locks::write(&self.lists[event.index()]).clear();
    }

    fn snapshot(&self, event: HookEvent) -> Vec<Listener> {
        locks::read(&self.lists[event.index()]).clone()
    }

    pub(crate) fn run_error(&self, event: HookEvent, err: &FailError, data: &HookData) {
        for listener in self.snapshot(event) {
            if let Listener::Error(f) = listener {
                self.isolate(event, || f(err, data));
            }
        }
    }

    pub(crate) fn run_foreign(&self, event: HookEvent, err: &SharedError) {
        for listener in self.snapshot(event) {
            if let Listener::Foreign(f) = listener {
                self.isolate(event, || f(err));
            }
        }
    }

    pub(crate) fn run_map_success(&self, foreign: &SharedError, err: &FailError) {
        for listener in self.snapshot(HookEvent::MapSuccess) {
            if let Listener::MapSuccess(f) = listener {
                self.isolate(HookEvent::MapSuccess, || f(foreign, err));
            }
        }
    }

    fn isolate(&self, event: HookEvent, call: impl FnOnce()) {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(call)) {
            tracing::error!(
                component = module_path!(),
                event = EVENT_HOOK_PANIC,
                registry = %self.registry,
                hook_event = event.as_str(),
                panic = %locks::panic_message(payload.as_ref()),
                "hook listener panicked"
            );
        }
    }
}

impl fmt::Debug for HookEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for event in HookEvent::ALL {
            map.entry(&event.as_str(), &self.listener_count(event));
        }
        map.finish()
    }
}
