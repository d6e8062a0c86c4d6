//! Test capture mode for deterministic logging assertions
//!
//! A layer that records every event's fields in memory, so tests can assert
//! on what the library logged.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use failkit_core_types::schema::{FIELD_COMPONENT, FIELD_ERR_ID, FIELD_EVENT};

use crate::locks;

/// A captured log event with all its fields
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub component: Option<String>,
    pub event: Option<String>,
    pub err_id: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Default)]
struct FieldVisitor {
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }
}

/// Test capture layer for collecting log events
pub struct TestCaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCaptureLayer {
    pub fn new() -> (Self, TestCapture) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let layer = Self {
            events: Arc::clone(&events),
        };
        (layer, TestCapture { events })
    }
}

impl<S> Layer<S> for TestCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            component: visitor.fields.get(FIELD_COMPONENT).cloned(),
            event: visitor.fields.get(FIELD_EVENT).cloned(),
            err_id: visitor.fields.get(FIELD_ERR_ID).cloned(),
            fields: visitor.fields,
        };

        locks::lock(&self.events).push(captured);
    }
}

/// Handle for accessing captured events in tests
#[derive(Clone)]
pub struct TestCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        locks::lock(&self.events).clone()
    }

    /// Captured events whose `event` field equals `event`
    pub fn events_named(&self, event: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event.as_deref() == Some(event))
            .collect()
    }

    /// Assert that an event with the given name was captured
    ///
    /// # Panics
    ///
    /// Panics if the event is not found
    pub fn assert_event_exists(&self, event: &str) {
        let events = self.events();
        let found = events.iter().any(|e| e.event.as_deref() == Some(event));
        assert!(
            found,
            "Expected event={} not found in {} captured events",
            event,
            events.len()
        );
    }

    pub fn clear(&self) {
        locks::lock(&self.events).clear();
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Initialize test capture mode
///
/// Installs the capture layer as the global subscriber on first call and
/// returns a handle to the shared capture. Events are shared across every
/// test in the binary, so filter by something unique to the test (a
/// registry name, an error id).
///
/// # Example
///
/// ```
/// use failkit_core::logging_facility::test_capture::init_test_capture;
/// use failkit_core::log_internal;
/// use failkit_core::Registry;
///
/// let capture = init_test_capture();
/// let registry = Registry::new("capture-doc").unwrap();
/// registry.set_internal_logging(true);
/// log_internal!(registry, "unmapped", "nothing matched");
/// capture.assert_event_exists("unmapped");
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCaptureLayer::new();
            let _ = tracing_subscriber::registry().with(layer).try_init();
            capture
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_event_field_lookup() {
        let mut fields = HashMap::new();
        fields.insert("mapper".to_string(), "io".to_string());
        let event = CapturedEvent {
            level: Level::WARN,
            component: Some("test".to_string()),
            event: Some("unmapped".to_string()),
            err_id: None,
            fields,
        };

        assert_eq!(event.field("mapper"), Some("io"));
        assert_eq!(event.field("missing"), None);
        assert_eq!(event.clone().level, Level::WARN);
    }

    #[test]
    fn test_layer_records_through_local_subscriber() {
        let (layer, capture) = TestCaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(event = "probe", err_id = "0_T_0000_S", count = 3_u64, ok = true);
        });

        let events = capture.events_named("probe");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].err_id.as_deref(), Some("0_T_0000_S"));
        assert_eq!(events[0].field("count"), Some("3"));
        assert_eq!(events[0].field("ok"), Some("true"));
    }
}
