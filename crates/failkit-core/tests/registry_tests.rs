#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::error::Error;
use std::sync::{Arc, Mutex};

use common::{define, fresh_registry, Upstream};
use failkit_core::{
    as_fail, internal_ids, is, Allocator, ErrorDefinition, ErrorId, ErrorKind, HookData, MetaMap,
    MetaValue, Registry, RegistryConfig,
};
use failkit_core_types::schema::{SNAPSHOT_CATEGORY, SNAPSHOT_ID, SNAPSHOT_IS_SYSTEM};

#[test]
fn test_first_registration_wins() {
    // GIVEN an id registered with "first"
    let allocator = Allocator::new();
    let registry = fresh_registry("first-wins");
    let id = allocator.allocate(1, "ORDER", 0, ErrorKind::Dynamic, "OrderMissing");
    registry
        .register(ErrorDefinition::new(id.clone(), "first"))
        .unwrap();

    // WHEN registering again with a different message
    registry
        .register(ErrorDefinition::new(id.clone(), "second").system())
        .unwrap();

    // THEN new instances keep the first template
    let err = registry.new_error(&id);
    assert_eq!(err.message(), "first");
    assert!(!err.is_system());
    assert_eq!(registry.new_error(&id).message(), "first");
}

#[test]
fn test_register_template_fires_once() {
    let allocator = Allocator::new();
    let registry = fresh_registry("register-hook");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    registry.hooks().on_register_template(move |err, _| {
        sink.lock().unwrap().push(err.message().to_string());
    });

    let id = allocator.allocate(1, "ORDER", 0, ErrorKind::Dynamic, "OrderMissing");
    registry.register(ErrorDefinition::new(id.clone(), "a")).unwrap();
    registry.register(ErrorDefinition::new(id, "b")).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["a".to_string()]);
}

#[test]
fn test_unallocated_id_rejected() {
    let registry = fresh_registry("untrusted");
    let forged = ErrorId::unallocated(1, "ORDER", 0, ErrorKind::Static, "OrderForged");

    let err = registry
        .register(ErrorDefinition::new(forged.clone(), "nope"))
        .unwrap_err();
    assert_eq!(err.id(), &internal_ids().id_not_allocated);
    assert_eq!(
        err.meta_value("requested_id"),
        Some(&MetaValue::from("1_ORDER_0000_S"))
    );
    assert!(!registry.is_registered(&forged));

    let instance = registry.new_error(&forged);
    assert_eq!(instance.id(), &internal_ids().id_not_allocated);
}

#[test]
fn test_unregistered_id_yields_sentinel() {
    let allocator = Allocator::new();
    let registry = fresh_registry("unregistered");
    let id = allocator.allocate(1, "ORDER", 0, ErrorKind::Dynamic, "OrderMissing");

    let err = registry.new_error(&id);
    assert_eq!(err.id(), &internal_ids().unregistered);
    assert_eq!(
        err.meta_value("requested_id").and_then(MetaValue::as_str),
        Some("1_ORDER_0000_D")
    );
}

#[test]
fn test_create_hook_receives_snapshot() {
    let allocator = Allocator::new();
    let registry = fresh_registry("create-hook");
    let id = define(
        &allocator,
        &registry,
        "ORDER",
        0,
        ErrorKind::Static,
        "OrderMissing",
        "order missing",
    );

    let seen: Arc<Mutex<Vec<HookData>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    registry
        .hooks()
        .on_create(move |_, data| sink.lock().unwrap().push(data.clone()));

    registry.new_error(&id);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0][SNAPSHOT_ID], MetaValue::from("1_ORDER_0000_S"));
    assert_eq!(seen[0][SNAPSHOT_CATEGORY], MetaValue::from("ORDER"));
    assert_eq!(seen[0][SNAPSHOT_IS_SYSTEM], MetaValue::from(false));
}

#[test]
fn test_unregistered_lookup_does_not_fire_create() {
    let allocator = Allocator::new();
    let registry = fresh_registry("no-create");
    let id = allocator.allocate(1, "ORDER", 0, ErrorKind::Dynamic, "OrderMissing");

    let fired = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&fired);
    registry
        .hooks()
        .on_create(move |_, _| *counter.lock().unwrap() += 1);

    registry.new_error(&id);
    assert_eq!(*fired.lock().unwrap(), 0);
}

#[test]
fn test_instances_are_independent_copies() {
    let allocator = Allocator::new();
    let registry = fresh_registry("copies");
    let id = define(
        &allocator,
        &registry,
        "ORDER",
        0,
        ErrorKind::Dynamic,
        "OrderMissing",
        "order missing",
    );

    let a = registry.new_error(&id).msg("changed").with_meta("k", 1);
    let b = registry.new_error(&id);
    assert_eq!(a.message(), "changed");
    assert_eq!(b.message(), "order missing");
    assert!(b.meta().is_empty());
    assert_eq!(registry.template(&id).unwrap().message(), "order missing");
}

#[test]
fn test_register_many_aggregates_failures() {
    let allocator = Allocator::new();
    let registry = fresh_registry("many");
    let good = allocator.allocate(1, "ORDER", 0, ErrorKind::Dynamic, "OrderMissing");
    let bad_a = ErrorId::unallocated(1, "ORDER", 7, ErrorKind::Dynamic, "OrderForgedA");
    let bad_b = ErrorId::unallocated(1, "ORDER", 8, ErrorKind::Dynamic, "OrderForgedB");

    let err = registry
        .register_many(vec![
            ErrorDefinition::new(bad_a, "x"),
            ErrorDefinition::new(good.clone(), "ok"),
            ErrorDefinition::new(bad_b, "y"),
        ])
        .unwrap_err();

    // the valid definition still landed
    assert!(registry.is_registered(&good));

    assert_eq!(err.id(), &internal_ids().register_many);
    assert_eq!(err.meta_value("failed_count"), Some(&MetaValue::Int(2)));
    let failures = err
        .meta_value("failures")
        .and_then(MetaValue::as_string_list)
        .unwrap();
    assert_eq!(failures.len(), 2);
    assert!(failures[0].contains(&internal_ids().id_not_allocated.rendered()));
    assert_eq!(err.message(), "2 of 3 registrations failed");

    let first = as_fail(err.source().unwrap()).unwrap();
    assert_eq!(
        first.meta_value("requested_id").and_then(MetaValue::as_str),
        Some("1_ORDER_0007_D")
    );
}

#[test]
fn test_register_many_all_good() {
    let allocator = Allocator::new();
    let registry = fresh_registry("many-ok");
    let a = allocator.allocate(1, "ORDER", 0, ErrorKind::Dynamic, "OrderMissing");
    let b = allocator.allocate(1, "ORDER", 1, ErrorKind::Dynamic, "OrderDuplicated");
    registry
        .register_many([ErrorDefinition::new(a, "a"), ErrorDefinition::new(b, "b")])
        .unwrap();
}

#[test]
fn test_form_registers_then_instantiates() {
    let allocator = Allocator::new();
    let registry = fresh_registry("form");
    let id = allocator.allocate(1, "ORDER", 0, ErrorKind::Dynamic, "OrderMissing");

    let mut meta = MetaMap::new();
    meta.insert("retry".to_string(), MetaValue::from(true));
    let err = registry.form(&id, "order missing", true, meta);
    assert_eq!(err.message(), "order missing");
    assert!(err.is_system());
    assert_eq!(err.meta_value("retry"), Some(&MetaValue::Bool(true)));

    // later forms do not replace the template
    let again = registry.form(&id, "other", false, MetaMap::new());
    assert_eq!(again.message(), "order missing");
}

#[test]
fn test_wrap_sets_cause_and_fires_wrap() {
    let allocator = Allocator::new();
    let registry = fresh_registry("wrap");
    let id = define(
        &allocator,
        &registry,
        "ORDER",
        0,
        ErrorKind::Dynamic,
        "OrderMissing",
        "order missing",
    );

    let causes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&causes);
    registry.hooks().on_wrap(move |_, data| {
        sink.lock().unwrap().push(data.get("cause").cloned());
    });

    let err = registry.wrap(&id, Upstream("socket closed"));
    assert_eq!(err.to_string(), "[1_ORDER_0000_D] order missing: upstream: socket closed");
    assert!(err.source().unwrap().is::<Upstream>());
    assert_eq!(
        *causes.lock().unwrap(),
        vec![Some(MetaValue::from("upstream: socket closed"))]
    );
}

#[test]
fn test_is_and_as_fail_walk_the_chain() {
    let allocator = Allocator::new();
    let registry = fresh_registry("chain");
    let inner_id = define(
        &allocator,
        &registry,
        "ORDER",
        0,
        ErrorKind::Dynamic,
        "OrderMissing",
        "order missing",
    );
    let outer_id = define(
        &allocator,
        &registry,
        "ORDER",
        1,
        ErrorKind::Dynamic,
        "OrderCheckoutFailed",
        "checkout failed",
    );

    let outer = registry.wrap(&outer_id, registry.new_error(&inner_id));
    assert!(is(&outer, &outer_id));
    assert!(is(&outer, &inner_id));
    assert_eq!(as_fail(&outer).unwrap().id(), &outer_id);

    let plain = Upstream("x");
    assert!(!is(&plain, &inner_id));
    assert!(as_fail(&plain).is_none());
}

#[test]
fn test_registry_names_are_unique_until_dropped() {
    let registry = Registry::new("unique-name-test").unwrap();
    let clash = Registry::new("unique-name-test").unwrap_err();
    assert_eq!(clash.id(), &internal_ids().registry_already_registered);

    drop(registry);
    Registry::new("unique-name-test").unwrap();
}

#[test]
fn test_default_name_is_reserved() {
    let err = Registry::new("default").unwrap_err();
    assert_eq!(err.id(), &internal_ids().registry_already_registered);
}

#[test]
fn test_registries_do_not_share_templates() {
    let allocator = Allocator::new();
    let a = fresh_registry("isolated-a");
    let b = fresh_registry("isolated-b");
    let id = define(
        &allocator,
        &a,
        "ORDER",
        0,
        ErrorKind::Dynamic,
        "OrderMissing",
        "order missing",
    );

    assert!(a.is_registered(&id));
    assert!(!b.is_registered(&id));
    assert_eq!(b.new_error(&id).id(), &internal_ids().unregistered);
}

#[test]
fn test_effective_locale_fallbacks() {
    let allocator = Allocator::new();
    let registry = Registry::with_config(
        "locale-test",
        RegistryConfig {
            default_locale: Some("de-DE".to_string()),
            ..RegistryConfig::default()
        },
    )
    .unwrap();
    let id = define(
        &allocator,
        &registry,
        "ORDER",
        0,
        ErrorKind::Dynamic,
        "OrderMissing",
        "order missing",
    );

    assert_eq!(registry.new_error(&id).effective_locale(), "de-DE");
    assert_eq!(
        registry.new_error(&id).with_locale("fr-FR").effective_locale(),
        "fr-FR"
    );

    registry.set_default_locale(None);
    assert_eq!(registry.new_error(&id).effective_locale(), "en-US");
}

#[test]
fn test_builder_metadata_helpers() {
    let allocator = Allocator::new();
    let registry = fresh_registry("builder");
    let id = define(
        &allocator,
        &registry,
        "ORDER",
        0,
        ErrorKind::Dynamic,
        "OrderMissing",
        "order missing",
    );

    let err = registry
        .new_error(&id)
        .trace("checkout")
        .traces(["cart", "payment"])
        .debug("sql: select 1")
        .validation("email", "required")
        .validation("age", "too low")
        .internal("row 42 missing")
        .with_args([MetaValue::from("order-7")])
        .system();

    assert_eq!(err.trace_entries(), ["checkout", "cart", "payment"]);
    assert_eq!(err.debug_entries(), ["sql: select 1"]);
    assert_eq!(err.validation_records().len(), 2);
    assert_eq!(err.validation_records()[1].field, "age");
    assert_eq!(err.internal_message(), Some("row 42 missing"));
    assert_eq!(err.args(), [MetaValue::from("order-7")]);
    assert!(err.is_system());
    assert!(!err.domain().is_system());
}

#[test]
fn test_instances_remember_their_registry() {
    let allocator = Allocator::new();
    let registry = fresh_registry("owner");
    let id = define(
        &allocator,
        &registry,
        "ORDER",
        0,
        ErrorKind::Dynamic,
        "OrderMissing",
        "order missing",
    );

    let err = registry.new_error(&id);
    assert_eq!(err.registry().unwrap().name(), registry.name());
}
