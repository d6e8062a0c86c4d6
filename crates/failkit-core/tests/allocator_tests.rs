#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::panic::{catch_unwind, AssertUnwindSafe};

use failkit_core::{
    internal_ids, AllocationError, Allocator, ErrorKind, MAX_SEVERITY, SIMILARITY_THRESHOLD,
};
use proptest::prelude::*;

const AUTH_NAMES: [&str; 3] = ["AuthInvalidCredentials", "AuthSessionExpired", "AuthAccountLocked"];
const USER_NAMES: [&str; 3] = ["UserNotFound", "UserEmailTaken", "UserProfileHidden"];

#[test]
fn test_threshold_is_three() {
    assert_eq!(SIMILARITY_THRESHOLD, 3);
}

#[test]
fn test_gap_rejected_next_accepted() {
    // GIVEN AUTH static 0, 1, 2
    let allocator = Allocator::new();
    for (seq, name) in AUTH_NAMES.iter().enumerate() {
        allocator.allocate(0, "AUTH", seq as u32, ErrorKind::Static, name);
    }

    // WHEN requesting 4 THEN it is a gap
    let err = allocator
        .try_allocate(0, "AUTH", 4, ErrorKind::Static, "AuthTokenRevoked")
        .unwrap_err();
    assert_eq!(
        err,
        AllocationError::SequenceGap {
            category: "AUTH".to_string(),
            kind: ErrorKind::Static,
            missing: 3,
            requested: 4,
        }
    );

    // AND 3 is accepted
    let id = allocator.allocate(0, "AUTH", 3, ErrorKind::Static, "AuthTokenRevoked");
    assert_eq!(id.to_string(), "0_AUTH_0003_S");
}

#[test]
fn test_kinds_number_independently() {
    let allocator = Allocator::new();
    let s = allocator.allocate(0, "AUTH", 0, ErrorKind::Static, "AuthInvalidCredentials");
    let d = allocator.allocate(2, "AUTH", 0, ErrorKind::Dynamic, "AuthSessionExpired");
    assert_eq!(s.to_string(), "0_AUTH_0000_S");
    assert_eq!(d.to_string(), "2_AUTH_0000_D");
}

#[test]
fn test_first_allocation_must_be_zero() {
    let allocator = Allocator::new();
    let err = allocator
        .try_allocate(0, "AUTH", 1, ErrorKind::Static, "AuthInvalidCredentials")
        .unwrap_err();
    assert!(matches!(err, AllocationError::SequenceGap { missing: 0, .. }));
}

#[test]
fn test_similar_name_rejected() {
    let allocator = Allocator::new();
    allocator.allocate(0, "USER", 0, ErrorKind::Static, "UserNotFound");

    let err = allocator
        .try_allocate(0, "USER", 1, ErrorKind::Static, "UserNotFounds")
        .unwrap_err();
    assert_eq!(
        err,
        AllocationError::TooSimilar {
            name: "UserNotFounds".to_string(),
            existing: "UserNotFound".to_string(),
            distance: 1,
            threshold: 3,
        }
    );
}

#[test]
fn test_distinct_name_accepted() {
    let allocator = Allocator::new();
    allocator.allocate(0, "USER", 0, ErrorKind::Static, "UserNotFound");
    let id = allocator.allocate(0, "USER", 1, ErrorKind::Static, "UserAccountLocked");
    assert_eq!(id.name(), "UserAccountLocked");
}

#[test]
fn test_similarity_spans_categories() {
    let allocator = Allocator::new();
    allocator.allocate(0, "AB", 0, ErrorKind::Static, "AbCdef");
    let err = allocator
        .try_allocate(0, "ABC", 0, ErrorKind::Static, "AbCdeg")
        .unwrap_err();
    assert!(matches!(err, AllocationError::TooSimilar { .. }));
}

#[test]
fn test_reserved_category_rejected() {
    let allocator = Allocator::new();
    let err = allocator
        .try_allocate(0, "FAIL", 0, ErrorKind::Static, "FailSomethingCustom")
        .unwrap_err();
    assert!(matches!(err, AllocationError::ReservedCategory { .. }));
}

#[test]
fn test_severity_above_nine_rejected() {
    // GIVEN a fresh allocator
    let allocator = Allocator::new();

    // WHEN severity does not fit one digit THEN nothing is allocated
    let err = allocator
        .try_allocate(200, "USER", 0, ErrorKind::Static, "UserNotFound")
        .unwrap_err();
    assert_eq!(
        err,
        AllocationError::SeverityOutOfRange {
            name: "UserNotFound".to_string(),
            severity: 200,
        }
    );
    assert!(allocator.lookup("UserNotFound").is_none());

    // AND the top of the range still renders as one digit
    let id = allocator.allocate(MAX_SEVERITY, "USER", 0, ErrorKind::Static, "UserNotFound");
    assert_eq!(id.to_string(), "9_USER_0000_S");
}

#[test]
fn test_prefix_mismatch_rejected_case_insensitively() {
    let allocator = Allocator::new();
    let err = allocator
        .try_allocate(0, "AUTH", 0, ErrorKind::Static, "UserLocked")
        .unwrap_err();
    assert!(matches!(err, AllocationError::PrefixMismatch { .. }));

    let id = allocator.allocate(0, "AUTH", 0, ErrorKind::Static, "authLocked");
    assert_eq!(id.category(), "AUTH");
}

#[test]
fn test_duplicate_name_rejected_before_similarity() {
    let allocator = Allocator::new();
    allocator.allocate(0, "USER", 0, ErrorKind::Static, "UserNotFound");
    let err = allocator
        .try_allocate(0, "USER", 1, ErrorKind::Static, "UserNotFound")
        .unwrap_err();
    assert_eq!(
        err,
        AllocationError::DuplicateName {
            name: "UserNotFound".to_string(),
            existing: "0_USER_0000_S".to_string(),
        }
    );
}

#[test]
fn test_collision_rejected() {
    let allocator = Allocator::new();
    allocator.allocate(0, "USER", 0, ErrorKind::Static, "UserNotFound");
    let err = allocator
        .try_allocate(0, "USER", 0, ErrorKind::Static, "UserEmailTaken")
        .unwrap_err();
    match err {
        AllocationError::SequenceCollision {
            existing_name,
            existing_id,
            ..
        } => {
            assert_eq!(existing_name, "UserNotFound");
            assert_eq!(existing_id, "0_USER_0000_S");
        }
        other => panic!("expected collision, got {:?}", other),
    }
}

#[test]
fn test_rejected_request_leaves_no_trace() {
    let allocator = Allocator::new();
    allocator.allocate(0, "USER", 0, ErrorKind::Static, "UserNotFound");
    let _ = allocator.try_allocate(0, "USER", 5, ErrorKind::Static, "UserEmailTaken");

    assert_eq!(allocator.len(), 1);
    assert!(allocator.lookup("UserEmailTaken").is_none());
    // the name is still free for a valid request
    allocator.allocate(0, "USER", 1, ErrorKind::Static, "UserEmailTaken");
}

#[test]
fn test_allocate_panics_with_violation_text() {
    let allocator = Allocator::new();
    allocator.allocate(0, "USER", 0, ErrorKind::Static, "UserNotFound");

    let payload = catch_unwind(AssertUnwindSafe(|| {
        allocator.allocate(0, "USER", 1, ErrorKind::Static, "UserNotFounds");
    }))
    .unwrap_err();
    let text = payload.downcast_ref::<String>().cloned().unwrap_or_default();
    assert!(text.contains("too similar"), "panic text was: {}", text);
}

#[test]
fn test_lookup_by_name_is_stable() {
    let allocator = Allocator::new();
    let id = allocator.allocate(4, "USER", 0, ErrorKind::Dynamic, "UserNotFound");

    let found = allocator.lookup("UserNotFound").unwrap();
    assert_eq!(found, id);
    assert_eq!(found.to_string(), id.to_string());
    assert_eq!(found.severity(), 4);
    assert!(found.is_allocated());
}

#[test]
fn test_export_sorted_category_static_first_sequence() {
    let allocator = Allocator::new();
    allocator.allocate(0, "USER", 0, ErrorKind::Dynamic, "UserNotFound");
    allocator.allocate(0, "AUTH", 0, ErrorKind::Dynamic, "AuthSessionExpired");
    allocator.allocate(0, "USER", 0, ErrorKind::Static, "UserEmailTaken");
    allocator.allocate(0, "AUTH", 0, ErrorKind::Static, "AuthInvalidCredentials");
    allocator.allocate(0, "AUTH", 1, ErrorKind::Static, "AuthAccountLocked");

    let rendered: Vec<String> = allocator.export().into_iter().map(|r| r.rendered_id).collect();
    assert_eq!(
        rendered,
        vec![
            "0_AUTH_0000_S",
            "0_AUTH_0001_S",
            "0_AUTH_0000_D",
            "0_USER_0000_S",
            "0_USER_0000_D",
        ]
    );
}

#[test]
fn test_export_json_record_shape() {
    let allocator = Allocator::new();
    allocator.allocate(3, "USER", 0, ErrorKind::Static, "UserNotFound");

    let json: serde_json::Value = serde_json::from_str(&allocator.export_json().unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "name": "UserNotFound",
            "category": "USER",
            "static": true,
            "severity": 3,
            "sequence_number": 0,
            "rendered_id": "3_USER_0000_S"
        }])
    );
}

#[test]
fn test_export_is_stable_across_calls() {
    let allocator = Allocator::new();
    for (seq, name) in USER_NAMES.iter().enumerate() {
        allocator.allocate(0, "USER", seq as u32, ErrorKind::Static, name);
    }
    assert_eq!(allocator.export_json().unwrap(), allocator.export_json().unwrap());
}

#[test]
fn test_validate_and_reset() {
    let allocator = Allocator::new();
    allocator.allocate(0, "USER", 0, ErrorKind::Static, "UserNotFound");
    assert!(allocator.validate().is_ok());

    allocator.reset();
    assert!(allocator.is_empty());
    allocator.allocate(0, "USER", 0, ErrorKind::Static, "UserNotFound");
}

#[test]
fn test_unsealed_allocator_never_flags_runtime_allocation() {
    // GIVEN an allocator nobody sealed
    let allocator = Allocator::new();
    allocator.override_runtime_panics(Some(true));
    allocator.allocate(0, "USER", 0, ErrorKind::Static, "UserNotFound");

    // WHEN allocating much later THEN it is still treated as start-up
    let id = allocator.allocate(0, "USER", 1, ErrorKind::Static, "UserEmailTaken");
    assert!(!allocator.is_sealed());
    assert_eq!(id.to_string(), "0_USER_0001_S");
}

#[test]
fn test_sealed_allocator_returns_runtime_sentinel() {
    let allocator = Allocator::new();
    allocator.override_runtime_panics(Some(false));
    allocator.seal();
    assert!(allocator.is_sealed());

    let id = allocator.allocate(0, "USER", 0, ErrorKind::Static, "UserNotFound");
    assert_eq!(id, internal_ids().runtime_id_invalid);
    assert!(allocator.lookup("UserNotFound").is_none());

    let err = allocator
        .try_allocate(0, "USER", 0, ErrorKind::Static, "UserNotFound")
        .unwrap_err();
    assert!(matches!(err, AllocationError::RuntimeAllocation { .. }));
}

#[test]
fn test_sealed_allocator_panics_when_permitted() {
    let allocator = Allocator::new();
    allocator.override_runtime_panics(Some(true));
    allocator.seal();

    let result = catch_unwind(AssertUnwindSafe(|| {
        allocator.allocate(0, "USER", 0, ErrorKind::Static, "UserNotFound")
    }));
    assert!(result.is_err());
}

#[test]
fn test_runtime_allocation_override_reopens() {
    let allocator = Allocator::new();
    allocator.seal();
    allocator.allow_runtime_allocation(true);

    let id = allocator.allocate(0, "USER", 0, ErrorKind::Static, "UserNotFound");
    assert_eq!(id.to_string(), "0_USER_0000_S");
}

#[test]
fn test_concurrent_gap_fill_has_one_winner() {
    use std::sync::Arc;

    let allocator = Arc::new(Allocator::new());
    allocator.allocate(0, "USER", 0, ErrorKind::Static, "UserNotFound");

    let names = ["UserEmailTaken", "UserProfileHidden", "UserQuotaReached", "UserBannedForever"];
    let handles: Vec<_> = names
        .into_iter()
        .map(|name| {
            let allocator = Arc::clone(&allocator);
            std::thread::spawn(move || {
                allocator
                    .try_allocate(0, "USER", 1, ErrorKind::Static, name)
                    .is_ok()
            })
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();
    assert_eq!(winners, 1);
}

proptest! {
    #[test]
    fn rendered_ids_independent_of_interleaving(picks in proptest::collection::vec(any::<bool>(), 6)) {
        let allocator = Allocator::new();
        let mut auth = AUTH_NAMES.iter().enumerate();
        let mut user = USER_NAMES.iter().enumerate();

        for pick_auth in picks {
            let (category, next) = if pick_auth {
                ("AUTH", auth.next())
            } else {
                ("USER", user.next())
            };
            if let Some((seq, name)) = next {
                allocator.allocate(0, category, seq as u32, ErrorKind::Static, name);
            }
        }
        for (seq, name) in auth {
            allocator.allocate(0, "AUTH", seq as u32, ErrorKind::Static, name);
        }
        for (seq, name) in user {
            allocator.allocate(0, "USER", seq as u32, ErrorKind::Static, name);
        }

        for (seq, name) in AUTH_NAMES.iter().enumerate() {
            let id = allocator.lookup(name).unwrap();
            prop_assert_eq!(id.to_string(), format!("0_AUTH_{:04}_S", seq));
        }
        for (seq, name) in USER_NAMES.iter().enumerate() {
            let id = allocator.lookup(name).unwrap();
            prop_assert_eq!(id.to_string(), format!("0_USER_{:04}_S", seq));
        }
    }
}
