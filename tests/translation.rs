mod common;

use std::ops::Bound;
use std::sync::Arc;

use serde_json::json;

use common::{RecordingAllocator, accepting_client, calls, client_with, ScriptedTransport};
use hyperclient::ClientError;
use hyperclient::buffer::{BufferAllocator, ConstraintKind};
use hyperclient::datatype::Value;
use hyperclient::predicate::Predicate;
use hyperclient::translate::translate;

fn as_dyn(allocator: &Arc<RecordingAllocator>) -> Arc<dyn BufferAllocator> {
    Arc::clone(allocator) as Arc<dyn BufferAllocator>
}

#[test]
fn every_entry_lands_in_exactly_one_array() {
    let recording = RecordingAllocator::new();
    let predicate = Predicate::from_json(&json!({
        "name": "jane",
        "city": {"$eq": "Ithaca"},
        "age": {"min": 18, "max": 65},
        "height": [1.5, 2.0],
        "score": {"$gt": 10},
    }))
    .unwrap();

    let set = translate(&predicate, &as_dyn(&recording)).unwrap();
    assert_eq!(set.equality_count(), 2);
    assert_eq!(set.range_count(), 3);
    assert_eq!(set.len(), predicate.len());

    let equalities: Vec<&str> = set.equalities().iter().map(|c| c.attribute()).collect();
    let ranges: Vec<&str> = set.ranges().iter().map(|c| c.attribute()).collect();
    assert_eq!(equalities, vec!["name", "city"]);
    assert_eq!(ranges, vec!["age", "height", "score"]);

    assert_eq!(recording.outstanding(), 2);
    drop(set);
    recording.assert_balanced();
}

#[test]
fn min_max_object_is_an_inclusive_range() {
    let recording = RecordingAllocator::new();
    let predicate = Predicate::from_json(&json!({"age": {"min": 18, "max": 65}})).unwrap();
    let set = translate(&predicate, &as_dyn(&recording)).unwrap();

    assert!(set.equalities().is_empty());
    let range = &set.ranges()[0];
    assert_eq!(range.lower(), &Bound::Included(Value::Int(18)));
    assert_eq!(range.upper(), &Bound::Included(Value::Int(65)));
    assert_eq!(recording.allocations().len(), 1);
    assert_eq!(recording.allocations()[0].kind, ConstraintKind::Range);
}

#[test]
fn null_bound_leaves_that_side_open() {
    let predicate = Predicate::from_json(&json!({"age": {"min": null, "max": 65}})).unwrap();
    let set = translate(&predicate, &as_dyn(&RecordingAllocator::new())).unwrap();
    assert_eq!(set.ranges()[0].lower(), &Bound::Unbounded);
    assert_eq!(set.ranges()[0].upper(), &Bound::Included(Value::Int(65)));
}

#[test]
fn empty_predicate_allocates_nothing() {
    let recording = RecordingAllocator::new();
    let set = translate(&Predicate::new(), &as_dyn(&recording)).unwrap();
    assert!(set.is_empty());
    assert!(recording.events().is_empty());
}

#[test]
fn null_criteria_fail_before_any_allocation() {
    let (client, allocator) = accepting_client();
    let err = client
        .sorted_search_json("people", &serde_json::Value::Null, "age", 10u64, false)
        .unwrap_err();
    assert!(matches!(err, ClientError::Value(_)));
    assert!(allocator.events().is_empty());
    assert!(calls(&client).is_empty());
    assert_eq!(client.pending().unwrap(), 0);
}

#[test]
fn non_object_criteria_are_value_errors() {
    for bad in [json!([1, 2]), json!("age"), json!(30)] {
        let err = Predicate::from_json(&bad).unwrap_err();
        assert!(matches!(err, ClientError::Value(_)), "{bad} gave {err}");
    }
}

#[test]
fn unsupported_constraints_are_type_errors() {
    let (client, allocator) = accepting_client();
    for bad in [
        json!({"age": true}),
        json!({"age": null}),
        json!({"age": [1, 2, 3]}),
        json!({"age": {}}),
        json!({"age": {"$eq": 3, "$gt": 1}}),
    ] {
        let err = client.sorted_search_json("people", &bad, "age", 1u64, false).unwrap_err();
        assert!(matches!(err, ClientError::Type(_)), "{bad} gave {err}");
    }
    assert!(allocator.events().is_empty());
    assert!(calls(&client).is_empty());
}

#[test]
fn malformed_operators_are_value_errors() {
    let (client, allocator) = accepting_client();
    for bad in [
        json!({"age": {"$ne": 3}}),
        json!({"age": {"$gt": 18, "$gte": 20}}),
        json!({"age": {"min": null, "$gte": 5}}),
        json!({"age": {"min": null, "max": null}}),
    ] {
        let err = client.sorted_search_json("people", &bad, "age", 1u64, false).unwrap_err();
        assert!(matches!(err, ClientError::Value(_)), "{bad} gave {err}");
    }
    assert!(allocator.events().is_empty());
    assert!(calls(&client).is_empty());
}

#[test]
fn mixed_bound_types_release_both_buffers() {
    let (client, allocator) = accepting_client();
    let err = client
        .sorted_search_json("people", &json!({"name": "jane", "age": [18, "sixty"]}), "age", 1u64, false)
        .unwrap_err();

    match err {
        ClientError::Type(msg) => assert!(msg.contains("age"), "{msg}"),
        other => panic!("expected a type error, got {other}"),
    }
    assert_eq!(allocator.allocations().len(), 2);
    allocator.assert_balanced();
    assert!(calls(&client).is_empty());
}

#[test]
fn refused_range_buffer_releases_the_equality_buffer() {
    let allocator = RecordingAllocator::refusing(ConstraintKind::Range);
    let client = client_with(ScriptedTransport::new(Arc::clone(&allocator)), Arc::clone(&allocator));

    let predicate = Predicate::new().equals("name", "jane").range("age", 18..=65);
    let err = client.sorted_search("people", &predicate, "age", 1u64, false).unwrap_err();

    assert!(matches!(err, ClientError::Memory(_)));
    assert_eq!(allocator.allocations().len(), 1);
    assert_eq!(allocator.allocations()[0].kind, ConstraintKind::Equality);
    allocator.assert_balanced();
    assert!(calls(&client).is_empty());
    assert_eq!(client.pending().unwrap(), 0);
}

#[test]
fn buffers_are_sized_to_their_entries() {
    let recording = RecordingAllocator::new();
    let predicate = Predicate::new()
        .equals("a", 1)
        .equals("b", 2)
        .equals("c", 3)
        .range("d", ..10);
    let set = translate(&predicate, &as_dyn(&recording)).unwrap();

    let capacities: Vec<(ConstraintKind, usize)> = recording
        .allocations()
        .iter()
        .map(|h| (h.kind, h.capacity))
        .collect();
    assert_eq!(capacities, vec![(ConstraintKind::Equality, 3), (ConstraintKind::Range, 1)]);
    assert_eq!(set.attribute_at(3), Some("d"));
    assert_eq!(set.attribute_at(4), None);
}
