//! Property-based tests - round trips over generated values
//!
//! Complements the integration tests by checking `decode(encode(x)) == x` across a wide
//! range of generated inputs.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_envelope::{from_str_as, to_string, Dynamic, Registry, Tagged};
use std::collections::{BTreeMap, HashMap};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct Record {
    id: u32,
    label: String,
    score: Option<f64>,
    tags: Vec<String>,
}
serde_envelope::tagged!(Record => "prop.Record");

fn registry() -> Registry {
    let registry = Registry::new();
    registry
        .register::<Record>()
        .expect("struct registration succeeds");
    registry
}

fn roundtrip<T: Tagged>(value: &T) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str_as::<T>(&serialized, &registry()) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Decode failed: {}", e);
                eprintln!("Encoded was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Encode failed: {}", e);
            false
        }
    }
}

fn record() -> impl Strategy<Value = Record> {
    (
        any::<u32>(),
        ".*",
        proptest::option::of(-1e12f64..1e12f64),
        prop::collection::vec("[a-z]{0,8}", 0..5),
    )
        .prop_map(|(id, label, score, tags)| Record {
            id,
            label,
            score,
            tags,
        })
}

fn dynamic() -> impl Strategy<Value = Dynamic> {
    prop_oneof![
        Just(Dynamic::nil()),
        any::<i64>().prop_map(Dynamic::from),
        any::<bool>().prop_map(Dynamic::from),
        ".*".prop_map(Dynamic::from),
        record().prop_map(Dynamic::new),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(Dynamic::new),
    ]
}

proptest! {
    #[test]
    fn prop_i32(n in any::<i32>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_i64(n in any::<i64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_u64(n in any::<u64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_f32(n in -1e30f32..1e30f32) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_f64(n in any::<f64>().prop_filter("finite", |n| n.is_finite())) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_string(s in ".*") {
        prop_assert!(roundtrip(&s));
    }

    #[test]
    fn prop_option_i16(opt in proptest::option::of(any::<i16>())) {
        prop_assert!(roundtrip(&opt));
    }

    #[test]
    fn prop_vec_of_records(v in prop::collection::vec(record(), 0..6)) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_vec_of_optional_records(v in prop::collection::vec(proptest::option::of(record()), 0..6)) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_map_of_records(m in prop::collection::hash_map("[a-z]{1,6}", record(), 0..5)) {
        prop_assert!(roundtrip(&m));
    }

    #[test]
    fn prop_map_int_keys(m in prop::collection::btree_map(any::<i32>(), any::<bool>(), 0..10)) {
        prop_assert!(roundtrip(&m));
    }

    #[test]
    fn prop_nested(v in prop::collection::vec(
        prop::collection::hash_map("[a-z]{1,4}", prop::collection::vec(any::<u16>(), 0..4), 0..4),
        0..4,
    )) {
        let value: Vec<HashMap<String, Vec<u16>>> = v;
        prop_assert!(roundtrip(&value));
    }

    #[test]
    fn prop_any_slots(v in prop::collection::vec(dynamic(), 0..8)) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_any_map(m in prop::collection::btree_map("[a-z]{1,4}", dynamic(), 0..6)) {
        let value: BTreeMap<String, Dynamic> = m;
        prop_assert!(roundtrip(&value));
    }
}
