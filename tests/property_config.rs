/// Property-based tests for spec identity and input handling
///
/// These tests use proptest to generate random inputs and verify invariants
/// that should hold for any schema shape.

use proptest::prelude::*;
use specwire::{
    build_container, object, resolve, ConfigDef, GlobalInputs, InputValue, Schema, Value,
};
use std::cell::RefCell;
use std::collections::HashSet;

// Field table for the generated schemas. The declaring fn runs on the
// same thread as `resolve`, so the values flow through a thread local and
// parallel tests cannot trample each other.
thread_local! {
    static FIELD_VALUES: RefCell<Vec<i64>> = const { RefCell::new(Vec::new()) };
}

struct GeneratedConfig;

impl ConfigDef for GeneratedConfig {
    fn declare(schema: &mut Schema) {
        FIELD_VALUES.with(|values| {
            for (i, value) in values.borrow().iter().enumerate() {
                schema.field(&format!("field_{}", i), object(*value));
            }
        });
    }
}

proptest! {
    // Every freshly constructed spec gets a distinct id, and cloning never
    // mints a new one.
    #[test]
    fn spec_ids_unique_and_stable(count in 1usize..64) {
        let specs: Vec<_> = (0..count).map(|i| object(i as i64)).collect();
        let ids: HashSet<_> = specs.iter().map(|s| s.id()).collect();
        prop_assert_eq!(ids.len(), specs.len());
        for spec in &specs {
            prop_assert_eq!(spec.clone().id(), spec.id());
        }
    }

    // Any sequence of perturbations on one field: the last write wins, and
    // the field keeps resolving under its original name.
    #[test]
    fn last_perturbation_wins(writes in prop::collection::vec(-1000i64..1000, 1..10)) {
        FIELD_VALUES.with(|values| *values.borrow_mut() = vec![0]);
        let config = resolve::<GeneratedConfig>(GlobalInputs::new()).unwrap();
        for w in &writes {
            config.set("field_0", object(*w)).unwrap();
        }
        let container = build_container(config).unwrap();
        let got = container.get("field_0").unwrap();
        prop_assert_eq!(*got.downcast::<i64>().unwrap(), *writes.last().unwrap());
    }

    // Declared fields come back sorted from keys(), whatever the
    // declaration order was.
    #[test]
    fn keys_are_sorted(count in 1usize..16) {
        FIELD_VALUES.with(|values| *values.borrow_mut() = (0..count as i64).rev().collect());
        let config = resolve::<GeneratedConfig>(GlobalInputs::new()).unwrap();
        let keys = config.keys();
        let mut sorted = keys.clone();
        sorted.sort();
        prop_assert_eq!(keys.len(), count);
        prop_assert_eq!(keys, sorted);
    }

    // Float input values hash and compare by bit pattern, so equal inputs
    // always locate the same cached child node.
    #[test]
    fn input_value_eq_hash_consistent(x in proptest::num::f64::ANY) {
        let a = InputValue::from(x);
        let b = InputValue::from(x);
        prop_assert_eq!(&a, &b);

        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        prop_assert_eq!(ha.finish(), hb.finish());
    }

    // Downcast round-trips through the type-erased value for arbitrary
    // payloads.
    #[test]
    fn value_downcast_roundtrip(s in ".*", n in proptest::num::i64::ANY) {
        let v = Value::new(s.clone());
        prop_assert_eq!((*v.downcast::<String>().unwrap()).clone(), s);
        prop_assert!(v.downcast::<i64>().is_none());

        let v = Value::new(n);
        prop_assert_eq!(*v.downcast::<i64>().unwrap(), n);
    }
}
