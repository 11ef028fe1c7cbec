//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the facade against a simple in-memory model of the
//! valid-key index.

use proptest::prelude::*;
use std::sync::Arc;

use crate::cache::{Cache, CacheOptions, MemoryStore, MockClock, SetOptions, SetValue};

// == Test Configuration ==
const TEST_START_MS: u64 = 1_700_000_000_000;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn test_cache(store: Arc<MemoryStore>, clock: &MockClock, namespace: &str) -> Cache {
    Cache::with_clock(
        store,
        Arc::new(clock.clone()),
        CacheOptions::new(namespace).with_default_ttl(Some(300)),
    )
}

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}".prop_map(|s| s)
}

/// Generates cache values
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,32}".prop_map(|s| s)
}

/// Generates namespaces, including separator and escape characters
fn namespace_strategy() -> impl Strategy<Value = String> {
    "[a-z:\\\\]{1,8}".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Invalidate { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        1 => key_strategy().prop_map(|key| CacheOp::Invalidate { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // keys() follows filter-then-append order, never holds duplicates, and
    // get() agrees with the last write of every key.
    #[test]
    fn prop_index_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..40)) {
        let rt = runtime();
        let clock = MockClock::new(TEST_START_MS);
        let cache = test_cache(Arc::new(MemoryStore::new()), &clock, "prop");
        let mut model: Vec<(String, String)> = Vec::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    rt.block_on(cache.set(&key, value.clone(), SetOptions::default())).unwrap();
                    model.retain(|(k, _)| k != &key);
                    model.push((key, value));
                }
                CacheOp::Invalidate { key } => {
                    rt.block_on(cache.invalidate(&key)).unwrap();
                    model.retain(|(k, _)| k != &key);
                }
            }

            let keys = rt.block_on(cache.keys()).unwrap();
            let expected: Vec<String> = model.iter().map(|(k, _)| k.clone()).collect();
            prop_assert_eq!(&keys, &expected);
        }

        for (key, value) in &model {
            let stored = rt.block_on(cache.get(key)).unwrap();
            prop_assert_eq!(stored.as_ref(), Some(value));
        }
    }

    // A value is readable up to and including its deadline, and gone after it.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in key_strategy(),
        value in value_strategy(),
        ttl in 1u64..3_600,
        elapsed_ms in 0u64..7_200_000
    ) {
        let rt = runtime();
        let clock = MockClock::new(TEST_START_MS);
        let cache = test_cache(Arc::new(MemoryStore::new()), &clock, "ttl");

        rt.block_on(cache.set(&key, value.clone(), SetOptions::ttl_secs(ttl))).unwrap();
        clock.advance_ms(elapsed_ms);

        let stored = rt.block_on(cache.get(&key)).unwrap();
        if elapsed_ms <= ttl * 1000 {
            prop_assert_eq!(stored, Some(value));
        } else {
            prop_assert_eq!(stored, None);
            prop_assert!(rt.block_on(cache.keys()).unwrap().is_empty());
        }
    }

    // Namespaces sharing one store never see each other's keys.
    #[test]
    fn prop_namespace_isolation(
        first in namespace_strategy(),
        second in namespace_strategy(),
        key in key_strategy(),
        value in value_strategy()
    ) {
        prop_assume!(first != second);

        let rt = runtime();
        let clock = MockClock::new(TEST_START_MS);
        let store = Arc::new(MemoryStore::new());
        let a = test_cache(store.clone(), &clock, &first);
        let b = test_cache(store, &clock, &second);

        rt.block_on(a.set(&key, value.clone(), SetOptions::default())).unwrap();

        prop_assert_eq!(rt.block_on(a.get(&key)).unwrap(), Some(value));
        prop_assert_eq!(rt.block_on(b.get(&key)).unwrap(), None);
        prop_assert!(rt.block_on(b.keys()).unwrap().is_empty());
    }

    // A tombstone hides the key regardless of what was written before.
    #[test]
    fn prop_tombstone_removes_entry(
        key in key_strategy(),
        values in prop::collection::vec(value_strategy(), 1..5)
    ) {
        let rt = runtime();
        let clock = MockClock::new(TEST_START_MS);
        let cache = test_cache(Arc::new(MemoryStore::new()), &clock, "tomb");

        for value in values {
            rt.block_on(cache.set(&key, value, SetOptions::default())).unwrap();
        }
        rt.block_on(cache.set(&key, SetValue::Tombstone, SetOptions::default())).unwrap();

        prop_assert_eq!(rt.block_on(cache.get(&key)).unwrap(), None);
        prop_assert!(!rt.block_on(cache.keys()).unwrap().contains(&key));
    }
}
