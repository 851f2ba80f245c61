//! Property-based test generators using proptest.
//!
//! Provides strategies for stream names, payloads and whole directories
//! that keep the constraints of the container format.

use hlpdec_codec::Method;
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Strategy for internal stream names such as `|TOPIC` or `|bm12`.
pub fn stream_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"\|?[A-Za-z][A-Za-z0-9_.]{0,11}").expect("Invalid regex")
}

/// Strategy for arbitrary stream payloads.
pub fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..2048)
}

/// Strategy for payloads with long runs and repeats, the shape compressed
/// help text usually has.
pub fn repetitive_payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec((any::<u8>(), 1usize..40), 0..64).prop_map(|runs| {
        runs.into_iter()
            .flat_map(|(byte, count)| std::iter::repeat(byte).take(count))
            .collect()
    })
}

/// Strategy for all four decompression methods.
pub fn method_strategy() -> impl Strategy<Value = Method> {
    prop_oneof![
        Just(Method::Copy),
        Just(Method::RunLength),
        Just(Method::Lz77),
        Just(Method::Combined),
    ]
}

/// Strategy for a directory: distinct names mapped to payloads.
pub fn directory_strategy(max_streams: usize) -> impl Strategy<Value = BTreeMap<String, Vec<u8>>> {
    prop::collection::btree_map(
        stream_name_strategy(),
        prop::collection::vec(any::<u8>(), 0..64),
        0..max_streams,
    )
}

/// Strategy for directory page sizes small enough to force index levels.
pub fn page_size_strategy() -> impl Strategy<Value = u16> {
    prop_oneof![Just(64u16), Just(96), Just(128), Just(1024)]
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn stream_names_fit_directory(name in stream_name_strategy()) {
            prop_assert!(!name.is_empty());
            prop_assert!(name.len() <= 13);
            prop_assert!(!name.as_bytes().contains(&0));
        }

        #[test]
        fn repetitive_payloads_have_runs(data in repetitive_payload_strategy()) {
            prop_assert!(data.len() < 64 * 40);
        }

        #[test]
        fn method_bits_round_trip(method in method_strategy()) {
            prop_assert_eq!(Method::from_bits(method.bits()).unwrap(), method);
        }
    }
}
