//! Shared helpers for integration tests.

#![allow(dead_code)]

use proptest::test_runner::Config as ProptestConfig;

pub use cosync::test_utils::{init_test_logging, wait_until};

/// Proptest configuration with a fixed case count and no persistence files.
pub fn test_proptest_config(cases: u32) -> ProptestConfig {
    ProptestConfig {
        cases,
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}
