//! Shared test harness
//!
//! Each integration test binary compiles its own copy, so not every item is
//! used from every binary.

#![allow(dead_code)]

pub mod mock_ollama;

/// Initialize log capture for a test binary
///
/// Safe to call from every test; only the first call installs the
/// subscriber. Honors `RUST_LOG` for selective output when debugging.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
