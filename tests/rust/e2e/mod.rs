//! End-to-end tests - Runs against the public OpenBeta API
//!
//! Ignored by default so the suite stays hermetic; run them explicitly with
//! `cargo test --test e2e -- --ignored` when network access is available.

mod live_api_tests;
