//! Integration tests for ishell.
//!
//! Everything runs against the in-memory terminal; no TTY is needed.
//!
//! Run with: `cargo test --test integration_tests`

mod integration;
