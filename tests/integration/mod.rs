//! Integration tests for ishell.

pub mod common;
pub mod editor_test;
pub mod headless_test;
pub mod registry_test;
pub mod session_test;
