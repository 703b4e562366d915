//! Integration tests for the proxy.
//!
//! The mock upstream lives in `common` and plays the part of the remote API.

pub mod common;
pub mod preflight_test;
