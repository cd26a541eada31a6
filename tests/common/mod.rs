//! Common test utilities module
//!
//! Provides the shared Olist fixture used by the integration tests.
#![allow(dead_code)]

pub mod test_utils;

pub use test_utils::*;
