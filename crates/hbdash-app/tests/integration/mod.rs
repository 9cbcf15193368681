//! Integration tests for hbdash-app.
//!
//! These tests run full refresh cycles:
//! - against a scripted in-memory source
//! - against a mock management API over real HTTP

pub mod common;
