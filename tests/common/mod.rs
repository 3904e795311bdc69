//! Common test utilities and helpers
//!
//! Shared by the integration suites: an in-memory git double and fixtures for
//! configuration, specifications and generated trees.

#![allow(dead_code)]

pub mod fake_git;
pub mod test_fixtures;
