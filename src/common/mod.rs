//! Shared utilities and error handling

pub mod error;
pub mod result;
pub mod templates;
