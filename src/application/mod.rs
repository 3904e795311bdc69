//! Use cases and the repository session they drive

pub mod services;
pub mod use_cases;
