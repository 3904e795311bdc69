//! Core business types: modules, versions, remotes and configuration

pub mod entities;
pub mod value_objects;
