//! Shared identity types

/// Primary key type
pub type Id = i64;
