//! # flex-core
//!
//! Core types, traits, and utilities for Flex API.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - The error taxonomy (`FlexError`, `ValidationErrors`)
//! - Result type aliases
//! - The `Id` key type and the user role enumeration
//! - Configuration types

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::*;
pub use traits::*;
pub use types::*;
