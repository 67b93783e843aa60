//! # flex-contracts
//!
//! Validation of untrusted request bodies before they reach the services.
//!
//! Contracts check presence, JSON type, and range of every field and report
//! failures as `ValidationErrors`, first offending field first.

pub mod base;
pub mod classes;
pub mod users;

pub use base::{Body, Contract, ValidationResult};
pub use classes::ListingContract;
pub use users::{SignupContract, SignupData};
