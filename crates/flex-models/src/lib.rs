//! # flex-models
//!
//! Domain models for Flex API.
//!
//! A `User` keeps the classes it applied to in `class_applied`; a `Class` keeps
//! its applicants in `user_applied`. The two lists mirror each other.

pub use flex_core::traits::Id;

pub mod class;
pub mod user;

pub use class::{Class, ListingFields, NewClass, OwnedClass};
pub use user::{Applicant, NewUser, User, UserSummary};
