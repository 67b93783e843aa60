//! # flex-services
//!
//! Application services for Flex API.
//!
//! - [`ApplicationCoordinator`]: applying to and withdrawing from classes,
//!   listing management with cascading cleanup, and the repair pass that
//!   restores the user/class link invariant
//! - [`AccountService`]: signup, login and token refresh

pub mod classes;
pub mod users;

pub use classes::{ApplicationCoordinator, ListingFilters, RepairReport};
pub use users::{AccountService, AuthResponse};
