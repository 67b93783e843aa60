//! Class listing contracts
//!
//! Create and edit share the same seven-field listing contract; `postedBy`
//! and `datePosted` come from the authenticated caller, not the body.

mod listing;

pub use listing::{ListingContract, NUMBER_FIELDS, STRING_FIELDS};
