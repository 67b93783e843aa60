//! User contracts

mod signup;

pub use signup::{SignupContract, SignupData, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH};
