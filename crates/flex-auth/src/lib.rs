//! # flex-auth
//!
//! Authentication for Flex API.
//!
//! - HS256 JWT issue and validation
//! - Argon2 password hashing
//! - `CurrentUser`, the identity handed to the services

pub mod jwt;
pub mod password;
pub mod permissions;

pub use jwt::{extract_bearer_token, Claims, JwtError, JwtService};
pub use password::{hash_password, verify_password, PasswordError};
pub use permissions::CurrentUser;
