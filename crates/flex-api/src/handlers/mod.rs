//! API handlers

pub mod classes;
pub mod users;
