//! Signup contract for new accounts

use std::sync::LazyLock;

use flex_core::error::ValidationErrors;
use flex_core::types::UserRole;
use regex::Regex;
use serde_json::Value;

use crate::base::{as_body, check_present, check_strings, string_field, Body, Contract, ValidationResult};

/// Loose email shape: something@something.something
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"));

pub const PASSWORD_MIN_LENGTH: usize = 8;
/// argon2 accepts longer input, but the limit is part of the public contract.
pub const PASSWORD_MAX_LENGTH: usize = 72;

const FIELDS: [&str; 7] = [
    "type",
    "studio",
    "firstName",
    "lastName",
    "email",
    "password",
    "confirmPass",
];

/// Validated signup input. `password` is still plaintext.
#[derive(Debug, Clone, PartialEq)]
pub struct SignupData {
    pub role: UserRole,
    pub studio: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Contract for account creation
#[derive(Debug, Default, Clone, Copy)]
pub struct SignupContract;

impl SignupContract {
    pub fn new() -> Self {
        Self
    }

    /// Validate the body and extract typed signup data
    pub fn parse(&self, value: &Value) -> Result<SignupData, ValidationErrors> {
        let body = as_body(value)?;
        self.validate(body)?;

        let role = string_field(body, "type")
            .parse::<UserRole>()
            .map_err(|e| single("type", e.to_string()))?;

        Ok(SignupData {
            role,
            studio: string_field(body, "studio").to_string(),
            first_name: string_field(body, "firstName").to_string(),
            last_name: string_field(body, "lastName").to_string(),
            email: string_field(body, "email").to_string(),
            password: string_field(body, "password").to_string(),
        })
    }
}

impl Contract<Body> for SignupContract {
    fn validate(&self, body: &Body) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        check_present(body, &FIELDS, &mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }

        check_strings(body, &FIELDS, &mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }

        if string_field(body, "type").parse::<UserRole>().is_err() {
            return Err(single("type", "User type must be instructor or studio"));
        }

        if !EMAIL_PATTERN.is_match(string_field(body, "email")) {
            return Err(single("email", "Invalid email entered"));
        }

        if let Some(field) = FIELDS
            .iter()
            .find(|f| string_field(body, f) != string_field(body, f).trim())
        {
            return Err(single(*field, "Cannot start or end with whitespace"));
        }

        let password = string_field(body, "password");
        if password.chars().count() < PASSWORD_MIN_LENGTH {
            return Err(single(
                "password",
                format!("Must be at least {PASSWORD_MIN_LENGTH} character(s) long"),
            ));
        }
        if password.chars().count() > PASSWORD_MAX_LENGTH {
            return Err(single(
                "password",
                format!("Must be less than {PASSWORD_MAX_LENGTH} characters long"),
            ));
        }

        if password != string_field(body, "confirmPass") {
            return Err(single("password", "Passwords do not match"));
        }

        Ok(())
    }
}

fn single(field: &str, message: impl Into<String>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, message);
    errors
}
