//! User model
//!
//! Table: users

use chrono::{DateTime, Utc};
use flex_core::traits::Id;
use flex_core::types::UserRole;
use serde::{Deserialize, Serialize};

/// User entity
///
/// An account that is either a studio (posts listings) or an instructor
/// (applies to them).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,

    /// Email address (unique, used as login)
    pub email: String,

    /// Argon2 PHC string
    #[serde(skip_serializing, default)]
    pub hashed_password: String,

    pub first_name: String,
    pub last_name: String,

    /// Studio name for studio accounts
    pub studio: Option<String>,

    #[serde(rename = "type")]
    pub role: UserRole,

    /// Classes this user applied to, no duplicates
    pub class_applied: Vec<Id>,

    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn has_applied(&self, class_id: Id) -> bool {
        self.class_applied.contains(&class_id)
    }

    pub fn applicant(&self) -> Applicant {
        Applicant {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            first_name: self.first_name.clone(),
            role: self.role,
        }
    }
}

/// Public view of a user, also the identity carried in tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Id,
    pub first_name: String,
    #[serde(rename = "type")]
    pub role: UserRole,
}

/// How an applicant is shown to the studio that owns the class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Data for inserting a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
    pub first_name: String,
    pub last_name: String,
    pub studio: Option<String>,
    pub role: UserRole,
}
