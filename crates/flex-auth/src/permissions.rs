//! The authenticated caller and the few role checks the API needs

use flex_core::error::{FlexError, FlexResult};
use flex_core::traits::Id;
use flex_core::types::UserRole;
use flex_models::User;

use crate::jwt::{Claims, JwtError};

/// Identity resolved from a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Id,
    pub role: UserRole,
    pub first_name: String,
}

impl CurrentUser {
    pub fn new(id: Id, role: UserRole, first_name: impl Into<String>) -> Self {
        Self {
            id,
            role,
            first_name: first_name.into(),
        }
    }

    pub fn from_claims(claims: &Claims) -> Result<Self, JwtError> {
        Ok(Self::new(claims.user_id()?, claims.role, claims.first_name.clone()))
    }

    pub fn is_studio(&self) -> bool {
        self.role.can_post_listings()
    }

    /// Only studios may post listings
    pub fn require_studio(&self) -> FlexResult<()> {
        if self.is_studio() {
            Ok(())
        } else {
            Err(FlexError::forbidden("Only studio accounts can post classes"))
        }
    }

    /// The path identity must be the caller
    pub fn require_self(&self, user_id: Id) -> FlexResult<()> {
        if self.id == user_id {
            Ok(())
        } else {
            Err(FlexError::forbidden("Cannot act on behalf of another user"))
        }
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role, user.first_name.clone())
    }
}
