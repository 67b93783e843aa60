//! Account services: signup, login, token refresh

mod login;
mod signup;

pub use login::INVALID_CREDENTIALS;

use std::sync::Arc;

use flex_auth::{JwtError, JwtService, PasswordError};
use flex_core::error::FlexError;
use flex_db::UserDirectory;
use flex_models::UserSummary;
use serde::Serialize;

/// Token plus the public view of the account it was issued for
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: UserSummary,
    pub jwt: String,
}

/// Issues tokens for new and returning accounts
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserDirectory>,
    jwt: Arc<JwtService>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserDirectory>, jwt: Arc<JwtService>) -> Self {
        Self { users, jwt }
    }

    fn respond(&self, user: UserSummary) -> Result<AuthResponse, FlexError> {
        let jwt = self
            .jwt
            .issue(user.id, user.role, &user.first_name)
            .map_err(token_error)?;
        Ok(AuthResponse { user, jwt })
    }
}

fn token_error(err: JwtError) -> FlexError {
    FlexError::Internal(err.to_string())
}

fn password_error(err: PasswordError) -> FlexError {
    FlexError::Internal(err.to_string())
}

/// Run argon2 off the async workers
async fn blocking<T, F>(work: F) -> Result<T, FlexError>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| FlexError::Internal(format!("password task failed: {e}")))?
        .map_err(password_error)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use flex_auth::JwtService;
    use flex_db::MemoryUserDirectory;
    use serde_json::{json, Value};

    use super::AccountService;

    pub const SECRET: &[u8] = b"test-secret-key-at-least-32-bytes";

    pub fn service() -> (AccountService, Arc<MemoryUserDirectory>, Arc<JwtService>) {
        let users = Arc::new(MemoryUserDirectory::new());
        let jwt = Arc::new(JwtService::new(SECRET, 3600));
        (AccountService::new(users.clone(), jwt.clone()), users, jwt)
    }

    pub fn signup_body(email: &str, role: &str) -> Value {
        json!({
            "type": role,
            "studio": "test studio",
            "firstName": "first",
            "lastName": "last",
            "email": email,
            "password": "password",
            "confirmPass": "password"
        })
    }
}
