use flex_auth::hash_password;
use flex_contracts::SignupContract;
use flex_core::error::{FlexError, FlexResult};
use flex_core::types::UserRole;
use flex_db::RepositoryError;
use flex_models::NewUser;
use serde_json::Value;
use tracing::info;

use super::{blocking, AccountService, AuthResponse};

const EMAIL_TAKEN: &str = "Email already registered";

impl AccountService {
    /// Validate a signup body, store the account and issue its first token
    pub async fn signup(&self, body: &Value) -> FlexResult<AuthResponse> {
        let data = SignupContract::new().parse(body)?;

        if self.users.find_by_email(&data.email).await?.is_some() {
            return Err(FlexError::invalid("email", EMAIL_TAKEN));
        }

        let password = data.password;
        let hashed_password = blocking(move || hash_password(&password)).await?;

        let studio = match data.role {
            UserRole::Studio => Some(data.studio),
            UserRole::Instructor => Some(data.studio).filter(|s| !s.is_empty()),
        };

        let user = self
            .users
            .create(NewUser {
                email: data.email,
                hashed_password,
                first_name: data.first_name,
                last_name: data.last_name,
                studio,
                role: data.role,
            })
            .await
            .map_err(|e| match e {
                // lost a race with another signup for the same email
                RepositoryError::Conflict(_) => FlexError::invalid("email", EMAIL_TAKEN),
                other => other.into(),
            })?;

        info!(user_id = user.id, role = %user.role, "Account created");
        self.respond(user.summary())
    }
}
