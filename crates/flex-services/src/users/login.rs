use flex_auth::{verify_password, CurrentUser};
use flex_contracts::base::{as_body, check_present, check_strings, string_field};
use flex_core::error::{FlexError, FlexResult, ValidationErrors};
use serde_json::Value;
use tracing::{debug, info};

use super::{blocking, AccountService, AuthResponse};

pub const INVALID_CREDENTIALS: &str = "Incorrect username or password";

const LOGIN_FIELDS: [&str; 2] = ["username", "password"];

impl AccountService {
    /// Exchange `{username, password}` for a token. Unknown accounts and wrong
    /// passwords get the same answer.
    pub async fn login(&self, body: &Value) -> FlexResult<AuthResponse> {
        let body = as_body(body)?;
        let mut errors = ValidationErrors::new();
        check_present(body, &LOGIN_FIELDS, &mut errors);
        check_strings(body, &LOGIN_FIELDS, &mut errors);
        errors.into_result()?;

        let email = string_field(body, "username");
        let Some(user) = self.users.find_by_email(email).await? else {
            debug!("login: unknown account");
            return Err(FlexError::unauthorized(INVALID_CREDENTIALS));
        };

        let password = string_field(body, "password").to_string();
        let stored = user.hashed_password.clone();
        if !blocking(move || verify_password(&password, &stored)).await? {
            debug!(user_id = user.id, "login: wrong password");
            return Err(FlexError::unauthorized(INVALID_CREDENTIALS));
        }

        info!(user_id = user.id, "Logged in");
        self.respond(user.summary())
    }

    /// New token for an already authenticated caller
    pub async fn refresh(&self, current: &CurrentUser) -> FlexResult<AuthResponse> {
        let user = self
            .users
            .find_by_id(current.id)
            .await?
            .ok_or_else(|| FlexError::unauthorized("Account no longer exists"))?;

        self.respond(user.summary())
    }
}
