//! Login and registration form.

use recipebox_api_types::{AuthRequest, User};
use tracing::debug;

use crate::domain::error::ValidationError;

use super::error::AppError;
use super::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The credential is stored; the session now routes home.
    SignedIn,
    /// The account exists; the form switched to login mode.
    Registered(User),
}

#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    mode: AuthMode,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl AuthForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Switch between login and register, clearing every field.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.clear();
    }

    pub fn clear(&mut self) {
        self.email.clear();
        self.password.clear();
        self.confirm_password.clear();
    }

    fn request(&self) -> Result<AuthRequest, ValidationError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::required("email"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::required("password"));
        }
        if self.mode == AuthMode::Register && self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(AuthRequest {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }

    /// Validate locally, then log in or register.
    ///
    /// A validation failure issues no request. Fields are kept on any
    /// failure so the user can correct them.
    pub async fn submit(&mut self, session: &Session) -> Result<AuthOutcome, AppError> {
        let request = self.request()?;
        match self.mode {
            AuthMode::Login => {
                let response = session.cache().login(&request).await?;
                session.sign_in(&response.access_token)?;
                self.clear();
                Ok(AuthOutcome::SignedIn)
            }
            AuthMode::Register => {
                let user = session.cache().register(&request).await?;
                debug!(user_id = user.id, "registered; switching to login");
                self.mode = AuthMode::Login;
                self.clear();
                Ok(AuthOutcome::Registered(user))
            }
        }
    }
}
