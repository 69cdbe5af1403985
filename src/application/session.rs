//! Credential-gated routing and the session lifecycle.

use std::sync::Arc;

use tracing::info;

use crate::cache::QueryCache;
use crate::domain::Id;
use crate::domain::credential;
use crate::infra::token::TokenHolder;

use super::error::AppError;

/// Top-level screen selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Auth,
    Home,
}

/// The token holder and query cache a signed-in user works through.
#[derive(Clone)]
pub struct Session {
    tokens: Arc<dyn TokenHolder>,
    cache: QueryCache,
}

impl Session {
    pub fn new(tokens: Arc<dyn TokenHolder>, cache: QueryCache) -> Self {
        Self { tokens, cache }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn tokens(&self) -> &Arc<dyn TokenHolder> {
        &self.tokens
    }

    pub fn route(&self) -> Route {
        if self.tokens.is_present() {
            Route::Home
        } else {
            Route::Auth
        }
    }

    /// Subject of the held credential, decoded locally.
    pub fn current_user_id(&self) -> Option<Id> {
        self.tokens
            .get()
            .and_then(|token| credential::current_user_id(&token))
    }

    /// Fail with [`AppError::NotAuthenticated`] when no credential is held.
    pub fn require_credential(&self) -> Result<(), AppError> {
        if self.tokens.is_present() {
            Ok(())
        } else {
            Err(AppError::NotAuthenticated)
        }
    }

    pub fn sign_in(&self, token: &str) -> Result<(), AppError> {
        self.tokens.set(token)?;
        info!(user_id = self.current_user_id(), "signed in");
        Ok(())
    }

    /// Drop the credential and everything cached under it.
    pub fn logout(&self) -> Result<(), AppError> {
        self.tokens.clear()?;
        self.cache.reset();
        info!("signed out");
        Ok(())
    }
}
