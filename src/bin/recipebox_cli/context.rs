#![deny(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use recipebox::application::{AppError, Confirm, FixedAnswer, Session};
use recipebox::cache::{CacheConfig, QueryCache};
use recipebox::config::{LoadError, Settings};
use recipebox::domain::error::ValidationError;
use recipebox::infra::error::InfraError;
use recipebox::infra::http::{ClientError, HttpRecipeApi, RecipeApi};
use recipebox::infra::token::{FileTokenHolder, TokenHolder};
use thiserror::Error;

use crate::prompt::StdinConfirm;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error("failed to read {what} from stdin: {source}")]
    Stdin {
        what: &'static str,
        source: std::io::Error,
    },
    #[error("{0}")]
    Query(String),
    #[error("failed to render output: {0}")]
    Render(String),
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        Self::App(err.into())
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        Self::App(err.into())
    }
}

impl From<InfraError> for CliError {
    fn from(err: InfraError) -> Self {
        Self::App(err.into())
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        Self::App(err.into())
    }
}

impl CliError {
    /// Line printed on stderr before exiting.
    pub fn render(&self) -> String {
        match self {
            Self::App(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

/// Everything a command handler needs.
#[derive(Clone)]
pub struct Ctx {
    pub session: Session,
}

impl Ctx {
    pub fn new(api: Arc<dyn RecipeApi>, tokens: Arc<dyn TokenHolder>, cache: CacheConfig) -> Self {
        let cache = QueryCache::new(api, cache);
        Self {
            session: Session::new(tokens, cache),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        self.session.cache()
    }

    /// Fail before any request when no credential is held.
    pub fn require_login(&self) -> Result<(), CliError> {
        self.session.require_credential().map_err(CliError::from)
    }

    /// Confirmation for destructive commands: prompt unless `--yes`.
    pub fn confirmer(assume_yes: bool) -> Box<dyn Confirm> {
        if assume_yes {
            Box::new(FixedAnswer(true))
        } else {
            Box::new(StdinConfirm)
        }
    }
}

pub fn build_ctx(settings: &Settings) -> Result<Ctx, CliError> {
    let tokens: Arc<dyn TokenHolder> =
        Arc::new(FileTokenHolder::new(settings.session.token_file.clone()));
    let api = HttpRecipeApi::with_timeout(
        settings.api.base_url.as_str(),
        Arc::clone(&tokens),
        settings.api.timeout,
    )?;
    Ok(Ctx::new(
        Arc::new(api),
        tokens,
        CacheConfig::from(&settings.cache),
    ))
}
