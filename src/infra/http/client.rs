use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use recipebox_api_types::{
    ApiErrorBody, ApiErrorMessage, AuthRequest, AuthResponse, CreateOrUpdateRatingRequest,
    CreateRecipeRequest, Id, Rating, Recipe, RegisteredUser, UpdateRecipeRequest,
};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{ClientError, RecipeApi};
use crate::infra::token::TokenHolder;

/// [`RecipeApi`] over HTTP with JSON bodies.
#[derive(Clone)]
pub struct HttpRecipeApi {
    client: Client,
    base: Url,
    tokens: Arc<dyn TokenHolder>,
}

impl std::fmt::Debug for HttpRecipeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRecipeApi")
            .field("base", &self.base.as_str())
            .field("authenticated", &self.tokens.is_present())
            .finish()
    }
}

impl HttpRecipeApi {
    pub fn new(base: &str, tokens: Arc<dyn TokenHolder>) -> Result<Self, ClientError> {
        Self::with_timeout(base, tokens, None)
    }

    pub fn with_timeout(
        base: &str,
        tokens: Arc<dyn TokenHolder>,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let base = normalize_base(base)?;
        let mut builder = Client::builder().user_agent(Self::user_agent());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            base,
            tokens,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("recipebox/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base.join(path).map_err(ClientError::Url)
    }

    /// `Bearer <token>` when a credential is held.
    pub fn auth_header(&self) -> Result<Option<HeaderValue>, ClientError> {
        match self.tokens.get() {
            Some(token) => HeaderValue::from_str(&format!("Bearer {token}"))
                .map(Some)
                .map_err(|err| ClientError::Body(format!("credential is not a valid header: {err}"))),
            None => Ok(None),
        }
    }

    fn builder(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.url(path)?;
        debug!(%method, path, "sending request");
        let mut req = self.client.request(method, url);
        if let Some(header) = self.auth_header()? {
            req = req.header(AUTHORIZATION, header);
        }
        Ok(req)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ClientError> {
        let mut req = self.builder(method.clone(), path)?;
        if let Some(b) = body {
            req = req.json(&b);
        }
        let resp = req.send().await.inspect_err(|err| {
            warn!(%method, path, error = %err, "request failed before a response");
        })?;
        Self::handle(resp).await
    }

    async fn request_unit(&self, method: Method, path: &str) -> Result<(), ClientError> {
        let resp = self
            .builder(method.clone(), path)?
            .send()
            .await
            .inspect_err(|err| {
                warn!(%method, path, error = %err, "request failed before a response");
            })?;
        let status = resp.status();
        if !status.is_success() {
            let bytes = resp.bytes().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &bytes));
        }
        Ok(())
    }

    async fn handle<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            let err = api_error(status.as_u16(), &bytes);
            warn!(status = status.as_u16(), error = %err, "service rejected request");
            return Err(err);
        }
        serde_json::from_slice(&bytes).map_err(|err| ClientError::Body(err.to_string()))
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, ClientError> {
    serde_json::to_value(value).map_err(|err| ClientError::Body(err.to_string()))
}

fn normalize_base(base: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(base)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn api_error(status: u16, body: &[u8]) -> ClientError {
    let message = serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .map(ApiErrorMessage::into_text)
        .or_else(|| {
            let text = String::from_utf8_lossy(body).trim().to_string();
            (!text.is_empty()).then_some(text)
        });
    ClientError::api(status, message)
}

#[async_trait]
impl RecipeApi for HttpRecipeApi {
    async fn login(&self, request: &AuthRequest) -> Result<AuthResponse, ClientError> {
        self.request(Method::POST, "auth/login", Some(to_value(request)?)).await
    }

    async fn register(&self, request: &AuthRequest) -> Result<RegisteredUser, ClientError> {
        self.request(Method::POST, "auth/register", Some(to_value(request)?))
            .await
    }

    async fn all_recipes(&self) -> Result<Vec<Recipe>, ClientError> {
        self.request(Method::GET, "recipes", None).await
    }

    async fn my_recipes(&self) -> Result<Vec<Recipe>, ClientError> {
        self.request(Method::GET, "recipes/mine", None).await
    }

    async fn recipe(&self, id: Id) -> Result<Recipe, ClientError> {
        self.request(Method::GET, &format!("recipes/{id}"), None)
            .await
    }

    async fn create_recipe(&self, request: &CreateRecipeRequest) -> Result<Recipe, ClientError> {
        self.request(Method::POST, "recipes", Some(to_value(request)?)).await
    }

    async fn update_recipe(&self, request: &UpdateRecipeRequest) -> Result<Recipe, ClientError> {
        let path = format!("recipes/{}", request.id);
        self.request(Method::PUT, &path, Some(to_value(request)?)).await
    }

    async fn delete_recipe(&self, id: Id) -> Result<(), ClientError> {
        self.request_unit(Method::DELETE, &format!("recipes/{id}"))
            .await
    }

    async fn upsert_rating(
        &self,
        request: &CreateOrUpdateRatingRequest,
    ) -> Result<Rating, ClientError> {
        self.request(Method::POST, "ratings", Some(to_value(request)?)).await
    }

    async fn ratings_for_recipe(&self, recipe_id: Id) -> Result<Vec<Rating>, ClientError> {
        let path = format!("ratings/recipe/{recipe_id}");
        self.request(Method::GET, &path, None).await
    }

    async fn delete_rating(&self, recipe_id: Id) -> Result<(), ClientError> {
        let path = format!("ratings/recipe/{recipe_id}");
        self.request_unit(Method::DELETE, &path).await
    }
}
