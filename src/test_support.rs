//! In-memory recipe service shared by unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use recipebox_api_types::{
    AuthRequest, AuthResponse, CreateOrUpdateRatingRequest, CreateRecipeRequest, Id, Rating,
    Recipe, RegisteredUser, UpdateRecipeRequest, User,
};
use tokio::sync::Semaphore;

use crate::cache::QueryCache;
use crate::infra::http::{ClientError, RecipeApi};

pub(crate) const CALLER_ID: Id = 1;
pub(crate) const CALLER_EMAIL: &str = "cook@example.com";

#[derive(Default)]
struct FakeState {
    recipes: Vec<Recipe>,
    ratings: Vec<Rating>,
    next_id: Id,
    failures: HashMap<&'static str, ClientError>,
    calls: HashMap<&'static str, usize>,
    bodies: Vec<(&'static str, serde_json::Value)>,
}

/// Behaves like the remote service for a single authenticated caller.
///
/// Every endpoint records its call, then waits on the gate when one is
/// installed, then fails if a failure was injected for it.
#[derive(Default)]
pub(crate) struct FakeRecipeApi {
    state: Mutex<FakeState>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl FakeRecipeApi {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn caller() -> User {
        User {
            id: CALLER_ID,
            email: CALLER_EMAIL.into(),
        }
    }

    pub(crate) fn with_recipes(titles: &[&str]) -> Arc<Self> {
        let api = Self::new();
        for title in titles {
            api.seed_recipe(title, Some(Self::caller()));
        }
        api
    }

    pub(crate) fn seed_recipe(&self, title: &str, owner: Option<User>) -> Recipe {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let recipe = Recipe {
            id: state.next_id,
            title: title.into(),
            description: None,
            ingredients: vec!["Water".into()],
            instructions: "Combine.".into(),
            user: owner,
        };
        state.recipes.push(recipe.clone());
        recipe
    }

    pub(crate) fn seed_rating(&self, recipe_id: Id, user_id: Id, stars: u8) -> Rating {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let rating = Rating {
            id: state.next_id,
            recipe_id,
            user_id,
            stars,
        };
        state.ratings.push(rating.clone());
        rating
    }

    pub(crate) fn fail(&self, endpoint: &'static str, error: ClientError) {
        self.state.lock().unwrap().failures.insert(endpoint, error);
    }

    pub(crate) fn recover(&self, endpoint: &'static str) {
        self.state.lock().unwrap().failures.remove(endpoint);
    }

    pub(crate) fn calls(&self, endpoint: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(endpoint)
            .copied()
            .unwrap_or(0)
    }

    /// Request bodies sent to `endpoint`, in call order.
    pub(crate) fn bodies(&self, endpoint: &str) -> Vec<serde_json::Value> {
        self.state
            .lock()
            .unwrap()
            .bodies
            .iter()
            .filter(|(name, _)| *name == endpoint)
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Hold every call until [`FakeRecipeApi::release`] hands out permits.
    pub(crate) fn hold(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub(crate) fn release(&self, calls: usize) {
        if let Some(gate) = self.gate.lock().unwrap().as_ref() {
            gate.add_permits(calls);
        }
    }

    async fn enter(&self, endpoint: &'static str) -> Result<(), ClientError> {
        *self
            .state
            .lock()
            .unwrap()
            .calls
            .entry(endpoint)
            .or_default() += 1;

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate open").forget();
        }

        match self.state.lock().unwrap().failures.get(endpoint) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn record_body(&self, endpoint: &'static str, body: &impl serde::Serialize) {
        let value = serde_json::to_value(body).expect("serializable body");
        self.state.lock().unwrap().bodies.push((endpoint, value));
    }
}

#[async_trait]
impl RecipeApi for FakeRecipeApi {
    async fn login(&self, request: &AuthRequest) -> Result<AuthResponse, ClientError> {
        self.record_body("login", request);
        self.enter("login").await?;
        Ok(AuthResponse {
            access_token: token_for(CALLER_ID),
        })
    }

    async fn register(&self, request: &AuthRequest) -> Result<RegisteredUser, ClientError> {
        self.record_body("register", request);
        self.enter("register").await?;
        Ok(User {
            id: CALLER_ID,
            email: request.email.clone(),
        })
    }

    async fn all_recipes(&self) -> Result<Vec<Recipe>, ClientError> {
        self.enter("list-all-recipes").await?;
        Ok(self.state.lock().unwrap().recipes.clone())
    }

    async fn my_recipes(&self) -> Result<Vec<Recipe>, ClientError> {
        self.enter("list-my-recipes").await?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .recipes
            .iter()
            .filter(|recipe| recipe.owner_id() == Some(CALLER_ID))
            .cloned()
            .collect())
    }

    async fn recipe(&self, id: Id) -> Result<Recipe, ClientError> {
        self.enter("get-recipe-by-id").await?;
        self.state
            .lock()
            .unwrap()
            .recipes
            .iter()
            .find(|recipe| recipe.id == id)
            .cloned()
            .ok_or_else(|| ClientError::api(404, Some("Recipe not found".into())))
    }

    async fn create_recipe(&self, request: &CreateRecipeRequest) -> Result<Recipe, ClientError> {
        self.record_body("create-recipe", request);
        self.enter("create-recipe").await?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let recipe = Recipe {
            id: state.next_id,
            title: request.title.clone(),
            description: request.description.clone(),
            ingredients: request.ingredients.clone(),
            instructions: request.instructions.clone(),
            user: Some(Self::caller()),
        };
        state.recipes.push(recipe.clone());
        Ok(recipe)
    }

    async fn update_recipe(&self, request: &UpdateRecipeRequest) -> Result<Recipe, ClientError> {
        self.record_body("update-recipe", request);
        self.enter("update-recipe").await?;
        let mut state = self.state.lock().unwrap();
        let recipe = state
            .recipes
            .iter_mut()
            .find(|recipe| recipe.id == request.id)
            .ok_or_else(|| ClientError::api(404, Some("Recipe not found".into())))?;
        if let Some(title) = &request.title {
            recipe.title = title.clone();
        }
        if let Some(description) = &request.description {
            recipe.description = Some(description.clone());
        }
        if let Some(ingredients) = &request.ingredients {
            recipe.ingredients = ingredients.clone();
        }
        if let Some(instructions) = &request.instructions {
            recipe.instructions = instructions.clone();
        }
        Ok(recipe.clone())
    }

    async fn delete_recipe(&self, id: Id) -> Result<(), ClientError> {
        self.enter("delete-recipe").await?;
        let mut state = self.state.lock().unwrap();
        state.recipes.retain(|recipe| recipe.id != id);
        state.ratings.retain(|rating| rating.recipe_id != id);
        Ok(())
    }

    async fn upsert_rating(
        &self,
        request: &CreateOrUpdateRatingRequest,
    ) -> Result<Rating, ClientError> {
        self.record_body("upsert-rating", request);
        self.enter("upsert-rating").await?;
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state
            .ratings
            .iter_mut()
            .find(|rating| rating.recipe_id == request.recipe_id && rating.user_id == CALLER_ID)
        {
            existing.stars = request.stars;
            return Ok(existing.clone());
        }
        state.next_id += 1;
        let rating = Rating {
            id: state.next_id,
            recipe_id: request.recipe_id,
            user_id: CALLER_ID,
            stars: request.stars,
        };
        state.ratings.push(rating.clone());
        Ok(rating)
    }

    async fn ratings_for_recipe(&self, recipe_id: Id) -> Result<Vec<Rating>, ClientError> {
        self.enter("list-ratings-by-recipe").await?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .ratings
            .iter()
            .filter(|rating| rating.recipe_id == recipe_id)
            .cloned()
            .collect())
    }

    async fn delete_rating(&self, recipe_id: Id) -> Result<(), ClientError> {
        self.enter("delete-rating").await?;
        self.state
            .lock()
            .unwrap()
            .ratings
            .retain(|rating| !(rating.recipe_id == recipe_id && rating.user_id == CALLER_ID));
        Ok(())
    }
}

/// A three-part credential whose payload carries `sub: user_id`.
pub(crate) fn token_for(user_id: Id) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":{user_id},"email":"{CALLER_EMAIL}"}}"#))
    )
}

/// A cache over `api` with default settings.
pub(crate) fn cache_over(api: &Arc<FakeRecipeApi>) -> QueryCache {
    QueryCache::new(api.clone(), Default::default())
}

/// Let spawned fetch tasks run to completion on a current-thread runtime.
pub(crate) async fn settle_tasks() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
