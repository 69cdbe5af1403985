use async_trait::async_trait;
use recipebox_api_types::{
    AuthRequest, AuthResponse, CreateOrUpdateRatingRequest, CreateRecipeRequest, Id, Rating,
    Recipe, RegisteredUser, UpdateRecipeRequest,
};

use super::ClientError;

/// One method per endpoint of the remote recipe service.
///
/// The query cache only talks to the service through this trait, so tests
/// substitute an in-memory implementation.
#[async_trait]
pub trait RecipeApi: Send + Sync {
    /// `POST auth/login`
    async fn login(&self, request: &AuthRequest) -> Result<AuthResponse, ClientError>;

    /// `POST auth/register`
    async fn register(&self, request: &AuthRequest) -> Result<RegisteredUser, ClientError>;

    /// `GET recipes`
    async fn all_recipes(&self) -> Result<Vec<Recipe>, ClientError>;

    /// `GET recipes/mine`
    async fn my_recipes(&self) -> Result<Vec<Recipe>, ClientError>;

    /// `GET recipes/:id`
    async fn recipe(&self, id: Id) -> Result<Recipe, ClientError>;

    /// `POST recipes`
    async fn create_recipe(&self, request: &CreateRecipeRequest) -> Result<Recipe, ClientError>;

    /// `PUT recipes/:id` with the partial patch as body.
    async fn update_recipe(&self, request: &UpdateRecipeRequest) -> Result<Recipe, ClientError>;

    /// `DELETE recipes/:id`
    async fn delete_recipe(&self, id: Id) -> Result<(), ClientError>;

    /// `POST ratings`, an upsert keyed on (recipe, caller).
    async fn upsert_rating(
        &self,
        request: &CreateOrUpdateRatingRequest,
    ) -> Result<Rating, ClientError>;

    /// `GET ratings/recipe/:id`
    async fn ratings_for_recipe(&self, recipe_id: Id) -> Result<Vec<Rating>, ClientError>;

    /// `DELETE ratings/recipe/:id`, removing the caller's rating.
    async fn delete_rating(&self, recipe_id: Id) -> Result<(), ClientError>;
}
