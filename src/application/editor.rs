//! Create/edit recipe form.

use recipebox_api_types::{CreateRecipeRequest, Id, Recipe, UpdateRecipeRequest};

use crate::cache::QueryCache;
use crate::domain::error::ValidationError;
use crate::domain::recipes::IngredientList;

use super::error::AppError;

#[derive(Debug, Clone, Default)]
pub struct RecipeEditor {
    editing: Option<Id>,
    pub title: String,
    pub description: String,
    pub instructions: String,
    /// Text of the ingredient being typed, added by [`Self::add_ingredient`].
    pub ingredient_input: String,
    ingredients: IngredientList,
}

impl RecipeEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form prefilled from `recipe`; submitting updates it.
    pub fn for_recipe(recipe: &Recipe) -> Self {
        Self {
            editing: Some(recipe.id),
            title: recipe.title.clone(),
            description: recipe.description.clone().unwrap_or_default(),
            instructions: recipe.instructions.clone(),
            ingredient_input: String::new(),
            ingredients: IngredientList::from_values(&recipe.ingredients),
        }
    }

    pub fn editing(&self) -> Option<Id> {
        self.editing
    }

    pub fn ingredients(&self) -> &[String] {
        self.ingredients.as_slice()
    }

    /// Move the typed ingredient into the list. The input is cleared only
    /// when the ingredient was accepted.
    pub fn add_ingredient(&mut self) -> bool {
        let added = self.ingredients.add(&self.ingredient_input);
        if added {
            self.ingredient_input.clear();
        }
        added
    }

    pub fn remove_ingredient(&mut self, index: usize) -> Option<String> {
        self.ingredients.remove(index)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.ingredients.is_empty() {
            return Err(ValidationError::NoIngredients);
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::required("title"));
        }
        if self.instructions.trim().is_empty() {
            return Err(ValidationError::required("instructions"));
        }
        Ok(())
    }

    fn description(&self) -> Option<String> {
        let trimmed = self.description.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Create or update the recipe, then reset the form.
    ///
    /// Nothing is sent when validation fails.
    pub async fn submit(&mut self, cache: &QueryCache) -> Result<Recipe, AppError> {
        self.validate()?;

        let saved = match self.editing {
            None => {
                let request = CreateRecipeRequest {
                    title: self.title.trim().to_string(),
                    description: self.description(),
                    ingredients: self.ingredients.to_vec(),
                    instructions: self.instructions.trim().to_string(),
                };
                cache.create_recipe(&request).await?
            }
            Some(id) => {
                let request = UpdateRecipeRequest {
                    title: Some(self.title.trim().to_string()),
                    // An empty string clears the stored description.
                    description: Some(self.description.trim().to_string()),
                    ingredients: Some(self.ingredients.to_vec()),
                    instructions: Some(self.instructions.trim().to_string()),
                    ..UpdateRecipeRequest::new(id)
                };
                cache.update_recipe(&request).await?
            }
        };

        self.reset();
        Ok(saved)
    }
}
