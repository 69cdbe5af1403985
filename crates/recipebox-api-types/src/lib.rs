//! Wire types shared by the recipe-sharing client and anything that talks to
//! the same HTTP API.
//!
//! Field names follow the service's JSON: `access_token`, `recipeId`,
//! `userId`. Identifiers are server-assigned integers.

use serde::{Deserialize, Serialize};

/// Server-assigned identifier for users, recipes and ratings.
pub type Id = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Id,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    /// Owner back-reference. Some list endpoints omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl Recipe {
    pub fn owner_id(&self) -> Option<Id> {
        self.user.as_ref().map(|user| user.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Id,
    pub recipe_id: Id,
    pub user_id: Id,
    pub stars: u8,
}

/// Credentials for `auth/login` and `auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
}

/// Body returned by `auth/register`.
pub type RegisteredUser = User;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: String,
}

/// Partial patch for `PUT recipes/:id`.
///
/// `id` selects the path segment and is never serialized into the body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateRecipeRequest {
    #[serde(skip)]
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl UpdateRecipeRequest {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// True when the patch carries no field to change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.ingredients.is_none()
            && self.instructions.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrUpdateRatingRequest {
    pub recipe_id: Id,
    pub stars: u8,
}

/// Error body the service sends alongside failure statuses.
///
/// `message` is either a string or a list of validation messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<ApiErrorMessage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ApiErrorMessage {
    pub fn into_text(self) -> String {
        match self {
            Self::One(message) => message,
            Self::Many(messages) => messages.join("; "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_uses_camel_case_fields() {
        let rating: Rating =
            serde_json::from_str(r#"{"id":1,"recipeId":7,"userId":42,"stars":4}"#)
                .expect("rating json");
        assert_eq!(rating.recipe_id, 7);
        assert_eq!(rating.user_id, 42);

        let body = serde_json::to_value(CreateOrUpdateRatingRequest {
            recipe_id: 7,
            stars: 4,
        })
        .expect("serialize");
        assert_eq!(body, serde_json::json!({"recipeId": 7, "stars": 4}));
    }

    #[test]
    fn update_request_omits_id_and_absent_fields() {
        let patch = UpdateRecipeRequest {
            title: Some("Soup".into()),
            ..UpdateRecipeRequest::new(9)
        };
        let body = serde_json::to_value(&patch).expect("serialize");
        assert_eq!(body, serde_json::json!({"title": "Soup"}));
        assert!(!patch.is_empty());
        assert!(UpdateRecipeRequest::new(9).is_empty());
    }

    #[test]
    fn recipe_tolerates_missing_owner_and_description() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"id":3,"title":"Cake","ingredients":["Flour"],"instructions":"Bake"}"#,
        )
        .expect("recipe json");
        assert!(recipe.user.is_none());
        assert!(recipe.description.is_none());
        assert_eq!(recipe.owner_id(), None);
    }

    #[test]
    fn error_body_accepts_message_lists() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"message":["title too short","stars must be <= 5"]}"#)
                .expect("error json");
        let text = body.message.map(ApiErrorMessage::into_text);
        assert_eq!(
            text.as_deref(),
            Some("title too short; stars must be <= 5")
        );
    }

    #[test]
    fn auth_request_debug_hides_password() {
        let request = AuthRequest {
            email: "a@b.c".into(),
            password: "hunter2".into(),
        };
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("hunter2"));
    }
}
