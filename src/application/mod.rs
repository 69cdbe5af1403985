//! View-facing services over the query cache.

pub mod auth;
pub mod card;
pub mod editor;
pub mod error;
pub mod home;
pub mod session;

pub use auth::{AuthForm, AuthMode, AuthOutcome};
pub use card::{Confirm, FixedAnswer, OwnRating, RecipeCard};
pub use editor::RecipeEditor;
pub use error::{AppError, ErrorReport};
pub use home::{HomeScreen, ViewState};
pub use session::{Route, Session};
