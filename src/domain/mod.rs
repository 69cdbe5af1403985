//! Domain layer types and invariants.

pub mod credential;
pub mod error;
pub mod ratings;
pub mod recipes;

pub use recipebox_api_types::{Id, Rating, Recipe, User};
