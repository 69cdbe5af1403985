//! Transport to the remote recipe service.

mod client;
mod error;
mod service;

pub use client::HttpRecipeApi;
pub use error::ClientError;
pub use service::RecipeApi;
