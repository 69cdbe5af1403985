use thiserror::Error;

/// Client-side checks that block a submission before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please add at least one ingredient")]
    NoIngredients,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("`{field}` is required")]
    Required { field: &'static str },
    #[error("stars must be between 1 and 5, got {0}")]
    StarsOutOfRange(i64),
    #[error("update does not change any field")]
    EmptyPatch,
}

impl ValidationError {
    pub fn required(field: &'static str) -> Self {
        Self::Required { field }
    }
}
