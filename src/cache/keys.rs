//! Cache key and tag definitions.
//!
//! A [`QueryKey`] identifies one cached query result (endpoint plus its
//! argument). Each key provides a set of [`Tag`]s; mutations invalidate
//! entries by tag.

use std::fmt;

use recipebox_api_types::Id;

/// Tag families used for invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagType {
    Recipe,
    Rating,
}

impl TagType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recipe => "Recipe",
            Self::Rating => "Rating",
        }
    }
}

/// A coarse tag (`Recipe`) or a tag scoped to one id (`Rating:7`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    pub kind: TagType,
    pub id: Option<Id>,
}

impl Tag {
    pub const fn coarse(kind: TagType) -> Self {
        Self { kind, id: None }
    }

    pub const fn with_id(kind: TagType, id: Id) -> Self {
        Self { kind, id: Some(id) }
    }

    /// Whether invalidating `self` hits an entry that provides `provided`.
    ///
    /// A coarse tag covers every tag of its family, scoped or not. A scoped
    /// tag covers only the identical scoped tag.
    pub fn covers(&self, provided: &Tag) -> bool {
        if self.kind != provided.kind {
            return false;
        }
        match self.id {
            None => true,
            Some(id) => provided.id == Some(id),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}:{id}", self.kind.as_str()),
            None => f.write_str(self.kind.as_str()),
        }
    }
}

/// Query endpoints, each carrying its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKey {
    /// `GET recipes`
    AllRecipes,
    /// `GET recipes/mine`
    MyRecipes,
    /// `GET recipes/:id`
    RecipeById(Id),
    /// `GET ratings/recipe/:id`
    RatingsByRecipe(Id),
}

impl QueryKey {
    /// Endpoint identity without the argument, for logs and metric labels.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::AllRecipes => "list-all-recipes",
            Self::MyRecipes => "list-my-recipes",
            Self::RecipeById(_) => "get-recipe-by-id",
            Self::RatingsByRecipe(_) => "list-ratings-by-recipe",
        }
    }

    /// Tags this entry is registered under.
    pub fn provided_tags(&self) -> Vec<Tag> {
        match *self {
            Self::AllRecipes | Self::MyRecipes => vec![Tag::coarse(TagType::Recipe)],
            Self::RecipeById(id) => vec![Tag::with_id(TagType::Recipe, id)],
            Self::RatingsByRecipe(id) => vec![Tag::with_id(TagType::Rating, id)],
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllRecipes => f.write_str("recipes"),
            Self::MyRecipes => f.write_str("recipes/mine"),
            Self::RecipeById(id) => write!(f, "recipes/{id}"),
            Self::RatingsByRecipe(id) => write!(f, "ratings/recipe/{id}"),
        }
    }
}
