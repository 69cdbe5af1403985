//! Recipe list and ingredient rules.

use super::Recipe;

/// Recipes whose title contains `search`, ignoring case, in their original
/// order. An empty search keeps everything.
pub fn filter_by_title(recipes: &[Recipe], search: &str) -> Vec<Recipe> {
    let needle = search.to_lowercase();
    recipes
        .iter()
        .filter(|recipe| recipe.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Ordered ingredient list without blanks or duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientList {
    items: Vec<String>,
}

impl IngredientList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from existing values, applying the same rules as [`Self::add`].
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for value in values {
            list.add(value.as_ref());
        }
        list
    }

    /// Append a trimmed ingredient. Returns `false` when it was blank or
    /// already present.
    pub fn add(&mut self, raw: &str) -> bool {
        let trimmed = raw.trim();
        if trimmed.is_empty() || self.items.iter().any(|item| item == trimmed) {
            return false;
        }
        self.items.push(trimmed.to_string());
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.items.clone()
    }
}
