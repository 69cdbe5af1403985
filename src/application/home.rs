//! Recipe list screen: all/mine tabs and title search.

use recipebox_api_types::Recipe;

use crate::cache::{QueryOptions, QuerySnapshot, QueryStatus};
use crate::domain::recipes::filter_by_title;
use crate::infra::http::ClientError;

use super::session::Session;

/// What a list view renders for one query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    Loading,
    Error(String),
    Empty,
    Populated(T),
}

impl ViewState<Vec<Recipe>> {
    /// Map a list snapshot to its view, applying the title search.
    pub fn from_recipes(snapshot: QuerySnapshot<Vec<Recipe>>, search: &str) -> Self {
        if snapshot.status == QueryStatus::Error {
            let message = snapshot
                .error
                .as_ref()
                .map(ClientError::user_message)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Self::Error(message);
        }
        match snapshot.data {
            None => Self::Loading,
            Some(recipes) => {
                let filtered = filter_by_title(&recipes, search);
                if filtered.is_empty() {
                    Self::Empty
                } else {
                    Self::Populated(filtered)
                }
            }
        }
    }
}

pub struct HomeScreen {
    session: Session,
    show_mine: bool,
    pub search: String,
}

impl HomeScreen {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            show_mine: false,
            search: String::new(),
        }
    }

    pub fn show_mine(&self) -> bool {
        self.show_mine
    }

    pub fn set_show_mine(&mut self, show_mine: bool) {
        self.show_mine = show_mine;
    }

    /// Resolve the active tab.
    ///
    /// The all-recipes list is always kept warm; "mine" is skipped while the
    /// all tab is active.
    pub async fn load(&self) -> ViewState<Vec<Recipe>> {
        let cache = self.session.cache();
        let (all, mine) = tokio::join!(
            cache.all_recipes(QueryOptions::default()),
            cache.my_recipes(QueryOptions::skip_when(!self.show_mine)),
        );
        let active = if self.show_mine { mine } else { all };
        ViewState::from_recipes(active, &self.search)
    }
}
