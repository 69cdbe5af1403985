//! Entry state shared between the query cache and its subscribers.

use recipebox_api_types::{Rating, Recipe};

use crate::infra::http::ClientError;

/// Lifecycle of one cache entry.
///
/// `Uninitialized → Loading → {Ready, Error}`, `Ready → Stale → Loading`,
/// `Error → Loading`. There is no `Loading → Stale` edge: an invalidation
/// that lands mid-load is applied once the load settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    Stale,
    Error,
}

impl QueryStatus {
    /// Whether a load that was in flight has finished.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Ready | Self::Stale | Self::Error)
    }

    /// Whether a read must fetch before it can be served.
    pub fn needs_fetch(self) -> bool {
        matches!(self, Self::Uninitialized | Self::Stale | Self::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Stale => "stale",
            Self::Error => "error",
        }
    }
}

/// Payload of a settled query, one variant per endpoint shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryData {
    Recipes(Vec<Recipe>),
    Recipe(Recipe),
    Ratings(Vec<Rating>),
}

/// Untyped view of an entry, as published to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrySnapshot {
    pub status: QueryStatus,
    /// Last payload that settled successfully. Kept while a refetch runs.
    pub data: Option<QueryData>,
    pub error: Option<ClientError>,
}

impl EntrySnapshot {
    pub(crate) fn failed(error: ClientError) -> Self {
        Self {
            status: QueryStatus::Error,
            data: None,
            error: Some(error),
        }
    }

    /// Narrow to the payload type the caller's endpoint returns.
    pub fn typed<T: QueryValue>(self) -> QuerySnapshot<T> {
        QuerySnapshot {
            status: self.status,
            data: self.data.and_then(T::from_data),
            error: self.error,
        }
    }
}

/// Payload types an endpoint can resolve to.
pub trait QueryValue: Sized {
    fn from_data(data: QueryData) -> Option<Self>;
}

impl QueryValue for Vec<Recipe> {
    fn from_data(data: QueryData) -> Option<Self> {
        match data {
            QueryData::Recipes(recipes) => Some(recipes),
            _ => None,
        }
    }
}

impl QueryValue for Recipe {
    fn from_data(data: QueryData) -> Option<Self> {
        match data {
            QueryData::Recipe(recipe) => Some(recipe),
            _ => None,
        }
    }
}

impl QueryValue for Vec<Rating> {
    fn from_data(data: QueryData) -> Option<Self> {
        match data {
            QueryData::Ratings(ratings) => Some(ratings),
            _ => None,
        }
    }
}

/// Result of a query as a view consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySnapshot<T> {
    pub status: QueryStatus,
    pub data: Option<T>,
    pub error: Option<ClientError>,
}

impl<T> QuerySnapshot<T> {
    /// First load with nothing to show yet.
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading && self.data.is_none()
    }

    /// A load is running while a previous payload is still displayed.
    pub fn is_fetching(&self) -> bool {
        self.status == QueryStatus::Loading && self.data.is_some()
    }

    pub fn is_stale(&self) -> bool {
        self.status == QueryStatus::Stale
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }
}

impl<T> Default for QuerySnapshot<T> {
    fn default() -> Self {
        Self {
            status: QueryStatus::Uninitialized,
            data: None,
            error: None,
        }
    }
}

/// Per-call query options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Do not touch the cache or the network; report an uninitialized,
    /// non-loading result.
    pub skip: bool,
}

impl QueryOptions {
    pub fn skip_when(skip: bool) -> Self {
        Self { skip }
    }
}
