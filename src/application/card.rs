//! Recipe card: rating summary, the caller's own rating with an optimistic
//! update path, and owner actions behind a confirmation.

use std::sync::{Arc, Mutex};

use recipebox_api_types::{Id, Rating, Recipe};
use tracing::{debug, warn};

use crate::cache::QueryCache;
use crate::cache::QueryOptions;
use crate::cache::lock::mutex_lock;
use crate::domain::ratings::{RatingSummary, Stars, rating_by};

use super::error::AppError;
use super::session::Session;

const SOURCE: &str = "application::card";

/// Asks the user to approve a destructive action.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Always answers the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// The caller's rating as the card displays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnRating {
    /// Value the service returned.
    Confirmed(u8),
    /// Clicked, request in flight.
    Pending(Stars),
    /// The request failed; shown until the next ratings refetch.
    Unconfirmed(Stars),
}

impl OwnRating {
    pub fn stars(self) -> u8 {
        match self {
            Self::Confirmed(stars) => stars,
            Self::Pending(stars) | Self::Unconfirmed(stars) => stars.get(),
        }
    }
}

#[derive(Debug, Default)]
struct CardState {
    ratings: Vec<Rating>,
    optimistic: Option<OwnRating>,
    /// Bumped on every `rate`; only the latest click may settle the display.
    clicks: u64,
}

#[derive(Clone)]
pub struct RecipeCard {
    recipe: Recipe,
    cache: QueryCache,
    current_user: Option<Id>,
    state: Arc<Mutex<CardState>>,
}

impl RecipeCard {
    pub fn new(recipe: Recipe, session: &Session) -> Self {
        Self {
            recipe,
            cache: session.cache().clone(),
            current_user: session.current_user_id(),
            state: Arc::new(Mutex::new(CardState::default())),
        }
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn author_email(&self) -> Option<&str> {
        self.recipe.user.as_ref().map(|user| user.email.as_str())
    }

    /// Whether the current user owns this recipe.
    pub fn can_edit(&self) -> bool {
        self.current_user.is_some() && self.recipe.owner_id() == self.current_user
    }

    /// Load the recipe's ratings through the cache.
    ///
    /// A successful load replaces an unconfirmed optimistic value with what
    /// the service holds.
    pub async fn refresh(&self) -> Result<(), AppError> {
        let snapshot = self
            .cache
            .ratings(self.recipe.id, QueryOptions::default())
            .await;
        if let Some(error) = snapshot.error {
            return Err(error.into());
        }

        let mut state = mutex_lock(&self.state, SOURCE, "refresh");
        if let Some(ratings) = snapshot.data {
            state.ratings = ratings;
        }
        if matches!(state.optimistic, Some(OwnRating::Unconfirmed(_))) {
            debug!(recipe_id = self.recipe.id, "refetch replaced unconfirmed rating");
            state.optimistic = None;
        }
        Ok(())
    }

    pub fn ratings(&self) -> Vec<Rating> {
        mutex_lock(&self.state, SOURCE, "ratings").ratings.clone()
    }

    pub fn summary(&self) -> RatingSummary {
        RatingSummary::of(&mutex_lock(&self.state, SOURCE, "summary").ratings)
    }

    pub fn own_rating(&self) -> Option<OwnRating> {
        let state = mutex_lock(&self.state, SOURCE, "own_rating");
        if let Some(optimistic) = state.optimistic {
            return Some(optimistic);
        }
        let user_id = self.current_user?;
        rating_by(&state.ratings, user_id).map(|rating| OwnRating::Confirmed(rating.stars))
    }

    /// Show `stars` immediately, then upsert it.
    ///
    /// On success the confirmed rating replaces the displayed value. On
    /// failure the clicked value stays, marked unconfirmed, and the error is
    /// returned.
    pub async fn rate(&self, stars: Stars) -> Result<Rating, AppError> {
        let click = {
            let mut state = mutex_lock(&self.state, SOURCE, "rate.begin");
            state.clicks += 1;
            state.optimistic = Some(OwnRating::Pending(stars));
            state.clicks
        };

        match self.cache.upsert_rating(self.recipe.id, stars).await {
            Ok(confirmed) => {
                let mut state = mutex_lock(&self.state, SOURCE, "rate.confirm");
                match state
                    .ratings
                    .iter_mut()
                    .find(|rating| rating.user_id == confirmed.user_id)
                {
                    Some(existing) => *existing = confirmed.clone(),
                    None => state.ratings.push(confirmed.clone()),
                }
                if state.clicks == click {
                    state.optimistic = None;
                }
                Ok(confirmed)
            }
            Err(err) => {
                warn!(recipe_id = self.recipe.id, error = %err, "rating not saved");
                let mut state = mutex_lock(&self.state, SOURCE, "rate.fail");
                if state.clicks == click {
                    state.optimistic = Some(OwnRating::Unconfirmed(stars));
                }
                Err(err.into())
            }
        }
    }

    /// Delete the recipe once `confirm` approves. Returns `false` when the
    /// user declined; no request is sent then.
    pub async fn delete_recipe(&self, confirm: &dyn Confirm) -> Result<bool, AppError> {
        let prompt = format!("Delete recipe \"{}\"?", self.recipe.title);
        if !confirm.confirm(&prompt) {
            return Ok(false);
        }
        self.cache.delete_recipe(self.recipe.id).await?;
        Ok(true)
    }

    /// Delete the caller's rating once `confirm` approves.
    pub async fn delete_rating(&self, confirm: &dyn Confirm) -> Result<bool, AppError> {
        if !confirm.confirm("Delete your rating?") {
            return Ok(false);
        }
        self.cache.delete_rating(self.recipe.id).await?;

        let mut state = mutex_lock(&self.state, SOURCE, "delete_rating");
        if let Some(user_id) = self.current_user {
            state.ratings.retain(|rating| rating.user_id != user_id);
        }
        state.optimistic = None;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::http::ClientError;
    use crate::infra::token::MemoryTokenHolder;
    use crate::test_support::{CALLER_ID, FakeRecipeApi, cache_over, settle_tasks, token_for};

    fn signed_in(api: &Arc<FakeRecipeApi>) -> Session {
        Session::new(
            Arc::new(MemoryTokenHolder::with_token(token_for(CALLER_ID))),
            cache_over(api),
        )
    }

    async fn card_for(api: &Arc<FakeRecipeApi>, id: Id) -> RecipeCard {
        let session = signed_in(api);
        let recipe = session
            .cache()
            .recipe(id, QueryOptions::default())
            .await
            .data
            .expect("recipe");
        let card = RecipeCard::new(recipe, &session);
        card.refresh().await.expect("ratings");
        card
    }

    fn stars(value: i64) -> Stars {
        Stars::new(value).expect("valid stars")
    }

    #[tokio::test]
    async fn summary_and_ownership() {
        let api = FakeRecipeApi::with_recipes(&["Soup"]);
        api.seed_rating(1, CALLER_ID, 4);
        api.seed_rating(1, 99, 5);
        let stranger = api.seed_recipe("Stew", None);

        let card = card_for(&api, 1).await;
        let summary = card.summary();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average, Some(4.5));
        assert_eq!(card.own_rating(), Some(OwnRating::Confirmed(4)));
        assert_eq!(card.author_email(), Some("cook@example.com"));
        assert!(card.can_edit());

        let other = card_for(&api, stranger.id).await;
        assert!(!other.can_edit());
        assert_eq!(other.own_rating(), None);
        assert_eq!(other.summary().average, None);
    }

    #[tokio::test]
    async fn rating_is_shown_before_the_service_confirms() {
        let api = FakeRecipeApi::with_recipes(&["Soup"]);
        let card = card_for(&api, 1).await;
        api.hold();

        let pending = tokio::spawn({
            let card = card.clone();
            async move { card.rate(Stars::new(4).expect("valid")).await }
        });
        settle_tasks().await;
        assert_eq!(card.own_rating(), Some(OwnRating::Pending(stars(4))));

        api.release(1);
        let confirmed = pending.await.expect("rate task").expect("rated");
        assert_eq!(confirmed.stars, 4);
        assert_eq!(card.own_rating(), Some(OwnRating::Confirmed(4)));
        assert_eq!(card.summary().count, 1);
    }

    #[tokio::test]
    async fn earlier_click_settling_keeps_later_click_pending() {
        let api = FakeRecipeApi::with_recipes(&["Soup"]);
        let card = card_for(&api, 1).await;
        api.hold();

        let first = tokio::spawn({
            let card = card.clone();
            async move { card.rate(Stars::new(3).expect("valid")).await }
        });
        settle_tasks().await;
        let second = tokio::spawn({
            let card = card.clone();
            async move { card.rate(Stars::new(5).expect("valid")).await }
        });
        settle_tasks().await;
        assert_eq!(card.own_rating(), Some(OwnRating::Pending(stars(5))));

        api.release(1);
        let earlier = first.await.expect("rate task").expect("rated");
        assert_eq!(earlier.stars, 3);
        assert_eq!(card.own_rating(), Some(OwnRating::Pending(stars(5))));

        api.release(1);
        second.await.expect("rate task").expect("rated");
        assert_eq!(card.own_rating(), Some(OwnRating::Confirmed(5)));
        assert_eq!(card.summary().count, 1);
    }

    #[tokio::test]
    async fn failed_rating_stays_until_refetch() {
        let api = FakeRecipeApi::with_recipes(&["Soup"]);
        api.seed_rating(1, CALLER_ID, 2);
        let card = card_for(&api, 1).await;
        api.fail("upsert-rating", ClientError::Network("offline".into()));

        let err = card.rate(stars(5)).await.expect_err("rating fails");
        assert!(matches!(err, AppError::Client(ClientError::Network(_))));
        assert_eq!(card.own_rating(), Some(OwnRating::Unconfirmed(stars(5))));

        card.cache.invalidate_tags(&[crate::cache::Tag::with_id(
            crate::cache::TagType::Rating,
            1,
        )]);
        card.refresh().await.expect("refetch");
        assert_eq!(card.own_rating(), Some(OwnRating::Confirmed(2)));
    }

    #[tokio::test]
    async fn declined_confirmation_sends_nothing() {
        let api = FakeRecipeApi::with_recipes(&["Soup"]);
        let card = card_for(&api, 1).await;

        assert!(!card.delete_recipe(&FixedAnswer(false)).await.expect("declined"));
        assert!(!card.delete_rating(&FixedAnswer(false)).await.expect("declined"));
        assert_eq!(api.calls("delete-recipe"), 0);
        assert_eq!(api.calls("delete-rating"), 0);

        assert!(card.delete_recipe(&FixedAnswer(true)).await.expect("deleted"));
        assert_eq!(api.calls("delete-recipe"), 1);
    }

    #[tokio::test]
    async fn deleting_own_rating_removes_it() {
        let api = FakeRecipeApi::with_recipes(&["Soup"]);
        api.seed_rating(1, CALLER_ID, 3);
        let card = card_for(&api, 1).await;

        assert!(card.delete_rating(&FixedAnswer(true)).await.expect("deleted"));
        assert_eq!(card.own_rating(), None);
        assert_eq!(card.summary().count, 0);
        assert_eq!(api.calls("delete-rating"), 1);
    }
}
