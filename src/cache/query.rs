//! The query cache: keyed entries, de-duplicated loads, tag invalidation and
//! the mutations that drive it.

use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use metrics::counter;
use recipebox_api_types::{
    AuthRequest, AuthResponse, CreateOrUpdateRatingRequest, CreateRecipeRequest, Id, Rating,
    Recipe, RegisteredUser, UpdateRecipeRequest,
};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{Instrument, debug, debug_span, info, trace, warn};

use crate::domain::ratings::Stars;
use crate::infra::http::{ClientError, RecipeApi};

use super::config::CacheConfig;
use super::invalidation::{self, MutationKind};
use super::keys::{QueryKey, Tag};
use super::lock::mutex_lock;
use super::metrics::{
    DEDUP_TOTAL, FETCH_ERROR_TOTAL, HIT_TOTAL, INVALIDATED_TOTAL, MISS_TOTAL, MUTATION_TOTAL,
};
use super::registry::TagRegistry;
use super::store::{EntrySnapshot, QueryData, QueryOptions, QuerySnapshot, QueryStatus};

const SOURCE: &str = "cache::query";

struct Entry {
    state: watch::Sender<EntrySnapshot>,
    /// Identifies the load allowed to settle this entry.
    generation: u64,
    /// An invalidation hit while loading; go stale as soon as the load lands.
    stale_on_settle: bool,
    last_used: Instant,
}

impl Entry {
    fn new() -> Self {
        let (state, _) = watch::channel(EntrySnapshot::default());
        Self {
            state,
            generation: 0,
            stale_on_settle: false,
            last_used: Instant::now(),
        }
    }

    fn status(&self) -> QueryStatus {
        self.state.borrow().status
    }
}

struct Inner {
    api: Arc<dyn RecipeApi>,
    registry: TagRegistry,
    entries: Mutex<HashMap<QueryKey, Entry>>,
    generations: AtomicU64,
    config: CacheConfig,
}

/// Mediates every read and write between the views and the recipe service.
///
/// Cheap to clone; clones share the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

enum Plan {
    Hit(EntrySnapshot),
    Join(watch::Receiver<EntrySnapshot>),
    Fetch(watch::Receiver<EntrySnapshot>, u64),
}

impl QueryCache {
    pub fn new(api: Arc<dyn RecipeApi>, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                registry: TagRegistry::new(),
                entries: Mutex::new(HashMap::new()),
                generations: AtomicU64::new(0),
                config,
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Resolve `key` from the cache, or load it.
    ///
    /// A ready entry is returned as is. A missing, stale or failed entry
    /// starts a load; concurrent callers for a key that is already loading
    /// wait on that load instead of issuing their own. Failures are reported
    /// on the returned snapshot, never as an `Err`.
    pub async fn query(&self, key: QueryKey, options: QueryOptions) -> EntrySnapshot {
        if options.skip {
            trace!(endpoint = key.endpoint(), key = %key, "query skipped");
            return EntrySnapshot::default();
        }

        self.prune_unused(Some(key));

        let mut rx = match self.plan(key) {
            Plan::Hit(snapshot) => return snapshot,
            Plan::Join(rx) => rx,
            Plan::Fetch(rx, generation) => {
                self.spawn_load(key, generation);
                rx
            }
        };

        let settled = rx.wait_for(|snapshot| snapshot.status.is_settled()).await;
        match settled {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => {
                debug!(endpoint = key.endpoint(), key = %key, "entry dropped while waiting");
                EntrySnapshot::failed(ClientError::Reset)
            }
        }
    }

    fn plan(&self, key: QueryKey) -> Plan {
        let mut entries = mutex_lock(&self.inner.entries, SOURCE, "plan");
        let entry = match entries.entry(key) {
            MapEntry::Occupied(occupied) => occupied.into_mut(),
            MapEntry::Vacant(vacant) => {
                self.inner.registry.register(key, key.provided_tags());
                vacant.insert(Entry::new())
            }
        };
        entry.last_used = Instant::now();

        let status = entry.status();
        if status == QueryStatus::Ready {
            counter!(HIT_TOTAL, "endpoint" => key.endpoint()).increment(1);
            trace!(endpoint = key.endpoint(), key = %key, "cache hit");
            return Plan::Hit(entry.state.borrow().clone());
        }
        if !status.needs_fetch() {
            counter!(DEDUP_TOTAL, "endpoint" => key.endpoint()).increment(1);
            trace!(endpoint = key.endpoint(), key = %key, "joining in-flight load");
            return Plan::Join(entry.state.subscribe());
        }

        counter!(MISS_TOTAL, "endpoint" => key.endpoint()).increment(1);
        let generation = self.inner.generations.fetch_add(1, Ordering::Relaxed) + 1;
        entry.generation = generation;
        entry.stale_on_settle = false;
        entry.state.send_modify(|snapshot| {
            snapshot.status = QueryStatus::Loading;
            snapshot.error = None;
        });
        debug!(
            endpoint = key.endpoint(),
            key = %key,
            from = status.as_str(),
            generation,
            "starting load"
        );
        Plan::Fetch(entry.state.subscribe(), generation)
    }

    fn spawn_load(&self, key: QueryKey, generation: u64) {
        let inner = Arc::clone(&self.inner);
        let span = debug_span!("cache_load", endpoint = key.endpoint(), key = %key, generation);
        tokio::spawn(
            async move {
                let result = inner.fetch(key).await;
                inner.settle(key, generation, result);
            }
            .instrument(span),
        );
    }

    pub async fn all_recipes(&self, options: QueryOptions) -> QuerySnapshot<Vec<Recipe>> {
        self.query(QueryKey::AllRecipes, options).await.typed()
    }

    pub async fn my_recipes(&self, options: QueryOptions) -> QuerySnapshot<Vec<Recipe>> {
        self.query(QueryKey::MyRecipes, options).await.typed()
    }

    pub async fn recipe(&self, id: Id, options: QueryOptions) -> QuerySnapshot<Recipe> {
        self.query(QueryKey::RecipeById(id), options).await.typed()
    }

    pub async fn ratings(&self, recipe_id: Id, options: QueryOptions) -> QuerySnapshot<Vec<Rating>> {
        self.query(QueryKey::RatingsByRecipe(recipe_id), options)
            .await
            .typed()
    }

    /// Observe every transition of `key`'s entry without loading it.
    ///
    /// The entry is created uninitialized if absent and is kept from being
    /// pruned while the handle lives.
    pub fn subscribe(&self, key: QueryKey) -> Subscription {
        let mut entries = mutex_lock(&self.inner.entries, SOURCE, "subscribe");
        let entry = entries.entry(key).or_insert_with(|| {
            self.inner.registry.register(key, key.provided_tags());
            Entry::new()
        });
        entry.last_used = Instant::now();
        Subscription {
            key,
            rx: entry.state.subscribe(),
            cache: Arc::downgrade(&self.inner),
        }
    }

    /// Current status of `key`, if an entry exists.
    pub fn status(&self, key: QueryKey) -> Option<QueryStatus> {
        mutex_lock(&self.inner.entries, SOURCE, "status")
            .get(&key)
            .map(Entry::status)
    }

    /// Live subscribers of `key`, counting callers waiting on a load.
    pub fn subscriber_count(&self, key: QueryKey) -> usize {
        mutex_lock(&self.inner.entries, SOURCE, "subscriber_count")
            .get(&key)
            .map_or(0, |entry| entry.state.receiver_count())
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.inner.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark every entry providing a tag covered by `targets` as stale.
    ///
    /// Ready entries go stale immediately. Loading entries go stale once
    /// their load settles. Returns how many entries were hit.
    pub fn invalidate_tags(&self, targets: &[Tag]) -> usize {
        if targets.is_empty() {
            return 0;
        }
        let keys = self.inner.registry.matching(targets);
        let mut entries = mutex_lock(&self.inner.entries, SOURCE, "invalidate_tags");

        let mut hit = 0;
        for key in keys {
            let Some(entry) = entries.get_mut(&key) else {
                continue;
            };
            match entry.status() {
                QueryStatus::Ready => {
                    entry
                        .state
                        .send_modify(|snapshot| snapshot.status = QueryStatus::Stale);
                    hit += 1;
                    debug!(endpoint = key.endpoint(), key = %key, "entry marked stale");
                }
                QueryStatus::Loading => {
                    entry.stale_on_settle = true;
                    hit += 1;
                    debug!(endpoint = key.endpoint(), key = %key, "stale once load settles");
                }
                QueryStatus::Uninitialized | QueryStatus::Stale | QueryStatus::Error => {}
            }
        }

        counter!(INVALIDATED_TOTAL).increment(hit as u64);
        hit
    }

    /// Drop every entry. Callers waiting on a load observe
    /// [`ClientError::Reset`].
    pub fn reset(&self) {
        let mut entries = mutex_lock(&self.inner.entries, SOURCE, "reset");
        let dropped = entries.len();
        entries.clear();
        self.inner.registry.clear();
        info!(dropped, "query cache reset");
    }

    /// Remove entries nobody observes that were last used longer ago than
    /// the configured keep-alive. `keep` is never removed.
    pub fn prune_unused(&self, keep: Option<QueryKey>) -> usize {
        let keep_for = self.inner.config.keep_unused_for;
        let now = Instant::now();
        let mut entries = mutex_lock(&self.inner.entries, SOURCE, "prune_unused");

        let expired: Vec<QueryKey> = entries
            .iter()
            .filter(|(key, entry)| {
                Some(**key) != keep
                    && entry.state.receiver_count() == 0
                    && entry.status() != QueryStatus::Loading
                    && now.duration_since(entry.last_used) >= keep_for
            })
            .map(|(key, _)| *key)
            .collect();

        for key in &expired {
            entries.remove(key);
            self.inner.registry.unregister(key);
            trace!(endpoint = key.endpoint(), key = %key, "pruned unused entry");
        }
        expired.len()
    }

    pub async fn login(&self, request: &AuthRequest) -> Result<AuthResponse, ClientError> {
        self.run_mutation(MutationKind::Login, None, self.inner.api.login(request))
            .await
    }

    pub async fn register(&self, request: &AuthRequest) -> Result<RegisteredUser, ClientError> {
        self.run_mutation(MutationKind::Register, None, self.inner.api.register(request))
            .await
    }

    pub async fn create_recipe(&self, request: &CreateRecipeRequest) -> Result<Recipe, ClientError> {
        self.run_mutation(
            MutationKind::CreateRecipe,
            None,
            self.inner.api.create_recipe(request),
        )
        .await
    }

    pub async fn update_recipe(&self, request: &UpdateRecipeRequest) -> Result<Recipe, ClientError> {
        self.run_mutation(
            MutationKind::UpdateRecipe,
            Some(request.id),
            self.inner.api.update_recipe(request),
        )
        .await
    }

    pub async fn delete_recipe(&self, id: Id) -> Result<(), ClientError> {
        self.run_mutation(
            MutationKind::DeleteRecipe,
            Some(id),
            self.inner.api.delete_recipe(id),
        )
        .await
    }

    /// Create or replace the caller's rating of `recipe_id`.
    pub async fn upsert_rating(&self, recipe_id: Id, stars: Stars) -> Result<Rating, ClientError> {
        let request = CreateOrUpdateRatingRequest {
            recipe_id,
            stars: stars.get(),
        };
        self.run_mutation(
            MutationKind::UpsertRating,
            Some(recipe_id),
            self.inner.api.upsert_rating(&request),
        )
        .await
    }

    /// Remove the caller's rating of `recipe_id`.
    pub async fn delete_rating(&self, recipe_id: Id) -> Result<(), ClientError> {
        self.run_mutation(
            MutationKind::DeleteRating,
            Some(recipe_id),
            self.inner.api.delete_rating(recipe_id),
        )
        .await
    }

    /// Await the remote call, then apply the kind's invalidation set only if
    /// it succeeded.
    async fn run_mutation<T, F>(
        &self,
        kind: MutationKind,
        target_id: Option<Id>,
        call: F,
    ) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        match call.await {
            Ok(value) => {
                counter!(MUTATION_TOTAL, "kind" => kind.as_str(), "outcome" => "ok").increment(1);
                let tags = invalidation::resolve(kind, target_id);
                let hit = self.invalidate_tags(&tags);
                debug!(
                    mutation = kind.as_str(),
                    target_id,
                    tags = ?tags.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    invalidated = hit,
                    "mutation succeeded"
                );
                Ok(value)
            }
            Err(err) => {
                counter!(MUTATION_TOTAL, "kind" => kind.as_str(), "outcome" => "error")
                    .increment(1);
                warn!(mutation = kind.as_str(), target_id, error = %err, "mutation failed");
                Err(err)
            }
        }
    }
}

impl Inner {
    async fn fetch(&self, key: QueryKey) -> Result<QueryData, ClientError> {
        match key {
            QueryKey::AllRecipes => self.api.all_recipes().await.map(QueryData::Recipes),
            QueryKey::MyRecipes => self.api.my_recipes().await.map(QueryData::Recipes),
            QueryKey::RecipeById(id) => self.api.recipe(id).await.map(QueryData::Recipe),
            QueryKey::RatingsByRecipe(id) => {
                self.api.ratings_for_recipe(id).await.map(QueryData::Ratings)
            }
        }
    }

    fn settle(&self, key: QueryKey, generation: u64, result: Result<QueryData, ClientError>) {
        let mut entries = mutex_lock(&self.entries, SOURCE, "settle");
        let Some(entry) = entries.get_mut(&key) else {
            trace!(generation, "entry gone before load settled");
            return;
        };
        if entry.generation != generation {
            trace!(generation, current = entry.generation, "superseded load discarded");
            return;
        }
        entry.last_used = Instant::now();

        match result {
            Ok(data) => {
                entry.state.send_replace(EntrySnapshot {
                    status: QueryStatus::Ready,
                    data: Some(data),
                    error: None,
                });
                debug!(status = "ready", "load settled");
                if entry.stale_on_settle {
                    entry.stale_on_settle = false;
                    entry
                        .state
                        .send_modify(|snapshot| snapshot.status = QueryStatus::Stale);
                    debug!(status = "stale", "invalidated during load");
                }
            }
            Err(err) => {
                counter!(FETCH_ERROR_TOTAL, "endpoint" => key.endpoint()).increment(1);
                entry.stale_on_settle = false;
                entry.state.send_modify(|snapshot| {
                    snapshot.status = QueryStatus::Error;
                    snapshot.error = Some(err.clone());
                });
                warn!(error = %err, status = "error", "load failed");
            }
        }
    }
}

/// Live view of one entry. Dropping it unsubscribes.
pub struct Subscription {
    key: QueryKey,
    rx: watch::Receiver<EntrySnapshot>,
    cache: Weak<Inner>,
}

impl Subscription {
    pub fn key(&self) -> QueryKey {
        self.key
    }

    pub fn current(&self) -> EntrySnapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next transition. `None` once the entry is gone.
    pub async fn changed(&mut self) -> Option<EntrySnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // The keep-alive window starts when the last observer leaves.
        if let Some(inner) = self.cache.upgrade() {
            let mut entries = mutex_lock(&inner.entries, SOURCE, "unsubscribe");
            if let Some(entry) = entries.get_mut(&self.key) {
                entry.last_used = Instant::now();
            }
        }
    }
}
