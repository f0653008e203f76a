//! Batched, cached user resolution.
//!
//! [`UserFetcher`] turns an ordered list of user ids into users, in the
//! same order:
//!
//! 1. Ids found in the cache are taken from it.
//! 2. The rest are fetched with a single vectored `/users/{ids}` call,
//!    which the client splits into page-sized batches. The API returns
//!    users in an order of its own choosing, so each page is sorted back
//!    into request order. Every fetched user is cached as it arrives.
//! 3. The original id list is walked once. Ids that are still unresolved
//!    are either skipped, or (with
//!    [`missing_assume_deleted`](UserFetcher::missing_assume_deleted))
//!    replaced by a cached [`MissingUser`] placeholder.
//!
//! A fetch error ends the stream with that error. Users fetched before the
//! failing page stay cached, so a retry only asks for the remainder.

mod render;

use std::collections::{HashMap, HashSet};
use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt, TryStreamExt, stream};
use tracing::debug;

pub use render::{abbreviated_reputation, full_reputation, relative_link};

use crate::api::StackExchangeApi;
use crate::cache::{Cache, LruCache};
use crate::config::Config;
use crate::telemetry;
use crate::types::{ExistingUser, FetchOptions, MissingUser, Parameters, User, UserId};
use crate::{HuginnError, Result};

/// Default user filter.
///
/// Wrapper fields plus `badge_counts`, `display_name`, `is_employee`,
/// `link`, `profile_image`, `reputation`, `user_id` and `user_type`. It is
/// an unsafe filter: `display_name` comes back unescaped.
pub const DEFAULT_USER_FILTER: &str = ")Q7.NL.wLaTOvZyxvEF8za4m(g8T";

const USERS_PATH: &str = "/users/{ids}";

/// Stream of resolved users, in requested order.
pub type UserStream = Pin<Box<dyn Stream<Item = Result<User>> + Send>>;

/// Resolves user ids through a cache and the API.
#[derive(Clone)]
pub struct UserFetcher {
    api: StackExchangeApi,
    cache: Arc<dyn Cache<UserId, User>>,
    filter: String,
    missing_assume_deleted: bool,
}

impl std::fmt::Debug for UserFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserFetcher")
            .field("api", &self.api)
            .field("filter", &self.filter)
            .field("missing_assume_deleted", &self.missing_assume_deleted)
            .finish_non_exhaustive()
    }
}

impl UserFetcher {
    /// Fetcher with a default-sized LRU cache and the default filter.
    /// Unresolved ids are skipped.
    pub fn new(api: StackExchangeApi) -> Self {
        Self {
            api,
            cache: Arc::new(LruCache::<UserId, User>::default()),
            filter: DEFAULT_USER_FILTER.to_string(),
            missing_assume_deleted: false,
        }
    }

    /// Build the client and fetcher described by a config file.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = StackExchangeApi::from_config(&config.api)?;
        let mut fetcher = Self::new(api)
            .with_cache(Arc::new(LruCache::new(config.users.cache_size)))
            .missing_assume_deleted(config.users.missing_assume_deleted);
        if let Some(filter) = &config.api.filter {
            fetcher = fetcher.filter(filter.clone());
        }
        Ok(fetcher)
    }

    /// Use a different (possibly shared) cache.
    pub fn with_cache(mut self, cache: Arc<dyn Cache<UserId, User>>) -> Self {
        self.cache = cache;
        self
    }

    /// Use a different response filter. It must include `user_id`.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Treat ids the API does not return as deleted users.
    pub fn missing_assume_deleted(mut self, enabled: bool) -> Self {
        self.missing_assume_deleted = enabled;
        self
    }

    pub fn assumes_missing_deleted(&self) -> bool {
        self.missing_assume_deleted
    }

    pub fn api(&self) -> &StackExchangeApi {
        &self.api
    }

    /// Resolve `ids` lazily; nothing happens until the stream is polled.
    pub fn users(&self, ids: impl Into<Vec<UserId>>) -> UserStream {
        let fetcher = self.clone();
        let ids = ids.into();
        let resolved = async move { fetcher.resolve_in_order(ids).await };
        Box::pin(
            stream::once(resolved)
                .map_ok(|users| stream::iter(users.into_iter().map(Ok::<User, HuginnError>)))
                .try_flatten(),
        )
    }

    /// Resolve `ids` and collect the result.
    pub async fn resolve(&self, ids: &[UserId]) -> Result<Vec<User>> {
        self.users(ids.to_vec()).try_collect().await
    }

    async fn resolve_in_order(&self, ids: Vec<UserId>) -> Result<Vec<User>> {
        let mut resolved: HashMap<UserId, User> = HashMap::with_capacity(ids.len());
        let mut misses = Vec::new();
        let mut seen = HashSet::with_capacity(ids.len());
        for &id in &ids {
            if !seen.insert(id) {
                continue;
            }
            match self.cache.get(&id) {
                Some(user) => {
                    resolved.insert(id, user);
                }
                None => misses.push(id),
            }
        }
        metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(resolved.len() as u64);
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(misses.len() as u64);
        debug!(
            requested = ids.len(),
            cached = resolved.len(),
            to_fetch = misses.len(),
            "resolving users"
        );

        if !misses.is_empty() {
            self.fetch_into(misses, &mut resolved).await?;
        }

        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = resolved.get(&id) {
                users.push(user.clone());
            } else if self.missing_assume_deleted {
                let missing = User::from(MissingUser::new(id));
                self.cache.put(id, missing.clone());
                resolved.insert(id, missing.clone());
                metrics::counter!(telemetry::MISSING_USERS_TOTAL).increment(1);
                users.push(missing);
            } else {
                debug!(user_id = id, "user not returned by the API, skipping");
            }
        }
        Ok(users)
    }

    async fn fetch_into(
        &self,
        misses: Vec<UserId>,
        resolved: &mut HashMap<UserId, User>,
    ) -> Result<()> {
        let order: HashMap<UserId, usize> =
            misses.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let rank = move |user: &ExistingUser| order.get(&user.user_id).copied().unwrap_or(usize::MAX);

        let mut fetched = self.api.fetch_all_by(
            USERS_PATH,
            Parameters::new().with("ids", misses),
            FetchOptions::new().filter(self.filter.clone()),
            move |a: &ExistingUser, b: &ExistingUser| rank(a).cmp(&rank(b)),
        );
        while let Some(user) = fetched.next().await.transpose()? {
            let user = User::from(user);
            self.cache.put(user.user_id(), user.clone());
            resolved.insert(user.user_id(), user);
        }
        Ok(())
    }
}
