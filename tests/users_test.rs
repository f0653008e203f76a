//! User resolution: ordering, caching and missing users.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::StreamExt;
use huginn::{
    Cache, HuginnError, LruCache, Result, StackExchangeApi, Transport, User, UserFetcher, UserId,
};
use reqwest::Url;
use serde_json::json;

// ============================================================================
// Mock transport
// ============================================================================

/// Answers `/users/{ids}` from a fixed set of existing users, listing them
/// in reverse request order like the real API might.
struct UserDirectory {
    existing: HashSet<UserId>,
    /// 1-based request number that fails with a transport error.
    fail_on: Option<usize>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl UserDirectory {
    fn new(existing: impl IntoIterator<Item = UserId>) -> Arc<Self> {
        Self::failing(existing, None)
    }

    fn failing(existing: impl IntoIterator<Item = UserId>, fail_on: Option<usize>) -> Arc<Self> {
        Arc::new(Self {
            existing: existing.into_iter().collect(),
            fail_on,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for UserDirectory {
    async fn get(&self, url: &Url) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let ids = url.path_segments().and_then(|s| s.last()).unwrap_or_default().to_string();
        self.requested.lock().unwrap().push(ids.clone());
        if self.fail_on == Some(call) {
            return Err(HuginnError::Http("connection reset".into()));
        }

        let items: Vec<_> = ids
            .split(';')
            .filter_map(|id| id.parse::<UserId>().ok())
            .filter(|id| self.existing.contains(id))
            .rev()
            .map(|id| {
                json!({
                    "user_id": id,
                    "display_name": format!("user {id}"),
                    "reputation": id * 100,
                    "link": format!("https://stackoverflow.com/users/{id}/user-{id}"),
                })
            })
            .collect();
        Ok(json!({"items": items, "has_more": false}).to_string())
    }
}

fn fetcher(directory: Arc<UserDirectory>, page_size: usize) -> UserFetcher {
    let api = StackExchangeApi::builder()
        .site("stackoverflow")
        .page_size(page_size)
        .transport(directory)
        .build()
        .unwrap();
    UserFetcher::new(api)
}

fn ids(users: &[User]) -> Vec<UserId> {
    users.iter().map(User::user_id).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn users_come_back_in_requested_order() {
    let directory = UserDirectory::new([1, 2, 3, 4, 5]);
    let users = fetcher(directory.clone(), 100)
        .resolve(&[3, 1, 5, 2])
        .await
        .unwrap();

    assert_eq!(ids(&users), vec![3, 1, 5, 2]);
    assert!(users.iter().all(|u| !u.is_missing()));
    assert_eq!(directory.requested(), vec!["3;1;5;2"]);
}

#[tokio::test]
async fn cached_users_are_not_refetched() {
    let directory = UserDirectory::new([1, 2]);
    let fetcher = fetcher(directory.clone(), 100);

    let first = fetcher.resolve(&[1, 2]).await.unwrap();
    let second = fetcher.resolve(&[2, 1]).await.unwrap();

    assert_eq!(directory.call_count(), 1);
    assert_eq!(ids(&second), vec![2, 1]);
    assert_eq!(first[0], second[1]);
}

#[tokio::test]
async fn only_uncached_ids_are_requested() {
    let directory = UserDirectory::new([1, 2, 3, 4]);
    let fetcher = fetcher(directory.clone(), 100);

    fetcher.resolve(&[2, 4]).await.unwrap();
    let users = fetcher.resolve(&[1, 2, 3, 4]).await.unwrap();

    assert_eq!(ids(&users), vec![1, 2, 3, 4]);
    assert_eq!(directory.requested(), vec!["2;4", "1;3"]);
}

#[tokio::test]
async fn missing_users_are_skipped_by_default() {
    let directory = UserDirectory::new([1, 3]);
    let users = fetcher(directory, 100).resolve(&[1, 2, 3]).await.unwrap();
    assert_eq!(ids(&users), vec![1, 3]);
}

#[tokio::test]
async fn missing_users_can_be_assumed_deleted() {
    let directory = UserDirectory::new([1, 3]);
    let fetcher = fetcher(directory.clone(), 100).missing_assume_deleted(true);

    let users = fetcher.resolve(&[1, 2, 3]).await.unwrap();
    assert_eq!(ids(&users), vec![1, 2, 3]);
    assert!(users[1].is_missing());
    assert_eq!(users[1].link(), "/users/2");

    // placeholders are cached too: a repeat needs no network at all
    let again = fetcher.resolve(&[1, 2, 3]).await.unwrap();
    assert_eq!(again, users);
    assert_eq!(directory.call_count(), 1);
}

#[tokio::test]
async fn duplicate_ids_are_fetched_once() {
    let directory = UserDirectory::new([1, 2]);
    let users = fetcher(directory.clone(), 100)
        .resolve(&[1, 2, 1])
        .await
        .unwrap();

    assert_eq!(ids(&users), vec![1, 2, 1]);
    assert_eq!(directory.requested(), vec!["1;2"]);
}

#[tokio::test]
async fn ids_are_batched_by_page_size() {
    let directory = UserDirectory::new(1..=7);
    let users = fetcher(directory.clone(), 3)
        .resolve(&[7, 6, 5, 4, 3, 2, 1])
        .await
        .unwrap();

    assert_eq!(ids(&users), vec![7, 6, 5, 4, 3, 2, 1]);
    assert_eq!(directory.requested(), vec!["7;6;5", "4;3;2", "1"]);
}

#[tokio::test]
async fn failure_keeps_earlier_batches_cached() {
    let directory = UserDirectory::failing([1, 2, 3, 4], Some(2));
    let fetcher = fetcher(directory.clone(), 2);

    let err = fetcher.resolve(&[1, 2, 3, 4]).await.unwrap_err();
    assert!(matches!(err, HuginnError::Http(_)));

    let users = fetcher.resolve(&[1, 2, 3, 4]).await.unwrap();
    assert_eq!(ids(&users), vec![1, 2, 3, 4]);
    assert_eq!(directory.requested(), vec!["1;2", "3;4", "3;4"]);
}

#[tokio::test]
async fn stream_is_lazy() {
    let directory = UserDirectory::new([1]);
    let fetcher = fetcher(directory.clone(), 100);

    let mut stream = fetcher.users(vec![1]);
    assert_eq!(directory.call_count(), 0);

    let user = stream.next().await.unwrap().unwrap();
    assert_eq!(user.user_id(), 1);
    assert!(stream.next().await.is_none());
    assert_eq!(directory.call_count(), 1);
}

#[tokio::test]
async fn shared_cache_is_used_across_fetchers() {
    let directory = UserDirectory::new([1, 2]);
    let cache: Arc<LruCache<UserId, User>> = Arc::new(LruCache::new(10));

    fetcher(directory.clone(), 100)
        .with_cache(cache.clone())
        .resolve(&[1, 2])
        .await
        .unwrap();
    assert!(cache.contains(&1) && cache.contains(&2));

    let users = fetcher(directory.clone(), 100)
        .with_cache(cache.clone())
        .resolve(&[2])
        .await
        .unwrap();
    assert_eq!(ids(&users), vec![2]);
    assert_eq!(directory.call_count(), 1);
    assert_eq!(
        cache.get(&2).and_then(|u| u.as_existing().map(|u| u.reputation)),
        Some(200)
    );
}
