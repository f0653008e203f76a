//! Huginn - rate-limited Stack Exchange API client
//!
//! This crate wraps the Stack Exchange API v2.3 for tools that resolve a
//! lot of users at once: it honours the per-method `backoff` the API asks
//! for, splits vectored requests (`/users/1;2;3...`) into page-sized
//! batches, pages through results lazily and keeps an LRU cache of users
//! it has already seen.
//!
//! # Fetch Example
//!
//! ```rust,no_run
//! use huginn::{FetchOptions, Parameters, StackExchangeApi};
//!
//! #[tokio::main]
//! async fn main() -> huginn::Result<()> {
//!     let api = StackExchangeApi::builder()
//!         .site("stackoverflow")
//!         .build()?;
//!
//!     let badges: Vec<serde_json::Value> = api
//!         .fetch(
//!             "/users/{ids}/badges",
//!             &Parameters::new().with("ids", vec![22656u64]),
//!             &FetchOptions::new().page_size(10),
//!         )
//!         .await?;
//!
//!     println!("{} badges", badges.len());
//!     Ok(())
//! }
//! ```
//!
//! # User Resolution Example
//!
//! ```rust,no_run
//! use huginn::{StackExchangeApi, User, UserFetcher};
//!
//! #[tokio::main]
//! async fn main() -> huginn::Result<()> {
//!     let api = StackExchangeApi::builder().site("stackoverflow").build()?;
//!     let users = UserFetcher::new(api).missing_assume_deleted(true);
//!
//!     for user in users.resolve(&[22656, 1, 4]).await? {
//!         match user {
//!             User::Existing(u) => println!("{} ({})", u.display_name, u.reputation),
//!             User::Missing(u) => println!("user{} (deleted)", u.user_id),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod preferences;
pub mod sede;
pub mod telemetry;
pub mod types;
pub mod users;
pub mod version;

// Re-export main types at crate root
pub use api::{
    BackoffScheduler, HttpTransport, ItemStream, StackExchangeApi, StackExchangeApiBuilder,
    Transport,
};
pub use cache::{Cache, LruCache};
pub use config::Config;
pub use error::{HuginnError, Result};
pub use preferences::PreferenceStore;
pub use sede::{BookmarkedBy, SedeClient, bookmark_users};
pub use users::{UserFetcher, UserStream};

// Re-export all types
pub use types::{
    ApiWrapper, BadgeCounts, ExistingUser, FetchOptions, MissingUser, ParamValue, Parameters,
    Scalar, User, UserId, UserType,
};
