//! Per-method backoff scheduling.
//!
//! The API answers with a `backoff` field (seconds) when a client should
//! slow down on a given method; calling that method again before the
//! backoff expires gets the client throttled. The scheduler keeps one gate
//! per backoff bucket (see [`backoff_bucket`]):
//!
//! - Callers on the same bucket pass the gate strictly one at a time, in
//!   arrival order (tokio's mutex is fair). A caller holds the gate for the
//!   whole request, so the next caller computes its wait from the backoff
//!   the previous response actually returned.
//! - Callers on different buckets never wait on each other.
//! - A request that fails without a decodable response releases the gate
//!   with no delay: a transport fault carries no rate-limit guidance, and
//!   the next caller should not inherit a penalty for it.
//!
//! Waiting happens inside [`BackoffScheduler::acquire`], on the caller's
//! task. Dropping the future cancels the wait and leaves nothing behind.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::debug;

use super::url::backoff_bucket;
use crate::telemetry;

#[derive(Debug, Default)]
struct Gate {
    not_before: Option<Instant>,
}

/// Serialises requests per backoff bucket and honours server backoff.
#[derive(Debug, Default)]
pub struct BackoffScheduler {
    gates: Mutex<HashMap<String, Arc<AsyncMutex<Gate>>>>,
}

impl BackoffScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn gate(&self, bucket: &str) -> Arc<AsyncMutex<Gate>> {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(gates.entry(bucket.to_string()).or_default())
    }

    /// Wait for the turn of `path` and for any pending backoff to expire.
    ///
    /// The returned permit must be [`complete`](BackoffPermit::complete)d
    /// with the response's backoff; dropping it instead releases the gate
    /// with no delay for the next caller.
    pub async fn acquire(&self, path: &str) -> BackoffPermit {
        let bucket = backoff_bucket(path);
        let guard = self.gate(&bucket).lock_owned().await;

        if let Some(not_before) = guard.not_before {
            let wait = not_before.saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                debug!(
                    bucket = %bucket,
                    wait_ms = wait.as_millis() as u64,
                    "waiting for API backoff"
                );
                metrics::histogram!(telemetry::BACKOFF_WAIT_SECONDS, "bucket" => bucket.clone())
                    .record(wait.as_secs_f64());
                tokio::time::sleep_until(not_before).await;
            }
        }

        BackoffPermit {
            guard,
            bucket,
            completed: false,
        }
    }

    /// Time left before the next call to `path` may fire.
    ///
    /// Returns `None` while a call on that bucket is in flight (the wait is
    /// then not known yet).
    pub fn remaining(&self, path: &str) -> Option<Duration> {
        let gate = self.gate(&backoff_bucket(path));
        let guard = gate.try_lock().ok()?;
        Some(
            guard
                .not_before
                .map(|t| t.saturating_duration_since(Instant::now()))
                .unwrap_or_default(),
        )
    }
}

/// Exclusive right to call one backoff bucket.
#[derive(Debug)]
pub struct BackoffPermit {
    guard: OwnedMutexGuard<Gate>,
    bucket: String,
    completed: bool,
}

impl BackoffPermit {
    /// The bucket this permit was issued for.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Release the gate, holding the next caller back for `backoff`.
    pub fn complete(mut self, backoff: Option<Duration>) {
        let backoff = backoff.unwrap_or_default();
        if !backoff.is_zero() {
            debug!(
                bucket = %self.bucket,
                backoff_secs = backoff.as_secs(),
                "API requested backoff"
            );
        }
        self.guard.not_before = Some(Instant::now() + backoff);
        self.completed = true;
    }
}

impl Drop for BackoffPermit {
    fn drop(&mut self) {
        if !self.completed {
            self.guard.not_before = None;
        }
    }
}
