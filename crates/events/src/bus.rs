//! The async event bus (§4.D Event Bus)
//!
//! Handlers are async closures returning a boxed, `'static` future so the
//! bus can invoke them under a read lock and then drop the lock before
//! awaiting — no handler ever runs while a subscriber could be blocked
//! registering or unregistering. Every dispatch for one `publish` call
//! runs concurrently via `tokio::spawn`, each wrapped in its own timeout,
//! and `publish` awaits them all before returning so tests can observe
//! side effects deterministically.

use crate::error::EventError;
use crate::event::Event;
use futures::future::BoxFuture;
use globset::{Glob, GlobMatcher};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A handler invoked for every event a [`Subscription`] matches.
pub type Handler = Box<dyn Fn(Event) -> BoxFuture<'static, ()> + Send + Sync>;

/// How long a single handler invocation may run before it is abandoned
/// (§4.D, handler timeout).
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(5);

/// What a subscription matches against published events.
pub enum Subscription {
    /// Matches one exact [`crate::EventKind`].
    ByType(crate::EventKind),
    /// Matches events whose [`crate::EventKind`] display string matches a
    /// glob pattern (e.g. `"entity.*"`, `"function.*"`).
    ByPattern(GlobMatcher),
    /// Matches events satisfying an arbitrary predicate.
    ByPredicate(Box<dyn Fn(&Event) -> bool + Send + Sync>),
}

impl Subscription {
    /// Build a glob-pattern subscription.
    pub fn pattern(pattern: &str) -> Result<Self, EventError> {
        Glob::new(pattern)
            .map(|glob| Subscription::ByPattern(glob.compile_matcher()))
            .map_err(|source| EventError::InvalidPattern { pattern: pattern.to_string(), source })
    }

    fn matches(&self, event: &Event) -> bool {
        match self {
            Subscription::ByType(kind) => &event.kind == kind,
            Subscription::ByPattern(matcher) => matcher.is_match(event.kind.to_string()),
            Subscription::ByPredicate(predicate) => predicate(event),
        }
    }
}

struct SubscriptionEntry {
    id: u64,
    subscription: Subscription,
    handler: Handler,
    timeout: Duration,
}

struct Inner {
    subscriptions: RwLock<Vec<SubscriptionEntry>>,
    next_id: AtomicU64,
    /// Fingerprints currently mid-dispatch, so a handler that republishes
    /// an event under the same fingerprint it received does not re-enter
    /// `publish` for that same causal chain (§4.D, self-recursion guard).
    active_fingerprints: Mutex<HashSet<u64>>,
}

/// The process-wide event bus. Cheaply cloneable; clones share the same
/// subscriber set.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// A bus with no subscribers.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                subscriptions: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
                active_fingerprints: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Subscribe with the default handler timeout.
    pub fn subscribe(&self, subscription: Subscription, handler: Handler) -> u64 {
        self.subscribe_with_timeout(subscription, handler, DEFAULT_HANDLER_TIMEOUT)
    }

    /// Subscribe with an explicit handler timeout.
    pub fn subscribe_with_timeout(&self, subscription: Subscription, handler: Handler, timeout: Duration) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscriptions
            .write()
            .push(SubscriptionEntry { id, subscription, handler, timeout });
        id
    }

    /// Remove a subscription. Returns `false` if `id` was not found.
    pub fn unsubscribe(&self, id: u64) -> bool {
        let mut subs = self.inner.subscriptions.write();
        let before = subs.len();
        subs.retain(|entry| entry.id != id);
        subs.len() != before
    }

    /// Publish an event to every matching subscriber, awaiting completion
    /// (or timeout) of every dispatched handler.
    pub async fn publish(&self, event: Event) {
        if let Some(fingerprint) = event.emitter_fingerprint {
            let mut active = self.inner.active_fingerprints.lock();
            if !active.insert(fingerprint) {
                debug!(fingerprint, "dropping event: its own emitter is still mid-dispatch");
                return;
            }
        }

        let dispatches: Vec<(u64, Duration, BoxFuture<'static, ()>)> = {
            let subs = self.inner.subscriptions.read();
            subs.iter()
                .filter(|entry| entry.subscription.matches(&event))
                .map(|entry| (entry.id, entry.timeout, (entry.handler)(event.clone())))
                .collect()
        };

        let mut joins = Vec::with_capacity(dispatches.len());
        for (id, timeout, future) in dispatches {
            joins.push(tokio::spawn(async move {
                if tokio::time::timeout(timeout, future).await.is_err() {
                    warn!(subscription = id, "event handler timed out");
                }
            }));
        }
        for join in joins {
            let _ = join.await;
        }

        if let Some(fingerprint) = event.emitter_fingerprint {
            self.inner.active_fingerprints.lock().remove(&fingerprint);
        }
    }

    /// Current number of live subscriptions, for diagnostics and tests.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriptions.read().len()
    }
}
