//! Shared application state for the request handlers.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::oauth::Credentials;
use crate::render::Templates;
use crate::twitter::TwitterClient;

/// How long a visitor has to approve the app on Twitter.
const HANDSHAKE_TTL: Duration = Duration::from_secs(15 * 60);

/// Source of "now" for the statistics.
pub type Clock = fn() -> DateTime<Utc>;

pub struct AppState {
    pub twitter: TwitterClient,
    pub templates: Templates,
    pub pending: PendingHandshakes,
    pub clock: Clock,
}

impl AppState {
    pub fn new(twitter: TwitterClient, templates: Templates) -> Self {
        Self {
            twitter,
            templates,
            pending: PendingHandshakes::default(),
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

/// Request-token secrets of handshakes waiting for the visitor's approval,
/// keyed by request token.
///
/// Each secret is handed out once: the callback that carries the token
/// removes it, so concurrent visitors never see each other's secrets.
#[derive(Default)]
pub struct PendingHandshakes {
    inner: RwLock<HashMap<String, Pending>>,
}

struct Pending {
    secret: String,
    issued_at: Instant,
}

impl PendingHandshakes {
    pub async fn insert(&self, request: Credentials) {
        let mut map = self.inner.write().await;
        map.retain(|_, p| p.issued_at.elapsed() < HANDSHAKE_TTL);
        map.insert(
            request.key,
            Pending {
                secret: request.secret,
                issued_at: Instant::now(),
            },
        );
    }

    /// Remove and return the request token's credentials, if still pending.
    pub async fn take(&self, token: &str) -> Option<Credentials> {
        let pending = self.inner.write().await.remove(token)?;
        if pending.issued_at.elapsed() >= HANDSHAKE_TTL {
            return None;
        }
        Some(Credentials::new(token, pending.secret))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn secrets_are_taken_once() {
        let pending = PendingHandshakes::default();
        pending.insert(Credentials::new("t1", "s1")).await;
        pending.insert(Credentials::new("t2", "s2")).await;

        assert_eq!(pending.take("t2").await, Some(Credentials::new("t2", "s2")));
        assert_eq!(pending.take("t2").await, None);
        assert_eq!(pending.take("t1").await, Some(Credentials::new("t1", "s1")));
        assert_eq!(pending.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_handshakes_expire() {
        let pending = PendingHandshakes::default();
        pending.insert(Credentials::new("old", "s")).await;
        tokio::time::advance(HANDSHAKE_TTL + Duration::from_secs(1)).await;

        assert_eq!(pending.take("old").await, None);

        pending.insert(Credentials::new("a", "s")).await;
        tokio::time::advance(HANDSHAKE_TTL + Duration::from_secs(1)).await;
        pending.insert(Credentials::new("b", "s")).await;
        assert_eq!(pending.len().await, 1);
    }
}
