//! Key/value cache with per-entry expiry.
//!
//! Hosts usually share a cache (e.g. Redis) between pools; [`InMemoryCache`]
//! covers single-process use and tests. Expired entries are swept on every
//! write.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

#[async_trait]
pub trait KvCache: Send + Sync {
    /// Live value under `key`, if any.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key` for `ttl`.
    async fn setex(&self, key: &str, ttl: Duration, value: String);
}

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired entries.
    pub async fn purge_expired(&self) {
        let now = Instant::now();
        self.entries
            .write()
            .await
            .retain(|_, entry| entry.expires_at > now);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl KvCache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone())
    }

    async fn setex(&self, key: &str, ttl: Duration, value: String) {
        let now = Instant::now();
        let entry = Entry {
            value,
            expires_at: now + ttl,
        };
        let mut entries = self.entries.write().await;
        entries.retain(|_, existing| existing.expires_at > now);
        entries.insert(key.to_string(), entry);
    }
}
