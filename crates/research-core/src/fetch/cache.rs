//! Per-URL content cache
//!
//! Keyed by the exact URL string. Unbounded by default, matching a single
//! research run's needs; long-lived fetchers can set a capacity, in which
//! case the oldest entry is evicted first.

use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, String>,
    insertion_order: VecDeque<String>,
}

/// Cache of successfully extracted page text
#[derive(Debug, Default)]
pub struct ContentCache {
    inner: RwLock<CacheInner>,
    capacity: Option<usize>,
}

impl ContentCache {
    /// Cache that never evicts
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Cache holding at most `capacity` pages (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::default(),
            capacity: Some(capacity.max(1)),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub async fn get(&self, url: &str) -> Option<String> {
        self.inner.read().await.entries.get(url).cloned()
    }

    pub async fn insert(&self, url: impl Into<String>, content: impl Into<String>) {
        let url = url.into();
        let mut inner = self.inner.write().await;

        if inner.entries.insert(url.clone(), content.into()).is_some() {
            return;
        }
        inner.insertion_order.push_back(url);

        if let Some(capacity) = self.capacity {
            while inner.entries.len() > capacity {
                let Some(oldest) = inner.insertion_order.pop_front() else {
                    break;
                };
                inner.entries.remove(&oldest);
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unbounded_keeps_everything() {
        let cache = ContentCache::unbounded();
        for i in 0..100 {
            cache.insert(format!("https://a.com/{}", i), "text").await;
        }

        assert_eq!(cache.len().await, 100);
        assert_eq!(cache.capacity(), None);
        assert_eq!(cache.get("https://a.com/0").await.as_deref(), Some("text"));
    }

    #[tokio::test]
    async fn test_bounded_evicts_oldest() {
        let cache = ContentCache::with_capacity(2);
        cache.insert("a", "1").await;
        cache.insert("b", "2").await;
        cache.insert("c", "3").await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get("a").await.is_none());
        assert_eq!(cache.get("c").await.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_reinsert_does_not_duplicate_order() {
        let cache = ContentCache::with_capacity(2);
        cache.insert("a", "1").await;
        cache.insert("a", "updated").await;
        cache.insert("b", "2").await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("a").await.as_deref(), Some("updated"));
    }

    #[tokio::test]
    async fn test_exact_key_match() {
        let cache = ContentCache::unbounded();
        cache.insert("https://a.com/", "x").await;

        assert!(cache.get("https://a.com").await.is_none());
        assert!(!cache.is_empty().await);
    }
}
