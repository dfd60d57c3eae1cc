//! Insertion-ordered, capacity-bounded post cache for one harvest run.
//!
//! Explicit ordered map — a deque of key/post pairs plus a key index —
//! rather than relying on any hash-map iteration-order behavior. When the
//! cache is full, inserting a new key evicts exactly the oldest surviving
//! entry (FIFO). Existing keys are never overwritten: the first-seen post
//! for a key wins.

use std::collections::{HashSet, VecDeque};

use gleaner_common::Post;

/// Result of [`BoundedPostCache::insert_if_absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// New key, appended at the end of insertion order.
    Inserted,
    /// New key appended after evicting the oldest entry to stay at capacity.
    InsertedEvictingOldest,
    /// Key already present; the candidate was dropped.
    AlreadyPresent,
}

pub struct BoundedPostCache {
    cap: usize,
    entries: VecDeque<(String, Post)>,
    keys: HashSet<String>,
}

impl BoundedPostCache {
    /// Create an empty cache holding at most `cap` posts. `cap` must be at
    /// least 1.
    pub fn new(cap: usize) -> Self {
        debug_assert!(cap >= 1, "cache capacity must be at least 1");
        Self {
            cap,
            entries: VecDeque::with_capacity(cap.min(64)),
            keys: HashSet::new(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert `post` under `key` unless the key is already present.
    /// At capacity, the oldest-inserted entry is evicted first so the
    /// newest entry always survives.
    pub fn insert_if_absent(&mut self, key: String, post: Post) -> InsertOutcome {
        if self.keys.contains(&key) {
            return InsertOutcome::AlreadyPresent;
        }

        let mut evicted = false;
        if self.entries.len() >= self.cap {
            if let Some((oldest_key, _)) = self.entries.pop_front() {
                self.keys.remove(&oldest_key);
                evicted = true;
            }
        }

        self.keys.insert(key.clone());
        self.entries.push_back((key, post));

        if evicted {
            InsertOutcome::InsertedEvictingOldest
        } else {
            InsertOutcome::Inserted
        }
    }

    /// Surviving posts, oldest insertion first.
    pub fn posts_in_order(&self) -> impl Iterator<Item = &Post> {
        self.entries.iter().map(|(_, post)| post)
    }

    /// Consume the cache, returning at most `limit` posts in insertion
    /// order.
    pub fn into_posts(self, limit: usize) -> Vec<Post> {
        self.entries
            .into_iter()
            .take(limit)
            .map(|(_, post)| post)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(n: usize) -> Post {
        Post::new(format!("@user{n}"), format!("Post body {n}"))
    }

    fn keyed(n: usize) -> (String, Post) {
        let p = post(n);
        (p.dedup_key(), p)
    }

    #[test]
    fn preserves_insertion_order() {
        let mut cache = BoundedPostCache::new(10);
        for n in 0..5 {
            let (key, p) = keyed(n);
            assert_eq!(cache.insert_if_absent(key, p), InsertOutcome::Inserted);
        }
        let handles: Vec<&str> = cache.posts_in_order().map(|p| p.handle.as_str()).collect();
        assert_eq!(handles, ["@user0", "@user1", "@user2", "@user3", "@user4"]);
    }

    #[test]
    fn duplicate_key_is_a_noop_and_keeps_first_post() {
        let mut cache = BoundedPostCache::new(10);
        let original = Post::new("@a", "same body").with_url("https://example.com/1");
        let imposter = Post::new("@a", "same body").with_url("https://example.com/2");
        cache.insert_if_absent(original.dedup_key(), original.clone());
        assert_eq!(
            cache.insert_if_absent(imposter.dedup_key(), imposter),
            InsertOutcome::AlreadyPresent
        );
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.posts_in_order().next().unwrap().url.as_deref(),
            Some("https://example.com/1")
        );
    }

    #[test]
    fn eviction_removes_exactly_the_oldest_entry() {
        let mut cache = BoundedPostCache::new(3);
        for n in 0..3 {
            let (key, p) = keyed(n);
            cache.insert_if_absent(key, p);
        }
        let (key, p) = keyed(3);
        assert_eq!(
            cache.insert_if_absent(key, p),
            InsertOutcome::InsertedEvictingOldest
        );
        assert_eq!(cache.len(), 3);
        let handles: Vec<&str> = cache.posts_in_order().map(|p| p.handle.as_str()).collect();
        assert_eq!(handles, ["@user1", "@user2", "@user3"]);
        assert!(!cache.contains(&post(0).dedup_key()));
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut cache = BoundedPostCache::new(4);
        for n in 0..50 {
            let (key, p) = keyed(n);
            cache.insert_if_absent(key, p);
            assert!(cache.len() <= 4);
        }
        let handles: Vec<&str> = cache.posts_in_order().map(|p| p.handle.as_str()).collect();
        assert_eq!(handles, ["@user46", "@user47", "@user48", "@user49"]);
    }

    #[test]
    fn into_posts_truncates_in_insertion_order() {
        let mut cache = BoundedPostCache::new(10);
        for n in 0..6 {
            let (key, p) = keyed(n);
            cache.insert_if_absent(key, p);
        }
        let posts = cache.into_posts(4);
        assert_eq!(posts.len(), 4);
        assert_eq!(posts[0].handle, "@user0");
        assert_eq!(posts[3].handle, "@user3");
    }
}
