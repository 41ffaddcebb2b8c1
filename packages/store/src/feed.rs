//! # Feed store
//!
//! Mirrors one live collection query as an ordered list of [`PostRecord`]s.
//! Each notification carries a full [`Snapshot`](crate::Snapshot); the store
//! replaces its whole list with the snapshot's documents in snapshot order. The
//! provider is the source of truth, so there is no local merge.
//!
//! Like [`crate::SessionStore`], the subscription lives exactly as long as the
//! mount: re-attaching releases the old one first and dropping the store
//! releases it unconditionally.

use crate::error::SubscriptionError;
use crate::live::{Live, TryNext};
use crate::models::PostRecord;
use crate::provider::{CollectionEvent, CollectionProvider, Query};

/// What a processed collection event did to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedChange {
    /// The feed was replaced; carries the new length.
    Replaced(usize),
    /// The subscription failed; the last feed is kept and the store is detached.
    Failed(SubscriptionError),
}

#[derive(Debug)]
pub struct FeedStore {
    query: Query,
    posts: Vec<PostRecord>,
    live: Option<Live<CollectionEvent>>,
    last_error: Option<SubscriptionError>,
    snapshots: u64,
}

impl FeedStore {
    /// An empty, detached store for `query`.
    pub fn new(query: Query) -> Self {
        Self {
            query,
            posts: Vec::new(),
            live: None,
            last_error: None,
            snapshots: 0,
        }
    }

    /// Create a store for `query` and attach it to `provider`.
    pub fn mount<P: CollectionProvider>(provider: &P, query: Query) -> Result<Self, SubscriptionError> {
        let mut store = Self::new(query);
        store.attach(provider)?;
        Ok(store)
    }

    /// Acquire the collection subscription, releasing any previous one first.
    pub fn attach<P: CollectionProvider>(&mut self, provider: &P) -> Result<(), SubscriptionError> {
        self.detach();
        let live = provider.subscribe_collection(&self.query)?;
        tracing::debug!(
            subscription = %live.id(),
            collection = %self.query.collection,
            "feed store attached"
        );
        self.live = Some(live);
        self.last_error = None;
        Ok(())
    }

    /// Release the subscription. Returns whether one was held.
    pub fn detach(&mut self) -> bool {
        match self.live.take() {
            Some(live) => {
                tracing::debug!(subscription = %live.id(), "feed store detached");
                live.release();
                true
            }
            None => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.live.is_some()
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The feed as of the last snapshot, newest first.
    pub fn current_feed(&self) -> &[PostRecord] {
        &self.posts
    }

    /// Posts authored under `username`, in feed order.
    pub fn posts_by<'a>(&'a self, username: &'a str) -> impl Iterator<Item = &'a PostRecord> + 'a {
        self.posts.iter().filter(move |post| post.is_by(username))
    }

    pub fn last_error(&self) -> Option<&SubscriptionError> {
        self.last_error.as_ref()
    }

    /// Number of snapshots applied since creation.
    pub fn snapshots(&self) -> u64 {
        self.snapshots
    }

    /// Apply every snapshot that is already queued, without waiting.
    pub fn sync(&mut self) -> usize {
        let mut count = 0;
        while let Some(live) = self.live.as_mut() {
            match live.try_next() {
                TryNext::Event(event) => {
                    self.apply(event);
                    count += 1;
                }
                TryNext::Empty => break,
                TryNext::Closed => {
                    self.detach();
                    break;
                }
            }
        }
        count
    }

    /// Wait for the next notification and apply it.
    ///
    /// Returns `None` when the store is detached or the provider closed the stream.
    pub async fn next_change(&mut self) -> Option<FeedChange> {
        let event = self.live.as_mut()?.next().await;
        match event {
            Some(event) => Some(self.apply(event)),
            None => {
                self.detach();
                None
            }
        }
    }

    fn apply(&mut self, event: CollectionEvent) -> FeedChange {
        match event {
            CollectionEvent::Snapshot(snapshot) => {
                self.snapshots += 1;
                self.posts = snapshot
                    .documents
                    .iter()
                    .map(PostRecord::from_document)
                    .collect();
                tracing::debug!(posts = self.posts.len(), "feed replaced from snapshot");
                FeedChange::Replaced(self.posts.len())
            }
            CollectionEvent::Failed(err) => {
                tracing::warn!(error = %err, collection = %self.query.collection, "feed subscription failed");
                self.last_error = Some(err.clone());
                self.detach();
                FeedChange::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SnapfeedConfig;
    use crate::memory::MemoryBackend;
    use crate::models::{timestamp_value, Fields, NewPost, TIMESTAMP_FIELD};
    use crate::provider::{AuthProvider, CollectionProvider, Write};
    use chrono::{TimeZone, Utc};

    fn post_fields(username: &str, caption: &str, secs: i64) -> Fields {
        let mut fields = NewPost {
            username: username.to_string(),
            image_url: format!("https://img.example/{caption}.png"),
            caption: caption.to_string(),
        }
        .into_fields();
        fields.insert(
            TIMESTAMP_FIELD.to_string(),
            timestamp_value(Utc.timestamp_opt(secs, 0).unwrap()),
        );
        fields
    }

    fn feed_query() -> Query {
        SnapfeedConfig::default().feed_query()
    }

    fn captions(store: &FeedStore) -> Vec<&str> {
        store.current_feed().iter().map(|p| p.caption.as_str()).collect()
    }

    #[tokio::test]
    async fn test_newest_first() {
        let backend = MemoryBackend::new();
        backend.insert_document("posts", "p1", post_fields("alice", "older", 1_000));
        backend.insert_document("posts", "p2", post_fields("bob", "newer", 2_000));

        let mut store = FeedStore::mount(&backend, feed_query()).unwrap();
        assert_eq!(store.next_change().await, Some(FeedChange::Replaced(2)));
        assert_eq!(captions(&store), vec!["newer", "older"]);
        assert_eq!(store.current_feed()[0].id, "p2");
    }

    #[tokio::test]
    async fn test_feed_visible_without_identity() {
        let backend = MemoryBackend::new();
        backend.insert_document("posts", "p1", post_fields("alice", "public", 1_000));
        assert!(backend.current_identity().is_none());

        let mut store = FeedStore::mount(&backend, feed_query()).unwrap();
        store.sync();
        assert_eq!(captions(&store), vec!["public"]);
    }

    #[tokio::test]
    async fn test_snapshot_replaces_on_insert_update_delete() {
        let backend = MemoryBackend::new();
        let mut store = FeedStore::mount(&backend, feed_query()).unwrap();
        store.sync();
        assert!(store.current_feed().is_empty());

        backend.insert_document("posts", "p1", post_fields("alice", "first", 1_000));
        backend.insert_document("posts", "p2", post_fields("alice", "second", 2_000));
        store.sync();
        assert_eq!(captions(&store), vec!["second", "first"]);

        backend.insert_document("posts", "p1", post_fields("alice", "edited", 3_000));
        store.sync();
        assert_eq!(captions(&store), vec!["edited", "second"]);

        assert!(backend.remove_document("posts", "p2"));
        store.sync();
        assert_eq!(captions(&store), vec!["edited"]);
        assert_eq!(store.snapshots(), 5);
    }

    #[tokio::test]
    async fn test_upload_reaches_feed_only_through_subscription() {
        let backend = MemoryBackend::new();
        backend.insert_document("posts", "old", post_fields("bob", "old", 1_000));
        let mut store = FeedStore::mount(&backend, feed_query()).unwrap();
        store.sync();

        let post = NewPost {
            username: "alice".into(),
            image_url: "https://img.example/a.png".into(),
            caption: "fresh".into(),
        };
        let id = backend
            .add_document("posts", Write::new(post.into_fields()).with_server_timestamp(TIMESTAMP_FIELD))
            .await
            .unwrap();

        // Nothing changes until the snapshot is processed.
        assert_eq!(captions(&store), vec!["old"]);
        store.sync();
        assert_eq!(captions(&store), vec!["fresh", "old"]);
        assert_eq!(store.current_feed()[0].id, id);
        assert!(store.current_feed()[0].timestamp.is_some());
    }

    #[tokio::test]
    async fn test_other_collections_do_not_notify() {
        let backend = MemoryBackend::new();
        let mut store = FeedStore::mount(&backend, feed_query()).unwrap();
        store.sync();

        backend.insert_document("comments", "c1", post_fields("bob", "nope", 1_000));
        assert_eq!(store.sync(), 0);
    }

    #[tokio::test]
    async fn test_posts_by() {
        let backend = MemoryBackend::new();
        backend.insert_document("posts", "p1", post_fields("alice", "a1", 1_000));
        backend.insert_document("posts", "p2", post_fields("bob", "b1", 2_000));
        backend.insert_document("posts", "p3", post_fields("alice", "a2", 3_000));
        let mut store = FeedStore::mount(&backend, feed_query()).unwrap();
        store.sync();

        let mine: Vec<&str> = store.posts_by("alice").map(|p| p.caption.as_str()).collect();
        assert_eq!(mine, vec!["a2", "a1"]);
        assert_eq!(store.posts_by("carol").count(), 0);
    }

    #[tokio::test]
    async fn test_sign_out_leaves_feed_unchanged() {
        let backend = MemoryBackend::new();
        backend.create_account("a@x.com", "secret").await.unwrap();
        backend.insert_document("posts", "p1", post_fields("alice", "kept", 1_000));
        let mut store = FeedStore::mount(&backend, feed_query()).unwrap();
        store.sync();

        backend.sign_out().await.unwrap();
        assert_eq!(store.sync(), 0);
        assert_eq!(captions(&store), vec!["kept"]);
    }

    #[tokio::test]
    async fn test_unmount_releases_and_ignores_later_changes() {
        let backend = MemoryBackend::new();
        let mut store = FeedStore::mount(&backend, feed_query()).unwrap();
        store.sync();
        assert_eq!(backend.active_subscriptions(), 1);

        assert!(store.detach());
        assert_eq!(backend.active_subscriptions(), 0);

        backend.insert_document("posts", "late", post_fields("bob", "late", 1_000));
        assert_eq!(store.sync(), 0);
        assert!(store.current_feed().is_empty());

        drop(store);
        assert_eq!(backend.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_failure_keeps_last_feed() {
        let backend = MemoryBackend::new();
        backend.insert_document("posts", "p1", post_fields("alice", "kept", 1_000));
        let mut store = FeedStore::mount(&backend, feed_query()).unwrap();
        store.sync();

        backend.fail_subscriptions(SubscriptionError::PermissionDenied);
        assert_eq!(
            store.next_change().await,
            Some(FeedChange::Failed(SubscriptionError::PermissionDenied))
        );
        assert!(!store.is_attached());
        assert_eq!(captions(&store), vec!["kept"]);
        assert_eq!(store.last_error(), Some(&SubscriptionError::PermissionDenied));
    }
}
