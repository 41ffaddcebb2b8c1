//! # Session store
//!
//! Caches the provider's view of who is signed in. The only write path is the
//! auth-state subscription: every [`AuthEvent::Changed`] replaces the cached
//! identity outright (last write wins). Auth actions never touch this store.
//!
//! The subscription is scoped to the mount. [`SessionStore::attach`] releases
//! any previous subscription before acquiring a new one, and dropping the store
//! releases whatever it holds, so at most one listener is ever active per store.

use crate::error::SubscriptionError;
use crate::live::{Live, TryNext};
use crate::models::Identity;
use crate::provider::{AuthEvent, AuthProvider};

/// What a processed auth event did to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionChange {
    Identity(Option<Identity>),
    /// The subscription failed; the last identity is kept and the store is detached.
    Failed(SubscriptionError),
}

#[derive(Debug, Default)]
pub struct SessionStore {
    identity: Option<Identity>,
    live: Option<Live<AuthEvent>>,
    last_error: Option<SubscriptionError>,
    applied: u64,
}

impl SessionStore {
    /// An empty, detached store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store and attach it to `provider`.
    pub fn mount<P: AuthProvider>(provider: &P) -> Result<Self, SubscriptionError> {
        let mut store = Self::new();
        store.attach(provider)?;
        Ok(store)
    }

    /// Acquire the auth-state subscription, releasing any previous one first.
    pub fn attach<P: AuthProvider>(&mut self, provider: &P) -> Result<(), SubscriptionError> {
        self.detach();
        let live = provider.subscribe_auth_state()?;
        tracing::debug!(subscription = %live.id(), "session store attached");
        self.live = Some(live);
        self.last_error = None;
        Ok(())
    }

    /// Release the subscription. Returns whether one was held.
    pub fn detach(&mut self) -> bool {
        match self.live.take() {
            Some(live) => {
                tracing::debug!(subscription = %live.id(), "session store detached");
                live.release();
                true
            }
            None => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.live.is_some()
    }

    pub fn current_identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn last_error(&self) -> Option<&SubscriptionError> {
        self.last_error.as_ref()
    }

    /// Number of notifications applied since creation.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Apply every notification that is already queued, without waiting.
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
    pub async fn next_change(&mut self) -> Option<SessionChange> {
        let event = self.live.as_mut()?.next().await;
        match event {
            Some(event) => Some(self.apply(event)),
            None => {
                self.detach();
                None
            }
        }
    }

    fn apply(&mut self, event: AuthEvent) -> SessionChange {
        self.applied += 1;
        match event {
            AuthEvent::Changed(identity) => {
                match &identity {
                    Some(identity) => tracing::info!(uid = %identity.uid, "signed in"),
                    None if self.identity.is_some() => tracing::info!("signed out"),
                    None => {}
                }
                self.identity = identity.clone();
                SessionChange::Identity(identity)
            }
            AuthEvent::Failed(err) => {
                tracing::warn!(error = %err, "auth-state subscription failed");
                self.last_error = Some(err.clone());
                self.detach();
                SessionChange::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;

    #[tokio::test]
    async fn test_initial_notification_is_absent() {
        let backend = MemoryBackend::new();
        let mut store = SessionStore::mount(&backend).unwrap();
        assert!(store.is_attached());
        assert_eq!(store.next_change().await, Some(SessionChange::Identity(None)));
        assert!(store.current_identity().is_none());
        assert_eq!(backend.active_subscriptions(), 1);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let backend = MemoryBackend::new();
        let mut store = SessionStore::mount(&backend).unwrap();

        backend.create_account("a@x.com", "secret").await.unwrap();
        backend.update_display_name("alice").await.unwrap();
        backend.sign_out().await.unwrap();
        backend.sign_in_with_password("a@x.com", "secret").await.unwrap();

        // Initial + create + rename + sign-out + sign-in.
        assert_eq!(store.sync(), 5);
        let identity = store.current_identity().unwrap();
        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.display_name(), Some("alice"));
    }

    #[tokio::test]
    async fn test_every_prefix_matches_latest_notification() {
        let backend = MemoryBackend::new();
        let mut store = SessionStore::mount(&backend).unwrap();
        store.sync();

        backend.create_account("b@x.com", "secret").await.unwrap();
        match store.next_change().await {
            Some(SessionChange::Identity(Some(identity))) => {
                assert_eq!(store.current_identity(), Some(&identity));
            }
            other => panic!("unexpected change: {other:?}"),
        }

        backend.sign_out().await.unwrap();
        assert_eq!(store.next_change().await, Some(SessionChange::Identity(None)));
        assert!(store.current_identity().is_none());
    }

    #[tokio::test]
    async fn test_attach_replaces_previous_subscription() {
        let backend = MemoryBackend::new();
        let mut store = SessionStore::mount(&backend).unwrap();
        store.attach(&backend).unwrap();
        store.attach(&backend).unwrap();
        assert_eq!(backend.active_subscriptions(), 1);
    }

    #[tokio::test]
    async fn test_detach_stops_updates() {
        let backend = MemoryBackend::new();
        let mut store = SessionStore::mount(&backend).unwrap();
        store.sync();
        let applied = store.applied();

        assert!(store.detach());
        assert!(!store.detach());
        assert_eq!(backend.active_subscriptions(), 0);

        backend.create_account("c@x.com", "secret").await.unwrap();
        assert_eq!(store.sync(), 0);
        assert_eq!(store.next_change().await, None);
        assert_eq!(store.applied(), applied);
        assert!(store.current_identity().is_none());
    }

    #[tokio::test]
    async fn test_drop_releases_subscription() {
        let backend = MemoryBackend::new();
        {
            let _store = SessionStore::mount(&backend).unwrap();
            assert_eq!(backend.active_subscriptions(), 1);
        }
        assert_eq!(backend.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_failure_keeps_identity_and_detaches() {
        let backend = MemoryBackend::new();
        backend.create_account("d@x.com", "secret").await.unwrap();
        let mut store = SessionStore::mount(&backend).unwrap();
        store.sync();
        assert!(store.current_identity().is_some());

        backend.fail_subscriptions(SubscriptionError::Unavailable);
        assert_eq!(
            store.next_change().await,
            Some(SessionChange::Failed(SubscriptionError::Unavailable))
        );
        assert!(!store.is_attached());
        assert_eq!(store.last_error(), Some(&SubscriptionError::Unavailable));
        assert_eq!(store.current_identity().map(|i| i.email.as_str()), Some("d@x.com"));
        assert_eq!(backend.active_subscriptions(), 0);

        // Re-attaching clears the error and picks up the current state again.
        store.attach(&backend).unwrap();
        assert!(store.last_error().is_none());
        assert_eq!(store.sync(), 1);
    }
}
