use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::error::{AuthError, SubscriptionError, WriteError};
use crate::live::{lock, Listeners, Live};
use crate::models::{parse_timestamp, timestamp_value, Document, Fields, Identity};
use crate::provider::{
    AuthEvent, AuthProvider, CollectionEvent, CollectionProvider, Direction, Query, Snapshot, Write,
};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: String,
    identity: Identity,
}

#[derive(Debug, Default)]
struct State {
    /// Keyed by lowercased email.
    accounts: HashMap<String, Account>,
    current: Option<String>,
    collections: HashMap<String, BTreeMap<String, Fields>>,
    next_uid: u64,
    last_stamp: Option<DateTime<Utc>>,
    offline: bool,
}

impl State {
    fn current_identity(&self) -> Option<Identity> {
        let email = self.current.as_ref()?;
        self.accounts.get(email).map(|a| a.identity.clone())
    }

    /// Provider commit time: wall clock, bumped so it is strictly increasing.
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn snapshot(&self, query: &Query) -> Snapshot {
        let Some(docs) = self.collections.get(&query.collection) else {
            return Snapshot::default();
        };
        let mut documents: Vec<Document> = docs
            .iter()
            .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
            .collect();

        if let Some(order) = &query.order_by {
            // Documents lacking the order field are not part of an ordered result.
            documents.retain(|doc| doc.get(&order.field).is_some());
            documents.sort_by(|a, b| {
                let ord = compare_values(&a.fields[&order.field], &b.fields[&order.field]);
                let ord = match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                };
                ord.then_with(|| a.id.cmp(&b.id))
            });
        }
        Snapshot::new(documents)
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    if let (Some(a), Some(b)) = (parse_timestamp(a), parse_timestamp(b)) {
        return a.cmp(&b);
    }
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

fn valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// In-process provider for tests and local development.
///
/// Behaves like the hosted backend where the stores can observe it: new
/// accounts are signed in immediately, every subscription starts with the
/// current state, writes get a strictly increasing server timestamp, and each
/// change notifies every matching subscriber with a full snapshot.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
    auth: Listeners<AuthEvent>,
    queries: Arc<Mutex<HashMap<Query, Listeners<CollectionEvent>>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        lock(&self.state).current_identity()
    }

    /// Simulate losing connectivity: every mutation fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        lock(&self.state).offline = offline;
    }

    /// Insert or replace a document under a caller-chosen id.
    pub fn insert_document(&self, collection: &str, id: &str, fields: Fields) {
        lock(&self.state)
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        self.notify_collection(collection);
    }

    pub fn remove_document(&self, collection: &str, id: &str) -> bool {
        let removed = lock(&self.state)
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        if removed {
            self.notify_collection(collection);
        }
        removed
    }

    /// End the current session as if it had expired on the provider side.
    pub fn expire_session(&self) {
        let expired = lock(&self.state).current.take().is_some();
        if expired {
            self.auth.emit(AuthEvent::Changed(None));
        }
    }

    /// Break every live subscription with `err`. Streams end after the failure.
    pub fn fail_subscriptions(&self, err: SubscriptionError) {
        self.auth.close_with(AuthEvent::Failed(err.clone()));
        let queries: Vec<Listeners<CollectionEvent>> =
            lock(&self.queries).values().cloned().collect();
        for listeners in queries {
            listeners.close_with(CollectionEvent::Failed(err.clone()));
        }
    }

    /// Subscriptions that have been handed out and not yet released.
    pub fn active_subscriptions(&self) -> usize {
        let collections: usize = lock(&self.queries).values().map(Listeners::active).sum();
        self.auth.active() + collections
    }

    /// Queries with a registered listener.
    pub fn watched_queries(&self) -> usize {
        lock(&self.queries).len()
    }

    /// Emit a fresh snapshot to every query on `collection`. Queries whose
    /// listeners have all been released are forgotten here.
    fn notify_collection(&self, collection: &str) {
        let mut queries = lock(&self.queries);
        queries.retain(|_, listeners| listeners.active() > 0);
        let targets: Vec<(Query, Listeners<CollectionEvent>)> = queries
            .iter()
            .filter(|(query, _)| query.collection == collection)
            .map(|(query, listeners)| (query.clone(), listeners.clone()))
            .collect();
        drop(queries);
        for (query, listeners) in targets {
            let snapshot = lock(&self.state).snapshot(&query);
            listeners.emit(CollectionEvent::Snapshot(snapshot));
        }
    }

    fn signed_in(&self, identity: Identity) -> Identity {
        self.auth.emit(AuthEvent::Changed(Some(identity.clone())));
        identity
    }
}

impl AuthProvider for MemoryBackend {
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = {
            let mut state = lock(&self.state);
            if state.offline {
                return Err(AuthError::Network);
            }
            if !valid_email(email) {
                return Err(AuthError::InvalidEmail);
            }
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(AuthError::WeakPassword);
            }
            let key = email.to_lowercase();
            if state.accounts.contains_key(&key) {
                return Err(AuthError::EmailAlreadyInUse);
            }

            state.next_uid += 1;
            let uid = format!("uid-{}", state.next_uid);
            let identity = Identity {
                uid: uid.clone(),
                email: email.to_string(),
                display_name: None,
            };
            state.accounts.insert(
                key.clone(),
                Account {
                    uid,
                    password: password.to_string(),
                    identity: identity.clone(),
                },
            );
            state.current = Some(key);
            identity
        };
        Ok(self.signed_in(identity))
    }

    async fn update_display_name(&self, display_name: &str) -> Result<Identity, AuthError> {
        let identity = {
            let mut state = lock(&self.state);
            if state.offline {
                return Err(AuthError::Network);
            }
            let key = state.current.clone().ok_or(AuthError::NotSignedIn)?;
            let account = state.accounts.get_mut(&key).ok_or(AuthError::UserNotFound)?;
            account.identity.display_name = Some(display_name.to_string());
            account.identity.clone()
        };
        Ok(self.signed_in(identity))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = {
            let mut state = lock(&self.state);
            if state.offline {
                return Err(AuthError::Network);
            }
            if !valid_email(email) {
                return Err(AuthError::InvalidEmail);
            }
            let key = email.to_lowercase();
            let account = state.accounts.get(&key).ok_or(AuthError::UserNotFound)?;
            if account.password != password {
                return Err(AuthError::WrongPassword);
            }
            tracing::debug!(uid = %account.uid, "password accepted");
            let identity = account.identity.clone();
            state.current = Some(key);
            identity
        };
        Ok(self.signed_in(identity))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.expire_session();
        Ok(())
    }

    fn subscribe_auth_state(&self) -> Result<Live<AuthEvent>, SubscriptionError> {
        let current = self.current_identity();
        Ok(self.auth.subscribe_with(AuthEvent::Changed(current)))
    }
}

impl CollectionProvider for MemoryBackend {
    fn subscribe_collection(&self, query: &Query) -> Result<Live<CollectionEvent>, SubscriptionError> {
        let snapshot = lock(&self.state).snapshot(query);
        // Register under the map lock so a concurrent prune cannot drop the entry first.
        let mut queries = lock(&self.queries);
        let live = queries
            .entry(query.clone())
            .or_default()
            .subscribe_with(CollectionEvent::Snapshot(snapshot));
        Ok(live)
    }

    async fn add_document(&self, collection: &str, write: Write) -> Result<String, WriteError> {
        let id = {
            let mut state = lock(&self.state);
            if state.offline {
                return Err(WriteError::Network);
            }
            let mut fields = write.fields;
            if let Some(field) = write.server_timestamp {
                let stamp = state.stamp();
                fields.insert(field, timestamp_value(stamp));
            }
            let id = uuid::Uuid::new_v4().simple().to_string();
            state
                .collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.clone(), fields);
            id
        };
        self.notify_collection(collection);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::TryNext;
    use crate::models::{NewPost, TIMESTAMP_FIELD};
    use serde_json::json;

    fn new_post(caption: &str) -> Write {
        Write::new(
            NewPost {
                username: "alice".into(),
                image_url: "https://img.example/a.png".into(),
                caption: caption.into(),
            }
            .into_fields(),
        )
        .with_server_timestamp(TIMESTAMP_FIELD)
    }

    #[tokio::test]
    async fn test_create_account_signs_in() {
        let backend = MemoryBackend::new();
        let identity = backend.create_account("a@x.com", "secret").await.unwrap();
        assert_eq!(identity.email, "a@x.com");
        assert!(identity.display_name.is_none());
        assert_eq!(backend.current_identity(), Some(identity));
    }

    #[tokio::test]
    async fn test_create_account_rejections() {
        let backend = MemoryBackend::new();
        assert_eq!(
            backend.create_account("not-an-email", "secret").await,
            Err(AuthError::InvalidEmail)
        );
        assert_eq!(
            backend.create_account("a@x.com", "12345").await,
            Err(AuthError::WeakPassword)
        );
        backend.create_account("a@x.com", "secret").await.unwrap();
        assert_eq!(
            backend.create_account("A@X.com", "another").await,
            Err(AuthError::EmailAlreadyInUse)
        );
    }

    #[tokio::test]
    async fn test_sign_in_rejections() {
        let backend = MemoryBackend::new();
        backend.create_account("a@x.com", "secret").await.unwrap();
        backend.sign_out().await.unwrap();

        assert_eq!(
            backend.sign_in_with_password("a@x.com", "wrong!").await,
            Err(AuthError::WrongPassword)
        );
        assert_eq!(
            backend.sign_in_with_password("b@x.com", "secret").await,
            Err(AuthError::UserNotFound)
        );
        assert!(backend.current_identity().is_none());
    }

    #[tokio::test]
    async fn test_update_display_name_requires_session() {
        let backend = MemoryBackend::new();
        assert_eq!(
            backend.update_display_name("alice").await,
            Err(AuthError::NotSignedIn)
        );
    }

    #[tokio::test]
    async fn test_offline_mutations_fail() {
        let backend = MemoryBackend::new();
        backend.set_offline(true);
        assert_eq!(
            backend.create_account("a@x.com", "secret").await,
            Err(AuthError::Network)
        );
        assert_eq!(
            backend.add_document("posts", new_post("x")).await,
            Err(WriteError::Network)
        );
        backend.set_offline(false);
        assert!(backend.create_account("a@x.com", "secret").await.is_ok());
    }

    #[tokio::test]
    async fn test_server_timestamps_strictly_increase() {
        let backend = MemoryBackend::new();
        for caption in ["one", "two", "three"] {
            backend.add_document("posts", new_post(caption)).await.unwrap();
        }
        let snapshot = lock(&backend.state).snapshot(&Query::collection("posts").order_by(
            TIMESTAMP_FIELD,
            Direction::Ascending,
        ));
        let captions: Vec<&str> = snapshot
            .documents
            .iter()
            .map(|d| d.get_str("caption").unwrap())
            .collect();
        assert_eq!(captions, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_ordered_query_skips_documents_without_field() {
        let backend = MemoryBackend::new();
        let fields = |v: serde_json::Value| v.as_object().cloned().unwrap();
        backend.insert_document("posts", "a", fields(json!({ "timestamp": "2024-01-01T00:00:00Z" })));
        backend.insert_document("posts", "b", fields(json!({ "caption": "no stamp" })));

        let ordered = Query::collection("posts").order_by(TIMESTAMP_FIELD, Direction::Descending);
        let mut live = backend.subscribe_collection(&ordered).unwrap();
        match live.try_next() {
            TryNext::Event(CollectionEvent::Snapshot(snapshot)) => {
                assert_eq!(snapshot.len(), 1);
                assert_eq!(snapshot.documents[0].id, "a");
            }
            other => panic!("unexpected event: {other:?}"),
        }

        let mut unordered = backend.subscribe_collection(&Query::collection("posts")).unwrap();
        match unordered.try_next() {
            TryNext::Event(CollectionEvent::Snapshot(snapshot)) => assert_eq!(snapshot.len(), 2),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_expire_session_notifies_once() {
        let backend = MemoryBackend::new();
        backend.create_account("a@x.com", "secret").await.unwrap();
        let mut live = backend.subscribe_auth_state().unwrap();
        assert!(matches!(live.try_next(), TryNext::Event(AuthEvent::Changed(Some(_)))));

        backend.expire_session();
        backend.expire_session();
        assert_eq!(live.try_next(), TryNext::Event(AuthEvent::Changed(None)));
        assert_eq!(live.try_next(), TryNext::Empty);
    }

    #[tokio::test]
    async fn test_released_queries_are_forgotten() {
        let backend = MemoryBackend::new();
        let feed = Query::collection("posts");
        let first = backend.subscribe_collection(&feed).unwrap();
        let by_caption = Query::collection("posts").order_by("caption", Direction::Ascending);
        let other = backend.subscribe_collection(&by_caption).unwrap();
        assert_eq!(backend.watched_queries(), 2);

        first.release();
        other.release();
        // Still counted until the next change to the collection.
        assert_eq!(backend.watched_queries(), 2);

        let mut again = backend.subscribe_collection(&feed).unwrap();
        again.try_next();
        backend.add_document("posts", new_post("hi")).await.unwrap();
        assert_eq!(backend.watched_queries(), 1);
        assert!(matches!(again.try_next(), TryNext::Event(CollectionEvent::Snapshot(s)) if s.len() == 1));
        assert_eq!(backend.active_subscriptions(), 1);
    }

    #[tokio::test]
    async fn test_fail_subscriptions_closes_streams() {
        let backend = MemoryBackend::new();
        let mut live = backend.subscribe_auth_state().unwrap();
        live.try_next();

        backend.fail_subscriptions(SubscriptionError::Unavailable);
        assert_eq!(
            live.try_next(),
            TryNext::Event(AuthEvent::Failed(SubscriptionError::Unavailable))
        );
        assert_eq!(live.try_next(), TryNext::Closed);
        assert_eq!(backend.active_subscriptions(), 0);
    }
}
