//! # REST adapter for the hosted backend
//!
//! Implements [`AuthProvider`] and [`CollectionProvider`] over the hosted
//! service's public REST endpoints:
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | `create_account` | `accounts:signUp` |
//! | `sign_in_with_password` | `accounts:signInWithPassword` |
//! | `update_display_name` | `accounts:update` |
//! | token refresh | `token` (refresh-token grant) |
//! | `subscribe_collection` | `documents:runQuery`, re-run every `poll_interval` |
//! | `add_document` | `documents:commit` with a `REQUEST_TIME` transform |
//!
//! The session lives in the backend value and, in the browser, in
//! `localStorage` (see `persist`). Auth-state listeners are fed from the same
//! place every mutation goes through, so a subscriber sees the new identity
//! only after the provider has accepted the change.
//!
//! Id tokens are refreshed shortly before they expire. A session the provider
//! no longer accepts (refresh rejected, or a query answered with 401) is
//! dropped and listeners see the identity become absent; the feed is public,
//! so the query is then retried without credentials.
//!
//! Collection subscriptions poll and only emit when the result differs from
//! the last one emitted; dropping the [`Live`] stops the polling.

mod config;
mod persist;
mod wire;

pub use config::{ConfigError, RestConfig};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use store::{
    AuthError, AuthEvent, AuthProvider, CollectionEvent, CollectionProvider, Document, Identity,
    Listeners, Live, Query, Snapshot, Subscription, SubscriptionError, SubscriptionId, Write,
    WriteError,
};

use persist::StoredSession;
use wire::{
    AccountResponse, ErrorEnvelope, PasswordRequest, RefreshRequest, RunQueryItem, TokenResponse,
    UpdateProfileRequest,
};

/// Refresh the id token this long before its stated expiry.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct Session {
    identity: Identity,
    /// `None` for a session restored from storage, until the first refresh.
    id_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

fn expiry(expires_in: Option<&str>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let seconds = expires_in?.trim().parse::<i64>().ok()?;
    Some(now + chrono::Duration::seconds(seconds))
}

impl Session {
    fn from_account(response: &AccountResponse, fallback_email: &str) -> Result<Self, AuthError> {
        let id_token = response
            .id_token
            .clone()
            .ok_or_else(|| AuthError::Provider("missing idToken".into()))?;
        Ok(Self {
            identity: response.identity(fallback_email),
            id_token: Some(id_token),
            refresh_token: response.refresh_token.clone(),
            expires_at: expiry(response.expires_in.as_deref(), Utc::now()),
        })
    }

    fn restored(stored: StoredSession) -> Self {
        Self {
            identity: stored.identity,
            id_token: None,
            refresh_token: Some(stored.refresh_token),
            expires_at: None,
        }
    }

    fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match (&self.id_token, self.expires_at) {
            (None, _) => true,
            (Some(_), Some(at)) => at - chrono::Duration::seconds(REFRESH_MARGIN_SECS) <= now,
            (Some(_), None) => false,
        }
    }

    fn stored(&self) -> Option<StoredSession> {
        self.refresh_token.clone().map(|refresh_token| StoredSession {
            identity: self.identity.clone(),
            refresh_token,
        })
    }
}

enum RefreshFailure {
    /// The provider refused the refresh token; the session is over.
    Rejected(String),
    /// The provider could not be reached; the session may still be valid.
    Unreachable(String),
}

#[derive(Clone, Debug)]
pub struct RestBackend {
    http: reqwest::Client,
    config: Arc<RestConfig>,
    session: Arc<Mutex<Option<Session>>>,
    auth: Listeners<AuthEvent>,
    next_poll: Arc<AtomicU64>,
}

async fn sleep(duration: Duration) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(duration).await;
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;
}

fn subscription_error((status, message): (Option<StatusCode>, String)) -> SubscriptionError {
    match status {
        Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => SubscriptionError::PermissionDenied,
        Some(StatusCode::SERVICE_UNAVAILABLE) => SubscriptionError::Unavailable,
        _ => SubscriptionError::Interrupted(message),
    }
}

impl RestBackend {
    /// Create a backend, picking up a session stored by an earlier page load.
    pub fn new(config: RestConfig) -> Self {
        let restored = persist::load().map(Session::restored);
        if let Some(session) = &restored {
            tracing::info!(uid = %session.identity.uid, "restored stored session");
        }
        Self::with_session(config, restored)
    }

    fn with_session(config: RestConfig, session: Option<Session>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: Arc::new(config),
            session: Arc::new(Mutex::new(session)),
            auth: Listeners::new(),
            // Poll ids live in their own range so they never collide with listener ids.
            next_poll: Arc::new(AtomicU64::new(1 << 32)),
        }
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    fn session(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_session(&self, session: Option<Session>) {
        let identity = session.as_ref().map(|s| s.identity.clone());
        persist::save(session.as_ref().and_then(Session::stored).as_ref());
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = session;
        self.auth.emit(AuthEvent::Changed(identity));
    }

    /// Drop the session if it still carries `id_token`. A newer sign-in is kept.
    fn expire_token(&self, id_token: Option<&str>) {
        let current = self.session();
        if current.as_ref().map(|s| s.id_token.as_deref()) == Some(id_token) {
            tracing::info!("session no longer accepted, signing out");
            self.set_session(None);
        }
    }

    /// The id token to send, refreshed first if it is about to expire.
    async fn bearer(&self) -> Option<String> {
        let session = self.session()?;
        if !session.needs_refresh(Utc::now()) {
            return session.id_token;
        }
        match self.refresh(&session).await {
            Ok(id_token) => Some(id_token),
            Err(RefreshFailure::Rejected(message)) => {
                tracing::info!(%message, "token refresh rejected");
                self.expire_token(session.id_token.as_deref());
                None
            }
            Err(RefreshFailure::Unreachable(message)) => {
                tracing::warn!(%message, "token refresh failed");
                session.id_token
            }
        }
    }

    async fn refresh(&self, session: &Session) -> Result<String, RefreshFailure> {
        let refresh_token = session
            .refresh_token
            .as_deref()
            .ok_or_else(|| RefreshFailure::Rejected("no refresh token".into()))?;
        let response = self
            .http
            .post(self.config.token_endpoint())
            .form(&RefreshRequest::new(refresh_token))
            .send()
            .await
            .map_err(|e| RefreshFailure::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(if status.is_client_error() {
                RefreshFailure::Rejected(message)
            } else {
                RefreshFailure::Unreachable(message)
            });
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RefreshFailure::Unreachable(e.to_string()))?;

        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = guard.as_mut().filter(|s| s.identity.uid == session.identity.uid) {
            current.id_token = Some(token.id_token.clone());
            current.refresh_token = Some(token.refresh_token);
            current.expires_at = expiry(Some(&token.expires_in), Utc::now());
            persist::save(current.stored().as_ref());
        }
        tracing::debug!(uid = %session.identity.uid, "id token refreshed");
        Ok(token.id_token)
    }

    async fn call_auth<B: Serialize>(&self, method: &str, body: &B) -> Result<AccountResponse, AuthError> {
        let response = self
            .http
            .post(self.config.auth_endpoint(method))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(method, error = %e, "auth request failed");
                AuthError::Network
            })?;

        if response.status().is_success() {
            response
                .json::<AccountResponse>()
                .await
                .map_err(|e| AuthError::Provider(e.to_string()))
        } else {
            let envelope: ErrorEnvelope = response
                .json()
                .await
                .map_err(|e| AuthError::Provider(e.to_string()))?;
            Err(wire::auth_error(&envelope.error.message))
        }
    }

    async fn post_documents<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<T, (Option<StatusCode>, String)> {
        let mut request = self.http.post(self.config.documents_endpoint(method)).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| (None, e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| status.to_string());
            return Err((Some(status), message));
        }
        response.json::<T>().await.map_err(|e| (Some(status), e.to_string()))
    }

    async fn run_query(&self, query: &Query) -> Result<Vec<Document>, SubscriptionError> {
        let body = wire::run_query_body(query);
        let bearer = self.bearer().await;
        let result: Result<Vec<RunQueryItem>, _> =
            match self.post_documents("runQuery", &body, bearer.as_deref()).await {
                Err((Some(StatusCode::UNAUTHORIZED), message)) if bearer.is_some() => {
                    tracing::info!(%message, "query rejected the session token");
                    self.expire_token(bearer.as_deref());
                    self.post_documents("runQuery", &body, None).await
                }
                other => other,
            };
        let items = result.map_err(subscription_error)?;
        Ok(items
            .into_iter()
            .filter_map(|item| item.document)
            .map(wire::RemoteDocument::into_document)
            .collect())
    }
}

/// Decides what a polled query emits: a snapshot only when the documents
/// changed, and a failure exactly once, after which nothing more.
#[derive(Debug, Default)]
struct SnapshotFilter {
    last: Option<Vec<Document>>,
    done: bool,
}

impl SnapshotFilter {
    fn absorb(&mut self, result: Result<Vec<Document>, SubscriptionError>) -> Option<CollectionEvent> {
        if self.done {
            return None;
        }
        match result {
            Ok(documents) if self.last.as_ref() == Some(&documents) => None,
            Ok(documents) => {
                self.last = Some(documents.clone());
                Some(CollectionEvent::Snapshot(Snapshot::new(documents)))
            }
            Err(err) => {
                self.done = true;
                Some(CollectionEvent::Failed(err))
            }
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }
}

struct Poll {
    backend: RestBackend,
    query: Query,
    filter: SnapshotFilter,
    first: bool,
}

impl AuthProvider for RestBackend {
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let response = self.call_auth("signUp", &request).await?;
        let session = Session::from_account(&response, email)?;
        let identity = session.identity.clone();
        self.set_session(Some(session));
        Ok(identity)
    }

    async fn update_display_name(&self, display_name: &str) -> Result<Identity, AuthError> {
        let current = self.session().ok_or(AuthError::NotSignedIn)?;
        let id_token = self.bearer().await.ok_or(AuthError::NotSignedIn)?;
        let request = UpdateProfileRequest {
            id_token: &id_token,
            display_name,
            return_secure_token: true,
        };
        let response = self.call_auth("update", &request).await?;
        let refreshed = self.session().unwrap_or(current);
        let session = Session {
            identity: response.identity(&refreshed.identity.email),
            id_token: response.id_token.clone().or(Some(id_token)),
            refresh_token: response.refresh_token.clone().or(refreshed.refresh_token),
            expires_at: expiry(response.expires_in.as_deref(), Utc::now()).or(refreshed.expires_at),
        };
        let identity = session.identity.clone();
        self.set_session(Some(session));
        Ok(identity)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let response = self.call_auth("signInWithPassword", &request).await?;
        let session = Session::from_account(&response, email)?;
        let identity = session.identity.clone();
        self.set_session(Some(session));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if self.session().is_some() {
            self.set_session(None);
        }
        Ok(())
    }

    fn subscribe_auth_state(&self) -> Result<Live<AuthEvent>, SubscriptionError> {
        let current = self.session().map(|s| s.identity);
        Ok(self.auth.subscribe_with(AuthEvent::Changed(current)))
    }
}

impl CollectionProvider for RestBackend {
    fn subscribe_collection(&self, query: &Query) -> Result<Live<CollectionEvent>, SubscriptionError> {
        let id = SubscriptionId(self.next_poll.fetch_add(1, Ordering::Relaxed));
        let interval = self.config.poll_interval;
        let collection = query.collection.clone();
        tracing::debug!(subscription = %id, %collection, ?interval, "starting snapshot polling");

        let state = Poll {
            backend: self.clone(),
            query: query.clone(),
            filter: SnapshotFilter::default(),
            first: true,
        };
        let events = stream::unfold(state, move |mut poll| async move {
            if poll.filter.is_done() {
                return None;
            }
            loop {
                if !poll.first {
                    sleep(interval).await;
                }
                poll.first = false;
                let result = poll.backend.run_query(&poll.query).await;
                if let Some(event) = poll.filter.absorb(result) {
                    return Some((event, poll));
                }
            }
        });

        let handle = Subscription::new(id, move || {
            tracing::debug!(%collection, "snapshot polling stopped");
        });
        Ok(Live::new(handle, events))
    }

    async fn add_document(&self, collection: &str, write: Write) -> Result<String, WriteError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let name = format!("{}/{}/{}", self.config.documents_root(), collection, id);
        let body = wire::commit_body(&name, &write.fields, write.server_timestamp.as_deref());
        let bearer = self.bearer().await;
        self.post_documents::<_, serde_json::Value>("commit", &body, bearer.as_deref())
            .await
            .map_err(|(status, message)| match status {
                None => WriteError::Network,
                Some(StatusCode::UNAUTHORIZED) => {
                    self.expire_token(bearer.as_deref());
                    WriteError::PermissionDenied
                }
                Some(StatusCode::FORBIDDEN) => WriteError::PermissionDenied,
                Some(_) => WriteError::Rejected(message),
            })?;
        Ok(id)
    }
}
