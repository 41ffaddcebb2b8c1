//! # Provider boundary
//!
//! The hosted backend is reached only through the two traits in this module.
//! Stores and actions receive a provider value explicitly; nothing here is a
//! global.
//!
//! | Trait | Consumed by |
//! |-------|-------------|
//! | [`AuthProvider`] | [`crate::SessionStore`] (subscription) and the auth actions (mutations). |
//! | [`CollectionProvider`] | [`crate::FeedStore`] (subscription) and the upload action (writes). |
//!
//! Mutations are async and report success or failure; they never touch local
//! state. Subscriptions return a [`Live`] whose first event reflects the current
//! provider state, followed by one event per change.

use crate::error::{AuthError, SubscriptionError, WriteError};
use crate::live::Live;
use crate::models::{Document, Fields, Identity};

/// Event emitted on an auth-state subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// The signed-in identity is now this value (`None` = signed out).
    Changed(Option<Identity>),
    /// The subscription broke and will not deliver further events.
    Failed(SubscriptionError),
}

/// Event emitted on a collection subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionEvent {
    Snapshot(Snapshot),
    Failed(SubscriptionError),
}

/// The complete, ordered result of a query at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub documents: Vec<Document>,
}

impl Snapshot {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    Ascending,
    #[default]
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A live query over one collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    pub collection: String,
    pub order_by: Option<OrderBy>,
}

impl Query {
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            order_by: None,
        }
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }
}

/// A document write. `server_timestamp` names a field the provider fills with
/// its own commit time.
#[derive(Debug, Clone, PartialEq)]
pub struct Write {
    pub fields: Fields,
    pub server_timestamp: Option<String>,
}

impl Write {
    pub fn new(fields: Fields) -> Self {
        Self {
            fields,
            server_timestamp: None,
        }
    }

    pub fn with_server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.server_timestamp = Some(field.into());
        self
    }
}

/// Authentication half of the provider.
pub trait AuthProvider {
    /// Create an account; the provider signs the new account in.
    fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<Identity, AuthError>>;
    /// Set the display name of the signed-in account.
    fn update_display_name(
        &self,
        display_name: &str,
    ) -> impl std::future::Future<Output = Result<Identity, AuthError>>;
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<Identity, AuthError>>;
    fn sign_out(&self) -> impl std::future::Future<Output = Result<(), AuthError>>;
    fn subscribe_auth_state(&self) -> Result<Live<AuthEvent>, SubscriptionError>;
}

/// Document-database half of the provider.
pub trait CollectionProvider {
    fn subscribe_collection(
        &self,
        query: &Query,
    ) -> Result<Live<CollectionEvent>, SubscriptionError>;
    /// Add a document with a provider-assigned id, which is returned.
    fn add_document(
        &self,
        collection: &str,
        write: Write,
    ) -> impl std::future::Future<Output = Result<String, WriteError>>;
}
