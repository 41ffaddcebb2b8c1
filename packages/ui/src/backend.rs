//! Backend selection and the contexts every other component reads from.
//!
//! [`AppBackend`] is picked once at startup. With the `rest` feature it talks
//! to the hosted service when `SNAPFEED_API_KEY` / `SNAPFEED_PROJECT_ID` are
//! available and falls back to the in-process backend otherwise, so a build
//! without credentials still runs as a local demo.

use dioxus::prelude::*;
use store::{
    AuthError, AuthEvent, AuthProvider, CollectionEvent, CollectionProvider, Identity, Live,
    MemoryBackend, Query, SnapfeedConfig, SubscriptionError, Write, WriteError,
};

#[derive(Clone, Debug)]
pub enum AppBackend {
    Memory(MemoryBackend),
    #[cfg(feature = "rest")]
    Rest(api::rest::RestBackend),
}

impl AppBackend {
    /// True when running against the in-process backend.
    pub fn is_demo(&self) -> bool {
        matches!(self, AppBackend::Memory(_))
    }
}

/// Parse the `SNAPFEED_CONFIG` TOML baked in at build time, if any.
pub fn load_config() -> SnapfeedConfig {
    match option_env!("SNAPFEED_CONFIG") {
        Some(raw) => SnapfeedConfig::from_toml(raw).unwrap_or_else(|e| {
            tracing::error!(error = %e, "invalid SNAPFEED_CONFIG, using defaults");
            SnapfeedConfig::default()
        }),
        None => SnapfeedConfig::default(),
    }
}

pub fn make_backend(config: &SnapfeedConfig) -> AppBackend {
    #[cfg(feature = "rest")]
    {
        match api::rest::RestConfig::from_env(config) {
            Ok(rest) => {
                tracing::info!(project = %rest.project_id, "using hosted backend");
                return AppBackend::Rest(api::rest::RestBackend::new(rest));
            }
            Err(e) => tracing::warn!(error = %e, "hosted backend not configured, running demo backend"),
        }
    }
    let _ = config;
    tracing::info!("using in-memory backend");
    AppBackend::Memory(MemoryBackend::new())
}

impl AuthProvider for AppBackend {
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        match self {
            AppBackend::Memory(b) => b.create_account(email, password).await,
            #[cfg(feature = "rest")]
            AppBackend::Rest(b) => b.create_account(email, password).await,
        }
    }

    async fn update_display_name(&self, display_name: &str) -> Result<Identity, AuthError> {
        match self {
            AppBackend::Memory(b) => b.update_display_name(display_name).await,
            #[cfg(feature = "rest")]
            AppBackend::Rest(b) => b.update_display_name(display_name).await,
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        match self {
            AppBackend::Memory(b) => b.sign_in_with_password(email, password).await,
            #[cfg(feature = "rest")]
            AppBackend::Rest(b) => b.sign_in_with_password(email, password).await,
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        match self {
            AppBackend::Memory(b) => b.sign_out().await,
            #[cfg(feature = "rest")]
            AppBackend::Rest(b) => b.sign_out().await,
        }
    }

    fn subscribe_auth_state(&self) -> Result<Live<AuthEvent>, SubscriptionError> {
        match self {
            AppBackend::Memory(b) => b.subscribe_auth_state(),
            #[cfg(feature = "rest")]
            AppBackend::Rest(b) => b.subscribe_auth_state(),
        }
    }
}

impl CollectionProvider for AppBackend {
    fn subscribe_collection(&self, query: &Query) -> Result<Live<CollectionEvent>, SubscriptionError> {
        match self {
            AppBackend::Memory(b) => b.subscribe_collection(query),
            #[cfg(feature = "rest")]
            AppBackend::Rest(b) => b.subscribe_collection(query),
        }
    }

    async fn add_document(&self, collection: &str, write: Write) -> Result<String, WriteError> {
        match self {
            AppBackend::Memory(b) => b.add_document(collection, write).await,
            #[cfg(feature = "rest")]
            AppBackend::Rest(b) => b.add_document(collection, write).await,
        }
    }
}

pub fn use_backend() -> AppBackend {
    use_context::<AppBackend>()
}

pub fn use_config() -> SnapfeedConfig {
    use_context::<SnapfeedConfig>()
}

/// Provides the config and backend contexts, then the session and feed
/// providers on top of them.
#[component]
pub fn BackendProvider(children: Element) -> Element {
    let config = use_context_provider(load_config);
    use_context_provider(move || make_backend(&config));

    rsx! {
        crate::SessionProvider {
            crate::FeedProvider {
                {children}
            }
        }
    }
}
