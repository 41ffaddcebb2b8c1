//! Session context and hooks for the UI.

use dioxus::prelude::*;
use store::{Identity, SessionChange, SessionStore};

use crate::alert::BrowserAlert;
use crate::backend::use_backend;

/// What the views need to know about the signed-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    /// True until the first auth-state event has arrived.
    pub loading: bool,
    /// Set when the auth-state subscription failed; the identity is then stale.
    pub error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            identity: None,
            loading: true,
            error: None,
        }
    }
}

impl SessionState {
    pub fn from_store(store: &SessionStore) -> Self {
        Self {
            identity: store.current_identity().cloned(),
            loading: false,
            error: store.last_error().map(ToString::to_string),
        }
    }

    pub fn can_post(&self) -> bool {
        self.identity.as_ref().is_some_and(Identity::can_post)
    }
}

/// Get the current session state.
/// Returns a signal that updates whenever the provider reports a new identity.
pub fn use_session() -> Signal<SessionState> {
    use_context::<Signal<SessionState>>()
}

/// Owns the [`SessionStore`] for as long as it is mounted. The store lives
/// inside a task scoped to this component, so unmounting drops it and
/// releases the auth-state subscription.
#[component]
pub fn SessionProvider(children: Element) -> Element {
    let backend = use_backend();
    let mut session = use_signal(SessionState::default);

    use_hook(move || {
        spawn(async move {
            let mut store = match SessionStore::mount(&backend) {
                Ok(store) => store,
                Err(e) => {
                    tracing::error!(error = %e, "could not subscribe to auth state");
                    session.set(SessionState {
                        identity: None,
                        loading: false,
                        error: Some(e.to_string()),
                    });
                    return;
                }
            };
            while let Some(change) = store.next_change().await {
                if let SessionChange::Failed(e) = &change {
                    tracing::warn!(error = %e, "auth-state subscription ended");
                }
                session.set(SessionState::from_store(&store));
            }
        })
    });

    use_context_provider(|| session);

    rsx! {
        {children}
    }
}

/// Button to sign the current user out. The session context updates once the
/// provider confirms, not before.
#[component]
pub fn LogoutButton(
    #[props(default = "Log out".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let backend = use_backend();
    let mut busy = use_signal(|| false);

    let onclick = move |_| {
        let backend = backend.clone();
        async move {
            busy.set(true);
            let _ = api::sign_out(&backend, &BrowserAlert).await;
            busy.set(false);
        }
    };

    rsx! {
        button {
            class: "{class}",
            disabled: busy(),
            onclick: onclick,
            "{label}"
        }
    }
}
