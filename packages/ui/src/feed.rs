//! Feed context: the live, newest-first list of posts.

use dioxus::prelude::*;
use store::{FeedChange, FeedStore, PostRecord};

use crate::backend::{use_backend, use_config};

#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    pub posts: Vec<PostRecord>,
    /// True until the first snapshot has arrived.
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

impl FeedState {
    pub fn from_store(store: &FeedStore) -> Self {
        Self {
            posts: store.current_feed().to_vec(),
            loading: store.snapshots() == 0 && store.last_error().is_none(),
            error: store.last_error().map(ToString::to_string),
        }
    }

    /// Posts whose author is `username`, in feed order.
    pub fn posts_by(&self, username: &str) -> Vec<PostRecord> {
        self.posts.iter().filter(|p| p.is_by(username)).cloned().collect()
    }
}

pub fn use_feed() -> Signal<FeedState> {
    use_context::<Signal<FeedState>>()
}

/// Mounts a [`FeedStore`] on the configured feed query. The feed is public,
/// so the subscription does not depend on who is signed in.
#[component]
pub fn FeedProvider(children: Element) -> Element {
    let backend = use_backend();
    let config = use_config();
    let mut feed = use_signal(FeedState::default);

    use_hook(move || {
        spawn(async move {
            let mut store = match FeedStore::mount(&backend, config.feed_query()) {
                Ok(store) => store,
                Err(e) => {
                    tracing::error!(error = %e, "could not subscribe to the feed");
                    feed.set(FeedState {
                        posts: Vec::new(),
                        loading: false,
                        error: Some(e.to_string()),
                    });
                    return;
                }
            };

            while let Some(change) = store.next_change().await {
                match change {
                    FeedChange::Replaced(count) => tracing::debug!(count, "feed updated"),
                    FeedChange::Failed(e) => tracing::warn!(error = %e, "feed subscription ended"),
                }
                feed.set(FeedState::from_store(&store));
            }
        })
    });

    use_context_provider(|| feed);

    rsx! {
        {children}
    }
}
