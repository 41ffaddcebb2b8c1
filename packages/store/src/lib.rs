//! # Store crate: synchronized client state for Snapfeed
//!
//! Holds the two pieces of local state the client keeps in sync with the hosted
//! backend, plus the boundary types needed to talk to it.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | `Identity`, `Document`, `PostRecord`, timestamp helpers |
//! | [`provider`] | `AuthProvider` / `CollectionProvider` traits and their event types |
//! | [`live`] | `Live<E>` subscriptions, release handles, listener registry |
//! | [`session`] | `SessionStore`: current identity, fed by auth-state events |
//! | [`feed`] | `FeedStore`: ordered posts, fed by collection snapshots |
//! | [`config`] | `snapfeed.toml` configuration |
//! | `memory` | `MemoryBackend`, an in-process provider for tests and development |

pub mod config;
pub mod error;
pub mod feed;
pub mod live;
pub mod models;
pub mod provider;
pub mod session;

mod memory;
pub use memory::MemoryBackend;

pub use config::SnapfeedConfig;
pub use error::{AuthError, SubscriptionError, WriteError};
pub use feed::{FeedChange, FeedStore};
pub use live::{Listeners, Live, Subscription, SubscriptionId, TryNext};
pub use models::{Document, Fields, Identity, NewPost, PostRecord};
pub use provider::{
    AuthEvent, AuthProvider, CollectionEvent, CollectionProvider, Direction, Query, Snapshot, Write,
};
pub use session::{SessionChange, SessionStore};
