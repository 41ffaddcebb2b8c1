//! # API crate: user actions and the hosted-backend adapter
//!
//! Everything the view layer calls in response to a user event lives here. The
//! actions are generic over the provider traits from [`store`], so the same
//! code runs against the in-memory backend in tests and against the hosted
//! service in the browser.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`actions`] | — | `sign_up`, `sign_in`, `sign_out` |
//! | [`upload`] | — | `create_post`: publish a post to the feed collection |
//! | [`notify`] | — | `Notifier` seam for blocking user messages |
//! | [`rest`] | `rest` | REST implementation of the provider traits |
//!
//! Actions never write to a store. Their effects come back through the
//! provider's subscriptions.

pub mod actions;
pub mod notify;
pub mod upload;

#[cfg(feature = "rest")]
pub mod rest;

pub use actions::{sign_in, sign_out, sign_up, SignInForm, SignUpForm};
pub use notify::{LogNotifier, Notifier};
pub use upload::{create_post, prepare_post, UploadError, UploadForm};
