//! This crate contains all shared UI for the workspace.
//!
//! Views read two contexts, the session and the feed, each backed by a store
//! from the `store` crate that a provider component keeps subscribed for as
//! long as it is mounted. User actions go through `api` and never write to
//! those contexts directly.

use dioxus::prelude::*;

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

pub const SNAPFEED_CSS: Asset = asset!("/assets/snapfeed.css");

mod alert;
pub use alert::BrowserAlert;

mod backend;
pub use backend::{load_config, make_backend, use_backend, use_config, AppBackend, BackendProvider};

mod auth;
pub use auth::{use_session, LogoutButton, SessionProvider, SessionState};

mod feed;
pub use feed::{use_feed, FeedProvider, FeedState};

mod theme;
pub use theme::{apply_theme, load_theme, use_theme, Theme, ThemeProvider, ThemeSignal, ThemeToggle};

mod navbar;
pub use navbar::Navbar;

mod online_indicator;
pub use online_indicator::SyncIndicator;

mod sidebar;
pub use sidebar::{AppSidebar, NavItem};

mod auth_dialog;
pub use auth_dialog::{AuthDialog, AuthMode};

mod upload_form;
pub use upload_form::UploadForm;

mod post_card;
pub use post_card::{ExploreGrid, PostCard, PostList};

mod footer;
pub use footer::Footer;

pub mod views;
