//! Live-sync status indicator for the navbar.

use dioxus::prelude::*;

use crate::auth::use_session;
use crate::backend::use_backend;
use crate::feed::use_feed;
use crate::icons::{FaCloud, FaFlask, FaTriangleExclamation};
use crate::Icon;

/// A small icon that shows whether the live subscriptions are healthy.
///
/// - **Both subscriptions live**: cloud icon ("Live")
/// - **A subscription failed**: warning icon with the error as tooltip
/// - **Demo backend**: flask icon ("Demo mode")
#[component]
pub fn SyncIndicator() -> Element {
    let backend = use_backend();
    let session = use_session();
    let feed = use_feed();

    let error = feed().error.or(session().error);
    if let Some(error) = error {
        return rsx! {
            span {
                class: "sync-indicator sync-indicator--failed",
                title: "Live updates stopped: {error}",
                Icon { icon: FaTriangleExclamation, width: 14, height: 14 }
            }
        };
    }
    if feed().loading {
        return rsx! {};
    }

    if backend.is_demo() {
        rsx! {
            span {
                class: "sync-indicator sync-indicator--demo",
                title: "Demo mode: posts live in this tab only",
                Icon { icon: FaFlask, width: 14, height: 14 }
            }
        }
    } else {
        rsx! {
            span {
                class: "sync-indicator sync-indicator--live",
                title: "Live",
                Icon { icon: FaCloud, width: 14, height: 14 }
            }
        }
    }
}
