use dioxus::prelude::*;

use crate::feed::use_feed;
use crate::post_card::PostList;

/// The public feed, newest first.
#[component]
pub fn HomeView() -> Element {
    let feed = use_feed();
    let state = feed();

    if state.loading {
        return rsx! {
            div { class: "empty-state", p { class: "muted", "Loading feed…" } }
        };
    }

    rsx! {
        section {
            class: "view",
            if let Some(error) = state.error {
                div { class: "banner banner-warning", "Live updates stopped: {error}" }
            }
            PostList { posts: state.posts }
        }
    }
}
