use dioxus::prelude::*;

use crate::auth::use_session;
use crate::feed::use_feed;
use crate::post_card::ExploreGrid;
use crate::sidebar::initial;

/// The signed-in user's own posts, taken from the live feed.
#[component]
pub fn ProfileView() -> Element {
    let session = use_session();
    let feed = use_feed();

    let Some(identity) = session().identity else {
        return rsx! {
            section { class: "view", p { class: "muted", "Sign in to see your profile." } }
        };
    };
    let name = identity.label().to_string();
    let posts = feed().posts_by(&name);
    let count = posts.len();

    rsx! {
        section {
            class: "view",
            div {
                class: "profile-header",
                span { class: "avatar avatar-large", "{initial(&name)}" }
                div {
                    h2 { class: "view-title", "{name}" }
                    p { class: "muted", "{identity.email}" }
                    p { strong { "{count}" } if count == 1 { " post" } else { " posts" } }
                }
            }
            if posts.is_empty() {
                p { class: "muted", "You haven't posted anything yet." }
            } else {
                ExploreGrid { posts: posts }
            }
        }
    }
}
