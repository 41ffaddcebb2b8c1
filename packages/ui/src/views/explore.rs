use dioxus::prelude::*;

use crate::feed::use_feed;
use crate::post_card::ExploreGrid;

#[component]
pub fn ExploreView() -> Element {
    let feed = use_feed();

    rsx! {
        section {
            class: "view",
            h2 { class: "view-title", "Explore" }
            ExploreGrid { posts: feed().posts }
        }
    }
}
