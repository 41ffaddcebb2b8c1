use dioxus::prelude::*;

use ui::views::ExploreView;

#[component]
pub fn Explore() -> Element {
    rsx! { ExploreView {} }
}
