use dioxus::prelude::*;

use ui::views::UploadView;

use crate::Route;

/// After a successful upload, go back to the feed where the post will appear.
#[component]
pub fn Upload() -> Element {
    let nav = use_navigator();

    rsx! {
        UploadView {
            on_uploaded: move |id: String| {
                tracing::debug!(%id, "returning to feed after upload");
                nav.push(Route::Home {});
            },
        }
    }
}
