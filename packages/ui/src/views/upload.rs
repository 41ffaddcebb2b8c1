use dioxus::prelude::*;

use crate::auth::use_session;
use crate::upload_form::UploadForm;

/// Upload page. `on_uploaded` receives the new post id once the write is
/// accepted.
#[component]
pub fn UploadView(on_uploaded: EventHandler<String>) -> Element {
    let session = use_session();

    rsx! {
        section {
            class: "view",
            h2 { class: "view-title", "New post" }
            if session().can_post() {
                UploadForm { on_uploaded: on_uploaded }
            } else {
                p { class: "muted", "Sign up with a username to share photos." }
            }
        }
    }
}
