use api::UploadForm as UploadFields;
use dioxus::prelude::*;

use crate::alert::BrowserAlert;
use crate::auth::use_session;
use crate::backend::{use_backend, use_config};

/// Caption + image reference form. The new post is not added to the feed
/// here; it shows up when the feed subscription delivers it.
#[component]
pub fn UploadForm(on_uploaded: EventHandler<String>) -> Element {
    let backend = use_backend();
    let config = use_config();
    let session = use_session();
    let mut caption = use_signal(String::new);
    let mut image_url = use_signal(String::new);
    let mut busy = use_signal(|| false);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let backend = backend.clone();
        let feed = config.feed.clone();
        spawn(async move {
            busy.set(true);
            let fields = UploadFields {
                caption: caption(),
                image_url: image_url(),
            };
            let author = session().identity;
            let result = api::create_post(&backend, &BrowserAlert, &feed, author.as_ref(), &fields).await;
            busy.set(false);
            if let Ok(id) = result {
                caption.set(String::new());
                image_url.set(String::new());
                on_uploaded.call(id);
            }
        });
    };

    let preview = image_url();

    rsx! {
        form {
            class: "upload-form",
            onsubmit: handle_submit,
            div {
                class: "form-field",
                label { r#for: "upload-image", "Image URL" }
                input {
                    id: "upload-image",
                    r#type: "url",
                    placeholder: "https://…",
                    value: image_url(),
                    oninput: move |evt: FormEvent| image_url.set(evt.value()),
                }
            }
            if !preview.trim().is_empty() {
                img { class: "upload-preview", src: "{preview}", alt: "Preview" }
            }
            div {
                class: "form-field",
                label { r#for: "upload-caption", "Caption" }
                textarea {
                    id: "upload-caption",
                    rows: 3,
                    placeholder: "Write a caption…",
                    value: caption(),
                    oninput: move |evt: FormEvent| caption.set(evt.value()),
                }
            }
            button {
                class: "button button-primary",
                r#type: "submit",
                disabled: busy(),
                if busy() { "Uploading…" } else { "Upload" }
            }
        }
    }
}
