use dioxus::prelude::*;

#[component]
pub fn Footer() -> Element {
    rsx! {
        footer {
            class: "footer",
            span { "Snapfeed" }
            span { class: "muted", "Share a moment." }
        }
    }
}
