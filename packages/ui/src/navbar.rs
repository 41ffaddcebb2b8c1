use dioxus::prelude::*;

use crate::auth::use_session;
use crate::online_indicator::SyncIndicator;
use crate::theme::ThemeToggle;

/// Top bar: brand, sync status, theme toggle and the sign-in/sign-up entry
/// points for anonymous visitors.
#[component]
pub fn Navbar(
    on_home: EventHandler<()>,
    on_sign_in: EventHandler<()>,
    on_sign_up: EventHandler<()>,
) -> Element {
    let session = use_session();
    let state = session();
    let anonymous = !state.loading && state.identity.is_none();

    rsx! {
        header {
            class: "navbar",
            button {
                class: "navbar-brand",
                onclick: move |_| on_home.call(()),
                "Snapfeed"
            }
            div {
                class: "navbar-actions",
                SyncIndicator {}
                ThemeToggle {}
                if let Some(user) = state.identity {
                    span { class: "navbar-user", "{user.label()}" }
                }
                if anonymous {
                    button {
                        class: "button button-outline",
                        onclick: move |_| on_sign_in.call(()),
                        "Sign In"
                    }
                    button {
                        class: "button button-primary",
                        onclick: move |_| on_sign_up.call(()),
                        "Sign Up"
                    }
                }
            }
        }
    }
}
