use dioxus::prelude::*;

use crate::auth::{use_session, SessionState};
use crate::auth_dialog::{AuthDialog, AuthMode};
use crate::footer::Footer;
use crate::navbar::Navbar;
use crate::sidebar::{AppSidebar, NavItem};

use super::ModalOverlay;

/// True when `active` is a destination the current session may not see.
fn should_leave(active: Option<NavItem>, state: &SessionState) -> bool {
    active.is_some_and(|item| !state.loading && !item.visible_for(state.identity.as_ref()))
}

/// Shared page chrome.
///
/// Platform packages provide navigation callbacks and an `Outlet` as children.
/// The sign-in and sign-up dialogs live here so every page can open them.
#[component]
pub fn ShellLayoutView(
    /// Currently active destination, if the route maps to one.
    active: Option<NavItem>,
    /// The router outlet for child routes.
    children: Element,
    on_navigate: EventHandler<NavItem>,
) -> Element {
    let session = use_session();
    let mut dialog = use_signal(|| Option::<AuthMode>::None);

    // Upload and Profile are not reachable once the user signs out.
    use_effect(use_reactive!(|(active,)| {
        if should_leave(active, &session()) {
            on_navigate.call(NavItem::Home);
        }
    }));

    let session_error = session().error;

    rsx! {
        div {
            class: "shell",
            Navbar {
                on_home: move |_| on_navigate.call(NavItem::Home),
                on_sign_in: move |_| dialog.set(Some(AuthMode::SignIn)),
                on_sign_up: move |_| dialog.set(Some(AuthMode::SignUp)),
            }
            if let Some(error) = session_error {
                div { class: "banner banner-warning", "Sign-in status is no longer live: {error}" }
            }
            div {
                class: "shell-body",
                AppSidebar { active: active, on_navigate: on_navigate }
                main {
                    class: "shell-main",
                    {children}
                }
            }
            Footer {}
        }

        if let Some(mode) = dialog() {
            ModalOverlay {
                on_close: move |_| dialog.set(None),
                AuthDialog {
                    key: "{mode.title()}",
                    mode: mode,
                    on_done: move |_| dialog.set(None),
                    on_cancel: move |_| dialog.set(None),
                }
            }
        }
    }
}
