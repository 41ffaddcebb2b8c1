use api::{SignInForm, SignUpForm};
use dioxus::prelude::*;

use crate::alert::BrowserAlert;
use crate::backend::use_backend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignUp,
    SignIn,
}

impl AuthMode {
    pub fn title(self) -> &'static str {
        match self {
            AuthMode::SignUp => "Sign Up",
            AuthMode::SignIn => "Sign In",
        }
    }
}

/// Sign-up / sign-in form. `on_done` fires only after the provider accepted
/// the credentials; on failure the alert has been shown and the fields keep
/// what the user typed.
#[component]
pub fn AuthDialog(mode: AuthMode, on_done: EventHandler<()>, on_cancel: EventHandler<()>) -> Element {
    let backend = use_backend();
    let mut display_name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut busy = use_signal(|| false);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let backend = backend.clone();
        spawn(async move {
            busy.set(true);
            let accepted = match mode {
                AuthMode::SignUp => {
                    let form = SignUpForm {
                        display_name: display_name(),
                        email: email(),
                        password: password(),
                    };
                    api::sign_up(&backend, &BrowserAlert, &form).await.is_ok()
                }
                AuthMode::SignIn => {
                    let form = SignInForm {
                        email: email(),
                        password: password(),
                    };
                    api::sign_in(&backend, &BrowserAlert, &form).await.is_ok()
                }
            };
            busy.set(false);
            if accepted {
                on_done.call(());
            }
        });
    };

    rsx! {
        form {
            class: "dialog-form",
            onsubmit: handle_submit,
            h2 { class: "dialog-title", "{mode.title()}" }

            if mode == AuthMode::SignUp {
                div {
                    class: "form-field",
                    label { r#for: "auth-username", "Username" }
                    input {
                        id: "auth-username",
                        r#type: "text",
                        placeholder: "username",
                        value: display_name(),
                        oninput: move |evt: FormEvent| display_name.set(evt.value()),
                    }
                }
            }
            div {
                class: "form-field",
                label { r#for: "auth-email", "Email" }
                input {
                    id: "auth-email",
                    r#type: "email",
                    placeholder: "email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }
            }
            div {
                class: "form-field",
                label { r#for: "auth-password", "Password" }
                input {
                    id: "auth-password",
                    r#type: "password",
                    placeholder: "password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }
            }

            div {
                class: "form-actions",
                button {
                    class: "button button-primary",
                    r#type: "submit",
                    disabled: busy(),
                    "{mode.title()}"
                }
                button {
                    class: "button button-outline",
                    r#type: "button",
                    onclick: move |_| on_cancel.call(()),
                    "Cancel"
                }
            }
        }
    }
}
