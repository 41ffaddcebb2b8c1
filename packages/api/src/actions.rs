//! # Auth actions
//!
//! Stateless translations of form input into provider calls. None of these
//! touch a [`store::SessionStore`]: the session only changes when the
//! provider's auth-state notification arrives.
//!
//! Failures are logged, surfaced through the [`Notifier`] with the provider's
//! own message, and returned. Forms are taken by reference, so a failed attempt
//! leaves whatever the user typed in place.

use serde::{Deserialize, Serialize};
use store::{AuthError, AuthProvider, Identity};

use crate::notify::Notifier;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpForm {
    pub display_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

fn surface<T>(
    notifier: &impl Notifier,
    action: &'static str,
    result: Result<T, AuthError>,
) -> Result<T, AuthError> {
    if let Err(ref err) = result {
        tracing::error!(action, error = %err, "auth action failed");
        notifier.notify(&err.to_string());
    }
    result
}

/// Create an account and give it a display name.
///
/// The display name is set right after the account exists; the resulting
/// identity reaches the session store through the provider's notification.
pub async fn sign_up<P: AuthProvider>(
    provider: &P,
    notifier: &impl Notifier,
    form: &SignUpForm,
) -> Result<Identity, AuthError> {
    let result = create_named_account(provider, form).await;
    surface(notifier, "sign_up", result)
}

async fn create_named_account<P: AuthProvider>(provider: &P, form: &SignUpForm) -> Result<Identity, AuthError> {
    if form.display_name.trim().is_empty() {
        return Err(AuthError::MissingDisplayName);
    }
    let created = provider.create_account(&form.email, &form.password).await?;
    tracing::info!(uid = %created.uid, "account created");
    provider.update_display_name(&form.display_name).await
}

pub async fn sign_in<P: AuthProvider>(
    provider: &P,
    notifier: &impl Notifier,
    form: &SignInForm,
) -> Result<Identity, AuthError> {
    let result = provider.sign_in_with_password(&form.email, &form.password).await;
    surface(notifier, "sign_in", result)
}

pub async fn sign_out<P: AuthProvider>(provider: &P, notifier: &impl Notifier) -> Result<(), AuthError> {
    let result = provider.sign_out().await;
    surface(notifier, "sign_out", result)
}
