//! Error types shared by every provider implementation.
//!
//! [`AuthError`] messages match the wording the hosted provider shows its own
//! users, so the UI can surface them verbatim.

use thiserror::Error;

/// Failure of an authentication call (sign-up, sign-in, profile update, sign-out).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("The email address is already in use by another account.")]
    EmailAlreadyInUse,
    #[error("The email address is badly formatted.")]
    InvalidEmail,
    #[error("Password should be at least 6 characters")]
    WeakPassword,
    #[error("The password is invalid or the user does not have a password.")]
    WrongPassword,
    #[error("There is no user record corresponding to this identifier. The user may have been deleted.")]
    UserNotFound,
    #[error("Username is required")]
    MissingDisplayName,
    #[error("No user is currently signed in.")]
    NotSignedIn,
    #[error("A network error (such as timeout, interrupted connection or unreachable host) has occurred.")]
    Network,
    #[error("{0}")]
    Provider(String),
}

/// Failure of a live subscription, either at setup or mid-stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    #[error("Missing or insufficient permissions.")]
    PermissionDenied,
    #[error("The live query was interrupted: {0}")]
    Interrupted(String),
    #[error("The service is currently unavailable.")]
    Unavailable,
}

/// Failure of a document write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error("Missing or insufficient permissions.")]
    PermissionDenied,
    #[error("A network error (such as timeout, interrupted connection or unreachable host) has occurred.")]
    Network,
    #[error("{0}")]
    Rejected(String),
}
