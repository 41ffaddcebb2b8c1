//! Keeps the signed-in session across page reloads.
//!
//! Browser builds store the identity and refresh token in `localStorage`; the
//! short-lived id token is not stored and gets refreshed on first use. Native
//! builds keep the session in memory only.

use serde::{Deserialize, Serialize};
use store::Identity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoredSession {
    pub identity: Identity,
    pub refresh_token: String,
}

#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "snapfeed-session";

pub(crate) fn decode(raw: &str) -> Option<StoredSession> {
    match serde_json::from_str(raw) {
        Ok(stored) => Some(stored),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable stored session");
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn load() -> Option<StoredSession> {
    let raw = storage()?.get_item(STORAGE_KEY).ok().flatten()?;
    decode(&raw)
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn load() -> Option<StoredSession> {
    None
}

/// Store `session`, or forget the stored one when `None`.
#[cfg(target_arch = "wasm32")]
pub(crate) fn save(session: Option<&StoredSession>) {
    let Some(storage) = storage() else {
        return;
    };
    let result = match session.map(serde_json::to_string) {
        Some(Ok(raw)) => storage.set_item(STORAGE_KEY, &raw),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "could not encode session");
            return;
        }
        None => storage.remove_item(STORAGE_KEY),
    };
    if result.is_err() {
        tracing::warn!("could not update stored session");
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn save(session: Option<&StoredSession>) {
    tracing::trace!(stored = session.is_some(), "session kept in memory only");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_stored_session() {
        let stored = decode(
            r#"{"identity":{"uid":"u1","email":"a@x.com","display_name":"alice"},"refresh_token":"r1"}"#,
        )
        .unwrap();
        assert_eq!(stored.identity.display_name.as_deref(), Some("alice"));
        assert_eq!(stored.refresh_token, "r1");

        assert_eq!(decode("{\"identity\":"), None);
        assert_eq!(decode("null"), None);
    }
}
