//! # Domain models for identities, documents and posts
//!
//! Everything the stores hold is a plain value type defined here. The provider
//! speaks in [`Document`]s (an id plus a JSON field map); the feed speaks in
//! [`PostRecord`]s decoded from those documents.
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`Identity`] | The signed-in principal as reported by the provider: `uid`, `email`, and the optional `display_name` set after sign-up. |
//! | [`Document`] | One entry of a provider collection. `id` is provider-assigned; `fields` is the raw field map. |
//! | [`PostRecord`] | One feed entry decoded from a `posts` document: author `username`, `image_url`, `caption`, and the provider-assigned `timestamp`. |
//! | [`NewPost`] | The client-side half of a post before the provider stamps it. |
//!
//! ## Field names
//!
//! Post documents use the field names the hosted collection already contains
//! (`username`, `imageUrl`, `caption`, `timestamp`); see the `*_FIELD` constants.
//!
//! ## Timestamps
//!
//! Timestamps travel inside field maps as RFC 3339 strings ([`timestamp_value`]).
//! [`parse_timestamp`] also accepts the `{ "seconds", "nanoseconds" }` object form
//! that exported collections use.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw field map of a provider document.
pub type Fields = Map<String, Value>;

pub const USERNAME_FIELD: &str = "username";
pub const IMAGE_URL_FIELD: &str = "imageUrl";
pub const CAPTION_FIELD: &str = "caption";
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// The authenticated principal, as issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl Identity {
    /// Display name if one has been set and is not blank.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }

    /// Display name, falling back to the email address.
    pub fn label(&self) -> &str {
        self.display_name().unwrap_or(&self.email)
    }

    /// Posting and the profile page are only offered once a display name exists.
    pub fn can_post(&self) -> bool {
        self.display_name().is_some()
    }
}

/// A document delivered in a collection snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        self.fields.get(field).and_then(parse_timestamp)
    }
}

/// One feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub username: String,
    pub image_url: String,
    pub caption: String,
    /// `None` while a write is still pending on the provider side.
    pub timestamp: Option<DateTime<Utc>>,
}

impl PostRecord {
    /// Decode a post from a collection document.
    ///
    /// Missing or mistyped fields decode as empty strings so that every document
    /// in a snapshot yields exactly one record.
    pub fn from_document(doc: &Document) -> Self {
        let text = |field: &str| doc.get_str(field).unwrap_or_default().to_string();
        Self {
            id: doc.id.clone(),
            username: text(USERNAME_FIELD),
            image_url: text(IMAGE_URL_FIELD),
            caption: text(CAPTION_FIELD),
            timestamp: doc.timestamp(TIMESTAMP_FIELD),
        }
    }

    pub fn is_by(&self, username: &str) -> bool {
        self.username == username
    }
}

/// A post as written by the client; the provider adds id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub username: String,
    pub image_url: String,
    pub caption: String,
}

impl NewPost {
    pub fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(USERNAME_FIELD.to_string(), Value::String(self.username));
        fields.insert(IMAGE_URL_FIELD.to_string(), Value::String(self.image_url));
        fields.insert(CAPTION_FIELD.to_string(), Value::String(self.caption));
        fields
    }
}

/// Encode a timestamp for storage in a field map.
pub fn timestamp_value(ts: DateTime<Utc>) -> Value {
    Value::String(ts.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Decode a timestamp field (RFC 3339 string or `{seconds, nanoseconds}` object).
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|ts| ts.with_timezone(&Utc)),
        Value::Object(map) => {
            let seconds = map.get("seconds").and_then(Value::as_i64)?;
            let nanos = map
                .get("nanoseconds")
                .and_then(Value::as_u64)
                .unwrap_or_default();
            Utc.timestamp_opt(seconds, u32::try_from(nanos).ok()?).single()
        }
        _ => None,
    }
}
