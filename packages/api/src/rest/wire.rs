//! Request/response shapes of the hosted REST endpoints.
//!
//! Document fields travel as typed value objects (`{"stringValue": "..."}`,
//! `{"timestampValue": "..."}`, ...). [`decode_value`] and [`encode_value`]
//! convert between those and the plain JSON the stores work with. Timestamps
//! decode to RFC 3339 strings, which is what [`store::models::parse_timestamp`]
//! expects.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use store::{AuthError, Document, Fields, Identity, Query};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PasswordRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateProfileRequest<'a> {
    pub id_token: &'a str,
    pub display_name: &'a str,
    pub return_secure_token: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountResponse {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of `id_token` in seconds, as a decimal string.
    #[serde(default)]
    pub expires_in: Option<String>,
}

impl AccountResponse {
    pub fn identity(&self, fallback_email: &str) -> Identity {
        Identity {
            uid: self.local_id.clone(),
            email: self
                .email
                .clone()
                .unwrap_or_else(|| fallback_email.to_string()),
            display_name: self.display_name.clone().filter(|name| !name.is_empty()),
        }
    }
}

/// Form body of the token endpoint's refresh grant.
#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub grant_type: &'static str,
    pub refresh_token: &'a str,
}

impl<'a> RefreshRequest<'a> {
    pub fn new(refresh_token: &'a str) -> Self {
        Self {
            grant_type: "refresh_token",
            refresh_token,
        }
    }
}

/// The token endpoint answers in snake_case, unlike the account endpoints.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

/// Map an auth endpoint error message (e.g. `"WEAK_PASSWORD : Password should
/// be at least 6 characters"`) onto [`AuthError`].
pub(crate) fn auth_error(message: &str) -> AuthError {
    let code = message.split(':').next().unwrap_or_default().trim();
    match code {
        "EMAIL_EXISTS" => AuthError::EmailAlreadyInUse,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
        "WEAK_PASSWORD" | "MISSING_PASSWORD" => AuthError::WeakPassword,
        "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => AuthError::UserNotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => AuthError::WrongPassword,
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => AuthError::NotSignedIn,
        _ => AuthError::Provider(message.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunQueryItem {
    #[serde(default)]
    pub document: Option<RemoteDocument>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RemoteDocument {
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RemoteDocument {
    pub fn into_document(self) -> Document {
        let id = self
            .name
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let fields = self
            .fields
            .iter()
            .map(|(key, value)| (key.clone(), decode_value(value)))
            .collect();
        Document::new(id, fields)
    }
}

pub(crate) fn run_query_body(query: &Query) -> Value {
    let mut structured = json!({
        "from": [{ "collectionId": query.collection }],
    });
    if let Some(order) = &query.order_by {
        let direction = match order.direction {
            store::Direction::Ascending => "ASCENDING",
            store::Direction::Descending => "DESCENDING",
        };
        structured["orderBy"] = json!([{
            "field": { "fieldPath": order.field },
            "direction": direction,
        }]);
    }
    json!({ "structuredQuery": structured })
}

pub(crate) fn commit_body(document_name: &str, fields: &Fields, server_timestamp: Option<&str>) -> Value {
    let encoded: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect();
    let mut write = json!({
        "update": { "name": document_name, "fields": encoded },
        "currentDocument": { "exists": false },
    });
    if let Some(field) = server_timestamp {
        write["updateTransforms"] = json!([{
            "fieldPath": field,
            "setToServerValue": "REQUEST_TIME",
        }]);
    }
    json!({ "writes": [write] })
}

/// Typed REST value → plain JSON.
pub(crate) fn decode_value(value: &Value) -> Value {
    let Some(map) = value.as_object() else {
        return Value::Null;
    };
    let Some((kind, inner)) = map.iter().next() else {
        return Value::Null;
    };
    match kind.as_str() {
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "booleanValue" | "doubleValue" => inner.clone(),
        "integerValue" => inner
            .as_str()
            .and_then(|n| n.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(|fields| {
                    fields
                        .iter()
                        .map(|(key, value)| (key.clone(), decode_value(value)))
                        .collect()
                })
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

/// Plain JSON → typed REST value.
pub(crate) fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(values) => json!({
            "arrayValue": { "values": values.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(fields) => {
            let encoded: Map<String, Value> = fields
                .iter()
                .map(|(key, value)| (key.clone(), encode_value(value)))
                .collect();
            json!({ "mapValue": { "fields": encoded } })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::{Direction, PostRecord};

    #[test]
    fn test_auth_error_codes() {
        assert_eq!(auth_error("EMAIL_EXISTS"), AuthError::EmailAlreadyInUse);
        assert_eq!(
            auth_error("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthError::WeakPassword
        );
        assert_eq!(auth_error("INVALID_LOGIN_CREDENTIALS"), AuthError::WrongPassword);
        assert_eq!(auth_error("EMAIL_NOT_FOUND"), AuthError::UserNotFound);
        assert_eq!(
            auth_error("TOO_MANY_ATTEMPTS_TRY_LATER"),
            AuthError::Provider("TOO_MANY_ATTEMPTS_TRY_LATER".into())
        );
    }

    #[test]
    fn test_run_query_response_decodes_to_posts() {
        let body = json!([
            {
                "document": {
                    "name": "projects/p/databases/(default)/documents/posts/abc123",
                    "fields": {
                        "username": { "stringValue": "alice" },
                        "caption": { "stringValue": "sunset" },
                        "imageUrl": { "stringValue": "https://img.example/1.png" },
                        "timestamp": { "timestampValue": "2024-03-01T10:00:00.123456Z" },
                        "likes": { "integerValue": "3" }
                    }
                },
                "readTime": "2024-03-01T10:00:01Z"
            },
            { "readTime": "2024-03-01T10:00:01Z" }
        ]);
        let items: Vec<RunQueryItem> = serde_json::from_value(body).unwrap();
        let docs: Vec<Document> = items
            .into_iter()
            .filter_map(|item| item.document)
            .map(RemoteDocument::into_document)
            .collect();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "abc123");
        assert_eq!(docs[0].get("likes"), Some(&json!(3)));

        let post = PostRecord::from_document(&docs[0]);
        assert_eq!(post.username, "alice");
        assert!(post.timestamp.is_some());
    }

    #[test]
    fn test_run_query_body_orders_descending() {
        let query = Query::collection("posts").order_by("timestamp", Direction::Descending);
        let body = run_query_body(&query);
        assert_eq!(body["structuredQuery"]["from"][0]["collectionId"], "posts");
        assert_eq!(body["structuredQuery"]["orderBy"][0]["direction"], "DESCENDING");
        assert_eq!(
            body["structuredQuery"]["orderBy"][0]["field"]["fieldPath"],
            "timestamp"
        );
    }

    #[test]
    fn test_commit_body_requests_server_time() {
        let fields = json!({ "username": "bob", "nested": { "n": 1 } })
            .as_object()
            .cloned()
            .unwrap();
        let body = commit_body("projects/p/databases/(default)/documents/posts/x", &fields, Some("timestamp"));
        let write = &body["writes"][0];
        assert_eq!(write["update"]["fields"]["username"]["stringValue"], "bob");
        assert_eq!(
            write["update"]["fields"]["nested"]["mapValue"]["fields"]["n"]["integerValue"],
            "1"
        );
        assert_eq!(write["updateTransforms"][0]["setToServerValue"], "REQUEST_TIME");
        assert_eq!(write["currentDocument"]["exists"], false);
    }

    #[test]
    fn test_token_response_is_snake_case() {
        let response: TokenResponse = serde_json::from_value(json!({
            "expires_in": "3600",
            "token_type": "Bearer",
            "refresh_token": "r2",
            "id_token": "t2",
            "user_id": "uid-9",
            "project_id": "42"
        }))
        .unwrap();
        assert_eq!(response.id_token, "t2");
        assert_eq!(response.refresh_token, "r2");
        assert_eq!(response.expires_in, "3600");
    }

    #[test]
    fn test_account_response_identity() {
        let response: AccountResponse = serde_json::from_value(json!({
            "localId": "uid-9",
            "email": "a@x.com",
            "displayName": "",
            "idToken": "tok"
        }))
        .unwrap();
        assert!(response.refresh_token.is_none());
        let identity = response.identity("ignored@x.com");
        assert_eq!(identity.uid, "uid-9");
        assert_eq!(identity.email, "a@x.com");
        assert!(identity.display_name.is_none());
    }
}
