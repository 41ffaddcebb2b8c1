//! Post upload.
//!
//! Writes a new post document; the provider stamps it with its own commit
//! time. The feed picks the post up through its subscription like any other
//! change, so this action returns only the new document id.

use serde::{Deserialize, Serialize};
use store::config::FeedConfig;
use store::{CollectionProvider, Identity, NewPost, Write, WriteError};
use thiserror::Error;

use crate::notify::Notifier;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadForm {
    pub caption: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Sign in to upload a post.")]
    NotSignedIn,
    #[error("Set a username before uploading.")]
    MissingDisplayName,
    #[error("Choose an image to upload.")]
    MissingImage,
    #[error("The image reference must be an http(s) or data URL.")]
    InvalidImage,
    #[error(transparent)]
    Write(#[from] WriteError),
}

fn is_image_reference(reference: &str) -> bool {
    reference.starts_with("https://") || reference.starts_with("http://") || reference.starts_with("data:image/")
}

/// Build the post a signed-in author would publish from `form`.
pub fn prepare_post(author: Option<&Identity>, form: &UploadForm) -> Result<NewPost, UploadError> {
    let author = author.ok_or(UploadError::NotSignedIn)?;
    let username = author.display_name().ok_or(UploadError::MissingDisplayName)?;
    let image_url = form.image_url.trim();
    if image_url.is_empty() {
        return Err(UploadError::MissingImage);
    }
    if !is_image_reference(image_url) {
        return Err(UploadError::InvalidImage);
    }
    Ok(NewPost {
        username: username.to_string(),
        image_url: image_url.to_string(),
        caption: form.caption.trim().to_string(),
    })
}

/// Publish a post to the feed collection. Returns the provider-assigned id.
pub async fn create_post<P: CollectionProvider>(
    provider: &P,
    notifier: &impl Notifier,
    feed: &FeedConfig,
    author: Option<&Identity>,
    form: &UploadForm,
) -> Result<String, UploadError> {
    let result = async {
        let post = prepare_post(author, form)?;
        let write = Write::new(post.into_fields()).with_server_timestamp(&feed.order_by);
        let id = provider.add_document(&feed.collection, write).await?;
        Ok::<_, UploadError>(id)
    }
    .await;

    match &result {
        Ok(id) => tracing::info!(%id, collection = %feed.collection, "post uploaded"),
        Err(err) => {
            tracing::error!(error = %err, "upload failed");
            notifier.notify(&err.to_string());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::RecordingNotifier;
    use store::{AuthProvider, FeedStore, MemoryBackend, SnapfeedConfig};

    fn form() -> UploadForm {
        UploadForm {
            caption: "  golden hour ".into(),
            image_url: "https://img.example/sun.png".into(),
        }
    }

    async fn signed_in_alice(backend: &MemoryBackend) -> Identity {
        backend.create_account("a@x.com", "secret").await.unwrap();
        backend.update_display_name("alice").await.unwrap()
    }

    #[test]
    fn test_prepare_post_validation() {
        let named = Identity {
            uid: "u1".into(),
            email: "a@x.com".into(),
            display_name: Some("alice".into()),
        };
        let unnamed = Identity {
            display_name: None,
            ..named.clone()
        };

        assert_eq!(prepare_post(None, &form()), Err(UploadError::NotSignedIn));
        assert_eq!(
            prepare_post(Some(&unnamed), &form()),
            Err(UploadError::MissingDisplayName)
        );
        let blank = UploadForm {
            image_url: " ".into(),
            ..form()
        };
        assert_eq!(prepare_post(Some(&named), &blank), Err(UploadError::MissingImage));
        let local = UploadForm {
            image_url: "C:\\pics\\sun.png".into(),
            ..form()
        };
        assert_eq!(prepare_post(Some(&named), &local), Err(UploadError::InvalidImage));

        let post = prepare_post(Some(&named), &form()).unwrap();
        assert_eq!(post.username, "alice");
        assert_eq!(post.caption, "golden hour");
    }

    #[tokio::test]
    async fn test_create_post_appears_at_top_of_feed() {
        let backend = MemoryBackend::new();
        let config = SnapfeedConfig::default();
        let notifier = RecordingNotifier::default();
        let author = signed_in_alice(&backend).await;

        let mut feed = FeedStore::mount(&backend, config.feed_query()).unwrap();
        feed.sync();

        create_post(&backend, &notifier, &config.feed, Some(&author), &form())
            .await
            .unwrap();
        let second = UploadForm {
            caption: "later".into(),
            ..form()
        };
        let id = create_post(&backend, &notifier, &config.feed, Some(&author), &second)
            .await
            .unwrap();

        feed.sync();
        let posts = feed.current_feed();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, id);
        assert_eq!(posts[0].caption, "later");
        assert_eq!(posts[1].caption, "golden hour");
        assert!(posts[0].timestamp > posts[1].timestamp);
        assert!(notifier.taken().is_empty());
    }

    #[tokio::test]
    async fn test_create_post_failure_is_surfaced() {
        let backend = MemoryBackend::new();
        let config = SnapfeedConfig::default();
        let notifier = RecordingNotifier::default();
        let author = signed_in_alice(&backend).await;

        backend.set_offline(true);
        let err = create_post(&backend, &notifier, &config.feed, Some(&author), &form())
            .await
            .unwrap_err();
        assert_eq!(err, UploadError::Write(WriteError::Network));
        assert_eq!(notifier.taken().len(), 1);

        let err = create_post(&backend, &notifier, &config.feed, None, &form())
            .await
            .unwrap_err();
        assert_eq!(err, UploadError::NotSignedIn);
        assert_eq!(notifier.taken(), vec!["Sign in to upload a post.".to_string()]);
    }
}
