use std::sync::Arc;

use chrono::Utc;

use crate::composite::codec::EncodedImage;
use crate::media::reference::MediaRef;
use crate::store::artifact::{LocalArtifact, save_artifact};
use crate::store::local::LocalStore;
use crate::store::remote::ObjectStore;

/// Where a published composite ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stored {
    /// Object store accepted it; the reference is persisted.
    Remote,
    /// Kept in the local durable store under a volatile reference.
    Local,
    /// Neither store took it. The volatile reference will not resolve.
    Unsaved,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishOutcome {
    pub reference: MediaRef,
    pub stored: Stored,
}

/// Stores composites remotely, falling back to the local durable store.
pub struct ArtifactPublisher {
    objects: Arc<dyn ObjectStore>,
    local: Arc<dyn LocalStore>,
}

impl ArtifactPublisher {
    pub fn new(objects: Arc<dyn ObjectStore>, local: Arc<dyn LocalStore>) -> Self {
        Self { objects, local }
    }

    /// Publish `image` under `name`. Never fails: every outcome carries a reference.
    #[tracing::instrument(skip(self, image), fields(bytes = image.bytes.len()))]
    pub fn publish(&self, image: &EncodedImage, name: &str, original: &MediaRef) -> PublishOutcome {
        match self.objects.upload(name, &image.bytes, original) {
            Ok(reference) => {
                tracing::info!(%reference, "composite uploaded");
                return PublishOutcome {
                    reference,
                    stored: Stored::Remote,
                };
            }
            Err(e) => tracing::warn!(error = %e, "upload failed, keeping composite locally"),
        }

        let artifact = LocalArtifact {
            image_data: image.to_data_url(),
            filename: name.to_owned(),
            original_url: original.to_string(),
            created_at: Utc::now(),
        };
        let stored = match save_artifact(self.local.as_ref(), &artifact) {
            Ok(()) => Stored::Local,
            Err(e) => {
                tracing::error!(error = %e, "local fallback failed, composite is unsaved");
                Stored::Unsaved
            }
        };
        PublishOutcome {
            reference: MediaRef::Volatile(name.to_owned()),
            stored,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/publish/publisher.rs"]
mod tests;
