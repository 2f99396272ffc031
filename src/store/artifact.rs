use chrono::{DateTime, Utc};

use crate::foundation::error::FramemarkResult;
use crate::store::local::{LocalStore, read_json, write_json};

const ARTIFACT_KEY_PREFIX: &str = "markup_image:";

/// A composite kept on the local machine because the object store could not take it.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LocalArtifact {
    /// `data:image/jpeg;base64,...`
    pub image_data: String,
    pub filename: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

pub fn artifact_key(name: &str) -> String {
    format!("{ARTIFACT_KEY_PREFIX}{name}")
}

pub fn save_artifact(store: &dyn LocalStore, artifact: &LocalArtifact) -> FramemarkResult<()> {
    write_json(store, &artifact_key(&artifact.filename), artifact)
}

pub fn load_artifact(store: &dyn LocalStore, name: &str) -> FramemarkResult<Option<LocalArtifact>> {
    read_json(store, &artifact_key(name))
}
