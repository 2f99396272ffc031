/// Crate-wide result alias.
pub type FramemarkResult<T> = Result<T, FramemarkError>;

#[derive(thiserror::Error, Debug)]
/// Error taxonomy shared by every component.
pub enum FramemarkError {
    /// Input rejected locally before any storage is touched.
    #[error("validation error: {0}")]
    Validation(String),

    /// A media reference could not be turned into a usable URL.
    #[error("resolution error: {0}")]
    Resolution(String),

    /// The compositing source could not be loaded through a same-origin-safe path.
    #[error("same-origin load error: {0}")]
    SameOriginLoad(String),

    /// The remote advice or object store rejected or failed a request.
    #[error("remote store error: {0}")]
    Remote(String),

    /// The local durable store failed (quota, IO).
    #[error("local store error: {0}")]
    Local(String),

    /// A record addressed by id does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// No original reference can be derived or recalled for a derivative.
    #[error("original unavailable: {0}")]
    OriginalUnavailable(String),

    /// Rasterization or encoding failed.
    #[error("render error: {0}")]
    Render(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramemarkError {
    /// Build a [`FramemarkError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FramemarkError::Resolution`].
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Build a [`FramemarkError::SameOriginLoad`].
    pub fn same_origin(msg: impl Into<String>) -> Self {
        Self::SameOriginLoad(msg.into())
    }

    /// Build a [`FramemarkError::Remote`].
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Build a [`FramemarkError::Local`].
    pub fn local(msg: impl Into<String>) -> Self {
        Self::Local(msg.into())
    }

    /// Build a [`FramemarkError::NotFound`].
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`FramemarkError::OriginalUnavailable`].
    pub fn original_unavailable(msg: impl Into<String>) -> Self {
        Self::OriginalUnavailable(msg.into())
    }

    /// Build a [`FramemarkError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FramemarkError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether the failure came from a remote collaborator and a local fallback applies.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl From<serde_json::Error> for FramemarkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
