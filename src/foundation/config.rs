use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;

use crate::foundation::error::{FramemarkError, FramemarkResult};

/// Runtime settings. Defaults, then an optional JSON file, then `FRAMEMARK_*` environment
/// variables.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the coaching API (advice store, media URLs, markup upload).
    pub api_base_url: String,
    /// Directory backing the local durable store.
    pub data_dir: PathBuf,
    /// Per-request timeout for remote calls, in milliseconds.
    pub http_timeout_ms: u64,
    /// JPEG quality used for composites (1..=100).
    pub jpeg_quality: u8,
    /// Stroke width on the interactive display surface, in display pixels.
    pub display_stroke_width: f64,
    /// Stroke width on the native-resolution composite, in native pixels.
    pub native_stroke_width: f64,
    /// Soft quota for the local durable store; `None` means unbounded.
    pub store_quota_bytes: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            data_dir: PathBuf::from(".framemark"),
            http_timeout_ms: 10_000,
            jpeg_quality: 90,
            display_stroke_width: 3.0,
            native_stroke_width: 6.0,
            store_quota_bytes: None,
        }
    }
}

impl Settings {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Load a JSON settings file, then apply environment overrides.
    pub fn from_json_file(path: &Path) -> FramemarkResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        let parsed: Settings = serde_json::from_str(&raw)?;
        parsed.validate()?;
        Ok(parsed.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply overrides from `lookup`; unparsable or out-of-range values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("FRAMEMARK_API_URL").filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(dir) = lookup("FRAMEMARK_DATA_DIR").filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        self.http_timeout_ms = lookup("FRAMEMARK_HTTP_TIMEOUT_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .unwrap_or(self.http_timeout_ms);
        self.jpeg_quality = lookup("FRAMEMARK_JPEG_QUALITY")
            .and_then(|v| v.parse::<u8>().ok())
            .filter(|q| (1..=100).contains(q))
            .unwrap_or(self.jpeg_quality);
        if let Some(quota) = lookup("FRAMEMARK_STORE_QUOTA_BYTES")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&n| n > 0)
        {
            self.store_quota_bytes = Some(quota);
        }
        self
    }

    pub fn validate(&self) -> FramemarkResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(FramemarkError::validation("api_base_url must be non-empty"));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(FramemarkError::validation("jpeg_quality must be in 1..=100"));
        }
        if !(self.display_stroke_width > 0.0 && self.native_stroke_width > 0.0) {
            return Err(FramemarkError::validation("stroke widths must be > 0"));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
