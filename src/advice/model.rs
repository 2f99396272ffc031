use chrono::{DateTime, Utc};

use crate::foundation::error::{FramemarkError, FramemarkResult};
use crate::media::reference::MediaRef;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
/// Swing phase a piece of advice is attached to.
pub enum SwingPhase {
    Address,
    Takeaway,
    HalfwayBack,
    Backswing,
    Top,
    Transition,
    Downswing,
    Impact,
    FollowThrough,
    #[serde(rename = "finish_1")]
    Finish1,
    #[serde(rename = "finish_2")]
    Finish2,
    /// Also absorbs codes this build does not know.
    #[default]
    #[serde(other)]
    Other,
}

impl SwingPhase {
    pub const ALL: [SwingPhase; 12] = [
        SwingPhase::Address,
        SwingPhase::Takeaway,
        SwingPhase::HalfwayBack,
        SwingPhase::Backswing,
        SwingPhase::Top,
        SwingPhase::Transition,
        SwingPhase::Downswing,
        SwingPhase::Impact,
        SwingPhase::FollowThrough,
        SwingPhase::Finish1,
        SwingPhase::Finish2,
        SwingPhase::Other,
    ];

    /// Wire code stored in `phaseCode`.
    pub fn code(self) -> &'static str {
        match self {
            SwingPhase::Address => "address",
            SwingPhase::Takeaway => "takeaway",
            SwingPhase::HalfwayBack => "halfway_back",
            SwingPhase::Backswing => "backswing",
            SwingPhase::Top => "top",
            SwingPhase::Transition => "transition",
            SwingPhase::Downswing => "downswing",
            SwingPhase::Impact => "impact",
            SwingPhase::FollowThrough => "follow_through",
            SwingPhase::Finish1 => "finish_1",
            SwingPhase::Finish2 => "finish_2",
            SwingPhase::Other => "other",
        }
    }

    /// Display label stored in `phase`.
    pub fn label(self) -> &'static str {
        match self {
            SwingPhase::Address => "アドレス",
            SwingPhase::Takeaway => "テイクバック",
            SwingPhase::HalfwayBack => "ハーフウェイバック",
            SwingPhase::Backswing => "バックスイング",
            SwingPhase::Top => "トップ",
            SwingPhase::Transition => "切り返し",
            SwingPhase::Downswing => "ダウンスイング",
            SwingPhase::Impact => "インパクト",
            SwingPhase::FollowThrough => "フォロースルー",
            SwingPhase::Finish1 => "フィニッシュ1",
            SwingPhase::Finish2 => "フィニッシュ2",
            SwingPhase::Other => "その他",
        }
    }

    /// Parse a wire code; unknown codes are a validation error here.
    pub fn from_code(code: &str) -> FramemarkResult<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.code() == code)
            .ok_or_else(|| FramemarkError::validation(format!("unknown swing phase '{code}'")))
    }
}

/// Advice identifier. New ids are UUID v4 strings; numeric ids from older records are kept as
/// their decimal text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct AdviceId(String);

impl AdviceId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AdviceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl std::fmt::Display for AdviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for AdviceId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Unsigned(u64),
            Signed(i64),
            Float(f64),
        }

        Ok(AdviceId(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Unsigned(n) => n.to_string(),
            Raw::Signed(n) => n.to_string(),
            Raw::Float(f) => f.to_string(),
        }))
    }
}

/// One timestamped coaching note on a video.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    pub id: AdviceId,
    /// Human label of the phase.
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub phase_code: SwingPhase,
    /// Media reference of the captured (possibly marked-up) frame.
    pub capture_url: String,
    /// Last resolved display URL for `capture_url`; refreshed on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_sas_url: Option<String>,
    #[serde(default)]
    pub comment: String,
    /// Playback position in seconds.
    #[serde(default)]
    pub timestamp: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_confirmed: bool,
}

impl Advice {
    pub fn capture_ref(&self) -> FramemarkResult<MediaRef> {
        MediaRef::parse(&self.capture_url)
    }

    pub fn has_comment(&self) -> bool {
        !self.comment.trim().is_empty()
    }
}

/// Input for a new advice record.
#[derive(Clone, Debug, Default)]
pub struct NewAdvice {
    pub phase: Option<SwingPhase>,
    pub capture: Option<MediaRef>,
    pub capture_sas_url: Option<String>,
    pub comment: String,
    pub timestamp: f64,
}

impl NewAdvice {
    /// Check the draft and build the record it describes.
    pub(crate) fn into_advice(self, now: DateTime<Utc>) -> FramemarkResult<Advice> {
        let phase = self
            .phase
            .ok_or_else(|| FramemarkError::validation("advice needs a swing phase"))?;
        let capture = self
            .capture
            .ok_or_else(|| FramemarkError::validation("advice needs a captured frame"))?;
        let comment = self.comment.trim();
        if comment.is_empty() {
            return Err(FramemarkError::validation("advice comment is empty"));
        }
        if !self.timestamp.is_finite() || self.timestamp < 0.0 {
            return Err(FramemarkError::validation(format!(
                "advice timestamp must be a non-negative number of seconds (got {})",
                self.timestamp
            )));
        }
        Ok(Advice {
            id: AdviceId::generate(),
            phase: phase.label().to_owned(),
            phase_code: phase,
            capture_url: capture.to_string(),
            capture_sas_url: self.capture_sas_url,
            comment: comment.to_owned(),
            timestamp: self.timestamp,
            created_at: now,
            last_updated: None,
            is_confirmed: false,
        })
    }
}

/// Partial edit of an existing advice; `None` leaves a field untouched.
///
/// `lastUpdated` moves only when the capture is replaced.
#[derive(Clone, Debug, Default)]
pub struct AdvicePatch {
    pub phase: Option<SwingPhase>,
    pub comment: Option<String>,
    pub timestamp: Option<f64>,
    pub capture: Option<MediaRef>,
    pub capture_sas_url: Option<String>,
}

impl AdvicePatch {
    pub(crate) fn apply(self, advice: &mut Advice, now: DateTime<Utc>) -> FramemarkResult<()> {
        let comment = match self.comment {
            Some(c) if c.trim().is_empty() => {
                return Err(FramemarkError::validation("advice comment is empty"));
            }
            Some(c) => Some(c.trim().to_owned()),
            None => None,
        };
        if let Some(ts) = self.timestamp
            && (!ts.is_finite() || ts < 0.0)
        {
            return Err(FramemarkError::validation(format!(
                "advice timestamp must be a non-negative number of seconds (got {ts})"
            )));
        }

        if let Some(phase) = self.phase {
            advice.phase = phase.label().to_owned();
            advice.phase_code = phase;
        }
        if let Some(comment) = comment {
            advice.comment = comment;
        }
        if let Some(ts) = self.timestamp {
            advice.timestamp = ts;
        }
        if let Some(capture) = self.capture {
            advice.capture_url = capture.to_string();
            advice.capture_sas_url = self.capture_sas_url;
            advice.last_updated = Some(now);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/advice/model.rs"]
mod tests;
