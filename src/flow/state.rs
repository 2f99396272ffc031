use crate::advice::model::{AdviceId, SwingPhase};
use crate::media::reference::MediaRef;

/// Frame handed to the annotation surface, plus its display URL when known.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResult {
    pub url: MediaRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sas_url: Option<String>,
}

/// Snapshot of an in-progress advice draft taken before leaving for the annotation surface.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowState {
    pub selected_phase: Option<SwingPhase>,
    pub capture_result: Option<CaptureResult>,
    /// Unannotated frame; kept so a derivative can be re-marked from its source.
    pub original_image_url: Option<MediaRef>,
    /// Playback position in seconds.
    pub current_time: f64,
    pub comment: String,
    pub is_comment_completed: bool,
}

/// Page to return to once annotation finishes.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnDestination {
    pub page: String,
    /// Set when an existing advice is being re-marked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice_id: Option<AdviceId>,
}

impl ReturnDestination {
    pub fn page(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            advice_id: None,
        }
    }

    pub fn remarking(page: impl Into<String>, advice_id: AdviceId) -> Self {
        Self {
            page: page.into(),
            advice_id: Some(advice_id),
        }
    }
}

/// Marker and destination, stored as one value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlowSlot {
    pub destination: ReturnDestination,
    pub state: FlowState,
}

/// What the well-known slot key holds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum SlotRecord {
    Pending(FlowSlot),
    /// Written when a consumed slot could not be removed.
    Consumed,
}
