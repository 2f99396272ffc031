use crate::advice::model::Advice;

/// Review progress of a video, derived from its advice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    Pending,
    InProgress,
    Completed,
}

impl VideoStatus {
    /// `Completed` needs a commented advice and a section group; any advice at all is progress.
    pub fn derive(advices: &[Advice], has_section_group: bool) -> Self {
        if has_section_group && advices.iter().any(Advice::has_comment) {
            VideoStatus::Completed
        } else if !advices.is_empty() {
            VideoStatus::InProgress
        } else {
            VideoStatus::Pending
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VideoStatus::Pending => "pending",
            VideoStatus::InProgress => "in_progress",
            VideoStatus::Completed => "completed",
        }
    }
}
