use std::sync::Arc;

use crate::flow::state::{CaptureResult, FlowSlot, FlowState, ReturnDestination, SlotRecord};
use crate::foundation::error::{FramemarkError, FramemarkResult};
use crate::media::naming::is_derivative_ref;
use crate::media::reference::MediaRef;
use crate::media::resolver::{MediaResolver, ResolveOpts, ResolvedUrl, resolve_volatile};
use crate::store::local::{LocalStore, read_json, write_json};

/// Well-known local store key of the flow slot.
pub const FLOW_SLOT_KEY: &str = "advice_flow_state";

/// A flow restored on return from the annotation surface.
#[derive(Clone, Debug, PartialEq)]
pub struct ResumedFlow {
    pub destination: ReturnDestination,
    pub state: FlowState,
    /// Loadable URL for the captured frame; `None` if it could not be resolved.
    pub resolved_capture: Option<ResolvedUrl>,
}

/// Persists an authoring session across navigation to the annotation surface and back.
pub struct FlowCoordinator {
    local: Arc<dyn LocalStore>,
    resolver: Arc<dyn MediaResolver>,
}

impl FlowCoordinator {
    pub fn new(local: Arc<dyn LocalStore>, resolver: Arc<dyn MediaResolver>) -> Self {
        Self { local, resolver }
    }

    /// Store the draft and where to come back to, replacing any earlier pending flow.
    pub fn begin_annotation(
        &self,
        state: FlowState,
        destination: ReturnDestination,
    ) -> FramemarkResult<()> {
        tracing::debug!(page = %destination.page, "flow started");
        self.write(&SlotRecord::Pending(FlowSlot { destination, state }))
    }

    /// Point the pending draft at a freshly published derivative of `original`.
    ///
    /// `original` becomes `originalImageUrl` unless a non-derivative original was already
    /// recorded.
    pub fn attach_markup(
        &self,
        reference: MediaRef,
        sas_url: Option<String>,
        original: &MediaRef,
    ) -> FramemarkResult<FlowSlot> {
        let mut slot = self
            .peek()?
            .ok_or_else(|| FramemarkError::not_found("no pending annotation flow"))?;

        let keep = slot
            .state
            .original_image_url
            .as_ref()
            .is_some_and(|recorded| !is_derivative_ref(recorded));
        if !keep {
            slot.state.original_image_url = Some(original.clone());
        }
        slot.state.capture_result = Some(CaptureResult {
            url: reference,
            sas_url,
        });
        self.write(&SlotRecord::Pending(slot.clone()))?;
        Ok(slot)
    }

    /// Pending slot without consuming it.
    pub fn peek(&self) -> FramemarkResult<Option<FlowSlot>> {
        match read_json::<SlotRecord>(self.local.as_ref(), FLOW_SLOT_KEY)? {
            Some(SlotRecord::Pending(slot)) => Ok(Some(slot)),
            Some(SlotRecord::Consumed) | None => Ok(None),
        }
    }

    /// Take the pending flow, if any, and clear the slot so it resumes at most once.
    #[tracing::instrument(skip(self))]
    pub fn resume_if_pending(&self) -> FramemarkResult<Option<ResumedFlow>> {
        let slot = match self.peek() {
            Ok(Some(slot)) => slot,
            Ok(None) => return Ok(None),
            Err(FramemarkError::Serde(msg)) => {
                tracing::warn!(error = %msg, "discarding unreadable flow slot");
                self.clear_slot();
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        self.clear_slot();

        let resolved_capture = slot
            .state
            .capture_result
            .as_ref()
            .and_then(|capture| match self.resolve_capture(&capture.url) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(capture = %capture.url, error = %e, "capture did not resolve");
                    None
                }
            });

        tracing::info!(page = %slot.destination.page, "flow resumed");
        Ok(Some(ResumedFlow {
            destination: slot.destination,
            state: slot.state,
            resolved_capture,
        }))
    }

    /// Drop any pending flow.
    pub fn abandon(&self) {
        self.clear_slot();
    }

    fn resolve_capture(&self, capture: &MediaRef) -> FramemarkResult<ResolvedUrl> {
        match capture {
            MediaRef::Volatile(name) => resolve_volatile(self.local.as_ref(), name),
            MediaRef::Persisted(_) => self
                .resolver
                .resolve(capture, ResolveOpts::default().busted()),
        }
    }

    fn write(&self, record: &SlotRecord) -> FramemarkResult<()> {
        write_json(self.local.as_ref(), FLOW_SLOT_KEY, record)
    }

    /// Remove the slot; when removal fails, overwrite it with a tombstone instead.
    fn clear_slot(&self) {
        let Err(remove_err) = self.local.remove(FLOW_SLOT_KEY) else {
            return;
        };
        tracing::warn!(error = %remove_err, "flow slot removal failed, writing tombstone");
        if let Err(e) = self.write(&SlotRecord::Consumed) {
            tracing::error!(error = %e, "flow slot could not be cleared");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/flow/coordinator.rs"]
mod tests;
