//! One annotation pass over a captured frame, from opening the surface to publishing the result.

use crate::canvas::engine::AnnotationCanvas;
use crate::canvas::history::DrawHistory;
use crate::composite::compositor::Compositor;
use crate::flow::coordinator::FlowCoordinator;
use crate::foundation::core::SurfaceSize;
use crate::foundation::error::{FramemarkError, FramemarkResult};
use crate::media::naming::{derive_derivative_name, derive_original_reference, is_derivative};
use crate::media::reference::MediaRef;
use crate::publish::publisher::{ArtifactPublisher, PublishOutcome};
use crate::shape::surface::DrawSurface;

/// Unannotated source to draw on when opening `shown`.
///
/// Re-marking a derivative starts from its original, so markings never stack:
/// 1. a persisted derivative maps to its name with the marker stripped;
/// 2. otherwise the remembered original wins when there is one, stripped of the marker if it
///    carries it;
/// 3. otherwise a persisted non-derivative is its own original.
pub fn lookup_original(
    shown: &MediaRef,
    remembered: Option<&MediaRef>,
) -> FramemarkResult<MediaRef> {
    if let MediaRef::Persisted(path) = shown
        && let Some(original) = derive_original_reference(path)
    {
        return Ok(MediaRef::Persisted(original));
    }
    if let Some(original) = remembered {
        return Ok(match original {
            MediaRef::Persisted(path) => derive_original_reference(path)
                .map(MediaRef::Persisted)
                .unwrap_or_else(|| original.clone()),
            MediaRef::Volatile(_) => original.clone(),
        });
    }
    match shown {
        MediaRef::Persisted(path) if !is_derivative(path) => Ok(shown.clone()),
        _ => Err(FramemarkError::original_unavailable(format!(
            "no original recorded for {shown}"
        ))),
    }
}

/// Result of [`MarkupSession::save`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveOutcome {
    pub original: MediaRef,
    pub name: String,
    pub published: PublishOutcome,
    /// Whether a pending authoring flow now points at the new derivative.
    pub attached_to_flow: bool,
}

pub struct MarkupSession<S: DrawSurface> {
    canvas: AnnotationCanvas<S>,
    original: MediaRef,
    display: SurfaceSize,
}

impl<S: DrawSurface> MarkupSession<S> {
    /// Start annotating the frame currently shown as `shown`.
    pub fn open(
        shown: &MediaRef,
        remembered_original: Option<&MediaRef>,
        surface: S,
        line_width: f64,
    ) -> FramemarkResult<Self> {
        let display = surface.size().ensure_non_empty("display surface")?;
        let original = lookup_original(shown, remembered_original)?;
        tracing::debug!(%shown, %original, "markup session opened");
        Ok(Self {
            canvas: AnnotationCanvas::new(surface, line_width),
            original,
            display,
        })
    }

    pub fn original(&self) -> &MediaRef {
        &self.original
    }

    pub fn canvas(&self) -> &AnnotationCanvas<S> {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut AnnotationCanvas<S> {
        &mut self.canvas
    }

    pub fn history(&self) -> &DrawHistory {
        self.canvas.history()
    }

    /// Composite, publish, and hand the derivative to the pending flow.
    ///
    /// Compositing failures abort before anything is published.
    #[tracing::instrument(skip_all, fields(original = %self.original))]
    pub fn save(
        &self,
        compositor: &Compositor,
        publisher: &ArtifactPublisher,
        flow: &FlowCoordinator,
    ) -> FramemarkResult<SaveOutcome> {
        if self.history().is_empty() {
            return Err(FramemarkError::validation("nothing has been drawn"));
        }
        let encoded = compositor.compose_native(&self.original, self.history(), self.display)?;
        let name = derive_derivative_name(self.original.as_str());
        let published = publisher.publish(&encoded, &name, &self.original);

        let attached = flow.attach_markup(published.reference.clone(), None, &self.original);
        let attached_to_flow = match attached {
            Ok(_) => true,
            Err(FramemarkError::NotFound(_)) => false,
            Err(e) => {
                tracing::warn!(error = %e, "derivative not attached to the pending flow");
                false
            }
        };

        Ok(SaveOutcome {
            original: self.original.clone(),
            name,
            published,
            attached_to_flow,
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
