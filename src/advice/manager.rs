//! Advice lifecycle for one video over a whole-collection remote store.
//!
//! Every mutation reads the full list, edits it, writes it back remotely and always refreshes a
//! local mirror. A failed remote write marks the mirror `pendingSync`; until a later remote write
//! succeeds the mirror is the base for reads and edits, and is pushed wholesale on the next
//! successful contact.

use std::sync::Arc;

use chrono::Utc;

use crate::advice::model::{Advice, AdviceId, AdvicePatch, NewAdvice};
use crate::advice::status::VideoStatus;
use crate::foundation::error::{FramemarkError, FramemarkResult};
use crate::media::reference::MediaRef;
use crate::media::resolver::{MediaResolver, ResolveOpts};
use crate::store::local::{LocalStore, read_json, write_json};
use crate::store::remote::AdviceStore;

/// Where the last write landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Persistence {
    Remote,
    /// Remote store unreachable; the local mirror holds the change until the next sync.
    LocalOnly,
}

/// Result of a mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct Saved<T> {
    pub value: T,
    pub persistence: Persistence,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LocalMirror {
    pub(crate) advices: Vec<Advice>,
    #[serde(default)]
    pub(crate) pending_sync: bool,
}

/// Older mirrors are a bare array.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum StoredMirror {
    Current(LocalMirror),
    Legacy(Vec<Advice>),
}

pub fn mirror_key(video_id: &str) -> String {
    format!("advices_{video_id}")
}

pub struct AdviceManager {
    video_id: String,
    remote: Arc<dyn AdviceStore>,
    local: Arc<dyn LocalStore>,
}

impl AdviceManager {
    pub fn new(
        video_id: impl Into<String>,
        remote: Arc<dyn AdviceStore>,
        local: Arc<dyn LocalStore>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            remote,
            local,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Current advice list, remote first, local mirror when the remote is unreachable.
    #[tracing::instrument(skip(self), fields(video = %self.video_id))]
    pub fn list(&self) -> FramemarkResult<Vec<Advice>> {
        Ok(self.load_base())
    }

    #[tracing::instrument(skip(self, draft), fields(video = %self.video_id))]
    pub fn create(&self, draft: NewAdvice) -> FramemarkResult<Saved<Advice>> {
        let advice = draft.into_advice(Utc::now())?;
        let mut advices = self.load_base();
        advices.push(advice.clone());
        let persistence = self.commit(&advices)?;
        tracing::info!(id = %advice.id, ?persistence, "advice created");
        Ok(Saved {
            value: advice,
            persistence,
        })
    }

    pub fn update(&self, id: &AdviceId, patch: AdvicePatch) -> FramemarkResult<Saved<Advice>> {
        self.modify(id, |advice| patch.apply(advice, Utc::now()))
    }

    /// Mark an advice as reviewed.
    pub fn confirm(&self, id: &AdviceId) -> FramemarkResult<Saved<Advice>> {
        self.modify(id, |advice| {
            advice.is_confirmed = true;
            Ok(())
        })
    }

    /// Point an existing advice at a re-marked frame.
    pub fn apply_remarkup(
        &self,
        id: &AdviceId,
        reference: &MediaRef,
        sas_url: Option<String>,
    ) -> FramemarkResult<Saved<Advice>> {
        self.modify(id, |advice| {
            advice.capture_url = reference.to_string();
            advice.capture_sas_url = sas_url;
            advice.last_updated = Some(Utc::now());
            Ok(())
        })
    }

    pub fn delete(&self, id: &AdviceId) -> FramemarkResult<Saved<Advice>> {
        let mut advices = self.load_base();
        let idx = advices
            .iter()
            .position(|a| &a.id == id)
            .ok_or_else(|| FramemarkError::not_found(format!("advice {id}")))?;
        let removed = advices.remove(idx);
        let persistence = self.commit(&advices)?;
        tracing::info!(%id, ?persistence, "advice deleted");
        Ok(Saved {
            value: removed,
            persistence,
        })
    }

    pub fn status(&self, has_section_group: bool) -> FramemarkResult<VideoStatus> {
        Ok(VideoStatus::derive(&self.list()?, has_section_group))
    }

    /// Re-resolve every capture to a fresh display URL. Nothing is written back.
    pub fn refresh_capture_urls(&self, resolver: &dyn MediaResolver) -> FramemarkResult<Vec<Advice>> {
        let mut advices = self.list()?;
        for advice in &mut advices {
            let resolved = advice
                .capture_ref()
                .and_then(|r| resolver.resolve(&r, ResolveOpts::default()));
            match resolved {
                Ok(url) => advice.capture_sas_url = Some(url.url),
                Err(e) => tracing::warn!(id = %advice.id, error = %e, "capture url not refreshed"),
            }
        }
        Ok(advices)
    }

    fn modify(
        &self,
        id: &AdviceId,
        edit: impl FnOnce(&mut Advice) -> FramemarkResult<()>,
    ) -> FramemarkResult<Saved<Advice>> {
        let mut advices = self.load_base();
        let advice = advices
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| FramemarkError::not_found(format!("advice {id}")))?;
        edit(advice)?;
        let updated = advice.clone();
        let persistence = self.commit(&advices)?;
        tracing::debug!(%id, ?persistence, "advice updated");
        Ok(Saved {
            value: updated,
            persistence,
        })
    }

    /// The list mutations start from.
    fn load_base(&self) -> Vec<Advice> {
        let mirror = self.read_mirror();

        if let Some(mirror) = mirror.as_ref().filter(|m| m.pending_sync) {
            return match self.remote.put_all(&self.video_id, &mirror.advices) {
                Ok(()) => {
                    tracing::info!(count = mirror.advices.len(), "pending advice synced");
                    self.write_mirror(&mirror.advices, false);
                    mirror.advices.clone()
                }
                Err(e) => {
                    tracing::debug!(error = %e, "still offline, using local mirror");
                    mirror.advices.clone()
                }
            };
        }

        match self.remote.get_all(&self.video_id) {
            Ok(advices) => {
                self.write_mirror(&advices, false);
                advices
            }
            Err(e) => {
                tracing::warn!(error = %e, "advice store unreachable, using local mirror");
                mirror.map(|m| m.advices).unwrap_or_default()
            }
        }
    }

    fn commit(&self, advices: &[Advice]) -> FramemarkResult<Persistence> {
        let persistence = match self.remote.put_all(&self.video_id, advices) {
            Ok(()) => Persistence::Remote,
            Err(e) => {
                tracing::warn!(error = %e, "advice saved locally only");
                Persistence::LocalOnly
            }
        };
        let mirrored = self.write_mirror(advices, persistence == Persistence::LocalOnly);
        if persistence == Persistence::LocalOnly && !mirrored {
            return Err(FramemarkError::local(format!(
                "advice for {} could not be saved remotely or locally",
                self.video_id
            )));
        }
        Ok(persistence)
    }

    fn read_mirror(&self) -> Option<LocalMirror> {
        match read_json::<StoredMirror>(self.local.as_ref(), &mirror_key(&self.video_id)) {
            Ok(Some(StoredMirror::Current(m))) => Some(m),
            Ok(Some(StoredMirror::Legacy(advices))) => Some(LocalMirror {
                advices,
                pending_sync: false,
            }),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable advice mirror");
                None
            }
        }
    }

    fn write_mirror(&self, advices: &[Advice], pending_sync: bool) -> bool {
        let mirror = LocalMirror {
            advices: advices.to_vec(),
            pending_sync,
        };
        match write_json(self.local.as_ref(), &mirror_key(&self.video_id), &mirror) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "advice mirror not written");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/advice/manager.rs"]
mod tests;
