//! Remote collaborators: the whole-collection advice store and the object store for composites.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::advice::model::Advice;
use crate::foundation::error::{FramemarkError, FramemarkResult};
use crate::media::reference::MediaRef;
use crate::store::http::HttpApi;

/// Per-video advice collection; every write replaces the whole list.
pub trait AdviceStore: Send + Sync {
    fn get_all(&self, video_id: &str) -> FramemarkResult<Vec<Advice>>;
    fn put_all(&self, video_id: &str, advices: &[Advice]) -> FramemarkResult<()>;
}

/// Durable blob storage for encoded composites.
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under exactly `name`; returns the persisted reference.
    fn upload(&self, name: &str, bytes: &[u8], original: &MediaRef) -> FramemarkResult<MediaRef>;
}

#[derive(serde::Deserialize)]
struct AdviceEnvelope {
    #[serde(default)]
    advices: Vec<Advice>,
}

/// `GET /get-advices/{video}` and `POST /save-advices/{video}`.
#[derive(Clone, Debug)]
pub struct HttpAdviceStore {
    api: HttpApi,
}

impl HttpAdviceStore {
    pub fn new(api: HttpApi) -> Self {
        Self { api }
    }
}

impl AdviceStore for HttpAdviceStore {
    #[tracing::instrument(skip(self))]
    fn get_all(&self, video_id: &str) -> FramemarkResult<Vec<Advice>> {
        let url = self
            .api
            .url(&format!("/get-advices/{}", urlencoding::encode(video_id)));
        let envelope: AdviceEnvelope = self.api.send_json("get-advices", |c| c.get(&url))?;
        Ok(envelope.advices)
    }

    #[tracing::instrument(skip(self, advices), fields(count = advices.len()))]
    fn put_all(&self, video_id: &str, advices: &[Advice]) -> FramemarkResult<()> {
        let url = self
            .api
            .url(&format!("/save-advices/{}", urlencoding::encode(video_id)));
        self.api
            .send("save-advices", |c| c.post(&url).json(advices))?;
        Ok(())
    }
}

#[derive(serde::Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    image_url: Option<String>,
}

/// `POST /upload-markup-image` with a base64 data URL form body.
#[derive(Clone, Debug)]
pub struct HttpObjectStore {
    api: HttpApi,
    mime: &'static str,
}

impl HttpObjectStore {
    pub fn new(api: HttpApi) -> Self {
        Self {
            api,
            mime: crate::composite::codec::JPEG_MIME,
        }
    }
}

impl ObjectStore for HttpObjectStore {
    #[tracing::instrument(skip(self, bytes, original), fields(len = bytes.len()))]
    fn upload(&self, name: &str, bytes: &[u8], original: &MediaRef) -> FramemarkResult<MediaRef> {
        use base64::Engine as _;

        let image_data = format!(
            "data:{};base64,{}",
            self.mime,
            base64::engine::general_purpose::STANDARD.encode(bytes)
        );
        let original_url = original.to_string();
        let url = self.api.url("/upload-markup-image");
        let response: UploadResponse = self.api.send_json("upload-markup-image", |c| {
            c.post(&url).form(&[
                ("image_data", image_data.as_str()),
                ("filename", name),
                ("original_url", original_url.as_str()),
            ])
        })?;

        match response.image_url {
            Some(image_url) if response.success && !image_url.is_empty() => {
                Ok(MediaRef::Persisted(image_url))
            }
            _ => Err(FramemarkError::remote(
                "upload-markup-image reported failure",
            )),
        }
    }
}

/// In-memory advice store that can be switched offline.
#[derive(Debug, Default)]
pub struct MemoryAdviceStore {
    videos: Mutex<HashMap<String, Vec<Advice>>>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryAdviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    /// Successful `put_all` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// What the store holds for `video_id`, bypassing the offline switch.
    pub fn snapshot(&self, video_id: &str) -> Vec<Advice> {
        self.videos
            .lock()
            .ok()
            .and_then(|v| v.get(video_id).cloned())
            .unwrap_or_default()
    }

    fn check_online(&self) -> FramemarkResult<()> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(FramemarkError::remote("advice store unreachable"));
        }
        Ok(())
    }
}

impl AdviceStore for MemoryAdviceStore {
    fn get_all(&self, video_id: &str) -> FramemarkResult<Vec<Advice>> {
        self.check_online()?;
        Ok(self.snapshot(video_id))
    }

    fn put_all(&self, video_id: &str, advices: &[Advice]) -> FramemarkResult<()> {
        self.check_online()?;
        self.videos
            .lock()
            .map_err(|_| FramemarkError::remote("advice store lock poisoned"))?
            .insert(video_id.to_owned(), advices.to_vec());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// In-memory object store that can be switched offline.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    offline: AtomicBool,
}

impl MemoryObjectStore {
    /// Prefix of every reference this store hands out.
    pub const PREFIX: &'static str = "memory://objects/";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok()?.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for MemoryObjectStore {
    fn upload(&self, name: &str, bytes: &[u8], _original: &MediaRef) -> FramemarkResult<MediaRef> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(FramemarkError::remote("object store unreachable"));
        }
        self.objects
            .lock()
            .map_err(|_| FramemarkError::remote("object store lock poisoned"))?
            .insert(name.to_owned(), bytes.to_vec());
        Ok(MediaRef::Persisted(format!("{}{name}", Self::PREFIX)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/remote.rs"]
mod tests;
