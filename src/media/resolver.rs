//! Turning media references into loadable URLs and bytes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;

use crate::composite::codec::decode_data_url;
use crate::foundation::error::{FramemarkError, FramemarkResult};
use crate::media::reference::MediaRef;
use crate::store::artifact::load_artifact;
use crate::store::http::HttpApi;
use crate::store::local::LocalStore;

/// How the caller intends to load the media.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Access {
    /// Display only: a signed direct URL is fine.
    #[default]
    Direct,
    /// Pixels will be read back (compositing): the URL must be same-origin safe.
    SameOrigin,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveOpts {
    /// Append `t=<unix millis>` so caches cannot serve a stale image.
    pub bust: bool,
    pub access: Access,
}

impl ResolveOpts {
    pub fn same_origin() -> Self {
        Self {
            bust: false,
            access: Access::SameOrigin,
        }
    }

    pub fn busted(self) -> Self {
        Self { bust: true, ..self }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UrlKind {
    /// Points at a foreign origin; pixels cannot be read back.
    Direct,
    /// Served from the application's own origin (proxy or local file).
    SameOrigin,
    /// `data:` URL carrying the bytes.
    Inline,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub url: String,
    pub kind: UrlKind,
}

impl ResolvedUrl {
    pub fn new(url: impl Into<String>, kind: UrlKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    pub fn is_same_origin_safe(&self) -> bool {
        self.kind != UrlKind::Direct
    }
}

/// Media access seam shared by the compositor, the flow coordinator and the advice manager.
pub trait MediaResolver: Send + Sync {
    fn resolve(&self, media: &MediaRef, opts: ResolveOpts) -> FramemarkResult<ResolvedUrl>;
    fn fetch(&self, url: &ResolvedUrl) -> FramemarkResult<Vec<u8>>;
}

/// Volatile references resolve to the inline image kept by the publisher's local fallback.
pub fn resolve_volatile(store: &dyn LocalStore, name: &str) -> FramemarkResult<ResolvedUrl> {
    let artifact = load_artifact(store, name)?.ok_or_else(|| {
        FramemarkError::resolution(format!("volatile media '{name}' is not in the local store"))
    })?;
    Ok(ResolvedUrl::new(artifact.image_data, UrlKind::Inline))
}

fn fetch_inline(url: &ResolvedUrl) -> FramemarkResult<Vec<u8>> {
    decode_data_url(&url.url)
        .map(|(_, bytes)| bytes)
        .map_err(|e| FramemarkError::resolution(format!("inline media: {e}")))
}

pub(crate) fn with_cache_bust(url: &str) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}t={}", chrono::Utc::now().timestamp_millis())
}

fn is_absolute_http(s: &str) -> bool {
    s.starts_with("https://") || s.starts_with("http://")
}

fn strip_query(s: &str) -> &str {
    s.split(['?', '#']).next().unwrap_or(s)
}

#[derive(serde::Deserialize)]
struct SignedUrl {
    url: String,
}

/// Resolver backed by the API server: `/media-url` for signed links, `/proxy-file` for
/// same-origin loads.
pub struct HttpMediaResolver {
    api: HttpApi,
    local: Arc<dyn LocalStore>,
}

impl HttpMediaResolver {
    pub fn new(api: HttpApi, local: Arc<dyn LocalStore>) -> Self {
        Self { api, local }
    }

    /// `/proxy-file/{urlencoded}` for a foreign URL; the proxy re-signs, so the query is dropped.
    pub fn proxy_url(&self, path: &str) -> String {
        self.api.url(&format!(
            "/proxy-file/{}",
            urlencoding::encode(strip_query(path))
        ))
    }

    fn signed_url(&self, blob_url: &str) -> FramemarkResult<String> {
        let endpoint = self.api.url("/media-url");
        let blob_url = strip_query(blob_url);
        let signed: SignedUrl = self
            .api
            .send_json("media-url", |c| c.get(&endpoint).query(&[("blob_url", blob_url)]))?;
        Ok(signed.url)
    }
}

impl MediaResolver for HttpMediaResolver {
    #[tracing::instrument(skip(self), fields(media = %media))]
    fn resolve(&self, media: &MediaRef, opts: ResolveOpts) -> FramemarkResult<ResolvedUrl> {
        let path = match media {
            MediaRef::Volatile(name) => return resolve_volatile(self.local.as_ref(), name),
            MediaRef::Persisted(path) if path.starts_with("data:") => {
                return Ok(ResolvedUrl::new(path.clone(), UrlKind::Inline));
            }
            MediaRef::Persisted(path) => path,
        };

        let resolved = if !is_absolute_http(path) || self.api.is_same_origin(path) {
            let url = if is_absolute_http(path) {
                path.clone()
            } else {
                self.api.url(path)
            };
            ResolvedUrl::new(url, UrlKind::SameOrigin)
        } else {
            match opts.access {
                Access::SameOrigin => ResolvedUrl::new(self.proxy_url(path), UrlKind::SameOrigin),
                Access::Direct => match self.signed_url(path) {
                    Ok(url) => ResolvedUrl::new(url, UrlKind::Direct),
                    Err(e) => {
                        tracing::warn!(error = %e, "signing failed, using the stored URL");
                        ResolvedUrl::new(path.clone(), UrlKind::Direct)
                    }
                },
            }
        };

        Ok(if opts.bust {
            ResolvedUrl::new(with_cache_bust(&resolved.url), resolved.kind)
        } else {
            resolved
        })
    }

    fn fetch(&self, url: &ResolvedUrl) -> FramemarkResult<Vec<u8>> {
        if url.kind == UrlKind::Inline {
            return fetch_inline(url);
        }
        let response = self
            .api
            .send("fetch media", |c| c.get(&url.url))
            .map_err(|e| FramemarkError::resolution(e.to_string()))?;
        let bytes = response
            .bytes()
            .map_err(|e| FramemarkError::resolution(format!("read media body: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// Resolver over a local directory; relative references are joined to `root`.
pub struct FsMediaResolver {
    root: PathBuf,
    local: Option<Arc<dyn LocalStore>>,
}

impl FsMediaResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            local: None,
        }
    }

    pub fn with_local_store(mut self, local: Arc<dyn LocalStore>) -> Self {
        self.local = Some(local);
        self
    }

    fn path_for(&self, reference: &str) -> PathBuf {
        let p = Path::new(reference.strip_prefix("file://").unwrap_or(reference));
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }
}

impl MediaResolver for FsMediaResolver {
    fn resolve(&self, media: &MediaRef, _opts: ResolveOpts) -> FramemarkResult<ResolvedUrl> {
        match media {
            MediaRef::Volatile(name) => {
                let local = self.local.as_deref().ok_or_else(|| {
                    FramemarkError::resolution(format!(
                        "volatile media '{name}' needs a local store"
                    ))
                })?;
                resolve_volatile(local, name)
            }
            MediaRef::Persisted(path) if path.starts_with("data:") => {
                Ok(ResolvedUrl::new(path.clone(), UrlKind::Inline))
            }
            MediaRef::Persisted(path) if is_absolute_http(path) => Err(FramemarkError::resolution(
                format!("'{path}' is not a local file"),
            )),
            MediaRef::Persisted(path) => Ok(ResolvedUrl::new(
                self.path_for(path).display().to_string(),
                UrlKind::SameOrigin,
            )),
        }
    }

    fn fetch(&self, url: &ResolvedUrl) -> FramemarkResult<Vec<u8>> {
        if url.kind == UrlKind::Inline {
            return fetch_inline(url);
        }
        std::fs::read(&url.url)
            .with_context(|| format!("read {}", url.url))
            .map_err(|e| FramemarkError::resolution(format!("{e:#}")))
    }
}

/// In-memory resolver. Entries added with [`MemoryMediaResolver::insert_foreign`] can only be
/// linked directly, as media on an origin without a proxy would be.
#[derive(Default)]
pub struct MemoryMediaResolver {
    objects: Mutex<HashMap<String, (Vec<u8>, UrlKind)>>,
    local: Option<Arc<dyn LocalStore>>,
}

impl MemoryMediaResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local_store(mut self, local: Arc<dyn LocalStore>) -> Self {
        self.local = Some(local);
        self
    }

    pub fn insert(&self, path: impl Into<String>, bytes: Vec<u8>) {
        self.put(path.into(), bytes, UrlKind::SameOrigin);
    }

    pub fn insert_foreign(&self, path: impl Into<String>, bytes: Vec<u8>) {
        self.put(path.into(), bytes, UrlKind::Direct);
    }

    fn put(&self, path: String, bytes: Vec<u8>, kind: UrlKind) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(path, (bytes, kind));
        }
    }

    fn lookup(&self, path: &str) -> FramemarkResult<(Vec<u8>, UrlKind)> {
        self.objects
            .lock()
            .map_err(|_| FramemarkError::resolution("resolver lock poisoned"))?
            .get(strip_query(path))
            .cloned()
            .ok_or_else(|| FramemarkError::resolution(format!("no media at '{path}'")))
    }
}

impl MediaResolver for MemoryMediaResolver {
    fn resolve(&self, media: &MediaRef, opts: ResolveOpts) -> FramemarkResult<ResolvedUrl> {
        let path = match media {
            MediaRef::Volatile(name) => {
                let local = self.local.as_deref().ok_or_else(|| {
                    FramemarkError::resolution(format!(
                        "volatile media '{name}' needs a local store"
                    ))
                })?;
                return resolve_volatile(local, name);
            }
            MediaRef::Persisted(path) => path,
        };
        let (_, kind) = self.lookup(path)?;
        let url = if opts.bust {
            with_cache_bust(path)
        } else {
            path.clone()
        };
        Ok(ResolvedUrl::new(url, kind))
    }

    fn fetch(&self, url: &ResolvedUrl) -> FramemarkResult<Vec<u8>> {
        if url.kind == UrlKind::Inline {
            return fetch_inline(url);
        }
        self.lookup(&url.url).map(|(bytes, _)| bytes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/resolver.rs"]
mod tests;
