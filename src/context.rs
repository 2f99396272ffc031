use std::sync::Arc;

use crate::advice::manager::AdviceManager;
use crate::composite::compositor::{ComposeOptions, Compositor};
use crate::flow::coordinator::FlowCoordinator;
use crate::foundation::config::Settings;
use crate::foundation::error::FramemarkResult;
use crate::media::resolver::{HttpMediaResolver, MediaResolver, MemoryMediaResolver};
use crate::publish::publisher::ArtifactPublisher;
use crate::store::http::HttpApi;
use crate::store::local::{FileStore, LocalStore, MemoryStore};
use crate::store::remote::{
    AdviceStore, HttpAdviceStore, HttpObjectStore, MemoryAdviceStore, MemoryObjectStore,
    ObjectStore,
};

/// Process-wide collaborators, built once and handed to whichever component needs them.
#[derive(Clone)]
pub struct AppContext {
    pub settings: Settings,
    pub local: Arc<dyn LocalStore>,
    pub resolver: Arc<dyn MediaResolver>,
    pub advice_store: Arc<dyn AdviceStore>,
    pub objects: Arc<dyn ObjectStore>,
}

impl AppContext {
    /// HTTP-backed stores against `settings.api_base_url`, file store under `settings.data_dir`.
    pub fn from_settings(settings: Settings) -> FramemarkResult<Self> {
        settings.validate()?;
        let local: Arc<dyn LocalStore> = Arc::new(
            FileStore::open(&settings.data_dir)?.with_quota(settings.store_quota_bytes),
        );
        let api = HttpApi::new(&settings.api_base_url, settings.http_timeout())?;
        tracing::debug!(api = api.base_url(), data_dir = %settings.data_dir.display(), "context ready");
        Ok(Self {
            resolver: Arc::new(HttpMediaResolver::new(api.clone(), local.clone())),
            advice_store: Arc::new(HttpAdviceStore::new(api.clone())),
            objects: Arc::new(HttpObjectStore::new(api)),
            local,
            settings,
        })
    }

    /// Everything in memory; media is looked up in `resolver`.
    pub fn in_memory(settings: Settings, resolver: MemoryMediaResolver) -> Self {
        let local: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        Self {
            resolver: Arc::new(resolver.with_local_store(local.clone())),
            advice_store: Arc::new(MemoryAdviceStore::new()),
            objects: Arc::new(MemoryObjectStore::new()),
            local,
            settings,
        }
    }

    pub fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            stroke_width: self.settings.native_stroke_width,
            jpeg_quality: self.settings.jpeg_quality,
        }
    }

    pub fn compositor(&self) -> Compositor {
        Compositor::new(self.resolver.clone(), self.compose_options())
    }

    pub fn publisher(&self) -> ArtifactPublisher {
        ArtifactPublisher::new(self.objects.clone(), self.local.clone())
    }

    pub fn flow(&self) -> FlowCoordinator {
        FlowCoordinator::new(self.local.clone(), self.resolver.clone())
    }

    pub fn advice(&self, video_id: &str) -> AdviceManager {
        AdviceManager::new(video_id, self.advice_store.clone(), self.local.clone())
    }
}
