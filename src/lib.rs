//! Framemark annotates still frames from swing videos and versions the results.
//!
//! A reviewer draws circles, lines and three-point polylines over a captured frame. The overlay
//! is burned into the frame at native resolution and published as a `_Mark` derivative, which is
//! attached to a timestamped piece of advice on the video:
//!
//! - Capture shapes with an [`AnnotationCanvas`] (or a [`MarkupSession`] around one)
//! - Composite with a [`Compositor`] and publish through an [`ArtifactPublisher`]
//! - Carry the authoring draft across the round trip with a [`FlowCoordinator`]
//! - Keep the advice list with an [`AdviceManager`]
//!
//! Remote stores are optional at runtime: every write falls back to a local durable store.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod advice;
pub(crate) mod canvas;
pub(crate) mod composite;
pub(crate) mod context;
pub(crate) mod flow;
pub(crate) mod media;
pub(crate) mod publish;
pub(crate) mod render;
pub(crate) mod session;
pub(crate) mod shape;
pub(crate) mod store;

pub use crate::foundation::config::Settings;
pub use crate::foundation::core::{Affine, BezPath, Point, Rect, SurfaceSize, Vec2};
pub use crate::foundation::error::{FramemarkError, FramemarkResult};

pub use crate::advice::manager::{AdviceManager, Persistence, Saved, mirror_key};
pub use crate::advice::model::{Advice, AdviceId, AdvicePatch, NewAdvice, SwingPhase};
pub use crate::advice::status::VideoStatus;
pub use crate::canvas::engine::{AnnotationCanvas, TapOutcome, Tool};
pub use crate::canvas::history::DrawHistory;
pub use crate::composite::codec::{
    EncodedImage, JPEG_MIME, PreparedImage, decode_data_url, decode_image, encode_jpeg,
};
pub use crate::composite::compositor::{ComposeOptions, Compositor};
pub use crate::context::AppContext;
pub use crate::flow::coordinator::{FLOW_SLOT_KEY, FlowCoordinator, ResumedFlow};
pub use crate::flow::state::{CaptureResult, FlowSlot, FlowState, ReturnDestination};
pub use crate::media::naming::{
    DEFAULT_EXT, MARK_SUFFIX, derive_derivative_name, derive_derivative_reference,
    derive_original_name, derive_original_reference, is_derivative, is_derivative_ref,
};
pub use crate::media::reference::{MediaRef, VOLATILE_PREFIX};
pub use crate::media::resolver::{
    Access, FsMediaResolver, HttpMediaResolver, MediaResolver, MemoryMediaResolver, ResolveOpts,
    ResolvedUrl, UrlKind, resolve_volatile,
};
pub use crate::publish::publisher::{ArtifactPublisher, PublishOutcome, Stored};
pub use crate::render::cpu::FrameRGBA;
pub use crate::session::{MarkupSession, SaveOutcome, lookup_original};
pub use crate::shape::model::{Shape, ShapeColor};
pub use crate::shape::surface::{
    DrawSurface, OverlaySurface, RecordingSurface, StrokeStyle, SurfaceCall,
};
pub use crate::store::artifact::{LocalArtifact, artifact_key, load_artifact, save_artifact};
pub use crate::store::http::HttpApi;
pub use crate::store::local::{FileStore, LocalStore, MemoryStore, read_json, write_json};
pub use crate::store::remote::{
    AdviceStore, HttpAdviceStore, HttpObjectStore, MemoryAdviceStore, MemoryObjectStore,
    ObjectStore,
};
