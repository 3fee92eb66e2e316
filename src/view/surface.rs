//! Display surface
//!
//! The video element the panel draws into. It shows either a live stream or
//! a recorded artifact, never both.

use crate::capture::LiveStream;
use crate::recorder::state::RecordedArtifact;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the surface is currently bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceSource {
    /// Live camera/microphone stream
    #[serde(rename_all = "camelCase")]
    Live { stream_id: Uuid },
    /// Playable recorded artifact
    #[serde(rename_all = "camelCase")]
    Artifact {
        artifact_id: Uuid,
        mime_type: String,
        size_bytes: usize,
    },
}

/// Rendering target owned by the UI toolkit
pub trait DisplaySurface: Send + Sync {
    /// Detach whatever is bound
    fn clear_source(&self);

    fn bind_live_stream(&self, stream: &LiveStream);

    fn bind_artifact(&self, artifact: &RecordedArtifact);

    fn play(&self);
}

#[derive(Debug, Default)]
struct SurfaceInner {
    source: Option<SurfaceSource>,
    playing: bool,
    bind_count: usize,
    /// Binds made while another source was still attached
    overwrite_count: usize,
}

/// In-memory surface used by the CLI demo and tests
#[derive(Debug, Default)]
pub struct PreviewSurface {
    inner: Mutex<SurfaceInner>,
}

impl PreviewSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> Option<SurfaceSource> {
        self.inner.lock().source.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.lock().playing
    }

    pub fn bind_count(&self) -> usize {
        self.inner.lock().bind_count
    }

    /// Number of binds that replaced a source without clearing it first
    pub fn overwrite_count(&self) -> usize {
        self.inner.lock().overwrite_count
    }

    fn bind(&self, source: SurfaceSource) {
        let mut inner = self.inner.lock();
        if inner.source.is_some() {
            tracing::warn!("Surface source replaced without being cleared");
            inner.overwrite_count += 1;
        }
        inner.source = Some(source);
        inner.playing = false;
        inner.bind_count += 1;
    }
}

impl DisplaySurface for PreviewSurface {
    fn clear_source(&self) {
        let mut inner = self.inner.lock();
        inner.source = None;
        inner.playing = false;
    }

    fn bind_live_stream(&self, stream: &LiveStream) {
        tracing::debug!("Binding live stream {}", stream.id);
        self.bind(SurfaceSource::Live {
            stream_id: stream.id,
        });
    }

    fn bind_artifact(&self, artifact: &RecordedArtifact) {
        tracing::debug!(
            "Binding artifact {} ({} bytes)",
            artifact.id,
            artifact.size_bytes()
        );
        self.bind(SurfaceSource::Artifact {
            artifact_id: artifact.id,
            mime_type: artifact.mime_type.clone(),
            size_bytes: artifact.size_bytes(),
        });
    }

    fn play(&self) {
        let mut inner = self.inner.lock();
        if inner.source.is_some() {
            inner.playing = true;
        }
    }
}
