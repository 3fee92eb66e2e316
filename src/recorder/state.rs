//! Session state management
//!
//! Defines the preview/recording state machine and the options a recorder
//! is built from.

use crate::capture::DeviceDescriptor;
use crate::config::EncodingConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Current phase of the session
///
/// Previewing and recording are variants of one enum, so both can never be
/// active at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Nothing live
    Idle,
    /// Live stream shown for framing, nothing captured
    Previewing,
    /// Currently recording
    Recording,
}

impl Default for SessionPhase {
    fn default() -> Self {
        Self::Idle
    }
}

/// Video track constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    pub device_id: Option<String>,
    pub width: u32,
    pub height: u32,
}

/// Audio track constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConstraints {
    pub device_id: Option<String>,
}

/// Configuration handed to the recording library when building a recorder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderOptions {
    pub video: VideoConstraints,
    pub audio: AudioConstraints,
    pub mime_type: String,
    pub audio_bits_per_second: u32,
    pub video_bits_per_second: u32,
}

impl RecorderOptions {
    /// Combine the encoding settings with the current device selection
    pub fn new(
        encoding: &EncodingConfig,
        video_device_id: Option<&str>,
        audio_device_id: Option<&str>,
    ) -> Self {
        Self {
            video: VideoConstraints {
                device_id: video_device_id.map(str::to_string),
                width: encoding.width,
                height: encoding.height,
            },
            audio: AudioConstraints {
                device_id: audio_device_id.map(str::to_string),
            },
            mime_type: encoding.mime_type.clone(),
            audio_bits_per_second: encoding.audio_bits_per_second,
            video_bits_per_second: encoding.video_bits_per_second,
        }
    }
}

/// Media produced when a recording ends
#[derive(Debug, Clone)]
pub struct RecordedArtifact {
    pub id: Uuid,
    pub mime_type: String,
    /// Shared so state snapshots never copy the recording
    pub data: Arc<[u8]>,
    pub created_at: DateTime<Utc>,
    /// Elapsed seconds shown when the recording was stopped
    pub duration_seconds: u64,
}

impl RecordedArtifact {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, duration_seconds: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            mime_type: mime_type.into(),
            data: data.into(),
            created_at: Utc::now(),
            duration_seconds,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Everything the control panel reflects
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub phase: SessionPhase,

    /// Whole seconds since the current recording started
    pub elapsed_seconds: u64,

    /// Timer periods accumulated, in milliseconds
    pub elapsed_ms: u64,

    pub permissions_granted: bool,

    pub video_devices: Vec<DeviceDescriptor>,
    pub audio_devices: Vec<DeviceDescriptor>,

    pub selected_video_device: Option<String>,
    pub selected_audio_device: Option<String>,

    pub artifact: Option<RecordedArtifact>,

    /// Bumped for every recording; ticks from older sessions are ignored
    pub generation: u64,
}

impl SessionState {
    pub fn is_previewing(&self) -> bool {
        self.phase == SessionPhase::Previewing
    }

    pub fn is_recording(&self) -> bool {
        self.phase == SessionPhase::Recording
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_selection() {
        let encoding = EncodingConfig::default();
        let options = RecorderOptions::new(&encoding, Some("cam-1"), None);

        assert_eq!(options.video.device_id.as_deref(), Some("cam-1"));
        assert_eq!(options.video.width, 1280);
        assert_eq!(options.video.height, 720);
        assert!(options.audio.device_id.is_none());
        assert_eq!(options.mime_type, "video/webm");
        assert_eq!(options.audio_bits_per_second, 128_000);
        assert_eq!(options.video_bits_per_second, 2_500_000);
    }

    #[test]
    fn test_options_serialize_camel_case() {
        let options = RecorderOptions::new(&EncodingConfig::default(), Some("v"), Some("a"));
        let json = serde_json::to_value(&options).unwrap();

        assert_eq!(json["video"]["deviceId"], "v");
        assert_eq!(json["audio"]["deviceId"], "a");
        assert_eq!(json["mimeType"], "video/webm");
        assert_eq!(json["videoBitsPerSecond"], 2_500_000);
    }

    #[test]
    fn test_artifact_clone_shares_bytes() {
        let artifact = RecordedArtifact::new(vec![7; 1024], "video/webm", 1);
        let copy = artifact.clone();
        assert!(Arc::ptr_eq(&artifact.data, &copy.data));
        assert_eq!(copy.size_bytes(), 1024);
    }

    #[test]
    fn test_default_state_is_idle() {
        let state = SessionState::default();
        assert_eq!(state.phase, SessionPhase::Idle);
        assert!(!state.is_previewing());
        assert!(!state.is_recording());
        assert_eq!(state.elapsed_seconds, 0);
    }
}
