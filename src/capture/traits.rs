//! Capture trait definitions
//!
//! Platform-agnostic view of the recording library: permission checks,
//! device enumeration and the recorder handle itself.

use crate::recorder::state::RecorderOptions;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors reported by a capture backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Permission query failed: {0}")]
    PermissionQuery(String),

    #[error("Camera or microphone permission denied")]
    PermissionDenied,

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Stream unavailable: {0}")]
    StreamUnavailable(String),

    #[error("Recorder is not recording")]
    NotRecording,

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Kind of input device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
}

/// Information about a camera or microphone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    /// Opaque device ID
    pub device_id: String,

    /// Human readable name, may be empty before permission is granted
    pub label: String,

    pub kind: DeviceKind,
}

impl DeviceDescriptor {
    pub fn new(device_id: impl Into<String>, label: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            device_id: device_id.into(),
            label: label.into(),
            kind,
        }
    }

    /// Label to show in a dropdown, falling back to the kind and ID
    pub fn display_label(&self) -> String {
        if !self.label.is_empty() {
            return self.label.clone();
        }
        match self.kind {
            DeviceKind::VideoInput => format!("Camera {}", self.device_id),
            DeviceKind::AudioInput => format!("Microphone {}", self.device_id),
        }
    }
}

/// Connected input devices, in backend order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceList {
    pub video: Vec<DeviceDescriptor>,
    pub audio: Vec<DeviceDescriptor>,
}

/// Camera and microphone grant status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionStatus {
    pub camera: bool,
    pub microphone: bool,
}

impl PermissionStatus {
    pub fn all_granted(&self) -> bool {
        self.camera && self.microphone
    }
}

/// Handle to a live camera/microphone stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStream {
    pub id: Uuid,
    pub video_device_id: Option<String>,
    pub audio_device_id: Option<String>,
    pub width: u32,
    pub height: u32,
}

/// Entry point of the recording library
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Current grant status, without prompting
    async fn check_permission(&self) -> CaptureResult<PermissionStatus>;

    /// Prompt the user; resolves to whether access was granted
    async fn request_permission(&self) -> CaptureResult<bool>;

    /// Enumerate video and audio inputs
    async fn connected_devices(&self) -> CaptureResult<DeviceList>;

    /// Build a recorder for the given options
    fn create_recorder(&self, options: &RecorderOptions) -> CaptureResult<Box<dyn Recorder>>;
}

/// A single recorder instance
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Open the devices without capturing
    async fn preview_stream(&mut self) -> CaptureResult<LiveStream>;

    /// Begin capturing; returns the live stream being recorded
    async fn start(&mut self) -> CaptureResult<LiveStream>;

    /// Finalize the capture and return the encoded bytes
    async fn stop(&mut self) -> CaptureResult<Vec<u8>>;

    /// Release preview resources
    fn reset(&mut self);

    async fn change_video_device(&mut self, device_id: &str) -> CaptureResult<()>;

    async fn change_audio_device(&mut self, device_id: &str) -> CaptureResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label_fallback() {
        let cam = DeviceDescriptor::new("abc", "", DeviceKind::VideoInput);
        assert_eq!(cam.display_label(), "Camera abc");

        let mic = DeviceDescriptor::new("m1", "", DeviceKind::AudioInput);
        assert_eq!(mic.display_label(), "Microphone m1");

        let named = DeviceDescriptor::new("m2", "USB Mic", DeviceKind::AudioInput);
        assert_eq!(named.display_label(), "USB Mic");
    }

    #[test]
    fn test_permission_requires_both() {
        let partial = PermissionStatus {
            camera: true,
            microphone: false,
        };
        assert!(!partial.all_granted());
        assert!(PermissionStatus {
            camera: true,
            microphone: true
        }
        .all_granted());
    }
}
