//! Simulated capture backend
//!
//! An in-process stand-in for the recording library. It honours the same
//! contract as a real backend (permission prompts, device lookups, stream
//! and artifact handles) and lets callers inject failures.

use super::traits::{
    CaptureError, CaptureResult, DeviceDescriptor, DeviceKind, DeviceList, LiveStream,
    MediaBackend, PermissionStatus, Recorder,
};
use crate::recorder::state::RecorderOptions;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// EBML magic that opens every WebM/Matroska file
const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

/// Behaviour of the simulated library
#[derive(Debug, Clone)]
pub struct SimulatedSettings {
    pub camera_granted: bool,
    pub microphone_granted: bool,

    /// Outcome of the permission prompt
    pub grant_on_request: bool,

    pub fail_permission_check: bool,
    pub fail_preview: bool,
    pub fail_start: bool,
    pub fail_stop: bool,

    pub devices: DeviceList,

    /// Delay applied to every async call
    pub latency: Duration,
}

impl Default for SimulatedSettings {
    fn default() -> Self {
        Self {
            camera_granted: false,
            microphone_granted: false,
            grant_on_request: true,
            fail_permission_check: false,
            fail_preview: false,
            fail_start: false,
            fail_stop: false,
            devices: DeviceList {
                video: vec![
                    DeviceDescriptor::new("cam-0", "FaceTime HD Camera", DeviceKind::VideoInput),
                    DeviceDescriptor::new("cam-1", "USB Capture", DeviceKind::VideoInput),
                ],
                audio: vec![
                    DeviceDescriptor::new("mic-0", "Built-in Microphone", DeviceKind::AudioInput),
                    DeviceDescriptor::new("mic-1", "", DeviceKind::AudioInput),
                ],
            },
            latency: Duration::ZERO,
        }
    }
}

/// Counters for what the library was asked to do
#[derive(Debug, Clone, Default)]
pub struct BackendStats {
    pub permission_checks: usize,
    pub permission_requests: usize,
    pub recorders_created: usize,
    pub resets: usize,
    pub video_switches: Vec<String>,
    pub audio_switches: Vec<String>,
    pub last_options: Option<RecorderOptions>,
}

/// Metadata embedded in the simulated artifact after the EBML magic
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSummary {
    pub mime_type: String,
    pub video_device_id: Option<String>,
    pub audio_device_id: Option<String>,
    pub width: u32,
    pub height: u32,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
}

impl CaptureSummary {
    /// Parse the summary back out of an artifact produced by this backend
    pub fn from_artifact(data: &[u8]) -> Option<Self> {
        let body = data.strip_prefix(&EBML_MAGIC[..])?;
        serde_json::from_slice(body).ok()
    }
}

/// Simulated recording library
#[derive(Debug, Clone, Default)]
pub struct SimulatedBackend {
    settings: Arc<Mutex<SimulatedSettings>>,
    stats: Arc<Mutex<BackendStats>>,
}

impl SimulatedBackend {
    pub fn new(settings: SimulatedSettings) -> Self {
        Self {
            settings: Arc::new(Mutex::new(settings)),
            stats: Arc::new(Mutex::new(BackendStats::default())),
        }
    }

    /// Backend where camera and microphone are already granted
    pub fn granted() -> Self {
        Self::new(SimulatedSettings {
            camera_granted: true,
            microphone_granted: true,
            ..Default::default()
        })
    }

    /// Change settings in place, e.g. to inject a failure mid-session
    pub fn update(&self, f: impl FnOnce(&mut SimulatedSettings)) {
        f(&mut self.settings.lock());
    }

    pub fn stats(&self) -> BackendStats {
        self.stats.lock().clone()
    }

    async fn simulate_latency(&self) {
        let latency = self.settings.lock().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl MediaBackend for SimulatedBackend {
    async fn check_permission(&self) -> CaptureResult<PermissionStatus> {
        self.simulate_latency().await;
        self.stats.lock().permission_checks += 1;

        let settings = self.settings.lock();
        if settings.fail_permission_check {
            return Err(CaptureError::PermissionQuery(
                "permissions API unavailable".to_string(),
            ));
        }
        Ok(PermissionStatus {
            camera: settings.camera_granted,
            microphone: settings.microphone_granted,
        })
    }

    async fn request_permission(&self) -> CaptureResult<bool> {
        self.simulate_latency().await;
        self.stats.lock().permission_requests += 1;

        let mut settings = self.settings.lock();
        if settings.grant_on_request {
            settings.camera_granted = true;
            settings.microphone_granted = true;
        }
        Ok(settings.camera_granted && settings.microphone_granted)
    }

    async fn connected_devices(&self) -> CaptureResult<DeviceList> {
        self.simulate_latency().await;

        let settings = self.settings.lock();
        let mut devices = settings.devices.clone();
        // Labels are withheld until access has been granted
        if !(settings.camera_granted && settings.microphone_granted) {
            for device in devices.video.iter_mut().chain(devices.audio.iter_mut()) {
                device.label.clear();
            }
        }
        Ok(devices)
    }

    fn create_recorder(&self, options: &RecorderOptions) -> CaptureResult<Box<dyn Recorder>> {
        {
            let mut stats = self.stats.lock();
            stats.recorders_created += 1;
            stats.last_options = Some(options.clone());
        }
        tracing::debug!("Creating simulated recorder: {:?}", options);

        Ok(Box::new(SimulatedRecorder {
            backend: self.clone(),
            options: options.clone(),
            phase: RecorderPhase::Idle,
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RecorderPhase {
    Idle,
    Previewing,
    Recording { started_at: DateTime<Utc> },
}

/// Recorder handed out by [`SimulatedBackend`]
pub struct SimulatedRecorder {
    backend: SimulatedBackend,
    options: RecorderOptions,
    phase: RecorderPhase,
}

impl SimulatedRecorder {
    fn find_device(&self, kind: DeviceKind, device_id: Option<&str>) -> CaptureResult<String> {
        let settings = self.backend.settings.lock();
        let devices = match kind {
            DeviceKind::VideoInput => &settings.devices.video,
            DeviceKind::AudioInput => &settings.devices.audio,
        };

        let Some(device_id) = device_id else {
            return Err(CaptureError::DeviceNotFound(match kind {
                DeviceKind::VideoInput => "no video input selected".to_string(),
                DeviceKind::AudioInput => "no audio input selected".to_string(),
            }));
        };

        devices
            .iter()
            .find(|d| d.device_id == device_id)
            .map(|d| d.device_id.clone())
            .ok_or_else(|| CaptureError::DeviceNotFound(device_id.to_string()))
    }

    fn open_stream(&self) -> CaptureResult<LiveStream> {
        let granted = {
            let settings = self.backend.settings.lock();
            settings.camera_granted && settings.microphone_granted
        };
        if !granted {
            return Err(CaptureError::PermissionDenied);
        }

        let video = self.find_device(DeviceKind::VideoInput, self.options.video.device_id.as_deref())?;
        let audio = self.find_device(DeviceKind::AudioInput, self.options.audio.device_id.as_deref())?;

        Ok(LiveStream {
            id: Uuid::new_v4(),
            video_device_id: Some(video),
            audio_device_id: Some(audio),
            width: self.options.video.width,
            height: self.options.video.height,
        })
    }
}

#[async_trait]
impl Recorder for SimulatedRecorder {
    async fn preview_stream(&mut self) -> CaptureResult<LiveStream> {
        self.backend.simulate_latency().await;
        if self.backend.settings.lock().fail_preview {
            return Err(CaptureError::StreamUnavailable("camera busy".to_string()));
        }

        let stream = self.open_stream()?;
        self.phase = RecorderPhase::Previewing;
        Ok(stream)
    }

    async fn start(&mut self) -> CaptureResult<LiveStream> {
        self.backend.simulate_latency().await;
        if self.backend.settings.lock().fail_start {
            return Err(CaptureError::StreamUnavailable("encoder rejected options".to_string()));
        }

        let stream = self.open_stream()?;
        self.phase = RecorderPhase::Recording {
            started_at: Utc::now(),
        };
        Ok(stream)
    }

    async fn stop(&mut self) -> CaptureResult<Vec<u8>> {
        self.backend.simulate_latency().await;
        if self.backend.settings.lock().fail_stop {
            return Err(CaptureError::Backend("failed to finalize recording".to_string()));
        }

        let RecorderPhase::Recording { started_at } = self.phase else {
            return Err(CaptureError::NotRecording);
        };

        let summary = CaptureSummary {
            mime_type: self.options.mime_type.clone(),
            video_device_id: self.options.video.device_id.clone(),
            audio_device_id: self.options.audio.device_id.clone(),
            width: self.options.video.width,
            height: self.options.video.height,
            started_at,
            stopped_at: Utc::now(),
        };
        let body = serde_json::to_vec(&summary)
            .map_err(|e| CaptureError::Backend(format!("failed to encode summary: {}", e)))?;

        let mut data = EBML_MAGIC.to_vec();
        data.extend_from_slice(&body);

        self.phase = RecorderPhase::Idle;
        Ok(data)
    }

    fn reset(&mut self) {
        self.backend.stats.lock().resets += 1;
        if self.phase == RecorderPhase::Previewing {
            self.phase = RecorderPhase::Idle;
        }
    }

    async fn change_video_device(&mut self, device_id: &str) -> CaptureResult<()> {
        let device_id = self.find_device(DeviceKind::VideoInput, Some(device_id))?;
        self.backend.stats.lock().video_switches.push(device_id.clone());
        self.options.video.device_id = Some(device_id);
        Ok(())
    }

    async fn change_audio_device(&mut self, device_id: &str) -> CaptureResult<()> {
        let device_id = self.find_device(DeviceKind::AudioInput, Some(device_id))?;
        self.backend.stats.lock().audio_switches.push(device_id.clone());
        self.options.audio.device_id = Some(device_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncodingConfig;

    fn options(video: Option<&str>, audio: Option<&str>) -> RecorderOptions {
        RecorderOptions::new(&EncodingConfig::default(), video, audio)
    }

    #[tokio::test]
    async fn test_request_grants_permission() {
        let backend = SimulatedBackend::default();
        assert!(!backend.check_permission().await.unwrap().all_granted());
        assert!(backend.request_permission().await.unwrap());
        assert!(backend.check_permission().await.unwrap().all_granted());
    }

    #[tokio::test]
    async fn test_labels_hidden_until_granted() {
        let backend = SimulatedBackend::default();
        let devices = backend.connected_devices().await.unwrap();
        assert!(devices.video.iter().all(|d| d.label.is_empty()));

        backend.request_permission().await.unwrap();
        let devices = backend.connected_devices().await.unwrap();
        assert_eq!(devices.video[0].label, "FaceTime HD Camera");
    }

    #[tokio::test]
    async fn test_record_produces_webm_artifact() {
        let backend = SimulatedBackend::granted();
        let mut recorder = backend
            .create_recorder(&options(Some("cam-1"), Some("mic-0")))
            .unwrap();

        let stream = recorder.start().await.unwrap();
        assert_eq!(stream.video_device_id.as_deref(), Some("cam-1"));

        let data = recorder.stop().await.unwrap();
        assert_eq!(&data[..4], &EBML_MAGIC);

        let summary = CaptureSummary::from_artifact(&data).unwrap();
        assert_eq!(summary.mime_type, "video/webm");
        assert_eq!(summary.video_device_id.as_deref(), Some("cam-1"));
    }

    #[tokio::test]
    async fn test_stop_without_start_fails() {
        let backend = SimulatedBackend::granted();
        let mut recorder = backend
            .create_recorder(&options(Some("cam-0"), Some("mic-0")))
            .unwrap();
        assert_eq!(recorder.stop().await.unwrap_err(), CaptureError::NotRecording);
    }

    #[tokio::test]
    async fn test_missing_selection_fails_gracefully() {
        let backend = SimulatedBackend::granted();
        let mut recorder = backend.create_recorder(&options(None, Some("mic-0"))).unwrap();
        assert!(matches!(
            recorder.preview_stream().await,
            Err(CaptureError::DeviceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_device_switch_rejected() {
        let backend = SimulatedBackend::granted();
        let mut recorder = backend
            .create_recorder(&options(Some("cam-0"), Some("mic-0")))
            .unwrap();

        assert!(recorder.change_video_device("cam-9").await.is_err());
        recorder.change_video_device("cam-1").await.unwrap();
        assert_eq!(backend.stats().video_switches, vec!["cam-1".to_string()]);
    }
}
