//! Control panel view model
//!
//! [`PanelView::from_state`] derives everything the UI renders from the
//! session state. Serialized for a web frontend or printed by the CLI.

use crate::capture::DeviceDescriptor;
use crate::export::download_file_name;
use crate::recorder::state::SessionState;
use crate::utils::format_time;
use serde::{Deserialize, Serialize};

pub const PANEL_TITLE: &str = "RippleBerry Camera Recorder Demo";
pub const PERMISSION_MESSAGE: &str =
    "We need your permission to access the camera and microphone.";

/// Button shown in the panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonView {
    pub label: String,
}

impl ButtonView {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }
}

/// One entry in a device dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Download link for the recorded artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    pub label: String,
    pub file_name: String,
    pub size_bytes: usize,
}

/// Device selection, video display and controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPanel {
    pub video_options: Vec<DeviceOption>,
    pub audio_options: Vec<DeviceOption>,

    /// Playback controls on the video element
    pub playback_controls: bool,

    /// `MM:SS` elapsed time, shown only while recording
    pub recording_indicator: Option<String>,

    /// "Start Preview"/"Stop Preview", hidden while recording
    pub preview_button: Option<ButtonView>,

    /// "Start Recording" or "Stop Recording"
    pub record_button: ButtonView,

    pub download: Option<DownloadLink>,
}

/// What the panel body shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "camelCase")]
pub enum PanelBody {
    #[serde(rename_all = "camelCase")]
    PermissionRequest { message: String, action: ButtonView },
    Controls(ControlPanel),
}

/// Complete panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub title: String,
    pub body: PanelBody,
}

impl PanelView {
    pub fn from_state(state: &SessionState, download_stem: &str) -> Self {
        let body = if !state.permissions_granted {
            PanelBody::PermissionRequest {
                message: PERMISSION_MESSAGE.to_string(),
                action: ButtonView::new("Grant Permission"),
            }
        } else {
            PanelBody::Controls(ControlPanel::from_state(state, download_stem))
        };

        Self {
            title: PANEL_TITLE.to_string(),
            body,
        }
    }

    pub fn controls(&self) -> Option<&ControlPanel> {
        match &self.body {
            PanelBody::Controls(controls) => Some(controls),
            PanelBody::PermissionRequest { .. } => None,
        }
    }
}

impl ControlPanel {
    fn from_state(state: &SessionState, download_stem: &str) -> Self {
        let recording = state.is_recording();

        let (preview_button, record_button) = if recording {
            (None, ButtonView::new("Stop Recording"))
        } else {
            let label = if state.is_previewing() {
                "Stop Preview"
            } else {
                "Start Preview"
            };
            (Some(ButtonView::new(label)), ButtonView::new("Start Recording"))
        };

        let download = state.artifact.as_ref().map(|artifact| DownloadLink {
            label: "Download Video".to_string(),
            file_name: download_file_name(download_stem, &artifact.mime_type),
            size_bytes: artifact.size_bytes(),
        });

        Self {
            video_options: device_options(&state.video_devices, state.selected_video_device.as_deref()),
            audio_options: device_options(&state.audio_devices, state.selected_audio_device.as_deref()),
            playback_controls: !recording && state.artifact.is_some(),
            recording_indicator: recording.then(|| format_time(state.elapsed_seconds)),
            preview_button,
            record_button,
            download,
        }
    }
}

fn device_options(devices: &[DeviceDescriptor], selected: Option<&str>) -> Vec<DeviceOption> {
    devices
        .iter()
        .map(|device| DeviceOption {
            value: device.device_id.clone(),
            label: device.display_label(),
            selected: selected == Some(device.device_id.as_str()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::DeviceKind;
    use crate::recorder::state::{RecordedArtifact, SessionPhase};

    fn granted_state() -> SessionState {
        SessionState {
            permissions_granted: true,
            video_devices: vec![
                DeviceDescriptor::new("cam-0", "Front", DeviceKind::VideoInput),
                DeviceDescriptor::new("cam-1", "", DeviceKind::VideoInput),
            ],
            audio_devices: vec![DeviceDescriptor::new("mic-0", "", DeviceKind::AudioInput)],
            selected_video_device: Some("cam-1".to_string()),
            selected_audio_device: Some("mic-0".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_permission_prompt_when_ungranted() {
        let view = PanelView::from_state(&SessionState::default(), "recorded-video");
        match view.body {
            PanelBody::PermissionRequest { message, action } => {
                assert_eq!(message, PERMISSION_MESSAGE);
                assert_eq!(action.label, "Grant Permission");
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_idle_controls() {
        let view = PanelView::from_state(&granted_state(), "recorded-video");
        let controls = view.controls().unwrap();

        assert_eq!(controls.video_options[1].label, "Camera cam-1");
        assert!(controls.video_options[1].selected);
        assert!(!controls.video_options[0].selected);
        assert_eq!(controls.audio_options[0].label, "Microphone mic-0");

        assert_eq!(controls.preview_button.as_ref().unwrap().label, "Start Preview");
        assert_eq!(controls.record_button.label, "Start Recording");
        assert!(controls.recording_indicator.is_none());
        assert!(controls.download.is_none());
        assert!(!controls.playback_controls);
    }

    #[test]
    fn test_recording_controls() {
        let mut state = granted_state();
        state.phase = SessionPhase::Recording;
        state.elapsed_seconds = 65;

        let view = PanelView::from_state(&state, "recorded-video");
        let controls = view.controls().unwrap();

        assert!(controls.preview_button.is_none());
        assert_eq!(controls.record_button.label, "Stop Recording");
        assert_eq!(controls.recording_indicator.as_deref(), Some("01:05"));
    }

    #[test]
    fn test_preview_toggle_label() {
        let mut state = granted_state();
        state.phase = SessionPhase::Previewing;

        let view = PanelView::from_state(&state, "recorded-video");
        let controls = view.controls().unwrap();
        assert_eq!(controls.preview_button.as_ref().unwrap().label, "Stop Preview");
    }

    #[test]
    fn test_download_after_recording() {
        let mut state = granted_state();
        state.artifact = Some(RecordedArtifact::new(vec![0; 42], "video/webm", 3));

        let view = PanelView::from_state(&state, "recorded-video");
        let controls = view.controls().unwrap();
        let download = controls.download.as_ref().unwrap();

        assert_eq!(download.file_name, "recorded-video.webm");
        assert_eq!(download.size_bytes, 42);
        assert!(controls.playback_controls);
    }

    #[test]
    fn test_title() {
        let view = PanelView::from_state(&SessionState::default(), "recorded-video");
        assert_eq!(view.title, "RippleBerry Camera Recorder Demo");
    }

    #[test]
    fn test_serializes_tagged_body() {
        let view = PanelView::from_state(&granted_state(), "recorded-video");
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["body"]["screen"], "controls");
        assert_eq!(json["body"]["recordButton"]["label"], "Start Recording");
    }
}
