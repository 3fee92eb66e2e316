//! Control panel actions
//!
//! Failures are logged by the controller and swallowed here: the panel
//! simply does not advance, and the user can try again.

use crate::export::export_artifact;
use crate::recorder::{SessionController, SessionPhase};
use crate::view::PanelView;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Something the user did in the panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum UserAction {
    /// "Grant Permission" button
    GrantPermission,
    #[serde(rename_all = "camelCase")]
    SelectVideoDevice { device_id: String },
    #[serde(rename_all = "camelCase")]
    SelectAudioDevice { device_id: String },
    /// "Start Preview" / "Stop Preview" button
    TogglePreview,
    StartRecording,
    StopRecording,
    /// "Download Video" link, saving into `dir`
    Download { dir: PathBuf },
}

/// Panel after an action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub view: PanelView,

    /// Where a download was written
    pub exported: Option<PathBuf>,
}

/// Current panel for the controller's state
pub fn render(controller: &SessionController) -> PanelView {
    let stem = &controller.config().download_file_stem;
    controller.with_state(|state| PanelView::from_state(state, stem))
}

/// Run one action and return the refreshed panel
pub async fn dispatch(controller: &mut SessionController, action: UserAction) -> ActionOutcome {
    tracing::debug!("Dispatching {:?}", action);

    let mut exported = None;
    let result = match action {
        UserAction::GrantPermission => controller.retry_permission().await.map(|_| ()),
        UserAction::SelectVideoDevice { device_id } => {
            controller.select_video_device(&device_id).await
        }
        UserAction::SelectAudioDevice { device_id } => {
            controller.select_audio_device(&device_id).await
        }
        UserAction::TogglePreview => {
            if controller.phase() == SessionPhase::Previewing {
                controller.stop_preview();
                Ok(())
            } else {
                controller.start_preview().await
            }
        }
        UserAction::StartRecording => controller.start_recording().await,
        UserAction::StopRecording => controller.stop_recording().await,
        UserAction::Download { dir } => {
            let artifact = controller.artifact();
            let stem = controller.config().download_file_stem.clone();
            export_artifact(artifact.as_ref(), &dir, &stem).map(|path| {
                exported = Some(path);
            })
        }
    };

    if let Err(e) = result {
        tracing::debug!(code = e.code(), "Action did not complete");
    }

    ActionOutcome {
        view: render(controller),
        exported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{SimulatedBackend, SimulatedSettings};
    use crate::config::AppConfig;
    use crate::view::{PanelBody, PreviewSurface};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn controller(backend: &SimulatedBackend) -> SessionController {
        SessionController::new(
            Arc::new(backend.clone()),
            Arc::new(PreviewSurface::new()),
            AppConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_action_json_shape() {
        let action: UserAction =
            serde_json::from_str(r#"{ "action": "selectVideoDevice", "deviceId": "cam-1" }"#)
                .unwrap();
        assert_eq!(
            action,
            UserAction::SelectVideoDevice {
                device_id: "cam-1".to_string()
            }
        );

        let action: UserAction = serde_json::from_str(r#"{ "action": "togglePreview" }"#).unwrap();
        assert_eq!(action, UserAction::TogglePreview);
    }

    #[tokio::test]
    async fn test_grant_permission_stays_on_prompt_when_denied() {
        let backend = SimulatedBackend::new(SimulatedSettings {
            grant_on_request: false,
            ..Default::default()
        });
        let mut controller = controller(&backend);

        for _ in 0..3 {
            let outcome = dispatch(&mut controller, UserAction::GrantPermission).await;
            assert!(matches!(outcome.view.body, PanelBody::PermissionRequest { .. }));
        }
        assert_eq!(backend.stats().permission_requests, 3);
    }

    #[tokio::test]
    async fn test_toggle_preview() {
        let backend = SimulatedBackend::granted();
        let mut controller = controller(&backend);
        dispatch(&mut controller, UserAction::GrantPermission).await;

        let outcome = dispatch(&mut controller, UserAction::TogglePreview).await;
        let controls = outcome.view.controls().unwrap();
        assert_eq!(controls.preview_button.as_ref().unwrap().label, "Stop Preview");

        let outcome = dispatch(&mut controller, UserAction::TogglePreview).await;
        let controls = outcome.view.controls().unwrap();
        assert_eq!(controls.preview_button.as_ref().unwrap().label, "Start Preview");
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let backend = SimulatedBackend::granted();
        backend.update(|s| s.fail_start = true);
        let mut controller = controller(&backend);
        dispatch(&mut controller, UserAction::GrantPermission).await;

        let outcome = dispatch(&mut controller, UserAction::StartRecording).await;
        let controls = outcome.view.controls().unwrap();
        assert_eq!(controls.record_button.label, "Start Recording");

        let dir = tempdir().unwrap();
        let outcome = dispatch(
            &mut controller,
            UserAction::Download {
                dir: dir.path().to_path_buf(),
            },
        )
        .await;
        assert!(outcome.exported.is_none());
    }

    #[tokio::test]
    async fn test_record_and_download() {
        let backend = SimulatedBackend::granted();
        let mut controller = controller(&backend);
        dispatch(&mut controller, UserAction::GrantPermission).await;

        let outcome = dispatch(&mut controller, UserAction::StartRecording).await;
        let controls = outcome.view.controls().unwrap();
        assert_eq!(controls.record_button.label, "Stop Recording");
        assert_eq!(controls.recording_indicator.as_deref(), Some("00:00"));

        let outcome = dispatch(&mut controller, UserAction::StopRecording).await;
        assert!(outcome.view.controls().unwrap().download.is_some());

        let dir = tempdir().unwrap();
        let outcome = dispatch(
            &mut controller,
            UserAction::Download {
                dir: dir.path().to_path_buf(),
            },
        )
        .await;
        let path = outcome.exported.unwrap();
        assert_eq!(path, dir.path().join("recorded-video.webm"));
        assert!(path.exists());
    }
}
