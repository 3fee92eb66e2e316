//! Session controller
//!
//! Mediates between the recording library and the display surface: runs the
//! permission gate, loads devices, drives preview and recording, and keeps
//! the recording timer.

use super::state::{RecordedArtifact, RecorderOptions, SessionPhase, SessionState};
use crate::capture::{CaptureResult, DeviceKind, LiveStream, MediaBackend, Recorder};
use crate::config::AppConfig;
use crate::utils::{AppError, AppResult};
use crate::view::surface::DisplaySurface;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// Events emitted as the session changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Permission gate settled
    PermissionChanged(bool),
    /// Device lists were (re)loaded
    DevicesLoaded { video: usize, audio: usize },
    DeviceChanged { kind: DeviceKind, device_id: String },
    PreviewStarted,
    PreviewStopped,
    RecordingStarted,
    /// Elapsed recording time in seconds
    Tick(u64),
    RecordingStopped { duration_seconds: u64 },
    ArtifactReady { size_bytes: usize },
    /// An operation failed and was rolled back
    Error(String),
}

/// Owns the recorder handle and the session state
pub struct SessionController {
    /// Shared with the tick task
    state: Arc<RwLock<SessionState>>,

    backend: Arc<dyn MediaBackend>,

    surface: Arc<dyn DisplaySurface>,

    /// Rebuilt for every preview or recording
    recorder: Option<Box<dyn Recorder>>,

    /// Recording timer
    tick: Option<JoinHandle<()>>,

    config: AppConfig,

    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    /// Create a new controller, rejecting an invalid config
    pub fn new(
        backend: Arc<dyn MediaBackend>,
        surface: Arc<dyn DisplaySurface>,
        config: AppConfig,
    ) -> AppResult<Self> {
        config.validate()?;

        let (event_tx, _) = broadcast::channel(config.event_capacity);
        Ok(Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            backend,
            surface,
            recorder: None,
            tick: None,
            config,
            event_tx,
        })
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Run `f` against the state under the read lock, without cloning it
    pub fn with_state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.state.read())
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.read().phase
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.state.read().elapsed_seconds
    }

    pub fn artifact(&self) -> Option<RecordedArtifact> {
        self.state.read().artifact.clone()
    }

    pub fn has_recorder(&self) -> bool {
        self.recorder.is_some()
    }

    /// Whether the recording timer is still scheduled
    pub fn is_ticking(&self) -> bool {
        self.tick.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Options for the next recorder, from the current device selection
    pub fn options(&self) -> RecorderOptions {
        let state = self.state.read();
        RecorderOptions::new(
            &self.config.encoding,
            state.selected_video_device.as_deref(),
            state.selected_audio_device.as_deref(),
        )
    }

    /// Run the permission gate, loading devices once access is granted.
    ///
    /// Returns whether permission is granted. Safe to call repeatedly; this
    /// is also what the "Grant Permission" action runs.
    pub async fn initialize(&mut self) -> AppResult<bool> {
        let granted = match self.negotiate_permission().await {
            Ok(granted) => granted,
            Err(e) => {
                self.state.write().permissions_granted = false;
                let _ = self.event_tx.send(SessionEvent::PermissionChanged(false));
                return Err(self.report("Error checking permissions", e.into()));
            }
        };

        self.state.write().permissions_granted = granted;
        let _ = self.event_tx.send(SessionEvent::PermissionChanged(granted));

        if granted {
            tracing::info!("Camera and microphone permission granted");
            self.load_devices().await?;
        } else {
            tracing::warn!("Camera or microphone permission denied");
        }
        Ok(granted)
    }

    /// User-initiated retry of the permission gate
    pub async fn retry_permission(&mut self) -> AppResult<bool> {
        tracing::info!("Retrying permission request");
        self.initialize().await
    }

    async fn negotiate_permission(&self) -> CaptureResult<bool> {
        let status = self.backend.check_permission().await?;
        if status.all_granted() {
            return Ok(true);
        }

        tracing::info!(
            camera = status.camera,
            microphone = status.microphone,
            "Requesting camera/microphone permission"
        );
        self.backend.request_permission().await
    }

    /// Enumerate devices and default the selection to the first of each
    pub async fn load_devices(&mut self) -> AppResult<()> {
        let devices = match self.backend.connected_devices().await {
            Ok(devices) => devices,
            Err(e) => return Err(self.report("Error loading devices", e.into())),
        };

        tracing::info!(
            "Found {} video and {} audio devices",
            devices.video.len(),
            devices.audio.len()
        );
        let _ = self.event_tx.send(SessionEvent::DevicesLoaded {
            video: devices.video.len(),
            audio: devices.audio.len(),
        });

        let mut state = self.state.write();
        if let Some(first) = devices.video.first() {
            state.selected_video_device = Some(first.device_id.clone());
        }
        if let Some(first) = devices.audio.first() {
            state.selected_audio_device = Some(first.device_id.clone());
        }
        state.video_devices = devices.video;
        state.audio_devices = devices.audio;
        Ok(())
    }

    /// Show a live preview from a fresh recorder
    pub async fn start_preview(&mut self) -> AppResult<()> {
        if self.state.read().is_recording() {
            return Err(self.report(
                "Error starting preview",
                AppError::InvalidState("recording in progress".to_string()),
            ));
        }

        self.state.write().artifact = None;

        let options = self.options();
        let recorder = self.replace_recorder(&options)?;

        let result = recorder.preview_stream().await;
        match result {
            Ok(stream) => {
                self.state.write().phase = SessionPhase::Previewing;
                self.show_live(&stream);
                let _ = self.event_tx.send(SessionEvent::PreviewStarted);
                tracing::info!("Preview started");
                Ok(())
            }
            Err(e) => Err(self.report("Error starting preview", e.into())),
        }
    }

    /// Release the preview. No-op without a recorder or while recording.
    pub fn stop_preview(&mut self) {
        if self.state.read().is_recording() {
            tracing::warn!("Ignoring stop preview while recording");
            return;
        }

        if let Some(recorder) = self.recorder.as_mut() {
            recorder.reset();
        }

        let was_previewing = {
            let mut state = self.state.write();
            let was_previewing = state.is_previewing();
            state.phase = SessionPhase::Idle;
            was_previewing
        };

        if was_previewing {
            self.surface.clear_source();
            let _ = self.event_tx.send(SessionEvent::PreviewStopped);
            tracing::info!("Preview stopped");
        }
    }

    /// Start recording with a fresh recorder
    pub async fn start_recording(&mut self) -> AppResult<()> {
        let was_previewing = {
            let mut state = self.state.write();
            if state.is_recording() {
                drop(state);
                return Err(self.report(
                    "Error starting recorder",
                    AppError::InvalidState("already recording".to_string()),
                ));
            }
            let was_previewing = state.is_previewing();
            state.phase = SessionPhase::Idle;
            state.artifact = None;
            was_previewing
        };
        if was_previewing {
            self.surface.clear_source();
        }
        self.cancel_tick();

        let options = self.options();
        let recorder = self.replace_recorder(&options)?;

        let result = recorder.start().await;
        match result {
            Ok(stream) => {
                let generation = {
                    let mut state = self.state.write();
                    state.phase = SessionPhase::Recording;
                    state.elapsed_seconds = 0;
                    state.elapsed_ms = 0;
                    state.generation += 1;
                    state.generation
                };
                self.show_live(&stream);
                self.spawn_tick(generation);

                let _ = self.event_tx.send(SessionEvent::RecordingStarted);
                tracing::info!("Recording started (session {})", generation);
                Ok(())
            }
            Err(e) => Err(self.report("Error starting recorder", e.into())),
        }
    }

    /// Finalize the recording and present the artifact.
    ///
    /// A no-op when no recorder exists.
    pub async fn stop_recording(&mut self) -> AppResult<()> {
        let Some(recorder) = self.recorder.as_mut() else {
            tracing::debug!("Stop requested with no active recorder");
            return Ok(());
        };

        let result = recorder.stop().await;
        let data = match result {
            Ok(data) => data,
            Err(e) => return Err(self.report("Error stopping recorder", e.into())),
        };

        let artifact = {
            let mut state = self.state.write();
            let artifact = RecordedArtifact::new(
                data,
                self.config.encoding.mime_type.clone(),
                state.elapsed_seconds,
            );
            state.artifact = Some(artifact.clone());
            state.phase = SessionPhase::Idle;
            artifact
        };
        self.surface.clear_source();
        self.cancel_tick();

        let _ = self.event_tx.send(SessionEvent::RecordingStopped {
            duration_seconds: artifact.duration_seconds,
        });
        tracing::info!(
            "Recording stopped. Duration: {}s, {} bytes",
            artifact.duration_seconds,
            artifact.size_bytes()
        );

        self.present_artifact(&artifact);
        Ok(())
    }

    /// Select a camera, hot-swapping it into an existing recorder
    pub async fn select_video_device(&mut self, device_id: &str) -> AppResult<()> {
        self.select_device(DeviceKind::VideoInput, device_id).await
    }

    /// Select a microphone, hot-swapping it into an existing recorder
    pub async fn select_audio_device(&mut self, device_id: &str) -> AppResult<()> {
        self.select_device(DeviceKind::AudioInput, device_id).await
    }

    async fn select_device(&mut self, kind: DeviceKind, device_id: &str) -> AppResult<()> {
        {
            let mut guard = self.state.write();
            let state = &mut *guard;
            let (devices, selected) = match kind {
                DeviceKind::VideoInput => (&state.video_devices, &mut state.selected_video_device),
                DeviceKind::AudioInput => (&state.audio_devices, &mut state.selected_audio_device),
            };
            if !devices.iter().any(|d| d.device_id == device_id) {
                tracing::warn!("Selected unknown {:?} device {}", kind, device_id);
            }
            *selected = Some(device_id.to_string());
        }

        let result = match self.recorder.as_mut() {
            Some(recorder) => match kind {
                DeviceKind::VideoInput => recorder.change_video_device(device_id).await,
                DeviceKind::AudioInput => recorder.change_audio_device(device_id).await,
            },
            None => Ok(()),
        };
        if let Err(e) = result {
            return Err(self.report("Error switching device", e.into()));
        }

        let _ = self.event_tx.send(SessionEvent::DeviceChanged {
            kind,
            device_id: device_id.to_string(),
        });
        Ok(())
    }

    /// Build a recorder for `options`, resetting and dropping the previous one
    fn replace_recorder(&mut self, options: &RecorderOptions) -> AppResult<&mut Box<dyn Recorder>> {
        let recorder = match self.backend.create_recorder(options) {
            Ok(recorder) => recorder,
            Err(e) => return Err(self.report("Error creating recorder", e.into())),
        };

        if let Some(mut previous) = self.recorder.take() {
            previous.reset();
        }
        Ok(self.recorder.insert(recorder))
    }

    fn show_live(&self, stream: &LiveStream) {
        self.surface.clear_source();
        self.surface.bind_live_stream(stream);
        self.surface.play();
    }

    fn present_artifact(&self, artifact: &RecordedArtifact) {
        self.surface.clear_source();
        self.surface.bind_artifact(artifact);
        self.surface.play();
        let _ = self.event_tx.send(SessionEvent::ArtifactReady {
            size_bytes: artifact.size_bytes(),
        });
    }

    fn spawn_tick(&mut self, generation: u64) {
        self.cancel_tick();

        let state = Arc::clone(&self.state);
        let event_tx = self.event_tx.clone();
        let period = self.config.tick_interval();
        let period_ms = self.config.tick_interval_ms;

        self.tick = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let advanced = {
                    let mut state = state.write();
                    if state.generation != generation || !state.is_recording() {
                        break;
                    }
                    let before = state.elapsed_seconds;
                    state.elapsed_ms += period_ms;
                    state.elapsed_seconds = state.elapsed_ms / 1000;
                    (state.elapsed_seconds != before).then_some(state.elapsed_seconds)
                };
                if let Some(elapsed) = advanced {
                    let _ = event_tx.send(SessionEvent::Tick(elapsed));
                }
            }
            tracing::debug!("Timer for session {} finished", generation);
        }));
    }

    fn cancel_tick(&mut self) {
        if let Some(handle) = self.tick.take() {
            handle.abort();
        }
    }

    /// Log a failed operation and pass the error back to the caller
    fn report(&self, context: &str, error: AppError) -> AppError {
        tracing::error!(code = error.code(), "{}: {}", context, error);
        let _ = self.event_tx.send(SessionEvent::Error(error.to_string()));
        error
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.cancel_tick();
    }
}
