//! Scripted demo session against the simulated recording library.
//!
//! Walks through permission, preview, recording, stop and download, printing
//! the panel after every step as JSON.

use anyhow::{bail, Context};
use camera_recorder_demo_lib::capture::{SimulatedBackend, SimulatedSettings};
use camera_recorder_demo_lib::commands::{dispatch, render, UserAction};
use camera_recorder_demo_lib::config::AppConfig;
use camera_recorder_demo_lib::recorder::{SessionController, SessionPhase};
use camera_recorder_demo_lib::view::{PanelView, PreviewSurface};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(version, about = "Camera recorder demo control panel")]
struct Cli {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds to record for
    #[arg(long, default_value_t = 3)]
    duration: u64,

    /// Directory the recording is downloaded into
    #[arg(long, default_value = ".")]
    output: PathBuf,

    /// Camera to select before recording
    #[arg(long)]
    video_device: Option<String>,

    /// Microphone to select before recording
    #[arg(long)]
    audio_device: Option<String>,

    /// Simulate the user denying the permission prompt
    #[arg(long)]
    deny_permission: bool,

    /// Simulate a machine with no cameras or microphones
    #[arg(long)]
    no_devices: bool,
}

fn print_view(step: &str, view: &PanelView) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(view).context("failed to serialize panel")?;
    println!("== {step}\n{json}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    camera_recorder_demo_lib::init_tracing();
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(cli.config.as_deref())
        .with_context(|| format!("failed to load config {:?}", cli.config))?;

    let mut settings = SimulatedSettings {
        grant_on_request: !cli.deny_permission,
        latency: Duration::from_millis(50),
        ..Default::default()
    };
    if cli.no_devices {
        settings.devices = Default::default();
    }

    let backend = Arc::new(SimulatedBackend::new(settings));
    let surface = Arc::new(PreviewSurface::new());
    let mut controller = SessionController::new(backend, surface, config)
        .context("failed to create session controller")?;

    // Mount runs the permission gate; the prompt only appears if it fails
    let granted = match controller.initialize().await {
        Ok(granted) => granted,
        Err(e) => {
            tracing::warn!("Permission check failed: {}", e);
            false
        }
    };
    print_view("mount", &render(&controller))?;

    if !granted {
        let outcome = dispatch(&mut controller, UserAction::GrantPermission).await;
        print_view("grant permission", &outcome.view)?;
        if !controller.with_state(|state| state.permissions_granted) {
            tracing::warn!("Permission not granted; nothing to record");
            return Ok(());
        }
    }

    if let Some(device_id) = cli.video_device {
        let outcome = dispatch(&mut controller, UserAction::SelectVideoDevice { device_id }).await;
        print_view("select camera", &outcome.view)?;
    }
    if let Some(device_id) = cli.audio_device {
        let outcome = dispatch(&mut controller, UserAction::SelectAudioDevice { device_id }).await;
        print_view("select microphone", &outcome.view)?;
    }

    let outcome = dispatch(&mut controller, UserAction::TogglePreview).await;
    print_view("start preview", &outcome.view)?;

    let outcome = dispatch(&mut controller, UserAction::StartRecording).await;
    print_view("start recording", &outcome.view)?;
    if controller.phase() != SessionPhase::Recording {
        bail!("recording did not start");
    }

    tokio::time::sleep(Duration::from_secs(cli.duration)).await;
    print_view("recording", &render(&controller))?;

    let outcome = dispatch(&mut controller, UserAction::StopRecording).await;
    print_view("stop recording", &outcome.view)?;

    let outcome = dispatch(&mut controller, UserAction::Download { dir: cli.output }).await;
    match outcome.exported {
        Some(path) => println!("Saved recording to {}", path.display()),
        None => bail!("no recording to download"),
    }

    Ok(())
}
