//! Camera Recorder Demo - a control panel for a camera/microphone recorder.
//!
//! This is the library crate behind the demo binary. It provides the
//! session controller, the capture backend traits and the panel view model.

pub mod capture;
pub mod commands;
pub mod config;
pub mod export;
pub mod recorder;
pub mod utils;
pub mod view;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "camera_recorder_demo=debug,camera_recorder_demo_lib=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if result.is_ok() {
        tracing::info!("Starting Camera Recorder Demo v{}", env!("CARGO_PKG_VERSION"));
    }
}
