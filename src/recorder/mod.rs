//! Recording session module
//!
//! - SessionState and the Idle/Previewing/Recording state machine
//! - SessionController driving the recorder handle and the timer

pub mod controller;
pub mod state;

pub use controller::{SessionController, SessionEvent};
pub use state::{RecordedArtifact, RecorderOptions, SessionPhase, SessionState};
