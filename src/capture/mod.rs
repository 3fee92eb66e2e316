//! Capture backends
//!
//! The recording library is consumed through the traits in [`traits`];
//! [`simulated`] provides an in-process implementation.

pub mod simulated;
pub mod traits;

pub use simulated::{SimulatedBackend, SimulatedSettings};
pub use traits::{
    CaptureError, CaptureResult, DeviceDescriptor, DeviceKind, DeviceList, LiveStream,
    MediaBackend, PermissionStatus, Recorder,
};
