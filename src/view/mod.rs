//! View layer
//!
//! The display surface the controller binds media to, and the panel model
//! the UI renders.

pub mod panel;
pub mod surface;

pub use panel::{ButtonView, ControlPanel, DeviceOption, DownloadLink, PanelBody, PanelView};
pub use surface::{DisplaySurface, PreviewSurface, SurfaceSource};
