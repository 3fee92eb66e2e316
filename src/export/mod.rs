//! Artifact export
//!
//! Saves a recorded artifact to disk under a name matching its encoding.

pub mod download;

pub use download::{download_file_name, export_artifact, ArtifactFormat};
