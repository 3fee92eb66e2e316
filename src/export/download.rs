//! Download of recorded artifacts

use crate::recorder::state::RecordedArtifact;
use crate::utils::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Container format of a recorded artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Webm,
    Mp4,
    Matroska,
    Unknown,
}

impl ArtifactFormat {
    /// Map a mime type such as `video/webm;codecs=vp9` to a format
    pub fn from_mime(mime_type: &str) -> Self {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "video/webm" | "audio/webm" => ArtifactFormat::Webm,
            "video/mp4" | "audio/mp4" => ArtifactFormat::Mp4,
            "video/x-matroska" => ArtifactFormat::Matroska,
            _ => ArtifactFormat::Unknown,
        }
    }

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Webm => "webm",
            ArtifactFormat::Mp4 => "mp4",
            ArtifactFormat::Matroska => "mkv",
            ArtifactFormat::Unknown => "bin",
        }
    }
}

/// File name offered for download, e.g. `recorded-video.webm`
pub fn download_file_name(stem: &str, mime_type: &str) -> String {
    format!("{}.{}", stem, ArtifactFormat::from_mime(mime_type).extension())
}

/// Write the artifact into `dir`, returning the path written
pub fn export_artifact(
    artifact: Option<&RecordedArtifact>,
    dir: &Path,
    stem: &str,
) -> AppResult<PathBuf> {
    let artifact = artifact.ok_or(AppError::NoArtifact)?;

    fs::create_dir_all(dir)?;
    let path = dir.join(download_file_name(stem, &artifact.mime_type));
    fs::write(&path, &artifact.data)?;

    tracing::info!(
        "Exported artifact {} ({} bytes) to {:?}",
        artifact.id,
        artifact.size_bytes(),
        path
    );
    Ok(path)
}
