use crate::error::EngineError;
use crate::render::BinaryArtifact;
use log::info;
use std::path::{Path, PathBuf};

/// Saves the artifact as `<dir>/<file_name>`, creating `dir` if needed.
pub async fn download_to_dir(artifact: &BinaryArtifact, dir: &Path) -> Result<PathBuf, EngineError> {
    let failed = |e: std::io::Error| EngineError::DownloadFailed(format!("{}: {}", dir.display(), e));
    tokio::fs::create_dir_all(dir).await.map_err(failed)?;
    let path = dir.join(&artifact.file_name);
    tokio::fs::write(&path, &artifact.bytes).await.map_err(failed)?;
    info!("Saved {} ({} bytes)", path.display(), artifact.bytes.len());
    Ok(path)
}
