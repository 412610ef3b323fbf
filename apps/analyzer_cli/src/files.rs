use std::path::Path;

use anyhow::{Context, Result};
use shared::domain::SelectedFile;

/// Reads an image from disk into a form selection.
pub async fn load_selected_file(path: &Path) -> Result<SelectedFile> {
    let contents = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let mime_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string());
    Ok(SelectedFile::new(filename, mime_type, contents))
}
