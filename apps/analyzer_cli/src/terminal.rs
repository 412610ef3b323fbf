//! Terminal implementations of the UI ports.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
};

use anyhow::{Context, Result};
use client_core::{PreviewStore, UiPorts};
use shared::{
    domain::{DisplayState, PreviewHandle, PreviewImage},
    protocol::{decode_data_uri, extension_for_media_type},
};
use tracing::warn;

/// Prints every display change as one line and saves result images to disk.
///
/// Output and image writes are blocking `std` I/O made while the session holds
/// its display lock; each is a single small file per display change.
pub struct TerminalUi<W: Write + Send> {
    out: Mutex<W>,
    output_dir: PathBuf,
}

impl TerminalUi<io::Stdout> {
    pub fn stdout(output_dir: impl Into<PathBuf>) -> Self {
        Self::new(io::stdout(), output_dir)
    }
}

impl<W: Write + Send> TerminalUi<W> {
    pub fn new(out: W, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            out: Mutex::new(out),
            output_dir: output_dir.into(),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn line(&self, text: &str) {
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(error) = writeln!(out, "{text}").and_then(|()| out.flush()) {
            warn!(%error, "failed to write to terminal");
        }
    }

    fn describe(&self, state: &DisplayState) -> String {
        match state {
            DisplayState::Idle => "[display] idle".to_string(),
            DisplayState::Prompt(message) => format!("[display] {message}"),
            DisplayState::Loading => "[display] analyzing...".to_string(),
            DisplayState::PreviewImage(handle) => format!("[display] preview {}", handle.as_str()),
            DisplayState::ResultImage { image_src, score } => {
                let score = score
                    .map(|score| format!(" (score {score:.1})"))
                    .unwrap_or_default();
                match save_result_image(&self.output_dir, image_src) {
                    Ok(path) => format!("[display] result {}{score}", path.display()),
                    Err(error) => {
                        warn!("failed to save result image: {error:#}");
                        format!("[display] result image could not be saved{score}")
                    }
                }
            }
            DisplayState::Error(message) => format!("[display] {message}"),
        }
    }
}

impl<W: Write + Send> UiPorts for TerminalUi<W> {
    fn render_display(&self, state: &DisplayState) {
        let text = self.describe(state);
        self.line(&text);
    }

    fn set_spinner_visible(&self, visible: bool) {
        if visible {
            self.line("[spinner] on");
        } else {
            self.line("[spinner] off");
        }
    }

    fn set_submit_enabled(&self, enabled: bool) {
        if enabled {
            self.line("[submit] enabled");
        } else {
            self.line("[submit] disabled");
        }
    }

    fn set_k_label(&self, label: &str) {
        self.line(&format!("[k] {label}"));
    }

    fn set_b_weight_label(&self, label: &str) {
        self.line(&format!("[b_weight] {label}"));
    }
}

/// Decodes a data URI result and writes it as `result.<ext>` under `dir`.
pub fn save_result_image(dir: &Path, image_src: &str) -> Result<PathBuf> {
    let image = decode_data_uri(image_src).context("result image is not a base64 data uri")?;
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
    let path = dir.join(format!(
        "result.{}",
        extension_for_media_type(&image.media_type)
    ));
    fs::write(&path, &image.bytes)
        .with_context(|| format!("failed to write result image '{}'", path.display()))?;
    Ok(path)
}

/// Keeps each preview in its own file; released previews are deleted.
///
/// `create` and `release` block on the filesystem under the display lock.
pub struct TempFilePreviewStore {
    dir: PathBuf,
    next_id: AtomicU64,
}

impl TempFilePreviewStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next_id: AtomicU64::new(0),
        }
    }
}

impl PreviewStore for TempFilePreviewStore {
    fn create(&self, image: &PreviewImage) -> Result<PreviewHandle> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create preview directory '{}'", self.dir.display())
        })?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let extension = image
            .content_type
            .as_deref()
            .map(extension_for_media_type)
            .unwrap_or("png");
        let path = self.dir.join(format!("preview-{id}.{extension}"));
        fs::write(&path, &image.bytes)
            .with_context(|| format!("failed to write preview '{}'", path.display()))?;
        Ok(PreviewHandle(path.to_string_lossy().into_owned()))
    }

    fn release(&self, handle: &PreviewHandle) {
        if let Err(error) = fs::remove_file(handle.as_str()) {
            warn!(handle = handle.as_str(), %error, "failed to remove preview file");
        }
    }
}
