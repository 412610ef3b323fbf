//! The single display area shared by both controllers.

use std::sync::Arc;

use shared::domain::{AnalysisResult, DisplayState, PreviewImage};
use tracing::{debug, warn};

use crate::ui::{PreviewStore, UiPorts};

pub const PREVIEW_PROMPT: &str = "Select K value for preview.";
pub const ERROR_PREFIX: &str = "Error: ";

pub struct DisplaySurface {
    ui: Arc<dyn UiPorts>,
    previews: Arc<dyn PreviewStore>,
    state: DisplayState,
    spinner_visible: bool,
    submit_enabled: bool,
}

impl DisplaySurface {
    pub fn new(ui: Arc<dyn UiPorts>, previews: Arc<dyn PreviewStore>) -> Self {
        ui.render_display(&DisplayState::Idle);
        ui.set_spinner_visible(false);
        ui.set_submit_enabled(true);
        Self {
            ui,
            previews,
            state: DisplayState::Idle,
            spinner_visible: false,
            submit_enabled: true,
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn spinner_visible(&self) -> bool {
        self.spinner_visible
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn show_prompt(&mut self, message: impl Into<String>) {
        self.transition(DisplayState::Prompt(message.into()));
    }

    /// Clears the result area and shows the spinner until [`Self::finish_loading`].
    pub fn begin_loading(&mut self) {
        self.set_spinner(true);
        self.set_submit(false);
        self.transition(DisplayState::Loading);
    }

    pub fn finish_loading(&mut self) {
        self.set_spinner(false);
        self.set_submit(true);
    }

    /// Shows a freshly received preview, releasing the one it replaces.
    ///
    /// A preview whose handle cannot be created leaves the display untouched.
    pub fn show_preview(&mut self, image: &PreviewImage) {
        match self.previews.create(image) {
            Ok(handle) => {
                debug!(handle = handle.as_str(), bytes = image.bytes.len(), "showing preview");
                self.transition(DisplayState::PreviewImage(handle));
            }
            Err(error) => warn!(%error, "failed to materialize preview image"),
        }
    }

    pub fn show_result(&mut self, result: &AnalysisResult) {
        self.transition(DisplayState::ResultImage {
            image_src: result.image_base64.clone(),
            score: result.score,
        });
    }

    pub fn show_error(&mut self, description: impl std::fmt::Display) {
        self.transition(DisplayState::Error(format!("{ERROR_PREFIX}{description}")));
    }

    fn transition(&mut self, next: DisplayState) {
        let previous = std::mem::replace(&mut self.state, next);
        self.ui.render_display(&self.state);
        if let Some(handle) = previous.preview_handle() {
            self.previews.release(handle);
        }
    }

    fn set_spinner(&mut self, visible: bool) {
        self.spinner_visible = visible;
        self.ui.set_spinner_visible(visible);
    }

    fn set_submit(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
        self.ui.set_submit_enabled(enabled);
    }
}

impl Drop for DisplaySurface {
    fn drop(&mut self) {
        if let Some(handle) = self.state.preview_handle() {
            self.previews.release(handle);
        }
    }
}
