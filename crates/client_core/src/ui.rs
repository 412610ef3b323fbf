//! Ports through which the controllers reach the visible interface.
//!
//! Controllers never touch widgets directly; a front end implements these
//! traits and test code substitutes recording doubles.

use anyhow::Result;
use shared::domain::{DisplayState, PreviewHandle, PreviewImage};

pub trait UiPorts: Send + Sync {
    /// Replace the content of the result area.
    fn render_display(&self, state: &DisplayState);
    fn set_spinner_visible(&self, visible: bool);
    fn set_submit_enabled(&self, enabled: bool);
    fn set_k_label(&self, label: &str);
    fn set_b_weight_label(&self, label: &str);
}

/// Owner of the transient resources that back displayed preview images.
pub trait PreviewStore: Send + Sync {
    fn create(&self, image: &PreviewImage) -> Result<PreviewHandle>;
    fn release(&self, handle: &PreviewHandle);
}

/// Front end that discards every update.
pub struct HeadlessUi;

impl UiPorts for HeadlessUi {
    fn render_display(&self, _state: &DisplayState) {}
    fn set_spinner_visible(&self, _visible: bool) {}
    fn set_submit_enabled(&self, _enabled: bool) {}
    fn set_k_label(&self, _label: &str) {}
    fn set_b_weight_label(&self, _label: &str) {}
}
