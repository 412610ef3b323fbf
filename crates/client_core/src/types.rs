use std::sync::Arc;

use shared::domain::{SelectedFile, SliderState};
use tokio::sync::Mutex;

use crate::surface::DisplaySurface;

/// Form values read by both controllers when they build a request.
#[derive(Debug, Clone, Default)]
pub struct FormInputs {
    pub sliders: SliderState,
    pub file: Option<SelectedFile>,
}

pub type SharedInputs = Arc<Mutex<FormInputs>>;
pub type SharedSurface = Arc<Mutex<DisplaySurface>>;
