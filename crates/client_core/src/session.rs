//! Wiring of form events to the preview and analysis controllers.

use std::{sync::Arc, time::Duration};

use shared::domain::{DisplayState, SelectedFile, SliderState};
use tokio::sync::Mutex;

use crate::{
    analysis::{AnalysisController, SubmitOutcome},
    labels::{b_weight_label, k_label},
    preview::{PreviewController, DEFAULT_PREVIEW_DEBOUNCE},
    surface::DisplaySurface,
    transport::AnalysisService,
    types::{FormInputs, SharedInputs, SharedSurface},
    ui::{PreviewStore, UiPorts},
};

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub preview_debounce: Duration,
    pub initial_sliders: SliderState,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            preview_debounce: DEFAULT_PREVIEW_DEBOUNCE,
            initial_sliders: SliderState::default(),
        }
    }
}

/// Point-in-time view of the form and the result area.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub sliders: SliderState,
    pub filename: Option<String>,
    pub display: DisplayState,
    pub spinner_visible: bool,
    pub submit_enabled: bool,
    pub k_label: String,
    pub b_weight_label: &'static str,
}

pub struct AnalyzerSession {
    ui: Arc<dyn UiPorts>,
    inputs: SharedInputs,
    surface: SharedSurface,
    preview: Arc<PreviewController>,
    analysis: AnalysisController,
}

impl AnalyzerSession {
    /// Must be called from within a tokio runtime.
    pub fn new(
        service: Arc<dyn AnalysisService>,
        ui: Arc<dyn UiPorts>,
        previews: Arc<dyn PreviewStore>,
        options: ControllerOptions,
    ) -> Arc<Self> {
        let sliders = options.initial_sliders;
        ui.set_k_label(&k_label(sliders.k));
        ui.set_b_weight_label(b_weight_label(sliders.b_weight));

        let inputs: SharedInputs = Arc::new(Mutex::new(FormInputs {
            sliders,
            file: None,
        }));
        let surface: SharedSurface =
            Arc::new(Mutex::new(DisplaySurface::new(ui.clone(), previews)));
        let preview = PreviewController::new(
            service.clone(),
            ui.clone(),
            inputs.clone(),
            surface.clone(),
            options.preview_debounce,
        );
        let analysis =
            AnalysisController::new(service, inputs.clone(), surface.clone(), preview.sequence());

        Arc::new(Self {
            ui,
            inputs,
            surface,
            preview,
            analysis,
        })
    }

    pub async fn select_file(&self, file: Option<SelectedFile>) {
        self.preview.select_file(file).await;
    }

    pub async fn set_k(&self, k: u32) {
        self.preview.set_k(k).await;
    }

    /// Only relabels; the weight is sent with the next submission.
    pub async fn set_b_weight(&self, b_weight: u32) {
        self.inputs.lock().await.sliders.b_weight = b_weight;
        self.ui.set_b_weight_label(b_weight_label(b_weight));
    }

    pub async fn submit(&self) -> SubmitOutcome {
        self.analysis.submit().await
    }

    pub fn is_submitting(&self) -> bool {
        self.analysis.is_in_flight()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let (sliders, filename) = {
            let inputs = self.inputs.lock().await;
            (
                inputs.sliders,
                inputs.file.as_ref().map(|file| file.filename.clone()),
            )
        };
        let surface = self.surface.lock().await;
        SessionSnapshot {
            sliders,
            filename,
            display: surface.state().clone(),
            spinner_visible: surface.spinner_visible(),
            submit_enabled: surface.submit_enabled(),
            k_label: k_label(sliders.k),
            b_weight_label: b_weight_label(sliders.b_weight),
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
