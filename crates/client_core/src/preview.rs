//! Debounced live preview with stale-response suppression.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
    time::Duration,
};

use shared::{
    domain::{PreviewImage, SelectedFile},
    error::ServiceError,
};
use tracing::{debug, warn};

use crate::{
    debounce::Debouncer,
    labels::k_label,
    surface::PREVIEW_PROMPT,
    transport::{AnalysisService, PreviewRequest},
    types::{SharedInputs, SharedSurface},
    ui::UiPorts,
};

pub const DEFAULT_PREVIEW_DEBOUNCE: Duration = Duration::from_millis(300);

/// Monotonic counter deciding which preview response may reach the display.
///
/// Only a response carrying the latest number is current. Advancing the
/// counter without issuing a request voids everything still in flight.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, seq: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == seq
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

pub struct PreviewController {
    service: Arc<dyn AnalysisService>,
    ui: Arc<dyn UiPorts>,
    inputs: SharedInputs,
    surface: SharedSurface,
    sequence: Arc<RequestSequence>,
    debouncer: Debouncer<()>,
}

impl PreviewController {
    /// Must be called from within a tokio runtime.
    pub fn new(
        service: Arc<dyn AnalysisService>,
        ui: Arc<dyn UiPorts>,
        inputs: SharedInputs,
        surface: SharedSurface,
        delay: Duration,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            // File and k changes share this one timer.
            let debouncer = Debouncer::new(delay, move |()| {
                if let Some(controller) = weak.upgrade() {
                    tokio::spawn(async move { controller.attempt_preview().await });
                }
            });
            Self {
                service,
                ui,
                inputs,
                surface,
                sequence: Arc::new(RequestSequence::default()),
                debouncer,
            }
        })
    }

    pub fn sequence(&self) -> Arc<RequestSequence> {
        self.sequence.clone()
    }

    pub fn debounce_delay(&self) -> Duration {
        self.debouncer.delay()
    }

    /// Replaces the selected file, resets the result area to the preview
    /// prompt and schedules a preview.
    pub async fn select_file(&self, file: Option<SelectedFile>) {
        {
            let mut inputs = self.inputs.lock().await;
            inputs.file = file;
            // Previews of the previous file must not replace the prompt.
            self.sequence.invalidate();
        }
        self.surface.lock().await.show_prompt(PREVIEW_PROMPT);
        self.debouncer.trigger(());
    }

    pub async fn set_k(&self, k: u32) {
        {
            let mut inputs = self.inputs.lock().await;
            inputs.sliders.k = k;
            if inputs.sliders.is_auto_k() {
                // Nothing will be issued, so void what is still in flight.
                self.sequence.invalidate();
            }
        }
        self.ui.set_k_label(&k_label(k));
        self.debouncer.trigger(());
    }

    /// Numbers the request while the inputs are locked, so a concurrent file
    /// or k change always lands after it in the sequence.
    async fn build_request(&self) -> Option<(u64, PreviewRequest)> {
        let inputs = self.inputs.lock().await;
        let file = inputs.file.as_ref()?;
        if inputs.sliders.is_auto_k() {
            return None;
        }
        let request = PreviewRequest {
            file: file.clone(),
            k: inputs.sliders.k,
        };
        Some((self.sequence.issue(), request))
    }

    /// Issues a preview for the current inputs, or does nothing when no file
    /// is selected or k is automatic.
    pub async fn attempt_preview(&self) {
        let Some((seq, request)) = self.build_request().await else {
            debug!("preview skipped: no file selected or k is automatic");
            return;
        };

        debug!(seq, k = request.k, file = %request.file.filename, "issuing preview request");
        let outcome = self.service.preview_clusters(request).await;
        self.apply_response(seq, outcome).await;
    }

    async fn apply_response(&self, seq: u64, outcome: Result<PreviewImage, ServiceError>) {
        match outcome {
            Ok(image) => {
                let mut surface = self.surface.lock().await;
                if !self.sequence.is_current(seq) {
                    debug!(seq, latest = self.sequence.latest(), "discarding stale preview");
                    return;
                }
                surface.show_preview(&image);
            }
            Err(ServiceError::Status { status, .. }) => {
                debug!(seq, status, "preview rejected by service; ignoring");
            }
            Err(error) => {
                warn!(seq, %error, "preview request failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/preview_tests.rs"]
mod tests;
