//! Final analysis submission.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::{domain::AnalysisResult, error::ServiceError};
use tracing::{debug, info, warn};

use crate::{
    preview::RequestSequence,
    transport::{AnalysisService, AnalyzeRequest},
    types::{SharedInputs, SharedSurface},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// No file selected; nothing was sent and the display is unchanged.
    MissingFile,
    /// Another submission is still in flight.
    Busy,
    Displayed(AnalysisResult),
    Failed(ServiceError),
}

pub struct AnalysisController {
    service: Arc<dyn AnalysisService>,
    inputs: SharedInputs,
    surface: SharedSurface,
    preview_sequence: Arc<RequestSequence>,
    in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl AnalysisController {
    pub fn new(
        service: Arc<dyn AnalysisService>,
        inputs: SharedInputs,
        surface: SharedSurface,
        preview_sequence: Arc<RequestSequence>,
    ) -> Self {
        Self {
            service,
            inputs,
            surface,
            preview_sequence,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    async fn build_request(&self) -> Option<AnalyzeRequest> {
        let inputs = self.inputs.lock().await;
        let file = inputs.file.clone()?;
        Some(AnalyzeRequest {
            file,
            k: inputs.sliders.k,
            b_weight: inputs.sliders.b_weight,
        })
    }

    pub async fn submit(&self) -> SubmitOutcome {
        if self.is_in_flight() {
            debug!("submit ignored: analysis already in flight");
            return SubmitOutcome::Busy;
        }
        let Some(request) = self.build_request().await else {
            debug!("submit ignored: no file selected");
            return SubmitOutcome::MissingFile;
        };
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return SubmitOutcome::Busy;
        }
        let _guard = InFlightGuard(&self.in_flight);

        // A preview still in flight must not cover the spinner or the result.
        self.preview_sequence.invalidate();
        self.surface.lock().await.begin_loading();

        info!(
            k = request.k,
            b_weight = request.b_weight,
            file = %request.file.filename,
            bytes = request.file.len(),
            "submitting analysis"
        );
        let outcome = self.service.analyze(request).await;

        let mut surface = self.surface.lock().await;
        surface.finish_loading();
        match outcome {
            Ok(result) => {
                info!(score = ?result.score, b_value = ?result.b_value, "analysis completed");
                surface.show_result(&result);
                SubmitOutcome::Displayed(result)
            }
            Err(error) => {
                warn!(status = ?error.status_code(), %error, "analysis failed");
                surface.show_error(&error);
                SubmitOutcome::Failed(error)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/analysis_tests.rs"]
mod tests;
