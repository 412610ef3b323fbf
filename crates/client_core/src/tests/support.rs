use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{AnalysisResult, DisplayState, PreviewHandle, PreviewImage, SelectedFile},
    error::ServiceError,
};
use tokio::sync::oneshot;

use crate::{
    transport::{AnalysisService, AnalyzeRequest, PreviewRequest},
    ui::{PreviewStore, UiPorts},
};

type PreviewReply = oneshot::Sender<Result<PreviewImage, ServiceError>>;
type AnalyzeReply = oneshot::Sender<Result<AnalysisResult, ServiceError>>;

/// Service double whose calls stay pending until the test answers them.
#[derive(Default)]
pub(crate) struct ScriptedService {
    previews: Mutex<Vec<(PreviewRequest, Option<PreviewReply>)>>,
    analyses: Mutex<Vec<(AnalyzeRequest, Option<AnalyzeReply>)>>,
}

impl ScriptedService {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn preview_calls(&self) -> Vec<(String, u32)> {
        self.previews
            .lock()
            .expect("lock")
            .iter()
            .map(|(request, _)| (request.file.filename.clone(), request.k))
            .collect()
    }

    pub(crate) fn analyze_calls(&self) -> Vec<(String, u32, u32)> {
        self.analyses
            .lock()
            .expect("lock")
            .iter()
            .map(|(request, _)| (request.file.filename.clone(), request.k, request.b_weight))
            .collect()
    }

    pub(crate) fn reply_preview(&self, index: usize, reply: Result<PreviewImage, ServiceError>) {
        let tx = self.previews.lock().expect("lock")[index]
            .1
            .take()
            .expect("preview already answered");
        let _ = tx.send(reply);
    }

    pub(crate) fn reply_analyze(&self, index: usize, reply: Result<AnalysisResult, ServiceError>) {
        let tx = self.analyses.lock().expect("lock")[index]
            .1
            .take()
            .expect("analysis already answered");
        let _ = tx.send(reply);
    }
}

#[async_trait]
impl AnalysisService for ScriptedService {
    async fn preview_clusters(
        &self,
        request: PreviewRequest,
    ) -> Result<PreviewImage, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.previews.lock().expect("lock").push((request, Some(tx)));
        rx.await
            .unwrap_or_else(|_| Err(ServiceError::transport("reply dropped")))
    }

    async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisResult, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.analyses.lock().expect("lock").push((request, Some(tx)));
        rx.await
            .unwrap_or_else(|_| Err(ServiceError::transport("reply dropped")))
    }
}

#[derive(Default)]
pub(crate) struct RecordingUi {
    renders: Mutex<Vec<DisplayState>>,
    spinner: Mutex<Vec<bool>>,
    submit_enabled: Mutex<Option<bool>>,
    k_label: Mutex<Option<String>>,
    b_weight_label: Mutex<Option<String>>,
}

impl RecordingUi {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn renders(&self) -> Vec<DisplayState> {
        self.renders.lock().expect("lock").clone()
    }

    pub(crate) fn last_render(&self) -> Option<DisplayState> {
        self.renders.lock().expect("lock").last().cloned()
    }

    pub(crate) fn spinner_visible(&self) -> bool {
        self.spinner
            .lock()
            .expect("lock")
            .last()
            .copied()
            .unwrap_or(false)
    }

    pub(crate) fn spinner_history(&self) -> Vec<bool> {
        self.spinner.lock().expect("lock").clone()
    }

    pub(crate) fn submit_enabled(&self) -> Option<bool> {
        *self.submit_enabled.lock().expect("lock")
    }

    pub(crate) fn k_label(&self) -> Option<String> {
        self.k_label.lock().expect("lock").clone()
    }

    pub(crate) fn b_weight_label(&self) -> Option<String> {
        self.b_weight_label.lock().expect("lock").clone()
    }
}

impl UiPorts for RecordingUi {
    fn render_display(&self, state: &DisplayState) {
        self.renders.lock().expect("lock").push(state.clone());
    }

    fn set_spinner_visible(&self, visible: bool) {
        self.spinner.lock().expect("lock").push(visible);
    }

    fn set_submit_enabled(&self, enabled: bool) {
        *self.submit_enabled.lock().expect("lock") = Some(enabled);
    }

    fn set_k_label(&self, label: &str) {
        *self.k_label.lock().expect("lock") = Some(label.to_string());
    }

    fn set_b_weight_label(&self, label: &str) {
        *self.b_weight_label.lock().expect("lock") = Some(label.to_string());
    }
}

/// Preview store that tracks which handles are still alive.
#[derive(Default)]
pub(crate) struct CountingPreviewStore {
    next_id: AtomicU64,
    outstanding: Mutex<HashSet<String>>,
    released: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl CountingPreviewStore {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.outstanding.lock().expect("lock").len()
    }

    pub(crate) fn created(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }

    pub(crate) fn released(&self) -> Vec<String> {
        self.released.lock().expect("lock").clone()
    }

    pub(crate) fn fail_creation(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl PreviewStore for CountingPreviewStore {
    fn create(&self, image: &PreviewImage) -> Result<PreviewHandle> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("preview store unavailable"));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let handle = format!(
            "preview-{id}:{}",
            String::from_utf8_lossy(&image.bytes)
        );
        self.outstanding
            .lock()
            .expect("lock")
            .insert(handle.clone());
        Ok(PreviewHandle(handle))
    }

    fn release(&self, handle: &PreviewHandle) {
        self.outstanding
            .lock()
            .expect("lock")
            .remove(handle.as_str());
        self.released
            .lock()
            .expect("lock")
            .push(handle.as_str().to_string());
    }
}

pub(crate) const TEST_DEBOUNCE: Duration = Duration::from_millis(300);

pub(crate) fn image_file(name: &str) -> SelectedFile {
    SelectedFile::new(name, Some("image/png".to_string()), name.as_bytes().to_vec())
}

pub(crate) fn preview_bytes(label: &str) -> PreviewImage {
    PreviewImage {
        content_type: Some("image/png".to_string()),
        bytes: label.as_bytes().to_vec(),
    }
}

pub(crate) fn analysis_result(src: &str, score: Option<f64>) -> AnalysisResult {
    AnalysisResult {
        image_base64: src.to_string(),
        score,
        b_value: None,
        golden_b: None,
    }
}

/// Lets spawned tasks run; with a paused clock this also advances time.
pub(crate) async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Waits out the debounce window plus slack.
pub(crate) async fn wait_quiet_period() {
    tokio::time::sleep(TEST_DEBOUNCE + Duration::from_millis(50)).await;
}

/// True when the display shows the preview whose payload was `label`.
pub(crate) fn shows_preview(state: &DisplayState, label: &str) -> bool {
    matches!(state, DisplayState::PreviewImage(handle) if handle.as_str().ends_with(&format!(":{label}")))
}
