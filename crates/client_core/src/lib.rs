//! Client-side controllers for the spiral composition analyzer.
//!
//! A front end forwards form events (file picked, sliders moved, submit) to an
//! [`AnalyzerSession`] and renders what the session pushes through
//! [`UiPorts`]. Live previews are debounced and guarded against out-of-order
//! responses; final analyses report failures in the result area.

pub mod analysis;
pub mod debounce;
pub mod labels;
pub mod preview;
pub mod session;
pub mod surface;
pub mod transport;
pub mod types;
pub mod ui;

pub use analysis::{AnalysisController, SubmitOutcome};
pub use debounce::Debouncer;
pub use labels::{b_weight_label, k_label, BWeightLevel};
pub use preview::{PreviewController, RequestSequence, DEFAULT_PREVIEW_DEBOUNCE};
pub use session::{AnalyzerSession, ControllerOptions, SessionSnapshot};
pub use surface::{DisplaySurface, ERROR_PREFIX, PREVIEW_PROMPT};
pub use transport::{AnalysisService, AnalyzeRequest, HttpAnalysisService, PreviewRequest};
pub use types::FormInputs;
pub use ui::{HeadlessUi, PreviewStore, UiPorts};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
