use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Current position of the two analysis sliders.
///
/// `k == 0` selects automatic clustering, for which no live preview exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderState {
    pub k: u32,
    pub b_weight: u32,
}

impl SliderState {
    pub const AUTO_K: u32 = 0;

    pub fn is_auto_k(&self) -> bool {
        self.k == Self::AUTO_K
    }
}

impl Default for SliderState {
    fn default() -> Self {
        Self {
            k: Self::AUTO_K,
            b_weight: 20_000,
        }
    }
}

/// The image chosen by the user. Replaced wholesale on every selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub filename: String,
    pub mime_type: Option<String>,
    pub contents: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(
        filename: impl Into<String>,
        mime_type: Option<String>,
        contents: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            mime_type,
            contents: contents.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// Binary payload returned by the preview endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Reference to a transient resource holding a displayed preview image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewHandle(pub String);

impl PreviewHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub image_base64: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub golden_b: Option<f64>,
}

/// What the result area currently shows. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
    Idle,
    Prompt(String),
    Loading,
    PreviewImage(PreviewHandle),
    ResultImage {
        image_src: String,
        score: Option<f64>,
    },
    Error(String),
}

impl DisplayState {
    pub fn preview_handle(&self) -> Option<&PreviewHandle> {
        match self {
            DisplayState::PreviewImage(handle) => Some(handle),
            _ => None,
        }
    }
}
