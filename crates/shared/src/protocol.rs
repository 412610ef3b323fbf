use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::{domain::AnalysisResult, error::DataUriError};

pub const PREVIEW_PATH: &str = "/preview_clusters/";
pub const ANALYZE_PATH: &str = "/analyze/";

pub const FIELD_FILE: &str = "file";
pub const FIELD_K: &str = "k";
pub const FIELD_B_WEIGHT: &str = "b_weight";

pub const DEFAULT_UPLOAD_MIME: &str = "application/octet-stream";

/// JSON body returned by a successful analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub image_base64: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub b_value: Option<f64>,
    #[serde(default)]
    pub golden_b: Option<f64>,
}

impl From<AnalyzeResponse> for AnalysisResult {
    fn from(value: AnalyzeResponse) -> Self {
        Self {
            image_base64: value.image_base64,
            score: value.score,
            b_value: value.b_value,
            golden_b: value.golden_b,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Decodes a `data:<media>;base64,<payload>` string.
pub fn decode_data_uri(raw: &str) -> Result<DataUri, DataUriError> {
    let rest = raw
        .trim()
        .strip_prefix("data:")
        .ok_or(DataUriError::MissingScheme)?;
    let (meta, payload) = rest.split_once(',').ok_or(DataUriError::MissingScheme)?;
    let media_type = meta
        .strip_suffix(";base64")
        .ok_or(DataUriError::NotBase64)?;

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| DataUriError::InvalidPayload(e.to_string()))?;

    Ok(DataUri {
        media_type: if media_type.is_empty() {
            "text/plain".to_string()
        } else {
            media_type.to_string()
        },
        bytes,
    })
}

/// File extension matching an image media type, used when saving results.
pub fn extension_for_media_type(media_type: &str) -> &'static str {
    match media_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        _ => "png",
    }
}
