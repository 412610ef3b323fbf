//! HTTP boundary to the remote analysis service.

use async_trait::async_trait;
use reqwest::{
    header::CONTENT_TYPE,
    multipart::{Form, Part},
    Client, Response,
};
use shared::{
    domain::{AnalysisResult, PreviewImage, SelectedFile},
    error::ServiceError,
    protocol::{
        AnalyzeResponse, ANALYZE_PATH, DEFAULT_UPLOAD_MIME, FIELD_B_WEIGHT, FIELD_FILE, FIELD_K,
        PREVIEW_PATH,
    },
};

#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub file: SelectedFile,
    pub k: u32,
}

#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub file: SelectedFile,
    pub k: u32,
    pub b_weight: u32,
}

#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Low-cost cluster visualization for `file` at `k` clusters.
    async fn preview_clusters(&self, request: PreviewRequest)
        -> Result<PreviewImage, ServiceError>;
    /// Full spiral analysis producing an embeddable result image.
    async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisResult, ServiceError>;
}

pub struct HttpAnalysisService {
    http: Client,
    base_url: String,
}

impl HttpAnalysisService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_form(&self, path: &str, form: Form) -> Result<Response, ServiceError> {
        self.http
            .post(self.endpoint(path))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::transport(e.to_string()))
    }
}

fn file_part(file: &SelectedFile) -> Part {
    let mime = file.mime_type.as_deref().unwrap_or(DEFAULT_UPLOAD_MIME);
    let part = Part::bytes(file.contents.to_vec()).file_name(file.filename.clone());
    match part.mime_str(mime) {
        Ok(part) => part,
        Err(error) => {
            tracing::debug!(%error, mime, "ignoring unusable upload mime type");
            Part::bytes(file.contents.to_vec()).file_name(file.filename.clone())
        }
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn preview_clusters(
        &self,
        request: PreviewRequest,
    ) -> Result<PreviewImage, ServiceError> {
        let form = Form::new()
            .part(FIELD_FILE, file_part(&request.file))
            .text(FIELD_K, request.k.to_string());

        let response = self.post_form(PREVIEW_PATH, form).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::status(status.as_u16(), String::new()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServiceError::transport(e.to_string()))?;

        Ok(PreviewImage {
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisResult, ServiceError> {
        let form = Form::new()
            .part(FIELD_FILE, file_part(&request.file))
            .text(FIELD_K, request.k.to_string())
            .text(FIELD_B_WEIGHT, request.b_weight.to_string());

        let response = self.post_form(ANALYZE_PATH, form).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| ServiceError::transport(e.to_string()))?;
            return Err(ServiceError::status(status.as_u16(), body));
        }

        let payload: AnalyzeResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                ServiceError::Decode(e.to_string())
            } else {
                ServiceError::transport(e.to_string())
            }
        })?;
        Ok(payload.into())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
