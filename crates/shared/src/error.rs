use thiserror::Error;

/// Failure of a call to the remote analysis service.
///
/// The `Display` text is what the analysis view shows after its `"Error: "`
/// prefix, so a bad status renders as the raw response body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Transport(String),
    #[error("invalid response payload: {0}")]
    Decode(String),
}

impl ServiceError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUriError {
    #[error("not a data uri")]
    MissingScheme,
    #[error("data uri is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    InvalidPayload(String),
}
