//! Error type for calls to the detection service

use thiserror::Error;

/// Why a service call produced no usable result
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid server url: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The service answered but did not report success. `raw` is the body as received.
    #[error("backend reported failure: {raw}")]
    Backend { raw: String },

    #[error("request ended without a result")]
    Aborted,
}

impl ApiError {
    /// Backend failures carry a body worth showing; everything else is a connectivity problem
    pub fn backend_body(&self) -> Option<&str> {
        match self {
            ApiError::Backend { raw } => Some(raw),
            _ => None,
        }
    }
}
