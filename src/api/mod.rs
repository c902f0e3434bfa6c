//! Detection Service Client
//!
//! Typed async client for the remote detection/OCR service. Every endpoint
//! answers with a JSON envelope whose `status` must be `"success"`; anything
//! else is surfaced as [`ApiError::Backend`] with the raw body.

pub mod error;
pub mod types;

pub use error::ApiError;
pub use types::{
    BatchRequest, BatchResponse, BatchSummary, BoxCoords, DetectRequest, DetectResponse,
    DetectTimings, Detection, DetectionGroup, ExtractRequest, ExtractResponse, HealthResponse,
    ImageFile, OcrModel, PerfStats, TextRegion,
};

use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

const DETECT_PATH: &str = "api/detect";
const EXTRACT_TEXT_PATH: &str = "api/extract-text";
const BATCH_DETECT_PATH: &str = "api/batch-detect";
const HEALTH_PATH: &str = "api/health";

/// Client bound to one service base URL. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the service at `base_url` (e.g. `http://127.0.0.1:8095`)
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let url = normalize_base(base_url)?;

        // No request timeout: a slow inference always runs to completion
        let http = reqwest::Client::builder().build()?;

        Ok(Self { http, base_url: url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether this client talks to `base_url`
    pub fn serves(&self, base_url: &str) -> bool {
        normalize_base(base_url).is_ok_and(|url| url == self.base_url)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Run object and text-region detection on one image
    pub async fn detect(&self, request: &DetectRequest) -> Result<DetectResponse, ApiError> {
        let form = Form::new()
            .part("file", image_part(&request.image)?)
            .text("prompts", request.prompts.clone());
        self.post_form(DETECT_PATH, form).await
    }

    /// Recognize text inside previously detected regions
    pub async fn extract_text(
        &self,
        request: &ExtractRequest,
    ) -> Result<ExtractResponse, ApiError> {
        let form = Form::new()
            .part("file", image_part(&request.image)?)
            .text("regions", request.regions.clone())
            .text("model", request.model.as_str());
        self.post_form(EXTRACT_TEXT_PATH, form).await
    }

    /// Count detections per class for several images using the given thresholds
    pub async fn batch_detect(&self, request: &BatchRequest) -> Result<BatchResponse, ApiError> {
        let mut form = Form::new();
        for file in &request.files {
            form = form.part("files", image_part(file)?);
        }
        let form = form
            .text("prompts", request.prompts.clone())
            .text("thresholds", request.thresholds.clone());
        self.post_form(BATCH_DETECT_PATH, form).await
    }

    /// Query service readiness
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let url = self.endpoint(HEALTH_PATH)?;
        debug!("GET {}", url);
        let body = self.http.get(url).send().await?.text().await?;
        decode_health(&body)
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);

        let response = self.http.post(url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("{} answered {} ({} bytes)", path, status, body.len());

        decode_envelope(&body)
    }
}

fn normalize_base(base_url: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(base_url.trim())
        .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl(base_url.to_string()));
    }
    // Endpoint paths are joined relative to the base, keep any path prefix
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn image_part(file: &ImageFile) -> Result<Part, ApiError> {
    Ok(Part::bytes(file.bytes.to_vec())
        .file_name(file.name.clone())
        .mime_str(file.mime_type())?)
}

/// Decode a `{status: "success", ...}` envelope into `T`
pub(crate) fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if value.get("status").and_then(|s| s.as_str()) != Some("success") {
        return Err(ApiError::Backend {
            raw: value.to_string(),
        });
    }
    Ok(serde_json::from_value(value)?)
}

/// The health endpoint reports `"ok"` rather than `"success"`
fn decode_health(body: &str) -> Result<HealthResponse, ApiError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if value.get("status").and_then(|s| s.as_str()) != Some("ok") {
        return Err(ApiError::Backend {
            raw: value.to_string(),
        });
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_envelope_success() {
        let parsed: BatchResponse = decode_envelope(
            r#"{"status":"success","batch_summary":[{"filename":"a.jpg","counts":{"cat":2}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.batch_summary[0].counts["cat"], 2);
    }

    #[test]
    fn test_envelope_error_status_keeps_raw_body() {
        let err = decode_envelope::<BatchResponse>(r#"{"status": "error", "message": "boom"}"#)
            .unwrap_err();
        match err {
            ApiError::Backend { raw } => {
                assert!(raw.contains("\"status\":\"error\""));
                assert!(raw.contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_envelope_fastapi_detail_is_backend_failure() {
        let err = decode_envelope::<DetectResponse>(r#"{"detail":"No prompt provided"}"#)
            .unwrap_err();
        assert_eq!(err.backend_body(), Some(r#"{"detail":"No prompt provided"}"#));
    }

    #[test]
    fn test_envelope_non_json_is_decode_error() {
        let err = decode_envelope::<DetectResponse>("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert!(err.backend_body().is_none());
    }

    #[test]
    fn test_health_decoding() {
        let body = r#"{"status":"ok","services":{"sam3":"initialized","dbnet":"pending","ocr":"pending"},
            "config":{"device":"cuda","lazy_load":true}}"#;
        let health = decode_health(body).unwrap();
        assert_eq!(health.services.sam3, "initialized");
        assert!(health.config.lazy_load);
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let client = ApiClient::new("http://localhost:8095/annotator").unwrap();
        assert_eq!(
            client.endpoint(DETECT_PATH).unwrap().as_str(),
            "http://localhost:8095/annotator/api/detect"
        );

        let client = ApiClient::new("http://localhost:8095").unwrap();
        assert_eq!(
            client.endpoint(BATCH_DETECT_PATH).unwrap().as_str(),
            "http://localhost:8095/api/batch-detect"
        );
    }

    #[test]
    fn test_serves_compares_normalized_urls() {
        let client = ApiClient::new("http://localhost:8095").unwrap();
        assert!(client.serves("http://localhost:8095/"));
        assert!(client.serves(" http://localhost:8095 "));
        assert!(!client.serves("http://localhost:9000"));
        assert!(!client.serves("garbage"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    /// Accept one connection, capture the raw request and answer with `body`
    async fn serve_once(body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (format!("http://{}", addr), handle)
    }

    #[tokio::test]
    async fn test_detect_sends_multipart_form() {
        let (url, server) = serve_once(
            r#"{"status":"success","results":[{"class":"cat","detections":[{"box":[0,0,5,5],"score":0.9}]}]}"#,
        )
        .await;

        let client = ApiClient::new(&url).unwrap();
        let request = DetectRequest {
            image: ImageFile::new("photo.png", vec![1u8, 2, 3]),
            prompts: "cat, dog".to_string(),
        };
        let response = client.detect(&request).await.unwrap();
        assert_eq!(response.results[0].class_name, "cat");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/detect "));
        assert!(raw.contains("name=\"file\"; filename=\"photo.png\""));
        assert!(raw.contains("name=\"prompts\""));
        assert!(raw.contains("cat, dog"));
    }

    #[tokio::test]
    async fn test_batch_sends_every_file_and_thresholds() {
        let (url, server) = serve_once(r#"{"status":"error"}"#).await;

        let client = ApiClient::new(&url).unwrap();
        let request = BatchRequest {
            files: vec![
                ImageFile::new("a.png", vec![1u8]),
                ImageFile::new("b.png", vec![2u8]),
                ImageFile::new("c.png", vec![3u8]),
            ],
            prompts: "cat".to_string(),
            thresholds: r#"{"cat":0.5}"#.to_string(),
        };
        let err = client.batch_detect(&request).await.unwrap_err();
        assert_eq!(err.backend_body(), Some(r#"{"status":"error"}"#));

        let raw = server.await.unwrap();
        assert_eq!(raw.matches("name=\"files\"").count(), 3);
        assert!(raw.contains(r#"{"cat":0.5}"#));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(&format!("http://{}", addr)).unwrap();
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
