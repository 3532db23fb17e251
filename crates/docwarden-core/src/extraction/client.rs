//! Document AI client.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::credentials::CredentialsConfig;
use super::document::{ErrorEnvelope, ProcessRequest, ProcessResponse, ProcessorPath};
use crate::error::{Result, ServiceError};
use crate::models::config::ServiceConfig;
use crate::models::extraction::ExtractionResult;

/// Sends documents to a Document AI processor and flattens the entities it finds.
pub struct DocumentAiClient {
    http: reqwest::Client,
    credentials: CredentialsConfig,
    endpoint: Option<String>,
}

impl DocumentAiClient {
    /// Create a client with the default service settings.
    pub fn new(credentials: CredentialsConfig) -> Result<Self> {
        Self::from_config(&ServiceConfig::default(), credentials)
    }

    /// Create a client honouring the timeout and endpoint override in `config`.
    pub fn from_config(config: &ServiceConfig, credentials: CredentialsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ServiceError::from)?;

        Ok(Self {
            http,
            credentials,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Use a fixed endpoint instead of the one derived from the location.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Full `:process` URL for a processor.
    pub fn process_url(&self, processor: &ProcessorPath) -> String {
        let endpoint = match &self.endpoint {
            Some(e) => e.trim_end_matches('/').to_string(),
            None => processor.endpoint(),
        };
        format!("{endpoint}/v1/{processor}:process")
    }

    /// Read `file_path`, send it to `processor` and return the extracted fields.
    ///
    /// The file is read before credentials are resolved, so a bad path always
    /// surfaces as an I/O error.
    pub async fn process_document(
        &self,
        processor: &ProcessorPath,
        file_path: &Path,
        mime_type: &str,
    ) -> Result<ExtractionResult> {
        let start = Instant::now();

        let content = std::fs::read(file_path)?;
        debug!("Read {} bytes from {}", content.len(), file_path.display());

        let credentials = self.credentials.load()?;
        let token = credentials.access_token(&self.http).await?;

        let url = self.process_url(processor);
        debug!("Processing with {}", processor);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&ProcessRequest::new(&content, mime_type))
            .send()
            .await
            .map_err(ServiceError::from)?;

        let status = response.status();
        let body = response.text().await.map_err(ServiceError::from)?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body).into());
        }

        let parsed: ProcessResponse = serde_json::from_str(&body)
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;
        let result = parsed.document.to_extraction_result();

        info!(
            "Extracted {} fields from {} entities in {}ms",
            result.len(),
            parsed.document.entities.len(),
            start.elapsed().as_millis()
        );

        Ok(result)
    }
}

fn api_error(status: u16, body: &str) -> ServiceError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    ServiceError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocwardenError;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::path::PathBuf;

    use axum::extract::{Form, Path as UrlPath};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    const ACCESS_TOKEN: &str = "ya29.local-token";
    const RESOURCE: &str = "projects/proj/locations/us/processors/p1:process";

    /// Local stand-in for the OAuth token endpoint and the `:process` method.
    async fn spawn_service(
        token_status: StatusCode,
        process_status: StatusCode,
        process_body: &'static str,
    ) -> String {
        let app = Router::new()
            .route(
                "/token",
                post(move |Form(form): Form<HashMap<String, String>>| async move {
                    let grant = form.get("grant_type").map(String::as_str);
                    let refresh = form.get("refresh_token").map(String::as_str);
                    if grant != Some("refresh_token") || refresh != Some("rt") {
                        return (StatusCode::BAD_REQUEST, "unexpected token request".to_string());
                    }
                    (
                        token_status,
                        format!(r#"{{"access_token": "{ACCESS_TOKEN}", "token_type": "Bearer"}}"#),
                    )
                }),
            )
            .route(
                "/v1/*resource",
                post(
                    move |UrlPath(resource): UrlPath<String>,
                          headers: HeaderMap,
                          Json(request): Json<serde_json::Value>| async move {
                        let bearer = format!("Bearer {ACCESS_TOKEN}");
                        let auth = headers.get("authorization").and_then(|v| v.to_str().ok());
                        if auth != Some(bearer.as_str()) {
                            return (StatusCode::UNAUTHORIZED, "missing bearer token".to_string());
                        }
                        if resource.trim_start_matches('/') != RESOURCE {
                            return (StatusCode::NOT_FOUND, format!("unknown resource {resource}"));
                        }
                        let raw = &request["rawDocument"];
                        if raw["content"] != "cG5n" || raw["mimeType"] != "image/png" {
                            return (StatusCode::BAD_REQUEST, format!("unexpected body {request}"));
                        }
                        (process_status, process_body.to_string())
                    },
                ),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Writes a document and user credentials whose token exchange goes to `base`.
    fn live_fixture(dir: &Path, base: &str) -> (PathBuf, DocumentAiClient) {
        let doc = dir.join("id.png");
        std::fs::write(&doc, b"png").unwrap();

        let creds = dir.join("creds.json");
        std::fs::write(
            &creds,
            format!(
                r#"{{"type": "authorized_user", "client_id": "id", "client_secret": "secret",
                    "refresh_token": "rt", "token_uri": "{base}/token"}}"#
            ),
        )
        .unwrap();

        let client = DocumentAiClient::new(CredentialsConfig::new(Some(creds)))
            .unwrap()
            .with_endpoint(base);
        (doc, client)
    }

    #[test]
    fn test_process_url_from_location() {
        let client = DocumentAiClient::new(CredentialsConfig::default()).unwrap();
        let processor = ProcessorPath::new("proj", "us", "p1");
        assert_eq!(
            client.process_url(&processor),
            "https://us-documentai.googleapis.com/v1/projects/proj/locations/us/processors/p1:process"
        );
    }

    #[test]
    fn test_process_url_with_override() {
        let client = DocumentAiClient::new(CredentialsConfig::default())
            .unwrap()
            .with_endpoint("http://localhost:8080/");
        let processor = ProcessorPath::new("proj", "eu", "p1");
        assert_eq!(
            client.process_url(&processor),
            "http://localhost:8080/v1/projects/proj/locations/eu/processors/p1:process"
        );
    }

    #[test]
    fn test_api_error_uses_envelope_message() {
        let body = r#"{"error": {"code": 403, "message": "Permission denied", "status": "PERMISSION_DENIED"}}"#;
        match api_error(403, body) {
            ServiceError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Permission denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_body() {
        match api_error(502, "  Bad Gateway\n") {
            ServiceError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let client = DocumentAiClient::new(CredentialsConfig::new(Some(
            dir.path().join("creds.json"),
        )))
        .unwrap();
        let processor = ProcessorPath::new("proj", "us", "p1");

        let err = client
            .process_document(&processor, &dir.path().join("missing.pdf"), "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, DocwardenError::Io(_)));
    }

    #[tokio::test]
    async fn test_bad_credentials_is_service_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("id.png");
        std::fs::write(&doc, b"png").unwrap();
        let creds = dir.path().join("creds.json");
        std::fs::write(&creds, r#"{"type": "unknown"}"#).unwrap();

        let client = DocumentAiClient::new(CredentialsConfig::new(Some(creds))).unwrap();
        let processor = ProcessorPath::new("proj", "us", "p1");

        let err = client
            .process_document(&processor, &doc, "image/png")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DocwardenError::Service(ServiceError::Credentials(_))
        ));
    }

    #[tokio::test]
    async fn test_live_call_flattens_entities() {
        let body = r#"{
            "document": {
                "text": "...",
                "entities": [
                    {"type": "name", "mentionText": "JANE ROE"},
                    {"type": "dob", "mentionText": "3 Feb 1980",
                     "normalizedValue": {"text": "1980-02-03"}},
                    {"type": "address", "mentionText": "1 Old Rd"},
                    {"type": "address", "mentionText": "2 New Rd"},
                    {"type": "document_id", "mentionText": "X123"}
                ]
            }
        }"#;
        let base = spawn_service(StatusCode::OK, StatusCode::OK, body).await;
        let dir = tempfile::tempdir().unwrap();
        let (doc, client) = live_fixture(dir.path(), &base);

        let result = client
            .process_document(&ProcessorPath::new("proj", "us", "p1"), &doc, "image/png")
            .await
            .unwrap();

        assert_eq!(result.len(), 4);
        assert_eq!(result.get("name"), Some("JANE ROE"));
        assert_eq!(result.get("dob"), Some("1980-02-03"));
        assert_eq!(result.get("address"), Some("2 New Rd"));
        assert_eq!(result.get("document_id"), Some("X123"));
    }

    #[tokio::test]
    async fn test_live_call_error_envelope() {
        let body = r#"{"error": {"code": 403, "message": "Permission 'documentai.processors.processOnline' denied", "status": "PERMISSION_DENIED"}}"#;
        let base = spawn_service(StatusCode::OK, StatusCode::FORBIDDEN, body).await;
        let dir = tempfile::tempdir().unwrap();
        let (doc, client) = live_fixture(dir.path(), &base);

        let err = client
            .process_document(&ProcessorPath::new("proj", "us", "p1"), &doc, "image/png")
            .await
            .unwrap_err();

        match err {
            DocwardenError::Service(ServiceError::Api { status, message }) => {
                assert_eq!(status, 403);
                assert_eq!(
                    message,
                    "Permission 'documentai.processors.processOnline' denied"
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_live_call_malformed_body() {
        let base = spawn_service(StatusCode::OK, StatusCode::OK, "<html>oops</html>").await;
        let dir = tempfile::tempdir().unwrap();
        let (doc, client) = live_fixture(dir.path(), &base);

        let err = client
            .process_document(&ProcessorPath::new("proj", "us", "p1"), &doc, "image/png")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DocwardenError::Service(ServiceError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_rejected_token_exchange_is_auth_error() {
        let base = spawn_service(StatusCode::UNAUTHORIZED, StatusCode::OK, "{}").await;
        let dir = tempfile::tempdir().unwrap();
        let (doc, client) = live_fixture(dir.path(), &base);

        let err = client
            .process_document(&ProcessorPath::new("proj", "us", "p1"), &doc, "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, DocwardenError::Service(ServiceError::Auth(_))));
    }
}
