//! Submission routes.
//!
//! - `POST /submit` stores a multipart form (`body` text, `files` parts)
//! - `GET /{hash}` returns a submission by full hash or short id
//! - `GET /download?hash=` streams back a stored attachment

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::AppState;
use crate::error::ApiError;
use hashdrop_core::attachment::{self, Attachment, RawAttachment};
use hashdrop_core::hash::is_hex;
use hashdrop_core::submission::{Submission, SubmissionError};
use hashdrop_shared::AppError;

/// Creates the submission routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/submit", post(submit))
        .route("/download", get(download))
        .route("/{hash}", get(get_submission))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for a stored submission.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    /// Short id (first 10 hex characters of the hash).
    pub id: String,
    /// Public link to the submission.
    pub redirect: String,
    /// Human-readable status.
    pub message: String,
}

/// A submission as returned by lookups.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    /// Short id.
    pub id: String,
    /// Full hash.
    pub hash: String,
    /// Plaintext body.
    pub body: String,
    /// Attachments in submission order.
    pub files: Vec<FileResponse>,
    /// Unix seconds.
    pub timestamp: i64,
    /// Creation time (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// An attachment entry of a submission.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    /// Filename.
    pub filename: String,
    /// Object key.
    pub key: String,
    /// Relative download link.
    pub download_url: String,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        let created_at = submission.created_at_utc().map(|t| t.to_rfc3339());
        Self {
            id: submission.hash.short().to_string(),
            hash: submission.hash.to_string(),
            body: submission.body,
            files: submission
                .attachments
                .into_iter()
                .map(|a| FileResponse {
                    download_url: format!("/download?hash={}", a.key),
                    key: a.key.to_string(),
                    filename: a.filename,
                })
                .collect(),
            timestamp: submission.created_at,
            created_at,
        }
    }
}

/// Query for `GET /download`.
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// Attachment key.
    pub hash: Option<String>,
}

/// Parsed submit form.
struct SubmitForm {
    body: String,
    files: Vec<RawAttachment>,
}

// ============================================================================
// Helper Functions
// ============================================================================

async fn read_form(multipart: &mut Multipart) -> Result<SubmitForm, ApiError> {
    let mut form = SubmitForm {
        body: String::new(),
        files: Vec::new(),
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("body") => form.body = field.text().await.map_err(multipart_error)?,
            Some("files") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                // Browsers send an unnamed empty part for an empty file input.
                if filename.trim().is_empty() {
                    continue;
                }
                let headers = part_headers(field.headers());
                let content = field.bytes().await.map_err(multipart_error)?;

                let mut upload = RawAttachment::new(filename, content);
                upload.metadata = headers;
                form.files.push(upload);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Part headers with non-UTF-8 values dropped.
fn part_headers(headers: &HeaderMap) -> attachment::HeaderMap {
    let mut map = attachment::HeaderMap::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            map.entry(name.as_str().to_string())
                .or_default()
                .push(value.to_string());
        }
    }
    map
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError(AppError::PayloadTooLarge(err.body_text()))
    } else {
        ApiError(AppError::InvalidInput(err.body_text()))
    }
}

/// Log a failed operation and convert it for the client.
fn reject(err: SubmissionError, operation: &'static str) -> ApiError {
    let detail = err.to_string();
    let api = ApiError::from(err);
    if api.0.is_client_error() {
        debug!(error = %detail, operation, "Request rejected");
    } else {
        error!(error = %detail, operation, "Request failed");
    }
    api
}

fn page_not_found() -> ApiError {
    ApiError(AppError::NotFound("page not found".to_string()))
}

/// `attachment; filename="..."` with quotes and backslashes escaped.
fn content_disposition(filename: &str) -> HeaderValue {
    let mut escaped = String::with_capacity(filename.len());
    for c in filename.chars().filter(|c| !c.is_control()) {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    HeaderValue::from_str(&format!("attachment; filename=\"{escaped}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// Whether `If-Modified-Since` is at or after `modified_at`, to the second.
fn not_modified_since(request: &HeaderMap, modified_at: DateTime<Utc>) -> bool {
    request
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
        .is_some_and(|since| modified_at.timestamp() <= since.timestamp())
}

fn attachment_response(attachment: Attachment, request: &HeaderMap) -> Response {
    let mut headers = HeaderMap::new();
    let last_modified = attachment
        .modified_at
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string();
    if let Ok(value) = HeaderValue::from_str(&last_modified) {
        headers.insert(header::LAST_MODIFIED, value);
    }

    if not_modified_since(request, attachment.modified_at) {
        return (StatusCode::NOT_MODIFIED, headers).into_response();
    }

    let content_type = attachment
        .content_type()
        .and_then(|v| HeaderValue::from_str(v).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(&attachment.filename),
    );

    (StatusCode::OK, headers, attachment.content).into_response()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/submit`
async fn submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SubmitResponse>, ApiError> {
    let form = read_form(&mut multipart).await?;

    let result = state
        .submissions
        .submit(form.body, form.files)
        .await
        .map_err(|e| reject(e, "submit"))?;

    let id = result.short_id().to_string();
    info!(id = %id, created = result.created, "Submission accepted");

    Ok(Json(SubmitResponse {
        redirect: state.link(&id),
        message: if result.created {
            "Submission stored".to_string()
        } else {
            "Submission already exists".to_string()
        },
        id,
    }))
}

/// GET `/{hash}`
async fn get_submission(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    // Only hex paths are lookups.
    if !is_hex(&hash) {
        return Err(page_not_found());
    }

    let submission = state
        .submissions
        .resolve(&hash)
        .await
        .map_err(|e| reject(e, "resolve"))?;

    Ok(Json(SubmissionResponse::from(submission)))
}

/// GET `/download?hash=<key>`
async fn download(
    State(state): State<AppState>,
    request: HeaderMap,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let key = query
        .hash
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError(AppError::InvalidInput("missing hash parameter".to_string())))?;

    let attachment = state
        .submissions
        .fetch_attachment(key)
        .await
        .map_err(|e| reject(e, "download"))?;

    debug!(key, filename = %attachment.filename, "Serving attachment");
    Ok(attachment_response(attachment, &request))
}


#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use http_body_util::BodyExt;
    use sea_orm::DatabaseConnection;
    use std::sync::Arc;
    use tower::ServiceExt;

    use hashdrop_core::storage::{ObjectStore, StorageConfig, StorageProvider, StorageService};
    use hashdrop_shared::{ServerConfig, UploadConfig};

    const BOUNDARY: &str = "hashdrop-test-boundary";

    /// State over a disconnected database and in-memory storage.
    fn test_state(max_upload_size: usize) -> (AppState, Arc<StorageService>) {
        let storage = Arc::new(
            StorageService::from_config(StorageConfig::new(StorageProvider::Memory))
                .expect("should create storage"),
        );
        let server = ServerConfig {
            base_url: "http://drop.test/".to_string(),
            ..ServerConfig::default()
        };
        let upload = UploadConfig {
            max_upload_size,
            ..UploadConfig::default()
        };
        let state = AppState::new(DatabaseConnection::default(), storage.clone(), &server, &upload);
        (state, storage)
    }

    fn app() -> axum::Router {
        crate::create_router(test_state(1024 * 1024).0)
    }

    /// `(field name, filename, content)` parts.
    fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, filename, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match filename {
                Some(f) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                     Content-Type: text/plain\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .uri("/submit")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_submit_blank_body_without_files_is_rejected() {
        let response = app()
            .oneshot(multipart_request(&[("body", None, "   ")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_submit_ignores_empty_file_input() {
        let response = app()
            .oneshot(multipart_request(&[("body", None, ""), ("files", Some(""), "")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_database_failure_is_generic_500() {
        let response = app()
            .oneshot(multipart_request(&[
                ("body", None, "hello"),
                ("files", Some("a.txt"), "abc"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "database_error");
        assert_eq!(body["message"], "An error occurred");
    }

    #[tokio::test]
    async fn test_submit_over_limit_is_413() {
        let (state, _) = test_state(16);
        let response = crate::create_router(state)
            .oneshot(multipart_request(&[(
                "files",
                Some("big.txt"),
                "0123456789012345678901234567890123456789",
            )]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_non_hex_path_is_not_found() {
        let response = app().oneshot(get("/favicon.ico")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "not_found");
    }

    #[tokio::test]
    async fn test_short_hex_path_is_bad_request() {
        let response = app().oneshot(get("/abc123")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "invalid_input");
    }

    #[tokio::test]
    async fn test_unmatched_route_is_not_found() {
        let response = app().oneshot(get("/a/b/c")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_download_requires_hash() {
        for uri in ["/download", "/download?hash="] {
            let response = app().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_download_malformed_key_is_not_found() {
        for key in ["zz", "a9993e3647"] {
            let response = app()
                .oneshot(get(&format!("/download?hash={key}")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{key}");
            assert_eq!(
                json_body(response).await["message"],
                format!("Not found: attachment {key} not found")
            );
        }
    }

    #[tokio::test]
    async fn test_download_unknown_key_is_not_found() {
        let key = "0123456789abcdef0123456789abcdef01234567";
        let response = app()
            .oneshot(get(&format!("/download?hash={key}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await["message"],
            format!("Not found: attachment {key} not found")
        );
    }

    #[tokio::test]
    async fn test_download_stored_attachment() {
        let (state, storage) = test_state(1024 * 1024);
        let upload = RawAttachment::new("re\"port.csv", "a,b\n1,2\n")
            .with_header("Content-Type", "text/csv");
        let modified_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let blob = attachment::encode(&Attachment::from_upload(upload, modified_at)).unwrap();
        let key = attachment::key_for(&blob);
        storage.put(key.as_str(), blob).await.unwrap();

        let response = crate::create_router(state)
            .oneshot(get(&format!("/download?hash={key}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            r#"attachment; filename="re\"port.csv""#
        );
        assert_eq!(headers[header::LAST_MODIFIED], "Wed, 01 May 2024 12:00:00 GMT");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_download_not_modified() {
        let (state, storage) = test_state(1024 * 1024);
        let upload = RawAttachment::new("a.txt", "abc");
        let modified_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let blob = attachment::encode(&Attachment::from_upload(upload, modified_at)).unwrap();
        let key = attachment::key_for(&blob);
        storage.put(key.as_str(), blob).await.unwrap();
        let app = crate::create_router(state);

        let conditional = |since: &str| {
            Request::builder()
                .uri(format!("/download?hash={key}"))
                .header(header::IF_MODIFIED_SINCE, since)
                .body(Body::empty())
                .unwrap()
        };

        let response = app
            .clone()
            .oneshot(conditional("Wed, 01 May 2024 12:00:00 GMT"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(
            response.headers()[header::LAST_MODIFIED],
            "Wed, 01 May 2024 12:00:00 GMT"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());

        let response = app
            .oneshot(conditional("Tue, 30 Apr 2024 12:00:00 GMT"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"abc");
    }

    #[tokio::test]
    async fn test_download_without_content_type_is_octet_stream() {
        let (state, storage) = test_state(1024 * 1024);
        let upload = RawAttachment::new("blob.bin", vec![0u8, 1, 2]);
        let blob = attachment::encode(&Attachment::from_upload(upload, Utc::now())).unwrap();
        let key = attachment::key_for(&blob);
        storage.put(key.as_str(), blob).await.unwrap();

        let response = crate::create_router(state)
            .oneshot(get(&format!("/download?hash={key}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
    }

    #[test]
    fn test_submission_response_links_downloads() {
        let key = hashdrop_core::hash::ContentHash::digest(b"blob");
        let submission = Submission {
            id: 1,
            hash: hashdrop_core::hash::ContentHash::digest(b"abc"),
            body: "hi".to_string(),
            attachments: vec![hashdrop_core::attachment::AttachmentRef::new("a.txt", key.clone())],
            created_at: 0,
        };

        let response = SubmissionResponse::from(submission);
        assert_eq!(response.id, "a9993e3647");
        assert_eq!(response.files[0].download_url, format!("/download?hash={key}"));
        assert_eq!(response.created_at.as_deref(), Some("1970-01-01T00:00:00+00:00"));
    }

    #[test]
    fn test_link_trims_trailing_slash() {
        let (state, _) = test_state(1);
        assert_eq!(state.link("a9993e3647"), "http://drop.test/a9993e3647");
    }
}
