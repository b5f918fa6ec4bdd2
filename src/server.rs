//! HTTP surface over the batch pipeline.
//!
//! - `GET /health` returns `{"ok": true}`
//! - `POST /classify` takes a multipart upload with a `file` field (`.csv`,
//!   `.xlsx` or `.xls`) and returns `categorized_output.xlsx` as an
//!   attachment. Query parameters `gpt_fallback` (default `true`) and
//!   `gpt_batch_size` (default 80) tune the fallback review for that request;
//!   `format=json` returns the [`BatchReport`] as JSON instead.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use log::{error, info};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::batch::{BatchOrchestrator, BatchReport, WORKBOOK_FILE_NAME, read_input_bytes};
use crate::error::{KwcatError, Result};
use crate::fallback::FallbackClassifier;

const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Shared state of the HTTP handlers.
pub struct AppState {
    pub orchestrator: BatchOrchestrator,
    pub fallback: Option<Arc<dyn FallbackClassifier>>,
}

/// Body format of a `POST /classify` response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Xlsx,
    Json,
}

/// Query parameters of `POST /classify`.
#[derive(Debug, Default, Deserialize)]
pub struct ClassifyParams {
    pub gpt_fallback: Option<bool>,
    pub gpt_batch_size: Option<usize>,
    #[serde(default)]
    pub format: ReportFormat,
}

/// Error body is `{"detail": msg}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(KwcatError),
}

impl From<KwcatError> for ApiError {
    fn from(e: KwcatError) -> Self {
        match e {
            KwcatError::Input(msg) => ApiError::BadRequest(msg),
            e if e.is_input_error() => ApiError::BadRequest(e.to_string()),
            e => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(e) => {
                error!("Request failed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/classify", post(classify))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .await
        .map_err(KwcatError::from)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn classify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClassifyParams>,
    mut multipart: Multipart,
) -> std::result::Result<Response, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
        let report = classify_upload(&state, &filename, content.to_vec(), &params).await?;
        return report_response(report, params.format);
    }
    Err(ApiError::BadRequest("missing 'file' field".to_string()))
}

fn report_response(
    report: BatchReport,
    format: ReportFormat,
) -> std::result::Result<Response, ApiError> {
    match format {
        ReportFormat::Json => Ok(Json(report).into_response()),
        ReportFormat::Xlsx => {
            let bytes = report.workbook_bytes()?;
            let disposition = format!("attachment; filename=\"{WORKBOOK_FILE_NAME}\"");
            Ok((
                [
                    (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response())
        }
    }
}

/// Classify one uploaded file with per-request fallback settings.
pub async fn classify_upload(
    state: &AppState,
    filename: &str,
    content: Vec<u8>,
    params: &ClassifyParams,
) -> std::result::Result<BatchReport, ApiError> {
    let table = read_input_bytes(filename, content)?;

    let mut options = state.orchestrator.options().clone();
    if let Some(enabled) = params.gpt_fallback {
        options.fallback_enabled = enabled;
    }
    if let Some(batch_size) = params.gpt_batch_size {
        options.fallback_batch_size = batch_size;
    }
    let orchestrator = state
        .orchestrator
        .with_options(options)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    info!("Classifying upload '{filename}' ({} rows)", table.len());
    let report = orchestrator.run(table, state.fallback.as_deref()).await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::batch::BatchOptions;
    use crate::config::{Taxonomy, TokenCategory, TokenLists};
    use crate::policy::KeywordClassifier;

    fn state() -> AppState {
        let lists = TokenLists::empty().with_terms(TokenCategory::ClassicalFormulations, ["triphala"]);
        let orchestrator = BatchOrchestrator::new(
            KeywordClassifier::new(Arc::new(lists)),
            Arc::new(Taxonomy::default()),
            BatchOptions {
                threads: Some(1),
                ..BatchOptions::default()
            },
        )
        .unwrap();
        AppState {
            orchestrator,
            fallback: None,
        }
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_classify_upload_csv() {
        let state = state();
        let report = classify_upload(
            &state,
            "keywords.csv",
            b"keyword,volume\ntriphala powder,100\nrandom,5\n".to_vec(),
            &ClassifyParams::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].bucket_id, "NB-1");
        assert_eq!(report.stats.reviewed, 1);
    }

    #[tokio::test]
    async fn test_unsupported_upload_is_bad_request() {
        let state = state();
        let err = classify_upload(&state, "k.txt", Vec::new(), &ClassifyParams::default())
            .await
            .unwrap_err();
        assert!(
            matches!(&err, ApiError::BadRequest(msg) if msg == "Unsupported file type. Upload .csv or .xlsx")
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_bad_request() {
        let state = state();
        let params = ClassifyParams {
            gpt_fallback: Some(true),
            gpt_batch_size: Some(0),
            ..ClassifyParams::default()
        };
        let err = classify_upload(&state, "k.csv", b"keyword\nx\n".to_vec(), &params)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    fn multipart_request(uri: &str, field: &str, filename: &str, content: &str) -> Request<Body> {
        let boundary = "kwcat-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {content}\r\n\
             --{boundary}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    const UPLOAD: &str = "keyword,volume\ntriphala powder,100\nrandom,5\n";

    #[tokio::test]
    async fn test_router_returns_workbook() {
        let app = router(Arc::new(state()));
        let response = app
            .oneshot(multipart_request("/classify", "file", "keywords.csv", UPLOAD))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"categorized_output.xlsx\""
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let table = read_input_bytes(WORKBOOK_FILE_NAME, bytes.to_vec()).unwrap();
        assert_eq!(table.columns[..3], ["keyword", "volume", "Primary Bucket ID"]);
        assert_eq!(table.rows[0][0], "triphala powder");
        assert_eq!(table.rows[0][2], "NB-1");
        assert_eq!(table.rows[1][2], "UNCLASSIFIED");
    }

    #[tokio::test]
    async fn test_router_returns_json_report_on_request() {
        let app = router(Arc::new(state()));
        let response = app
            .oneshot(multipart_request(
                "/classify?format=json&gpt_fallback=false",
                "file",
                "keywords.csv",
                UPLOAD,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["rows"][0]["bucket_id"], "NB-1");
        assert_eq!(body["stats"]["reviewed"], 1);
    }

    #[tokio::test]
    async fn test_router_rejects_missing_file_field() {
        let app = router(Arc::new(state()));
        let response = app
            .oneshot(multipart_request("/classify", "upload", "keywords.csv", UPLOAD))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "detail": "missing 'file' field" }));
    }

    #[tokio::test]
    async fn test_router_health() {
        let response = router(Arc::new(state()))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_internal_errors_map_to_500() {
        let err = ApiError::from(KwcatError::fallback("boom"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
