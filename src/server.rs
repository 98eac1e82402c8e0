//! HTTP surface: `/tools`, `/execute`, `/health`.
//!
//! A thin axum layer over [`ContractReviewer`]. `/execute` reads the whole
//! multipart form, checks the tool name, and only then hands the upload to
//! the pipeline, so an unknown tool never touches the disk.
//!
//! Review outcomes are always `200 OK`; success and failure differ only by
//! the presence of an `error` key. The exceptions are transport-level
//! problems with the request itself (unknown tool → 404, missing field →
//! 422, unreadable form → 400, oversized upload → 413).

use crate::checklist::parse_custom_clauses;
use crate::report::{ContractSubmission, ErrorEnvelope, ReviewOutcome};
use crate::review::ContractReviewer;
use crate::tools::{self, TOOL_LEGAL_REVIEW};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    reviewer: ContractReviewer,
    next_request_id: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(reviewer: ContractReviewer) -> Self {
        Self {
            reviewer,
            next_request_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

/// Build the service router.
pub fn router(reviewer: ContractReviewer) -> Router {
    let body_limit = reviewer.config().max_upload_bytes;
    Router::new()
        .route("/tools", get(list_tools))
        .route("/execute", post(execute_tool))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(AppState::new(reviewer))
}

async fn list_tools(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(tools::list_tools(state.reviewer.config()))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(tools::health(state.reviewer.config()))
}

/// A rejected request, rendered as `{"detail": ...}`.
#[derive(Debug)]
struct RequestError {
    status: StatusCode,
    detail: String,
}

impl RequestError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Fields of the `/execute` form.
#[derive(Default)]
struct ExecuteForm {
    tool_name: Option<String>,
    parameters: Option<String>,
    jurisdiction: Option<String>,
    contract_file: Option<(String, Vec<u8>)>,
}

async fn read_form(mut multipart: Multipart) -> Result<ExecuteForm, RequestError> {
    // Oversized uploads surface here as 413 via `MultipartError::status`.
    let bad_form = |e: axum::extract::multipart::MultipartError| {
        RequestError::new(e.status(), format!("invalid multipart body: {}", e.body_text()))
    };

    let mut form = ExecuteForm::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "tool_name" => form.tool_name = Some(field.text().await.map_err(bad_form)?),
            "parameters" => form.parameters = Some(field.text().await.map_err(bad_form)?),
            "jurisdiction" => form.jurisdiction = Some(field.text().await.map_err(bad_form)?),
            "contract_file" => {
                let file_name = field.file_name().unwrap_or("contract.pdf").to_string();
                let bytes = field.bytes().await.map_err(bad_form)?;
                form.contract_file = Some((file_name, bytes.to_vec()));
            }
            other => warn!("Ignoring unknown form field '{}'", other),
        }
    }
    Ok(form)
}

async fn execute_tool(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ReviewOutcome>, RequestError> {
    let form = read_form(multipart).await?;

    let tool_name = form.tool_name.ok_or_else(|| {
        RequestError::new(StatusCode::UNPROCESSABLE_ENTITY, "missing form field 'tool_name'")
    })?;
    if tool_name != TOOL_LEGAL_REVIEW {
        warn!("Rejected unknown tool '{}'", tool_name);
        return Err(RequestError::new(StatusCode::NOT_FOUND, "tool not found"));
    }

    let (file_name, file_bytes) = form.contract_file.ok_or_else(|| {
        RequestError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "missing form field 'contract_file'",
        )
    })?;

    let config = state.reviewer.config();
    let parameters = form.parameters.unwrap_or_else(|| "{}".to_string());
    let submission = ContractSubmission::new(file_name, file_bytes)
        .jurisdiction(
            form.jurisdiction
                .unwrap_or_else(|| config.default_jurisdiction.clone()),
        )
        .custom_clauses(parse_custom_clauses(&parameters));

    let request_id = state.next_request_id.fetch_add(1, Ordering::Relaxed);
    let span = info_span!("review", request_id, file_name = %submission.file_name);
    info!(parent: &span, "Accepted legal_review request");

    // Detached so a client disconnect does not abort the model call or the
    // temp-file cleanup.
    let reviewer = state.reviewer.clone();
    let task = tokio::spawn(async move { reviewer.review(submission).await }.instrument(span));

    match task.await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => {
            warn!("Review task failed: {}", e);
            Ok(Json(ReviewOutcome::Error(ErrorEnvelope::new(format!(
                "Internal error: {e}"
            )))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReviewConfig;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = ReviewConfig::builder().build().unwrap();
        router(ContractReviewer::new(config).unwrap())
    }

    async fn json_body(resp: Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let resp = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "legal-guard");
    }

    #[tokio::test]
    async fn tools_endpoint_lists_legal_review() {
        let resp = app()
            .oneshot(Request::get("/tools").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(resp).await;
        assert_eq!(body[0]["name"], "legal_review");
    }

    #[tokio::test]
    async fn execute_rejects_non_multipart() {
        let resp = app()
            .oneshot(
                Request::post("/execute")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
    }
}
