use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use glean_domain::{
	annotation::Annotation, cluster::DayBucket, params::SearchParams, sync::SyncEntry,
};
use glean_service::Error;

#[derive(Debug, Serialize, Deserialize)]
pub struct AnnotationsResponse {
	pub annotations: Vec<Annotation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DaysResponse {
	pub days: Vec<DayBucket>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostReceiveResponse {
	/// `None` means the entry was dropped and deferred to the backlog.
	pub entry: Option<SyncEntry>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			Error::NotFound { message } => ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", message),
			Error::Storage { message } => {
				tracing::error!(error = %message, "Storage failure.");

				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", message)
			},
			Error::Provider { message } =>
				ApiError::new(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/annotations/by_page", post(annotations_by_page))
		.route("/v1/annotations/by_day", post(annotations_by_day))
		.route("/v1/sync/post_receive", post(post_receive))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn annotations_by_page(
	State(state): State<AppState>,
	Json(params): Json<SearchParams>,
) -> Result<Json<AnnotationsResponse>, ApiError> {
	let annotations = state.service.list_annots_by_page(params).await?;

	Ok(Json(AnnotationsResponse { annotations }))
}

async fn annotations_by_day(
	State(state): State<AppState>,
	Json(params): Json<SearchParams>,
) -> Result<Json<DaysResponse>, ApiError> {
	let clusters = state.service.list_annots_by_day(params).await?;

	Ok(Json(DaysResponse { days: clusters.into_days() }))
}

async fn post_receive(
	State(state): State<AppState>,
	Json(entry): Json<SyncEntry>,
) -> Json<PostReceiveResponse> {
	let outcome = state.service.post_receive(entry).await;

	Json(PostReceiveResponse { entry: outcome.into_entry() })
}
