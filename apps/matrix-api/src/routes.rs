use axum::{
	Json, Router,
	extract::{
		Path, Query, State,
		rejection::{JsonRejection, QueryRejection},
	},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use matrix_service::{Error, LocationsResponse, MatrixQueryRequest, MatrixQueryResponse};
use matrix_storage::models::MatrixRecord;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/matrix", get(query_matrix_params))
		.route("/v1/matrix/query", post(query_matrix))
		.route("/v1/matrix/records/{gtin}", get(get_record))
		.route("/v1/matrix/locations", get(locations))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new()
		.route("/v1/admin/locations/refresh", post(refresh_locations))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn query_matrix_params(
	State(state): State<AppState>,
	payload: Result<Query<MatrixQueryRequest>, QueryRejection>,
) -> Result<Json<MatrixQueryResponse>, ApiError> {
	let Query(payload) = payload.map_err(|err| invalid_request(err.body_text()))?;
	let response = state.service.query(payload).await?;

	Ok(Json(response))
}

async fn query_matrix(
	State(state): State<AppState>,
	payload: Result<Json<MatrixQueryRequest>, JsonRejection>,
) -> Result<Json<MatrixQueryResponse>, ApiError> {
	let Json(payload) = payload.map_err(|err| invalid_request(err.body_text()))?;
	let response = state.service.query(payload).await?;

	Ok(Json(response))
}

async fn get_record(
	State(state): State<AppState>,
	Path(gtin): Path<String>,
) -> Result<Json<MatrixRecord>, ApiError> {
	let record = state.service.get_record(&gtin).await?;

	Ok(Json(record))
}

async fn locations(State(state): State<AppState>) -> Result<Json<LocationsResponse>, ApiError> {
	let response = state.service.locations().await?;

	Ok(Json(response))
}

async fn refresh_locations(
	State(state): State<AppState>,
) -> Result<Json<LocationsResponse>, ApiError> {
	let response = state.service.refresh_locations().await?;

	tracing::info!(locations = response.locations.len(), "Location directory refreshed by admin.");

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } => invalid_request(message),
			Error::InvalidField { field, message } => ApiError::new(
				StatusCode::BAD_REQUEST,
				"INVALID_REQUEST",
				message,
				Some(vec![field]),
			),
			Error::NotFound { message } =>
				ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
			Error::Storage { message } => {
				tracing::error!(error = %message, "Matrix store request failed.");

				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", message, None)
			},
			Error::Timeout { timeout_ms } => ApiError::new(
				StatusCode::GATEWAY_TIMEOUT,
				"TIMEOUT",
				format!("Request timed out after {timeout_ms} ms."),
				None,
			),
			Error::Canceled => ApiError::new(
				StatusCode::SERVICE_UNAVAILABLE,
				"CANCELED",
				"Request was canceled.",
				None,
			),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

fn invalid_request(message: impl Into<String>) -> ApiError {
	ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, None)
}
