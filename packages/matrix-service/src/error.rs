pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Invalid {field}: {message}")]
	InvalidField { field: String, message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Request was canceled.")]
	Canceled,
	#[error("Request timed out after {timeout_ms} ms.")]
	Timeout { timeout_ms: u64 },
}
impl From<matrix_storage::Error> for Error {
	fn from(err: matrix_storage::Error) -> Self {
		match err {
			matrix_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			matrix_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
		}
	}
}
