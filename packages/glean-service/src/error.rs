pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<glean_storage::Error> for Error {
	fn from(err: glean_storage::Error) -> Self {
		match err {
			glean_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			glean_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			glean_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}

impl From<glean_providers::Error> for Error {
	fn from(err: glean_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
