use reqwest::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fetch failures, split by whether retrying later could plausibly succeed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Temporary fetch failure: {message}")]
	Temporary { message: String },
	#[error("Permanent fetch failure: {message}")]
	Permanent { message: String },
	#[error("{message}")]
	InvalidConfig { message: String },
}
impl Error {
	pub fn is_temporary(&self) -> bool {
		matches!(self, Self::Temporary { .. })
	}

	pub fn temporary(message: impl Into<String>) -> Self {
		Self::Temporary { message: message.into() }
	}

	pub fn permanent(message: impl Into<String>) -> Self {
		Self::Permanent { message: message.into() }
	}

	pub fn from_status(status: StatusCode) -> Self {
		let message = format!("Server responded with {status}.");

		if status == StatusCode::REQUEST_TIMEOUT
			|| status == StatusCode::TOO_MANY_REQUESTS
			|| status.is_server_error()
		{
			Self::Temporary { message }
		} else {
			Self::Permanent { message }
		}
	}
}
impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		if let Some(status) = err.status() {
			return Self::from_status(status);
		}
		if err.is_builder() || err.is_redirect() {
			return Self::Permanent { message: err.to_string() };
		}

		// Timeouts, refused connections, and interrupted bodies all land here.
		Self::Temporary { message: err.to_string() }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn throttling_and_server_errors_are_temporary() {
		assert!(Error::from_status(StatusCode::REQUEST_TIMEOUT).is_temporary());
		assert!(Error::from_status(StatusCode::TOO_MANY_REQUESTS).is_temporary());
		assert!(Error::from_status(StatusCode::BAD_GATEWAY).is_temporary());
		assert!(Error::from_status(StatusCode::SERVICE_UNAVAILABLE).is_temporary());
	}

	#[test]
	fn other_client_errors_are_permanent() {
		assert!(!Error::from_status(StatusCode::NOT_FOUND).is_temporary());
		assert!(!Error::from_status(StatusCode::GONE).is_temporary());
		assert!(!Error::from_status(StatusCode::FORBIDDEN).is_temporary());
	}
}
