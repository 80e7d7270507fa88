pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Invalid query: {message}")]
	InvalidQuery { message: String },
	#[error("Store unavailable: {message}")]
	StoreUnavailable { message: String },
}
impl From<parley_storage::Error> for Error {
	fn from(err: parley_storage::Error) -> Self {
		match err {
			parley_storage::Error::Sqlx(inner) => Self::StoreUnavailable { message: inner.to_string() },
			parley_storage::Error::InvalidArgument(message) => Self::InvalidQuery { message },
			parley_storage::Error::NotFound(message) => Self::NotFound { message },
			parley_storage::Error::Conflict(message) => Self::StoreUnavailable { message },
		}
	}
}

impl From<parley_domain::query::QueryError> for Error {
	fn from(err: parley_domain::query::QueryError) -> Self {
		Self::InvalidQuery { message: err.to_string() }
	}
}
