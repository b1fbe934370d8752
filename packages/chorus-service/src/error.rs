pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Unsupported operation '{op}'.")]
	UnsupportedOperation { op: String },
	#[error("Invalid arguments for '{op}': {message}")]
	InvalidArguments { op: String, message: String },
	#[error("Backend error: {message}")]
	Backend { message: String },
}
impl From<chorus_domain::Error> for Error {
	fn from(err: chorus_domain::Error) -> Self {
		match err {
			chorus_domain::Error::UnsupportedOperation { op } => Self::UnsupportedOperation { op },
			chorus_domain::Error::InvalidArguments { op, message } =>
				Self::InvalidArguments { op, message },
		}
	}
}

impl From<chorus_backend::Error> for Error {
	fn from(err: chorus_backend::Error) -> Self {
		Self::Backend { message: err.to_string() }
	}
}
