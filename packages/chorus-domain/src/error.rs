pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("Unsupported operation '{op}'.")]
	UnsupportedOperation { op: String },
	#[error("Invalid arguments for '{op}': {message}")]
	InvalidArguments { op: String, message: String },
}
