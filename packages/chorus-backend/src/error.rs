pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("Backend returned status {status}: {message}")]
	Status { status: u16, message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
	/// For backends that fail without an HTTP exchange, such as in-process or scripted ones.
	#[error("Backend unavailable: {message}")]
	Unavailable { message: String },
}
