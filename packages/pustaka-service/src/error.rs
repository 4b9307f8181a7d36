#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Io(#[from] std::io::Error),
	#[error(transparent)]
	Storage(#[from] pustaka_storage::Error),
	#[error("Vector index error: {message}")]
	Index { message: String },
}
impl Error {
	pub fn index(message: impl Into<String>) -> Self {
		Self::Index { message: message.into() }
	}
}
