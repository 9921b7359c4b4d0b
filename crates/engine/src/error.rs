use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures reported by a browser engine.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("browser launch failed: {0}")]
	Launch(String),

	#[error("navigation to {url} failed: {reason}")]
	Navigation { url: String, reason: String },

	#[error("page is already closed")]
	PageClosed,

	#[error("engine protocol error: {0}")]
	Protocol(String),
}
