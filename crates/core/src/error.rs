use std::time::Duration;

use pogo_engine::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PogoError>;

/// Error taxonomy for the runner core.
///
/// Everything here propagates uncaught up to the suite orchestrator,
/// which is the sole boundary that converts an error into a
/// [`TestResult`](crate::TestResult) instead of crashing the process.
#[derive(Debug, Error)]
pub enum PogoError {
	/// Operation on a closed session. Programming error; fatal to the case.
	#[error("session is closed")]
	InvalidSession,

	#[error("timeout after {}ms waiting for selector: {selector}", .elapsed.as_millis())]
	LocatorTimeout { selector: String, elapsed: Duration },

	#[error("timeout after {}ms navigating to: {url}", .elapsed.as_millis())]
	NavigationTimeout { url: String, elapsed: Duration },

	#[error("navigation to {url} failed")]
	Navigation {
		url: String,
		#[source]
		source: EngineError,
	},

	#[error("element has no text content: {selector}")]
	EmptyContent { selector: String },

	#[error("assertion failed: {message}")]
	Assertion { message: String },

	#[error("beforeEach hook failed")]
	Hook(#[source] Box<PogoError>),

	#[error("cancelled: {0}")]
	Cancelled(String),

	#[error("suite {name:?} has already run")]
	SuiteCompleted { name: String },

	#[error(transparent)]
	Engine(#[from] EngineError),
}

impl PogoError {
	/// True when this error is a false assertion comparison, not a fault.
	pub fn is_assertion(&self) -> bool {
		matches!(self, PogoError::Assertion { .. })
	}

	/// Renders the full source chain, outermost first.
	pub fn render(&self) -> String {
		let mut message = self.to_string();
		let mut source = std::error::Error::source(self);
		while let Some(cause) = source {
			message.push_str(": ");
			message.push_str(&cause.to_string());
			source = cause.source();
		}
		message
	}
}
