use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

/// Exit code when every case passed.
pub const EXIT_OK: i32 = 0;
/// Exit code when any case failed or errored.
pub const EXIT_FAILED: i32 = 1;
/// Exit code for setup/config failures (bad glob, invalid spec, no browser).
pub const EXIT_SETUP: i32 = 2;

/// Failures raised before or outside test execution.
///
/// Per-case failures never surface here; they travel inside
/// [`SuiteReport`](pogo::SuiteReport) records.
#[derive(Debug, Error)]
pub enum CliError {
	#[error("configuration error: {0}")]
	Config(String),

	#[error("spec file {} is invalid: {reason}", .path.display())]
	Spec { path: PathBuf, reason: String },

	#[error("setup failed: {0}")]
	Setup(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Runner(#[from] pogo::PogoError),
}

impl CliError {
	/// All of these are setup-class failures under the exit-code contract.
	pub fn exit_code(&self) -> i32 {
		EXIT_SETUP
	}
}
