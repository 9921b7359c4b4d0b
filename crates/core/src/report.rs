//! Immutable test outcome records.

use std::time::Duration;

use serde::Serialize;

use crate::error::PogoError;

/// Final state of one executed test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
	/// Every assertion held.
	Passed,
	/// An assertion comparison was false.
	Failed,
	/// A fault occurred before the case could finish (timeout,
	/// navigation error, hook failure, cancellation).
	Errored,
}

impl Outcome {
	pub(crate) fn from_error(err: &PogoError) -> Self {
		if err.is_assertion() { Outcome::Failed } else { Outcome::Errored }
	}
}

impl std::fmt::Display for Outcome {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Outcome::Passed => write!(f, "passed"),
			Outcome::Failed => write!(f, "failed"),
			Outcome::Errored => write!(f, "errored"),
		}
	}
}

/// Record of one executed test case. Immutable once finalized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
	pub name: String,
	pub outcome: Outcome,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	pub duration_ms: u64,
}

impl TestResult {
	pub(crate) fn passed(name: &str, duration: Duration) -> Self {
		Self {
			name: name.to_string(),
			outcome: Outcome::Passed,
			message: None,
			duration_ms: duration.as_millis() as u64,
		}
	}

	pub(crate) fn from_error(name: &str, err: &PogoError, duration: Duration) -> Self {
		Self {
			name: name.to_string(),
			outcome: Outcome::from_error(err),
			message: Some(err.render()),
			duration_ms: duration.as_millis() as u64,
		}
	}
}

/// Ordered results for one suite run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteReport {
	pub suite: String,
	pub results: Vec<TestResult>,
	pub duration_ms: u64,
}

impl SuiteReport {
	/// True when no case failed or errored.
	pub fn passed(&self) -> bool {
		self.results.iter().all(|r| r.outcome == Outcome::Passed)
	}

	/// Number of cases with the given outcome.
	pub fn count(&self, outcome: Outcome) -> usize {
		self.results.iter().filter(|r| r.outcome == outcome).count()
	}
}
