//! Sequential test orchestration.
//!
//! Mirrors the describe/it/beforeEach shape: a [`Suite`] collects hooks
//! and cases in declaration order, then [`Suite::run`] executes them one
//! at a time against a fresh [`Session`] per case and finalizes immutable
//! [`TestResult`]s. Failed cases are never retried.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{PogoError, Result};
use crate::report::{SuiteReport, TestResult};
use crate::session::Session;

/// Boxing alias: stable async closures without `async_trait` at call sites.
pub type TestFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

type CaseFn = Box<dyn for<'a> Fn(&'a mut Session) -> TestFuture<'a> + Send + Sync>;

/// Produces one fresh [`Session`] per test case.
///
/// The suite owns each session for exactly one case and closes it before
/// the next case's hooks run, so no page state leaks between cases.
#[async_trait]
pub trait SessionFactory: Send + Sync {
	async fn create(&self) -> Result<Session>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuiteState {
	Pending,
	Running,
	Completed,
}

struct TestCase {
	name: String,
	body: CaseFn,
}

/// A named, ordered collection of hooks and test cases.
pub struct Suite {
	name: String,
	before_each: Vec<CaseFn>,
	cases: Vec<TestCase>,
	state: SuiteState,
	cancel: CancellationToken,
}

impl std::fmt::Debug for Suite {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Suite")
			.field("name", &self.name)
			.field("before_each", &self.before_each.len())
			.field("cases", &self.cases.len())
			.field("state", &self.state)
			.field("cancel", &self.cancel)
			.finish()
	}
}

impl Suite {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			before_each: Vec::new(),
			cases: Vec::new(),
			state: SuiteState::Pending,
			cancel: CancellationToken::new(),
		}
	}

	/// Ties this suite's run to `token`; cancelling it aborts in-flight
	/// work and errors the remaining cases.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancel = token;
		self
	}

	/// Registers a hook that runs before every case in this suite.
	///
	/// Hooks run in declaration order. A failing hook errors the case and
	/// skips its body.
	pub fn before_each<F>(&mut self, hook: F) -> &mut Self
	where
		F: for<'a> Fn(&'a mut Session) -> TestFuture<'a> + Send + Sync + 'static,
	{
		self.before_each.push(Box::new(hook));
		self
	}

	/// Registers a named test case. Declaration order is execution order.
	pub fn test<F>(&mut self, name: impl Into<String>, body: F) -> &mut Self
	where
		F: for<'a> Fn(&'a mut Session) -> TestFuture<'a> + Send + Sync + 'static,
	{
		self.cases.push(TestCase {
			name: name.into(),
			body: Box::new(body),
		});
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn len(&self) -> usize {
		self.cases.len()
	}

	pub fn is_empty(&self) -> bool {
		self.cases.is_empty()
	}

	/// Token cancelling this suite's in-flight work when triggered.
	pub fn cancellation_token(&self) -> CancellationToken {
		self.cancel.clone()
	}

	/// Runs every case in declaration order and finalizes the report.
	///
	/// A suite runs once; later invocations fail with
	/// [`PogoError::SuiteCompleted`]. Rerunning means building a fresh suite.
	pub async fn run(&mut self, sessions: &dyn SessionFactory) -> Result<SuiteReport> {
		if self.state != SuiteState::Pending {
			return Err(PogoError::SuiteCompleted { name: self.name.clone() });
		}
		self.state = SuiteState::Running;
		info!(target = "pogo.suite", suite = %self.name, cases = self.cases.len(), "run");

		let suite_started = Instant::now();
		let mut results = Vec::with_capacity(self.cases.len());

		for case in &self.cases {
			let started = Instant::now();

			let record = if self.cancel.is_cancelled() {
				// No session is opened for cases after cancellation.
				TestResult::from_error(
					&case.name,
					&PogoError::Cancelled("suite cancelled".to_string()),
					started.elapsed(),
				)
			} else {
				match run_case(case, &self.before_each, sessions, &self.cancel).await {
					Ok(()) => TestResult::passed(&case.name, started.elapsed()),
					Err(err) => TestResult::from_error(&case.name, &err, started.elapsed()),
				}
			};

			debug!(target = "pogo.suite", case = %record.name, outcome = %record.outcome, "case finished");
			results.push(record);
		}

		self.state = SuiteState::Completed;
		Ok(SuiteReport {
			suite: self.name.clone(),
			results,
			duration_ms: suite_started.elapsed().as_millis() as u64,
		})
	}
}

async fn run_case(
	case: &TestCase,
	hooks: &[CaseFn],
	sessions: &dyn SessionFactory,
	cancel: &CancellationToken,
) -> Result<()> {
	let mut session = sessions.create().await?.with_cancellation(cancel.child_token());

	let outcome = run_hooks_and_body(case, hooks, &mut session).await;

	// The session must be gone before the next case's hooks run.
	if let Err(err) = session.close().await {
		warn!(target = "pogo.suite", case = %case.name, error = %err, "session close failed");
	}

	outcome
}

async fn run_hooks_and_body(case: &TestCase, hooks: &[CaseFn], session: &mut Session) -> Result<()> {
	for hook in hooks {
		if let Err(err) = hook(session).await {
			// Hook failures always error the case, assertion or not.
			return Err(PogoError::Hook(Box::new(err)));
		}
	}

	(case.body)(session).await
}
