//! Session ownership of one live browser page.

use std::time::Duration;

use pogo_engine::{ElementHandle, PageEngine, WaitUntil};
use serde::{Deserialize, Serialize};
use tokio::time::{Instant, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{PogoError, Result};
use crate::locator::Locator;
use crate::resolver;

/// Browser viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
	pub width: u32,
	pub height: u32,
}

impl Default for Viewport {
	fn default() -> Self {
		Self { width: 1280, height: 720 }
	}
}

/// Configuration for opening a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
	/// Run the browser without a visible window.
	pub headless: bool,
	/// Page viewport.
	pub viewport: Viewport,
	/// Deadline applied to navigations that do not override it.
	pub default_timeout: Duration,
	/// Readiness condition for navigations that do not override it.
	pub wait_until: WaitUntil,
}

impl Default for SessionConfig {
	fn default() -> Self {
		// networkidle at 60s mirrors the harness defaults this core replaces.
		Self {
			headless: true,
			viewport: Viewport::default(),
			default_timeout: Duration::from_secs(60),
			wait_until: WaitUntil::NetworkIdle,
		}
	}
}

/// Per-call navigation overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigateOptions {
	pub timeout: Option<Duration>,
	pub wait_until: Option<WaitUntil>,
}

/// Open/closed status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
	Open,
	Closed,
}

/// One live, exclusively owned browser page plus its navigation state.
///
/// The session is the only component that ever touches its engine
/// handle; tests receive `&mut Session` and nothing else.
pub struct Session {
	engine: Box<dyn PageEngine>,
	config: SessionConfig,
	current_url: Option<String>,
	status: SessionStatus,
	cancel: CancellationToken,
}

impl Session {
	/// Opens a session over an exclusively owned engine page.
	pub fn open(engine: Box<dyn PageEngine>, config: SessionConfig) -> Self {
		Self {
			engine,
			config,
			current_url: None,
			status: SessionStatus::Open,
			cancel: CancellationToken::new(),
		}
	}

	/// Ties this session's blocking operations to `token`.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancel = token;
		self
	}

	pub fn status(&self) -> SessionStatus {
		self.status
	}

	pub fn is_open(&self) -> bool {
		self.status == SessionStatus::Open
	}

	/// URL of the last successful navigation.
	pub fn current_url(&self) -> Option<&str> {
		self.current_url.as_deref()
	}

	pub fn config(&self) -> &SessionConfig {
		&self.config
	}

	pub(crate) fn ensure_open(&self) -> Result<()> {
		match self.status {
			SessionStatus::Open => Ok(()),
			SessionStatus::Closed => Err(PogoError::InvalidSession),
		}
	}

	pub(crate) fn engine(&self) -> &dyn PageEngine {
		self.engine.as_ref()
	}

	pub(crate) fn cancel_token(&self) -> &CancellationToken {
		&self.cancel
	}

	/// Navigates to `url`, suspending until readiness or deadline.
	///
	/// The current URL is updated only when navigation succeeds; on any
	/// failure it keeps its previous value.
	pub async fn navigate(&mut self, url: &str, options: NavigateOptions) -> Result<()> {
		self.ensure_open()?;

		let deadline = options.timeout.unwrap_or(self.config.default_timeout);
		let wait_until = options.wait_until.unwrap_or(self.config.wait_until);
		info!(
			target = "pogo.session",
			%url,
			%wait_until,
			timeout_ms = deadline.as_millis() as u64,
			"navigate"
		);

		let cancel = self.cancel.clone();
		let started = Instant::now();

		let outcome = tokio::select! {
			_ = cancel.cancelled() => {
				return Err(PogoError::Cancelled(format!("navigation to {url} aborted")));
			}
			outcome = timeout(deadline, self.engine.goto_url(url, wait_until)) => outcome,
		};

		match outcome {
			Err(_) => Err(PogoError::NavigationTimeout {
				url: url.to_string(),
				elapsed: started.elapsed(),
			}),
			Ok(Err(source)) => Err(PogoError::Navigation {
				url: url.to_string(),
				source,
			}),
			Ok(Ok(())) => {
				self.current_url = Some(url.to_string());
				Ok(())
			}
		}
	}

	/// Returns the current document title.
	pub async fn title(&self) -> Result<String> {
		self.ensure_open()?;
		Ok(self.engine.document_title().await?)
	}

	/// Resolves `locator` to a live handle. See [`resolver::resolve`].
	pub async fn resolve(&self, locator: &Locator) -> Result<ElementHandle> {
		resolver::resolve(self, locator).await
	}

	/// Resolves `locator` and extracts trimmed text. See [`resolver::resolve_text`].
	pub async fn resolve_text(&self, locator: &Locator) -> Result<String> {
		resolver::resolve_text(self, locator).await
	}

	/// Closes the session, releasing the page. Idempotent.
	pub async fn close(&mut self) -> Result<()> {
		if self.status == SessionStatus::Closed {
			return Ok(());
		}

		debug!(target = "pogo.session", url = ?self.current_url, "close");
		self.engine.close_page().await?;
		self.status = SessionStatus::Closed;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use pogo_engine::{FixtureEngine, FixturePage};

	use super::*;

	fn session_over(engine: FixtureEngine) -> Session {
		Session::open(Box::new(engine), SessionConfig::default())
	}

	#[tokio::test]
	async fn title_on_closed_session_is_invalid() {
		let mut session = session_over(FixtureEngine::new());
		session.close().await.unwrap();

		assert!(matches!(session.title().await, Err(PogoError::InvalidSession)));
	}

	#[tokio::test]
	async fn close_twice_is_a_noop() {
		let mut session = session_over(FixtureEngine::new());
		session.close().await.unwrap();
		session.close().await.unwrap();
		assert!(!session.is_open());
	}

	#[tokio::test]
	async fn failed_navigation_keeps_current_url() {
		let engine = FixtureEngine::new().with_page("http://app.local/", FixturePage::new("App"));
		let mut session = session_over(engine);

		session.navigate("http://app.local/", NavigateOptions::default()).await.unwrap();
		let err = session
			.navigate("http://nowhere.local/", NavigateOptions::default())
			.await
			.unwrap_err();

		assert!(matches!(err, PogoError::Navigation { .. }));
		assert_eq!(session.current_url(), Some("http://app.local/"));
	}

	#[tokio::test]
	async fn cancelled_navigation_reports_cancellation() {
		let engine = FixtureEngine::new().with_unreachable("http://hang.local/");
		let token = CancellationToken::new();
		token.cancel();
		let mut session = session_over(engine).with_cancellation(token);

		let err = session
			.navigate("http://hang.local/", NavigateOptions::default())
			.await
			.unwrap_err();
		assert!(matches!(err, PogoError::Cancelled(_)));
		assert_eq!(session.current_url(), None);
	}
}
