//! Declarative element descriptors.

use std::time::Duration;

/// Default wait timeout for locator resolution.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default poll interval for locator resolution.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Retry policy applied while resolving a locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
	/// Maximum time to wait for a match.
	pub timeout: Duration,
	/// How often the DOM is probed.
	pub poll_interval: Duration,
}

impl WaitPolicy {
	pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
		Self { timeout, poll_interval }
	}
}

impl Default for WaitPolicy {
	fn default() -> Self {
		Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
	}
}

/// Immutable descriptor identifying a page element.
///
/// A locator is a pure value: selector plus wait policy. Construction
/// goes through the consuming builder; nothing mutates a locator after
/// that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
	selector: String,
	wait: WaitPolicy,
	require_text: bool,
}

impl Locator {
	/// Creates a locator for a CSS selector with the default wait policy.
	pub fn css(selector: impl Into<String>) -> Self {
		Self {
			selector: selector.into(),
			wait: WaitPolicy::default(),
			require_text: false,
		}
	}

	/// Sets the resolution timeout.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.wait.timeout = timeout;
		self
	}

	/// Sets the DOM poll interval.
	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.wait.poll_interval = poll_interval;
		self
	}

	/// Requires resolved text to be non-empty;
	/// [`resolver::resolve_text`](crate::resolver::resolve_text) fails with
	/// [`EmptyContent`](crate::PogoError::EmptyContent) otherwise.
	pub fn with_required_text(mut self) -> Self {
		self.require_text = true;
		self
	}

	pub fn selector(&self) -> &str {
		&self.selector
	}

	pub fn wait(&self) -> WaitPolicy {
		self.wait
	}

	pub fn requires_text(&self) -> bool {
		self.require_text
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_constants() {
		let locator = Locator::css("a.App-link");
		assert_eq!(locator.selector(), "a.App-link");
		assert_eq!(locator.wait().timeout, DEFAULT_TIMEOUT);
		assert_eq!(locator.wait().poll_interval, DEFAULT_POLL_INTERVAL);
		assert!(!locator.requires_text());
	}

	#[test]
	fn builder_round_trip() {
		let locator = Locator::css("#root")
			.with_timeout(Duration::from_secs(5))
			.with_poll_interval(Duration::from_millis(50))
			.with_required_text();

		assert_eq!(locator.wait().timeout, Duration::from_secs(5));
		assert_eq!(locator.wait().poll_interval, Duration::from_millis(50));
		assert!(locator.requires_text());
	}
}
