//! In-memory engine for deterministic tests.
//!
//! A [`FixtureEngine`] serves registered pages without a browser. Pages
//! can delay their load, individual elements can appear late, and URLs
//! can be marked unreachable (their navigation never resolves), which is
//! enough to exercise every timeout path in the runner core.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::{Instant, sleep};

use crate::{ElementHandle, EngineError, PageEngine, Result, WaitUntil};

/// One element served by a [`FixturePage`].
#[derive(Debug, Clone)]
struct FixtureElement {
	selector: String,
	text: Option<String>,
	tag_name: Option<String>,
	appears_after: Option<Duration>,
}

/// A page served by the fixture engine.
#[derive(Debug, Clone, Default)]
pub struct FixturePage {
	title: String,
	elements: Vec<FixtureElement>,
	load_delay: Option<Duration>,
}

impl FixturePage {
	/// Creates a page with the given document title.
	pub fn new(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			elements: Vec::new(),
			load_delay: None,
		}
	}

	/// Adds an element with text content.
	pub fn with_element(mut self, selector: impl Into<String>, text: impl Into<String>) -> Self {
		self.elements.push(FixtureElement {
			selector: selector.into(),
			text: Some(text.into()),
			tag_name: None,
			appears_after: None,
		});
		self
	}

	/// Adds an element that exists but carries no text.
	pub fn with_empty_element(mut self, selector: impl Into<String>, tag_name: impl Into<String>) -> Self {
		self.elements.push(FixtureElement {
			selector: selector.into(),
			text: None,
			tag_name: Some(tag_name.into()),
			appears_after: None,
		});
		self
	}

	/// Adds an element that only becomes queryable `appears_after` the page load.
	pub fn with_late_element(mut self, selector: impl Into<String>, text: impl Into<String>, appears_after: Duration) -> Self {
		self.elements.push(FixtureElement {
			selector: selector.into(),
			text: Some(text.into()),
			tag_name: None,
			appears_after: Some(appears_after),
		});
		self
	}

	/// Delays navigation completion by `delay`.
	pub fn with_load_delay(mut self, delay: Duration) -> Self {
		self.load_delay = Some(delay);
		self
	}
}

#[derive(Debug, Default)]
struct FixtureState {
	current: Option<String>,
	loaded_at: Option<Instant>,
	closed: bool,
}

/// In-memory [`PageEngine`] backed by registered fixture pages.
#[derive(Debug, Default)]
pub struct FixtureEngine {
	pages: HashMap<String, FixturePage>,
	unreachable: Vec<String>,
	state: Mutex<FixtureState>,
}

impl FixtureEngine {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a page under `url`.
	pub fn with_page(mut self, url: impl Into<String>, page: FixturePage) -> Self {
		self.pages.insert(url.into(), page);
		self
	}

	/// Registers a URL whose navigation never completes.
	pub fn with_unreachable(mut self, url: impl Into<String>) -> Self {
		self.unreachable.push(url.into());
		self
	}

	/// True once `close_page` has been called.
	pub fn is_closed(&self) -> bool {
		self.state.lock().closed
	}

	/// URL of the page most recently navigated to, if any.
	pub fn current_page(&self) -> Option<String> {
		self.state.lock().current.clone()
	}
}

#[async_trait]
impl PageEngine for FixtureEngine {
	async fn goto_url(&self, url: &str, _wait_until: WaitUntil) -> Result<()> {
		if self.state.lock().closed {
			return Err(EngineError::PageClosed);
		}

		if self.unreachable.iter().any(|u| u == url) {
			// Never resolves; the caller's deadline abandons this future.
			std::future::pending::<()>().await;
		}

		let Some(page) = self.pages.get(url) else {
			return Err(EngineError::Navigation {
				url: url.to_string(),
				reason: "no such fixture page".to_string(),
			});
		};

		if let Some(delay) = page.load_delay {
			sleep(delay).await;
		}

		let mut state = self.state.lock();
		if state.closed {
			return Err(EngineError::PageClosed);
		}
		state.current = Some(url.to_string());
		state.loaded_at = Some(Instant::now());
		Ok(())
	}

	async fn query_dom_selector(&self, selector: &str) -> Result<Option<ElementHandle>> {
		let state = self.state.lock();
		if state.closed {
			return Err(EngineError::PageClosed);
		}

		let Some(page) = state.current.as_deref().and_then(|url| self.pages.get(url)) else {
			return Ok(None);
		};

		for element in &page.elements {
			if element.selector != selector {
				continue;
			}
			if let (Some(after), Some(loaded_at)) = (element.appears_after, state.loaded_at) {
				if loaded_at.elapsed() < after {
					continue;
				}
			}
			return Ok(Some(ElementHandle {
				selector: selector.to_string(),
				text: element.text.clone(),
				tag_name: element.tag_name.clone(),
			}));
		}

		Ok(None)
	}

	async fn document_title(&self) -> Result<String> {
		let state = self.state.lock();
		if state.closed {
			return Err(EngineError::PageClosed);
		}
		Ok(state
			.current
			.as_deref()
			.and_then(|url| self.pages.get(url))
			.map(|page| page.title.clone())
			.unwrap_or_default())
	}

	async fn close_page(&self) -> Result<()> {
		self.state.lock().closed = true;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn engine() -> FixtureEngine {
		FixtureEngine::new().with_page(
			"http://fixture.local/",
			FixturePage::new("Fixture").with_element("#root", "hello"),
		)
	}

	#[tokio::test]
	async fn goto_then_query_finds_element() {
		let engine = engine();
		engine.goto_url("http://fixture.local/", WaitUntil::Load).await.unwrap();

		let handle = engine.query_dom_selector("#root").await.unwrap().unwrap();
		assert_eq!(handle.text.as_deref(), Some("hello"));
	}

	#[tokio::test]
	async fn query_before_navigation_matches_nothing() {
		let engine = engine();
		assert!(engine.query_dom_selector("#root").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn unknown_url_is_a_navigation_error() {
		let engine = engine();
		let err = engine.goto_url("http://nowhere.local/", WaitUntil::Load).await.unwrap_err();
		assert!(matches!(err, EngineError::Navigation { .. }));
	}

	#[tokio::test]
	async fn operations_after_close_fail() {
		let engine = engine();
		engine.close_page().await.unwrap();

		assert!(matches!(engine.document_title().await, Err(EngineError::PageClosed)));
		assert!(matches!(
			engine.goto_url("http://fixture.local/", WaitUntil::Load).await,
			Err(EngineError::PageClosed)
		));
	}

	#[tokio::test(start_paused = true)]
	async fn late_element_appears_after_delay() {
		let engine = FixtureEngine::new().with_page(
			"http://fixture.local/",
			FixturePage::new("Fixture").with_late_element("#late", "now", Duration::from_millis(200)),
		);
		engine.goto_url("http://fixture.local/", WaitUntil::Load).await.unwrap();

		assert!(engine.query_dom_selector("#late").await.unwrap().is_none());
		sleep(Duration::from_millis(250)).await;
		assert!(engine.query_dom_selector("#late").await.unwrap().is_some());
	}
}
