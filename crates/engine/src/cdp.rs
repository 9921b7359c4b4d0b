//! chromiumoxide-backed engine.
//!
//! [`CdpBrowser`] owns the Chrome process and its CDP event loop;
//! [`CdpEngine`] wraps one tab and exposes it through the
//! [`PageEngine`] contract. Readiness is polled via `document.readyState`
//! and DOM probes go through JSON-escaped `querySelector` evaluation.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page as ChromePage;
use futures::StreamExt;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{ElementHandle, EngineError, PageEngine, Result, WaitUntil};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Launch configuration for the Chrome engine.
#[derive(Debug, Clone)]
pub struct CdpBrowserConfig {
	/// Run without a visible window.
	pub headless: bool,
	/// Browser window size.
	pub window_size: (u32, u32),
	/// Extra Chrome arguments appended to the defaults.
	pub args: Vec<String>,
	/// Chrome executable path (`None` = auto-detect).
	pub chrome_path: Option<String>,
}

impl Default for CdpBrowserConfig {
	fn default() -> Self {
		Self {
			headless: true,
			window_size: (1280, 720),
			// --no-sandbox is required where user namespaces are unavailable
			// (containers, most CI); --disable-dev-shm-usage avoids /dev/shm
			// exhaustion in the same environments.
			args: vec!["--no-sandbox".to_string(), "--disable-dev-shm-usage".to_string()],
			chrome_path: None,
		}
	}
}

impl CdpBrowserConfig {
	fn to_browser_config(&self) -> Result<BrowserConfig> {
		let mut config = BrowserConfig::builder();

		if self.headless {
			config = config.arg("--headless");
		}

		config = config.arg(format!("--window-size={},{}", self.window_size.0, self.window_size.1));

		// Unique user-data-dir so parallel launches don't fight over
		// Chrome's ProcessSingleton lock.
		let user_data_dir = std::env::temp_dir().join(format!("pogo-engine-{}", uuid::Uuid::new_v4()));
		config = config.arg(format!("--user-data-dir={}", user_data_dir.display()));

		for arg in &self.args {
			config = config.arg(arg.clone());
		}

		if let Some(path) = &self.chrome_path {
			config = config.chrome_executable(path.clone());
		}

		config
			.build()
			.map_err(|e| EngineError::Launch(format!("invalid browser configuration: {e}")))
	}
}

/// A managed Chrome process that hands out pages.
pub struct CdpBrowser {
	inner: Mutex<Option<Browser>>,
}

impl CdpBrowser {
	/// Launches Chrome and starts driving its CDP event stream.
	pub async fn launch(config: CdpBrowserConfig) -> Result<Self> {
		let browser_config = config.to_browser_config()?;

		let (browser, mut handler) = Browser::launch(browser_config)
			.await
			.map_err(|e| EngineError::Launch(e.to_string()))?;

		// chromiumoxide needs its handler stream driven for CDP traffic to flow.
		tokio::spawn(async move {
			while let Some(event) = handler.next().await {
				if let Err(err) = event {
					warn!(target = "pogo.engine", error = %err, "cdp handler error");
				}
			}
		});

		debug!(target = "pogo.engine", headless = config.headless, "browser launched");

		Ok(Self {
			inner: Mutex::new(Some(browser)),
		})
	}

	/// Opens a fresh tab wrapped as a [`PageEngine`].
	pub async fn new_engine(&self) -> Result<CdpEngine> {
		let guard = self.inner.lock().await;
		let browser = guard.as_ref().ok_or(EngineError::PageClosed)?;

		let page = browser
			.new_page("about:blank")
			.await
			.map_err(|e| EngineError::Protocol(e.to_string()))?;

		Ok(CdpEngine {
			page: Mutex::new(Some(page)),
		})
	}

	/// Shuts the browser process down. Idempotent.
	pub async fn close(&self) -> Result<()> {
		if let Some(mut browser) = self.inner.lock().await.take() {
			debug!(target = "pogo.engine", "closing browser");
			browser
				.close()
				.await
				.map_err(|e| EngineError::Protocol(e.to_string()))?;
		}
		Ok(())
	}
}

/// One Chrome tab exposed through the engine contract.
pub struct CdpEngine {
	page: Mutex<Option<ChromePage>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Probe {
	exists: bool,
	#[serde(default)]
	text: Option<String>,
	#[serde(default)]
	tag_name: Option<String>,
}

impl CdpEngine {
	async fn evaluate<T: DeserializeOwned>(&self, script: &str) -> Result<T> {
		let guard = self.page.lock().await;
		let page = guard.as_ref().ok_or(EngineError::PageClosed)?;

		let result = page
			.evaluate(script)
			.await
			.map_err(|e| EngineError::Protocol(e.to_string()))?;

		result.into_value().map_err(|e| EngineError::Protocol(e.to_string()))
	}

	fn ready_states(wait_until: WaitUntil) -> &'static [&'static str] {
		match wait_until {
			WaitUntil::DomContentLoaded => &["interactive", "complete"],
			// Plain evaluation exposes no direct network-idle signal;
			// document completeness is the closest observable condition.
			WaitUntil::Load | WaitUntil::NetworkIdle => &["complete"],
		}
	}
}

#[async_trait]
impl PageEngine for CdpEngine {
	async fn goto_url(&self, url: &str, wait_until: WaitUntil) -> Result<()> {
		{
			let guard = self.page.lock().await;
			let page = guard.as_ref().ok_or(EngineError::PageClosed)?;
			page.goto(url).await.map_err(|e| EngineError::Navigation {
				url: url.to_string(),
				reason: e.to_string(),
			})?;
		}

		// No deadline here per the PageEngine contract; the caller times
		// this future out.
		loop {
			let state: String = self.evaluate("document.readyState").await?;
			if Self::ready_states(wait_until).contains(&state.as_str()) {
				return Ok(());
			}
			sleep(READY_POLL_INTERVAL).await;
		}
	}

	async fn query_dom_selector(&self, selector: &str) -> Result<Option<ElementHandle>> {
		// JSON-escape the selector so quotes and backslashes cannot break
		// out of the script string.
		let escaped = serde_json::to_string(selector).map_err(|e| EngineError::Protocol(e.to_string()))?;
		let script = format!(
			"(() => {{ const el = document.querySelector({escaped}); \
			 return el ? {{ exists: true, text: el.textContent, tagName: el.tagName.toLowerCase() }} \
			 : {{ exists: false }}; }})()"
		);

		let probe: Probe = self.evaluate(&script).await?;
		if !probe.exists {
			return Ok(None);
		}

		Ok(Some(ElementHandle {
			selector: selector.to_string(),
			text: probe.text,
			tag_name: probe.tag_name,
		}))
	}

	async fn document_title(&self) -> Result<String> {
		self.evaluate("document.title").await
	}

	async fn close_page(&self) -> Result<()> {
		if let Some(page) = self.page.lock().await.take() {
			if let Err(err) = page.close().await {
				warn!(target = "pogo.engine", error = %err, "page close failed");
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ready_states_for_domcontentloaded_accept_interactive() {
		assert!(CdpEngine::ready_states(WaitUntil::DomContentLoaded).contains(&"interactive"));
		assert!(!CdpEngine::ready_states(WaitUntil::Load).contains(&"interactive"));
	}

	#[tokio::test]
	#[ignore] // Requires Chrome to be installed
	async fn browser_launch_and_close() {
		let browser = CdpBrowser::launch(CdpBrowserConfig::default())
			.await
			.expect("failed to launch browser");

		let engine = browser.new_engine().await.expect("failed to open page");
		engine
			.goto_url("about:blank", WaitUntil::Load)
			.await
			.expect("failed to navigate");

		engine.close_page().await.expect("failed to close page");
		browser.close().await.expect("failed to close browser");
	}
}
