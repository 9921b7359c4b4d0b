//! Browser-engine contract and adapters.
//!
//! The runner core depends on exactly four collaborator primitives:
//! navigate, query, title, and close. [`PageEngine`] captures that
//! contract; [`cdp`] implements it over headless Chrome and [`fixture`]
//! implements it in memory for deterministic tests.

pub mod cdp;
mod error;
pub mod fixture;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use crate::cdp::{CdpBrowser, CdpBrowserConfig, CdpEngine};
pub use crate::error::{EngineError, Result};
pub use crate::fixture::{FixtureEngine, FixturePage};

/// Readiness condition ending a navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
	/// `load` event fired.
	#[default]
	Load,
	/// DOM parsed; subresources may still be loading.
	DomContentLoaded,
	/// No in-flight network activity for a quiet window.
	NetworkIdle,
}

impl std::fmt::Display for WaitUntil {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			WaitUntil::Load => write!(f, "load"),
			WaitUntil::DomContentLoaded => write!(f, "domcontentloaded"),
			WaitUntil::NetworkIdle => write!(f, "networkidle"),
		}
	}
}

/// Snapshot of a matched DOM element.
///
/// Handles are plain values: they never keep the DOM alive and never
/// observe mutations made after the query that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementHandle {
	/// Selector that matched this element.
	pub selector: String,
	/// Text content, when the element had any.
	pub text: Option<String>,
	/// Lowercase tag name, when the engine reports one.
	pub tag_name: Option<String>,
}

/// The four collaborator primitives the runner core depends on.
///
/// Implementations own the transport to a real (or simulated) browser;
/// nothing above this trait knows which engine is in play.
#[async_trait]
pub trait PageEngine: Send + Sync {
	/// Drives the page to `url`, resolving once `wait_until` holds.
	///
	/// Engines do not enforce a deadline here; the caller owns the timeout
	/// and abandons the returned future when it expires.
	async fn goto_url(&self, url: &str, wait_until: WaitUntil) -> Result<()>;

	/// Probes the DOM once for the first element matching `selector`.
	async fn query_dom_selector(&self, selector: &str) -> Result<Option<ElementHandle>>;

	/// Returns the current document title.
	async fn document_title(&self) -> Result<String>;

	/// Releases the underlying page. Safe to call repeatedly.
	async fn close_page(&self) -> Result<()>;
}
