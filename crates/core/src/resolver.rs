//! Locator resolution with poll/timeout semantics.
//!
//! One polymorphic routine replaces per-field page-object getters: a
//! [`Locator`] describes the element and its wait policy, the resolver
//! turns it into a live handle against an open [`Session`].

use pogo_engine::ElementHandle;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::error::{PogoError, Result};
use crate::locator::Locator;
use crate::session::Session;

/// Resolves `locator` against `session`, polling until found or timeout.
///
/// The first probe happens immediately. On timeout the error carries the
/// selector and the elapsed wait; resolution never gives up earlier than
/// the locator's configured timeout.
pub async fn resolve(session: &Session, locator: &Locator) -> Result<ElementHandle> {
	session.ensure_open()?;

	let wait = locator.wait();
	let cancel = session.cancel_token().clone();
	let started = Instant::now();

	loop {
		let probe = tokio::select! {
			_ = cancel.cancelled() => {
				return Err(PogoError::Cancelled(format!("locator poll aborted: {}", locator.selector())));
			}
			probe = session.engine().query_dom_selector(locator.selector()) => probe?,
		};

		if let Some(handle) = probe {
			debug!(
				target = "pogo.resolver",
				selector = %locator.selector(),
				elapsed_ms = started.elapsed().as_millis() as u64,
				"resolved"
			);
			return Ok(handle);
		}

		if started.elapsed() >= wait.timeout {
			return Err(PogoError::LocatorTimeout {
				selector: locator.selector().to_string(),
				elapsed: started.elapsed(),
			});
		}

		tokio::select! {
			_ = cancel.cancelled() => {
				return Err(PogoError::Cancelled(format!("locator poll aborted: {}", locator.selector())));
			}
			_ = sleep(wait.poll_interval) => {}
		}
	}
}

/// Resolves `locator` and returns its trimmed text content.
///
/// Fails with [`PogoError::EmptyContent`] when the element exists but
/// yields no text and the locator requires non-empty content.
pub async fn resolve_text(session: &Session, locator: &Locator) -> Result<String> {
	let handle = resolve(session, locator).await?;

	let text = handle.text.as_deref().map(str::trim).unwrap_or_default();
	if text.is_empty() && locator.requires_text() {
		return Err(PogoError::EmptyContent {
			selector: locator.selector().to_string(),
		});
	}

	Ok(text.to_string())
}
