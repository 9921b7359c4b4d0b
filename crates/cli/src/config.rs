//! Run configuration resolved from flags and environment.

use std::time::Duration;

use url::Url;

use crate::cli::RunArgs;
use crate::error::{CliError, Result};

pub const ENV_BASE_URL: &str = "POGO_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "POGO_TIMEOUT_MS";
pub const ENV_HEADLESS: &str = "POGO_HEADLESS";

const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Effective configuration for one `pogo run` invocation.
#[derive(Debug, Clone)]
pub struct RunConfig {
	/// Base URL that relative step URLs resolve against.
	pub base_url: Option<Url>,
	/// Run the browser without a visible window.
	pub headless: bool,
	/// Deadline for navigations that do not override it.
	pub default_timeout: Duration,
	/// Optional deadline for the whole run.
	pub run_timeout: Option<Duration>,
}

impl RunConfig {
	/// Resolves configuration: flags first, then environment, then defaults.
	pub fn resolve(args: &RunArgs) -> Result<Self> {
		let raw_base = args.base_url.clone().or_else(|| std::env::var(ENV_BASE_URL).ok());
		let base_url = match raw_base {
			Some(raw) => Some(
				Url::parse(&raw).map_err(|e| CliError::Config(format!("invalid base URL {raw:?}: {e}")))?,
			),
			None => None,
		};

		let timeout_ms = match args.timeout_ms {
			Some(ms) => ms,
			None => env_u64(ENV_TIMEOUT_MS)?.unwrap_or(DEFAULT_TIMEOUT_MS),
		};

		let headless = if args.headful { false } else { env_headless()? };

		Ok(Self {
			base_url,
			headless,
			default_timeout: Duration::from_millis(timeout_ms),
			run_timeout: args.run_timeout_ms.map(Duration::from_millis),
		})
	}

	/// Resolves a step URL: absolute URLs pass through, relative ones join
	/// the configured base.
	pub fn resolve_url(&self, raw: &str) -> Result<Url> {
		if let Ok(absolute) = Url::parse(raw) {
			return Ok(absolute);
		}

		match &self.base_url {
			Some(base) => base
				.join(raw)
				.map_err(|e| CliError::Config(format!("cannot resolve {raw:?} against {base}: {e}"))),
			None => Err(CliError::Config(format!(
				"relative URL {raw:?} requires --base-url or {ENV_BASE_URL}"
			))),
		}
	}
}

fn env_u64(name: &str) -> Result<Option<u64>> {
	match std::env::var(name) {
		Ok(raw) => raw
			.parse::<u64>()
			.map(Some)
			.map_err(|_| CliError::Config(format!("{name} must be an integer, got {raw:?}"))),
		Err(_) => Ok(None),
	}
}

fn env_headless() -> Result<bool> {
	match std::env::var(ENV_HEADLESS) {
		Ok(raw) => match raw.as_str() {
			"1" | "true" => Ok(true),
			"0" | "false" => Ok(false),
			other => Err(CliError::Config(format!(
				"{ENV_HEADLESS} must be one of 1/0/true/false, got {other:?}"
			))),
		},
		Err(_) => Ok(true),
	}
}
