//! Builds suites from spec files and executes them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pogo::{Locator, NavigateOptions, Session, SessionConfig, SessionFactory, Suite, SuiteReport, check};
use pogo_engine::{CdpBrowser, CdpBrowserConfig};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::{ListArgs, RunArgs};
use crate::config::RunConfig;
use crate::error::{CliError, Result};
use crate::output::{self, OutputFormat};
use crate::spec::{self, SpecFile, Step};

/// Hands out one fresh CDP-backed session per test case.
pub struct CdpSessionFactory {
	browser: CdpBrowser,
	session_config: SessionConfig,
}

impl CdpSessionFactory {
	/// Launches the browser once; pages are created per case.
	pub async fn launch(config: &RunConfig) -> Result<Self> {
		let session_config = SessionConfig {
			headless: config.headless,
			default_timeout: config.default_timeout,
			..Default::default()
		};

		let browser = CdpBrowser::launch(CdpBrowserConfig {
			headless: session_config.headless,
			window_size: (session_config.viewport.width, session_config.viewport.height),
			..Default::default()
		})
		.await
		.map_err(|e| CliError::Setup(format!("browser launch failed: {e}")))?;

		Ok(Self { browser, session_config })
	}

	/// Shuts the browser down; failures are logged, not fatal.
	pub async fn shutdown(self) {
		if let Err(err) = self.browser.close().await {
			warn!(target = "pogo.run", error = %err, "browser shutdown failed");
		}
	}
}

#[async_trait]
impl SessionFactory for CdpSessionFactory {
	async fn create(&self) -> pogo::Result<Session> {
		let engine = self.browser.new_engine().await?;
		Ok(Session::open(Box::new(engine), self.session_config.clone()))
	}
}

/// Builds a runnable [`Suite`] from a loaded spec file.
///
/// Step URLs are resolved against the base URL here, so configuration
/// problems surface before any browser work starts.
pub fn build_suite(spec: &SpecFile, config: &RunConfig, cancel: CancellationToken) -> Result<Suite> {
	let before_each = Arc::new(resolve_steps(&spec.before_each, config)?);

	let mut suite = Suite::new(spec.suite.as_str()).with_cancellation(cancel);

	if !before_each.is_empty() {
		let steps = Arc::clone(&before_each);
		suite.before_each(move |session: &mut Session| {
			let steps = Arc::clone(&steps);
			Box::pin(async move { run_steps(session, &steps).await })
		});
	}

	for case in &spec.cases {
		let steps = Arc::new(resolve_steps(&case.steps, config)?);
		suite.test(case.name.as_str(), move |session: &mut Session| {
			let steps = Arc::clone(&steps);
			Box::pin(async move { run_steps(session, &steps).await })
		});
	}

	Ok(suite)
}

fn resolve_steps(steps: &[Step], config: &RunConfig) -> Result<Vec<Step>> {
	steps
		.iter()
		.cloned()
		.map(|step| {
			Ok(match step {
				Step::Navigate { url, timeout_ms } => Step::Navigate {
					url: config.resolve_url(&url)?.to_string(),
					timeout_ms,
				},
				other => other,
			})
		})
		.collect()
}

async fn run_steps(session: &mut Session, steps: &[Step]) -> pogo::Result<()> {
	for step in steps {
		run_step(session, step).await?;
	}
	Ok(())
}

async fn run_step(session: &mut Session, step: &Step) -> pogo::Result<()> {
	match step {
		Step::Navigate { url, timeout_ms } => {
			let options = NavigateOptions {
				timeout: timeout_ms.map(Duration::from_millis),
				..Default::default()
			};
			session.navigate(url, options).await
		}
		Step::AssertTitle { equals } => {
			let title = session.title().await?;
			check::eq("document title", title.as_str(), equals.as_str())
		}
		Step::AssertText { selector, equals, timeout_ms } => {
			let text = session.resolve_text(&locator_for(selector, *timeout_ms)).await?;
			check::eq(&format!("text of {selector}"), text.as_str(), equals.as_str())
		}
		Step::WaitFor { selector, timeout_ms } => {
			session.resolve(&locator_for(selector, *timeout_ms)).await.map(|_| ())
		}
	}
}

fn locator_for(selector: &str, timeout_ms: Option<u64>) -> Locator {
	let locator = Locator::css(selector);
	match timeout_ms {
		Some(ms) => locator.with_timeout(Duration::from_millis(ms)),
		None => locator,
	}
}

/// Executes `pogo run`: discover, build, run, report.
///
/// Returns the process exit code.
pub async fn run(args: &RunArgs, format: OutputFormat) -> Result<i32> {
	let config = RunConfig::resolve(args)?;
	let files = spec::discover(&args.glob)?;
	info!(target = "pogo.run", specs = files.len(), "discovered spec files");

	let mut specs = Vec::new();
	for path in &files {
		specs.push(spec::load(path)?);
	}

	// Validate and build everything before the browser launches.
	let cancel = CancellationToken::new();
	let mut suites = Vec::new();
	for spec in &specs {
		suites.push(build_suite(spec, &config, cancel.clone())?);
	}

	let factory = CdpSessionFactory::launch(&config).await?;

	if let Some(limit) = config.run_timeout {
		let cancel = cancel.clone();
		tokio::spawn(async move {
			tokio::time::sleep(limit).await;
			warn!(target = "pogo.run", timeout_ms = limit.as_millis() as u64, "run timeout reached; cancelling");
			cancel.cancel();
		});
	}

	let mut reports: Vec<SuiteReport> = Vec::with_capacity(suites.len());
	for suite in &mut suites {
		reports.push(suite.run(&factory).await?);
	}

	factory.shutdown().await;

	output::print_reports(&reports, format)?;
	Ok(output::exit_code(&reports))
}

/// Executes `pogo list`: print suites and cases without running them.
pub fn list(args: &ListArgs) -> Result<i32> {
	let files = spec::discover(&args.glob)?;

	for path in &files {
		let spec = spec::load(path)?;
		println!("{} ({})", spec.suite, path.display());
		for case in &spec.cases {
			println!("  {}", case.name);
		}
	}

	Ok(crate::error::EXIT_OK)
}
