//! Result reporting for the CLI.
//!
//! Text output is for humans; JSON is a stable envelope for tooling.
//! Either way stdout carries only results; diagnostics go to stderr
//! via tracing.

use colored::Colorize;
use pogo::{Outcome, SuiteReport};
use serde::Serialize;

use crate::error::{EXIT_FAILED, EXIT_OK, Result};

/// Output format for run results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text
	#[default]
	Text,
	/// JSON envelope
	Json,
}

/// Totals across every suite in a run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
	pub passed: usize,
	pub failed: usize,
	pub errored: usize,
}

impl RunSummary {
	pub fn tally(reports: &[SuiteReport]) -> Self {
		let mut summary = Self::default();
		for report in reports {
			summary.passed += report.count(Outcome::Passed);
			summary.failed += report.count(Outcome::Failed);
			summary.errored += report.count(Outcome::Errored);
		}
		summary
	}

	pub fn ok(&self) -> bool {
		self.failed == 0 && self.errored == 0
	}
}

/// JSON envelope printed for `--format json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunEnvelope<'a> {
	ok: bool,
	suites: &'a [SuiteReport],
	summary: RunSummary,
}

/// Prints run results to stdout in the selected format.
pub fn print_reports(reports: &[SuiteReport], format: OutputFormat) -> Result<()> {
	match format {
		OutputFormat::Text => print_text(reports),
		OutputFormat::Json => print_json(reports)?,
	}
	Ok(())
}

fn print_text(reports: &[SuiteReport]) {
	for report in reports {
		println!("{}", report.suite.bold());
		for result in &report.results {
			let mark = match result.outcome {
				Outcome::Passed => "✓".green(),
				Outcome::Failed => "✗".red(),
				Outcome::Errored => "!".yellow(),
			};
			println!("  {mark} {} ({}ms)", result.name, result.duration_ms);
			if let Some(message) = &result.message {
				println!("      {}", message.dimmed());
			}
		}
	}

	let summary = RunSummary::tally(reports);
	let line = format!(
		"{} passed, {} failed, {} errored",
		summary.passed, summary.failed, summary.errored
	);
	if summary.ok() {
		println!("\n{}", line.green());
	} else {
		println!("\n{}", line.red());
	}
}

fn print_json(reports: &[SuiteReport]) -> Result<()> {
	let summary = RunSummary::tally(reports);
	let envelope = RunEnvelope {
		ok: summary.ok(),
		suites: reports,
		summary,
	};
	println!("{}", serde_json::to_string_pretty(&envelope).map_err(std::io::Error::other)?);
	Ok(())
}

/// Maps run results onto the process exit-code contract.
pub fn exit_code(reports: &[SuiteReport]) -> i32 {
	if RunSummary::tally(reports).ok() { EXIT_OK } else { EXIT_FAILED }
}
