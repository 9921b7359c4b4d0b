use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;
use crate::styles::cli_styles;

/// Root CLI for the pogo test runner.
#[derive(Parser, Debug)]
#[command(name = "pogo")]
#[command(about = "Page-object end-to-end test runner")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: text (default) or json
	#[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
	pub format: OutputFormat,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Discover spec files and run them against a browser.
	Run(RunArgs),
	/// List the suites and cases a glob would run.
	List(ListArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
	/// Spec file glob (for example: specs/**/*.json)
	#[arg(value_name = "GLOB")]
	pub glob: String,

	/// Base URL that relative step URLs resolve against
	#[arg(long = "base-url", short = 'u', value_name = "URL")]
	pub base_url: Option<String>,

	/// Default navigation timeout in milliseconds
	#[arg(long, value_name = "MS")]
	pub timeout_ms: Option<u64>,

	/// Abort the whole run after this many milliseconds
	#[arg(long, value_name = "MS")]
	pub run_timeout_ms: Option<u64>,

	/// Run the browser with a visible window
	#[arg(long)]
	pub headful: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
	/// Spec file glob
	#[arg(value_name = "GLOB")]
	pub glob: String,
}

#[cfg(test)]
mod tests {
	use clap::Parser;

	use super::*;

	#[test]
	fn run_args_parse() {
		let cli = Cli::parse_from(["pogo", "run", "specs/*.json", "-u", "http://localhost:3000", "--timeout-ms", "5000"]);
		match cli.command {
			Commands::Run(args) => {
				assert_eq!(args.glob, "specs/*.json");
				assert_eq!(args.base_url.as_deref(), Some("http://localhost:3000"));
				assert_eq!(args.timeout_ms, Some(5000));
				assert!(!args.headful);
			}
			_ => panic!("expected run subcommand"),
		}
	}

	#[test]
	fn format_flag_is_global() {
		let cli = Cli::parse_from(["pogo", "run", "specs/*.json", "-f", "json"]);
		assert_eq!(cli.format, OutputFormat::Json);
	}
}
