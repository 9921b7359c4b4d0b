//! Declarative spec files and glob discovery.
//!
//! A spec file is the serialized form of one suite: setup steps run
//! before every case, and each case is a named list of steps.
//!
//! ```json
//! {
//!   "suite": "React App",
//!   "beforeEach": [{ "navigate": { "url": "/" } }],
//!   "cases": [
//!     {
//!       "name": "should show the correct link",
//!       "steps": [
//!         { "assertText": { "selector": "a.App-link", "equals": "Learn React" } }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// One suite as loaded from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpecFile {
	/// Suite name reported in results.
	pub suite: String,

	/// Steps run before every case.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub before_each: Vec<Step>,

	/// Test cases in declaration order.
	pub cases: Vec<SpecCase>,
}

/// One named test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpecCase {
	pub name: String,
	pub steps: Vec<Step>,
}

/// One executable step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", deny_unknown_fields)]
pub enum Step {
	/// Navigate to a URL (absolute, or relative to the base URL).
	Navigate {
		url: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		timeout_ms: Option<u64>,
	},

	/// Assert the document title equals `equals`.
	AssertTitle { equals: String },

	/// Assert an element's trimmed text equals `equals`.
	AssertText {
		selector: String,
		equals: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		timeout_ms: Option<u64>,
	},

	/// Wait until an element matching `selector` exists.
	WaitFor {
		selector: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		timeout_ms: Option<u64>,
	},
}

/// Expands `pattern` and returns matching spec files, sorted.
pub fn discover(pattern: &str) -> Result<Vec<PathBuf>> {
	let entries = glob::glob(pattern).map_err(|e| CliError::Config(format!("invalid glob {pattern:?}: {e}")))?;

	let mut files = Vec::new();
	for entry in entries {
		let path = entry.map_err(|e| CliError::Config(format!("cannot read glob entry: {e}")))?;
		if path.is_file() {
			files.push(path);
		}
	}
	files.sort();

	if files.is_empty() {
		return Err(CliError::Config(format!("no spec files match {pattern:?}")));
	}

	Ok(files)
}

/// Loads and validates one spec file.
pub fn load(path: &Path) -> Result<SpecFile> {
	let raw = fs::read_to_string(path).map_err(|e| CliError::Spec {
		path: path.to_path_buf(),
		reason: e.to_string(),
	})?;

	let spec: SpecFile = serde_json::from_str(&raw).map_err(|e| CliError::Spec {
		path: path.to_path_buf(),
		reason: e.to_string(),
	})?;

	if spec.cases.is_empty() {
		return Err(CliError::Spec {
			path: path.to_path_buf(),
			reason: "spec has no cases".to_string(),
		});
	}

	Ok(spec)
}
