//! pogo CLI: spec-file discovery, suite execution, result reporting.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod runner;
pub mod spec;
pub mod styles;
