//! Page-object end-to-end test runner core.
//!
//! Three pieces, leaves first:
//!
//! * [`Locator`] + [`resolver`]: declarative element descriptors resolved
//!   against a live page with poll/timeout semantics.
//! * [`Session`]: exclusive ownership of one browser page's lifecycle.
//! * [`Suite`]: strictly sequential test orchestration producing
//!   immutable [`TestResult`] records.
//!
//! The core talks to the browser only through [`pogo_engine::PageEngine`];
//! swap the engine and nothing above it changes.

pub mod check;
mod error;
mod locator;
mod report;
pub mod resolver;
mod session;
mod suite;

pub use pogo_engine as engine;
pub use pogo_engine::{ElementHandle, WaitUntil};

pub use crate::error::{PogoError, Result};
pub use crate::locator::{Locator, WaitPolicy};
pub use crate::report::{Outcome, SuiteReport, TestResult};
pub use crate::session::{NavigateOptions, Session, SessionConfig, SessionStatus, Viewport};
pub use crate::suite::{SessionFactory, Suite, TestFuture};
