//! Case and suite orchestration
//!
//! Suite → for each case → runner executes the plan in a fresh workspace
//! directory → the case evaluates its assertions → a report is recorded.

mod case;
mod report;
mod suite;
mod workspace;

pub use case::TestCase;
pub use report::{SuiteReport, TestCaseReport};
pub use suite::TestSuite;
pub use workspace::Workspace;
pub(crate) use workspace::sanitize;
