//! Unit test orchestration.
//!
//! Each configured suite is a native test executable. Its output is captured
//! in `<suite>.txt`, one record per run, and failures found there are
//! summarized in a failures log inside the working folder.

mod filter;
mod launcher;
mod results;
mod runner;

pub use filter::{Invocation, SuitePlan, TestFilter, WILDCARD};
pub use launcher::{CommandLine, LaunchOutput, ProcessLauncher, TestLauncher};
pub use results::{parse_results, FailureLog, Separators, FAILED_MARKER};
pub use runner::{SuiteReport, TestRunReport, UnitTestRunner};
