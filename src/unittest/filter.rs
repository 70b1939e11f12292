//! Test filter construction for a configured suite.

use crate::config::TestSuite;

/// Entry that selects every test of a suite.
pub const WILDCARD: &str = "*";

/// Which tests of a suite one invocation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestFilter {
    /// No filter argument at all.
    All,
    /// Only the named tests.
    Include(Vec<String>),
    /// Everything except the named tests.
    Exclude(Vec<String>),
}

impl TestFilter {
    /// Filter expression as understood by the test binary, e.g. `-a:b:`.
    ///
    /// Every name is followed by `:`; names must not contain it themselves.
    pub fn expression(&self) -> Option<String> {
        fn joined(names: &[String]) -> String {
            names.iter().map(|n| format!("{n}:")).collect()
        }

        match self {
            TestFilter::All => None,
            TestFilter::Include(names) => Some(joined(names)),
            TestFilter::Exclude(names) => Some(format!("-{}", joined(names))),
        }
    }

    /// Complete command line argument, e.g. `--gtest_filter=-a:b:`.
    pub fn to_arg(&self, flag: &str) -> Option<String> {
        self.expression().map(|expr| format!("{flag}{expr}"))
    }
}

/// One run of a suite's test executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub filter: TestFilter,
    /// Append to the suite output file instead of starting it fresh
    pub append: bool,
}

/// Runs issued for one suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuitePlan {
    pub primary: Invocation,
    /// Tests excluded from the primary run, run on their own afterwards
    /// when the primary run could be launched.
    pub isolated: Option<Invocation>,
}

impl SuitePlan {
    pub fn for_suite(suite: &TestSuite) -> Self {
        match suite.tests.split_first() {
            Some((first, rest)) if first == WILDCARD => {
                if rest.is_empty() {
                    Self::single(TestFilter::All)
                } else {
                    Self {
                        primary: Invocation {
                            filter: TestFilter::Exclude(rest.to_vec()),
                            append: false,
                        },
                        isolated: Some(Invocation {
                            filter: TestFilter::Include(rest.to_vec()),
                            append: true,
                        }),
                    }
                }
            }
            _ => Self::single(TestFilter::Include(suite.tests.clone())),
        }
    }

    fn single(filter: TestFilter) -> Self {
        Self {
            primary: Invocation {
                filter,
                append: false,
            },
            isolated: None,
        }
    }
}
