//! Placeholder substitution for configured path templates.

use serde::Serialize;
use std::fmt;
use std::path::{PathBuf, MAIN_SEPARATOR};

/// Matches every value of a selector.
pub const ANY: &str = "*";

const TARGET: &str = "[TARGET]";
const PLATFORM: &str = "[PLATFORM]";
const CPU: &str = "[CPU]";
const CONFIGURATION: &str = "[CONFIGURATION]";
const GN_OUT: &str = "[GN_OUT]";
const BUILD_OUTPUT: &str = "[BUILD_OUTPUT]";

/// The four build dimensions a template can be narrowed by.
///
/// Each one is either a concrete value or `*`. Empty values are stored as `*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selectors {
    pub target: String,
    pub platform: String,
    pub cpu: String,
    pub configuration: String,
}

impl Selectors {
    pub fn new(target: &str, platform: &str, cpu: &str, configuration: &str) -> Self {
        Self {
            target: normalize(target),
            platform: normalize(platform),
            cpu: normalize(cpu),
            configuration: normalize(configuration),
        }
    }

    /// Selectors matching every target, platform, CPU and configuration.
    pub fn any() -> Self {
        Self::new(ANY, ANY, ANY, ANY)
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for Selectors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.target, self.platform, self.cpu, self.configuration
        )
    }
}

fn normalize(value: &str) -> String {
    if value.is_empty() {
        ANY.to_string()
    } else {
        value.to_string()
    }
}

/// A configured path containing `[TOKEN]` placeholders and `*` wildcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate<'a> {
    template: &'a str,
}

impl<'a> PathTemplate<'a> {
    pub fn new(template: &'a str) -> Self {
        Self { template }
    }

    /// Substitute the selector tokens and both base path tokens.
    pub fn resolve(&self, selectors: &Selectors, gn_out: &str, build_output: &str) -> String {
        // Base paths first, so a selector value can never be mistaken for a token
        self.template
            .replace(GN_OUT, gn_out)
            .replace(BUILD_OUTPUT, build_output)
            .replace(TARGET, &selectors.target)
            .replace(PLATFORM, &selectors.platform)
            .replace(CPU, &selectors.cpu)
            .replace(CONFIGURATION, &selectors.configuration)
    }
}

/// Convert a path written with either separator to the host convention.
pub fn to_platform_path(path: &str) -> PathBuf {
    let converted: String = path
        .chars()
        .map(|c| if c == '/' || c == '\\' { MAIN_SEPARATOR } else { c })
        .collect();
    PathBuf::from(converted)
}
