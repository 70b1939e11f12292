use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cleanup::CleanupAction;
use crate::error::{ConfigError, Result};
use crate::unittest::WILDCARD;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub prepare: PrepareConfig,
    pub unit_tests: UnitTestsConfig,
    pub selection: SelectionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the native source tree; every action runs from here
    pub root: PathBuf,
    /// GN output folder, substituted for `[GN_OUT]`
    pub gn_output_path: String,
    /// Build output folder, substituted for `[BUILD_OUTPUT]`
    pub build_output_path: String,
    /// Template of the per-target GN output folder
    pub gn_target_output_path: String,
    /// Template of the folder the built libraries are copied to
    pub built_libs_destination_path: String,
    /// Folder holding the `.flg` marker files of the idl compiler
    pub idl_flag_output_path: String,
    /// Folder holding the files generated by the idl compiler
    pub idl_generated_files_output_path: String,
}

/// A file copied into the tree during preparation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// A folder link created during preparation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderLink {
    pub target: PathBuf,
    pub link: PathBuf,
}

/// Links and folders created during preparation for one target variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareVariant {
    pub name: String,
    #[serde(default)]
    pub folders_to_link: Vec<FolderLink>,
    #[serde(default)]
    pub folders_to_generate: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareConfig {
    pub files_to_copy: Vec<FileCopy>,
    /// Reverted in this order
    pub variants: Vec<PrepareVariant>,
}

/// One native test executable and the test cases it should run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    /// Executable name, without extension
    pub name: String,
    /// `*` as the first entry runs everything except the remaining entries,
    /// and then the remaining entries on their own.
    pub tests: Vec<String>,
}

impl TestSuite {
    pub fn new(name: &str, tests: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            tests: tests.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitTestsConfig {
    /// Appended to the suite output file after every test executable run
    pub log_separator: String,
    /// Precedes the final pass/fail summary inside one run's output
    pub results_separator: String,
    /// Argument prefix used to pass the test filter
    pub filter_flag: String,
    /// Failure summary written into the working folder
    pub failures_log: String,
    /// Suites run in this order
    pub suites: Vec<TestSuite>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub targets: Vec<String>,
    pub platforms: Vec<String>,
    pub cpus: Vec<String>,
    pub configurations: Vec<String>,
    /// Actions performed by `clean` when none are given on the command line
    pub clean_actions: Vec<CleanupAction>,
    /// CPUs buildable per platform; platforms not listed accept any CPU
    pub supported_cpus: BTreeMap<String, Vec<String>>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("webrtc/xplatform/webrtc"),
            gn_output_path: "out".to_string(),
            build_output_path: "build_output".to_string(),
            gn_target_output_path: "[GN_OUT]/[TARGET]_[PLATFORM]_[CPU]_[CONFIGURATION]"
                .to_string(),
            built_libs_destination_path:
                "[BUILD_OUTPUT]/[TARGET]/[PLATFORM]/[CPU]/[CONFIGURATION]".to_string(),
            idl_flag_output_path: "out/idl/flags".to_string(),
            idl_generated_files_output_path: "out/idl/generated".to_string(),
        }
    }
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            files_to_copy: vec![],
            variants: vec![
                PrepareVariant {
                    name: "ortc".to_string(),
                    folders_to_link: vec![],
                    folders_to_generate: vec![],
                },
                PrepareVariant {
                    name: "webrtc".to_string(),
                    folders_to_link: vec![],
                    folders_to_generate: vec![],
                },
            ],
        }
    }
}

impl Default for UnitTestsConfig {
    fn default() -> Self {
        Self {
            log_separator: "\n<<<<<<<<<< UNIT TEST RUN END >>>>>>>>>>\n".to_string(),
            results_separator: "[==========]".to_string(),
            filter_flag: "--gtest_filter=".to_string(),
            failures_log: "UnitTestFailures.txt".to_string(),
            suites: vec![
                TestSuite::new("rtc_base_unittests", &["*"]),
                TestSuite::new("common_audio_unittests", &["*"]),
            ],
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        let mut supported_cpus = BTreeMap::new();
        supported_cpus.insert(
            "win".to_string(),
            vec!["x86".to_string(), "x64".to_string(), "arm64".to_string()],
        );
        supported_cpus.insert(
            "winuwp".to_string(),
            vec!["x86".to_string(), "x64".to_string(), "arm".to_string()],
        );

        Self {
            targets: vec!["webrtc".to_string()],
            platforms: vec!["win".to_string()],
            cpus: vec!["x64".to_string()],
            configurations: vec!["debug".to_string()],
            clean_actions: vec![CleanupAction::CleanOutput],
            supported_cpus,
        }
    }
}

impl SelectionConfig {
    /// Whether `cpu` can be built for `platform`.
    pub fn is_cpu_supported(&self, platform: &str, cpu: &str) -> bool {
        match self.supported_cpus.get(platform) {
            Some(cpus) => cpus.iter().any(|c| c == cpu),
            None => true,
        }
    }
}

impl Config {
    /// Location of the configuration file when none is given explicitly.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sdk-harness").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the file at
    /// [`Config::default_path`] is used when present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ParseError {
                path: path.clone(),
                source,
            })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration file");

        Ok(config)
    }

    /// Write the default configuration to `path`, replacing any existing file.
    pub fn write_default(path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&Self::default()).map_err(ConfigError::from)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::WriteError {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, content).map_err(|source| ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let unit_tests = &self.unit_tests;

        if unit_tests.log_separator.is_empty() || unit_tests.results_separator.is_empty() {
            return Err(ConfigError::Invalid(
                "unit test separators must not be empty".into(),
            ));
        }
        if unit_tests.log_separator == unit_tests.results_separator {
            return Err(ConfigError::Invalid(
                "log_separator and results_separator must differ".into(),
            ));
        }
        if unit_tests.failures_log.is_empty() {
            return Err(ConfigError::Invalid("failures_log must not be empty".into()));
        }

        for suite in &unit_tests.suites {
            if suite.name.is_empty() {
                return Err(ConfigError::Invalid("test suite name must not be empty".into()));
            }
            if suite.tests.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "test suite '{}' has no tests; use [\"*\"] to run all of them",
                    suite.name
                )));
            }
            for (idx, test) in suite.tests.iter().enumerate() {
                if test == WILDCARD && idx > 0 {
                    return Err(ConfigError::Invalid(format!(
                        "test suite '{}': '*' is only allowed as the first entry",
                        suite.name
                    )));
                }
                // ':' separates names in the filter expression
                if test.is_empty() || test.contains(':') {
                    return Err(ConfigError::Invalid(format!(
                        "test suite '{}': invalid test name '{}'",
                        suite.name, test
                    )));
                }
            }
        }

        Ok(())
    }
}
