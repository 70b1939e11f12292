//! Runs every configured test suite against one build output folder.

use indicatif::ProgressBar;
use serde::Serialize;
use std::env::consts::EXE_SUFFIX;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{Config, TestSuite, UnitTestsConfig};
use crate::error::{HarnessError, Result};
use crate::template::{to_platform_path, PathTemplate, Selectors};
use crate::unittest::filter::{Invocation, SuitePlan};
use crate::unittest::launcher::{CommandLine, ProcessLauncher, TestLauncher};
use crate::unittest::results::{parse_results, FailureLog, Separators};
use crate::workdir::WorkingDir;

/// Outcome of one suite within a run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub name: String,
    /// Every run of the suite's executable could be launched.
    pub launched: bool,
    /// Failed test lines recorded for this suite.
    pub failed_tests: usize,
    /// The captured output was read and written to the failures log in
    /// full. When unset, `failed_tests` may undercount.
    pub results_recorded: bool,
}

/// Outcome of [`UnitTestRunner::run`].
#[derive(Debug, Clone, Serialize)]
pub struct TestRunReport {
    pub selectors: Selectors,
    pub working_folder: PathBuf,
    pub failures_log: PathBuf,
    pub failed_tests: usize,
    pub suites: Vec<SuiteReport>,
    pub elapsed_secs: f64,
}

impl TestRunReport {
    pub fn has_failures(&self) -> bool {
        self.failed_tests > 0
            || self
                .suites
                .iter()
                .any(|s| !s.launched || !s.results_recorded)
    }
}

/// Runs the configured unit test executables.
pub struct UnitTestRunner<L = ProcessLauncher> {
    root: PathBuf,
    gn_output_path: String,
    gn_target_output_path: String,
    settings: UnitTestsConfig,
    launcher: L,
    progress: Option<ProgressBar>,
}

impl UnitTestRunner<ProcessLauncher> {
    pub fn new(config: &Config) -> Self {
        Self::with_launcher(config, ProcessLauncher)
    }
}

impl<L: TestLauncher> UnitTestRunner<L> {
    pub fn with_launcher(config: &Config, launcher: L) -> Self {
        Self {
            root: config.paths.root.clone(),
            gn_output_path: config.paths.gn_output_path.clone(),
            gn_target_output_path: config.paths.gn_target_output_path.clone(),
            settings: config.unit_tests.clone(),
            launcher,
            progress: None,
        }
    }

    /// Report each suite on `progress` as it starts.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Folder holding the test executables for `selectors`.
    ///
    /// `working_path` replaces the path derived from the GN output template;
    /// either is taken relative to the configured root.
    pub fn working_folder(&self, selectors: &Selectors, working_path: Option<&Path>) -> PathBuf {
        let relative = match working_path {
            Some(path) => path.to_path_buf(),
            None => to_platform_path(&PathTemplate::new(&self.gn_target_output_path).resolve(
                selectors,
                &self.gn_output_path,
                "",
            )),
        };
        self.root.join(relative)
    }

    /// Run every configured suite for one target, platform, CPU and
    /// configuration.
    ///
    /// Failing tests are recorded in the failures log and the report, they do
    /// not make the run fail.
    pub fn run(&self, selectors: &Selectors, working_path: Option<&Path>) -> Result<TestRunReport> {
        let started = Instant::now();
        let _span = tracing::info_span!(
            "unit_tests",
            target = %selectors.target,
            platform = %selectors.platform,
            cpu = %selectors.cpu,
            configuration = %selectors.configuration
        )
        .entered();
        tracing::info!("Running unit tests for {}", selectors);

        let working_folder = self.working_folder(selectors, working_path);
        if !working_folder.is_dir() {
            tracing::error!(
                "Output folder at {} doesn't exist. It looks like prepare is not executed. Please run prepare action.",
                working_folder.display()
            );
            return Err(HarnessError::WorkingFolderNotExist(working_folder));
        }

        let dir = WorkingDir::enter(&working_folder)?;
        let failures_log = dir.path().join(&self.settings.failures_log);
        let mut failures = FailureLog::create(&failures_log).map_err(|source| HarnessError::Io {
            path: failures_log.clone(),
            source,
        })?;

        let mut suites = Vec::with_capacity(self.settings.suites.len());
        for suite in &self.settings.suites {
            if let Some(progress) = &self.progress {
                progress.set_message(suite.name.clone());
            }

            suites.push(self.execute_unit_test(dir.path(), suite, &mut failures));

            if let Some(progress) = &self.progress {
                progress.inc(1);
            }
        }

        let (failed_tests, _) = failures.finish().map_err(|source| HarnessError::Io {
            path: failures_log.clone(),
            source,
        })?;
        if failed_tests > 0 {
            tracing::warn!(
                "Some unit tests have failed. You can see the details in file {}",
                failures_log.display()
            );
        }

        let working_folder = dir.path().to_path_buf();
        drop(dir);

        tracing::info!(failed_tests, "Running unit tests for {} finished", selectors);

        Ok(TestRunReport {
            selectors: selectors.clone(),
            working_folder,
            failures_log,
            failed_tests,
            suites,
            elapsed_secs: started.elapsed().as_secs_f64(),
        })
    }

    /// Run one suite and record its failures.
    ///
    /// A suite configured as `*` plus exceptions runs twice: everything but
    /// the exceptions, then, if that run launched, only the exceptions. Both
    /// runs write to `<suite>.txt`, which is parsed afterwards either way.
    pub fn execute_unit_test<W: Write>(
        &self,
        program_dir: &Path,
        suite: &TestSuite,
        failures: &mut FailureLog<W>,
    ) -> SuiteReport {
        let plan = SuitePlan::for_suite(suite);
        let output_file = program_dir.join(format!("{}.txt", suite.name));

        let mut result = self.run_subprocess(
            &self.command_line(program_dir, suite, &plan.primary),
            &output_file,
            plan.primary.append,
        );

        if let Some(isolated) = &plan.isolated {
            if result.is_ok() {
                result = self.run_subprocess(
                    &self.command_line(program_dir, suite, isolated),
                    &output_file,
                    isolated.append,
                );
            } else {
                tracing::error!("Failed running unit test {}", suite.name);
            }
        }

        let before = failures.failed_tests();
        let results_recorded =
            match parse_results(&suite.name, &output_file, self.separators(), failures) {
                Ok(_) => true,
                Err(e) => {
                    tracing::error!(
                        "Failed to parse results of {} from {}: {}",
                        suite.name,
                        output_file.display(),
                        e
                    );
                    false
                }
            };

        SuiteReport {
            name: suite.name.clone(),
            launched: result.is_ok(),
            failed_tests: failures.failed_tests() - before,
            results_recorded,
        }
    }

    /// Run `command` with stdout captured in `output_file`.
    ///
    /// The log separator is appended to the file whatever happens, so every
    /// run leaves a delimited record behind.
    pub fn run_subprocess(&self, command: &CommandLine, output_file: &Path, append: bool) -> Result<()> {
        tracing::debug!("Running unit test: {}", command);

        let mut log_file = match open_output(output_file, append) {
            Ok(file) => file,
            Err(e) => {
                tracing::error!("Cannot open {}: {}", output_file.display(), e);
                tracing::error!("{}", HarnessError::ExecutionFailed);
                return Err(HarnessError::ExecutionFailed);
            }
        };

        let result = match log_file
            .try_clone()
            .and_then(|stdout| self.launcher.launch(command, stdout))
        {
            Ok(output) => {
                if !output.success {
                    tracing::debug!(code = ?output.code, "{} exited with failure", command);
                    let stderr = output.stderr.trim_end();
                    if !stderr.is_empty() {
                        tracing::warn!("{}", stderr);
                    }
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!("{}: {}", command, e);
                Err(HarnessError::ExecutionFailed)
            }
        };

        if let Err(e) = log_file
            .write_all(self.settings.log_separator.as_bytes())
            .and_then(|_| log_file.flush())
        {
            tracing::warn!("Failed to terminate {}: {}", output_file.display(), e);
        }

        if let Err(e) = &result {
            tracing::error!("{}", e);
        }
        result
    }

    fn command_line(&self, program_dir: &Path, suite: &TestSuite, invocation: &Invocation) -> CommandLine {
        CommandLine {
            program: program_dir.join(format!("{}{}", suite.name, EXE_SUFFIX)),
            args: invocation
                .filter
                .to_arg(&self.settings.filter_flag)
                .into_iter()
                .collect(),
        }
    }

    fn separators(&self) -> Separators<'_> {
        Separators {
            log: &self.settings.log_separator,
            results: &self.settings.results_separator,
        }
    }
}

/// Open a suite output file for appending, truncating it first unless
/// `append` is set.
fn open_output(path: &Path, append: bool) -> io::Result<File> {
    if !append {
        File::create(path)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
