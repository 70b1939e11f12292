//! Launching native test executables.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Program and arguments of one test executable run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// How a launched test executable finished.
#[derive(Debug, Clone, Default)]
pub struct LaunchOutput {
    /// Exited with status zero.
    pub success: bool,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    /// Everything written to stderr.
    pub stderr: String,
}

/// Runs a test executable to completion with stdout sent to a file.
///
/// An `Err` means the process could not be run at all; failing tests are
/// reported through [`LaunchOutput`].
pub trait TestLauncher {
    fn launch(&self, command: &CommandLine, stdout: File) -> io::Result<LaunchOutput>;
}

/// Launches test executables as child processes and blocks until they exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl TestLauncher for ProcessLauncher {
    fn launch(&self, command: &CommandLine, stdout: File) -> io::Result<LaunchOutput> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stderr = Vec::new();
        if let Some(mut pipe) = child.stderr.take() {
            if let Err(e) = pipe.read_to_end(&mut stderr) {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        }

        let status = match child.wait() {
            Ok(status) => status,
            Err(e) => {
                let _ = child.kill();
                return Err(e);
            }
        };

        Ok(LaunchOutput {
            success: status.success(),
            code: status.code(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn command_line_display() {
        let command = CommandLine {
            program: PathBuf::from("suite"),
            args: vec!["--gtest_filter=a:".to_string()],
        };
        assert_eq!(command.to_string(), "suite --gtest_filter=a:");
    }

    #[test]
    fn missing_executable_is_a_launch_error() {
        let tmp = TempDir::new().unwrap();
        let stdout = File::create(tmp.path().join("out.txt")).unwrap();
        let command = CommandLine {
            program: tmp.path().join("does_not_exist"),
            args: vec![],
        };

        assert!(ProcessLauncher.launch(&command, stdout).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout_to_file_and_stderr_in_output() {
        let tmp = TempDir::new().unwrap();
        let out_path = tmp.path().join("out.txt");
        let stdout = File::create(&out_path).unwrap();
        let command = CommandLine {
            program: PathBuf::from("/bin/sh"),
            args: vec![
                "-c".to_string(),
                "echo to-file; echo to-stderr >&2; exit 3".to_string(),
            ],
        };

        let output = ProcessLauncher.launch(&command, stdout).unwrap();

        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stderr.trim(), "to-stderr");
        assert_eq!(std::fs::read_to_string(&out_path).unwrap(), "to-file\n");
    }
}
