//! Parsing captured test output and recording failures.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Marker the test executable prints for failed tests.
pub const FAILED_MARKER: &str = "FAILED";

const BLOCK_DELIMITER: &str = "==============";

/// Separators used to split a suite output file.
#[derive(Debug, Clone, Copy)]
pub struct Separators<'a> {
    /// Ends each test executable run.
    pub log: &'a str,
    /// Precedes the final pass/fail summary inside one run.
    pub results: &'a str,
}

/// Failure summary of one unit test run.
///
/// Holds the open failures file and the number of failed test lines seen so
/// far. One is created per run and never shared.
pub struct FailureLog<W: Write = BufWriter<File>> {
    writer: W,
    failed_tests: usize,
}

impl FailureLog {
    /// Create or truncate the failures file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> FailureLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed_tests: 0,
        }
    }

    pub fn failed_tests(&self) -> usize {
        self.failed_tests
    }

    /// Record the failures found in a suite's captured output.
    ///
    /// Only the last segment of each run is inspected. A run whose summary
    /// mentions `FAILED` is written out as a bordered block holding every
    /// such line, and each line counts as one failed test. Returns the
    /// number of failed tests found.
    pub fn record(&mut self, suite: &str, output: &str, separators: Separators<'_>) -> io::Result<usize> {
        let mut found = 0;

        for run in output.split(separators.log) {
            let summary = run.split(separators.results).last().unwrap_or_default();
            if !summary.contains(FAILED_MARKER) {
                continue;
            }

            writeln!(self.writer, "{}", suite)?;
            writeln!(self.writer, "{}", BLOCK_DELIMITER)?;
            for line in summary.lines().filter(|l| l.contains(FAILED_MARKER)) {
                writeln!(self.writer, "{}", line.trim_end_matches('\r'))?;
                found += 1;
            }
            writeln!(self.writer, "{}", BLOCK_DELIMITER)?;
            self.writer.flush()?;
        }

        self.failed_tests += found;
        Ok(found)
    }

    /// Flush and hand back the writer.
    pub fn finish(mut self) -> io::Result<(usize, W)> {
        self.writer.flush()?;
        Ok((self.failed_tests, self.writer))
    }
}

/// Read the output file of `suite` and record its failures in `log`.
///
/// A missing file is treated as empty output.
pub fn parse_results<W: Write>(
    suite: &str,
    output_file: &Path,
    separators: Separators<'_>,
    log: &mut FailureLog<W>,
) -> io::Result<usize> {
    let content = match std::fs::read(output_file) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    log.record(suite, &content, separators)
}
