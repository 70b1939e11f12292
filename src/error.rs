use std::path::PathBuf;
use thiserror::Error;

/// Core library errors.
///
/// Kinds are named after the phase that failed rather than the root cause;
/// the underlying IO errors are logged where they happen.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error at path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Deleting output folders failed")]
    DeletingOutputFailed,

    #[error("Deleting .flg files failed")]
    DeletingFlagFilesFailed,

    #[error("Deleting files generated by the idl compiler failed")]
    DeletingGeneratedFilesFailed,

    #[error("Reverting changes made during preparation failed")]
    RevertingPreparationFailed,

    #[error("Recreating default settings file failed")]
    RecreatingUserDefFailed,

    #[error("Unit test working folder '{0}' doesn't exist")]
    WorkingFolderNotExist(PathBuf),

    #[error("Unit test execution failed")]
    ExecutionFailed,
}

impl HarnessError {
    /// Process exit code reported by the driver for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            HarnessError::Config(_) => 2,
            HarnessError::Io { .. } => 3,
            HarnessError::DeletingOutputFailed => 10,
            HarnessError::DeletingFlagFilesFailed => 11,
            HarnessError::DeletingGeneratedFilesFailed => 12,
            HarnessError::RevertingPreparationFailed => 13,
            HarnessError::RecreatingUserDefFailed => 14,
            HarnessError::WorkingFolderNotExist(_) => 20,
            HarnessError::ExecutionFailed => 21,
        }
    }
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = ConfigError::Invalid("suite list must not be empty".into());
        assert!(err.to_string().contains("suite list"));

        let err = HarnessError::WorkingFolderNotExist(PathBuf::from("out/webrtc_win_x64_debug"));
        assert!(err.to_string().contains("out/webrtc_win_x64_debug"));
    }

    #[test]
    fn error_conversion() {
        let config_err = ConfigError::Invalid("test".into());
        let harness_err: HarnessError = config_err.into();
        assert!(matches!(harness_err, HarnessError::Config(_)));
    }

    #[test]
    fn exit_codes_are_distinct_per_phase() {
        let errors = [
            HarnessError::DeletingOutputFailed,
            HarnessError::DeletingFlagFilesFailed,
            HarnessError::DeletingGeneratedFilesFailed,
            HarnessError::RevertingPreparationFailed,
            HarnessError::RecreatingUserDefFailed,
            HarnessError::WorkingFolderNotExist(PathBuf::new()),
            HarnessError::ExecutionFailed,
        ];
        let mut codes: Vec<i32> = errors.iter().map(HarnessError::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|c| *c != 0 && *c != 5));
    }
}
