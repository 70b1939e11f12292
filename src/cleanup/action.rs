//! Cleanup actions selectable from the command line and configuration.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named cleanup operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CleanupAction {
    /// Delete GN output folders and copied build outputs
    #[serde(alias = "cleanOutput")]
    #[value(alias = "cleanOutput")]
    CleanOutput,
    /// Recreate the settings file with default contents
    #[serde(alias = "cleanUserDef")]
    #[value(alias = "cleanUserDef")]
    CleanUserDef,
    /// Delete idl compiler flag files and generated sources
    #[serde(alias = "cleanIdls")]
    #[value(alias = "cleanIdls")]
    CleanIdls,
    /// Revert every change made while preparing the tree
    #[serde(alias = "cleanPrepare")]
    #[value(alias = "cleanPrepare")]
    CleanPrepare,
}

impl CleanupAction {
    pub const ALL: [CleanupAction; 4] = [
        CleanupAction::CleanOutput,
        CleanupAction::CleanUserDef,
        CleanupAction::CleanIdls,
        CleanupAction::CleanPrepare,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CleanupAction::CleanOutput => "clean-output",
            CleanupAction::CleanUserDef => "clean-user-def",
            CleanupAction::CleanIdls => "clean-idls",
            CleanupAction::CleanPrepare => "clean-prepare",
        }
    }
}

impl fmt::Display for CleanupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CleanupAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kebab_and_legacy_names() {
        assert_eq!(
            "clean-output".parse::<CleanupAction>(),
            Ok(CleanupAction::CleanOutput)
        );
        assert_eq!(
            "cleanPrepare".parse::<CleanupAction>(),
            Ok(CleanupAction::CleanPrepare)
        );
        assert!("cleanEverything".parse::<CleanupAction>().is_err());
    }

    #[test]
    fn display_matches_name() {
        for action in CleanupAction::ALL {
            assert_eq!(action.to_string(), action.name());
            assert_eq!(action.name().parse::<CleanupAction>(), Ok(action));
        }
    }

    #[test]
    fn deserializes_legacy_names_from_toml() {
        #[derive(Deserialize)]
        struct Actions {
            actions: Vec<CleanupAction>,
        }

        let parsed: Actions = toml::from_str(r#"actions = ["cleanIdls", "clean-user-def"]"#).unwrap();
        assert_eq!(
            parsed.actions,
            vec![CleanupAction::CleanIdls, CleanupAction::CleanUserDef]
        );
    }
}
