//! Cleanup actions over the native source tree.

use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::cleanup::action::CleanupAction;
use crate::cleanup::remove::{remove_file, remove_files, remove_folder_links, remove_folders};
use crate::config::{Config, PathsConfig, PrepareConfig};
use crate::error::{HarnessError, Result};
use crate::template::{to_platform_path, PathTemplate, Selectors};
use crate::workdir::WorkingDir;

/// Totals for a finished cleanup action.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanStats {
    /// Files, folders and links removed.
    pub removed: usize,
    /// Bytes of regular files freed.
    pub freed_bytes: u64,
}

impl CleanStats {
    fn add(&mut self, removed: usize, freed_bytes: u64) {
        self.removed += removed;
        self.freed_bytes += freed_bytes;
    }
}

/// Performs cleanup actions relative to the configured root folder.
pub struct Cleaner {
    paths: PathsConfig,
    prepare: PrepareConfig,
    settings_path: Option<PathBuf>,
}

impl Cleaner {
    pub fn new(config: &Config) -> Self {
        Self {
            paths: config.paths.clone(),
            prepare: config.prepare.clone(),
            settings_path: Config::default_path(),
        }
    }

    /// Settings file rewritten by [`CleanupAction::CleanUserDef`].
    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    /// Perform `action` and log its outcome.
    pub fn run(&self, action: CleanupAction, selectors: &Selectors) -> Result<CleanStats> {
        let _span = tracing::info_span!("cleanup", %action).entered();

        let result = match action {
            CleanupAction::CleanOutput => self.delete_output_folders(selectors),
            CleanupAction::CleanUserDef => self.recreate_user_defaults(),
            CleanupAction::CleanIdls => self.delete_generated_idl_artifacts(),
            CleanupAction::CleanPrepare => self.revert_preparation_changes(),
        };

        match &result {
            Ok(stats) => tracing::info!(
                removed = stats.removed,
                freed_bytes = stats.freed_bytes,
                "Cleanup action {} is finished successfully for {}",
                action,
                selectors
            ),
            Err(e) => {
                tracing::error!("{}", e);
                tracing::error!("Cleanup action {} has failed for {}", action, selectors);
            }
        }

        result
    }

    /// Folders matched by the GN output and build output templates, in that
    /// order, relative to the current directory. Not de-duplicated.
    pub fn resolve_output_folders(&self, selectors: &Selectors) -> Result<Vec<PathBuf>> {
        let templates = [
            &self.paths.gn_target_output_path,
            &self.paths.built_libs_destination_path,
        ];

        let mut folders = Vec::new();
        for template in templates {
            let resolved = PathTemplate::new(template).resolve(
                selectors,
                &self.paths.gn_output_path,
                &self.paths.build_output_path,
            );
            let pattern = to_platform_path(&resolved);
            folders.extend(expand_glob(&pattern)?);
        }

        Ok(folders)
    }

    /// Delete the GN output and build output folders matching `selectors`.
    pub fn delete_output_folders(&self, selectors: &Selectors) -> Result<CleanStats> {
        let _dir = WorkingDir::enter(&self.paths.root)?;

        let folders = self.resolve_output_folders(selectors).map_err(|e| {
            tracing::error!("Resolving output folders failed: {}", e);
            HarnessError::DeletingOutputFailed
        })?;
        tracing::debug!(count = folders.len(), "Resolved output folders");

        let report = remove_folders(&folders);
        if !report.is_success() {
            return Err(HarnessError::DeletingOutputFailed);
        }

        Ok(CleanStats {
            removed: report.removed,
            freed_bytes: report.freed_bytes,
        })
    }

    /// Delete the idl compiler `.flg` marker files, then its generated files.
    pub fn delete_generated_idl_artifacts(&self) -> Result<CleanStats> {
        let _dir = WorkingDir::enter(&self.paths.root)?;
        let mut stats = CleanStats::default();

        let flag_dir = to_platform_path(&self.paths.idl_flag_output_path);
        if flag_dir.exists() {
            let flag_files = expand_glob(&flag_files_pattern(&flag_dir)).map_err(|e| {
                tracing::error!("Resolving .flg files failed: {}", e);
                HarnessError::DeletingFlagFilesFailed
            })?;

            for flag_file in flag_files {
                match remove_file(&flag_file) {
                    Ok(Some(freed)) => stats.add(1, freed),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!("Failed to remove {}: {}", flag_file.display(), e);
                        return Err(HarnessError::DeletingFlagFilesFailed);
                    }
                }
            }
        }

        let generated = to_platform_path(&self.paths.idl_generated_files_output_path);
        let report = remove_folders(&[generated]);
        if !report.is_success() {
            return Err(HarnessError::DeletingGeneratedFilesFailed);
        }
        stats.add(report.removed, report.freed_bytes);

        Ok(stats)
    }

    /// Undo preparation: copied files first, then links and generated
    /// folders of each variant in configured order. Stops at the first
    /// failing step.
    pub fn revert_preparation_changes(&self) -> Result<CleanStats> {
        let _dir = WorkingDir::enter(&self.paths.root)?;
        let mut stats = CleanStats::default();

        let copied: Vec<&Path> = self
            .prepare
            .files_to_copy
            .iter()
            .map(|copy| copy.destination.as_path())
            .collect();
        let report = remove_files(&copied);
        if !report.is_success() {
            return Err(HarnessError::RevertingPreparationFailed);
        }
        stats.add(report.removed, report.freed_bytes);

        for variant in &self.prepare.variants {
            let links: Vec<&Path> = variant
                .folders_to_link
                .iter()
                .map(|link| link.link.as_path())
                .collect();
            let report = remove_folder_links(&links);
            if !report.is_success() {
                tracing::warn!(variant = %variant.name, "Removing folder links failed");
                return Err(HarnessError::RevertingPreparationFailed);
            }
            stats.add(report.removed, report.freed_bytes);

            let report = remove_folders(&variant.folders_to_generate);
            if !report.is_success() {
                tracing::warn!(variant = %variant.name, "Deleting generated folders failed");
                return Err(HarnessError::RevertingPreparationFailed);
            }
            stats.add(report.removed, report.freed_bytes);
        }

        Ok(stats)
    }

    /// Replace the settings file with the default configuration.
    pub fn recreate_user_defaults(&self) -> Result<CleanStats> {
        let Some(path) = &self.settings_path else {
            tracing::error!("No location for the settings file is known");
            return Err(HarnessError::RecreatingUserDefFailed);
        };

        Config::write_default(path).map_err(|e| {
            tracing::error!("{}", e);
            HarnessError::RecreatingUserDefFailed
        })?;
        tracing::info!(path = %path.display(), "Recreated settings file");

        Ok(CleanStats {
            removed: 1,
            freed_bytes: 0,
        })
    }
}

fn flag_files_pattern(flag_dir: &Path) -> PathBuf {
    let escaped = Pattern::escape(&flag_dir.to_string_lossy());
    PathBuf::from(format!("{}{}*.flg", escaped, MAIN_SEPARATOR))
}

/// Paths matching `pattern`. Wildcards never match a leading dot.
fn expand_glob(pattern: &Path) -> Result<Vec<PathBuf>> {
    let pattern_str = pattern.to_string_lossy();
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let entries = glob::glob_with(&pattern_str, options).map_err(|e| HarnessError::Io {
        path: pattern.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e.msg),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => tracing::warn!("Skipping unreadable path {}: {}", e.path().display(), e),
        }
    }
    Ok(paths)
}
