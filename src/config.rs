use crate::cli::TaggingWorkflowArgs;
use crate::error::{Result, SemverTagsError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory and the user config directory
pub const CONFIG_FILE_NAME: &str = ".semver-tags.toml";

/// Run parameters read from `.semver-tags.toml`.
///
/// Every key is optional; missing keys take the built-in defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub dry_run: bool,
    pub github_action: bool,
    pub output_json: bool,
    pub atomic: bool,
    pub pre_release_string: String,
    pub build_string: String,
    pub remote: String,
    pub branch: String,
    pub directories: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dry_run: false,
            github_action: false,
            output_json: true,
            atomic: true,
            pre_release_string: String::new(),
            build_string: String::new(),
            remote: "origin".to_string(),
            branch: "main".to_string(),
            directories: Vec::new(),
        }
    }
}

/// Values given on the command line or through `SEMVER_TAGS_*` variables.
///
/// `None` leaves the file or default value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub dry_run: Option<bool>,
    pub github_action: Option<bool>,
    pub output_json: Option<bool>,
    pub atomic: Option<bool>,
    pub pre_release_string: Option<String>,
    pub build_string: Option<String>,
    pub remote: Option<String>,
    pub branch: Option<String>,
    pub directories: Option<Vec<String>>,
}

impl Config {
    /// Apply command-line and environment values on top of this config
    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(value) = overrides.dry_run {
            self.dry_run = value;
        }
        if let Some(value) = overrides.github_action {
            self.github_action = value;
        }
        if let Some(value) = overrides.output_json {
            self.output_json = value;
        }
        if let Some(value) = overrides.atomic {
            self.atomic = value;
        }
        if let Some(value) = overrides.pre_release_string {
            self.pre_release_string = value;
        }
        if let Some(value) = overrides.build_string {
            self.build_string = value;
        }
        if let Some(value) = overrides.remote {
            self.remote = value;
        }
        if let Some(value) = overrides.branch {
            self.branch = value;
        }
        if let Some(value) = overrides.directories {
            self.directories = value;
        }
        self
    }

    /// Workflow parameters for a run started in `working_dir`
    ///
    /// Blank directory entries (e.g. from a trailing comma) are dropped.
    pub fn into_workflow_args(self, working_dir: PathBuf) -> TaggingWorkflowArgs {
        TaggingWorkflowArgs {
            dry_run: self.dry_run,
            github_action: self.github_action,
            output_json: self.output_json,
            atomic: self.atomic,
            pre_release: self.pre_release_string,
            build: self.build_string,
            remote: self.remote,
            branch: self.branch,
            directories: self
                .directories
                .into_iter()
                .map(|dir| dir.trim().to_string())
                .filter(|dir| !dir.is_empty())
                .collect(),
            working_dir,
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Lookup order:
/// 1. Custom path provided as parameter
/// 2. `.semver-tags.toml` in the current directory
/// 3. `.semver-tags.toml` in the user config directory
/// 4. Defaults when no file is found
///
/// # Errors
/// A file that exists but cannot be read or parsed.
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = match config_path {
        Some(path) => Some(PathBuf::from(path)),
        None => find_config_file(),
    };

    let Some(path) = path else {
        debug!("no config file, using defaults");
        return Ok(Config::default());
    };

    debug!(path = %path.display(), "loading config");
    let content = fs::read_to_string(&path).map_err(|e| {
        SemverTagsError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    toml::from_str(&content)
        .map_err(|e| SemverTagsError::config(format!("invalid {}: {}", path.display(), e)))
}

fn find_config_file() -> Option<PathBuf> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}
