//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/solview/solview.toml`
//! 3. Local config: `<work_dir>/.solview.toml`
//! 4. Environment variables: `SOLVIEW_*` prefix
//!
//! Command line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Default solution file, relative to the working directory.
pub const DEFAULT_INPUT: &str = "solution.txt";
/// Default number of moves below the root that get their own board.
pub const DEFAULT_MAX_DEPTH: usize = 5;
/// Default board cell edge in pixels.
pub const DEFAULT_CELL_SIZE: u32 = 60;

/// Unified configuration for solview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Solution file to read
    pub input: PathBuf,
    /// Deepest level (moves from the root) that is rendered as a full board
    pub max_depth: usize,
    /// Board cell edge in pixels
    pub cell_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            max_depth: DEFAULT_MAX_DEPTH,
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

/// Raw settings for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub input: Option<PathBuf>,
    pub max_depth: Option<usize>,
    pub cell_size: Option<u32>,
}

/// Get the XDG config directory for solview.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "solview").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("solview.toml"))
}

/// Get the path to the local config file in a working directory.
pub fn local_config_path(work_dir: &Path) -> PathBuf {
    work_dir.join(".solview.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge overlay config onto self (base): overlay wins where specified.
    ///
    /// A relative `input` in a config file is resolved against `base_dir`,
    /// the directory holding that file.
    fn merge_with(&self, overlay: &RawSettings, base_dir: Option<&Path>) -> Self {
        let input = overlay.input.as_ref().map(|input| match base_dir {
            Some(dir) if input.is_relative() => dir.join(input),
            _ => input.clone(),
        });
        Self {
            input: input.unwrap_or_else(|| self.input.clone()),
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
            cell_size: overlay.cell_size.unwrap_or(self.cell_size),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `work_dir` - Optional directory searched for a local `.solview.toml`
    pub fn load(work_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw, None);
            }
        }

        // 3. Local config
        if let Some(dir) = work_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw, Some(dir));
            }
        }

        // 4. Environment variables (explicit override)
        Self::apply_env_overrides(current)
    }

    /// Apply SOLVIEW_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("SOLVIEW")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("input") {
            settings.input = PathBuf::from(val);
        }
        match config.get::<usize>("max_depth") {
            Ok(val) => settings.max_depth = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }
        match config.get::<u32>("cell_size") {
            Ok(val) => settings.cell_size = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        format!(
            r#"# solview configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/solview/solview.toml
#   Local:  <work_dir>/.solview.toml
#   Env:    SOLVIEW_* environment variables (e.g. SOLVIEW_MAX_DEPTH=3)
# Command line flags override all of them.

# Solution file to read (relative paths resolve against the config file's directory)
# input = "{DEFAULT_INPUT}"

# Deepest level rendered as a full board (moves from the empty board)
# max_depth = {DEFAULT_MAX_DEPTH}

# Board cell edge in pixels
# cell_size = {DEFAULT_CELL_SIZE}
"#
        )
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_creating_default_then_matches_dumper_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.input, PathBuf::from("solution.txt"));
        assert_eq!(settings.max_depth, 5);
        assert_eq!(settings.cell_size, 60);
    }

    #[test]
    fn given_overlay_when_merging_then_specified_fields_win() {
        let base = Settings::default();
        let overlay = RawSettings {
            input: None,
            max_depth: Some(2),
            cell_size: None,
        };

        let merged = base.merge_with(&overlay, None);

        assert_eq!(merged.max_depth, 2);
        assert_eq!(merged.input, base.input);
        assert_eq!(merged.cell_size, base.cell_size);
    }

    #[test]
    fn given_relative_input_in_local_config_when_merging_then_resolves_against_dir() {
        let overlay = RawSettings {
            input: Some(PathBuf::from("data/tree.txt")),
            ..Default::default()
        };

        let merged = Settings::default().merge_with(&overlay, Some(Path::new("/work")));

        assert_eq!(merged.input, PathBuf::from("/work/data/tree.txt"));
    }

    #[test]
    fn given_absolute_input_when_merging_then_kept_as_is() {
        let overlay = RawSettings {
            input: Some(PathBuf::from("/abs/tree.txt")),
            ..Default::default()
        };

        let merged = Settings::default().merge_with(&overlay, Some(Path::new("/work")));

        assert_eq!(merged.input, PathBuf::from("/abs/tree.txt"));
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips_through_toml() {
        let settings = Settings {
            input: PathBuf::from("x.txt"),
            max_depth: 3,
            cell_size: 40,
        };
        let text = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.input.is_none());
        assert!(raw.max_depth.is_none());
    }
}
