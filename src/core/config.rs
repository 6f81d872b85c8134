use crate::core::error::{ConfigError, SelectorResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Search roots used when neither the CLI nor the config names any
pub const DEFAULT_SRC_PATHS: &[&str] = &[".", "src"];

/// Configuration for git-select-tests
/// Searched in order: selector.toml, .selector.toml, .config/selector.toml
///
/// # Example
///
/// ```toml
/// [select]
/// test_paths = ["test"]
/// src_paths = [".", "src"]
/// extra_deps_file = "extra_deps.txt"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectorConfig {
  #[serde(default)]
  pub select: SelectSection,
}

/// `[select]` table. Paths are relative to the directory holding the project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectSection {
  #[serde(default)]
  pub test_paths: Vec<PathBuf>,

  #[serde(default)]
  pub src_paths: Vec<PathBuf>,

  #[serde(default)]
  pub extra_deps_file: Option<PathBuf>,
}

impl SelectorConfig {
  /// Find config file in search order: selector.toml, .selector.toml, .config/selector.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("selector.toml"),
      path.join(".selector.toml"),
      path.join(".config").join("selector.toml"),
    ];

    candidates.into_iter().find(|p| p.is_file())
  }

  /// Load config from `path` if one exists. An absent config is not an error.
  pub fn load(path: &Path) -> SelectorResult<Option<Self>> {
    let Some(config_path) = Self::find_config_path(path) else {
      return Ok(None);
    };

    let invalid = |reason: String| ConfigError::Invalid {
      path: config_path.clone(),
      reason,
    };

    let content = fs::read_to_string(&config_path).map_err(|e| invalid(e.to_string()))?;
    let config: SelectorConfig = toml_edit::de::from_str(&content).map_err(|e| invalid(e.to_string()))?;

    debug!(path = %config_path.display(), "loaded config");
    Ok(Some(config))
  }
}
