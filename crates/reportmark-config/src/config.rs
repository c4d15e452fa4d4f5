use std::{
  fs,
  path::{Path, PathBuf},
};

pub use reportmark_core::DEFAULT_BODY_PATH;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Names probed in the current directory when no config file is given.
const CONFIG_FILENAMES: [&str; 5] = [
  "reportmark.toml",
  "reportmark.json",
  ".reportmark.toml",
  ".reportmark.json",
  ".config/reportmark.toml",
];

/// Configuration for the reportmark converter.
///
/// Every path is optional: without a base container or snippet directory the
/// converter falls back to the templates embedded in the binary. Fields are
/// loaded from a TOML or JSON file and can be overridden with
/// `--config KEY=VALUE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Base container whose body receives the converted paragraphs.
  pub base_template: Option<PathBuf>,

  /// Directory holding the reference snippet files.
  pub snippet_dir: Option<PathBuf>,

  /// Body markup entry inside the container.
  pub body_path: String,

  /// Parent directory for per-conversion workspaces.
  pub workspace_dir: Option<PathBuf>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      base_template: None,
      snippet_dir:   None,
      body_path:     DEFAULT_BODY_PATH.to_string(),
      workspace_dir: None,
    }
  }
}

impl Config {
  /// Load configuration from a TOML or JSON file, chosen by extension.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content =
      fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
      })?;

    let ext = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase);

    match ext.as_deref() {
      Some("json") => {
        serde_json::from_str(&content).map_err(|source| {
          ConfigError::Serde {
            path: path.to_path_buf(),
            source,
          }
        })
      },
      Some("toml") => {
        toml::from_str(&content).map_err(|source| {
          ConfigError::Toml {
            path: path.to_path_buf(),
            source,
          }
        })
      },
      Some(_) => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Load and merge `config_files` in order, or a discovered config file when
  /// none are given, then apply `KEY=VALUE` overrides.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded or an override is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged = Self::from_file(first)?;
      for path in rest {
        merged.merge(Self::from_file(path)?);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }
      merged
    } else if let Some(discovered) = Self::find_config_file() {
      log::info!("Using discovered config file: {}", discovered.display());
      Self::from_file(&discovered)?
    } else {
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    Ok(config)
  }

  /// Apply configuration overrides from `KEY=VALUE` strings.
  ///
  /// An empty value clears an optional path.
  ///
  /// # Errors
  ///
  /// Returns an error if an override is not in `KEY=VALUE` form or names an
  /// unknown key.
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    let optional_path = || (!value.is_empty()).then(|| PathBuf::from(value));

    match key {
      "base_template" => self.base_template = optional_path(),
      "snippet_dir" => self.snippet_dir = optional_path(),
      "workspace_dir" => self.workspace_dir = optional_path(),
      "body_path" => {
        if value.is_empty() {
          return Err(ConfigError::Config(
            "body_path cannot be empty".to_string(),
          ));
        }
        value.clone_into(&mut self.body_path);
      },
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'"
        )));
      },
    }

    log::debug!("Config override: {key} = {value:?}");
    Ok(())
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// Optional fields are replaced only when `other` sets them; `body_path` is
  /// replaced only when `other` moves it away from the default.
  pub fn merge(&mut self, other: Self) {
    if other.base_template.is_some() {
      self.base_template = other.base_template;
    }
    if other.snippet_dir.is_some() {
      self.snippet_dir = other.snippet_dir;
    }
    if other.workspace_dir.is_some() {
      self.workspace_dir = other.workspace_dir;
    }
    if other.body_path != DEFAULT_BODY_PATH {
      self.body_path = other.body_path;
    }
  }

  /// Search for a config file in the current directory.
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    CONFIG_FILENAMES
      .iter()
      .map(|name| current_dir.join(name))
      .find(|path| path.is_file())
  }

  /// Check that the configured base container and snippet directory exist.
  ///
  /// # Errors
  ///
  /// Returns an error naming the first path that is missing or of the wrong
  /// kind.
  pub fn validate_paths(&self) -> Result<(), ConfigError> {
    if let Some(ref base) = self.base_template
      && !base.is_file()
    {
      return Err(ConfigError::Config(format!(
        "Base template does not exist or is not a file: {}",
        base.display()
      )));
    }

    if let Some(ref dir) = self.snippet_dir
      && !dir.is_dir()
    {
      return Err(ConfigError::Config(format!(
        "Snippet directory does not exist or is not a directory: {}",
        dir.display()
      )));
    }

    Ok(())
  }

  /// Write a starter configuration file in `format` (`toml` or `json`).
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)?;

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}
