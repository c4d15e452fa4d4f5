//! Starter configuration files written by `reportmark init`.

use crate::error::ConfigError;

/// Default configuration in TOML, with every field explained.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# reportmark configuration file

# Base container whose body receives the converted paragraphs. When unset,
# the built-in HWPX container is used.
# base_template = "reference/base.hwpx"

# Directory holding the reference snippets (section.xml, quotation.xml, ...).
# When unset, the built-in snippets are used.
# snippet_dir = "reference"

# Body markup entry inside the container
body_path = "Contents/section0.xml"

# Parent directory for per-conversion scratch workspaces. Defaults to the
# system temporary directory.
# workspace_dir = "/var/tmp/reportmark"
"#;

/// Default configuration in JSON.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "base_template": null,
  "snippet_dir": null,
  "body_path": "Contents/section0.xml",
  "workspace_dir": null
}
"#;

/// Starter file contents for `format` (`toml` or `json`).
///
/// # Errors
///
/// Returns [`ConfigError::Config`] for any other format.
pub fn get_template(format: &str) -> Result<&'static str, ConfigError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => {
      Err(ConfigError::Config(format!(
        "Unsupported config format: {format}"
      )))
    },
  }
}
