//! Subcommand implementations shared by `main` and the integration tests.

use std::{
  collections::BTreeMap,
  fs,
  io::{self, Read, Write},
  path::Path,
};

use color_eyre::eyre::{Context, Result, bail};
use log::{info, warn};
use reportmark_config::Config;
use reportmark_core::{
  BaseTemplate,
  Converter,
  SnippetLibrary,
  classify,
  pack_directory,
};

/// Name of the packed base container written by [`export_templates`].
pub const EXPORTED_BASE_NAME: &str = "base.hwpx";

/// Directory under the export target that holds the unpacked base tree.
pub const EXPORTED_BASE_DIR: &str = "base";

/// Build a [`Converter`] from `config`, falling back to the embedded
/// templates for anything not configured.
///
/// # Errors
///
/// Returns an error if the configured snippet directory is unusable.
pub fn build_converter(config: &Config) -> Result<Converter> {
  let snippets = match &config.snippet_dir {
    Some(dir) => {
      SnippetLibrary::from_dir(dir).wrap_err_with(|| {
        format!("Failed to open snippet directory {}", dir.display())
      })?
    },
    None => SnippetLibrary::from_entries(reportmark_templates::all_snippets()),
  };

  let base = match &config.base_template {
    Some(path) => BaseTemplate::Container(path.clone()),
    None => BaseTemplate::Entries(embedded_base()),
  };

  let mut converter =
    Converter::new(base, snippets).with_body_path(config.body_path.clone());
  if let Some(dir) = &config.workspace_dir {
    converter = converter.with_workspace_dir(dir);
  }
  Ok(converter)
}

fn embedded_base() -> BTreeMap<String, Vec<u8>> {
  reportmark_templates::all_base_files()
    .into_iter()
    .map(|(name, content)| (name.to_string(), content.as_bytes().to_vec()))
    .collect()
}

/// Read markdown from `input`, or from standard input when it is `-`.
///
/// # Errors
///
/// Returns an error if the input cannot be read as UTF-8.
pub fn read_input(input: &Path) -> Result<String> {
  if input.as_os_str() == "-" {
    let mut text = String::new();
    io::stdin()
      .read_to_string(&mut text)
      .wrap_err("Failed to read markdown from standard input")?;
    return Ok(text);
  }

  fs::read_to_string(input)
    .wrap_err_with(|| format!("Failed to read {}", input.display()))
}

/// Convert the markdown at `input` and write the container to `output`.
///
/// # Errors
///
/// Returns an error if the input cannot be read or the conversion fails.
pub fn convert(config: &Config, input: &Path, output: &Path) -> Result<()> {
  let markdown = read_input(input)?;
  let converter = build_converter(config)?;
  converter.convert(&markdown, output).wrap_err_with(|| {
    format!(
      "Failed to convert {} into {}",
      input.display(),
      output.display()
    )
  })?;
  Ok(())
}

/// Classify `markdown` and render the elements as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn classify_json(markdown: &str) -> Result<String> {
  let elements = classify(markdown);
  serde_json::to_string_pretty(&elements)
    .wrap_err("Failed to serialize classified elements")
}

/// Print the classification of `input` to standard output.
///
/// # Errors
///
/// Returns an error if the input cannot be read or stdout is closed.
pub fn classify_to_stdout(input: &Path) -> Result<()> {
  let json = classify_json(&read_input(input)?)?;
  let mut stdout = io::stdout().lock();
  writeln!(stdout, "{json}").wrap_err("Failed to write to standard output")?;
  Ok(())
}

/// Write a starter configuration file.
///
/// # Errors
///
/// Returns an error if `output` exists and `force` is unset, or if the file
/// cannot be written.
pub fn init(output: &Path, format: &str, force: bool) -> Result<()> {
  if output.exists() && !force {
    bail!(
      "Configuration file already exists: {}. Use --force to overwrite.",
      output.display()
    );
  }

  if let Some(parent) = output.parent()
    && !parent.as_os_str().is_empty()
    && !parent.exists()
  {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
    info!("Created directory: {}", parent.display());
  }

  Config::generate_default_config(format, output).wrap_err_with(|| {
    format!("Failed to generate configuration file: {}", output.display())
  })?;

  info!(
    "Configuration file created successfully. Point `snippet_dir` and \
     `base_template` at your own reference files to customize the output."
  );
  Ok(())
}

/// Export the embedded snippets and base tree into `output_dir`, then pack
/// the tree into `base.hwpx` next to them.
///
/// The resulting directory can be used directly as `snippet_dir`, and the
/// packed container as `base_template`. Existing files are kept unless
/// `force` is set.
///
/// # Errors
///
/// Returns an error if a file cannot be written or the container cannot be
/// packed.
pub fn export_templates(output_dir: &Path, force: bool) -> Result<()> {
  fs::create_dir_all(output_dir).wrap_err_with(|| {
    format!("Failed to create template directory: {}", output_dir.display())
  })?;

  for (name, content) in reportmark_templates::all_snippets() {
    write_exported(&output_dir.join(name), content.as_bytes(), force)?;
  }

  let base_dir = output_dir.join(EXPORTED_BASE_DIR);
  for (name, content) in reportmark_templates::all_base_files() {
    let path = base_dir.join(name);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).wrap_err_with(|| {
        format!("Failed to create directory: {}", parent.display())
      })?;
    }
    write_exported(&path, content.as_bytes(), force)?;
  }

  let container = pack_directory(&base_dir).wrap_err_with(|| {
    format!("Failed to pack base container from {}", base_dir.display())
  })?;
  write_exported(&output_dir.join(EXPORTED_BASE_NAME), &container, force)?;

  Ok(())
}

fn write_exported(path: &Path, content: &[u8], force: bool) -> Result<()> {
  if path.exists() && !force {
    warn!(
      "File {} already exists. Use --force to overwrite.",
      path.display()
    );
    return Ok(());
  }

  fs::write(path, content)
    .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
  info!("Exported template: {}", path.display());
  Ok(())
}
