//! End-to-end conversion from report markdown to container bytes.

use std::{
  collections::BTreeMap,
  io::Write,
  path::{Path, PathBuf},
};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::{
  assemble::assemble,
  classify::classify,
  error::{ConvertError, ConvertResult},
  package::pack_directory,
  snippet::SnippetLibrary,
  types::ElementKind,
  workspace::DocumentWorkspace,
};

/// Location of the body markup inside the base container.
pub const DEFAULT_BODY_PATH: &str = "Contents/section0.xml";

/// Where the base container comes from.
#[derive(Debug, Clone)]
pub enum BaseTemplate {
  /// A container archive on disk.
  Container(PathBuf),
  /// An unpacked container tree held in memory, keyed by relative path.
  Entries(BTreeMap<String, Vec<u8>>),
}

/// Converts report markdown into a finished container.
///
/// A `Converter` holds only read-only inputs, so one instance can serve
/// many conversions at once. Every call unpacks the base container into its
/// own [`DocumentWorkspace`], which is gone again when the call returns.
#[derive(Debug, Clone)]
pub struct Converter {
  base:          BaseTemplate,
  snippets:      SnippetLibrary,
  body_path:     String,
  workspace_dir: Option<PathBuf>,
}

impl Converter {
  #[must_use]
  pub fn new(base: BaseTemplate, snippets: SnippetLibrary) -> Self {
    Self {
      base,
      snippets,
      body_path: DEFAULT_BODY_PATH.to_string(),
      workspace_dir: None,
    }
  }

  /// Override the body markup path inside the container.
  #[must_use]
  pub fn with_body_path(mut self, body_path: impl Into<String>) -> Self {
    self.body_path = body_path.into();
    self
  }

  /// Create workspaces under `dir` instead of the system temp directory.
  #[must_use]
  pub fn with_workspace_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.workspace_dir = Some(dir.into());
    self
  }

  #[must_use]
  pub fn body_path(&self) -> &str {
    &self.body_path
  }

  fn open_workspace(&self) -> ConvertResult<DocumentWorkspace> {
    let parent = self.workspace_dir.as_deref();
    match &self.base {
      BaseTemplate::Container(path) => DocumentWorkspace::extract(path, parent),
      BaseTemplate::Entries(entries) => {
        DocumentWorkspace::from_entries(
          entries.iter().map(|(k, v)| (k.as_str(), v.as_slice())),
          parent,
        )
      },
    }
  }

  /// Run the whole pipeline and return the container bytes.
  ///
  /// # Errors
  ///
  /// Any [`ConvertError`]; the workspace is removed either way.
  pub fn render(&self, markdown: &str) -> ConvertResult<Vec<u8>> {
    let workspace = self.open_workspace()?;
    let body = workspace.read_entry(&self.body_path)?;

    let elements = classify(markdown);
    let title = elements
      .iter()
      .find(|e| e.kind == ElementKind::Title)
      .map(|e| e.content.as_str());
    debug!("Document title: {title:?}");

    let fragments = self.snippets.compose_all(&elements)?;
    let assembled = assemble(&body, title, &fragments)?;
    workspace.write_entry(&self.body_path, assembled)?;

    pack_directory(workspace.path())
  }

  /// Render `markdown` and write the container to `output`.
  ///
  /// The file is written to a temporary sibling first and renamed into
  /// place, so a failed conversion never leaves a partial file at `output`.
  /// The same bytes are returned.
  ///
  /// # Errors
  ///
  /// Any [`ConvertError`] from rendering, or [`ConvertError::Io`] if the
  /// output cannot be written.
  pub fn convert(
    &self,
    markdown: &str,
    output: &Path,
  ) -> ConvertResult<Vec<u8>> {
    let bytes = self.render(markdown)?;
    write_atomically(output, &bytes)?;
    info!("Wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(bytes)
  }
}

fn write_atomically(output: &Path, bytes: &[u8]) -> ConvertResult<()> {
  let parent = match output.parent() {
    Some(p) if !p.as_os_str().is_empty() => p,
    _ => Path::new("."),
  };

  let mut file =
    NamedTempFile::new_in(parent).map_err(|e| ConvertError::io(parent, e))?;
  file
    .write_all(bytes)
    .map_err(|e| ConvertError::io(file.path(), e))?;
  file
    .persist(output)
    .map_err(|e| ConvertError::io(output, e.error))?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ErrorKind;

  fn base_entries(body: &str) -> BaseTemplate {
    let mut entries = BTreeMap::new();
    entries.insert("mimetype".to_string(), b"application/test".to_vec());
    entries.insert(DEFAULT_BODY_PATH.to_string(), body.as_bytes().to_vec());
    BaseTemplate::Entries(entries)
  }

  fn snippets() -> SnippetLibrary {
    SnippetLibrary::from_entries([(
      "normal_text.xml",
      "<p><!--CONTENT_START--><!--CONTENT_END--></p>",
    )])
  }

  #[test]
  fn test_render_without_body_entry_is_configuration_error() {
    let mut entries = BTreeMap::new();
    entries.insert("mimetype".to_string(), b"application/test".to_vec());
    let converter = Converter::new(BaseTemplate::Entries(entries), snippets());
    let err = converter.render("text").expect_err("no body");
    assert_eq!(err.kind(), ErrorKind::Configuration);
  }

  #[test]
  fn test_body_path_outside_container_is_rejected() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let body = "<root><!-- Content Start --><!-- Content End --></root>";
    let converter = Converter::new(base_entries(body), snippets())
      .with_workspace_dir(scratch.path())
      .with_body_path("../section0.xml");

    let err = converter.render("text").expect_err("escaping body path");
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(std::fs::read_dir(scratch.path()).expect("read_dir").count(), 0);
  }

  #[test]
  fn test_failed_render_leaves_no_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("out.hwpx");
    let converter = Converter::new(base_entries("<root/>"), snippets());

    let err = converter.convert("text", &output).expect_err("no anchors");
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(dir.path()).expect("read_dir").count(), 0);
  }

  #[test]
  fn test_workspaces_cleaned_up_under_custom_dir() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let body = "<root><!-- Content Start --><!-- Content End --></root>";
    let converter = Converter::new(base_entries(body), snippets())
      .with_workspace_dir(scratch.path());

    converter.render("hello").expect("render");
    let _ = converter.render("<root>");
    assert_eq!(std::fs::read_dir(scratch.path()).expect("read_dir").count(), 0);
  }
}
