//! Per-conversion scratch directory holding the unpacked base container.

use std::{
  fs::{self, File},
  io::{self, Read},
  path::{Component, Path, PathBuf},
};

use log::{debug, warn};
use tempfile::TempDir;
use zip::ZipArchive;

use crate::error::{ConvertError, ConvertResult};

const WORKSPACE_PREFIX: &str = "reportmark-";

/// Exclusively owned extraction of a base container.
///
/// The directory is removed when the workspace is dropped, on success,
/// on error returns, and while unwinding from a panic.
#[derive(Debug)]
pub struct DocumentWorkspace {
  dir: TempDir,
}

impl DocumentWorkspace {
  fn create(parent: Option<&Path>) -> ConvertResult<Self> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(WORKSPACE_PREFIX);
    let dir = match parent {
      Some(parent) => builder.tempdir_in(parent),
      None => builder.tempdir(),
    }
    .map_err(|e| {
      ConvertError::io(parent.map_or_else(std::env::temp_dir, Path::to_path_buf), e)
    })?;
    debug!("Created workspace {}", dir.path().display());
    Ok(Self { dir })
  }

  /// Unpack the container at `container` into a fresh workspace.
  ///
  /// # Errors
  ///
  /// - [`ConvertError::Configuration`] if the container is missing or is not
  ///   a ZIP archive.
  /// - [`ConvertError::Io`] if the workspace cannot be written.
  pub fn extract(
    container: &Path,
    parent: Option<&Path>,
  ) -> ConvertResult<Self> {
    let file = File::open(container).map_err(|e| {
      if e.kind() == io::ErrorKind::NotFound {
        ConvertError::Configuration(format!(
          "base container not found: {}",
          container.display()
        ))
      } else {
        ConvertError::io(container, e)
      }
    })?;

    let mut archive = ZipArchive::new(file).map_err(|e| {
      ConvertError::Configuration(format!(
        "base container {} is not a valid archive: {e}",
        container.display()
      ))
    })?;

    let workspace = Self::create(parent)?;
    workspace.unpack(&mut archive, container)?;
    Ok(workspace)
  }

  /// Build a workspace from in-memory entries, keyed by relative path.
  ///
  /// # Errors
  ///
  /// Returns [`ConvertError::Io`] if a file cannot be written.
  pub fn from_entries<'a, I>(
    entries: I,
    parent: Option<&Path>,
  ) -> ConvertResult<Self>
  where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
  {
    let workspace = Self::create(parent)?;
    for (name, contents) in entries {
      workspace.write_entry(name, contents)?;
    }
    Ok(workspace)
  }

  fn unpack<R: Read + io::Seek>(
    &self,
    archive: &mut ZipArchive<R>,
    container: &Path,
  ) -> ConvertResult<()> {
    for idx in 0..archive.len() {
      let mut entry = archive.by_index(idx).map_err(|e| {
        ConvertError::Configuration(format!(
          "unreadable entry {idx} in {}: {e}",
          container.display()
        ))
      })?;

      let Some(relative) = entry.enclosed_name() else {
        warn!("Skipping unsafe archive entry `{}`", entry.name());
        continue;
      };
      let target = self.dir.path().join(relative);

      if entry.is_dir() {
        fs::create_dir_all(&target).map_err(|e| ConvertError::io(&target, e))?;
        continue;
      }

      if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
      }
      let mut out =
        File::create(&target).map_err(|e| ConvertError::io(&target, e))?;
      io::copy(&mut entry, &mut out).map_err(|e| ConvertError::io(&target, e))?;
    }

    debug!(
      "Extracted {} entries from {}",
      archive.len(),
      container.display()
    );
    Ok(())
  }

  #[must_use]
  pub fn path(&self) -> &Path {
    self.dir.path()
  }

  /// Resolve `relative` inside the workspace.
  ///
  /// Only plain name components are accepted, so an entry can never point
  /// outside the directory this guard removes.
  fn entry_path(&self, relative: &str) -> ConvertResult<PathBuf> {
    let path = Path::new(relative);
    let contained = path.components().next().is_some()
      && path.components().all(|c| matches!(c, Component::Normal(_)));
    if !contained {
      return Err(ConvertError::Configuration(format!(
        "entry path `{relative}` must be relative and stay inside the \
         container"
      )));
    }
    Ok(self.dir.path().join(path))
  }

  /// Read a UTF-8 entry.
  ///
  /// # Errors
  ///
  /// Returns [`ConvertError::Configuration`] if the entry does not exist or
  /// `relative` escapes the workspace, [`ConvertError::Io`] for any other
  /// read failure.
  pub fn read_entry(&self, relative: &str) -> ConvertResult<String> {
    let path = self.entry_path(relative)?;
    fs::read_to_string(&path).map_err(|e| {
      if e.kind() == io::ErrorKind::NotFound {
        ConvertError::Configuration(format!(
          "base container has no `{relative}` entry"
        ))
      } else {
        ConvertError::io(path, e)
      }
    })
  }

  /// Create or overwrite an entry, creating parent directories as needed.
  ///
  /// # Errors
  ///
  /// Returns [`ConvertError::Configuration`] if `relative` escapes the
  /// workspace, [`ConvertError::Io`] if the file cannot be written.
  pub fn write_entry(
    &self,
    relative: &str,
    contents: impl AsRef<[u8]>,
  ) -> ConvertResult<()> {
    let path = self.entry_path(relative)?;
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
    }
    fs::write(&path, contents).map_err(|e| ConvertError::io(path, e))
  }
}
