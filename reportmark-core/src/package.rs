//! Re-serialize a workspace tree into a container archive.

use std::{
  fs,
  io::{Cursor, Write},
  path::Path,
};

use log::{debug, trace};
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::error::{ConvertError, ConvertResult};

/// Top-level entry declaring the container's media type.
pub const MIMETYPE_ENTRY: &str = "mimetype";

/// Pack every file under `dir` into a ZIP container.
///
/// The `mimetype` entry goes first and is stored uncompressed, as readers
/// sniff it at a fixed offset. All other files follow in path order,
/// Deflate-compressed, with forward-slash relative names.
///
/// # Errors
///
/// - [`ConvertError::Configuration`] if `dir` has no `mimetype` file.
/// - [`ConvertError::Io`] or [`ConvertError::Archive`] if reading the tree
///   or writing the archive fails.
pub fn pack_directory(dir: &Path) -> ConvertResult<Vec<u8>> {
  let marker = dir.join(MIMETYPE_ENTRY);
  if !marker.is_file() {
    return Err(ConvertError::Configuration(format!(
      "container tree {} has no `{MIMETYPE_ENTRY}` entry",
      dir.display()
    )));
  }

  let stored =
    SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
  let deflated = SimpleFileOptions::default()
    .compression_method(CompressionMethod::Deflated);

  let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

  let mimetype = fs::read(&marker).map_err(|e| ConvertError::io(&marker, e))?;
  zip.start_file(MIMETYPE_ENTRY, stored)?;
  zip
    .write_all(&mimetype)
    .map_err(|e| ConvertError::io(&marker, e))?;

  let mut count = 1;
  for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
    let entry = entry.map_err(|e| {
      let path = e.path().unwrap_or(dir).to_path_buf();
      ConvertError::io(path, e.into())
    })?;
    if !entry.file_type().is_file() {
      continue;
    }

    let Some(name) = entry_name(dir, entry.path()) else {
      continue;
    };
    if name == MIMETYPE_ENTRY {
      continue;
    }

    let contents =
      fs::read(entry.path()).map_err(|e| ConvertError::io(entry.path(), e))?;
    trace!("Packing {name} ({} bytes)", contents.len());
    zip.start_file(name, deflated)?;
    zip
      .write_all(&contents)
      .map_err(|e| ConvertError::io(entry.path(), e))?;
    count += 1;
  }

  let bytes = zip.finish()?.into_inner();
  debug!("Packed {count} entries into {} bytes", bytes.len());
  Ok(bytes)
}

/// Archive name for `path`: relative to `root`, joined with `/`.
fn entry_name(root: &Path, path: &Path) -> Option<String> {
  let relative = path.strip_prefix(root).ok()?;
  let parts: Vec<_> = relative
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect();
  Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
  use std::io::Read;

  use zip::ZipArchive;

  use super::*;
  use crate::ErrorKind;

  fn tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("mimetype"), "application/hwp+zip")
      .expect("write mimetype");
    fs::create_dir_all(dir.path().join("Contents")).expect("mkdir");
    fs::write(dir.path().join("Contents/section0.xml"), "<sec/>")
      .expect("write body");
    fs::write(dir.path().join("version.xml"), "<v/>").expect("write version");
    dir
  }

  #[test]
  fn test_mimetype_first_and_stored() {
    let dir = tree();
    let bytes = pack_directory(dir.path()).expect("pack");

    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("archive");
    let first = archive.by_index(0).expect("first entry");
    assert_eq!(first.name(), "mimetype");
    assert_eq!(first.compression(), CompressionMethod::Stored);
  }

  #[test]
  fn test_other_entries_deflated_with_forward_slashes() {
    let dir = tree();
    let bytes = pack_directory(dir.path()).expect("pack");
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("archive");

    assert_eq!(archive.len(), 3);
    let mut body = archive.by_name("Contents/section0.xml").expect("body");
    assert_eq!(body.compression(), CompressionMethod::Deflated);
    let mut text = String::new();
    body.read_to_string(&mut text).expect("read");
    assert_eq!(text, "<sec/>");
  }

  #[test]
  fn test_mimetype_not_duplicated() {
    let dir = tree();
    let bytes = pack_directory(dir.path()).expect("pack");
    let archive = ZipArchive::new(Cursor::new(bytes)).expect("archive");
    let count = archive.file_names().filter(|n| *n == "mimetype").count();
    assert_eq!(count, 1);
  }

  #[test]
  fn test_missing_mimetype_is_configuration_error() {
    let dir = tree();
    fs::remove_file(dir.path().join("mimetype")).expect("remove");
    let err = pack_directory(dir.path()).expect_err("no mimetype");
    assert_eq!(err.kind(), ErrorKind::Configuration);
  }

  #[test]
  fn test_packing_is_deterministic() {
    let dir = tree();
    let a = pack_directory(dir.path()).expect("pack");
    let b = pack_directory(dir.path()).expect("pack");
    assert_eq!(a, b);
  }
}
