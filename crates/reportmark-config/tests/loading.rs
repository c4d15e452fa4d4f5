#![allow(clippy::expect_used, reason = "Expect is acceptable in tests")]

use std::{fs, path::PathBuf};

use reportmark_config::{Config, ConfigError};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
  let path = dir.path().join(name);
  fs::write(&path, contents).expect("write config");
  path
}

#[test]
fn loads_toml_file() {
  let dir = TempDir::new().expect("tempdir");
  let path = write(
    &dir,
    "reportmark.toml",
    "base_template = \"base.hwpx\"\nsnippet_dir = \"reference\"\n",
  );

  let config = Config::from_file(&path).expect("load toml");
  assert_eq!(config.base_template, Some(PathBuf::from("base.hwpx")));
  assert_eq!(config.snippet_dir, Some(PathBuf::from("reference")));
  assert_eq!(config.body_path, "Contents/section0.xml");
}

#[test]
fn loads_json_file() {
  let dir = TempDir::new().expect("tempdir");
  let path = write(
    &dir,
    "reportmark.json",
    r#"{ "body_path": "Contents/section1.xml" }"#,
  );

  let config = Config::from_file(&path).expect("load json");
  assert_eq!(config.body_path, "Contents/section1.xml");
  assert!(config.base_template.is_none());
}

#[test]
fn rejects_unknown_extension() {
  let dir = TempDir::new().expect("tempdir");
  let path = write(&dir, "reportmark.yaml", "body_path: x\n");
  let err = Config::from_file(&path).expect_err("yaml unsupported");
  assert!(err.to_string().contains("Unsupported config file format"));
}

#[test]
fn later_files_take_precedence_and_overrides_win() {
  let dir = TempDir::new().expect("tempdir");
  let first = write(
    &dir,
    "a.toml",
    "base_template = \"first.hwpx\"\nworkspace_dir = \"/tmp/a\"\n",
  );
  let second = write(&dir, "b.json", r#"{ "base_template": "second.hwpx" }"#);

  let config = Config::load(&[first, second], &[
    "snippet_dir=custom".to_string(),
  ])
  .expect("load");

  assert_eq!(config.base_template, Some(PathBuf::from("second.hwpx")));
  assert_eq!(config.workspace_dir, Some(PathBuf::from("/tmp/a")));
  assert_eq!(config.snippet_dir, Some(PathBuf::from("custom")));
}

#[test]
fn generated_default_config_round_trips() {
  let dir = TempDir::new().expect("tempdir");
  for format in ["toml", "json"] {
    let path = dir.path().join(format!("reportmark.{format}"));
    Config::generate_default_config(format, &path).expect("generate");
    let config = Config::from_file(&path).expect("reload");
    assert_eq!(config, Config::default());
  }
}

#[test]
fn missing_file_is_io_error() {
  let dir = TempDir::new().expect("tempdir");
  let path = dir.path().join("absent.toml");
  let err = Config::from_file(&path).expect_err("missing file");
  assert!(matches!(err, ConfigError::Io { path: ref p, .. } if *p == path));
}

#[test]
fn malformed_toml_is_toml_error() {
  let dir = TempDir::new().expect("tempdir");
  let path = write(&dir, "reportmark.toml", "body_path = [unterminated\n");
  let err = Config::from_file(&path).expect_err("bad toml");
  assert!(matches!(err, ConfigError::Toml { .. }));
  assert!(err.to_string().contains("reportmark.toml"));
}

#[test]
fn malformed_json_is_serde_error() {
  let dir = TempDir::new().expect("tempdir");
  let path = write(&dir, "reportmark.json", "{ \"body_path\": 3 }");
  let err = Config::from_file(&path).expect_err("wrong type");
  assert!(matches!(err, ConfigError::Serde { .. }));
}
