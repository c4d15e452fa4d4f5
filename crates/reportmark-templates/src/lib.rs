//! Reference snippets and a minimal HWPX base container, embedded at build
//! time so the converter works without any files on disk.

use std::collections::HashMap;

pub const SECTION_SNIPPET: &str =
  include_str!("../templates/snippets/section.xml");
pub const ORDERED_LIST_1_SNIPPET: &str =
  include_str!("../templates/snippets/ordered_list_1.xml");
pub const ORDERED_LIST_2_SNIPPET: &str =
  include_str!("../templates/snippets/ordered_list_2.xml");
pub const UNORDERED_LIST_1_SNIPPET: &str =
  include_str!("../templates/snippets/unordered_list_1.xml");
pub const UNORDERED_LIST_2_SNIPPET: &str =
  include_str!("../templates/snippets/unordered_list_2.xml");
pub const QUOTATION_SNIPPET: &str =
  include_str!("../templates/snippets/quotation.xml");
pub const NORMAL_TEXT_SNIPPET: &str =
  include_str!("../templates/snippets/normal_text.xml");
pub const HORIZON_LINE_SNIPPET: &str =
  include_str!("../templates/snippets/horizon_line.xml");
pub const DATE_SNIPPET: &str = include_str!("../templates/snippets/date.xml");

pub const MIMETYPE: &str = include_str!("../templates/base/mimetype");
pub const CONTAINER_XML: &str =
  include_str!("../templates/base/META-INF/container.xml");
pub const MANIFEST_XML: &str =
  include_str!("../templates/base/META-INF/manifest.xml");
pub const CONTENT_HPF: &str =
  include_str!("../templates/base/Contents/content.hpf");
pub const HEADER_XML: &str =
  include_str!("../templates/base/Contents/header.xml");
pub const SECTION0_XML: &str =
  include_str!("../templates/base/Contents/section0.xml");
pub const VERSION_XML: &str = include_str!("../templates/base/version.xml");
pub const SETTINGS_XML: &str = include_str!("../templates/base/settings.xml");

/// Reference snippets keyed by file name.
#[must_use]
pub fn all_snippets() -> HashMap<&'static str, &'static str> {
  let mut snippets = HashMap::new();
  snippets.insert("section.xml", SECTION_SNIPPET);
  snippets.insert("ordered_list_1.xml", ORDERED_LIST_1_SNIPPET);
  snippets.insert("ordered_list_2.xml", ORDERED_LIST_2_SNIPPET);
  snippets.insert("unordered_list_1.xml", UNORDERED_LIST_1_SNIPPET);
  snippets.insert("unordered_list_2.xml", UNORDERED_LIST_2_SNIPPET);
  snippets.insert("quotation.xml", QUOTATION_SNIPPET);
  snippets.insert("normal_text.xml", NORMAL_TEXT_SNIPPET);
  snippets.insert("horizon_line.xml", HORIZON_LINE_SNIPPET);
  snippets.insert("date.xml", DATE_SNIPPET);
  snippets
}

/// Base container tree keyed by `/`-separated entry path.
#[must_use]
pub fn all_base_files() -> HashMap<&'static str, &'static str> {
  let mut files = HashMap::new();
  files.insert("mimetype", MIMETYPE);
  files.insert("META-INF/container.xml", CONTAINER_XML);
  files.insert("META-INF/manifest.xml", MANIFEST_XML);
  files.insert("Contents/content.hpf", CONTENT_HPF);
  files.insert("Contents/header.xml", HEADER_XML);
  files.insert("Contents/section0.xml", SECTION0_XML);
  files.insert("version.xml", VERSION_XML);
  files.insert("settings.xml", SETTINGS_XML);
  files
}
