#![allow(dead_code, reason = "Not every test binary uses every helper")]

use std::{
  collections::BTreeMap,
  io::{Cursor, Read},
};

use reportmark_core::{BaseTemplate, Converter, SnippetLibrary};
use zip::ZipArchive;

/// Converter backed by the embedded snippets and base container.
pub fn embedded_converter() -> Converter {
  let base: BTreeMap<String, Vec<u8>> = reportmark_templates::all_base_files()
    .into_iter()
    .map(|(name, content)| (name.to_string(), content.as_bytes().to_vec()))
    .collect();
  let snippets =
    SnippetLibrary::from_entries(reportmark_templates::all_snippets());
  Converter::new(BaseTemplate::Entries(base), snippets)
}

/// Read one UTF-8 entry out of container bytes.
pub fn read_entry(container: &[u8], name: &str) -> String {
  let mut archive =
    ZipArchive::new(Cursor::new(container)).expect("container is a zip");
  let mut entry = archive.by_name(name).expect("entry present");
  let mut text = String::new();
  entry.read_to_string(&mut text).expect("entry is UTF-8");
  text
}

/// Text of every `<hp:t>` run in `body`, in document order.
pub fn text_runs(body: &str) -> Vec<String> {
  let doc = roxmltree::Document::parse(body).expect("body is well-formed");
  doc
    .descendants()
    .filter(|n| n.has_tag_name("t"))
    .map(|n| {
      n.descendants()
        .filter(roxmltree::Node::is_text)
        .filter_map(|t| t.text())
        .collect::<String>()
    })
    .collect()
}
