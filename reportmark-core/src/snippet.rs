//! Reference snippets and placeholder substitution.
//!
//! A reference snippet is a small piece of body markup with
//! comment-delimited markers, for example
//!
//! ```xml
//! <hp:p><hp:run><hp:t><!--NAME_START-->항목<!--NAME_END--></hp:t></hp:run></hp:p>
//! ```
//!
//! Composing an element replaces each marker span, comments included, with
//! the element's escaped value. Which markers are filled, and with what, is
//! decided by [`substitutions`] from the element kind alone.

use std::{
  collections::{HashMap, hash_map::Entry},
  fs, io,
  path::{Path, PathBuf},
  sync::LazyLock,
};

use log::{debug, error, trace};
use regex::{NoExpand, Regex};

use crate::{
  error::{ConvertError, ConvertResult},
  types::{ElementKind, MarkdownElement, Marker, SnippetRef},
  utils::{escape_xml, never_matching_regex},
};

/// Section title used when a heading has no text.
pub const EMPTY_SECTION_TITLE: &str = "제목 없음";

const ALL_MARKERS: [Marker; 6] = [
  Marker::Number,
  Marker::Title,
  Marker::Name,
  Marker::Quote,
  Marker::Content,
  Marker::Date,
];

static MARKER_RES: LazyLock<HashMap<Marker, Regex>> = LazyLock::new(|| {
  ALL_MARKERS
    .iter()
    .map(|&marker| {
      let name = marker.name();
      let pattern =
        format!(r"(?s)<!--\s*{name}_START\s*-->.*?<!--\s*{name}_END\s*-->");
      let re = Regex::new(&pattern).unwrap_or_else(|e| {
        error!("Failed to compile marker regex for {name}: {e}");
        never_matching_regex()
      });
      (marker, re)
    })
    .collect()
});

/// A composed, not yet validated, markup fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
  /// Snippet the fragment was composed from.
  pub snippet: SnippetRef,
  pub markup:  String,
}

#[derive(Debug, Clone)]
enum SnippetSource {
  Directory(PathBuf),
  Entries(HashMap<String, String>),
}

/// Read-only set of reference snippets.
///
/// Backed either by a directory on disk or by an in-memory name to content
/// map. Both are resolved by file name, with the same alternate-spelling
/// fallback.
#[derive(Debug, Clone)]
pub struct SnippetLibrary {
  source: SnippetSource,
}

impl SnippetLibrary {
  /// Use the snippet files in `dir`.
  ///
  /// # Errors
  ///
  /// Returns [`ConvertError::Configuration`] if `dir` is not a directory.
  pub fn from_dir(dir: impl AsRef<Path>) -> ConvertResult<Self> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
      return Err(ConvertError::Configuration(format!(
        "snippet directory not found: {}",
        dir.display()
      )));
    }
    Ok(Self {
      source: SnippetSource::Directory(dir.to_path_buf()),
    })
  }

  /// Use snippets held in memory, keyed by file name.
  pub fn from_entries<I, K, V>(entries: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    Self {
      source: SnippetSource::Entries(
        entries
          .into_iter()
          .map(|(k, v)| (k.into(), v.into()))
          .collect(),
      ),
    }
  }

  /// Load the snippet text for `snippet`.
  ///
  /// # Errors
  ///
  /// Returns [`ConvertError::Configuration`] if neither the primary nor the
  /// alternate file name exists, or [`ConvertError::Io`] if the file exists
  /// but cannot be read.
  pub fn resolve(&self, snippet: SnippetRef) -> ConvertResult<String> {
    let names = std::iter::once(snippet.file_name())
      .chain(snippet.alternate_file_name());

    for name in names {
      if let Some(text) = self.lookup(name)? {
        trace!("Resolved snippet {snippet:?} from {name}");
        return Ok(text);
      }
    }

    Err(ConvertError::Configuration(format!(
      "reference snippet `{}` not found in {}",
      snippet.file_name(),
      self.describe()
    )))
  }

  fn lookup(&self, name: &str) -> ConvertResult<Option<String>> {
    match &self.source {
      SnippetSource::Entries(map) => Ok(map.get(name).cloned()),
      SnippetSource::Directory(dir) => {
        let path = dir.join(name);
        match fs::read_to_string(&path) {
          Ok(text) => Ok(Some(text)),
          Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
          Err(e) => Err(ConvertError::io(path, e)),
        }
      },
    }
  }

  fn describe(&self) -> String {
    match &self.source {
      SnippetSource::Directory(dir) => dir.display().to_string(),
      SnippetSource::Entries(_) => "embedded snippets".to_string(),
    }
  }

  /// Compose one element. Returns `None` for kinds that are never rendered.
  ///
  /// # Errors
  ///
  /// Fails if the snippet cannot be resolved or lacks a required marker.
  pub fn compose(
    &self,
    element: &MarkdownElement,
  ) -> ConvertResult<Option<Fragment>> {
    let Some(snippet) = element.template_ref else {
      return Ok(None);
    };
    let template = self.resolve(snippet)?;
    fill(snippet, &template, element).map(Some)
  }

  /// Compose every rendered element in order, loading each snippet once.
  ///
  /// # Errors
  ///
  /// Fails on the first snippet that cannot be resolved or filled.
  pub fn compose_all(
    &self,
    elements: &[MarkdownElement],
  ) -> ConvertResult<Vec<Fragment>> {
    let mut cache: HashMap<SnippetRef, String> = HashMap::new();
    let mut fragments = Vec::with_capacity(elements.len());

    for element in elements {
      let Some(snippet) = element.template_ref else {
        continue;
      };
      let template = match cache.entry(snippet) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => entry.insert(self.resolve(snippet)?),
      };
      fragments.push(fill(snippet, template, element)?);
    }

    debug!(
      "Composed {} fragments from {} snippets",
      fragments.len(),
      cache.len()
    );
    Ok(fragments)
  }
}

/// Marker values for an element, unescaped.
///
/// # Errors
///
/// Returns [`ConvertError::Configuration`] if a numbered kind arrives
/// without a number.
pub fn substitutions(
  element: &MarkdownElement,
) -> ConvertResult<Vec<(Marker, String)>> {
  let number = || {
    element.number.ok_or_else(|| {
      ConvertError::Configuration(format!(
        "{:?} element `{}` has no sequence number",
        element.kind, element.content
      ))
    })
  };
  let content = element.content.clone();

  let values = match element.kind {
    ElementKind::Date => vec![(Marker::Date, content)],
    ElementKind::Section => {
      let title = if content.is_empty() {
        EMPTY_SECTION_TITLE.to_string()
      } else {
        content
      };
      vec![(Marker::Number, number()?.to_string()), (Marker::Title, title)]
    },
    ElementKind::OrderedListDepth1 => {
      vec![(Marker::Number, number()?.to_string()), (Marker::Name, content)]
    },
    ElementKind::OrderedListDepth2 => {
      vec![
        (Marker::Number, format!("({})", number()?)),
        (Marker::Name, content),
      ]
    },
    ElementKind::UnorderedListDepth1 | ElementKind::UnorderedListDepth2 => {
      vec![(Marker::Name, content)]
    },
    ElementKind::Quotation => vec![(Marker::Quote, format!(" {content} "))],
    ElementKind::NormalText => {
      vec![(Marker::Content, format!(" {content} "))]
    },
    ElementKind::HorizonLine | ElementKind::Title | ElementKind::NoConvert => {
      Vec::new()
    },
  };
  Ok(values)
}

fn fill(
  snippet: SnippetRef,
  template: &str,
  element: &MarkdownElement,
) -> ConvertResult<Fragment> {
  let mut markup = template.trim().to_string();

  for (marker, value) in substitutions(element)? {
    let Some(re) = MARKER_RES.get(&marker) else {
      continue;
    };
    if !re.is_match(&markup) {
      return Err(ConvertError::Configuration(format!(
        "reference snippet `{}` has no {} marker",
        snippet.file_name(),
        marker.name()
      )));
    }
    let escaped = escape_xml(&value);
    markup = re.replace_all(&markup, NoExpand(&escaped)).into_owned();
  }

  Ok(Fragment { snippet, markup })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn library() -> SnippetLibrary {
    SnippetLibrary::from_entries([
      (
        "section.xml",
        "<p><t><!--NUMBER_START-->1<!--NUMBER_END-->. \
         <!--TITLE_START-->제목<!--TITLE_END--></t></p>",
      ),
      ("normal_text.xml", "<p><t><!--CONTENT_START-->x<!--CONTENT_END--></t></p>"),
      ("ordered_list_2.xml", "<p><!--NUMBER_START--><!--NUMBER_END--> <!--NAME_START--><!--NAME_END--></p>"),
      ("horizontal_line.xml", "<p><hr/></p>"),
      ("date.xml", "<p>생성일: </p>"),
    ])
  }

  #[test]
  fn test_section_substitution() {
    let el = MarkdownElement::new(ElementKind::Section, "개요", Some(3));
    let frag = library().compose(&el).expect("compose").expect("fragment");
    assert_eq!(frag.markup, "<p><t>3. 개요</t></p>");
  }

  #[test]
  fn test_empty_section_title_placeholder() {
    let el = MarkdownElement::new(ElementKind::Section, "", Some(1));
    let frag = library().compose(&el).expect("compose").expect("fragment");
    assert!(frag.markup.contains(EMPTY_SECTION_TITLE));
  }

  #[test]
  fn test_normal_text_is_padded_and_escaped() {
    let el = MarkdownElement::new(ElementKind::NormalText, "a < b & c", None);
    let frag = library().compose(&el).expect("compose").expect("fragment");
    assert_eq!(frag.markup, "<p><t> a &lt; b &amp; c </t></p>");
  }

  #[test]
  fn test_nested_number_in_parentheses() {
    let el = MarkdownElement::new(ElementKind::OrderedListDepth2, "b", Some(2));
    let frag = library().compose(&el).expect("compose").expect("fragment");
    assert_eq!(frag.markup, "<p>(2) b</p>");
  }

  #[test]
  fn test_numbered_kind_without_number_is_rejected() {
    let el = MarkdownElement {
      kind:         ElementKind::Section,
      content:      "개요".to_string(),
      number:       None,
      template_ref: Some(SnippetRef::Section),
    };
    let err = library().compose(&el).expect_err("no number");
    assert_eq!(err.kind(), crate::ErrorKind::Configuration);
    assert!(substitutions(&el).is_err());

    let el = MarkdownElement::new(ElementKind::OrderedListDepth2, "b", None);
    assert!(library().compose(&el).is_err());
  }

  #[test]
  fn test_alternate_spelling_fallback() {
    let el = MarkdownElement::new(ElementKind::HorizonLine, "", None);
    let frag = library().compose(&el).expect("compose").expect("fragment");
    assert_eq!(frag.markup, "<p><hr/></p>");
  }

  #[test]
  fn test_missing_snippet_is_configuration_error() {
    let el = MarkdownElement::new(ElementKind::Quotation, "q", None);
    let err = library().compose(&el).expect_err("missing snippet");
    assert_eq!(err.kind(), crate::ErrorKind::Configuration);
  }

  #[test]
  fn test_missing_marker_is_configuration_error() {
    let el = MarkdownElement::new(ElementKind::Date, "2024.01.01", None);
    let err = library().compose(&el).expect_err("missing marker");
    assert_eq!(err.kind(), crate::ErrorKind::Configuration);
  }

  #[test]
  fn test_unrendered_kinds_compose_to_none() {
    let lib = library();
    let title = MarkdownElement::new(ElementKind::Title, "t", None);
    assert_eq!(lib.compose(&title).expect("compose"), None);
    let raw = MarkdownElement::no_convert("```");
    assert_eq!(lib.compose(&raw).expect("compose"), None);
  }

  #[test]
  fn test_compose_all_skips_unrendered() {
    let elements = vec![
      MarkdownElement::new(ElementKind::Title, "t", None),
      MarkdownElement::new(ElementKind::Section, "s", Some(1)),
      MarkdownElement::no_convert("| a | b |"),
      MarkdownElement::new(ElementKind::NormalText, "n", None),
    ];
    let fragments = library().compose_all(&elements).expect("compose");
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0].snippet, SnippetRef::Section);
    assert_eq!(fragments[1].snippet, SnippetRef::NormalText);
  }

  #[test]
  fn test_replacement_is_literal() {
    let el = MarkdownElement::new(ElementKind::NormalText, "$1 cost", None);
    let frag = library().compose(&el).expect("compose").expect("fragment");
    assert!(frag.markup.contains("$1 cost"));
  }

  #[test]
  fn test_from_dir_requires_directory() {
    let err = SnippetLibrary::from_dir("/definitely/not/here")
      .expect_err("missing dir");
    assert_eq!(err.kind(), crate::ErrorKind::Configuration);
  }
}
