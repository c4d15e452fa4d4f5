//! Splice composed fragments into the base body markup.
//!
//! The body is parsed with `roxmltree` only to locate things: the title
//! placeholder text node and the two anchor comments. The edits themselves
//! are applied to the source text by byte range, so everything outside the
//! edited spans (prolog, namespace declarations, attribute order, and
//! whitespace) comes out exactly as it went in.

use std::{fmt::Write, ops::Range};

use log::{debug, warn};
use roxmltree::{Document, Node};

use crate::{
  error::{ConvertError, ConvertResult},
  snippet::Fragment,
  utils::escape_xml,
};

/// Literal token marking the text node that receives the document title.
pub const TITLE_TOKEN: &str = "{{TITLE}}";

/// Comment text opening the generated region.
pub const CONTENT_START: &str = "Content Start";

/// Comment text closing the generated region.
pub const CONTENT_END: &str = "Content End";

const WRAPPER_ELEMENT: &str = "reportmark-fragment";

/// Namespace declarations in scope on the body's root element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespaces {
  decls: Vec<(Option<String>, String)>,
}

impl Namespaces {
  /// Collect the declarations visible on `node`.
  ///
  /// The implicit `xml` prefix is left out since it may not be redeclared.
  #[must_use]
  pub fn collect(node: Node<'_, '_>) -> Self {
    let decls = node
      .namespaces()
      .filter(|ns| ns.name() != Some("xml"))
      .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
      .collect();
    Self { decls }
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.decls.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.decls.is_empty()
  }

  /// Wrap `markup` in a synthetic element declaring every collected prefix.
  #[must_use]
  pub fn wrap(&self, markup: &str) -> String {
    let mut out = format!("<{WRAPPER_ELEMENT}");
    for (prefix, uri) in &self.decls {
      let uri = escape_xml(uri);
      // Writing to String is infallible
      let _ = match prefix {
        Some(prefix) => write!(out, " xmlns:{prefix}=\"{uri}\""),
        None => write!(out, " xmlns=\"{uri}\""),
      };
    }
    let _ = write!(out, ">{markup}</{WRAPPER_ELEMENT}>");
    out
  }

  /// Check that `fragment` is well-formed with these prefixes in scope.
  ///
  /// # Errors
  ///
  /// Returns [`ConvertError::Parse`] naming the fragment's snippet file.
  pub fn validate(&self, fragment: &Fragment) -> ConvertResult<()> {
    let wrapped = self.wrap(&fragment.markup);
    Document::parse(&wrapped).map(|_| ()).map_err(|e| {
      ConvertError::parse(
        format!("fragment from `{}`", fragment.snippet.file_name()),
        e,
      )
    })
  }
}

/// Replace the title placeholder and the anchored region of `body`.
///
/// Fragments are inserted in order right after the `Content Start` comment,
/// each followed by a newline. A body without a title placeholder is only
/// warned about. Without a title the placeholder is emptied.
///
/// # Errors
///
/// - [`ConvertError::Parse`] if the body or any fragment is malformed.
/// - [`ConvertError::Structural`] if the anchors are missing or out of
///   order.
pub fn assemble(
  body: &str,
  title: Option<&str>,
  fragments: &[Fragment],
) -> ConvertResult<String> {
  let doc =
    Document::parse(body).map_err(|e| ConvertError::parse("body markup", e))?;
  let root = doc.root_element();

  let namespaces = Namespaces::collect(root);
  for fragment in fragments {
    namespaces.validate(fragment)?;
  }

  let region = anchor_region(root)?;

  let mut inserted = String::new();
  for fragment in fragments {
    inserted.push_str(&fragment.markup);
    inserted.push('\n');
  }

  let mut edits = vec![(region.clone(), inserted)];

  match title_token_range(body, &doc) {
    Some(range) => {
      if range.end <= region.start || range.start >= region.end {
        edits.push((range, escape_xml(title.unwrap_or_default())));
      } else {
        debug!("Title placeholder lies inside the content region, dropped");
      }
    },
    None => {
      warn!(
        "Title placeholder `{TITLE_TOKEN}` not found in body markup, title \
         not substituted"
      );
    },
  }

  let assembled = apply_edits(body, edits);

  Document::parse(&assembled)
    .map_err(|e| ConvertError::parse("assembled body markup", e))?;

  debug!(
    "Assembled body with {} fragments ({} namespaces in scope)",
    fragments.len(),
    namespaces.len()
  );
  Ok(assembled)
}

/// Source range of the first title token inside a text node.
fn title_token_range(body: &str, doc: &Document<'_>) -> Option<Range<usize>> {
  doc.descendants().filter(Node::is_text).find_map(|node| {
    let range = node.range();
    let offset = body.get(range.clone())?.find(TITLE_TOKEN)?;
    let start = range.start + offset;
    Some(start..start + TITLE_TOKEN.len())
  })
}

fn is_anchor(node: &Node<'_, '_>, label: &str) -> bool {
  node.is_comment() && node.text().is_some_and(|t| t.trim() == label)
}

/// Byte range strictly between the two anchor comments.
fn anchor_region(root: Node<'_, '_>) -> ConvertResult<Range<usize>> {
  let start = root
    .children()
    .find(|n| is_anchor(n, CONTENT_START))
    .ok_or_else(|| {
      ConvertError::Structural(format!(
        "`<!-- {CONTENT_START} -->` not found among the root's children"
      ))
    })?;
  let end = root
    .children()
    .find(|n| is_anchor(n, CONTENT_END))
    .ok_or_else(|| {
      ConvertError::Structural(format!(
        "`<!-- {CONTENT_END} -->` not found among the root's children"
      ))
    })?;

  let (start, end) = (start.range(), end.range());
  if end.start < start.end {
    return Err(ConvertError::Structural(format!(
      "`<!-- {CONTENT_END} -->` appears before `<!-- {CONTENT_START} -->`"
    )));
  }

  Ok(start.end..end.start)
}

/// Apply non-overlapping edits, last first so earlier offsets stay valid.
fn apply_edits(source: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
  edits.sort_by_key(|(range, _)| std::cmp::Reverse(range.start));
  let mut out = source.to_string();
  for (range, replacement) in edits {
    out.replace_range(range, &replacement);
  }
  out
}
