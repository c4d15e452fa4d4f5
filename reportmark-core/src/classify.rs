//! Line classifier for the report dialect.
//!
//! Each non-blank line becomes exactly one [`MarkdownElement`]. Lines
//! covered by the [`FilterContext`] and checkbox items become
//! [`ElementKind::NoConvert`]. Everything else is matched against the
//! dialect rules in a fixed order, first match wins.
//!
//! Sequence numbers live in a [`RunState`] accumulator that is folded over
//! the lines of one call. A number counts up while consecutive elements
//! share a kind and restarts at 1 as soon as the run is broken, either by a
//! different kind or by a blank line.

use std::sync::LazyLock;

use log::{debug, error, trace};
use regex::Regex;

use crate::{
  filter::FilterContext,
  types::{ElementKind, MarkdownElement},
  utils::{indent_width, never_matching_regex},
};

static HEADING_1_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^#(?:\s+(.*))?$").unwrap_or_else(|e| {
    error!("Failed to compile HEADING_1_RE regex: {e}");
    never_matching_regex()
  })
});

static HEADING_2_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^##(?:\s+(.*))?$").unwrap_or_else(|e| {
    error!("Failed to compile HEADING_2_RE regex: {e}");
    never_matching_regex()
  })
});

static ORDERED_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\s*\d+\.\s+(.*)$").unwrap_or_else(|e| {
    error!("Failed to compile ORDERED_ITEM_RE regex: {e}");
    never_matching_regex()
  })
});

static UNORDERED_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\s*[-*+]\s+(.*)$").unwrap_or_else(|e| {
    error!("Failed to compile UNORDERED_ITEM_RE regex: {e}");
    never_matching_regex()
  })
});

static CHECKBOX_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\s*(?:[-*+]|\d+\.)\s+\[[ xX]\](?:\s|$)").unwrap_or_else(|e| {
    error!("Failed to compile CHECKBOX_ITEM_RE regex: {e}");
    never_matching_regex()
  })
});

static DATE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^생성일\s*[:：]\s*(\d{4}\.\d{1,2}\.\d{1,2})\.?$").unwrap_or_else(
    |e| {
      error!("Failed to compile DATE_LINE_RE regex: {e}");
      never_matching_regex()
    },
  )
});

static QUOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^>\s?(.*)$").unwrap_or_else(|e| {
    error!("Failed to compile QUOTE_RE regex: {e}");
    never_matching_regex()
  })
});

static HORIZON_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(?:-{3,}|\*{3,}|_{3,})$").unwrap_or_else(|e| {
    error!("Failed to compile HORIZON_LINE_RE regex: {e}");
    never_matching_regex()
  })
});

/// Classify `text`, building its filter context first.
#[must_use]
pub fn classify(text: &str) -> Vec<MarkdownElement> {
  let ctx = FilterContext::build(text);
  classify_with(text, &ctx)
}

/// Classify `text` against a filter context built from the same text.
#[must_use]
pub fn classify_with(text: &str, ctx: &FilterContext) -> Vec<MarkdownElement> {
  let elements = text
    .lines()
    .enumerate()
    .fold(RunState::default(), |state, (idx, line)| {
      state.step(idx, line, ctx)
    })
    .into_elements();

  debug!("Classified {} elements", elements.len());
  elements
}

/// Accumulator threaded through one classification pass.
#[derive(Debug, Default)]
struct RunState {
  elements:   Vec<MarkdownElement>,
  prev:       Option<ElementKind>,
  title_seen: bool,
  section:    u32,
  ordered_1:  u32,
  ordered_2:  u32,
}

impl RunState {
  fn step(mut self, idx: usize, line: &str, ctx: &FilterContext) -> Self {
    let trimmed = line.trim();
    if trimmed.is_empty() {
      self.prev = None;
      return self;
    }

    let element = if ctx.is_excluded(idx) || CHECKBOX_ITEM_RE.is_match(line) {
      MarkdownElement::no_convert(trimmed)
    } else {
      self.classify_line(line, trimmed)
    };

    trace!("line {idx}: {:?} {:?}", element.kind, element.content);
    self.prev = Some(element.kind);
    self.elements.push(element);
    self
  }

  fn classify_line(&mut self, line: &str, trimmed: &str) -> MarkdownElement {
    if let Some(caps) = HEADING_1_RE.captures(trimmed) {
      let content = capture_text(&caps);
      if !self.title_seen {
        self.title_seen = true;
        return MarkdownElement::new(ElementKind::Title, content, None);
      }
      return self.section(content);
    }

    if let Some(caps) = HEADING_2_RE.captures(trimmed) {
      return self.section(capture_text(&caps));
    }

    let depth = list_depth(line);

    if let (Some(depth), Some(caps)) = (depth, ORDERED_ITEM_RE.captures(line)) {
      let kind = if depth == 1 {
        ElementKind::OrderedListDepth1
      } else {
        ElementKind::OrderedListDepth2
      };
      let number = self.next_number(kind);
      return MarkdownElement::new(kind, capture_text(&caps), Some(number));
    }

    if let (Some(depth), Some(caps)) = (depth, UNORDERED_ITEM_RE.captures(line))
    {
      let kind = if depth == 1 {
        ElementKind::UnorderedListDepth1
      } else {
        ElementKind::UnorderedListDepth2
      };
      return MarkdownElement::new(kind, capture_text(&caps), None);
    }

    if let Some(caps) = DATE_LINE_RE.captures(trimmed) {
      return MarkdownElement::new(ElementKind::Date, capture_text(&caps), None);
    }

    if let Some(caps) = QUOTE_RE.captures(trimmed) {
      return MarkdownElement::new(
        ElementKind::Quotation,
        capture_text(&caps),
        None,
      );
    }

    if HORIZON_LINE_RE.is_match(trimmed) {
      return MarkdownElement::new(ElementKind::HorizonLine, "", None);
    }

    MarkdownElement::new(ElementKind::NormalText, trimmed, None)
  }

  fn section(&mut self, content: String) -> MarkdownElement {
    let number = self.next_number(ElementKind::Section);
    MarkdownElement::new(ElementKind::Section, content, Some(number))
  }

  /// Advance the counter for `kind`, restarting at 1 if the previous
  /// element was of another kind.
  fn next_number(&mut self, kind: ElementKind) -> u32 {
    let continues = self.prev == Some(kind);
    let counter = match kind {
      ElementKind::Section => &mut self.section,
      ElementKind::OrderedListDepth1 => &mut self.ordered_1,
      _ => &mut self.ordered_2,
    };
    *counter = if continues { *counter + 1 } else { 1 };
    *counter
  }

  fn into_elements(self) -> Vec<MarkdownElement> {
    self.elements
  }
}

/// List depth from leading indentation: none is depth 1, two or more
/// columns is depth 2. A single column of indentation is no list at all.
fn list_depth(line: &str) -> Option<u8> {
  match indent_width(line) {
    0 => Some(1),
    1 => None,
    _ => Some(2),
  }
}

fn capture_text(caps: &regex::Captures) -> String {
  caps
    .get(1)
    .map_or_else(String::new, |m| m.as_str().trim().to_string())
}
