//! Types for the classified element stream.
use serde::{Deserialize, Serialize};

/// Semantic kind of one classified line.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum ElementKind {
  Title,
  Section,
  OrderedListDepth1,
  OrderedListDepth2,
  UnorderedListDepth1,
  UnorderedListDepth2,
  Quotation,
  NormalText,
  HorizonLine,
  Date,
  /// Filtered syntax (code, tables, links, images, raw HTML, checkboxes).
  /// Never rendered.
  NoConvert,
}

impl ElementKind {
  /// Reference snippet used to render this kind.
  ///
  /// `Title` is substituted directly into the body placeholder and
  /// `NoConvert` is dropped, so neither has one.
  #[must_use]
  pub const fn snippet_ref(self) -> Option<SnippetRef> {
    match self {
      Self::Title | Self::NoConvert => None,
      Self::Section => Some(SnippetRef::Section),
      Self::OrderedListDepth1 => Some(SnippetRef::OrderedList1),
      Self::OrderedListDepth2 => Some(SnippetRef::OrderedList2),
      Self::UnorderedListDepth1 => Some(SnippetRef::UnorderedList1),
      Self::UnorderedListDepth2 => Some(SnippetRef::UnorderedList2),
      Self::Quotation => Some(SnippetRef::Quotation),
      Self::NormalText => Some(SnippetRef::NormalText),
      Self::HorizonLine => Some(SnippetRef::HorizonLine),
      Self::Date => Some(SnippetRef::Date),
    }
  }

  /// Whether elements of this kind carry a sequence number.
  #[must_use]
  pub const fn is_numbered(self) -> bool {
    matches!(
      self,
      Self::Section | Self::OrderedListDepth1 | Self::OrderedListDepth2
    )
  }

  /// Whether elements of this kind end up in the assembled body.
  #[must_use]
  pub const fn is_rendered(self) -> bool {
    self.snippet_ref().is_some()
  }
}

/// Substitution marker inside a reference snippet.
///
/// A marker named `NAME` is written as `<!--NAME_START-->placeholder<!--NAME_END-->`
/// and the whole span, comments included, is replaced by the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
  Number,
  Title,
  Name,
  Quote,
  Content,
  Date,
}

impl Marker {
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::Number => "NUMBER",
      Self::Title => "TITLE",
      Self::Name => "NAME",
      Self::Quote => "QUOTE",
      Self::Content => "CONTENT",
      Self::Date => "DATE",
    }
  }
}

/// Name of a reference snippet file.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum SnippetRef {
  Section,
  OrderedList1,
  OrderedList2,
  UnorderedList1,
  UnorderedList2,
  Quotation,
  NormalText,
  HorizonLine,
  Date,
}

impl SnippetRef {
  /// Every snippet a complete reference directory must provide.
  pub const ALL: [Self; 9] = [
    Self::Section,
    Self::OrderedList1,
    Self::OrderedList2,
    Self::UnorderedList1,
    Self::UnorderedList2,
    Self::Quotation,
    Self::NormalText,
    Self::HorizonLine,
    Self::Date,
  ];

  /// Primary file name inside the reference directory.
  #[must_use]
  pub const fn file_name(self) -> &'static str {
    match self {
      Self::Section => "section.xml",
      Self::OrderedList1 => "ordered_list_1.xml",
      Self::OrderedList2 => "ordered_list_2.xml",
      Self::UnorderedList1 => "unordered_list_1.xml",
      Self::UnorderedList2 => "unordered_list_2.xml",
      Self::Quotation => "quotation.xml",
      Self::NormalText => "normal_text.xml",
      Self::HorizonLine => "horizon_line.xml",
      Self::Date => "date.xml",
    }
  }

  /// Older spelling accepted when the primary file is absent.
  #[must_use]
  pub const fn alternate_file_name(self) -> Option<&'static str> {
    match self {
      Self::HorizonLine => Some("horizontal_line.xml"),
      _ => None,
    }
  }

  /// Markers this snippet must contain.
  #[must_use]
  pub const fn markers(self) -> &'static [Marker] {
    match self {
      Self::Section => &[Marker::Number, Marker::Title],
      Self::OrderedList1 | Self::OrderedList2 => {
        &[Marker::Number, Marker::Name]
      },
      Self::UnorderedList1 | Self::UnorderedList2 => &[Marker::Name],
      Self::Quotation => &[Marker::Quote],
      Self::NormalText => &[Marker::Content],
      Self::HorizonLine => &[],
      Self::Date => &[Marker::Date],
    }
  }
}

/// One classified logical unit of input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownElement {
  pub kind:         ElementKind,
  /// Trimmed line body without markdown punctuation. Raw trimmed line for
  /// [`ElementKind::NoConvert`].
  pub content:      String,
  /// Set only for sections and ordered list items.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub number:       Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub template_ref: Option<SnippetRef>,
}

impl MarkdownElement {
  /// Create an element, deriving its snippet reference from `kind`.
  ///
  /// `number` is discarded for kinds that are not numbered.
  #[must_use]
  pub fn new(
    kind: ElementKind,
    content: impl Into<String>,
    number: Option<u32>,
  ) -> Self {
    Self {
      kind,
      content: content.into(),
      number: if kind.is_numbered() { number } else { None },
      template_ref: kind.snippet_ref(),
    }
  }

  /// Filtered line kept verbatim.
  #[must_use]
  pub fn no_convert(raw: impl Into<String>) -> Self {
    Self::new(ElementKind::NoConvert, raw, None)
  }
}
