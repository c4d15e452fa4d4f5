//! # reportmark-core
//!
//! Converts report prose written in a small Markdown dialect into a
//! ZIP-based document container (HWPX-style: a `mimetype` entry plus XML
//! body markup).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reportmark_core::{BaseTemplate, Converter, SnippetLibrary};
//!
//! # fn main() -> Result<(), reportmark_core::ConvertError> {
//! let snippets = SnippetLibrary::from_dir("reference")?;
//! let converter =
//!   Converter::new(BaseTemplate::Container("base.hwpx".into()), snippets);
//! let bytes = converter.convert("# 주간 보고\n\n## 진행 상황", "out.hwpx".as_ref())?;
//! println!("{} bytes", bytes.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! 1. [`FilterContext::build`] marks code blocks, tables, links, images and
//!    dangerous HTML so they are never converted.
//! 2. [`classify`] turns each line into a [`MarkdownElement`].
//! 3. [`SnippetLibrary`] fills the reference snippet for each element.
//! 4. [`assemble()`] splices the fragments between the body's
//!    `Content Start` and `Content End` comments and sets the title.
//! 5. [`pack_directory`] writes the container, `mimetype` first and stored.
//!
//! Each conversion works in its own temporary [`DocumentWorkspace`].

pub mod assemble;
pub mod classify;
pub mod converter;
pub mod error;
pub mod filter;
pub mod package;
pub mod snippet;
mod types;
pub mod utils;
pub mod workspace;

pub use crate::{
  assemble::assemble,
  classify::{classify, classify_with},
  converter::{BaseTemplate, Converter, DEFAULT_BODY_PATH},
  error::{ConvertError, ConvertResult, ErrorKind},
  filter::FilterContext,
  package::{MIMETYPE_ENTRY, pack_directory},
  snippet::{Fragment, SnippetLibrary},
  types::{ElementKind, MarkdownElement, Marker, SnippetRef},
  workspace::DocumentWorkspace,
};
