//! Exclusion regions that must never be converted.
//!
//! [`FilterContext::build`] makes a single pass over the input and records
//! every line the classifier has to leave alone: fenced code blocks, GFM
//! tables, lines carrying links or images, and lines opening dangerous HTML
//! elements. The result is read-only and only meaningful for the text it
//! was built from.

use std::{collections::BTreeSet, sync::LazyLock};

use log::{error, trace};
use regex::Regex;
use serde::Serialize;

use crate::utils::{codeblock::fenced_ranges, never_matching_regex, table_cells};

static INLINE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\[[^\]]*\]\([^)]*\)").unwrap_or_else(|e| {
    error!("Failed to compile INLINE_LINK_RE regex: {e}");
    never_matching_regex()
  })
});

static REFERENCE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\[[^\]]+\]\[[^\]]*\]").unwrap_or_else(|e| {
    error!("Failed to compile REFERENCE_LINK_RE regex: {e}");
    never_matching_regex()
  })
});

static LINK_DEFINITION_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^ {0,3}\[[^\]]+\]:\s*\S+").unwrap_or_else(|e| {
    error!("Failed to compile LINK_DEFINITION_RE regex: {e}");
    never_matching_regex()
  })
});

static AUTOLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"<([^<>]+)>").unwrap_or_else(|e| {
    error!("Failed to compile AUTOLINK_RE regex: {e}");
    never_matching_regex()
  })
});

static URL_SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]{1,31}:\S*$").unwrap_or_else(|e| {
    error!("Failed to compile URL_SCHEME_RE regex: {e}");
    never_matching_regex()
  })
});

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap_or_else(|e| {
    error!("Failed to compile IMAGE_RE regex: {e}");
    never_matching_regex()
  })
});

static DANGEROUS_HTML_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)<\s*(script|style|iframe|embed|object)\b").unwrap_or_else(
    |e| {
      error!("Failed to compile DANGEROUS_HTML_RE regex: {e}");
      never_matching_regex()
    },
  )
});

static TABLE_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\|?\s*:?-+:?\s*(\|\s*:?-+:?\s*)*\|?$").unwrap_or_else(|e| {
    error!("Failed to compile TABLE_SEPARATOR_RE regex: {e}");
    never_matching_regex()
  })
});

/// Precomputed exclusion ranges and line sets for one input text.
///
/// All indices are zero-based line numbers as produced by [`str::lines`].
/// Ranges are inclusive on both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterContext {
  pub code_blocks: Vec<(usize, usize)>,
  pub tables:      Vec<(usize, usize)>,
  pub link_lines:  BTreeSet<usize>,
  pub image_lines: BTreeSet<usize>,
  pub html_lines:  BTreeSet<usize>,
}

impl FilterContext {
  /// Scan `text` once and collect every region that must stay unconverted.
  #[must_use]
  pub fn build(text: &str) -> Self {
    let lines: Vec<&str> = text.lines().collect();

    let code_blocks = fenced_ranges(&lines);
    let tables = table_ranges(&lines, &code_blocks);

    let mut ctx = Self {
      code_blocks,
      tables,
      ..Self::default()
    };

    for (idx, line) in lines.iter().enumerate() {
      if has_link(line) {
        ctx.link_lines.insert(idx);
      }
      if IMAGE_RE.is_match(line) {
        ctx.image_lines.insert(idx);
      }
      if DANGEROUS_HTML_RE.is_match(line) {
        ctx.html_lines.insert(idx);
      }
    }

    trace!(
      "Filter context: {} code blocks, {} tables, {} link lines, {} image \
       lines, {} html lines",
      ctx.code_blocks.len(),
      ctx.tables.len(),
      ctx.link_lines.len(),
      ctx.image_lines.len(),
      ctx.html_lines.len()
    );

    ctx
  }

  #[must_use]
  pub fn in_code_block(&self, line: usize) -> bool {
    in_ranges(&self.code_blocks, line)
  }

  #[must_use]
  pub fn in_table(&self, line: usize) -> bool {
    in_ranges(&self.tables, line)
  }

  /// Whether the line at `line` is excluded for any reason.
  #[must_use]
  pub fn is_excluded(&self, line: usize) -> bool {
    self.in_code_block(line)
      || self.in_table(line)
      || self.link_lines.contains(&line)
      || self.image_lines.contains(&line)
      || self.html_lines.contains(&line)
  }
}

fn in_ranges(ranges: &[(usize, usize)], line: usize) -> bool {
  ranges
    .iter()
    .any(|&(start, end)| start <= line && line <= end)
}

fn has_link(line: &str) -> bool {
  INLINE_LINK_RE.is_match(line)
    || REFERENCE_LINK_RE.is_match(line)
    || LINK_DEFINITION_RE.is_match(line)
    || AUTOLINK_RE
      .captures_iter(line)
      .any(|caps| caps.get(1).is_some_and(|m| is_autolink_body(m.as_str())))
}

/// An autolink body is a URL with a scheme, or an email address.
fn is_autolink_body(body: &str) -> bool {
  URL_SCHEME_RE.is_match(body)
    || (body.contains('@') && !body.chars().any(char::is_whitespace))
}

fn is_separator_row(line: &str) -> bool {
  TABLE_SEPARATOR_RE.is_match(line.trim())
}

/// Detect GFM tables: a header row with at least two cells, a separator row
/// with the same cell count, then data rows while the cell count holds.
fn table_ranges(
  lines: &[&str],
  code_blocks: &[(usize, usize)],
) -> Vec<(usize, usize)> {
  let mut ranges = Vec::new();
  let mut idx = 0;

  while idx + 1 < lines.len() {
    if in_ranges(code_blocks, idx) || in_ranges(code_blocks, idx + 1) {
      idx += 1;
      continue;
    }

    let header = match table_cells(lines[idx]) {
      Some(cells) if cells.len() >= 2 => cells.len(),
      _ => {
        idx += 1;
        continue;
      },
    };

    let separator_matches = is_separator_row(lines[idx + 1])
      && table_cells(lines[idx + 1]).is_some_and(|c| c.len() == header);
    if !separator_matches {
      idx += 1;
      continue;
    }

    let mut end = idx + 1;
    while end + 1 < lines.len()
      && !in_ranges(code_blocks, end + 1)
      && table_cells(lines[end + 1]).is_some_and(|c| c.len() == header)
    {
      end += 1;
    }

    ranges.push((idx, end));
    idx = end + 1;
  }

  ranges
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_code_block_ranges() {
    let ctx = FilterContext::build("intro\n```\n# x\n```\noutro");
    assert_eq!(ctx.code_blocks, vec![(1, 3)]);
    assert!(ctx.in_code_block(2));
    assert!(!ctx.in_code_block(4));
  }

  #[test]
  fn test_unterminated_fence_runs_to_end() {
    let ctx = FilterContext::build("a\n~~~\nb\nc");
    assert_eq!(ctx.code_blocks, vec![(1, 3)]);
  }

  #[test]
  fn test_table_detection() {
    let text = "| a | b |\n|---|:-:|\n| 1 | 2 |\n| 3 | 4 |\nafter";
    let ctx = FilterContext::build(text);
    assert_eq!(ctx.tables, vec![(0, 3)]);
  }

  #[test]
  fn test_table_ends_at_inconsistent_row() {
    let text = "a | b\n--- | ---\n1 | 2\n1 | 2 | 3\nplain";
    let ctx = FilterContext::build(text);
    assert_eq!(ctx.tables, vec![(0, 2)]);
  }

  #[test]
  fn test_table_requires_matching_separator() {
    let ctx = FilterContext::build("| a | b |\n| --- |\n| 1 | 2 |");
    assert!(ctx.tables.is_empty());

    let ctx = FilterContext::build("| a | b |\nnot a separator");
    assert!(ctx.tables.is_empty());
  }

  #[test]
  fn test_single_cell_header_is_not_a_table() {
    let ctx = FilterContext::build("| a |\n| --- |");
    assert!(ctx.tables.is_empty());
  }

  #[test]
  fn test_table_inside_code_block_ignored() {
    let ctx = FilterContext::build("```\n| a | b |\n|---|---|\n```");
    assert!(ctx.tables.is_empty());
  }

  #[test]
  fn test_link_lines() {
    let text = "see [docs](https://example.com)\n[ref][1]\n[1]: https://x.y\n\
                mail <me@example.com>\nurl <https://example.com>\nplain";
    let ctx = FilterContext::build(text);
    assert_eq!(
      ctx.link_lines.iter().copied().collect::<Vec<_>>(),
      vec![0, 1, 2, 3, 4]
    );
  }

  #[test]
  fn test_comparison_is_not_autolink() {
    let ctx = FilterContext::build("저장 공간 < 1GB & 메모리 > 2GB");
    assert!(ctx.link_lines.is_empty());
    assert!(!ctx.is_excluded(0));
  }

  #[test]
  fn test_email_with_space_is_not_autolink() {
    let ctx = FilterContext::build("<a @b>");
    assert!(ctx.link_lines.is_empty());
  }

  #[test]
  fn test_image_lines() {
    let ctx = FilterContext::build("text\n![chart](chart.png)");
    assert!(ctx.image_lines.contains(&1));
    assert!(!ctx.image_lines.contains(&0));
  }

  #[test]
  fn test_dangerous_html_case_insensitive() {
    let text = "<SCRIPT>alert(1)</SCRIPT>\n<Iframe src=x>\n<div>ok</div>\n\
                < style>";
    let ctx = FilterContext::build(text);
    assert_eq!(
      ctx.html_lines.iter().copied().collect::<Vec<_>>(),
      vec![0, 1, 3]
    );
  }

  #[test]
  fn test_build_is_idempotent() {
    let text = "# t\n```\ncode\n```\n| a | b |\n|---|---|\n[x](y)";
    assert_eq!(FilterContext::build(text), FilterContext::build(text));
  }
}
