pub mod codeblock;

use regex::Regex;

/// Escape text for insertion into XML character data or attribute values.
///
/// Covers `&`, `<`, `>`, `"` and `'`.
#[must_use]
pub fn escape_xml(text: &str) -> String {
  html_escape::encode_quoted_attribute(text).into_owned()
}

/// Width of a line's leading indentation, counting a tab as four spaces.
#[must_use]
pub fn indent_width(line: &str) -> usize {
  line
    .chars()
    .take_while(|c| c.is_whitespace())
    .map(|c| if c == '\t' { 4 } else { 1 })
    .sum()
}

/// Split a pipe-delimited row into its cells.
///
/// Leading and trailing pipes are optional, and `\|` does not split.
/// Returns `None` when the line has no unescaped pipe at all.
#[must_use]
pub fn table_cells(line: &str) -> Option<Vec<String>> {
  let trimmed = line.trim();
  let mut cells = Vec::new();
  let mut current = String::new();
  let mut pipes = 0;
  let mut chars = trimmed.chars().peekable();

  while let Some(c) = chars.next() {
    match c {
      '\\' if chars.peek() == Some(&'|') => {
        current.push('|');
        chars.next();
      },
      '|' => {
        pipes += 1;
        cells.push(std::mem::take(&mut current));
      },
      _ => current.push(c),
    }
  }
  cells.push(current);

  if pipes == 0 {
    return None;
  }

  if trimmed.starts_with('|') {
    cells.remove(0);
  }
  if trimmed.ends_with('|') && !trimmed.ends_with("\\|") {
    cells.pop();
  }

  Some(cells.into_iter().map(|c| c.trim().to_string()).collect())
}

/// Create a regex that never matches anything.
///
/// Used as a fallback pattern when a static regex fails to compile, so that
/// a bad pattern disables one rule instead of aborting classification.
#[must_use]
#[allow(
  clippy::unwrap_used,
  reason = "Both patterns are constant and known to compile"
)]
pub fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").unwrap_or_else(|_| Regex::new(r"^\b$").unwrap())
}
