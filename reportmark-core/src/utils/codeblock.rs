/// Fence state while walking lines of markdown.
///
/// Tracks whether a fenced code block is open, together with the fence
/// character and length needed to recognise its closing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceTracker {
  open: Option<Fence>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
  ch:    char,
  count: usize,
  /// Nothing but whitespace follows the fence characters.
  bare:  bool,
}

/// Parse a fence line: three or more backticks or tildes after optional
/// leading whitespace.
fn parse_fence(line: &str) -> Option<Fence> {
  let trimmed = line.trim_start();
  let ch = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
  let count = trimmed.chars().take_while(|&c| c == ch).count();
  let bare = trimmed.trim_start_matches(ch).trim().is_empty();
  (count >= 3).then_some(Fence { ch, count, bare })
}

impl FenceTracker {
  #[must_use]
  pub const fn new() -> Self {
    Self { open: None }
  }

  #[must_use]
  pub const fn in_code_block(&self) -> bool {
    self.open.is_some()
  }

  /// Feed one line and return the state after it.
  ///
  /// A closing fence must use the opening character, be at least as long
  /// as the opening fence and carry no info string.
  #[must_use]
  pub fn process_line(&self, line: &str) -> Self {
    let Some(fence) = parse_fence(line) else {
      return *self;
    };

    match self.open {
      None => Self { open: Some(fence) },
      Some(open)
        if open.ch == fence.ch && fence.count >= open.count && fence.bare =>
      {
        Self { open: None }
      },
      Some(_) => *self,
    }
  }
}

/// Inclusive line ranges covered by fenced code blocks, fences included.
///
/// An unterminated fence runs to the last line.
#[must_use]
pub fn fenced_ranges(lines: &[&str]) -> Vec<(usize, usize)> {
  let mut ranges = Vec::new();
  let mut tracker = FenceTracker::new();
  let mut start = 0;

  for (idx, line) in lines.iter().enumerate() {
    let next = tracker.process_line(line);
    match (tracker.in_code_block(), next.in_code_block()) {
      (false, true) => start = idx,
      (true, false) => ranges.push((start, idx)),
      _ => {},
    }
    tracker = next;
  }

  if tracker.in_code_block() && !lines.is_empty() {
    ranges.push((start, lines.len() - 1));
  }

  ranges
}
