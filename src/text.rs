use ropey::Rope;
use tower_lsp::lsp_types::Position;

/// Index of the closing `---` of a leading YAML front-matter block, if any.
pub(crate) fn frontmatter_end(text: &str) -> Option<usize> {
    let mut lines = text.lines().enumerate();
    let (_, first_line) = lines.next()?;
    if first_line.trim_end() != "---" {
        return None;
    }
    lines
        .find(|(_, line)| {
            let line = line.trim_end();
            line == "---" || line == "..."
        })
        .map(|(idx, _)| idx)
}

/// Iterate the lines of a markdown document that carry body content.
///
/// Front matter and fenced code blocks (including their fences) are skipped.
/// A fence is only closed by a bare run of the same character at least as
/// long as the one that opened it.
pub(crate) fn body_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let skip_until = frontmatter_end(text);
    let mut fence: Option<(char, usize)> = None;

    text.lines().enumerate().filter(move |(idx, line)| {
        if skip_until.is_some_and(|end| *idx <= end) {
            return false;
        }
        match fence {
            Some((ch, len)) => {
                if closes_fence(line, ch, len) {
                    fence = None;
                }
                false
            }
            None => {
                if let Some(open) = fence_marker(line) {
                    fence = Some(open);
                    return false;
                }
                true
            }
        }
    })
}

fn fence_marker(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start();
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let ch = trimmed.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }
    let len = trimmed.chars().take_while(|c| *c == ch).count();
    (len >= 3).then_some((ch, len))
}

/// Closing fences carry no info string.
fn closes_fence(line: &str, ch: char, len: usize) -> bool {
    match fence_marker(line) {
        Some((close_ch, close_len)) => {
            close_ch == ch
                && close_len >= len
                && line.trim_start()[close_len..].trim().is_empty()
        }
        None => false,
    }
}

/// Number of UTF-16 code units in `s`.
pub(crate) fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Byte offset in `line` for a UTF-16 column.
///
/// Columns past the end clamp to `line.len()`; a column inside a surrogate
/// pair rounds down to the start of that character.
pub(crate) fn byte_offset_at_utf16(line: &str, column: usize) -> usize {
    let mut units = 0;
    for (byte_idx, ch) in line.char_indices() {
        let next = units + ch.len_utf16();
        if next > column {
            return byte_idx;
        }
        units = next;
    }
    line.len()
}

/// Text of line `line_idx` without its line terminator.
pub(crate) fn line_text(rope: &Rope, line_idx: usize) -> Option<String> {
    let line = rope.get_line(line_idx)?.to_string();
    Some(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Convert an LSP position (UTF-16 column) to a char index in a rope.
///
/// Out-of-range positions clamp to the end of the line or document.
pub(crate) fn char_index(rope: &Rope, pos: Position) -> usize {
    let line_idx = pos.line as usize;
    if line_idx >= rope.len_lines() {
        return rope.len_chars();
    }
    let line_start = rope.line_to_char(line_idx);
    let line = rope.line(line_idx);
    let mut text = line.to_string();
    while text.ends_with(['\n', '\r']) {
        text.pop();
    }
    let byte = byte_offset_at_utf16(&text, pos.character as usize);
    line_start + text[..byte].chars().count()
}

/// Shift a position horizontally, saturating at column zero.
pub(crate) fn shift(pos: Position, delta: isize) -> Position {
    let character = (pos.character as isize + delta).max(0) as u32;
    Position::new(pos.line, character)
}
