/// Table-of-contents extraction with GitHub-style slugs.
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text;

static ATX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*?))?(?:[ \t]+#+)?[ \t]*$").unwrap());

static SETEXT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ {0,3}(?:=+|-+)[ \t]*$").unwrap());

/// Lines that end a paragraph instead of joining it: list items and
/// blockquotes.
static BLOCK_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}(?:[-+*]|\d{1,9}[.)])(?:[ \t]|$)|^ {0,3}>").unwrap());

/// A heading in a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Heading {
    pub text: String,
    pub slug: String,
    /// 0-based line of the heading text.
    pub line: usize,
}

/// Consecutive paragraph lines; the text of a setext heading if an
/// underline follows.
struct Paragraph<'a> {
    first: usize,
    last: usize,
    lines: Vec<&'a str>,
}

/// Extract all headings from `text`, in document order.
///
/// Repeated slugs get a numeric suffix: the second `# Intro` becomes
/// `intro-1`, the third `intro-2`.
pub(crate) fn headings(text: &str) -> Vec<Heading> {
    let mut out = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut paragraph: Option<Paragraph> = None;

    for (line_idx, line) in text::body_lines(text) {
        // Skipped lines (fences, front matter) break the run.
        if paragraph.as_ref().is_some_and(|p| p.last + 1 != line_idx) {
            paragraph = None;
        }

        if let Some(caps) = ATX_RE.captures(line) {
            let heading_text = caps.get(2).map_or("", |m| m.as_str()).trim();
            push_heading(&mut out, &mut seen, heading_text, line_idx);
            paragraph = None;
            continue;
        }

        if SETEXT_RE.is_match(line) {
            // Without a paragraph above, this is a thematic break.
            if let Some(p) = paragraph.take() {
                push_heading(&mut out, &mut seen, &p.lines.join(" "), p.first);
            }
            continue;
        }

        if line.trim().is_empty() || BLOCK_START_RE.is_match(line) {
            paragraph = None;
            continue;
        }

        match paragraph.as_mut() {
            Some(p) => {
                p.lines.push(line.trim());
                p.last = line_idx;
            }
            None if !is_indented_code(line) => {
                paragraph = Some(Paragraph {
                    first: line_idx,
                    last: line_idx,
                    lines: vec![line.trim()],
                });
            }
            None => {}
        }
    }

    out
}

fn is_indented_code(line: &str) -> bool {
    line.starts_with('\t') || line.starts_with("    ")
}

fn push_heading(
    out: &mut Vec<Heading>,
    seen: &mut HashMap<String, usize>,
    heading_text: &str,
    line: usize,
) {
    let base = slugify(heading_text);
    let count = seen.entry(base.clone()).or_insert(0);
    let slug = if *count == 0 {
        base
    } else {
        slugify(&format!("{}-{}", heading_text, count))
    };
    *count += 1;
    out.push(Heading {
        text: heading_text.to_string(),
        slug,
        line,
    });
}

/// Convert heading text to a GitHub-style anchor slug.
pub(crate) fn slugify(heading_text: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for ch in heading_text.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() {
            pending_dash = true;
            continue;
        }
        if pending_dash {
            slug.push('-');
            pending_dash = false;
        }
        if is_dropped_punctuation(ch) {
            continue;
        }
        slug.push(ch);
    }
    slug.trim_matches('-').to_string()
}

fn is_dropped_punctuation(ch: char) -> bool {
    (ch.is_ascii_punctuation() && ch != '-')
        || "。，、；：？！…—·ˉ¨‘’“”々～‖∶＂＇｀｜〃〔〕〈〉《》「」『』．〖〗【】（）［］｛｝".contains(ch)
}
