/// Reference-style link definition parser (`[label]: target`).
use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text;

static DEFINITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*\[((?:\\\]|[^\]])+)\]:[ \t]*(?:<([^>]+)>|(\S+))").unwrap()
});

/// A link definition found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinkDefinition {
    pub label: String,
    /// Target without surrounding angle brackets.
    pub target: String,
    /// 0-based line number.
    pub line: usize,
    /// 0-based UTF-16 column of the target start.
    pub start_col: usize,
    /// 0-based UTF-16 column one past the target end.
    pub end_col: usize,
}

/// Scan `text` for link definitions, in document order.
///
/// Footnotes (`[^note]: ...`) are not link definitions. When a label is
/// defined twice, the first definition wins.
pub(crate) fn definitions(text: &str) -> Vec<LinkDefinition> {
    let mut out = Vec::new();
    let mut labels = HashSet::new();

    for (line_idx, line) in text::body_lines(text) {
        let Some(caps) = DEFINITION_RE.captures(line) else {
            continue;
        };
        let label = &caps[1];
        if label.starts_with('^') {
            continue;
        }
        let Some(target) = caps.get(2).or_else(|| caps.get(3)) else {
            continue;
        };
        if !labels.insert(label.to_string()) {
            continue;
        }
        out.push(LinkDefinition {
            label: label.to_string(),
            target: target.as_str().to_string(),
            line: line_idx,
            start_col: text::utf16_len(&line[..target.start()]),
            end_col: text::utf16_len(&line[..target.end()]),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_definition() {
        let defs = definitions("Intro\n\n[docs]: ./docs/readme.md \"Docs\"\n");
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].label, "docs");
        assert_eq!(defs[0].target, "./docs/readme.md");
        assert_eq!(defs[0].line, 2);
        assert_eq!(defs[0].start_col, 8);
        assert_eq!(defs[0].end_col, 24);
    }

    #[test]
    fn angle_bracket_target() {
        let defs = definitions("[a b]: <my file.md>");
        assert_eq!(defs[0].label, "a b");
        assert_eq!(defs[0].target, "my file.md");
        assert_eq!(defs[0].start_col, 8);
        assert_eq!(defs[0].end_col, 18);
    }

    #[test]
    fn escaped_bracket_in_label() {
        let defs = definitions(r"[a\]b]: x.md");
        assert_eq!(defs[0].label, r"a\]b");
    }

    #[test]
    fn skips_footnotes_and_code() {
        let text = "[^1]: A footnote\n```\n[code]: x.md\n```\n[real]: y.md";
        let defs = definitions(text);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].label, "real");
        assert_eq!(defs[0].line, 4);
    }

    #[test]
    fn first_definition_wins() {
        let defs = definitions("[x]: first.md\n[y]: other.md\n[x]: second.md");
        let labels: Vec<&str> = defs.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["x", "y"]);
        assert_eq!(defs[0].target, "first.md");
    }

    #[test]
    fn missing_target_is_not_a_definition() {
        assert!(definitions("[x]:").is_empty());
        assert!(definitions("see [x]: y").is_empty());
    }
}
