/// Link-target context detection for path, anchor and reference completions.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::text;

/// `[...](...|`
static LINK_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*?)\]\(\s*([^\s()]*)$").unwrap());

/// `[...][...|`
static REFERENCE_LINK_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*?)\]\[\s*([^\s()]*)$").unwrap());

/// `[id]: |`
static DEFINITION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\[[A-Za-z0-9_-]+\]:\s*(\S*)$").unwrap());

static URL_SCHEME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[A-Za-z0-9_-]+:").unwrap());

static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*)#([A-Za-z0-9_-]*)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LinkContextKind {
    /// `[text](|)`
    Link,
    /// `[text][|]`
    ReferenceLink,
    /// `[id]: |`
    LinkDefinition,
}

/// The `#fragment` part of a link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AnchorContext {
    /// Target text before the `#`. For `[text](xy#z|abc)` this is `xy`.
    pub before_anchor: String,
    /// Anchor text before the cursor. For `[text](xy#z|abc)` this is `z`.
    pub anchor_prefix: String,
}

/// Where the cursor sits inside a link target.
///
/// For `[text](xy#z|abc)`: `prefix` is `xy#z`, `suffix` is `abc`, and
/// `start_offset` is the UTF-16 column just before `xy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinkContext {
    pub kind: LinkContextKind,
    pub prefix: String,
    pub suffix: String,
    pub start_offset: usize,
    pub anchor: Option<AnchorContext>,
}

/// Resolve the link context at UTF-16 column `column` of `line`.
///
/// Inline links take precedence over link definitions, which take
/// precedence over reference links. Targets that look like URLs
/// (`scheme:...`) yield `None` except in reference links.
pub(crate) fn resolve(line: &str, column: usize) -> Option<LinkContext> {
    let split = text::byte_offset_at_utf16(line, column);
    let (before, after) = line.split_at(split);
    let cursor = text::utf16_len(before);

    if let Some(caps) = LINK_START_RE.captures(before) {
        let prefix = caps.get(2).map_or("", |m| m.as_str());
        if looks_like_url(prefix) {
            return None;
        }
        let suffix = leading_run(after, |c| c != ')' && !c.is_whitespace());
        return Some(LinkContext {
            kind: LinkContextKind::Link,
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            start_offset: cursor - text::utf16_len(prefix),
            anchor: anchor_context(prefix),
        });
    }

    if let Some(caps) = DEFINITION_RE.captures(before) {
        let prefix = caps.get(1).map_or("", |m| m.as_str());
        if looks_like_url(prefix) {
            return None;
        }
        let suffix = leading_run(after, |c| !c.is_whitespace());
        return Some(LinkContext {
            kind: LinkContextKind::LinkDefinition,
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            start_offset: cursor - text::utf16_len(prefix),
            anchor: anchor_context(prefix),
        });
    }

    if let Some(caps) = REFERENCE_LINK_START_RE.captures(before) {
        let prefix = caps.get(2).map_or("", |m| m.as_str());
        let suffix = leading_run(after, |c| c != ']' && !c.is_whitespace());
        return Some(LinkContext {
            kind: LinkContextKind::ReferenceLink,
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            start_offset: cursor - text::utf16_len(prefix),
            anchor: None,
        });
    }

    None
}

/// Check if `prefix` looks like an `http:` style URL.
fn looks_like_url(prefix: &str) -> bool {
    URL_SCHEME_RE.is_match(prefix)
}

fn anchor_context(prefix: &str) -> Option<AnchorContext> {
    let caps = ANCHOR_RE.captures(prefix)?;
    Some(AnchorContext {
        before_anchor: caps[1].to_string(),
        anchor_prefix: caps[2].to_string(),
    })
}

fn leading_run(s: &str, keep: impl Fn(char) -> bool) -> &str {
    let end = s.find(|c: char| !keep(c)).unwrap_or(s.len());
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Resolve with the cursor at the `|` marker.
    fn at_cursor(marked: &str) -> Option<LinkContext> {
        let idx = marked.find('|').expect("cursor marker");
        let line = marked.replacen('|', "", 1);
        resolve(&line, text::utf16_len(&marked[..idx]))
    }

    #[test]
    fn empty_inline_target() {
        let ctx = at_cursor("text[label](|").unwrap();
        assert_eq!(ctx.kind, LinkContextKind::Link);
        assert_eq!(ctx.prefix, "");
        assert_eq!(ctx.suffix, "");
        assert_eq!(ctx.start_offset, 12);
        assert_eq!(ctx.anchor, None);
    }

    #[test]
    fn inline_directory_prefix() {
        let ctx = at_cursor("[text](./docs/|").unwrap();
        assert_eq!(ctx.kind, LinkContextKind::Link);
        assert_eq!(ctx.prefix, "./docs/");
        assert_eq!(ctx.start_offset, 7);
    }

    #[test]
    fn leading_whitespace_not_in_prefix() {
        let ctx = at_cursor("[text](  ./a|").unwrap();
        assert_eq!(ctx.prefix, "./a");
        assert_eq!(ctx.start_offset, 9);
    }

    #[test]
    fn anchor_in_current_document() {
        let ctx = at_cursor("[text](#sec|)").unwrap();
        assert_eq!(ctx.kind, LinkContextKind::Link);
        assert_eq!(
            ctx.anchor,
            Some(AnchorContext {
                before_anchor: String::new(),
                anchor_prefix: "sec".to_string(),
            })
        );
    }

    #[test]
    fn anchor_in_other_document() {
        let ctx = at_cursor("[text](other.md#sec|)").unwrap();
        let anchor = ctx.anchor.unwrap();
        assert_eq!(anchor.before_anchor, "other.md");
        assert_eq!(anchor.anchor_prefix, "sec");
        assert_eq!(ctx.prefix, format!("{}#{}", anchor.before_anchor, anchor.anchor_prefix));
    }

    #[test]
    fn anchor_uses_last_hash() {
        let ctx = at_cursor("[t](a#b#c|").unwrap();
        let anchor = ctx.anchor.unwrap();
        assert_eq!(anchor.before_anchor, "a#b");
        assert_eq!(anchor.anchor_prefix, "c");
    }

    #[test]
    fn anchor_with_invalid_characters_is_dropped() {
        let ctx = at_cursor("[t](doc.md#a.b|").unwrap();
        assert_eq!(ctx.prefix, "doc.md#a.b");
        assert_eq!(ctx.anchor, None);
    }

    #[test]
    fn url_targets_suppressed() {
        assert_eq!(at_cursor("[text](http://example.com|"), None);
        assert_eq!(at_cursor("[text](mailto:me|"), None);
        assert_eq!(at_cursor("[id]: https://example.com|"), None);
    }

    #[test]
    fn reference_link() {
        let ctx = at_cursor("[label][ref|").unwrap();
        assert_eq!(ctx.kind, LinkContextKind::ReferenceLink);
        assert_eq!(ctx.prefix, "ref");
        assert_eq!(ctx.start_offset, 8);
        assert_eq!(ctx.anchor, None);
    }

    #[test]
    fn reference_link_not_url_suppressed() {
        let ctx = at_cursor("[label][http:x|]").unwrap();
        assert_eq!(ctx.kind, LinkContextKind::ReferenceLink);
        assert_eq!(ctx.prefix, "http:x");
        assert_eq!(ctx.suffix, "");
    }

    #[test]
    fn reference_link_has_no_anchor() {
        let ctx = at_cursor("[label][a#b|").unwrap();
        assert_eq!(ctx.anchor, None);
    }

    #[test]
    fn reference_link_suffix_stops_at_bracket() {
        let ctx = at_cursor("[label][re|f] more").unwrap();
        assert_eq!(ctx.prefix, "re");
        assert_eq!(ctx.suffix, "f");
    }

    #[test]
    fn link_definition_at_line_start() {
        let ctx = at_cursor("[id]: ./foo|").unwrap();
        assert_eq!(ctx.kind, LinkContextKind::LinkDefinition);
        assert_eq!(ctx.prefix, "./foo");
        assert_eq!(ctx.start_offset, 6);

        let indented = at_cursor("   [id]: ./foo|").unwrap();
        assert_eq!(indented.kind, LinkContextKind::LinkDefinition);
    }

    #[test]
    fn link_definition_not_at_line_start() {
        assert_eq!(at_cursor("x [id]: ./foo|"), None);
    }

    #[test]
    fn link_definition_suffix_and_anchor() {
        let ctx = at_cursor("[id]: doc.md#in|tro \"Title\"").unwrap();
        assert_eq!(ctx.suffix, "tro");
        let anchor = ctx.anchor.unwrap();
        assert_eq!(anchor.before_anchor, "doc.md");
        assert_eq!(anchor.anchor_prefix, "in");
    }

    #[test]
    fn inline_link_beats_definition() {
        let ctx = at_cursor("[id]: [x](y|").unwrap();
        assert_eq!(ctx.kind, LinkContextKind::Link);
        assert_eq!(ctx.prefix, "y");
    }

    #[test]
    fn definition_beats_reference_link() {
        let ctx = at_cursor("[id]: [x][y|").unwrap();
        assert_eq!(ctx.kind, LinkContextKind::LinkDefinition);
        assert_eq!(ctx.prefix, "[x][y");
    }

    #[test]
    fn suffix_extraction() {
        assert_eq!(at_cursor("[text](ab|cd)").unwrap().suffix, "cd");
        assert_eq!(at_cursor("[text](ab|cd efg)").unwrap().suffix, "cd");
        assert_eq!(at_cursor("[text](ab|)").unwrap().suffix, "");
    }

    #[test]
    fn closed_link_is_not_a_context() {
        assert_eq!(at_cursor("[text](done) and |"), None);
        assert_eq!(at_cursor("plain text|"), None);
        assert_eq!(at_cursor("[text] (x|"), None);
    }

    #[test]
    fn resolution_is_pure() {
        let line = "see [a](docs/ind";
        assert_eq!(resolve(line, 15), resolve(line, 15));
    }

    #[test]
    fn utf16_columns() {
        let ctx = at_cursor("😀 [t](dir/|").unwrap();
        assert_eq!(ctx.prefix, "dir/");
        // Emoji is two UTF-16 code units.
        assert_eq!(ctx.start_offset, 7);
    }

    #[test]
    fn column_past_end_clamps() {
        let ctx = resolve("[t](abc", 100).unwrap();
        assert_eq!(ctx.prefix, "abc");
        assert_eq!(ctx.start_offset, 4);
    }
}
