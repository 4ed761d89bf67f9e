use tower_lsp::lsp_types::*;
use tracing::debug;

use crate::definitions;
use crate::directory;
use crate::headings::Heading;
use crate::link_context::{self, AnchorContext, LinkContext, LinkContextKind};
use crate::link_resolve;
use crate::state::BackendState;
use crate::text;

/// Client command that reopens the suggest widget after a folder is picked.
const TRIGGER_SUGGEST: &str = "editor.action.triggerSuggest";

/// Provide path, anchor and reference completions at the given position.
///
/// Returns `None` when path suggestions are disabled or the cursor is not in
/// a link target.
pub async fn provide(
    state: &BackendState,
    uri: &Url,
    position: Position,
) -> Option<CompletionResponse> {
    if !state.settings().path_suggestions_enabled() {
        return None;
    }

    let line = state.line_text(uri, position.line as usize)?;
    let context = link_context::resolve(&line, position.character as usize)?;
    debug!(
        uri = %uri,
        kind = ?context.kind,
        prefix = %context.prefix,
        "completions: link context"
    );

    // The resolver clamps the column to the line; keep ranges consistent.
    let cursor = Position::new(
        position.line,
        (context.start_offset + text::utf16_len(&context.prefix)) as u32,
    );

    let items = match context.kind {
        LinkContextKind::ReferenceLink => reference_items(state, uri, cursor, &context),
        LinkContextKind::Link | LinkContextKind::LinkDefinition => {
            link_items(state, uri, cursor, &context).await
        }
    };
    Some(CompletionResponse::Array(items))
}

fn reference_items(
    state: &BackendState,
    uri: &Url,
    cursor: Position,
    context: &LinkContext,
) -> Vec<CompletionItem> {
    let Some(text) = state.document_text(uri) else {
        return Vec::new();
    };
    let start = Position::new(cursor.line, context.start_offset as u32);
    definitions::definitions(&text)
        .into_iter()
        .map(|def| {
            let mut item = completion_item(
                def.label,
                CompletionItemKind::REFERENCE,
                start,
                cursor,
                &context.suffix,
            );
            item.detail = Some(def.target);
            item
        })
        .collect()
}

async fn link_items(
    state: &BackendState,
    uri: &Url,
    cursor: Position,
    context: &LinkContext,
) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    let anchor_in_current_doc = context
        .anchor
        .as_ref()
        .is_some_and(|anchor| anchor.before_anchor.is_empty());

    if context.prefix.is_empty() || anchor_in_current_doc {
        let start = Position::new(cursor.line, context.start_offset as u32);
        let headings = state.headings(uri).unwrap_or_default();
        items.extend(heading_items(&headings, start, cursor, &context.suffix));
    }

    if anchor_in_current_doc {
        return items;
    }

    match &context.anchor {
        Some(anchor) => {
            items.extend(other_document_heading_items(state, uri, cursor, context, anchor).await)
        }
        None => items.extend(path_items(state, uri, cursor, context).await),
    }
    items
}

/// Headings of the document named before the `#`.
async fn other_document_heading_items(
    state: &BackendState,
    uri: &Url,
    cursor: Position,
    context: &LinkContext,
    anchor: &AnchorContext,
) -> Vec<CompletionItem> {
    let path = match link_resolve::resolve_reference(&state.roots(), uri, &anchor.before_anchor) {
        Ok(path) => path,
        Err(e) => {
            debug!(error = %e, "completions: cannot resolve anchor target");
            return Vec::new();
        }
    };
    let Some(doc) = link_resolve::resolve_markdown_file(state, &path).await else {
        debug!(path = %path.display(), "completions: anchor target is not a markdown file");
        return Vec::new();
    };
    debug!(document = %doc.uri, headings = doc.headings.len(), "completions: anchor target");

    // Replace from the `#` onwards.
    let start = text::shift(cursor, -((text::utf16_len(&anchor.anchor_prefix) + 1) as isize));
    heading_items(&doc.headings, start, cursor, &context.suffix)
}

/// Entries of the directory named by the prefix up to its last `/`.
async fn path_items(
    state: &BackendState,
    uri: &Url,
    cursor: Position,
    context: &LinkContext,
) -> Vec<CompletionItem> {
    let dir_part = match context.prefix.rfind('/') {
        Some(idx) => &context.prefix[..=idx],
        None => "",
    };
    let reference = if dir_part.is_empty() { "." } else { dir_part };

    let parent = match link_resolve::resolve_reference(&state.roots(), uri, reference) {
        Ok(parent) => parent,
        Err(e) => {
            debug!(error = %e, "completions: cannot resolve directory");
            return Vec::new();
        }
    };
    let entries = match directory::list_directory(&parent).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!(error = %e, "completions: cannot list directory");
            return Vec::new();
        }
    };

    let start = Position::new(
        cursor.line,
        (context.start_offset + text::utf16_len(dir_part)) as u32,
    );
    entries
        .into_iter()
        .filter(|entry| !entry.name.starts_with('.'))
        .map(|entry| {
            if entry.is_directory {
                let mut item = completion_item(
                    format!("{}/", entry.name),
                    CompletionItemKind::FOLDER,
                    start,
                    cursor,
                    &context.suffix,
                );
                item.command = Some(Command {
                    title: String::new(),
                    command: TRIGGER_SUGGEST.to_string(),
                    arguments: None,
                });
                item
            } else {
                completion_item(
                    entry.name,
                    CompletionItemKind::FILE,
                    start,
                    cursor,
                    &context.suffix,
                )
            }
        })
        .collect()
}

fn heading_items(
    headings: &[Heading],
    start: Position,
    cursor: Position,
    suffix: &str,
) -> Vec<CompletionItem> {
    headings
        .iter()
        .map(|heading| {
            let mut item = completion_item(
                format!("#{}", heading.slug),
                CompletionItemKind::REFERENCE,
                start,
                cursor,
                suffix,
            );
            item.detail = Some(heading.text.clone());
            item
        })
        .collect()
}

/// Build an item that inserts over `start..cursor` or replaces through the
/// existing suffix.
fn completion_item(
    label: String,
    kind: CompletionItemKind,
    start: Position,
    cursor: Position,
    suffix: &str,
) -> CompletionItem {
    let insert = Range::new(start, cursor);
    let replace = Range::new(start, text::shift(cursor, text::utf16_len(suffix) as isize));
    CompletionItem {
        label: label.clone(),
        kind: Some(kind),
        text_edit: Some(CompletionTextEdit::InsertAndReplace(InsertReplaceEdit {
            new_text: label,
            insert,
            replace,
        })),
        ..Default::default()
    }
}
