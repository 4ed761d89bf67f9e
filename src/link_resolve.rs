/// Resolve link targets to files relative to the linking document.
use std::path::{Component, Path, PathBuf};

use tower_lsp::lsp_types::Url;
use tracing::debug;

use crate::error::{Error, Result};
use crate::headings::Heading;
use crate::state::BackendState;

/// A markdown document a link points at, with its headings.
pub(crate) struct ResolvedDocument {
    pub uri: Url,
    pub headings: Vec<Heading>,
}

/// Resolve `reference` against the document at `document`.
///
/// - `/`-prefixed references are relative to the workspace root that
///   contains the document, or absolute when no root does.
/// - Everything else is relative to the document's directory.
///
/// The result is normalized lexically; it is not checked for existence.
pub(crate) fn resolve_reference(
    roots: &[PathBuf],
    document: &Url,
    reference: &str,
) -> Result<PathBuf> {
    let doc_path = document
        .to_file_path()
        .map_err(|()| Error::NotAFileUri(document.clone()))?;

    if let Some(rooted) = reference.strip_prefix('/') {
        if let Some(root) = roots.iter().find(|root| doc_path.starts_with(root)) {
            return Ok(normalize(&root.join(rooted)));
        }
    }

    let base = doc_path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(normalize(&base.join(reference)))
}

/// Find the markdown file at `path`, trying `path.md` when `path` has no
/// extension. Files with any other extension are not markdown. Open
/// documents are preferred over the file on disk.
pub(crate) async fn resolve_markdown_file(
    state: &BackendState,
    path: &Path,
) -> Option<ResolvedDocument> {
    let candidate = match path.extension().and_then(|ext| ext.to_str()) {
        None if path.extension().is_none() => path.with_extension("md"),
        Some(ext) if is_markdown_extension(ext) => path.to_path_buf(),
        _ => {
            debug!(path = %path.display(), "link_resolve: not a markdown file");
            return None;
        }
    };

    let uri = Url::from_file_path(&candidate).ok()?;
    if let Some(headings) = state.headings(&uri) {
        return Some(ResolvedDocument { uri, headings });
    }
    match tokio::fs::read_to_string(&candidate).await {
        Ok(text) => {
            let headings = crate::headings::headings(&text);
            Some(ResolvedDocument { uri, headings })
        }
        Err(e) => {
            debug!(path = %candidate.display(), error = %e, "link_resolve: markdown file not readable");
            None
        }
    }
}

fn is_markdown_extension(ext: &str) -> bool {
    ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown")
}

/// Lexically remove `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
