use std::path::PathBuf;

use thiserror::Error;
use tower_lsp::lsp_types::Url;

/// Failures of the collaborators behind completion requests.
///
/// None of these reach the client; callers log them and offer fewer items.
#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a file URI: {0}")]
    NotAFileUri(Url),
}

pub(crate) type Result<T> = std::result::Result<T, Error>;
