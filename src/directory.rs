use std::path::Path;

use crate::error::{Error, Result};

/// A directory entry offered as a path completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DirEntry {
    pub name: String,
    pub is_directory: bool,
}

/// List `path`, sorted by name. Symlinks are followed to classify entries.
pub(crate) async fn list_directory(path: &Path) -> Result<Vec<DirEntry>> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut read_dir = tokio::fs::read_dir(path).await.map_err(io_err)?;
    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await.map_err(io_err)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_directory = match tokio::fs::metadata(entry.path()).await {
            Ok(meta) => meta.is_dir(),
            // Dangling symlink
            Err(_) => false,
        };
        entries.push(DirEntry { name, is_directory });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
