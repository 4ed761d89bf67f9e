use dashmap::DashMap;
use ropey::Rope;
use tower_lsp::lsp_types::Url;

use std::path::PathBuf;
use std::sync::{Mutex, RwLock};

use crate::headings::Heading;
use crate::settings::Settings;

/// Per-document state: rope content + cached headings.
pub struct DocumentState {
    pub rope: Rope,
    cached_headings: Mutex<Option<Vec<Heading>>>,
}

impl DocumentState {
    pub fn new(rope: Rope) -> Self {
        Self {
            rope,
            cached_headings: Mutex::new(None),
        }
    }

    /// Get cached headings, extracting lazily if needed.
    pub(crate) fn headings(&self) -> Vec<Heading> {
        let mut cache = self.cached_headings.lock().unwrap();
        if let Some(ref cached) = *cache {
            return cached.clone();
        }
        let parsed = crate::headings::headings(&self.rope.to_string());
        *cache = Some(parsed.clone());
        parsed
    }

    /// Invalidate cached headings (call after rope mutations).
    pub fn invalidate_headings(&self) {
        *self.cached_headings.lock().unwrap() = None;
    }
}

/// Shared backend state for the LSP server.
///
/// Holds the workspace roots, client settings, and in-memory document
/// contents for open files.
pub struct BackendState {
    /// Workspace folder paths, used for `/`-prefixed link targets.
    pub workspace_roots: RwLock<Vec<PathBuf>>,

    /// Client configuration.
    pub settings: RwLock<Settings>,

    /// In-memory content of open documents, keyed by URI.
    pub documents: DashMap<Url, DocumentState>,
}

impl BackendState {
    pub fn new() -> Self {
        Self {
            workspace_roots: RwLock::new(Vec::new()),
            settings: RwLock::new(Settings::default()),
            documents: DashMap::new(),
        }
    }

    pub fn roots(&self) -> Vec<PathBuf> {
        self.workspace_roots.read().unwrap().clone()
    }

    pub fn add_root(&self, uri: &Url) {
        let Ok(path) = uri.to_file_path() else {
            return;
        };
        let mut roots = self.workspace_roots.write().unwrap();
        if !roots.contains(&path) {
            roots.push(path);
        }
    }

    pub fn remove_root(&self, uri: &Url) {
        if let Ok(path) = uri.to_file_path() {
            self.workspace_roots.write().unwrap().retain(|r| *r != path);
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings.read().unwrap().clone()
    }

    pub fn set_settings(&self, settings: Settings) {
        *self.settings.write().unwrap() = settings;
    }

    pub fn document_text(&self, uri: &Url) -> Option<String> {
        self.documents.get(uri).map(|r| r.rope.to_string())
    }

    /// Text of a single line of an open document, without its terminator.
    pub fn line_text(&self, uri: &Url, line: usize) -> Option<String> {
        let doc = self.documents.get(uri)?;
        crate::text::line_text(&doc.rope, line)
    }

    pub(crate) fn headings(&self, uri: &Url) -> Option<Vec<Heading>> {
        self.documents.get(uri).map(|doc| doc.headings())
    }
}
