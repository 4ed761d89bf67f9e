use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, info};

use crate::settings::Settings;
use crate::state::{BackendState, DocumentState};
use crate::text;

pub struct MdlinkLanguageServer {
    client: Client,
    state: BackendState,
}

impl MdlinkLanguageServer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: BackendState::new(),
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for MdlinkLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // Record every workspace folder; fall back to the root URI
        if let Some(folders) = &params.workspace_folders {
            for folder in folders {
                self.state.add_root(&folder.uri);
            }
        } else if let Some(root_uri) = &params.root_uri {
            self.state.add_root(root_uri);
        }
        self.state
            .set_settings(Settings::from_value(params.initialization_options.as_ref()));
        info!(roots = ?self.state.roots(), "initialize");

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![
                        ".".into(), // ./ and ../
                        "/".into(), // path segment
                        "#".into(), // heading anchor
                    ]),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                        supported: Some(true),
                        change_notifications: Some(OneOf::Left(true)),
                    }),
                    file_operations: None,
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "mdlink LSP initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let settings = Settings::from_value(Some(&params.settings));
        debug!(?settings, "did_change_configuration");
        self.state.set_settings(settings);
    }

    async fn did_change_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        for folder in &params.event.removed {
            self.state.remove_root(&folder.uri);
        }
        for folder in &params.event.added {
            self.state.add_root(&folder.uri);
        }
        debug!(roots = ?self.state.roots(), "did_change_workspace_folders");
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        self.state
            .documents
            .insert(uri, DocumentState::new(ropey::Rope::from_str(&text)));
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        // For incremental sync, apply changes to the rope
        if let Some(mut doc) = self.state.documents.get_mut(&uri) {
            for change in params.content_changes {
                if let Some(range) = change.range {
                    let start = text::char_index(&doc.rope, range.start);
                    let end = text::char_index(&doc.rope, range.end).max(start);
                    doc.rope.remove(start..end);
                    doc.rope.insert(start, &change.text);
                } else {
                    doc.rope = ropey::Rope::from_str(&change.text);
                }
            }
            doc.invalidate_headings();
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.state.documents.remove(&params.text_document.uri);
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let pos = params.text_document_position.position;
        Ok(crate::completions::provide(&self.state, uri, pos).await)
    }
}
