use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

mod completions;
mod definitions;
mod directory;
mod error;
mod headings;
mod link_context;
mod link_resolve;
mod server;
mod settings;
mod state;
mod text;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(server::MdlinkLanguageServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
