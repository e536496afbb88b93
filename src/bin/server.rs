//! Realtime communication hub server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin fitlink-hub -- --chat-service-url http://localhost:8081
//! ```

use std::{net::SocketAddr, sync::Arc};

use clap::Parser;

use fitlink_hub::{
    common::logger::setup_logger,
    domain::ChatStore,
    infrastructure::collaborator::{HttpChatStore, InMemoryChatStore},
    ui::state::AppState,
};

#[derive(Parser, Debug)]
#[command(name = "fitlink-hub", about = "Realtime communication hub")]
struct Args {
    /// Address to bind the server on
    #[arg(long, default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Base URL of the chat-persistence collaborator. Without it, chat
    /// history lives in process memory and is lost on restart.
    #[arg(long)]
    chat_service_url: Option<String>,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_CRATE_NAME"), &args.log_level);

    let chat_store: Arc<dyn ChatStore> = match &args.chat_service_url {
        Some(url) => {
            tracing::info!("using chat collaborator at {}", url);
            Arc::new(HttpChatStore::new(url.clone()))
        }
        None => {
            tracing::warn!("no --chat-service-url given, chat history is in-memory only");
            Arc::new(InMemoryChatStore::new())
        }
    };

    let state = Arc::new(AppState::new(chat_store));

    // Run the server
    if let Err(e) = fitlink_hub::run(args.bind, state).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
