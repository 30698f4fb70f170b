pub mod models;
pub mod server;
pub mod config;
pub mod llm;
pub mod cli;
pub mod proxy;
pub mod chat;

use cli::{ Args, ChatArgs, Command };
use log::info;
use proxy::{ ConversationProxy, FALLBACK_MODEL };
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(command: Command) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        Command::Serve(args) => serve(args).await,
        Command::Chat(args) => run_chat(args).await,
    }
}

pub async fn serve(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Proxy Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Provider Base URL: {}", args.openai_base_url);
    info!("Provider Shape: {}", args.provider_shape);
    info!("Primary Model: {}", args.openai_model);
    info!("Fallback Model: {}", FALLBACK_MODEL);
    info!("Temperature: {}", args.openai_temp);
    info!("Max Output Tokens: {}", args.max_output_tokens);
    info!("Request Timeout: {}s", args.request_timeout_secs);
    info!("Prompt Policy: {}", args.prompt_policy);
    info!("Credential Present: {}", args.openai_api_key.as_deref().is_some_and(|k| !k.trim().is_empty()));
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let proxy = Arc::new(ConversationProxy::new(&args)?);
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, proxy, args);
    server.run().await?;

    Ok(())
}

pub async fn run_chat(args: ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    chat::terminal::run_terminal(&args).await
}
