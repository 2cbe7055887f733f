pub mod cli;
pub mod config;
pub mod extract;
pub mod llm;
pub mod models;
pub mod relay;
pub mod server;

use cli::Args;
use config::prompt;
use llm::LlmConfig;
use llm::chat::new_client as new_chat_client;
use log::{ info, warn };
use relay::ChatRelay;
use server::Server;
use server::api::{ AppState, ServerSettings };
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let llm_config = LlmConfig::from_args(&args)?;
    let chat_client = new_chat_client(&llm_config)?;
    let prompts = prompt::load_or_default(args.system_prompt_path.as_deref())?;

    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr());
    info!("Upstream Provider: {}", llm_config.llm_type);
    info!("Upstream Model: {}", chat_client.get_model());
    info!("Upstream Base URL: {}", chat_client.get_base_url().unwrap_or_default());
    info!("Upstream Max Retries: {}", llm_config.retry.max_retries);
    info!("API Key Configured: {}", chat_client.is_configured());
    info!("Prompts: {}", args.system_prompt_path.as_deref().unwrap_or("built-in"));
    info!("CORS Origins: {}", args.cors_origin_list().join(", "));
    info!("Rate Limit: {}/s", args.rate_limit_per_second);
    info!("Max Upload: {} MB", args.max_upload_mb);
    info!("-------------------------");

    if !chat_client.is_configured() {
        warn!(
            "{} environment variable is not set. Chat requests will fail and /health will report degraded.",
            llm_config.llm_type.api_key_env()
        );
    }

    let relay = Arc::new(ChatRelay::new(chat_client, Arc::new(prompts), args.assistant_creator.clone()));
    let settings = ServerSettings {
        cors_origins: args.cors_origin_list(),
        max_upload_bytes: args.max_upload_mb.saturating_mul(1024 * 1024),
        ..ServerSettings::default()
    };
    let state = AppState::new(relay, settings, args.rate_limit_per_second);

    let server = Server::new(args.server_addr(), state);
    server.run().await?;

    Ok(())
}
