use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Upstream Provider Args ---
    /// Upstream chat provider (openrouter, deepseek). Inferred from whichever API key is set when omitted.
    #[arg(long, env = "LLM_PROVIDER")]
    pub provider: Option<String>,

    /// API key for OpenRouter.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub openrouter_api_key: Option<String>,

    /// API key for DeepSeek.
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    pub deepseek_api_key: Option<String>,

    /// Model id sent upstream (e.g., deepseek/deepseek-chat-v3.1:free). Defaults to the provider's default model.
    /// OpenRouter-style `vendor/model` ids are ignored when the provider is DeepSeek.
    #[arg(long, env = "OPENROUTER_MODEL")]
    pub model: Option<String>,

    /// Override of the provider API base URL (e.g., https://openrouter.ai/api/v1)
    #[arg(long, env = "UPSTREAM_BASE_URL")] // No default, the provider picks its own
    pub upstream_base_url: Option<String>,

    /// Value of the HTTP-Referer attribution header sent upstream.
    #[arg(long, env = "APP_REFERER", default_value = "https://github.com/HenshawMike/nera")]
    pub app_referer: String,

    /// Value of the X-Title attribution header sent upstream.
    #[arg(long, env = "APP_TITLE", default_value = "NERA Real Estate Assistant")]
    pub app_title: String,

    /// How many times a transient upstream failure (timeout, 429, 5xx) is retried. 0 disables retries.
    #[arg(long, env = "UPSTREAM_MAX_RETRIES", default_value = "2")]
    pub upstream_max_retries: u32,

    // --- Assistant Args ---
    /// Optional JSON file with the system and upload-analysis prompts.
    #[arg(long, env = "SYSTEM_PROMPT_PATH")]
    pub system_prompt_path: Option<String>,

    /// When set, "who built you" questions are answered locally with this name.
    #[arg(long, env = "ASSISTANT_CREATOR")]
    pub assistant_creator: Option<String>,

    // --- Server Args ---
    /// Interface the HTTP server binds to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port the HTTP server listens on.
    #[arg(long, env = "PORT", default_value = "8001")]
    pub port: u16,

    /// Log filter (error, warn, info, debug, trace or an env_logger directive list).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Comma-separated list of origins allowed by CORS.
    #[arg(
        long,
        env = "CORS_ORIGINS",
        default_value = "https://nera-ai.netlify.app,http://localhost:5173,http://localhost:3000"
    )]
    pub cors_origins: String,

    /// Global limit of API requests per second. 0 disables rate limiting.
    #[arg(long, env = "RATE_LIMIT_PER_SECOND", default_value = "10")]
    pub rate_limit_per_second: u32,

    /// Maximum size of an upload request body in megabytes.
    #[arg(long, env = "MAX_UPLOAD_MB", default_value = "10")]
    pub max_upload_mb: usize,
}

impl Args {
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let args = Args::parse_from([
            "chat-relay",
            "--cors-origins",
            " https://a.example , http://localhost:3000,,",
        ]);
        assert_eq!(args.cors_origin_list(), vec!["https://a.example", "http://localhost:3000"]);
    }

    #[test]
    fn server_addr_joins_host_and_port() {
        let args = Args::parse_from(["chat-relay", "--host", "127.0.0.1", "--port", "9000"]);
        assert_eq!(args.server_addr(), "127.0.0.1:9000");
    }
}
