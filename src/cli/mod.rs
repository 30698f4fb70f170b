use clap::{ Parser, Subcommand };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the conversational proxy HTTP server.
    Serve(Args),
    /// Chat with a running proxy from the terminal.
    Chat(ChatArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:3000")]
    pub server_addr: String,

    // --- Chat LLM Provider Args ---
    /// API Key for the OpenAI-compatible provider. Requests fail with a 500 while unset.
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// Primary model identifier. On a 403/404 the fixed fallback model is tried once.
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4.1-mini")]
    pub openai_model: String,

    /// Sampling temperature sent with every completion request.
    #[arg(long, env = "OPENAI_TEMP", default_value = "0.8")]
    pub openai_temp: f32,

    /// Base URL of the provider API (routes such as /v1/chat/completions are appended).
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com")]
    pub openai_base_url: String,

    /// Provider API shape (chat, responses)
    #[arg(long, env = "PROVIDER_SHAPE", default_value = "chat")]
    pub provider_shape: String,

    /// Maximum output size requested from the provider.
    #[arg(long, env = "MAX_OUTPUT_TOKENS", default_value = "800")]
    pub max_output_tokens: u32,

    /// Timeout in seconds for a single provider call.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    /// System prompt policy prepended to every provider call (counseling)
    #[arg(long, env = "PROMPT_POLICY", default_value = "counseling")]
    pub prompt_policy: String,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,

    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    /// Serve HTTPS using --tls-cert-path and --tls-key-path.
    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ChatArgs {
    /// Base URL of the proxy server.
    #[arg(long, env = "PROXY_URL", default_value = "http://127.0.0.1:3000")]
    pub proxy_url: String,

    /// Pause between successive reply bubbles, in milliseconds.
    #[arg(long, env = "BUBBLE_DELAY_MS", default_value = "350")]
    pub bubble_delay_ms: u64,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

impl Command {
    pub fn debug(&self) -> bool {
        match self {
            Command::Serve(args) => args.debug,
            Command::Chat(args) => args.debug,
        }
    }
}
