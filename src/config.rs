// Application configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;

/// Path the Bot API posts updates to.
pub const WEBHOOK_PATH: &str = "/webhook";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bot API token. Without it nothing is sent and the webhook is not registered.
    pub bot_token: Option<String>,
    /// Public base URL of this service, without trailing slash.
    pub public_url: Option<String>,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Root of the locally synchronized photo storage.
    pub media_root: PathBuf,
    /// Shared password for the upload flow. Unset disables uploads.
    pub upload_password: Option<String>,
    /// Generated group data file for the AI quiz.
    pub ai_groups_file: PathBuf,
    /// Fixed RNG seed for reproducible rounds.
    pub quiz_seed: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `TELEGRAM_BOT_TOKEN` - Bot API token
    /// - `PUBLIC_URL` - Public base URL (fallback: `RENDER_EXTERNAL_URL`)
    /// - `PORT` - HTTP server port (default: 8000)
    /// - `DROPBOX_ROOT` - Photo storage root (default: `./dropbox_sync`)
    /// - `UPLOAD_PASSWORD` - Password for the upload flow
    /// - `AI_GROUPS_FILE` - Generated group data (default: `top50_groups.json`)
    /// - `QUIZ_SEED` - Optional RNG seed
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_lookup(&args, |key| std::env::var(key).ok())
    }

    /// Build a config from CLI args and an environment lookup.
    pub fn from_lookup(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = non_empty("TELEGRAM_BOT_TOKEN");

        let public_url = non_empty("PUBLIC_URL")
            .or_else(|| non_empty("RENDER_EXTERNAL_URL"))
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| env("PORT").and_then(|v| v.parse().ok()))
            .unwrap_or(8000);

        let media_root = non_empty("DROPBOX_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./dropbox_sync"));

        let upload_password = non_empty("UPLOAD_PASSWORD");

        let ai_groups_file = non_empty("AI_GROUPS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("top50_groups.json"));

        let quiz_seed = env("QUIZ_SEED").and_then(|v| v.trim().parse().ok());

        Config {
            bot_token,
            public_url,
            port,
            media_root,
            upload_password,
            ai_groups_file,
            quiz_seed,
        }
    }

    /// Full webhook URL, when a public URL is configured.
    pub fn webhook_url(&self) -> Option<String> {
        self.public_url
            .as_ref()
            .map(|base| format!("{base}{WEBHOOK_PATH}"))
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}
