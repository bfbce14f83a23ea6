use std::sync::Arc;

use kpop_quiz_bot::api::{self, AppState};
use kpop_quiz_bot::auth::UploadGate;
use kpop_quiz_bot::bot::Dispatcher;
use kpop_quiz_bot::catalog::GroupCatalog;
use kpop_quiz_bot::config::Config;
use kpop_quiz_bot::media::{MediaStore, PhotoLibrary};
use kpop_quiz_bot::metrics;
use kpop_quiz_bot::telegram::{TelegramClient, Transport};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    metrics::register_metrics();

    let config = Config::load();

    let catalog = Arc::new(GroupCatalog::load(&config.ai_groups_file));
    let media: Arc<dyn MediaStore> = Arc::new(PhotoLibrary::open(config.media_root.clone()));

    let token = config.bot_token.clone().unwrap_or_else(|| {
        tracing::warn!("TELEGRAM_BOT_TOKEN is not set; replies will fail");
        String::new()
    });
    let transport: Arc<dyn Transport> =
        Arc::new(TelegramClient::new(token).expect("Failed to build HTTP client"));

    let gate = UploadGate::new(config.upload_password.as_deref());
    if !gate.is_enabled() {
        tracing::info!("UPLOAD_PASSWORD is not set; photo uploads are disabled");
    }

    let dispatcher = Arc::new(Dispatcher::new(
        catalog,
        media,
        transport.clone(),
        gate,
        config.quiz_seed,
    ));

    match (&config.bot_token, config.webhook_url()) {
        (Some(_), Some(url)) => match transport.set_webhook(&url).await {
            Ok(ok) => tracing::info!(url = %url, ok, "Webhook registered"),
            Err(e) => tracing::warn!(url = %url, "Failed to register webhook: {e}"),
        },
        _ => tracing::warn!("Webhook not registered: TELEGRAM_BOT_TOKEN and PUBLIC_URL are required"),
    }

    let app = api::router(AppState::new(dispatcher, config.webhook_url()));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to port {}: {e}", config.port));

    tracing::info!("K-pop quiz bot listening on port {}", config.port);
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
