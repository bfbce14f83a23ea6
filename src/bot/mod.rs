// Conversation dispatcher: turns inbound updates into engine operations and replies.

mod callback;
mod callbacks;
pub mod keyboards;
mod messages;
pub mod texts;

use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub use callback::Callback;

use crate::auth::UploadGate;
use crate::catalog::GroupCatalog;
use crate::engine::SessionStore;
use crate::media::MediaStore;
use crate::metrics;
use crate::rate_limit::UploadLimiter;
use crate::telegram::{InlineKeyboardMarkup, Reply, Transport, Update};

/// Where an inbound event came from and where replies go.
#[derive(Debug, Clone, Copy)]
struct Origin {
    chat_id: i64,
    user_id: i64,
    /// Message the event refers to (the one carrying the pressed button).
    message_id: Option<i64>,
}

/// Routes every update to the right game operation for that user.
pub struct Dispatcher {
    catalog: Arc<GroupCatalog>,
    media: Arc<dyn MediaStore>,
    transport: Arc<dyn Transport>,
    sessions: SessionStore,
    limiter: UploadLimiter,
    gate: UploadGate,
    rng: Mutex<StdRng>,
}

impl Dispatcher {
    pub fn new(
        catalog: Arc<GroupCatalog>,
        media: Arc<dyn MediaStore>,
        transport: Arc<dyn Transport>,
        gate: UploadGate,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            catalog,
            media,
            transport,
            sessions: SessionStore::new(),
            limiter: UploadLimiter::new(),
            gate,
            rng: Mutex::new(rng),
        }
    }

    pub fn with_upload_limiter(mut self, limiter: UploadLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn catalog(&self) -> &GroupCatalog {
        &self.catalog
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Handle one update to completion. Transport failures are logged, never returned.
    pub async fn handle_update(&self, update: Update) {
        if let Some(query) = update.callback_query {
            self.on_callback(query).await;
        } else if let Some(message) = update.message {
            self.on_message(message).await;
        } else {
            metrics::UPDATES_TOTAL.with_label_values(&["other"]).inc();
            tracing::debug!(update_id = update.update_id, "Ignoring update without message");
        }
    }

    /// Independent generator for one event, drawn from the shared one.
    fn fork_rng(&self) -> StdRng {
        let mut shared = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        StdRng::seed_from_u64(shared.gen())
    }

    // ── Outbound helpers ────────────────────────────────────────────

    async fn reply(&self, origin: Origin, reply: Reply) {
        if let Err(e) = self.transport.send_text(origin.chat_id, &reply).await {
            tracing::warn!(chat_id = origin.chat_id, "Failed to send message: {e}");
        }
    }

    async fn reply_photo(
        &self,
        origin: Origin,
        photo: &[u8],
        caption: &str,
        keyboard: InlineKeyboardMarkup,
    ) {
        if let Err(e) = self
            .transport
            .send_photo(origin.chat_id, photo, Some(caption), Some(&keyboard))
            .await
        {
            tracing::warn!(chat_id = origin.chat_id, "Failed to send photo: {e}");
        }
    }

    /// Rewrite the message the button belonged to, or send a new one if that fails.
    async fn edit(&self, origin: Origin, reply: Reply) {
        if let Some(message_id) = origin.message_id {
            match self
                .transport
                .edit_text(origin.chat_id, message_id, &reply)
                .await
            {
                Ok(()) => return,
                Err(e) => tracing::debug!(chat_id = origin.chat_id, "Edit failed, sending instead: {e}"),
            }
        }
        self.reply(origin, reply).await;
    }

    async fn clear_keyboard(&self, origin: Origin) {
        let Some(message_id) = origin.message_id else {
            return;
        };
        if let Err(e) = self
            .transport
            .clear_keyboard(origin.chat_id, message_id)
            .await
        {
            tracing::debug!(chat_id = origin.chat_id, "Failed to clear keyboard: {e}");
        }
    }

    /// Main menu under the cover image, or as plain text when there is none.
    async fn send_menu(&self, origin: Origin, caption: &str) {
        match self.media.cover_image() {
            Some(cover) => {
                self.reply_photo(origin, &cover, caption, keyboards::menu())
                    .await
            }
            None => {
                self.reply(origin, Reply::text(caption).with_keyboard(keyboards::menu()))
                    .await
            }
        }
    }
}
