// Commands, typed answers and uploaded photos.

use std::path::Path;
use std::sync::Arc;

use super::{keyboards, texts, Dispatcher, Origin};
use crate::engine::mask::compute_mask;
use crate::engine::{Mode, Session};
use crate::media::library::MAX_UPLOAD_BYTES;
use crate::media::MediaError;
use crate::metrics;
use crate::telegram::types::{Message, PhotoSize};
use crate::telegram::Reply;

impl Dispatcher {
    pub(super) async fn on_message(&self, message: Message) {
        let origin = Origin {
            chat_id: message.chat.id,
            user_id: message.from.as_ref().map_or(message.chat.id, |u| u.id),
            message_id: None,
        };

        let mut guard = self.sessions.lock(origin.user_id).await;
        let session: &mut Session = &mut guard;

        if message.is_start_command() {
            metrics::UPDATES_TOTAL.with_label_values(&["start"]).inc();
            tracing::info!(user_id = origin.user_id, "Start");
            session.reset();
            self.send_menu(origin, texts::WELCOME).await;
        } else if let Some(text) = message.text.as_deref() {
            metrics::UPDATES_TOTAL.with_label_values(&["text"]).inc();
            self.on_text(session, origin, text.trim()).await;
        } else if let Some(photo) = message.largest_photo() {
            metrics::UPDATES_TOTAL.with_label_values(&["photo"]).inc();
            self.on_photo(session, origin, photo).await;
        } else {
            metrics::UPDATES_TOTAL.with_label_values(&["other"]).inc();
            self.text_only(origin).await;
        }
    }

    async fn text_only(&self, origin: Origin) {
        self.reply(
            origin,
            Reply::text(texts::TEXT_ONLY).with_keyboard(keyboards::menu()),
        )
        .await;
    }

    async fn on_text(&self, session: &mut Session, origin: Origin, text: &str) {
        let mode = session.mode();
        tracing::debug!(user_id = origin.user_id, %mode, "Text");
        match mode {
            Mode::UploadPassword => self.check_password(session, origin, text).await,
            Mode::Find => self.find_member(origin, text).await,
            Mode::Quiz | Mode::QuizAi => self.answer_quiz(session, origin, text).await,
            Mode::PhotoQuiz => self.answer_photo(session, origin, text).await,
            Mode::LearnTrain => self.answer_learn(session, origin, text).await,
            _ => {
                self.reply(origin, Reply::text(texts::MENU).with_keyboard(keyboards::menu()))
                    .await
            }
        }
    }

    async fn check_password(&self, session: &mut Session, origin: Origin, text: &str) {
        if self.gate.check(text) && session.unlock_upload() {
            tracing::info!(user_id = origin.user_id, "Upload unlocked");
            let keyboard = keyboards::upload_groups(&self.media.upload_groups(), &self.catalog);
            self.reply(origin, Reply::text(texts::CHOOSE_GROUP).with_keyboard(keyboard))
                .await;
        } else {
            tracing::warn!(user_id = origin.user_id, "Wrong upload password");
            self.reply(
                origin,
                Reply::text(texts::WRONG_PASSWORD).with_keyboard(keyboards::back()),
            )
            .await;
        }
    }

    async fn find_member(&self, origin: Origin, text: &str) {
        let reply = match self.catalog.find_member(text) {
            Some((member, group)) => {
                Reply::markdown(texts::member_found(&member, &group.display_name))
            }
            None => Reply::text(texts::MEMBER_NOT_FOUND),
        };
        self.reply(origin, reply.with_keyboard(keyboards::back()))
            .await;
    }

    async fn answer_quiz(&self, session: &mut Session, origin: Origin, text: &str) {
        let mode = session.mode();
        let Some(round) = session.quiz_mut() else {
            return;
        };

        let Some(outcome) = round.submit_answer(text) else {
            // No question outstanding: ask one, or close a finished round.
            match round.next_question() {
                Some(member) => {
                    self.reply(
                        origin,
                        Reply::text(texts::question(&member)).with_keyboard(keyboards::in_game()),
                    )
                    .await
                }
                None => {
                    let finish = texts::finish(round.score(), round.total());
                    session.reset();
                    self.reply(origin, Reply::text(finish).with_keyboard(keyboards::back()))
                        .await;
                }
            }
            return;
        };

        metrics::ANSWERS_TOTAL
            .with_label_values(&[mode.as_str(), metrics::result_label(outcome.correct)])
            .inc();
        let feedback = if outcome.correct {
            texts::CORRECT
        } else {
            texts::WRONG
        };
        let stats = texts::progress(round.score(), round.total(), round.remaining());

        match round.next_question() {
            Some(member) => {
                self.reply(
                    origin,
                    Reply::text(texts::next_question(feedback, &stats, &member))
                        .with_keyboard(keyboards::in_game()),
                )
                .await;
            }
            None => {
                let text = format!(
                    "{feedback}\n{stats}\n\n{}",
                    texts::finish(round.score(), round.total())
                );
                metrics::ROUNDS_COMPLETED_TOTAL
                    .with_label_values(&[mode.as_str()])
                    .inc();
                tracing::info!(
                    user_id = origin.user_id,
                    %mode,
                    score = round.score(),
                    total = round.total(),
                    "Quiz finished"
                );
                session.reset();
                self.reply(origin, Reply::text(text).with_keyboard(keyboards::back()))
                    .await;
            }
        }
    }

    async fn answer_photo(&self, session: &mut Session, origin: Origin, text: &str) {
        let Some(round) = session.photo_quiz_mut() else {
            return;
        };

        let Some(outcome) = round.submit_answer(text) else {
            let finish = texts::finish(round.score(), round.total());
            match round.next_photo() {
                Some(card) => {
                    self.reply_photo(origin, &card.image, texts::WHO_IS_THIS, keyboards::in_game())
                        .await
                }
                None => {
                    session.reset();
                    self.reply(origin, Reply::text(finish).with_keyboard(keyboards::back()))
                        .await;
                }
            }
            return;
        };

        metrics::ANSWERS_TOTAL
            .with_label_values(&[Mode::PhotoQuiz.as_str(), metrics::result_label(outcome.correct)])
            .inc();
        let feedback = if outcome.correct {
            texts::CORRECT.to_string()
        } else {
            texts::wrong_photo(&outcome.expected)
        };
        let stats = texts::progress(round.score(), round.total(), round.remaining());
        let finish = texts::finish(round.score(), round.total());

        match round.next_photo() {
            Some(card) => {
                self.reply(
                    origin,
                    Reply::text(format!("{feedback}\n{stats}\n\n{}", texts::NEXT_QUESTION))
                        .with_keyboard(keyboards::in_game()),
                )
                .await;
                self.reply_photo(origin, &card.image, texts::WHO_IS_THIS, keyboards::in_game())
                    .await;
            }
            None => {
                metrics::ROUNDS_COMPLETED_TOTAL
                    .with_label_values(&[Mode::PhotoQuiz.as_str()])
                    .inc();
                tracing::info!(user_id = origin.user_id, "Photo quiz finished");
                session.reset();
                self.reply(
                    origin,
                    Reply::text(format!("{feedback}\n{stats}\n\n{finish}"))
                        .with_keyboard(keyboards::back()),
                )
                .await;
            }
        }
    }

    async fn answer_learn(&self, session: &mut Session, origin: Origin, text: &str) {
        let Some(learn) = session.learn_mut() else {
            return;
        };
        let key = learn.group_key().to_string();
        let title = self.catalog.display_name(&key).to_string();
        let roster = learn.roster().to_vec();
        let mut rng = self.fork_rng();

        let feedback = match learn.submit_answer(text) {
            Some(outcome) => {
                metrics::ANSWERS_TOTAL
                    .with_label_values(&[
                        Mode::LearnTrain.as_str(),
                        metrics::result_label(outcome.correct),
                    ])
                    .inc();
                Some(if outcome.correct {
                    texts::LEARN_CORRECT.to_string()
                } else {
                    texts::learn_wrong(&outcome.expected)
                })
            }
            None => None,
        };

        match learn.pick_next_to_guess(&mut rng) {
            Some(next) => {
                let mask = compute_mask(&next, &roster, &mut rng);
                let text = match &feedback {
                    Some(feedback) => texts::learn_next(feedback, &title, &mask),
                    None => texts::learn_prompt(&title, &mask),
                };
                self.reply(
                    origin,
                    Reply::html(text).with_keyboard(keyboards::learn_in_session()),
                )
                .await;
            }
            None => {
                metrics::ROUNDS_COMPLETED_TOTAL
                    .with_label_values(&[Mode::LearnTrain.as_str()])
                    .inc();
                tracing::info!(user_id = origin.user_id, group = %key, "Group learned");
                session.reset();
                let done = texts::learned_all(&title);
                let text = match feedback {
                    Some(feedback) => format!("{feedback}\n\n{done}"),
                    None => done,
                };
                self.reply(origin, Reply::text(text).with_keyboard(keyboards::learn_done()))
                    .await;
            }
        }
    }

    async fn on_photo(&self, session: &mut Session, origin: Origin, photo: &PhotoSize) {
        let Some((group_key, member)) = session
            .upload_target()
            .map(|(g, m)| (g.to_string(), m.to_string()))
        else {
            self.text_only(origin).await;
            return;
        };

        if let Err(e) = self.limiter.check_limit(origin.user_id) {
            metrics::UPLOADS_TOTAL.with_label_values(&["limited"]).inc();
            tracing::info!(user_id = origin.user_id, "{e}");
            session.reset();
            self.reply(
                origin,
                Reply::text(texts::upload_limit(e.max)).with_keyboard(keyboards::back()),
            )
            .await;
            return;
        }

        if photo
            .file_size
            .is_some_and(|size| size > MAX_UPLOAD_BYTES as u64)
        {
            self.reject_too_large(origin).await;
            return;
        }

        let file = match self.transport.download_file(&photo.file_id).await {
            Ok(file) => file,
            Err(e) => {
                metrics::UPLOADS_TOTAL.with_label_values(&["failed"]).inc();
                tracing::warn!(user_id = origin.user_id, "Failed to download photo: {e}");
                self.reply(
                    origin,
                    Reply::text(texts::SAVE_FAILED).with_keyboard(keyboards::back()),
                )
                .await;
                return;
            }
        };
        if file.bytes.len() > MAX_UPLOAD_BYTES {
            self.reject_too_large(origin).await;
            return;
        }

        let extension = file
            .path
            .as_deref()
            .and_then(|p| Path::new(p).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let media = Arc::clone(&self.media);
        let (group, name) = (group_key.clone(), member.clone());
        let stored = tokio::task::spawn_blocking(move || {
            media.store_image(&group, &name, &file.bytes, &extension)
        })
        .await;

        let (outcome, reply) = match stored {
            Ok(Ok(path)) => {
                self.limiter.register_upload(origin.user_id);
                tracing::info!(
                    user_id = origin.user_id,
                    group = %group_key,
                    member = %member,
                    path = %path.display(),
                    "Photo uploaded"
                );
                (
                    "stored",
                    Reply::text(texts::UPLOADED).with_keyboard(keyboards::upload_success()),
                )
            }
            Ok(Err(MediaError::Duplicate)) => (
                "duplicate",
                Reply::text(texts::DUPLICATE_PHOTO).with_keyboard(keyboards::back()),
            ),
            Ok(Err(e)) => {
                tracing::error!(group = %group_key, member = %member, "Failed to store photo: {e}");
                (
                    "failed",
                    Reply::text(texts::SAVE_FAILED).with_keyboard(keyboards::back()),
                )
            }
            Err(e) => {
                tracing::error!("Photo store task failed: {e}");
                (
                    "failed",
                    Reply::text(texts::SAVE_FAILED).with_keyboard(keyboards::back()),
                )
            }
        };
        metrics::UPLOADS_TOTAL.with_label_values(&[outcome]).inc();
        self.reply(origin, reply).await;
    }

    async fn reject_too_large(&self, origin: Origin) {
        metrics::UPLOADS_TOTAL.with_label_values(&["too_large"]).inc();
        self.reply(
            origin,
            Reply::text(texts::too_large()).with_keyboard(keyboards::back()),
        )
        .await;
    }
}
