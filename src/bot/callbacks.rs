// Button presses.

use super::callback::Callback;
use super::{keyboards, texts, Dispatcher, Origin};
use crate::engine::mask::compute_mask;
use crate::engine::session::CatalogCard;
use crate::engine::{CatalogScope, QuizKind, Session, UploadStep, PHOTO_GAME_QUESTIONS};
use crate::metrics;
use crate::telegram::types::CallbackQuery;
use crate::telegram::Reply;

impl Dispatcher {
    pub(super) async fn on_callback(&self, query: CallbackQuery) {
        metrics::UPDATES_TOTAL.with_label_values(&["callback"]).inc();
        if let Err(e) = self.transport.answer_callback(&query.id).await {
            tracing::debug!("Failed to answer callback: {e}");
        }

        let data = query.data.as_deref().unwrap_or_default();
        let Some(callback) = Callback::parse(data) else {
            tracing::debug!(data, "Ignoring unknown callback");
            return;
        };

        let origin = Origin {
            chat_id: query
                .message
                .as_ref()
                .map_or(query.from.id, |m| m.chat.id),
            user_id: query.from.id,
            message_id: query.message.as_ref().map(|m| m.message_id),
        };

        let mut guard = self.sessions.lock(origin.user_id).await;
        let session: &mut Session = &mut guard;
        tracing::debug!(user_id = origin.user_id, mode = %session.mode(), ?callback, "Callback");

        match callback {
            Callback::MenuBack => {
                session.reset();
                self.clear_keyboard(origin).await;
                self.send_menu(origin, texts::MENU).await;
            }
            Callback::Play => self.launch_quiz(session, origin, QuizKind::Basic).await,
            Callback::AiPlay => self.launch_quiz(session, origin, QuizKind::Ai).await,
            Callback::PhotoQuiz => self.launch_photo_quiz(session, origin).await,
            Callback::ShowAll => {
                self.clear_keyboard(origin).await;
                let text = texts::all_groups(self.catalog.all());
                self.reply(origin, Reply::markdown(text).with_keyboard(keyboards::back()))
                    .await;
            }
            Callback::FindMember => {
                session.enter_find();
                self.clear_keyboard(origin).await;
                self.reply(
                    origin,
                    Reply::text(texts::FIND_PROMPT).with_keyboard(keyboards::back()),
                )
                .await;
            }
            Callback::LearnMenu => {
                session.enter_learn_menu();
                self.clear_keyboard(origin).await;
                self.reply(
                    origin,
                    Reply::text(texts::LEARN_PICK)
                        .with_keyboard(keyboards::learn_groups(self.catalog.all())),
                )
                .await;
            }
            Callback::LearnPick(key) => self.show_roster(origin, &key).await,
            Callback::LearnTrain(key) => self.start_training(session, origin, &key).await,
            Callback::LearnExit => {
                session.reset();
                self.edit(origin, Reply::text(texts::MENU).with_keyboard(keyboards::menu()))
                    .await;
            }
            Callback::CatalogMenu => {
                session.reset();
                self.clear_keyboard(origin).await;
                self.reply(
                    origin,
                    Reply::text(texts::CATALOG_MENU).with_keyboard(keyboards::catalog_menu()),
                )
                .await;
            }
            Callback::CatalogByGroup => {
                let keyboard = keyboards::catalog_groups(self.catalog.all(), self.media.as_ref());
                self.edit(origin, Reply::text(texts::CHOOSE_GROUP).with_keyboard(keyboard))
                    .await;
            }
            Callback::CatalogPick(key) => {
                self.start_catalog(session, origin, CatalogScope::Group(key))
                    .await
            }
            Callback::CatalogRandom => {
                self.start_catalog(session, origin, CatalogScope::Random)
                    .await
            }
            Callback::CatalogNext => self.next_catalog_photo(session, origin).await,
            Callback::UploadMenu => self.begin_upload(session, origin).await,
            Callback::UploadGroup(key) => self.pick_upload_group(session, origin, &key).await,
            Callback::UploadMember(member) => {
                let reply = if session.choose_upload_member(&member) {
                    texts::send_photo_for(&member)
                } else {
                    texts::NO_UPLOAD_TARGET.to_string()
                };
                self.reply(origin, Reply::text(reply).with_keyboard(keyboards::back()))
                    .await;
            }
            Callback::UploadMore => {
                let reply = match session.upload_target() {
                    Some((_, member)) => texts::send_photo_for(member),
                    None => texts::NO_MEMBER_SELECTED.to_string(),
                };
                self.reply(origin, Reply::text(reply).with_keyboard(keyboards::back()))
                    .await;
            }
        }
    }

    async fn launch_quiz(&self, session: &mut Session, origin: Origin, kind: QuizKind) {
        self.clear_keyboard(origin).await;
        let groups = match kind {
            QuizKind::Basic => self.catalog.builtin(),
            QuizKind::Ai => self.catalog.ai(),
        };
        let mut rng = self.fork_rng();
        if !session.start_quiz(kind, groups, &mut rng) {
            let text = match kind {
                QuizKind::Ai => texts::AI_UNAVAILABLE,
                QuizKind::Basic => texts::DATA_UNAVAILABLE,
            };
            self.reply(origin, Reply::text(text).with_keyboard(keyboards::back()))
                .await;
            return;
        }

        let mode = session.mode();
        metrics::ROUNDS_STARTED_TOTAL
            .with_label_values(&[mode.as_str()])
            .inc();
        tracing::info!(user_id = origin.user_id, %mode, "Quiz started");

        let Some(member) = session.quiz_mut().and_then(|round| round.next_question()) else {
            return;
        };
        if kind == QuizKind::Ai {
            self.reply(
                origin,
                Reply::text(texts::AI_INTRO).with_keyboard(keyboards::in_game()),
            )
            .await;
        }
        self.reply(
            origin,
            Reply::text(texts::question(&member)).with_keyboard(keyboards::in_game()),
        )
        .await;
    }

    async fn launch_photo_quiz(&self, session: &mut Session, origin: Origin) {
        self.clear_keyboard(origin).await;
        let mut rng = self.fork_rng();
        let started = session.start_photo_quiz(
            self.media.as_ref(),
            self.catalog.all(),
            PHOTO_GAME_QUESTIONS,
            &mut rng,
        );
        if !started {
            self.reply(
                origin,
                Reply::text(texts::PHOTOS_UNAVAILABLE).with_keyboard(keyboards::back()),
            )
            .await;
            return;
        }

        metrics::ROUNDS_STARTED_TOTAL
            .with_label_values(&[session.mode().as_str()])
            .inc();
        tracing::info!(user_id = origin.user_id, "Photo quiz started");

        self.reply(
            origin,
            Reply::text(texts::PHOTO_INTRO).with_keyboard(keyboards::in_game()),
        )
        .await;
        if let Some(card) = session.photo_quiz_mut().and_then(|round| round.next_photo()) {
            self.reply_photo(origin, &card.image, texts::WHO_IS_THIS, keyboards::in_game())
                .await;
        }
    }

    async fn show_roster(&self, origin: Origin, key: &str) {
        let reply = match self.catalog.group(key) {
            Some(group) => {
                Reply::text(texts::roster(group)).with_keyboard(keyboards::learn_after_list(key))
            }
            None => Reply::text(texts::GROUP_NOT_FOUND)
                .with_keyboard(keyboards::learn_groups(self.catalog.all())),
        };
        self.edit(origin, reply).await;
    }

    async fn start_training(&self, session: &mut Session, origin: Origin, key: &str) {
        let Some(group) = self.catalog.group(key) else {
            self.show_roster(origin, key).await;
            return;
        };

        let mut rng = self.fork_rng();
        session.start_learn_session(group, &mut rng);
        metrics::ROUNDS_STARTED_TOTAL
            .with_label_values(&[session.mode().as_str()])
            .inc();
        tracing::info!(user_id = origin.user_id, group = key, "Learning session started");

        let next = session
            .learn_mut()
            .and_then(|learn| learn.pick_next_to_guess(&mut rng));
        let reply = match next {
            Some(member) => {
                let mask = compute_mask(&member, &group.members, &mut rng);
                Reply::html(texts::learn_prompt(&group.display_name, &mask))
                    .with_keyboard(keyboards::learn_in_session())
            }
            None => Reply::text(texts::ALREADY_KNOWN).with_keyboard(keyboards::learn_done()),
        };
        self.edit(origin, reply).await;
    }

    async fn start_catalog(&self, session: &mut Session, origin: Origin, scope: CatalogScope) {
        let (header, empty) = match &scope {
            CatalogScope::Group(key) => (
                texts::catalog_group_header(self.catalog.display_name(key)),
                texts::NO_GROUP_PHOTOS,
            ),
            CatalogScope::Random => (texts::RANDOM_HEADER.to_string(), texts::NO_PHOTOS),
        };

        let mut rng = self.fork_rng();
        if !session.start_catalog(self.media.as_ref(), self.catalog.all(), scope, &mut rng) {
            self.edit(origin, Reply::text(empty).with_keyboard(keyboards::catalog_menu()))
                .await;
            return;
        }
        metrics::ROUNDS_STARTED_TOTAL
            .with_label_values(&[session.mode().as_str()])
            .inc();

        self.edit(origin, Reply::text(header).with_keyboard(keyboards::catalog_nav()))
            .await;
        self.next_catalog_photo_inner(session, origin).await;
    }

    async fn next_catalog_photo(&self, session: &mut Session, origin: Origin) {
        self.clear_keyboard(origin).await;
        if !self.next_catalog_photo_inner(session, origin).await {
            self.reply(
                origin,
                Reply::text(texts::NO_MORE_PHOTOS).with_keyboard(keyboards::catalog_menu()),
            )
            .await;
        }
    }

    /// Send the next catalog photo. Returns false when there is none.
    async fn next_catalog_photo_inner(&self, session: &mut Session, origin: Origin) -> bool {
        let Some(browse) = session.catalog_mut() else {
            return false;
        };
        let by_group = matches!(browse.scope(), CatalogScope::Group(_));
        let Some(card) = browse.next_card() else {
            return false;
        };
        let caption = self.catalog_caption(card, by_group);
        self.reply_photo(origin, &card.image, &caption, keyboards::catalog_nav())
            .await;
        true
    }

    fn catalog_caption(&self, card: &CatalogCard, by_group: bool) -> String {
        if by_group {
            card.name.clone()
        } else {
            texts::catalog_random_caption(&card.name, self.catalog.display_name(&card.group_key))
        }
    }

    async fn begin_upload(&self, session: &mut Session, origin: Origin) {
        if !self.gate.is_enabled() {
            self.reply(
                origin,
                Reply::text(texts::UPLOADS_DISABLED).with_keyboard(keyboards::back()),
            )
            .await;
            return;
        }
        session.begin_upload();
        self.reply(
            origin,
            Reply::text(texts::UPLOAD_PASSWORD).with_keyboard(keyboards::back()),
        )
        .await;
    }

    async fn pick_upload_group(&self, session: &mut Session, origin: Origin, key: &str) {
        let unlocked = matches!(
            &*session,
            Session::Upload(step) if *step != UploadStep::Password
        );
        if !unlocked {
            self.begin_upload(session, origin).await;
            return;
        }

        let Some(group) = self.catalog.group(key) else {
            let keyboard = keyboards::upload_groups(&self.media.upload_groups(), &self.catalog);
            self.reply(origin, Reply::text(texts::GROUP_NOT_FOUND).with_keyboard(keyboard))
                .await;
            return;
        };

        session.choose_upload_group(key);
        self.reply(
            origin,
            Reply::text(texts::choose_member(&group.display_name))
                .with_keyboard(keyboards::upload_members(&group.members)),
        )
        .await;
    }
}
