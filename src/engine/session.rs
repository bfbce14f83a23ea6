// Per-user session state machine: quiz rounds, photo rounds, learning mode,
// catalog browsing and the upload sub-flow.
//
// Every mode is a variant of `Session` carrying only the data that mode needs.
// Randomness is always passed in so callers decide between entropy and a seed.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use rand::seq::{index, SliceRandom};
use rand::Rng;

use crate::catalog::{alias_lookup, member_groups, norm_group_key, Group};
use crate::media::MediaStore;

/// Questions per group quiz round (fewer when the pool is smaller).
pub const QUIZ_QUESTIONS: usize = 10;
/// Photos per photo quiz round.
pub const PHOTO_GAME_QUESTIONS: usize = 20;

/// Which data set a group quiz draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizKind {
    Basic,
    Ai,
}

/// Flat view of the active mode, for logging and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Idle,
    Find,
    Quiz,
    QuizAi,
    PhotoQuiz,
    LearnMenu,
    LearnTrain,
    Catalog,
    UploadPassword,
    UploadGroup,
    UploadMember,
    UploadWaitPhoto,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Find => "find",
            Mode::Quiz => "quiz",
            Mode::QuizAi => "quiz_ai",
            Mode::PhotoQuiz => "photo_quiz",
            Mode::LearnMenu => "learn_menu",
            Mode::LearnTrain => "learn_train",
            Mode::Catalog => "catalog",
            Mode::UploadPassword => "upload_password",
            Mode::UploadGroup => "upload_group",
            Mode::UploadMember => "upload_member",
            Mode::UploadWaitPhoto => "upload_wait_photo",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Group quiz ───────────────────────────────────────────────────────

/// Result of answering a group quiz question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub finished: bool,
}

/// One "which group is this member in" round.
#[derive(Debug, Clone)]
pub struct QuizRound {
    kind: QuizKind,
    members: Vec<String>,
    index: usize,
    score: usize,
    current: Option<String>,
    total: usize,
    /// Accepted answer spelling -> group key.
    aliases: HashMap<String, String>,
    /// Lowercased member -> every group key containing that name.
    member_groups: HashMap<String, HashSet<String>>,
}

impl QuizRound {
    pub fn kind(&self) -> QuizKind {
        self.kind
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.index)
    }

    /// The member currently being asked about, if a question is outstanding.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Member for the question at the cursor, or `None` once the round is over.
    ///
    /// Does not move the cursor, so repeated calls return the same member.
    pub fn next_question(&mut self) -> Option<String> {
        if self.index >= self.total {
            return None;
        }
        let member = self.members.get(self.index)?.clone();
        self.current = Some(member.clone());
        Some(member)
    }

    /// Score an answer to the outstanding question and move the cursor on.
    ///
    /// The answer is accepted when it names any group containing the member, which
    /// matters when the same name appears in several groups. Returns `None` without
    /// changing anything when no question is outstanding.
    pub fn submit_answer(&mut self, raw: &str) -> Option<AnswerOutcome> {
        let member = self.current.take()?;
        let answer = norm_group_key(raw);
        let correct = self.aliases.get(&answer).is_some_and(|key| {
            self.member_groups
                .get(&member.to_lowercase())
                .is_some_and(|groups| groups.contains(key))
        });
        if correct {
            self.score += 1;
        }
        self.index += 1;
        Some(AnswerOutcome {
            correct,
            finished: self.index >= self.total,
        })
    }
}

// ── Photo quiz ───────────────────────────────────────────────────────

/// A photo paired with the member it shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoCard {
    pub image: Vec<u8>,
    pub name: String,
}

/// Result of naming the member on a photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoOutcome {
    pub correct: bool,
    pub finished: bool,
    /// The member that was pictured.
    pub expected: String,
}

/// A "name the member on the photo" round.
#[derive(Debug, Clone)]
pub struct PhotoRound {
    cards: Vec<PhotoCard>,
    index: usize,
    score: usize,
    current: Option<usize>,
    total: usize,
}

impl PhotoRound {
    pub fn cards(&self) -> &[PhotoCard] {
        &self.cards
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.index)
    }

    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    /// Card at the cursor, or `None` once the round is over. Idempotent.
    pub fn next_photo(&mut self) -> Option<&PhotoCard> {
        if self.index >= self.total {
            return None;
        }
        let card = self.cards.get(self.index)?;
        self.current = Some(self.index);
        Some(card)
    }

    /// Compare the answer with the pictured member's name, ignoring case.
    pub fn submit_answer(&mut self, raw: &str) -> Option<PhotoOutcome> {
        let pos = self.current.take()?;
        let expected = self.cards.get(pos)?.name.clone();
        let correct = raw.trim().to_lowercase() == expected.to_lowercase();
        if correct {
            self.score += 1;
        }
        self.index += 1;
        Some(PhotoOutcome {
            correct,
            finished: self.index >= self.total,
            expected,
        })
    }
}

// ── Learning mode ────────────────────────────────────────────────────

/// Result of guessing a masked member name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnOutcome {
    pub correct: bool,
    pub expected: String,
}

/// Training on the members of a single group.
#[derive(Debug, Clone)]
pub struct LearnSession {
    group_key: String,
    roster: Vec<String>,
    /// Case-folded names already guessed correctly.
    known: HashSet<String>,
    current: Option<String>,
}

impl LearnSession {
    pub fn group_key(&self) -> &str {
        &self.group_key
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    pub fn known_count(&self) -> usize {
        self.known.len()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Draw a member not yet guessed correctly, or `None` when the group is learned.
    ///
    /// Draws again on every call; callers keep the returned name for the turn.
    pub fn pick_next_to_guess<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        let remaining: Vec<&String> = self
            .roster
            .iter()
            .filter(|m| !self.known.contains(&m.to_lowercase()))
            .collect();
        let member = remaining.choose(rng)?.to_string();
        self.current = Some(member.clone());
        Some(member)
    }

    /// Exact comparison with the current member, ignoring case.
    pub fn submit_answer(&mut self, raw: &str) -> Option<LearnOutcome> {
        let expected = self.current.take()?;
        let folded = expected.to_lowercase();
        let correct = raw.to_lowercase() == folded;
        if correct {
            self.known.insert(folded);
        }
        Some(LearnOutcome { correct, expected })
    }
}

// ── Photo catalog ────────────────────────────────────────────────────

/// Which photos a catalog browse covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogScope {
    Group(String),
    Random,
}

/// A photo shown while browsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCard {
    pub image: Vec<u8>,
    pub name: String,
    pub group_key: String,
}

/// Shuffled photo list with a cursor.
#[derive(Debug, Clone)]
pub struct CatalogBrowse {
    cards: Vec<CatalogCard>,
    cursor: usize,
    scope: CatalogScope,
}

impl CatalogBrowse {
    pub fn scope(&self) -> &CatalogScope {
        &self.scope
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Next photo, advancing the cursor. `None` after the last one.
    pub fn next_card(&mut self) -> Option<&CatalogCard> {
        let card = self.cards.get(self.cursor)?;
        self.cursor += 1;
        Some(card)
    }
}

// ── Upload flow ──────────────────────────────────────────────────────

/// Steps of the password-protected photo upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStep {
    Password,
    Group,
    Member { group_key: String },
    WaitPhoto { group_key: String, member: String },
}

// ── Session ──────────────────────────────────────────────────────────

/// Everything the bot remembers about one user's conversation.
#[derive(Debug, Clone, Default)]
pub enum Session {
    #[default]
    Idle,
    Find,
    Quiz(QuizRound),
    PhotoQuiz(PhotoRound),
    LearnMenu,
    LearnTrain(LearnSession),
    Catalog(CatalogBrowse),
    Upload(UploadStep),
}

impl Session {
    pub fn mode(&self) -> Mode {
        match self {
            Session::Idle => Mode::Idle,
            Session::Find => Mode::Find,
            Session::Quiz(round) => match round.kind {
                QuizKind::Basic => Mode::Quiz,
                QuizKind::Ai => Mode::QuizAi,
            },
            Session::PhotoQuiz(_) => Mode::PhotoQuiz,
            Session::LearnMenu => Mode::LearnMenu,
            Session::LearnTrain(_) => Mode::LearnTrain,
            Session::Catalog(_) => Mode::Catalog,
            Session::Upload(step) => match step {
                UploadStep::Password => Mode::UploadPassword,
                UploadStep::Group => Mode::UploadGroup,
                UploadStep::Member { .. } => Mode::UploadMember,
                UploadStep::WaitPhoto { .. } => Mode::UploadWaitPhoto,
            },
        }
    }

    /// Drop whatever is in progress and go back to the main menu state.
    pub fn reset(&mut self) {
        *self = Session::Idle;
    }

    pub fn enter_find(&mut self) {
        *self = Session::Find;
    }

    pub fn enter_learn_menu(&mut self) {
        *self = Session::LearnMenu;
    }

    /// Start a group quiz over `groups`.
    ///
    /// Samples up to [`QUIZ_QUESTIONS`] members without replacement. Returns `false`
    /// and leaves the session untouched when the groups hold no members.
    pub fn start_quiz<R: Rng + ?Sized>(
        &mut self,
        kind: QuizKind,
        groups: &[Group],
        rng: &mut R,
    ) -> bool {
        let pool: Vec<&String> = groups.iter().flat_map(|g| g.members.iter()).collect();
        if pool.is_empty() {
            return false;
        }
        let total = QUIZ_QUESTIONS.min(pool.len());
        let members: Vec<String> = index::sample(rng, pool.len(), total)
            .into_iter()
            .map(|i| pool[i].clone())
            .collect();

        *self = Session::Quiz(QuizRound {
            kind,
            members,
            index: 0,
            score: 0,
            current: None,
            total,
            aliases: alias_lookup(groups),
            member_groups: member_groups(groups),
        });
        true
    }

    /// Start a photo quiz with exactly `required` photos.
    ///
    /// Every stored photo of every distinct member is a candidate, so a member can
    /// come up as often as they have different photos. Returns `false` and leaves the
    /// session untouched when fewer than `required` candidates exist.
    pub fn start_photo_quiz<R: Rng + ?Sized>(
        &mut self,
        media: &dyn MediaStore,
        groups: &[Group],
        required: usize,
        rng: &mut R,
    ) -> bool {
        let names: BTreeSet<&str> = groups
            .iter()
            .flat_map(|g| g.members.iter().map(String::as_str))
            .collect();

        let mut candidates = Vec::new();
        let mut missing = Vec::new();
        for name in names {
            let images = media.fetch_images(name);
            if images.is_empty() {
                missing.push(name);
            }
            candidates.extend(images.into_iter().map(|image| PhotoCard {
                image,
                name: name.to_string(),
            }));
        }

        if candidates.len() < required {
            if !missing.is_empty() {
                tracing::warn!("Missing photos for: {}", missing.join(", "));
            }
            return false;
        }

        let mut slots: Vec<Option<PhotoCard>> = candidates.into_iter().map(Some).collect();
        let cards: Vec<PhotoCard> = index::sample(rng, slots.len(), required)
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect();
        let total = cards.len();

        *self = Session::PhotoQuiz(PhotoRound {
            cards,
            index: 0,
            score: 0,
            current: None,
            total,
        });
        true
    }

    /// Start training on `group`; the roster order is shuffled.
    pub fn start_learn_session<R: Rng + ?Sized>(&mut self, group: &Group, rng: &mut R) {
        let mut roster = group.members.clone();
        roster.shuffle(rng);
        *self = Session::LearnTrain(LearnSession {
            group_key: group.key.clone(),
            roster,
            known: HashSet::new(),
            current: None,
        });
    }

    /// Start browsing photos of one group or of every group. Returns `false` and
    /// leaves the session untouched when there is nothing to show.
    pub fn start_catalog<R: Rng + ?Sized>(
        &mut self,
        media: &dyn MediaStore,
        groups: &[Group],
        scope: CatalogScope,
        rng: &mut R,
    ) -> bool {
        let mut cards = Vec::new();
        for group in groups {
            if let CatalogScope::Group(key) = &scope {
                if group.key != *key {
                    continue;
                }
            }
            for name in &group.members {
                cards.extend(media.fetch_images(name).into_iter().map(|image| CatalogCard {
                    image,
                    name: name.clone(),
                    group_key: group.key.clone(),
                }));
            }
        }
        if cards.is_empty() {
            return false;
        }
        cards.shuffle(rng);
        *self = Session::Catalog(CatalogBrowse {
            cards,
            cursor: 0,
            scope,
        });
        true
    }

    /// Ask for the upload password.
    pub fn begin_upload(&mut self) {
        *self = Session::Upload(UploadStep::Password);
    }

    /// The password was accepted: move on to picking a group.
    pub fn unlock_upload(&mut self) -> bool {
        match self {
            Session::Upload(step @ UploadStep::Password) => {
                *step = UploadStep::Group;
                true
            }
            _ => false,
        }
    }

    /// Pick the group to upload into. Only possible once the password was accepted.
    pub fn choose_upload_group(&mut self, group_key: &str) -> bool {
        match self {
            Session::Upload(step) if *step != UploadStep::Password => {
                *step = UploadStep::Member {
                    group_key: group_key.to_string(),
                };
                true
            }
            _ => false,
        }
    }

    /// Pick the member the next photos belong to.
    pub fn choose_upload_member(&mut self, member: &str) -> bool {
        match self {
            Session::Upload(step) => {
                let group_key = match step {
                    UploadStep::Member { group_key } | UploadStep::WaitPhoto { group_key, .. } => {
                        group_key.clone()
                    }
                    _ => return false,
                };
                *step = UploadStep::WaitPhoto {
                    group_key,
                    member: member.to_string(),
                };
                true
            }
            _ => false,
        }
    }

    /// Group and member a photo sent now would be stored under.
    pub fn upload_target(&self) -> Option<(&str, &str)> {
        match self {
            Session::Upload(UploadStep::WaitPhoto { group_key, member }) => {
                Some((group_key.as_str(), member.as_str()))
            }
            _ => None,
        }
    }

    pub fn quiz_mut(&mut self) -> Option<&mut QuizRound> {
        match self {
            Session::Quiz(round) => Some(round),
            _ => None,
        }
    }

    pub fn photo_quiz_mut(&mut self) -> Option<&mut PhotoRound> {
        match self {
            Session::PhotoQuiz(round) => Some(round),
            _ => None,
        }
    }

    pub fn learn_mut(&mut self) -> Option<&mut LearnSession> {
        match self {
            Session::LearnTrain(learn) => Some(learn),
            _ => None,
        }
    }

    pub fn catalog_mut(&mut self) -> Option<&mut CatalogBrowse> {
        match self {
            Session::Catalog(browse) => Some(browse),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct FakeMedia {
        photos: HashMap<String, Vec<Vec<u8>>>,
    }

    impl FakeMedia {
        fn with(entries: &[(&str, usize)]) -> Self {
            let mut photos = HashMap::new();
            for (name, count) in entries {
                let images = (0..*count).map(|i| format!("{name}-{i}").into_bytes()).collect();
                photos.insert(name.to_string(), images);
            }
            Self { photos }
        }
    }

    impl MediaStore for FakeMedia {
        fn fetch_images(&self, member: &str) -> Vec<Vec<u8>> {
            self.photos.get(member).cloned().unwrap_or_default()
        }

        fn has_images(&self, member: &str) -> bool {
            self.photos.get(member).is_some_and(|p| !p.is_empty())
        }

        fn store_image(
            &self,
            _group_key: &str,
            _member: &str,
            _data: &[u8],
            _extension: &str,
        ) -> Result<std::path::PathBuf, crate::media::MediaError> {
            unimplemented!("read-only fake")
        }

        fn upload_groups(&self) -> Vec<String> {
            Vec::new()
        }

        fn cover_image(&self) -> Option<Vec<u8>> {
            None
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn small_catalog() -> Vec<Group> {
        vec![
            Group::new("a", "A", &["Alice", "Amy"]),
            Group::new("b", "B", &["Bea"]),
        ]
    }

    fn quiz_with(members: &[&str], groups: Vec<Group>) -> QuizRound {
        QuizRound {
            kind: QuizKind::Basic,
            members: members.iter().map(|m| m.to_string()).collect(),
            index: 0,
            score: 0,
            current: None,
            total: members.len(),
            aliases: alias_lookup(&groups),
            member_groups: member_groups(&groups),
        }
    }

    #[test]
    fn test_start_quiz_small_pool() {
        let mut session = Session::default();
        assert!(session.start_quiz(QuizKind::Basic, &small_catalog(), &mut rng()));
        assert_eq!(session.mode(), Mode::Quiz);
        let round = session.quiz_mut().unwrap();
        assert_eq!(round.total(), 3);
        assert_eq!(round.index(), 0);
        assert_eq!(round.score(), 0);
        let mut drawn: Vec<&str> = round.members().iter().map(String::as_str).collect();
        drawn.sort();
        assert_eq!(drawn, vec!["Alice", "Amy", "Bea"]);
    }

    #[test]
    fn test_start_quiz_caps_at_ten() {
        let groups = crate::catalog::GroupCatalog::with_builtin(vec![]);
        let mut session = Session::default();
        assert!(session.start_quiz(QuizKind::Basic, groups.builtin(), &mut rng()));
        let round = session.quiz_mut().unwrap();
        assert_eq!(round.total(), QUIZ_QUESTIONS);
        let unique: HashSet<&String> = round.members().iter().collect();
        assert_eq!(unique.len(), QUIZ_QUESTIONS);
    }

    #[test]
    fn test_start_quiz_without_data_leaves_session() {
        let mut session = Session::Find;
        assert!(!session.start_quiz(QuizKind::Ai, &[], &mut rng()));
        assert_eq!(session.mode(), Mode::Find);

        let empty = vec![Group::new("x", "X", &[])];
        assert!(!session.start_quiz(QuizKind::Ai, &empty, &mut rng()));
        assert_eq!(session.mode(), Mode::Find);
    }

    #[test]
    fn test_ai_quiz_mode() {
        let mut session = Session::default();
        assert!(session.start_quiz(QuizKind::Ai, &small_catalog(), &mut rng()));
        assert_eq!(session.mode(), Mode::QuizAi);
    }

    #[test]
    fn test_next_question_is_idempotent() {
        let mut round = quiz_with(&["Alice", "Bea"], small_catalog());
        assert_eq!(round.next_question().as_deref(), Some("Alice"));
        assert_eq!(round.next_question().as_deref(), Some("Alice"));
        assert_eq!(round.index(), 0);
        assert_eq!(round.current(), Some("Alice"));
    }

    #[test]
    fn test_submit_requires_outstanding_question() {
        let mut round = quiz_with(&["Alice"], small_catalog());
        assert!(round.submit_answer("a").is_none());
        assert_eq!(round.index(), 0);

        round.next_question();
        assert!(round.submit_answer("a").is_some());
        // Scored question cannot be scored again.
        assert!(round.submit_answer("a").is_none());
        assert_eq!(round.index(), 1);
        assert_eq!(round.score(), 1);
    }

    #[test]
    fn test_quiz_scenario_small_catalog() {
        let mut round = quiz_with(&["Alice", "Amy", "Bea"], small_catalog());

        assert_eq!(round.next_question().as_deref(), Some("Alice"));
        let outcome = round.submit_answer("b").unwrap();
        assert_eq!(outcome, AnswerOutcome { correct: false, finished: false });

        assert_eq!(round.next_question().as_deref(), Some("Amy"));
        let outcome = round.submit_answer("A").unwrap();
        assert!(outcome.correct);

        assert_eq!(round.next_question().as_deref(), Some("Bea"));
        let outcome = round.submit_answer("Bea").unwrap();
        assert_eq!(outcome, AnswerOutcome { correct: false, finished: true });

        assert_eq!(round.score(), 1);
        assert_eq!(round.index(), 3);
        assert!(round.next_question().is_none());
    }

    #[test]
    fn test_alias_spellings_accepted() {
        let groups = vec![
            Group::new("red velvet", "Red Velvet", &["Joy"]),
            Group::new("twice", "Twice", &["Momo"]),
        ];
        for answer in ["Red Velvet", "red velvet", "RedVelvet", "  Red   Velvet "] {
            let mut round = quiz_with(&["Joy"], groups.clone());
            round.next_question();
            assert!(round.submit_answer(answer).unwrap().correct, "{answer:?}");
        }
        let mut round = quiz_with(&["Joy"], groups);
        round.next_question();
        assert!(!round.submit_answer("Twice").unwrap().correct);
    }

    #[test]
    fn test_display_name_alias() {
        let groups = vec![Group::new("njz", "NewJeans", &["Hanni"])];
        let mut round = quiz_with(&["Hanni"], groups);
        round.next_question();
        assert!(round.submit_answer("new jeans").is_some_and(|o| !o.correct));
        let mut round = quiz_with(&["Hanni"], vec![Group::new("njz", "NewJeans", &["Hanni"])]);
        round.next_question();
        assert!(round.submit_answer("newjeans").unwrap().correct);
    }

    #[test]
    fn test_duplicate_member_accepts_any_group() {
        let groups = vec![Group::new("a", "A", &["Sam"]), Group::new("b", "B", &["Sam"])];
        for answer in ["a", "b"] {
            let mut round = quiz_with(&["Sam"], groups.clone());
            round.next_question();
            assert!(round.submit_answer(answer).unwrap().correct, "{answer}");
        }
    }

    #[test]
    fn test_photo_quiz_insufficient_media() {
        let media = FakeMedia::with(&[("Alice", 1), ("Bea", 1)]);
        let mut session = Session::LearnMenu;
        assert!(!session.start_photo_quiz(&media, &small_catalog(), 3, &mut rng()));
        assert_eq!(session.mode(), Mode::LearnMenu);
    }

    #[test]
    fn test_photo_quiz_samples_distinct_photos() {
        let media = FakeMedia::with(&[("Alice", 2), ("Amy", 1), ("Bea", 1)]);
        let mut session = Session::default();
        assert!(session.start_photo_quiz(&media, &small_catalog(), 3, &mut rng()));
        assert_eq!(session.mode(), Mode::PhotoQuiz);

        let round = session.photo_quiz_mut().unwrap();
        assert_eq!(round.total(), 3);
        let images: HashSet<&Vec<u8>> = round.cards().iter().map(|c| &c.image).collect();
        assert_eq!(images.len(), 3);
        let alice = round.cards().iter().filter(|c| c.name == "Alice").count();
        assert!(alice <= 2);
    }

    #[test]
    fn test_photo_quiz_answers() {
        let media = FakeMedia::with(&[("Alice", 1), ("Bea", 1)]);
        let mut session = Session::default();
        assert!(session.start_photo_quiz(&media, &small_catalog(), 2, &mut rng()));
        let round = session.photo_quiz_mut().unwrap();

        assert!(round.submit_answer("x").is_none());
        let first = round.next_photo().unwrap().name.clone();
        assert_eq!(round.next_photo().unwrap().name, first);

        let outcome = round.submit_answer(&first.to_uppercase()).unwrap();
        assert!(outcome.correct);
        assert!(!outcome.finished);
        assert_eq!(outcome.expected, first);

        round.next_photo().unwrap();
        let outcome = round.submit_answer("nobody").unwrap();
        assert!(!outcome.correct);
        assert!(outcome.finished);
        assert_eq!(round.score(), 1);
        assert!(round.next_photo().is_none());
    }

    #[test]
    fn test_learn_session_to_completion() {
        let group = Group::new("katseye", "Katseye", &["Lara", "Megan"]);
        let mut session = Session::default();
        let mut rng = rng();
        session.start_learn_session(&group, &mut rng);
        assert_eq!(session.mode(), Mode::LearnTrain);

        let learn = session.learn_mut().unwrap();
        assert_eq!(learn.roster().len(), 2);
        assert!(learn.submit_answer("Lara").is_none());

        let first = learn.pick_next_to_guess(&mut rng).unwrap();
        let outcome = learn.submit_answer("wrong").unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.expected, first);
        assert_eq!(learn.known_count(), 0);

        let mut guesses = 0;
        while let Some(member) = learn.pick_next_to_guess(&mut rng) {
            assert!(learn.submit_answer(&member.to_uppercase()).unwrap().correct);
            guesses += 1;
            assert!(guesses <= 2);
        }
        assert_eq!(learn.known_count(), 2);
        assert!(learn.current().is_none());
    }

    #[test]
    fn test_learn_never_repeats_known_member() {
        let group = Group::new("itzy", "Itzy", &["Yeji", "Ryujin", "Lia"]);
        let mut session = Session::default();
        let mut rng = rng();
        session.start_learn_session(&group, &mut rng);
        let learn = session.learn_mut().unwrap();

        let first = learn.pick_next_to_guess(&mut rng).unwrap();
        learn.submit_answer(&first).unwrap();
        for _ in 0..20 {
            let next = learn.pick_next_to_guess(&mut rng).unwrap();
            assert_ne!(next, first);
        }
    }

    #[test]
    fn test_catalog_by_group_and_random() {
        let media = FakeMedia::with(&[("Alice", 2), ("Bea", 1)]);
        let groups = small_catalog();

        let mut session = Session::default();
        assert!(session.start_catalog(&media, &groups, CatalogScope::Group("a".into()), &mut rng()));
        let browse = session.catalog_mut().unwrap();
        assert_eq!(browse.len(), 2);
        assert!(browse.next_card().is_some());
        assert!(browse.next_card().is_some());
        assert!(browse.next_card().is_none());

        assert!(session.start_catalog(&media, &groups, CatalogScope::Random, &mut rng()));
        assert_eq!(session.catalog_mut().unwrap().len(), 3);
    }

    #[test]
    fn test_catalog_without_photos() {
        let media = FakeMedia::default();
        let mut session = Session::default();
        assert!(!session.start_catalog(&media, &small_catalog(), CatalogScope::Random, &mut rng()));
        assert_eq!(session.mode(), Mode::Idle);
    }

    #[test]
    fn test_upload_flow() {
        let mut session = Session::default();
        assert!(!session.unlock_upload());

        session.begin_upload();
        assert_eq!(session.mode(), Mode::UploadPassword);
        assert!(!session.choose_upload_group("twice"), "group before password");

        assert!(session.unlock_upload());
        assert_eq!(session.mode(), Mode::UploadGroup);
        assert!(!session.choose_upload_member("Momo"), "member before group");

        assert!(session.choose_upload_group("twice"));
        assert_eq!(session.mode(), Mode::UploadMember);
        assert!(session.upload_target().is_none());

        assert!(session.choose_upload_member("Momo"));
        assert_eq!(session.mode(), Mode::UploadWaitPhoto);
        assert_eq!(session.upload_target(), Some(("twice", "Momo")));

        session.reset();
        assert_eq!(session.mode(), Mode::Idle);
        assert!(session.upload_target().is_none());
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(Mode::QuizAi.to_string(), "quiz_ai");
        assert_eq!(Mode::UploadWaitPhoto.as_str(), "upload_wait_photo");
    }

    fn arb_groups() -> impl Strategy<Value = Vec<Group>> {
        prop::collection::vec(
            (
                "[a-z]{1,8}",
                prop::collection::vec("[A-Z][a-z]{1,6}", 0..8),
            ),
            0..6,
        )
        .prop_map(|raw| {
            let mut groups: Vec<Group> = Vec::new();
            for (key, members) in raw {
                if groups.iter().any(|g| g.key == key) {
                    continue;
                }
                groups.push(Group {
                    key: key.clone(),
                    display_name: key.to_uppercase(),
                    members,
                });
            }
            groups
        })
    }

    proptest! {
        #[test]
        fn prop_quiz_sample_is_drawn_from_pool(groups in arb_groups(), seed in any::<u64>()) {
            let pool: Vec<&String> = groups.iter().flat_map(|g| g.members.iter()).collect();
            let mut session = Session::default();
            let started = session.start_quiz(QuizKind::Basic, &groups, &mut StdRng::seed_from_u64(seed));
            prop_assert_eq!(started, !pool.is_empty());
            if let Some(round) = session.quiz_mut() {
                let expected = QUIZ_QUESTIONS.min(pool.len());
                prop_assert_eq!(round.total(), expected);
                prop_assert_eq!(round.members().len(), expected);
                for m in round.members() {
                    prop_assert!(pool.contains(&m));
                }
                // Never more copies of a name than the pool holds.
                for m in round.members() {
                    let drawn = round.members().iter().filter(|x| *x == m).count();
                    let available = pool.iter().filter(|x| **x == m).count();
                    prop_assert!(drawn <= available);
                }
            }
        }

        #[test]
        fn prop_index_counts_answers(
            groups in arb_groups(),
            answers in prop::collection::vec("[a-z ]{0,10}", 0..12),
            seed in any::<u64>(),
        ) {
            let mut session = Session::default();
            if session.start_quiz(QuizKind::Basic, &groups, &mut StdRng::seed_from_u64(seed)) {
                let round = session.quiz_mut().unwrap();
                let mut submitted = 0;
                for answer in &answers {
                    if round.next_question().is_none() {
                        break;
                    }
                    round.submit_answer(answer).unwrap();
                    submitted += 1;
                    prop_assert_eq!(round.index(), submitted);
                    prop_assert!(round.score() <= submitted);
                    prop_assert!(round.index() <= round.total());
                }
            }
        }
    }
}
