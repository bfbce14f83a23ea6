// Game engine: session state machine, mask generator and session store.

pub mod mask;
pub mod session;
pub mod store;

pub use session::{
    AnswerOutcome, CatalogScope, LearnOutcome, Mode, PhotoOutcome, QuizKind, Session, UploadStep,
    PHOTO_GAME_QUESTIONS, QUIZ_QUESTIONS,
};
pub use store::SessionStore;
