mod catalog;
mod ids;
mod question;
mod rules;
mod session;
mod summary;
mod track;

pub use catalog::{CatalogError, SongCatalog};
pub use ids::{ParseIdError, TrackId};
pub use question::{AnswerOutcome, MAX_OPTIONS, Question, QuestionError};
pub use rules::{QuizRules, RulesError};
pub use session::{SessionState, SessionStateError};
pub use summary::{GameSummary, SummaryError};
pub use track::{AudioLocator, Track, TrackError};
