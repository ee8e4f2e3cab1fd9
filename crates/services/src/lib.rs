#![forbid(unsafe_code)]

pub mod catalog_service;
pub mod countdown;
pub mod error;
pub mod playback;
pub mod sessions;

pub use quiz_core::Clock;

pub use catalog_service::CatalogService;
pub use countdown::{CountdownController, CountdownSignal};
pub use error::{CatalogFetchError, SessionError};
pub use playback::{NullPlayback, PlaybackAdapter, PlaybackError};
pub use sessions::{
    LoadOutcome, QuestionView, QuizEngine, QuizLoopService, QuizPhase, QuizProgress,
    RecordedResult, ResultsService, TickEvent,
};
