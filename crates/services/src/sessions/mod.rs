mod engine;
mod plan;
mod progress;
mod results;
mod workflow;

// Public API of the quiz session subsystem.
pub use crate::error::SessionError;
pub use engine::{LoadOutcome, QuizEngine, QuizPhase, TickEvent};
pub use plan::{build_options, draw_question_order};
pub use progress::{QuestionView, QuizProgress};
pub use results::{RecordedResult, ResultsService};
pub use workflow::QuizLoopService;
