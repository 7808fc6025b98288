//! Nine-item depression/anxiety questionnaire: the bank, the forward-only
//! wizard that collects answers, subscale scoring, and single-slot result storage.

pub mod domain;
pub mod questions;
pub mod results;
pub mod schedule;
pub mod scoring;
pub mod wizard;

pub use domain::{AnswerSet, AssessmentResult, InvalidLikertValue, LikertValue};
pub use questions::{AnswerOption, Category, Question, QuestionBank};
pub use results::{FileResultsStore, MemoryResultsStore, ResultsError, ResultsStore, RESULTS_KEY};
pub use schedule::{ScheduledTransition, TransitionScope};
pub use scoring::{
    interpret, max_score, score, ScoreBand, ScoreError, SubscaleReading, SubscaleScores,
};
pub use wizard::{AssessmentWizard, WizardError, WizardState};
