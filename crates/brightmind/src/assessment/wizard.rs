use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::domain::{AnswerSet, AssessmentResult, InvalidLikertValue, LikertValue};
use super::questions::{Question, QuestionBank};
use super::results::{ResultsError, ResultsStore};
use super::scoring::{self, ScoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WizardState {
    Idle,
    InProgress { index: usize },
    Completed,
}

impl WizardState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::InProgress { .. } => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("assessment is {} and cannot accept that action", .0.label())]
    NotInProgress(WizardState),
    #[error(transparent)]
    InvalidAnswer(#[from] InvalidLikertValue),
    #[error("please answer all questions before submitting ({} unanswered)", .missing.len())]
    IncompleteAssessment { missing: Vec<usize> },
    #[error(transparent)]
    Scoring(#[from] ScoreError),
    #[error(transparent)]
    Persistence(#[from] ResultsError),
}

/// One assessment session: walks the bank forward, one question at a time.
///
/// The wizard never completes on its own. Answering the last question keeps it
/// there; [`AssessmentWizard::submit`] is the only way to score and persist.
/// Submitting again after completion recomputes from the same answers and
/// overwrites the stored result.
pub struct AssessmentWizard<S> {
    bank: QuestionBank,
    store: Arc<S>,
    state: WizardState,
    answers: AnswerSet,
}

impl<S> AssessmentWizard<S>
where
    S: ResultsStore,
{
    pub fn new(bank: QuestionBank, store: Arc<S>) -> Self {
        Self {
            bank,
            store,
            state: WizardState::Idle,
            answers: AnswerSet::default(),
        }
    }

    /// Begin (or restart) at the first question with a blank answer set.
    pub fn start(&mut self) {
        self.answers = AnswerSet::unanswered(self.bank.len());
        self.state = if self.bank.is_empty() {
            WizardState::Completed
        } else {
            WizardState::InProgress { index: 0 }
        };
        debug!(questions = self.bank.len(), "assessment started");
    }

    /// Record `raw` for the current question and move forward unless it is the last one.
    pub fn answer(&mut self, raw: u8) -> Result<WizardState, WizardError> {
        let WizardState::InProgress { index } = self.state else {
            return Err(WizardError::NotInProgress(self.state));
        };
        let value = LikertValue::try_from(raw)?;

        self.answers.record(index, value);
        if index + 1 < self.bank.len() {
            self.state = WizardState::InProgress { index: index + 1 };
        }
        Ok(self.state)
    }

    pub fn submit(&mut self) -> Result<AssessmentResult, WizardError> {
        self.submit_at(Utc::now())
    }

    /// Score, persist, and complete. Nothing changes when any step fails.
    pub fn submit_at(
        &mut self,
        completed_at: DateTime<Utc>,
    ) -> Result<AssessmentResult, WizardError> {
        if self.state == WizardState::Idle {
            return Err(WizardError::NotInProgress(self.state));
        }
        let missing = self.answers.missing(self.bank.len());
        if !missing.is_empty() {
            return Err(WizardError::IncompleteAssessment { missing });
        }

        let scores = scoring::score(&self.bank, &self.answers)?;
        let result = AssessmentResult::new(scores, self.answers.clone(), completed_at);
        self.store.save(&result)?;

        self.state = WizardState::Completed;
        info!(
            depression_score = result.depression_score,
            anxiety_score = result.anxiety_score,
            "assessment submitted"
        );
        Ok(result)
    }

    pub fn reset(&mut self) {
        self.state = WizardState::Idle;
        self.answers = AnswerSet::default();
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            WizardState::InProgress { index } => Some(index),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().and_then(|index| self.bank.get(index))
    }

    /// Answer already recorded for the current question, if any.
    pub fn selected(&self) -> Option<LikertValue> {
        self.current_index()
            .and_then(|index| self.answers.get(index))
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index()
            .map(|index| index + 1 == self.bank.len())
            .unwrap_or(false)
    }

    pub fn can_submit(&self) -> bool {
        self.state != WizardState::Idle && self.answers.is_complete(self.bank.len())
    }

    /// Position through the questionnaire, counting the question on screen.
    pub fn progress_percent(&self) -> f32 {
        match self.state {
            WizardState::Idle => 0.0,
            WizardState::Completed => 100.0,
            WizardState::InProgress { index } => {
                (index + 1) as f32 / self.bank.len() as f32 * 100.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::results::MemoryResultsStore;
    use chrono::TimeZone;

    fn wizard() -> (AssessmentWizard<MemoryResultsStore>, Arc<MemoryResultsStore>) {
        let store = Arc::new(MemoryResultsStore::default());
        (
            AssessmentWizard::new(QuestionBank::standard(), store.clone()),
            store,
        )
    }

    #[test]
    fn starts_idle_and_rejects_answers_until_started() {
        let (mut wizard, _) = wizard();
        assert_eq!(wizard.state(), WizardState::Idle);
        assert!(matches!(
            wizard.answer(1),
            Err(WizardError::NotInProgress(WizardState::Idle))
        ));
        assert!(matches!(
            wizard.submit(),
            Err(WizardError::NotInProgress(WizardState::Idle))
        ));
    }

    #[test]
    fn answering_advances_until_the_last_question() {
        let (mut wizard, _) = wizard();
        wizard.start();
        for expected_next in 1..9 {
            let state = wizard.answer(2).expect("valid answer");
            assert_eq!(state, WizardState::InProgress { index: expected_next });
        }
        assert!(wizard.is_last_question());

        let state = wizard.answer(3).expect("last answer");
        assert_eq!(state, WizardState::InProgress { index: 8 });
        assert_eq!(wizard.selected(), Some(LikertValue::NEARLY_EVERY_DAY));

        // re-answering the last question overwrites in place
        wizard.answer(0).expect("overwrite");
        assert_eq!(wizard.selected(), Some(LikertValue::NOT_AT_ALL));
        assert_eq!(wizard.answers().answered_count(), 9);
    }

    #[test]
    fn out_of_range_answer_neither_records_nor_advances() {
        let (mut wizard, _) = wizard();
        wizard.start();
        wizard.answer(1).expect("valid");

        for invalid in [4, 7, u8::MAX] {
            match wizard.answer(invalid) {
                Err(WizardError::InvalidAnswer(InvalidLikertValue(value))) => {
                    assert_eq!(value, invalid)
                }
                other => panic!("expected invalid answer, got {other:?}"),
            }
        }
        assert_eq!(wizard.state(), WizardState::InProgress { index: 1 });
        assert_eq!(wizard.answers().answered_count(), 1);
        assert_eq!(wizard.selected(), None);
    }

    #[test]
    fn submit_persists_scores_and_completes() {
        let (mut wizard, store) = wizard();
        wizard.start();
        for _ in 0..9 {
            wizard.answer(3).expect("valid");
        }
        assert!(wizard.can_submit());

        let result = wizard.submit().expect("complete assessment");
        assert_eq!(result.depression_score, 12);
        assert_eq!(result.anxiety_score, 15);
        assert_eq!(result.total_questions, 9);
        assert_eq!(wizard.state(), WizardState::Completed);
        assert_eq!(store.load().expect("load"), Some(result));
        assert!(matches!(
            wizard.answer(1),
            Err(WizardError::NotInProgress(WizardState::Completed))
        ));
    }

    #[test]
    fn incomplete_submit_leaves_state_and_storage_untouched() {
        let (mut wizard, store) = wizard();
        wizard.start();
        for _ in 0..4 {
            wizard.answer(1).expect("valid");
        }

        match wizard.submit() {
            Err(WizardError::IncompleteAssessment { missing }) => {
                assert_eq!(missing, vec![4, 5, 6, 7, 8])
            }
            other => panic!("expected incomplete assessment, got {other:?}"),
        }
        assert_eq!(wizard.state(), WizardState::InProgress { index: 4 });
        assert_eq!(store.load().expect("load"), None);
    }

    #[test]
    fn submit_fails_exactly_when_some_index_is_unanswered() {
        for mask in 0u16..(1 << 9) {
            let (mut wizard, store) = wizard();
            wizard.start();
            let mut answers = AnswerSet::unanswered(9);
            for index in (0..9).filter(|index| mask & (1 << index) != 0) {
                answers.record(index, LikertValue::MORE_THAN_HALF);
            }
            wizard.answers = answers;

            let outcome = wizard.submit();
            if mask == (1 << 9) - 1 {
                assert!(outcome.is_ok(), "all answered must submit");
                assert_eq!(wizard.state(), WizardState::Completed);
            } else {
                match outcome {
                    Err(WizardError::IncompleteAssessment { missing }) => {
                        assert!(missing.iter().all(|index| mask & (1 << index) == 0));
                        assert_eq!(missing.len(), 9 - mask.count_ones() as usize);
                    }
                    other => panic!("mask {mask:#011b}: expected incomplete, got {other:?}"),
                }
                assert_eq!(wizard.state(), WizardState::InProgress { index: 0 });
                assert_eq!(store.load().expect("load"), None);
            }
        }
    }

    #[test]
    fn resubmitting_after_completion_overwrites_with_same_answers() {
        let (mut wizard, store) = wizard();
        wizard.start();
        for _ in 0..9 {
            wizard.answer(1).expect("valid");
        }
        let earlier = Utc
            .with_ymd_and_hms(2025, 6, 1, 8, 0, 0)
            .single()
            .expect("valid timestamp");
        let first = wizard.submit_at(earlier).expect("first submit");
        let later = earlier + chrono::Duration::minutes(5);
        let second = wizard.submit_at(later).expect("second submit");

        assert_eq!(first.scores(), second.scores());
        assert_eq!(store.load().expect("load").map(|r| r.completed_at), Some(later));
    }

    #[test]
    fn start_and_reset_clear_previous_answers() {
        let (mut wizard, _) = wizard();
        wizard.start();
        wizard.answer(2).expect("valid");
        wizard.start();
        assert_eq!(wizard.answers().answered_count(), 0);
        assert_eq!(wizard.current_index(), Some(0));

        wizard.reset();
        assert_eq!(wizard.state(), WizardState::Idle);
        assert!(wizard.answers().is_empty());
        assert_eq!(wizard.progress_percent(), 0.0);
    }

    #[test]
    fn progress_counts_the_visible_question() {
        let (mut wizard, _) = wizard();
        wizard.start();
        assert!((wizard.progress_percent() - 100.0 / 9.0).abs() < 1e-4);
        for _ in 0..8 {
            wizard.answer(0).expect("valid");
        }
        assert!((wizard.progress_percent() - 100.0).abs() < 1e-4);
    }
}
