use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::scoring::SubscaleScores;

/// Severity weight of a single response, always within `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LikertValue(u8);

impl LikertValue {
    pub const NOT_AT_ALL: Self = Self(0);
    pub const SEVERAL_DAYS: Self = Self(1);
    pub const MORE_THAN_HALF: Self = Self(2);
    pub const NEARLY_EVERY_DAY: Self = Self(3);
    pub const MAX: u8 = 3;

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for LikertValue {
    type Error = InvalidLikertValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(InvalidLikertValue(value))
        }
    }
}

impl From<LikertValue> for u8 {
    fn from(value: LikertValue) -> Self {
        value.0
    }
}

impl fmt::Display for LikertValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not one of the answer values 0-3")]
pub struct InvalidLikertValue(pub u8);

/// Responses index-aligned with the question bank; `None` marks an unanswered question.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(Vec<Option<LikertValue>>);

impl AnswerSet {
    pub fn unanswered(len: usize) -> Self {
        Self(vec![None; len])
    }

    /// Builds a complete set, mainly for fixtures and imports.
    pub fn from_values(values: impl IntoIterator<Item = LikertValue>) -> Self {
        Self(values.into_iter().map(Some).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<LikertValue> {
        self.0.get(index).copied().flatten()
    }

    /// Records `value` at `index`. Indices past the end are ignored so the set never grows.
    pub(crate) fn record(&mut self, index: usize, value: LikertValue) -> bool {
        match self.0.get_mut(index) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn is_answered(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    pub fn answered_count(&self) -> usize {
        self.0.iter().filter(|slot| slot.is_some()).count()
    }

    /// Indices in `0..expected` that hold no answer.
    pub fn missing(&self, expected: usize) -> Vec<usize> {
        (0..expected)
            .filter(|&index| !self.is_answered(index))
            .collect()
    }

    pub fn is_complete(&self, expected: usize) -> bool {
        self.len() == expected && self.missing(expected).is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<LikertValue>> + '_ {
        self.0.iter().copied()
    }
}

/// Snapshot written once the respondent submits a complete assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub depression_score: u32,
    pub anxiety_score: u32,
    pub total_questions: usize,
    pub completed_at: DateTime<Utc>,
    pub answers: AnswerSet,
}

impl AssessmentResult {
    pub fn new(scores: SubscaleScores, answers: AnswerSet, completed_at: DateTime<Utc>) -> Self {
        Self {
            depression_score: scores.depression_score,
            anxiety_score: scores.anxiety_score,
            total_questions: answers.len(),
            completed_at,
            answers,
        }
    }

    pub fn scores(&self) -> SubscaleScores {
        SubscaleScores {
            depression_score: self.depression_score,
            anxiety_score: self.anxiety_score,
        }
    }
}
