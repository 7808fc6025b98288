use serde::Serialize;
use std::collections::BTreeMap;

use super::domain::{AnswerSet, LikertValue};
use super::questions::{Category, QuestionBank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscaleScores {
    pub depression_score: u32,
    pub anxiety_score: u32,
}

impl SubscaleScores {
    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Depression => self.depression_score,
            Category::Anxiety => self.anxiety_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    #[error("answers cover {actual} questions but the bank has {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("questions at positions {missing:?} are unanswered")]
    Unanswered { missing: Vec<usize> },
}

/// Sum of Likert values per subscale. Refuses partially answered sets.
pub fn score(bank: &QuestionBank, answers: &AnswerSet) -> Result<SubscaleScores, ScoreError> {
    let totals = category_totals(bank, answers)?;
    Ok(SubscaleScores {
        depression_score: totals.get(&Category::Depression).copied().unwrap_or(0),
        anxiety_score: totals.get(&Category::Anxiety).copied().unwrap_or(0),
    })
}

pub fn category_totals(
    bank: &QuestionBank,
    answers: &AnswerSet,
) -> Result<BTreeMap<Category, u32>, ScoreError> {
    if answers.len() != bank.len() {
        return Err(ScoreError::LengthMismatch {
            expected: bank.len(),
            actual: answers.len(),
        });
    }
    let missing = answers.missing(bank.len());
    if !missing.is_empty() {
        return Err(ScoreError::Unanswered { missing });
    }

    let mut totals = BTreeMap::new();
    for category in Category::ordered() {
        let sum: u32 = bank
            .indices_for(category)
            .into_iter()
            .filter_map(|index| answers.get(index))
            .map(|value| u32::from(value.get()))
            .sum();
        totals.insert(category, sum);
    }
    Ok(totals)
}

pub fn max_score(bank: &QuestionBank, category: Category) -> u32 {
    bank.count_for(category) as u32 * u32::from(LikertValue::MAX)
}

/// Which quarter of its maximum a subscale total falls in. Not a clinical cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    FirstQuarter,
    SecondQuarter,
    ThirdQuarter,
    FourthQuarter,
}

impl ScoreBand {
    pub fn classify(score: u32, max: u32) -> Self {
        if max == 0 {
            return Self::FirstQuarter;
        }
        // integer math keeps 3/12 in the second quarter
        let quarters = score * 4;
        if quarters < max {
            Self::FirstQuarter
        } else if quarters < max * 2 {
            Self::SecondQuarter
        } else if quarters < max * 3 {
            Self::ThirdQuarter
        } else {
            Self::FourthQuarter
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstQuarter => "under 25% of the maximum",
            Self::SecondQuarter => "25-49% of the maximum",
            Self::ThirdQuarter => "50-74% of the maximum",
            Self::FourthQuarter => "75% of the maximum or more",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscaleReading {
    pub category: Category,
    pub score: u32,
    pub max: u32,
    pub band: ScoreBand,
}

/// Per-subscale reading used by the results view.
pub fn interpret(bank: &QuestionBank, scores: &SubscaleScores) -> Vec<SubscaleReading> {
    Category::ordered()
        .into_iter()
        .map(|category| {
            let score = scores.get(category);
            let max = max_score(bank, category);
            SubscaleReading {
                category,
                score,
                max,
                band: ScoreBand::classify(score, max),
            }
        })
        .collect()
}
