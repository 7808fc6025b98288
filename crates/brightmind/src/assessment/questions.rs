use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::LikertValue;

/// Subscale a question contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Depression,
    Anxiety,
}

impl Category {
    pub const fn ordered() -> [Self; 2] {
        [Self::Depression, Self::Anxiety]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Depression => "Depression",
            Self::Anxiety => "Anxiety",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: u32,
    pub text: &'static str,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    pub value: LikertValue,
    pub label: &'static str,
}

const ANSWER_OPTIONS: [AnswerOption; 4] = [
    AnswerOption {
        value: LikertValue::NOT_AT_ALL,
        label: "Not at all",
    },
    AnswerOption {
        value: LikertValue::SEVERAL_DAYS,
        label: "Several days",
    },
    AnswerOption {
        value: LikertValue::MORE_THAN_HALF,
        label: "More than half the days",
    },
    AnswerOption {
        value: LikertValue::NEARLY_EVERY_DAY,
        label: "Nearly every day",
    },
];

/// Fixed, ordered questionnaire. Declaration order is both display and scoring order.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn standard() -> Self {
        Self {
            questions: standard_questions(),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Positions (not ids) of the questions tagged with `category`.
    pub fn indices_for(&self, category: Category) -> Vec<usize> {
        self.questions
            .iter()
            .enumerate()
            .filter(|(_, question)| question.category == category)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn count_for(&self, category: Category) -> usize {
        self.questions
            .iter()
            .filter(|question| question.category == category)
            .count()
    }

    pub fn answer_options(&self) -> &'static [AnswerOption] {
        &ANSWER_OPTIONS
    }

    pub fn option_for(&self, value: LikertValue) -> &'static AnswerOption {
        &ANSWER_OPTIONS[usize::from(value.get())]
    }
}

fn standard_questions() -> Vec<Question> {
    vec![
        Question {
            id: 1,
            text: "Over the last 2 weeks, how often have you been bothered by feeling down, depressed, or hopeless?",
            category: Category::Depression,
        },
        Question {
            id: 2,
            text: "Over the last 2 weeks, how often have you had little interest or pleasure in doing things?",
            category: Category::Depression,
        },
        Question {
            id: 3,
            text: "Over the last 2 weeks, how often have you been bothered by trouble falling or staying asleep?",
            category: Category::Depression,
        },
        Question {
            id: 4,
            text: "Over the last 2 weeks, how often have you been bothered by feeling nervous, anxious, or on edge?",
            category: Category::Anxiety,
        },
        Question {
            id: 5,
            text: "Over the last 2 weeks, how often have you been bothered by not being able to stop or control worrying?",
            category: Category::Anxiety,
        },
        Question {
            id: 6,
            text: "Over the last 2 weeks, how often have you been bothered by worrying too much about different things?",
            category: Category::Anxiety,
        },
        Question {
            id: 7,
            text: "Over the last 2 weeks, how often have you been bothered by trouble relaxing?",
            category: Category::Anxiety,
        },
        Question {
            id: 8,
            text: "Over the last 2 weeks, how often have you been bothered by feeling tired or having little energy?",
            category: Category::Depression,
        },
        Question {
            id: 9,
            text: "Over the last 2 weeks, how often have you been bothered by feeling afraid as if something awful might happen?",
            category: Category::Anxiety,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_bank_preserves_declaration_order() {
        let bank = QuestionBank::standard();
        let ids: Vec<u32> = bank.questions().iter().map(|question| question.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn categories_split_four_and_five() {
        let bank = QuestionBank::standard();
        assert_eq!(bank.indices_for(Category::Depression), vec![0, 1, 2, 7]);
        assert_eq!(bank.indices_for(Category::Anxiety), vec![3, 4, 5, 6, 8]);
        assert_eq!(bank.count_for(Category::Depression), 4);
        assert_eq!(bank.count_for(Category::Anxiety), 5);
    }

    #[test]
    fn answer_options_cover_the_likert_scale() {
        let bank = QuestionBank::standard();
        let values: Vec<u8> = bank
            .answer_options()
            .iter()
            .map(|option| option.value.get())
            .collect();
        assert_eq!(values, vec![0, 1, 2, 3]);
        assert_eq!(
            bank.option_for(LikertValue::NEARLY_EVERY_DAY).label,
            "Nearly every day"
        );
    }
}
