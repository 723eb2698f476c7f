//! Question banks: six fixed questions per topic, embedded as JSON.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;

const BUILTIN_BANKS: &str = include_str!("../banks/question_banks.json");

/// One of the four answer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerOption {
    A,
    B,
    C,
    D,
}

impl AnswerOption {
    pub const ALL: [AnswerOption; 4] = [
        AnswerOption::A,
        AnswerOption::B,
        AnswerOption::C,
        AnswerOption::D,
    ];

    /// Position of this option in a question's option list.
    pub fn index(&self) -> usize {
        match self {
            AnswerOption::A => 0,
            AnswerOption::B => 1,
            AnswerOption::C => 2,
            AnswerOption::D => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for AnswerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            AnswerOption::A => "A",
            AnswerOption::B => "B",
            AnswerOption::C => "C",
            AnswerOption::D => "D",
        };
        f.write_str(letter)
    }
}

impl FromStr for AnswerOption {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(AnswerOption::A),
            "B" => Ok(AnswerOption::B),
            "C" => Ok(AnswerOption::C),
            "D" => Ok(AnswerOption::D),
            _ => Err(format!("invalid answer '{s}' (use A, B, C or D)")),
        }
    }
}

/// A multiple-choice question with options in fixed display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: [String; 4],
    pub answer: AnswerOption,
}

impl QuizQuestion {
    /// Text of the given option.
    pub fn option(&self, option: AnswerOption) -> &str {
        &self.options[option.index()]
    }

    pub fn is_correct(&self, option: AnswerOption) -> bool {
        self.answer == option
    }

    /// Options paired with their letters, in display order.
    pub fn labelled_options(&self) -> impl Iterator<Item = (AnswerOption, &str)> + '_ {
        AnswerOption::ALL
            .into_iter()
            .map(|option| (option, self.option(option)))
    }
}

#[derive(Debug, Deserialize)]
struct BankFile {
    banks: Vec<TopicBank>,
}

#[derive(Debug, Deserialize)]
struct TopicBank {
    topic: String,
    questions: Vec<QuizQuestion>,
}

/// All question banks, keyed by topic.
#[derive(Debug, Clone, Default)]
pub struct QuestionBanks {
    banks: BTreeMap<String, Vec<QuizQuestion>>,
}

impl QuestionBanks {
    /// The banks shipped with the crate, one per algorithm.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_BANKS)
    }

    /// Parse banks from `{"banks": [{"topic": .., "questions": [..]}]}`.
    ///
    /// Topics without questions are dropped. A repeated topic replaces the
    /// earlier one.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: BankFile = serde_json::from_str(json)?;
        let banks = file
            .banks
            .into_iter()
            .filter(|bank| !bank.questions.is_empty())
            .map(|bank| (bank.topic, bank.questions))
            .collect();
        Ok(Self { banks })
    }

    /// Add or replace the bank for `topic`.
    pub fn insert(&mut self, topic: impl Into<String>, questions: Vec<QuizQuestion>) {
        self.banks.insert(topic.into(), questions);
    }

    pub fn get(&self, topic: &str) -> Option<&[QuizQuestion]> {
        self.banks.get(topic).map(Vec::as_slice)
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.banks.contains_key(topic)
    }

    /// Topics in sorted order.
    pub fn topics(&self) -> impl Iterator<Item = &str> + '_ {
        self.banks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_six_questions_per_topic() {
        let banks = QuestionBanks::builtin().unwrap();
        assert_eq!(banks.len(), 21);
        for topic in banks.topics() {
            assert_eq!(banks.get(topic).unwrap().len(), 6, "{topic}");
        }
    }

    #[test]
    fn bubble_sort_first_question() {
        let banks = QuestionBanks::builtin().unwrap();
        let question = &banks.get("BubbleSort").unwrap()[0];
        assert_eq!(question.prompt, "What is the time complexity of Bubble Sort?");
        assert_eq!(question.answer, AnswerOption::C);
        assert_eq!(question.option(AnswerOption::C), "O(n²)");
        assert!(question.is_correct(AnswerOption::C));
        assert!(!question.is_correct(AnswerOption::A));
    }

    #[test]
    fn parse_answer_letters() {
        assert_eq!("b".parse::<AnswerOption>(), Ok(AnswerOption::B));
        assert_eq!(" D ".parse::<AnswerOption>(), Ok(AnswerOption::D));
        assert!("E".parse::<AnswerOption>().is_err());
        assert_eq!(AnswerOption::from_index(2), Some(AnswerOption::C));
        assert_eq!(AnswerOption::from_index(4), None);
    }

    #[test]
    fn empty_topics_are_dropped() {
        let json = r#"{"banks": [
            {"topic": "Empty", "questions": []},
            {"topic": "One", "questions": [
                {"prompt": "?", "options": ["a", "b", "c", "d"], "answer": "D"}
            ]}
        ]}"#;
        let banks = QuestionBanks::from_json(json).unwrap();
        assert!(!banks.contains("Empty"));
        assert_eq!(banks.get("One").unwrap()[0].option(AnswerOption::D), "d");
    }

    #[test]
    fn malformed_bank_is_an_error() {
        let json = r#"{"banks": [{"topic": "X", "questions": [
            {"prompt": "?", "options": ["a", "b"], "answer": "A"}
        ]}]}"#;
        assert!(QuestionBanks::from_json(json).is_err());
    }
}
