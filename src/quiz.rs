//! Quiz questions and grading.
//!
//! A test asks for the English word behind each selected card's meaning.
//! Questions are rebuilt from the store on every request in the same order,
//! so the answer field for question `i` is always `answer_<i>`.

use std::collections::HashMap;

use crate::domain::{Flashcard, Test};

/// A single question: what is shown, and what must be typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
  pub card_id: i64,
  pub prompt: String,
  expected: String,
}

impl QuizQuestion {
  pub fn new(card_id: i64, prompt: impl Into<String>, expected: impl Into<String>) -> Self {
    Self {
      card_id,
      prompt: prompt.into(),
      expected: expected.into(),
    }
  }

  pub fn from_card(card: &Flashcard) -> Self {
    let prompt = [&card.mean_english, &card.mean_espanish, &card.word_spanish]
      .into_iter()
      .map(|s| s.trim())
      .find(|s| !s.is_empty())
      .unwrap_or_default();
    Self::new(card.id, prompt, card.word_english.clone())
  }

  pub fn expected(&self) -> &str {
    &self.expected
  }

  pub fn field_name(index: usize) -> String {
    format!("answer_{}", index)
  }
}

/// The first `num_questions` selected cards, as questions
pub fn build_questions(test: &Test, cards: &[Flashcard]) -> Vec<QuizQuestion> {
  cards
    .iter()
    .take(test.num_questions as usize)
    .map(QuizQuestion::from_card)
    .collect()
}

/// Exact match after trimming and case folding
pub fn answer_matches(given: &str, expected: &str) -> bool {
  given.trim().to_lowercase() == expected.trim().to_lowercase()
}

/// Per-question outcome, kept for the results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
  pub prompt: String,
  pub given: String,
  pub expected: String,
  pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
  pub correct: usize,
  pub total: usize,
  /// Every question answered correctly
  pub passed: bool,
  pub answers: Vec<GradedAnswer>,
}

/// Grade submitted answers (`answer_<i>` fields); missing answers count as wrong
pub fn grade(questions: &[QuizQuestion], submitted: &HashMap<String, String>) -> QuizResult {
  let answers: Vec<GradedAnswer> = questions
    .iter()
    .enumerate()
    .map(|(i, q)| {
      let given = submitted
        .get(&QuizQuestion::field_name(i))
        .cloned()
        .unwrap_or_default();
      GradedAnswer {
        prompt: q.prompt.clone(),
        correct: answer_matches(&given, &q.expected),
        expected: q.expected.clone(),
        given,
      }
    })
    .collect();

  let correct = answers.iter().filter(|a| a.correct).count();
  let total = answers.len();
  QuizResult {
    correct,
    total,
    passed: correct == total,
    answers,
  }
}
