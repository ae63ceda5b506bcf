//! Fill-in-the-blank grader.
//!
//! Expected answers arrive already in canonical comparison form (lower-cased,
//! trimmed once at `BlankSlot` construction), so a check only normalizes the
//! live input. Grading is a pure function of (current inputs, stored keys):
//! marks are recomputed wholesale on every check, never read back.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::Messages;
use crate::domain::BlankSlot;
use crate::feedback::{blank_summary, Feedback};
use crate::util::normalize_answer;

/// Per-slot visual state after a check. Mutually exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlankMark {
  Correct,
  Incorrect,
}

#[derive(Clone, Debug, Serialize)]
pub struct SlotMark {
  pub slot_id: String,
  pub mark: BlankMark,
}

/// Complete outcome of one check action: every slot marked, plus the
/// summary feedback that replaces the container's feedback surface.
#[derive(Clone, Debug, Serialize)]
pub struct BlankReport {
  pub marks: Vec<SlotMark>,
  pub correct_count: usize,
  pub total: usize,
  pub feedback: Feedback,
}

/// Grading state for one fill-in-the-blank container.
#[derive(Clone, Debug)]
pub struct BlankGrader {
  slots: Vec<BlankSlot>,
}

impl BlankGrader {
  pub fn new(slots: Vec<BlankSlot>) -> Self {
    Self { slots }
  }

  pub fn total(&self) -> usize {
    self.slots.len()
  }

  /// Grade the container against the current inputs (keyed by slot id).
  /// A missing input is an empty answer, which is simply incorrect unless
  /// the expected answer is also empty. Synchronous, cannot fail.
  pub fn grade(&self, inputs: &HashMap<String, String>, msgs: &Messages) -> BlankReport {
    let mut marks = Vec::with_capacity(self.slots.len());
    let mut correct_count = 0usize;

    for slot in &self.slots {
      let given = inputs.get(&slot.id).map(String::as_str).unwrap_or("");
      let mark = if normalize_answer(given) == slot.expected {
        correct_count += 1;
        BlankMark::Correct
      } else {
        BlankMark::Incorrect
      };
      marks.push(SlotMark { slot_id: slot.id.clone(), mark });
    }

    let total = self.slots.len();
    BlankReport {
      marks,
      correct_count,
      total,
      feedback: blank_summary(msgs, correct_count, total),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::feedback::FeedbackTone;

  fn go_went_gone() -> BlankGrader {
    BlankGrader::new(vec![
      BlankSlot::new("b1", "I ___ to school.", "go"),
      BlankSlot::new("b2", "She ___ yesterday.", "went"),
      BlankSlot::new("b3", "He has ___.", "gone"),
    ])
  }

  fn inputs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  #[test]
  fn grades_two_of_three_with_case_and_whitespace_slack() {
    let grader = go_went_gone();
    let msgs = Messages::default();
    let report = grader.grade(&inputs(&[("b1", "Go"), ("b2", "went "), ("b3", "goes")]), &msgs);

    assert_eq!(report.correct_count, 2);
    assert_eq!(report.total, 3);
    assert_eq!(report.marks[0].mark, BlankMark::Correct);
    assert_eq!(report.marks[1].mark, BlankMark::Correct);
    assert_eq!(report.marks[2].mark, BlankMark::Incorrect);
    assert_eq!(report.feedback.tone, FeedbackTone::Retry);
    assert!(report.feedback.text.contains("2 of 3 correct"));
  }

  #[test]
  fn repeated_checks_with_same_input_are_identical() {
    let grader = go_went_gone();
    let msgs = Messages::default();
    let given = inputs(&[("b1", "go"), ("b2", "nope")]);

    let first = grader.grade(&given, &msgs);
    let second = grader.grade(&given, &msgs);
    assert_eq!(first.correct_count, second.correct_count);
    assert_eq!(first.feedback.text, second.feedback.text);
    let marks = |r: &BlankReport| r.marks.iter().map(|m| m.mark).collect::<Vec<_>>();
    assert_eq!(marks(&first), marks(&second));
  }

  #[test]
  fn full_score_gets_the_success_variant() {
    let grader = go_went_gone();
    let msgs = Messages::default();
    let report = grader.grade(&inputs(&[("b1", " GO"), ("b2", "Went"), ("b3", "gone")]), &msgs);

    assert_eq!(report.correct_count, report.total);
    assert_eq!(report.feedback.tone, FeedbackTone::Success);
  }

  #[test]
  fn missing_input_counts_as_plain_incorrect() {
    let grader = go_went_gone();
    let msgs = Messages::default();
    let report = grader.grade(&HashMap::new(), &msgs);

    assert_eq!(report.correct_count, 0);
    assert!(report.correct_count <= report.total);
    assert!(report.marks.iter().all(|m| m.mark == BlankMark::Incorrect));
  }

  #[test]
  fn empty_expected_answer_matches_empty_input() {
    let grader = BlankGrader::new(vec![BlankSlot::new("b1", "Say nothing: ___", "")]);
    let msgs = Messages::default();
    let report = grader.grade(&inputs(&[("b1", "  ")]), &msgs);
    assert_eq!(report.correct_count, 1);
  }
}
