//! Multiple-choice grader.
//!
//! The correct-option identifier is read once at wiring time and never
//! changes for the container's lifetime. Every check is reset-then-recompute:
//! the report carries the complete highlight set, replacing whatever the
//! previous check produced, so repeated checks with the same selection always
//! converge on the same end state.

use serde::Serialize;

use crate::config::Messages;
use crate::domain::ChoiceOption;
use crate::feedback::{choice_correct, choice_incorrect, choice_select_first, Feedback};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
  Correct,
  Incorrect,
}

#[derive(Clone, Debug, Serialize)]
pub struct OptionHighlight {
  pub value: String,
  pub highlight: Highlight,
}

/// Complete outcome of one check action. `highlights` is the full new
/// highlight state of the option group; everything not listed is cleared.
#[derive(Clone, Debug, Serialize)]
pub struct ChoiceReport {
  pub highlights: Vec<OptionHighlight>,
  pub feedback: Feedback,
}

/// Grading state for one multiple-choice container.
#[derive(Clone, Debug)]
pub struct ChoiceGrader {
  correct: String,
  #[allow(dead_code)]
  options: Vec<ChoiceOption>,
}

impl ChoiceGrader {
  pub fn new(correct: impl Into<String>, options: Vec<ChoiceOption>) -> Self {
    Self { correct: correct.into(), options }
  }

  /// Grade the current selection. The option group enforces at-most-one
  /// selection; the grader only ever sees `None` or a single value.
  pub fn grade(&self, selected: Option<&str>, msgs: &Messages) -> ChoiceReport {
    let Some(selected) = selected else {
      // Highlights were reset; nothing else changes on an empty selection.
      return ChoiceReport { highlights: vec![], feedback: choice_select_first(msgs) };
    };

    if selected == self.correct {
      ChoiceReport {
        highlights: vec![OptionHighlight {
          value: selected.to_string(),
          highlight: Highlight::Correct,
        }],
        feedback: choice_correct(msgs),
      }
    } else {
      // Both shown at once: the miss in red, the true answer revealed.
      ChoiceReport {
        highlights: vec![
          OptionHighlight { value: selected.to_string(), highlight: Highlight::Incorrect },
          OptionHighlight { value: self.correct.clone(), highlight: Highlight::Correct },
        ],
        feedback: choice_incorrect(msgs),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::feedback::FeedbackTone;

  fn abc_grader() -> ChoiceGrader {
    ChoiceGrader::new(
      "b",
      vec![
        ChoiceOption { value: "a".into(), text: "see".into() },
        ChoiceOption { value: "b".into(), text: "saw".into() },
        ChoiceOption { value: "c".into(), text: "seen".into() },
      ],
    )
  }

  #[test]
  fn no_selection_warns_and_clears_highlights() {
    let report = abc_grader().grade(None, &Messages::default());
    assert!(report.highlights.is_empty());
    assert_eq!(report.feedback.tone, FeedbackTone::Warning);
  }

  #[test]
  fn correct_selection_highlights_only_itself() {
    let report = abc_grader().grade(Some("b"), &Messages::default());
    assert_eq!(report.highlights.len(), 1);
    assert_eq!(report.highlights[0].value, "b");
    assert_eq!(report.highlights[0].highlight, Highlight::Correct);
    assert_eq!(report.feedback.tone, FeedbackTone::Success);
  }

  #[test]
  fn wrong_selection_reveals_the_true_answer_simultaneously() {
    let report = abc_grader().grade(Some("c"), &Messages::default());
    assert_eq!(report.highlights.len(), 2);
    assert_eq!(report.highlights[0].value, "c");
    assert_eq!(report.highlights[0].highlight, Highlight::Incorrect);
    assert_eq!(report.highlights[1].value, "b");
    assert_eq!(report.highlights[1].highlight, Highlight::Correct);
    assert_eq!(report.feedback.tone, FeedbackTone::Reveal);
  }

  #[test]
  fn rechecking_the_same_selection_is_idempotent() {
    let grader = abc_grader();
    let msgs = Messages::default();
    let a = grader.grade(Some("c"), &msgs);
    let b = grader.grade(Some("c"), &msgs);
    assert_eq!(a.highlights.len(), b.highlights.len());
    assert_eq!(a.feedback.text, b.feedback.text);
  }
}
