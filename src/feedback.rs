//! Shared feedback contract used by all three graders.
//!
//! Each grader owns one feedback surface per drill container; every grading
//! action produces a complete `Feedback` value that replaces whatever was
//! shown before (no diffing, no attempt history). Text comes from the
//! `Messages` templates so the wording can be tuned in config.

use serde::Serialize;

use crate::config::Messages;
use crate::util::fill_template;

/// How the feedback should read on the learner's side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTone {
  Success,
  Retry,
  Warning,
  Reveal,
  Celebrate,
}

/// One complete feedback surface state.
#[derive(Clone, Debug, Serialize)]
pub struct Feedback {
  pub tone: FeedbackTone,
  pub text: String,
}

/// Count summary for a fill-in-the-blank check. The success variant is
/// appended iff every slot was correct; otherwise the retry variant.
pub fn blank_summary(msgs: &Messages, correct: usize, total: usize) -> Feedback {
  let mut text = fill_template(
    &msgs.blank_summary,
    &[("count", &correct.to_string()), ("total", &total.to_string())],
  );
  if correct == total {
    text.push_str(&msgs.blank_success);
    Feedback { tone: FeedbackTone::Success, text }
  } else {
    text.push_str(&msgs.blank_retry);
    Feedback { tone: FeedbackTone::Retry, text }
  }
}

/// Warning shown when a multiple-choice check runs with nothing selected.
pub fn choice_select_first(msgs: &Messages) -> Feedback {
  Feedback { tone: FeedbackTone::Warning, text: msgs.choice_select_first.clone() }
}

pub fn choice_correct(msgs: &Messages) -> Feedback {
  Feedback { tone: FeedbackTone::Success, text: msgs.choice_correct.clone() }
}

/// Shown alongside the simultaneous incorrect/correct highlights.
pub fn choice_incorrect(msgs: &Messages) -> Feedback {
  Feedback { tone: FeedbackTone::Reveal, text: msgs.choice_incorrect.clone() }
}

/// Rendered into a drop target when a drag delivers its required token.
pub fn solved_confirmation(msgs: &Messages, word: &str) -> String {
  fill_template(&msgs.match_solved, &[("word", word)])
}

/// One-time terminal notification when every pair of a drill is matched.
pub fn match_completion(msgs: &Messages) -> Feedback {
  Feedback { tone: FeedbackTone::Celebrate, text: msgs.match_completion.clone() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn summary_switches_variant_on_full_score() {
    let msgs = Messages::default();
    let partial = blank_summary(&msgs, 2, 3);
    assert_eq!(partial.tone, FeedbackTone::Retry);
    assert!(partial.text.contains("2 of 3 correct"));

    let full = blank_summary(&msgs, 3, 3);
    assert_eq!(full.tone, FeedbackTone::Success);
    assert!(full.text.contains("3 of 3 correct"));
    assert_ne!(partial.text, full.text);
  }

  #[test]
  fn solved_confirmation_contains_word() {
    let msgs = Messages::default();
    assert!(solved_confirmation(&msgs, "Teacher").contains("Teacher"));
  }
}
