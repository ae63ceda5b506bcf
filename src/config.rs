//! Loading lesson configuration (feedback messages + optional lesson bank)
//! from TOML.
//!
//! See `LessonConfig` and `Messages` for expected schema.

use serde::Deserialize;
use tracing::{info, error};

use crate::domain::{ChoiceOption, DrillKind, MatchPair};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct LessonConfig {
  #[serde(default)]
  pub messages: Messages,
  #[serde(default)]
  pub lessons: Vec<LessonCfg>,
}

/// Lesson entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct LessonCfg {
  #[serde(default)] pub id: Option<String>,
  pub unit: u32,
  pub title: String,
  #[serde(default)] pub drills: Vec<DrillCfg>,
}

/// Drill entry accepted in TOML configuration.
/// Only the branch matching `kind` should be filled; the rest stay empty.
#[derive(Clone, Debug, Deserialize)]
pub struct DrillCfg {
  #[serde(default)] pub id: Option<String>,
  pub kind: DrillKind,
  #[serde(default)] pub title: String,
  // fill-in-the-blank
  #[serde(default)] pub blanks: Vec<BlankCfg>,
  // multiple-choice
  #[serde(default)] pub question: Option<String>,
  #[serde(default)] pub correct: Option<String>,
  #[serde(default)] pub options: Vec<ChoiceOption>,
  // drag-match
  #[serde(default)] pub pairs: Vec<MatchPair>,
}

/// One authored blank: prompt text with a `___` marker plus the expected
/// answer (free text; normalized at discovery, not here).
#[derive(Clone, Debug, Deserialize)]
pub struct BlankCfg {
  #[serde(default)] pub id: Option<String>,
  pub prompt: String,
  pub answer: String,
}

/// Feedback message templates used by the graders. Defaults match the shipped
/// frontend; override them in TOML to tune the wording.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Messages {
  // fill-in-the-blank summary + variants
  pub blank_summary: String,
  pub blank_success: String,
  pub blank_retry: String,
  // multiple-choice
  pub choice_select_first: String,
  pub choice_correct: String,
  pub choice_incorrect: String,
  // drag-and-match
  pub match_solved: String,
  pub match_completion: String,
  // progress save guard
  pub progress_sign_in_first: String,
}

impl Default for Messages {
  fn default() -> Self {
    Self {
      blank_summary: "✅ Result: {count} of {total} correct.".into(),
      blank_success: " Excellent work! 🌟".into(),
      blank_retry: " Review the grammar and try again.".into(),
      choice_select_first: "Please select an option before checking.".into(),
      choice_correct: "Correct! 🥳".into(),
      choice_incorrect: "Incorrect. The correct answer is highlighted.".into(),
      match_solved: "✅ {word}".into(),
      match_completion: "Congratulations! You matched all the vocabulary. 🏆".into(),
      progress_sign_in_first: "You must sign in to save your progress.".into(),
    }
  }
}

/// Attempt to load `LessonConfig` from LESSON_CONFIG_PATH. On any parsing/IO
/// error, returns None.
pub fn load_lesson_config_from_env() -> Option<LessonConfig> {
  let path = std::env::var("LESSON_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<LessonConfig>(&s) {
      Ok(cfg) => {
        info!(target: "aprendo_backend", %path, "Loaded lesson config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "aprendo_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "aprendo_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_a_bank_with_all_three_kinds() {
    let cfg: LessonConfig = toml::from_str(
      r#"
      [messages]
      blank_retry = " Try once more."

      [[lessons]]
      unit = 2
      title = "Present simple"

      [[lessons.drills]]
      kind = "fill-in-the-blank"
      title = "Verbs"
      blanks = [{ prompt = "I ___ to school.", answer = "go" }]

      [[lessons.drills]]
      kind = "multiple-choice"
      question = "She ___ tea."
      correct = "b"
      options = [
        { value = "a", text = "drink" },
        { value = "b", text = "drinks" },
      ]

      [[lessons.drills]]
      kind = "drag-match"
      pairs = [{ word = "Teacher", hint = "Works at a school" }]
      "#,
    )
    .expect("config should parse");

    assert_eq!(cfg.messages.blank_retry, " Try once more.");
    // untouched fields keep their defaults
    assert_eq!(cfg.messages.choice_correct, Messages::default().choice_correct);
    assert_eq!(cfg.lessons.len(), 1);
    let drills = &cfg.lessons[0].drills;
    assert_eq!(drills.len(), 3);
    assert_eq!(drills[0].kind, DrillKind::FillInTheBlank);
    assert_eq!(drills[1].correct.as_deref(), Some("b"));
    assert_eq!(drills[2].pairs[0].word, "Teacher");
  }
}
