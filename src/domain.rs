//! Domain models used by the backend: drill kinds/sources, lesson content,
//! and the per-drill payloads the graders operate on.

use serde::{Deserialize, Serialize};

use crate::util::normalize_answer;

/// What kind of drill does a container hold? Immutable after discovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrillKind {
  /// Static placeholder markers become editable fields, graded against keys.
  FillInTheBlank,
  /// One selected option against one embedded correct-option identifier.
  MultipleChoice,
  /// Draggable word tokens matched onto locked-once-solved drop targets.
  DragMatch,
}

/// Where did we get the lesson from?
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LessonSource {
  LocalBank,   // from user-provided TOML bank
  Seed,  // built-in seeds (last resort)
}

/// One answer slot of a fill-in-the-blank drill. The prompt text carries a
/// `___` placeholder marker where the editable field goes; the expected
/// answer is stored in canonical comparison form (lower-cased, trimmed)
/// exactly once, here, at construction.
#[derive(Clone, Debug, Serialize)]
pub struct BlankSlot {
  pub id: String,
  pub prompt: String,
  pub expected: String,
}

impl BlankSlot {
  pub fn new(id: impl Into<String>, prompt: impl Into<String>, answer: &str) -> Self {
    Self { id: id.into(), prompt: prompt.into(), expected: normalize_answer(answer) }
  }
}

/// One selectable option of a multiple-choice question.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChoiceOption {
  pub value: String,
  pub text: String,
}

/// One draggable/droppable pairing of a drag-and-match drill. The drop
/// target is identified by its required token; a bijection between tokens
/// and targets within a drill is an authoring responsibility.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchPair {
  pub word: String,
  pub hint: String,
}

/// Kind-specific drill payload.
#[derive(Clone, Debug, Serialize)]
pub enum DrillBody {
  Blanks {
    slots: Vec<BlankSlot>,
  },
  Choice {
    question: String,
    correct: String,
    options: Vec<ChoiceOption>,
  },
  Match {
    pairs: Vec<MatchPair>,
  },
}

/// One drill container: a self-contained exercise of a single kind.
#[derive(Clone, Debug, Serialize)]
pub struct Drill {
  pub id: String,
  pub title: String,
  pub body: DrillBody,
}

impl Drill {
  pub fn kind(&self) -> DrillKind {
    match self.body {
      DrillBody::Blanks { .. } => DrillKind::FillInTheBlank,
      DrillBody::Choice { .. } => DrillKind::MultipleChoice,
      DrillBody::Match { .. } => DrillKind::DragMatch,
    }
  }
}

/// One page view's worth of content, persisted in-memory.
#[derive(Clone, Debug, Serialize)]
pub struct Lesson {
  pub id: String,
  pub unit: u32,
  pub title: String,
  pub source: LessonSource,
  pub drills: Vec<Drill>,
}

/// A signed-in learner identity, as returned by the auth collaborator.
/// Passed explicitly to whatever needs it (only the progress-save path);
/// the drill engine never sees it.
#[derive(Clone, Debug, Serialize)]
pub struct Learner {
  pub uid: String,
  pub email: String,
  #[serde(skip_serializing)]
  pub id_token: String,
}

/// A learner's stored unit/exercise progress, the document store's value type.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Progress {
  pub last_unit: u32,
  pub last_exercise: u32,
  #[serde(default)]
  pub score_total: u32,
  /// Stamped by the store on write; absent on documents never saved.
  #[serde(default)]
  pub last_update: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_slot_normalizes_key_once() {
    let slot = BlankSlot::new("b1", "I ___ home.", "  Went ");
    assert_eq!(slot.expected, "went");
  }

  #[test]
  fn drill_kind_follows_body() {
    let d = Drill {
      id: "d1".into(),
      title: "t".into(),
      body: DrillBody::Match { pairs: vec![] },
    };
    assert_eq!(d.kind(), DrillKind::DragMatch);
  }
}
