//! Seed data: a built-in lesson that guarantees the app is useful even
//! without an external lesson bank.

use uuid::Uuid;

use crate::domain::{
  BlankSlot, ChoiceOption, Drill, DrillBody, Lesson, LessonSource, MatchPair,
};

/// Minimal built-in lesson covering all three drill kinds.
pub fn seed_lessons() -> Vec<Lesson> {
  vec![Lesson {
    id: "l-unit1-irregular-verbs".into(),
    unit: 1,
    title: "Unit 1 · Irregular verbs and jobs".into(),
    source: LessonSource::Seed,
    drills: vec![
      Drill {
        id: "d-blanks-go".into(),
        title: "Complete with the right form of 'to go'".into(),
        body: DrillBody::Blanks {
          slots: vec![
            BlankSlot::new("b1", "I ___ to school every day.", "go"),
            BlankSlot::new("b2", "Yesterday she ___ to the park.", "went"),
            BlankSlot::new("b3", "He has ___ home already.", "gone"),
          ],
        },
      },
      Drill {
        id: "d-choice-past".into(),
        title: "Choose the correct past form".into(),
        body: DrillBody::Choice {
          question: "Last night we ___ a great film.".into(),
          correct: "b".into(),
          options: vec![
            ChoiceOption { value: "a".into(), text: "see".into() },
            ChoiceOption { value: "b".into(), text: "saw".into() },
            ChoiceOption { value: "c".into(), text: "seen".into() },
          ],
        },
      },
      Drill {
        id: "d-match-jobs".into(),
        title: "Match the job to its description".into(),
        body: DrillBody::Match {
          pairs: vec![
            MatchPair { word: "Teacher".into(), hint: "Explains lessons at a school".into() },
            MatchPair { word: "Doctor".into(), hint: "Takes care of sick people".into() },
            MatchPair { word: "Cook".into(), hint: "Prepares food in a kitchen".into() },
          ],
        },
      },
    ],
  }]
}

/// Absolute last-resort fallback: if all stores are empty, we inject this.
pub fn hard_fallback_lesson(unit: u32) -> Lesson {
  Lesson {
    id: Uuid::new_v4().to_string(),
    unit,
    title: "Quick practice".into(),
    source: LessonSource::Seed,
    drills: vec![Drill {
      id: "d-blanks-be".into(),
      title: "Complete with 'to be'".into(),
      body: DrillBody::Blanks {
        slots: vec![BlankSlot::new("b1", "He ___ a teacher.", "is")],
      },
    }],
  }
}
