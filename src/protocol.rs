//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Lesson DTOs deliberately withhold the answer keys (expected answers,
//! correct-option ids, word↔target pairings): grading state lives with the
//! graders, and draggable words are shuffled per serving so authoring order
//! reveals nothing.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::blanks::BlankReport;
use crate::choice::ChoiceReport;
use crate::config::Messages;
use crate::domain::{ChoiceOption, Drill, DrillBody, DrillKind, Lesson, Progress};
use crate::feedback::{match_completion, Feedback};
use crate::matching::{target_id, DropOutcome};

/// Messages the client can send over WebSocket. Apart from the account and
/// progress messages these are the learner-triggered events of the page:
/// one check click or drag event per message.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    OpenLesson {
        unit: Option<u32>,
    },
    CheckBlanks {
        #[serde(rename = "drillId")]
        drill_id: String,
        inputs: HashMap<String, String>,
    },
    CheckChoice {
        #[serde(rename = "drillId")]
        drill_id: String,
        selected: Option<String>,
    },
    DragStart {
        #[serde(rename = "drillId")]
        drill_id: String,
        word: String,
    },
    DragEnd {
        #[serde(rename = "drillId")]
        drill_id: String,
    },
    DragOver {
        #[serde(rename = "drillId")]
        drill_id: String,
        target: String,
    },
    DragLeave {
        #[serde(rename = "drillId")]
        drill_id: String,
        target: String,
    },
    Drop {
        #[serde(rename = "drillId")]
        drill_id: String,
        target: String,
        word: Option<String>,
    },
    Register {
        email: String,
        password: String,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    LoadProgress,
    SaveProgress {
        unit: u32,
        exercise: u32,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Lesson {
        lesson: LessonOut,
    },
    BlankResult {
        #[serde(rename = "drillId")]
        drill_id: String,
        result: BlankReport,
    },
    ChoiceResult {
        #[serde(rename = "drillId")]
        drill_id: String,
        result: ChoiceReport,
    },
    DragStarted {
        #[serde(rename = "drillId")]
        drill_id: String,
        word: String,
        available: bool,
    },
    DragEnded {
        #[serde(rename = "drillId")]
        drill_id: String,
    },
    DragOverResult {
        #[serde(rename = "drillId")]
        drill_id: String,
        target: String,
        droppable: bool,
    },
    DragLeft {
        #[serde(rename = "drillId")]
        drill_id: String,
        target: String,
    },
    DropResult {
        #[serde(rename = "drillId")]
        drill_id: String,
        target: String,
        #[serde(flatten)]
        outcome: DropOut,
    },
    /// Pushed when a transient mismatch flag self-clears.
    MatchFlagCleared {
        #[serde(rename = "drillId")]
        drill_id: String,
        target: String,
    },
    SignedIn {
        uid: String,
        email: String,
    },
    SignedOut,
    Progress {
        progress: Option<Progress>,
    },
    ProgressSaved {
        unit: u32,
        exercise: u32,
    },
    Notice {
        feedback: Feedback,
    },
    Error {
        message: String,
    },
}

/// Public outcome of a drop, flattened into `DropResult`.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOut {
    Ignored,
    Solved {
        word: String,
        rendered: String,
        #[serde(rename = "solvedCount")]
        solved_count: usize,
        total: usize,
        /// Present exactly once per container: on the final transition.
        completion: Option<Feedback>,
    },
    Mismatch,
}

/// Project the grader-side drop outcome onto the wire, attaching the
/// one-time completion notification when this drop finished the container.
pub fn to_drop_out(outcome: DropOutcome, msgs: &Messages) -> DropOut {
    match outcome {
        DropOutcome::Ignored => DropOut::Ignored,
        DropOutcome::Solved { word, rendered, solved_count, total, completed } => DropOut::Solved {
            word,
            rendered,
            solved_count,
            total,
            completion: completed.then(|| match_completion(msgs)),
        },
        DropOutcome::Mismatch { .. } => DropOut::Mismatch,
    }
}

//
// Lesson DTOs
//

#[derive(Debug, Serialize)]
pub struct LessonOut {
    pub id: String,
    pub unit: u32,
    pub title: String,
    pub drills: Vec<DrillOut>,
}

#[derive(Debug, Serialize)]
pub struct DrillOut {
    pub id: String,
    pub kind: DrillKind,
    pub title: String,
    #[serde(flatten)]
    pub body: DrillBodyOut,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DrillBodyOut {
    Blanks { blanks: Vec<BlankOut> },
    Choice { question: String, options: Vec<ChoiceOption> },
    Match { words: Vec<String>, targets: Vec<TargetOut> },
}

#[derive(Debug, Serialize)]
pub struct BlankOut {
    pub id: String,
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct TargetOut {
    pub id: String,
    pub hint: String,
}

/// Convert full `Lesson` (internal) to the public DTO.
pub fn to_out(l: &Lesson) -> LessonOut {
    LessonOut {
        id: l.id.clone(),
        unit: l.unit,
        title: l.title.clone(),
        drills: l.drills.iter().map(drill_to_out).collect(),
    }
}

fn drill_to_out(d: &Drill) -> DrillOut {
    let body = match &d.body {
        DrillBody::Blanks { slots } => DrillBodyOut::Blanks {
            blanks: slots
                .iter()
                .map(|s| BlankOut { id: s.id.clone(), prompt: s.prompt.clone() })
                .collect(),
        },
        DrillBody::Choice { question, options, .. } => DrillBodyOut::Choice {
            question: question.clone(),
            options: options.clone(),
        },
        DrillBody::Match { pairs } => {
            let mut words: Vec<String> = pairs.iter().map(|p| p.word.clone()).collect();
            words.shuffle(&mut rand::thread_rng());
            DrillBodyOut::Match {
                words,
                targets: pairs
                    .iter()
                    .enumerate()
                    .map(|(i, p)| TargetOut { id: target_id(i), hint: p.hint.clone() })
                    .collect(),
            }
        }
    };
    DrillOut { id: d.id.clone(), kind: d.kind(), title: d.title.clone(), body }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct LessonQuery {
    pub unit: Option<u32>,
}

#[derive(Deserialize)]
pub struct BlanksCheckIn {
    #[serde(rename = "lessonId")]
    pub lesson_id: String,
    #[serde(rename = "drillId")]
    pub drill_id: String,
    pub inputs: HashMap<String, String>,
}

#[derive(Deserialize)]
pub struct ChoiceCheckIn {
    #[serde(rename = "lessonId")]
    pub lesson_id: String,
    #[serde(rename = "drillId")]
    pub drill_id: String,
    pub selected: Option<String>,
}

#[derive(Deserialize)]
pub struct AuthIn {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthOut {
    pub uid: String,
    pub email: String,
    #[serde(rename = "idToken")]
    pub id_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub uid: String,
}

#[derive(Deserialize)]
pub struct ProgressSaveIn {
    pub uid: String,
    #[serde(rename = "idToken")]
    pub id_token: String,
    pub unit: u32,
    pub exercise: u32,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::seed_lessons;

    #[test]
    fn lesson_dto_withholds_answer_keys() {
        let lesson = &seed_lessons()[0];
        let json = serde_json::to_string(&to_out(lesson)).expect("serialize");

        // blank keys and the correct-option id never reach the client
        assert!(!json.contains("\"expected\""));
        assert!(!json.contains("\"correct\""));
        // match targets are opaque ids + hints, never the required word
        assert!(json.contains("\"t1\""));
        assert!(json.contains("Explains lessons"));

        assert!(json.contains("\"words\""));
        assert!(json.contains("Teacher"));
    }

    #[test]
    fn client_messages_parse_with_camel_case_ids() {
        let msg: ClientWsMessage = serde_json::from_str(
            r#"{"type":"check_blanks","drillId":"d1","inputs":{"b1":"go"}}"#,
        )
        .expect("parse");
        match msg {
            ClientWsMessage::CheckBlanks { drill_id, inputs } => {
                assert_eq!(drill_id, "d1");
                assert_eq!(inputs.get("b1").map(String::as_str), Some("go"));
            }
            other => panic!("wrong variant: {:?}", other),
        }

        let msg: ClientWsMessage =
            serde_json::from_str(r#"{"type":"drop","drillId":"d3","target":"t2","word":null}"#)
                .expect("parse");
        assert!(matches!(msg, ClientWsMessage::Drop { word: None, .. }));
    }

    #[test]
    fn drop_result_carries_completion_only_when_finished() {
        let msgs = Messages::default();
        let solved = to_drop_out(
            DropOutcome::Solved {
                word: "Teacher".into(),
                rendered: "✅ Teacher".into(),
                solved_count: 1,
                total: 2,
                completed: false,
            },
            &msgs,
        );
        match solved {
            DropOut::Solved { completion, .. } => assert!(completion.is_none()),
            other => panic!("wrong variant: {:?}", other),
        }

        let done = to_drop_out(
            DropOutcome::Solved {
                word: "Doctor".into(),
                rendered: "✅ Doctor".into(),
                solved_count: 2,
                total: 2,
                completed: true,
            },
            &msgs,
        );
        match done {
            DropOut::Solved { completion, .. } => assert!(completion.is_some()),
            other => panic!("wrong variant: {:?}", other),
        }
    }
}
