//! Drag-and-match grader.
//!
//! Unlike the other two graders this one is a ratchet, not idempotent: a
//! solved target is permanently locked and its paired draggable permanently
//! leaves the interaction surface. The only transient state is the hover
//! mark while a drag passes over an unsolved target and the per-target
//! mismatch flag, which carries an absolute clear deadline instead of a
//! wall-clock timer so "state after the delay" is a plain function of an
//! injected `Instant`.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::config::Messages;
use crate::domain::MatchPair;
use crate::feedback::solved_confirmation;

/// How long a mismatched drop keeps its incorrect flag before self-clearing.
pub const MISMATCH_CLEAR_DELAY: Duration = Duration::from_millis(500);

/// Stable, pairing-opaque target identity derived from authored order.
/// Shared with the lesson DTO so both sides name the same target.
pub fn target_id(index: usize) -> String {
  format!("t{}", index + 1)
}

struct MatchTarget {
  id: String,
  required: String,
}

/// Outcome of one drop event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropOutcome {
  /// Target already solved or unknown: the drop is a no-op.
  Ignored,
  Solved {
    word: String,
    /// Replacement content for the target: the solved confirmation.
    rendered: String,
    solved_count: usize,
    total: usize,
    /// True exactly when this drop took solved count from total-1 to total.
    completed: bool,
  },
  Mismatch {
    clear_at: Instant,
  },
}

/// Grading state for one drag-and-match container.
pub struct MatchGrader {
  targets: Vec<MatchTarget>,
  words: Vec<String>,
  solved: HashSet<String>,
  hidden: HashSet<String>,
  dragging: Option<String>,
  hover: HashSet<String>,
  mismatch_until: HashMap<String, Instant>,
}

impl MatchGrader {
  /// Wire up one container. Targets take their identity from authored order;
  /// a bijection between words and targets is assumed, not checked.
  pub fn new(pairs: &[MatchPair]) -> Self {
    let targets = pairs
      .iter()
      .enumerate()
      .map(|(i, p)| MatchTarget { id: target_id(i), required: p.word.clone() })
      .collect();
    Self {
      targets,
      words: pairs.iter().map(|p| p.word.clone()).collect(),
      solved: HashSet::new(),
      hidden: HashSet::new(),
      dragging: None,
      hover: HashSet::new(),
      mismatch_until: HashMap::new(),
    }
  }

  pub fn total(&self) -> usize {
    self.targets.len()
  }

  pub fn solved_count(&self) -> usize {
    self.solved.len()
  }

  pub fn is_complete(&self) -> bool {
    self.solved_count() == self.total()
  }

  /// Begin a drag. Returns false when the word is unknown or already matched
  /// away, in which case no drag is in flight.
  pub fn drag_start(&mut self, word: &str) -> bool {
    let available = self.words.iter().any(|w| w == word) && !self.hidden.contains(word);
    self.dragging = available.then(|| word.to_string());
    available
  }

  /// End of the drag lifecycle; clears the in-flight mark unconditionally.
  pub fn drag_end(&mut self) {
    self.dragging = None;
  }

  #[allow(dead_code)]
  pub fn dragging(&self) -> Option<&str> {
    self.dragging.as_deref()
  }

  /// Transient valid-drop-zone mark, only while the target is unsolved.
  pub fn drag_over(&mut self, target: &str) -> bool {
    let droppable =
      self.targets.iter().any(|t| t.id == target) && !self.solved.contains(target);
    if droppable {
      self.hover.insert(target.to_string());
    }
    droppable
  }

  pub fn drag_leave(&mut self, target: &str) {
    self.hover.remove(target);
  }

  #[allow(dead_code)]
  pub fn is_hovered(&self, target: &str) -> bool {
    self.hover.contains(target)
  }

  /// Handle a drop. A solved (or unknown) target ignores it; an empty payload
  /// is a mismatch, not an error; the required token solves the pair for
  /// good. Mismatches only schedule the self-clearing flag.
  pub fn handle_drop(
    &mut self,
    target: &str,
    payload: Option<&str>,
    now: Instant,
    msgs: &Messages,
  ) -> DropOutcome {
    self.hover.remove(target);

    let Some(t) = self.targets.iter().find(|t| t.id == target) else {
      return DropOutcome::Ignored;
    };
    if self.solved.contains(target) {
      return DropOutcome::Ignored;
    }

    match payload {
      Some(word) if !word.is_empty() && word == t.required => {
        let word = word.to_string();
        self.solved.insert(t.id.clone());
        self.hidden.insert(word.clone());
        DropOutcome::Solved {
          rendered: solved_confirmation(msgs, &word),
          word,
          solved_count: self.solved_count(),
          total: self.total(),
          completed: self.is_complete(),
        }
      }
      _ => {
        // Re-flagging an already-flagged target just moves the deadline.
        let clear_at = now + MISMATCH_CLEAR_DELAY;
        self.mismatch_until.insert(target.to_string(), clear_at);
        DropOutcome::Mismatch { clear_at }
      }
    }
  }

  /// Remove and return the mismatch flags whose deadline has passed.
  /// Deterministic under an injected `now`; sorted for stable output.
  pub fn sweep_expired(&mut self, now: Instant) -> Vec<String> {
    let mut cleared: Vec<String> = self
      .mismatch_until
      .iter()
      .filter(|(_, at)| **at <= now)
      .map(|(id, _)| id.clone())
      .collect();
    cleared.sort();
    for id in &cleared {
      self.mismatch_until.remove(id);
    }
    cleared
  }

  /// Earliest pending flag deadline, if any. The serving loop sleeps on this.
  pub fn next_deadline(&self) -> Option<Instant> {
    self.mismatch_until.values().min().copied()
  }

  #[allow(dead_code)]
  pub fn has_mismatch_flag(&self, target: &str) -> bool {
    self.mismatch_until.contains_key(target)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn jobs() -> Vec<MatchPair> {
    vec![
      MatchPair { word: "Teacher".into(), hint: "Explains lessons".into() },
      MatchPair { word: "Doctor".into(), hint: "Heals people".into() },
    ]
  }

  #[test]
  fn matching_drop_is_a_one_way_transition() {
    let mut g = MatchGrader::new(&jobs());
    let msgs = Messages::default();
    let now = Instant::now();

    assert!(g.drag_start("Teacher"));
    let out = g.handle_drop("t1", Some("Teacher"), now, &msgs);
    match out {
      DropOutcome::Solved { ref word, ref rendered, solved_count, total, completed } => {
        assert_eq!(word, "Teacher");
        assert!(rendered.contains("Teacher"));
        assert_eq!((solved_count, total), (1, 2));
        assert!(!completed);
      }
      other => panic!("expected solved, got {:?}", other),
    }

    // solved target rejects everything from now on
    assert_eq!(g.handle_drop("t1", Some("Teacher"), now, &msgs), DropOutcome::Ignored);
    assert_eq!(g.handle_drop("t1", Some("Doctor"), now, &msgs), DropOutcome::Ignored);
    // matched draggable left the surface for good
    assert!(!g.drag_start("Teacher"));
  }

  #[test]
  fn completion_fires_exactly_on_the_last_transition() {
    let mut g = MatchGrader::new(&jobs());
    let msgs = Messages::default();
    let now = Instant::now();

    let first = g.handle_drop("t1", Some("Teacher"), now, &msgs);
    assert!(matches!(first, DropOutcome::Solved { completed: false, .. }));

    let last = g.handle_drop("t2", Some("Doctor"), now, &msgs);
    match last {
      DropOutcome::Solved { solved_count, total, completed, .. } => {
        assert_eq!((solved_count, total), (2, 2));
        assert!(completed);
      }
      other => panic!("expected solved, got {:?}", other),
    }
    assert!(g.is_complete());
  }

  #[test]
  fn mismatch_flags_self_clear_after_the_delay_only() {
    let mut g = MatchGrader::new(&jobs());
    let msgs = Messages::default();
    let now = Instant::now();

    let out = g.handle_drop("t1", Some("Doctor"), now, &msgs);
    assert!(matches!(out, DropOutcome::Mismatch { .. }));
    assert!(g.has_mismatch_flag("t1"));
    assert_eq!(g.solved_count(), 0);
    assert!(g.drag_start("Doctor"), "mismatch must not consume the draggable");

    assert!(g.sweep_expired(now + MISMATCH_CLEAR_DELAY - Duration::from_millis(1)).is_empty());
    assert_eq!(g.sweep_expired(now + MISMATCH_CLEAR_DELAY), vec!["t1".to_string()]);
    assert!(!g.has_mismatch_flag("t1"));
  }

  #[test]
  fn reflagging_before_the_clear_extends_the_deadline() {
    let mut g = MatchGrader::new(&jobs());
    let msgs = Messages::default();
    let now = Instant::now();

    g.handle_drop("t1", Some("Doctor"), now, &msgs);
    g.handle_drop("t1", Some("Doctor"), now + Duration::from_millis(300), &msgs);

    assert!(g.sweep_expired(now + Duration::from_millis(600)).is_empty());
    assert_eq!(
      g.sweep_expired(now + Duration::from_millis(800)),
      vec!["t1".to_string()]
    );
  }

  #[test]
  fn empty_payload_is_a_mismatch_not_an_error() {
    let mut g = MatchGrader::new(&jobs());
    let msgs = Messages::default();
    let now = Instant::now();

    assert!(matches!(g.handle_drop("t1", None, now, &msgs), DropOutcome::Mismatch { .. }));
    assert!(matches!(g.handle_drop("t2", Some(""), now, &msgs), DropOutcome::Mismatch { .. }));
    assert_eq!(g.solved_count(), 0);
  }

  #[test]
  fn hover_marks_only_unsolved_targets_and_clears_on_leave() {
    let mut g = MatchGrader::new(&jobs());
    let msgs = Messages::default();
    let now = Instant::now();

    assert!(g.drag_over("t1"));
    assert!(g.is_hovered("t1"));
    g.drag_leave("t1");
    assert!(!g.is_hovered("t1"));

    g.handle_drop("t1", Some("Teacher"), now, &msgs);
    assert!(!g.drag_over("t1"));
    assert!(!g.is_hovered("t1"));
  }

  #[test]
  fn drag_end_clears_the_in_flight_mark_unconditionally() {
    let mut g = MatchGrader::new(&jobs());
    g.drag_start("Doctor");
    assert_eq!(g.dragging(), Some("Doctor"));
    g.drag_end();
    assert_eq!(g.dragging(), None);
    g.drag_end();
    assert_eq!(g.dragging(), None);
  }
}
