//! Drill discovery and per-view dispatch.
//!
//! Discovery is an explicit initialization phase: it takes a snapshot of a
//! lesson's drill containers and returns independent grader handles, one per
//! container. It can run any number of times (each page view gets its own
//! set). Internally one initializer per kind re-scans the snapshot for
//! containers of its own kind; kinds are mutually exclusive by construction,
//! so every container ends up with exactly one grader. The initializers
//! share no mutable state.

use std::collections::HashMap;
use std::time::Instant;

use tracing::debug;

use crate::blanks::{BlankGrader, BlankReport};
use crate::choice::{ChoiceGrader, ChoiceReport};
use crate::config::Messages;
use crate::domain::{Drill, DrillBody, DrillKind, Lesson};
use crate::matching::{DropOutcome, MatchGrader};

/// One grader instance, owning the grading state for one drill container.
pub enum Grader {
  Blanks(BlankGrader),
  Choice(ChoiceGrader),
  Match(MatchGrader),
}

impl Grader {
  #[allow(dead_code)]
  pub fn kind(&self) -> DrillKind {
    match self {
      Grader::Blanks(_) => DrillKind::FillInTheBlank,
      Grader::Choice(_) => DrillKind::MultipleChoice,
      Grader::Match(_) => DrillKind::DragMatch,
    }
  }
}

/// Snapshot the lesson's containers and wire a grader to each.
/// Zero containers of a kind is valid and yields nothing for that kind.
pub fn discover(lesson: &Lesson) -> Vec<(String, Grader)> {
  let mut handles = Vec::new();
  handles.extend(init_blank_drills(&lesson.drills));
  handles.extend(init_choice_drills(&lesson.drills));
  handles.extend(init_match_drills(&lesson.drills));
  debug!(target: "drill", lesson = %lesson.id, graders = handles.len(), "Drill discovery complete");
  handles
}

fn init_blank_drills(drills: &[Drill]) -> Vec<(String, Grader)> {
  drills
    .iter()
    .filter_map(|d| match &d.body {
      DrillBody::Blanks { slots } => {
        debug!(target: "drill", id = %d.id, slots = slots.len(), "Wired fill-in-the-blank grader");
        Some((d.id.clone(), Grader::Blanks(BlankGrader::new(slots.clone()))))
      }
      _ => None,
    })
    .collect()
}

fn init_choice_drills(drills: &[Drill]) -> Vec<(String, Grader)> {
  drills
    .iter()
    .filter_map(|d| match &d.body {
      DrillBody::Choice { correct, options, .. } => {
        debug!(target: "drill", id = %d.id, options = options.len(), "Wired multiple-choice grader");
        Some((d.id.clone(), Grader::Choice(ChoiceGrader::new(correct.clone(), options.clone()))))
      }
      _ => None,
    })
    .collect()
}

fn init_match_drills(drills: &[Drill]) -> Vec<(String, Grader)> {
  drills
    .iter()
    .filter_map(|d| match &d.body {
      DrillBody::Match { pairs } => {
        debug!(target: "drill", id = %d.id, pairs = pairs.len(), "Wired drag-and-match grader");
        Some((d.id.clone(), Grader::Match(MatchGrader::new(pairs))))
      }
      _ => None,
    })
    .collect()
}

/// One page view's graders, keyed by container id. Every learner event is
/// dispatched to the single grader owning that container; events naming an
/// unknown container (or a container of another kind) degrade to a no-op.
pub struct DrillSession {
  #[allow(dead_code)]
  pub lesson_id: String,
  graders: HashMap<String, Grader>,
}

impl DrillSession {
  pub fn new(lesson: &Lesson) -> Self {
    Self {
      lesson_id: lesson.id.clone(),
      graders: discover(lesson).into_iter().collect(),
    }
  }

  #[allow(dead_code)]
  pub fn grader_count(&self) -> usize {
    self.graders.len()
  }

  pub fn check_blanks(
    &self,
    drill_id: &str,
    inputs: &HashMap<String, String>,
    msgs: &Messages,
  ) -> Option<BlankReport> {
    match self.graders.get(drill_id) {
      Some(Grader::Blanks(g)) => Some(g.grade(inputs, msgs)),
      _ => None,
    }
  }

  pub fn check_choice(
    &self,
    drill_id: &str,
    selected: Option<&str>,
    msgs: &Messages,
  ) -> Option<ChoiceReport> {
    match self.graders.get(drill_id) {
      Some(Grader::Choice(g)) => Some(g.grade(selected, msgs)),
      _ => None,
    }
  }

  pub fn drag_start(&mut self, drill_id: &str, word: &str) -> Option<bool> {
    match self.graders.get_mut(drill_id) {
      Some(Grader::Match(g)) => Some(g.drag_start(word)),
      _ => None,
    }
  }

  pub fn drag_end(&mut self, drill_id: &str) {
    if let Some(Grader::Match(g)) = self.graders.get_mut(drill_id) {
      g.drag_end();
    }
  }

  pub fn drag_over(&mut self, drill_id: &str, target: &str) -> Option<bool> {
    match self.graders.get_mut(drill_id) {
      Some(Grader::Match(g)) => Some(g.drag_over(target)),
      _ => None,
    }
  }

  pub fn drag_leave(&mut self, drill_id: &str, target: &str) {
    if let Some(Grader::Match(g)) = self.graders.get_mut(drill_id) {
      g.drag_leave(target);
    }
  }

  pub fn handle_drop(
    &mut self,
    drill_id: &str,
    target: &str,
    payload: Option<&str>,
    now: Instant,
    msgs: &Messages,
  ) -> Option<DropOutcome> {
    match self.graders.get_mut(drill_id) {
      Some(Grader::Match(g)) => Some(g.handle_drop(target, payload, now, msgs)),
      _ => None,
    }
  }

  /// Clear expired mismatch flags across every drag-and-match container.
  /// Returns (container id, target id) pairs, sorted for stable output.
  pub fn sweep_expired(&mut self, now: Instant) -> Vec<(String, String)> {
    let mut cleared = Vec::new();
    for (id, grader) in self.graders.iter_mut() {
      if let Grader::Match(g) = grader {
        for target in g.sweep_expired(now) {
          cleared.push((id.clone(), target));
        }
      }
    }
    cleared.sort();
    cleared
  }

  /// Earliest pending mismatch-clear deadline across the whole view.
  pub fn next_deadline(&self) -> Option<Instant> {
    self
      .graders
      .values()
      .filter_map(|g| match g {
        Grader::Match(m) => m.next_deadline(),
        _ => None,
      })
      .min()
  }
}
