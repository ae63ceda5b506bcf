//! Application state: in-memory lesson stores, feedback messages, and the
//! optional remote collaborators.
//!
//! This module owns:
//!   - lesson stores (by id, by unit)
//!   - the feedback `Messages` templates (from TOML or defaults)
//!   - optional auth / progress-store clients
//!
//! Lessons come from the TOML bank when provided, with built-in seeds always
//! available underneath; seeds never overwrite bank ids.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use crate::auth::AuthClient;
use crate::config::{load_lesson_config_from_env, DrillCfg, LessonCfg, Messages};
use crate::domain::{BlankSlot, Drill, DrillBody, DrillKind, Lesson, LessonSource};
use crate::progress::ProgressStore;
use crate::seeds::{hard_fallback_lesson, seed_lessons};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub by_id: Arc<RwLock<HashMap<String, Lesson>>>,
    pub by_unit: Arc<RwLock<HashMap<u32, Vec<String>>>>,
    pub messages: Messages,
    pub auth: Option<AuthClient>,
    pub progress: Option<ProgressStore>,
}

impl AppState {
    /// Build state from env: load config, seed lessons, build indices,
    /// init the remote collaborators.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg_opt = load_lesson_config_from_env();
        let messages = cfg_opt
            .as_ref()
            .map(|c| c.messages.clone())
            .unwrap_or_default();

        let mut id_map = HashMap::<String, Lesson>::new();
        let mut unit_map = HashMap::<u32, Vec<String>>::new();

        // Insert bank lessons (if any), validating each drill entry.
        if let Some(cfg) = &cfg_opt {
            for lc in &cfg.lessons {
                let lesson = lesson_from_cfg(lc);
                if lesson.drills.is_empty() {
                    error!(target: "drill", id = %lesson.id, unit = lesson.unit, "Skipping bank lesson: no valid drills.");
                    continue;
                }
                unit_map.entry(lesson.unit).or_default().push(lesson.id.clone());
                id_map.insert(lesson.id.clone(), lesson);
            }
        }

        // Always insert built-in seeds, but don't overwrite existing ids.
        for l in seed_lessons() {
            if id_map.contains_key(&l.id) {
                continue;
            }
            unit_map.entry(l.unit).or_default().push(l.id.clone());
            id_map.insert(l.id.clone(), l);
        }

        // Inventory summary by unit/source.
        let mut count_by_unit: HashMap<u32, (usize, usize)> = HashMap::new();
        for l in id_map.values() {
            let entry = count_by_unit.entry(l.unit).or_insert((0, 0));
            match l.source {
                LessonSource::LocalBank => entry.0 += 1,
                LessonSource::Seed => entry.1 += 1,
            }
        }
        for (unit, (bank, seed)) in count_by_unit {
            info!(target: "drill", unit, local_bank = bank, seed = seed, "Startup lesson inventory");
        }

        let auth = AuthClient::from_env();
        if auth.is_some() {
            info!(target: "aprendo_backend", "Auth service enabled.");
        } else {
            info!(target: "aprendo_backend", "Auth service disabled (no AUTH_API_KEY). Accounts unavailable.");
        }
        let progress = ProgressStore::from_env();
        if progress.is_some() {
            info!(target: "aprendo_backend", "Progress store enabled.");
        } else {
            info!(target: "aprendo_backend", "Progress store disabled (no PROGRESS_BASE_URL). Progress stays local to the page.");
        }

        Self {
            by_id: Arc::new(RwLock::new(id_map)),
            by_unit: Arc::new(RwLock::new(unit_map)),
            messages,
            auth,
            progress,
        }
    }

    /// Insert lesson into stores (by_id and by_unit).
    #[instrument(level = "debug", skip(self, l), fields(id = %l.id))]
    pub async fn insert_lesson(&self, l: Lesson) {
        let mut by_id = self.by_id.write().await;
        let mut by_unit = self.by_unit.write().await;
        by_unit.entry(l.unit).or_default().push(l.id.clone());
        by_id.insert(l.id.clone(), l);
    }

    /// Selection policy: serve a lesson for the requested unit, preferring
    /// bank entries over seeds. An unknown unit falls back to the lowest
    /// available one; an empty store gets the hard fallback.
    #[instrument(level = "info", skip(self))]
    pub async fn choose_lesson(&self, unit: Option<u32>) -> (Lesson, &'static str) {
        let unit = match unit {
            Some(u) => u,
            None => {
                let by_unit = self.by_unit.read().await;
                match by_unit.keys().min().copied() {
                    Some(u) => u,
                    None => 1,
                }
            }
        };

        let ids = { self.by_unit.read().await.get(&unit).cloned() };
        let ids = match ids {
            Some(ids) if !ids.is_empty() => ids,
            _ => {
                // Unknown unit: retry against the lowest one we do have.
                let lowest = { self.by_unit.read().await.keys().min().copied() };
                match lowest {
                    Some(low) if low != unit => {
                        warn!(target: "drill", unit, fallback_unit = low, "Unknown unit; serving lowest available");
                        self.by_unit.read().await.get(&low).cloned().unwrap_or_default()
                    }
                    _ => Vec::new(),
                }
            }
        };

        {
            let by_id = self.by_id.read().await;
            let pick = |src: LessonSource| {
                ids.iter()
                    .filter_map(|id| by_id.get(id))
                    .find(|l| l.source == src)
                    .cloned()
            };
            if let Some(l) = pick(LessonSource::LocalBank) {
                info!(target: "drill", unit, chosen = %l.id, source = "local_bank", "Serving bank lesson");
                return (l, "local_bank");
            }
            if let Some(l) = pick(LessonSource::Seed) {
                info!(target: "drill", unit, chosen = %l.id, source = "seed", "Serving seed lesson");
                return (l, "seed");
            }
        }

        // Absolute last resort: hard fallback.
        let l = hard_fallback_lesson(unit);
        self.insert_lesson(l.clone()).await;
        warn!(target: "drill", unit, chosen = %l.id, source = "hard_fallback", "Inserted hard fallback lesson");
        (l, "hard_fallback")
    }

    /// Read-only access to a lesson by id.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_lesson(&self, id: &str) -> Option<Lesson> {
        let by_id = self.by_id.read().await;
        by_id.get(id).cloned()
    }
}

fn lesson_from_cfg(lc: &LessonCfg) -> Lesson {
    let id = lc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
    let drills = lc
        .drills
        .iter()
        .enumerate()
        .filter_map(|(i, dc)| drill_from_cfg(&id, i, dc))
        .collect();
    Lesson {
        id,
        unit: lc.unit,
        title: lc.title.clone(),
        source: LessonSource::LocalBank,
        drills,
    }
}

/// Validate one bank drill entry. Entries missing required markup are
/// skipped here with an error log so a malformed drill never reaches a
/// learner.
fn drill_from_cfg(lesson_id: &str, index: usize, dc: &DrillCfg) -> Option<Drill> {
    let id = dc.id.clone().unwrap_or_else(|| format!("{}-d{}", lesson_id, index + 1));
    let body = match dc.kind {
        DrillKind::FillInTheBlank => {
            if dc.blanks.is_empty() {
                error!(target: "drill", %id, "Skipping bank drill: no blanks.");
                return None;
            }
            DrillBody::Blanks {
                slots: dc
                    .blanks
                    .iter()
                    .enumerate()
                    .map(|(i, b)| {
                        let slot_id = b.id.clone().unwrap_or_else(|| format!("b{}", i + 1));
                        BlankSlot::new(slot_id, b.prompt.clone(), &b.answer)
                    })
                    .collect(),
            }
        }
        DrillKind::MultipleChoice => {
            let question = dc.question.clone().unwrap_or_default();
            let correct = dc.correct.clone().unwrap_or_default();
            if question.is_empty() || correct.is_empty() || dc.options.is_empty() {
                error!(target: "drill", %id, "Skipping bank drill: missing question, correct option id, or options.");
                return None;
            }
            DrillBody::Choice { question, correct, options: dc.options.clone() }
        }
        DrillKind::DragMatch => {
            if dc.pairs.is_empty() {
                error!(target: "drill", %id, "Skipping bank drill: no pairs.");
                return None;
            }
            DrillBody::Match { pairs: dc.pairs.clone() }
        }
    };
    Some(Drill { id, title: dc.title.clone(), body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlankCfg;

    fn choice_cfg(correct: Option<&str>) -> DrillCfg {
        DrillCfg {
            id: None,
            kind: DrillKind::MultipleChoice,
            title: String::new(),
            blanks: vec![],
            question: Some("She ___ tea.".into()),
            correct: correct.map(Into::into),
            options: vec![crate::domain::ChoiceOption { value: "a".into(), text: "drinks".into() }],
            pairs: vec![],
        }
    }

    #[test]
    fn bank_drill_without_correct_id_is_skipped() {
        assert!(drill_from_cfg("l1", 0, &choice_cfg(None)).is_none());
        assert!(drill_from_cfg("l1", 0, &choice_cfg(Some("a"))).is_some());
    }

    #[test]
    fn bank_blanks_are_normalized_at_discovery() {
        let dc = DrillCfg {
            id: Some("d1".into()),
            kind: DrillKind::FillInTheBlank,
            title: String::new(),
            blanks: vec![BlankCfg { id: None, prompt: "I ___ home.".into(), answer: " Went ".into() }],
            question: None,
            correct: None,
            options: vec![],
            pairs: vec![],
        };
        let drill = drill_from_cfg("l1", 0, &dc).expect("valid drill");
        match drill.body {
            DrillBody::Blanks { ref slots } => assert_eq!(slots[0].expected, "went"),
            _ => panic!("wrong body"),
        }
    }

    #[tokio::test]
    async fn seeds_are_served_when_no_bank_is_configured() {
        let state = AppState::new();
        let (lesson, origin) = state.choose_lesson(Some(1)).await;
        assert_eq!(lesson.unit, 1);
        assert_eq!(origin, "seed");
        assert!(!lesson.drills.is_empty());
    }

    #[tokio::test]
    async fn unknown_unit_falls_back_to_the_lowest_available() {
        let state = AppState::new();
        let (lesson, _) = state.choose_lesson(Some(99)).await;
        assert_eq!(lesson.unit, 1);
    }
}
