//! In-memory state: the library, programs, finished sessions and the one
//! session that may be in progress.

use thiserror::Error;
use tracing::info;

use crate::models::{
    ExerciseId, ExerciseInstance, LibraryExercise, Program, SetRecord, WorkoutSession,
};
use crate::stats::{self, ExerciseStats};
use crate::types::ExerciseType;
use crate::warmup::{self, WarmupError};

#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("a session is already in progress (started {0})")]
    SessionActive(i64),

    #[error("no session in progress")]
    NoActiveSession,

    #[error("no program `{0}`")]
    UnknownProgram(String),

    #[error("program `{program}` has no session #{index}")]
    UnknownProgramSession { program: String, index: usize },

    #[error("no exercise at position {0} in the current session")]
    UnknownSlot(usize),

    #[error("no set #{set} for exercise at position {slot}")]
    UnknownSet { slot: usize, set: usize },

    #[error(transparent)]
    Warmup(#[from] WarmupError),
}

/// Values of one logged set.
#[derive(Debug, Clone, Default)]
pub struct SetEntry {
    pub weight: String,
    pub reps: String,
    pub rir: Option<String>,
    pub notes: Option<String>,
    pub is_warmup: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tracker {
    pub library: Vec<LibraryExercise>,
    pub programs: Vec<Program>,
    pub history: Vec<WorkoutSession>,
    pub current: Option<WorkoutSession>,
}

impl Tracker {
    /// Library entry for `id`. History may reference entries that were
    /// deleted since, so callers must handle `None`.
    pub fn exercise(&self, id: &ExerciseId) -> Option<&LibraryExercise> {
        self.library.iter().find(|e| &e.id == id)
    }

    pub fn exercise_name(&self, id: &ExerciseId) -> String {
        self.exercise(id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| format!("Unknown ID: {id}"))
    }

    pub fn exercise_kind(&self, id: &ExerciseId) -> ExerciseType {
        self.exercise(id).map(|e| e.kind).unwrap_or_default()
    }

    /// Library entries offered for new work: archived ones stay resolvable
    /// from history but are not listed.
    pub fn visible_exercises(&self) -> impl Iterator<Item = &LibraryExercise> {
        self.library.iter().filter(|e| !e.is_archived)
    }

    /// Resolves a 1-based position in the visible list, or an exact name.
    pub fn find_exercise(&self, needle: &str) -> Option<&LibraryExercise> {
        if let Ok(idx) = needle.parse::<usize>() {
            return idx.checked_sub(1).and_then(|i| self.visible_exercises().nth(i));
        }
        self.library
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(needle.trim()))
    }

    pub fn find_program(&self, needle: &str) -> Option<&Program> {
        if let Ok(idx) = needle.parse::<usize>() {
            return idx.checked_sub(1).and_then(|i| self.programs.get(i));
        }
        self.programs
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(needle.trim()) || p.id == needle)
    }

    /// Next free library id: one past the highest numeric id.
    pub fn next_exercise_id(&self) -> ExerciseId {
        let max = self
            .library
            .iter()
            .filter_map(|e| e.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        ExerciseId::from(max + 1)
    }

    /// Finished sessions, newest first.
    pub fn history_sorted(&self) -> Vec<&WorkoutSession> {
        let mut sessions: Vec<&WorkoutSession> = self.history.iter().collect();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)));
        sessions
    }

    pub fn stats(&self, id: &ExerciseId) -> ExerciseStats {
        stats::exercise_stats(id, &self.history, self.exercise_kind(id))
    }

    fn ensure_idle(&self) -> Result<(), TrackerError> {
        match &self.current {
            Some(s) => Err(TrackerError::SessionActive(s.start_time)),
            None => Ok(()),
        }
    }

    /// Starts session `session_idx` (0-based) of a program. Prescriptions are
    /// copied so later program edits leave this session alone.
    pub fn start_program_session(
        &mut self,
        program: &str,
        session_idx: usize,
        now: i64,
    ) -> Result<&WorkoutSession, TrackerError> {
        self.ensure_idle()?;

        let program = self
            .find_program(program)
            .ok_or_else(|| TrackerError::UnknownProgram(program.to_string()))?;
        let template = program.sessions.get(session_idx).ok_or_else(|| {
            TrackerError::UnknownProgramSession {
                program: program.name.clone(),
                index: session_idx + 1,
            }
        })?;

        let exercises = template
            .exercises
            .iter()
            .map(|p| ExerciseInstance {
                exercise_id: p.exercise_id.clone(),
                sets: (0..p.sets).map(|_| SetRecord::default()).collect(),
                target_reps: p.reps.clone(),
                rest: p.rest,
                target_rir: p.target_rir.clone(),
                notes: String::new(),
                is_bonus: false,
            })
            .collect();

        let session = WorkoutSession {
            id: now,
            program_name: program.name.clone(),
            session_name: template.name.clone(),
            start_time: now,
            exercises,
            ..Default::default()
        };

        info!(program = %session.program_name, session = %session.session_name, "session started");
        Ok(self.current.insert(session))
    }

    pub fn start_adhoc(&mut self, name: &str, now: i64) -> Result<&WorkoutSession, TrackerError> {
        self.ensure_idle()?;
        let session = WorkoutSession {
            id: now,
            program_name: "Libre".to_string(),
            session_name: name.to_string(),
            start_time: now,
            ..Default::default()
        };
        info!(session = %session.session_name, "ad hoc session started");
        Ok(self.current.insert(session))
    }

    fn current_mut(&mut self) -> Result<&mut WorkoutSession, TrackerError> {
        self.current.as_mut().ok_or(TrackerError::NoActiveSession)
    }

    fn slot_mut(&mut self, slot: usize) -> Result<&mut ExerciseInstance, TrackerError> {
        self.current_mut()?
            .exercises
            .get_mut(slot.wrapping_sub(1))
            .ok_or(TrackerError::UnknownSlot(slot))
    }

    /// Adds an exercise to the running session, flagged as a bonus.
    pub fn add_exercise(&mut self, id: ExerciseId, sets: u32) -> Result<usize, TrackerError> {
        let session = self.current_mut()?;
        session.exercises.push(ExerciseInstance {
            sets: (0..sets).map(|_| SetRecord::default()).collect(),
            is_bonus: true,
            ..ExerciseInstance::new(id)
        });
        Ok(session.exercises.len())
    }

    /// Records a set for the exercise at 1-based `slot`. Without `set`, the
    /// first set not yet done is filled, or a new one is appended.
    pub fn log_set(
        &mut self,
        slot: usize,
        set: Option<usize>,
        entry: SetEntry,
        now: i64,
    ) -> Result<(usize, &SetRecord), TrackerError> {
        let instance = self.slot_mut(slot)?;

        let idx = match set {
            Some(n) => {
                let idx = n.wrapping_sub(1);
                if idx > instance.sets.len() {
                    return Err(TrackerError::UnknownSet { slot, set: n });
                }
                idx
            }
            None => instance
                .sets
                .iter()
                .position(|s| !s.done)
                .unwrap_or(instance.sets.len()),
        };
        if idx == instance.sets.len() {
            instance.sets.push(SetRecord::default());
        }

        let record = &mut instance.sets[idx];
        record.weight = entry.weight;
        record.reps = entry.reps;
        record.rir = entry.rir.filter(|r| !r.is_empty());
        record.notes = entry.notes.filter(|n| !n.is_empty());
        record.is_warmup = entry.is_warmup;
        record.done = true;
        record.completed_at = Some(now);

        Ok((idx + 1, &instance.sets[idx]))
    }

    /// Prepends a warm-up ramp to the exercise at 1-based `slot`.
    pub fn add_warmup(&mut self, slot: usize, count: usize) -> Result<usize, TrackerError> {
        let id = self
            .current
            .as_ref()
            .and_then(|s| s.exercises.get(slot.wrapping_sub(1)))
            .map(|e| e.exercise_id.clone())
            .ok_or(if self.current.is_some() {
                TrackerError::UnknownSlot(slot)
            } else {
                TrackerError::NoActiveSession
            })?;
        let stats = self.stats(&id);
        let instance = self.slot_mut(slot)?;
        Ok(warmup::add_warmup(instance, &stats, count)?)
    }

    /// Closes the running session and files it into history.
    pub fn finish(
        &mut self,
        body_weight: Option<String>,
        fatigue: Option<String>,
        now: i64,
    ) -> Result<&WorkoutSession, TrackerError> {
        let mut session = self.current.take().ok_or(TrackerError::NoActiveSession)?;
        session.end_time = Some(now);
        if body_weight.is_some() {
            session.body_weight = body_weight;
        }
        if fatigue.is_some() {
            session.fatigue = fatigue;
        }
        info!(id = session.id, "session finished");
        self.history.push(session);
        Ok(&self.history[self.history.len() - 1])
    }

    /// Drops the running session without keeping it.
    pub fn cancel(&mut self) -> Result<WorkoutSession, TrackerError> {
        let session = self.current.take().ok_or(TrackerError::NoActiveSession)?;
        info!(id = session.id, "session cancelled");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProgramExercise, ProgramSession};
    use pretty_assertions::assert_eq;

    fn tracker() -> Tracker {
        Tracker {
            library: vec![
                LibraryExercise {
                    id: ExerciseId::from(1),
                    name: "Squat".into(),
                    kind: ExerciseType::Polyarticulaire,
                    ..Default::default()
                },
                LibraryExercise {
                    id: ExerciseId::from(2),
                    name: "Leg extension".into(),
                    is_archived: true,
                    ..Default::default()
                },
            ],
            programs: vec![Program {
                id: "p1".into(),
                name: "Force".into(),
                sessions: vec![ProgramSession {
                    name: "Jambes".into(),
                    exercises: vec![ProgramExercise {
                        exercise_id: ExerciseId::from(1),
                        sets: 3,
                        reps: "5".into(),
                        rest: 180,
                        target_rir: Some("2".into()),
                    }],
                }],
            }],
            ..Default::default()
        }
    }

    fn entry(weight: &str, reps: &str) -> SetEntry {
        SetEntry {
            weight: weight.into(),
            reps: reps.into(),
            ..Default::default()
        }
    }

    #[test]
    fn lookup_tolerates_missing_entries() {
        let t = tracker();
        assert!(t.exercise(&ExerciseId::from(2)).is_some());
        assert!(t.exercise(&ExerciseId::from(42)).is_none());
        assert_eq!(t.exercise_name(&ExerciseId::from(42)), "Unknown ID: 42");
        assert_eq!(t.visible_exercises().count(), 1);
        assert_eq!(t.next_exercise_id(), ExerciseId::from(3));
    }

    #[test]
    fn program_session_is_a_copy() {
        let mut t = tracker();
        t.start_program_session("force", 0, 1_000).unwrap();
        t.programs[0].sessions[0].exercises[0].reps = "3".into();

        let current = t.current.as_ref().unwrap();
        assert_eq!(current.exercises[0].target_reps, "5");
        assert_eq!(current.exercises[0].sets.len(), 3);
        assert_eq!(current.session_name, "Jambes");
        assert_eq!(current.id, 1_000);
    }

    #[test]
    fn only_one_session_at_a_time() {
        let mut t = tracker();
        t.start_adhoc("Bras", 1).unwrap();
        assert_eq!(t.start_adhoc("Bras", 2).unwrap_err(), TrackerError::SessionActive(1));
        assert_eq!(
            t.start_program_session("Force", 0, 3).unwrap_err(),
            TrackerError::SessionActive(1)
        );
    }

    #[test]
    fn unknown_program_or_session() {
        let mut t = tracker();
        assert_eq!(
            t.start_program_session("Nope", 0, 1).unwrap_err(),
            TrackerError::UnknownProgram("Nope".into())
        );
        assert!(matches!(
            t.start_program_session("Force", 4, 1),
            Err(TrackerError::UnknownProgramSession { index: 5, .. })
        ));
        assert!(t.current.is_none());
    }

    #[test]
    fn log_fills_next_open_set() {
        let mut t = tracker();
        t.start_program_session("1", 0, 0).unwrap();
        let (n, _) = t.log_set(1, None, entry("100", "5"), 10).unwrap();
        assert_eq!(n, 1);
        let (n, set) = t.log_set(1, None, entry("100", "4"), 20).unwrap();
        assert_eq!(n, 2);
        assert!(set.done);
        assert_eq!(set.completed_at, Some(20));

        let (n, _) = t.log_set(1, Some(1), entry("105", "5"), 30).unwrap();
        assert_eq!(n, 1);
        assert_eq!(t.current.as_ref().unwrap().exercises[0].sets[0].weight, "105");

        assert_eq!(t.log_set(2, None, entry("1", "1"), 0).unwrap_err(), TrackerError::UnknownSlot(2));
        assert_eq!(
            t.log_set(1, Some(9), entry("1", "1"), 0).unwrap_err(),
            TrackerError::UnknownSet { slot: 1, set: 9 }
        );
    }

    #[test]
    fn finish_moves_to_history() {
        let mut t = tracker();
        t.start_adhoc("Full body", 100).unwrap();
        t.add_exercise(ExerciseId::from(1), 0).unwrap();
        t.log_set(1, None, entry("60", "10"), 150).unwrap();
        let finished = t.finish(Some("80".into()), None, 200).unwrap();
        assert_eq!(finished.end_time, Some(200));
        assert!(finished.exercises[0].is_bonus);
        assert!(t.current.is_none());
        assert_eq!(t.history.len(), 1);
        assert_eq!(t.stats(&ExerciseId::from(1)).last_session, "60 x 10");
    }

    #[test]
    fn cancel_discards() {
        let mut t = tracker();
        t.start_adhoc("x", 1).unwrap();
        t.cancel().unwrap();
        assert!(t.current.is_none());
        assert!(t.history.is_empty());
        assert_eq!(t.cancel().unwrap_err(), TrackerError::NoActiveSession);
        assert_eq!(t.finish(None, None, 2).unwrap_err(), TrackerError::NoActiveSession);
    }

    #[test]
    fn warmup_needs_a_base_weight() {
        let mut t = tracker();
        t.start_program_session("Force", 0, 0).unwrap();
        assert_eq!(
            t.add_warmup(1, 3).unwrap_err(),
            TrackerError::Warmup(WarmupError::NoBaseWeight)
        );
        t.log_set(1, None, entry("100", "5"), 1).unwrap();
        assert_eq!(t.add_warmup(1, 3).unwrap(), 3);
        let sets = &t.current.as_ref().unwrap().exercises[0].sets;
        assert_eq!(sets.len(), 6);
        assert_eq!(sets[2].weight, "90");
        assert!(sets[3].done);
    }
}
