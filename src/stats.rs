//! Per-exercise statistics derived from workout history.

use itertools::Itertools;
use serde::Serialize;

use crate::models::{ExerciseId, SetRecord, WorkoutSession};
use crate::types::ExerciseType;
use crate::utils::{estimate_1rm_text, format_duration, format_number, parse_duration, parse_number};

/// Placeholder shown when a session has nothing to summarize.
pub const NO_DATA: &str = "-";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestSet {
    pub weight: String,
    pub reps: String,
    pub e1rm: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseStats {
    /// Best estimated 1RM over all sessions; 0 for timed types.
    pub pr: u32,
    /// Heaviest load ever lifted (added load for timed types).
    pub pr_max: f64,
    pub last_session: String,
    pub pr_session: String,
    pub last_session_tonnage: f64,
    pub last_best_set: Option<BestSet>,
}

impl Default for ExerciseStats {
    fn default() -> Self {
        Self {
            pr: 0,
            pr_max: 0.0,
            last_session: NO_DATA.to_string(),
            pr_session: NO_DATA.to_string(),
            last_session_tonnage: 0.0,
            last_best_set: None,
        }
    }
}

/// Completed working sets of `exercise_id` in one session, in logging order.
/// An exercise may appear more than once in a session.
fn counted_sets<'a>(session: &'a WorkoutSession, exercise_id: &'a ExerciseId) -> impl Iterator<Item = &'a SetRecord> {
    session
        .exercises
        .iter()
        .filter(move |e| &e.exercise_id == exercise_id)
        .flat_map(|e| e.sets.iter())
        .filter(|s| s.counts())
}

/// Sessions holding `exercise_id`, newest first. Ties on start time keep
/// the later id first.
pub fn sessions_with<'a>(history: &'a [WorkoutSession], exercise_id: &ExerciseId) -> Vec<&'a WorkoutSession> {
    history
        .iter()
        .filter(|s| s.exercises.iter().any(|e| &e.exercise_id == exercise_id))
        .sorted_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)))
        .collect()
}

/// Scoring used to rank a set: estimated 1RM when meaningful, load otherwise.
fn set_score(set: &SetRecord, kind: ExerciseType) -> f64 {
    if kind.supports_1rm() {
        estimate_1rm_text(&set.weight, &set.reps) as f64
    } else {
        parse_number(&set.weight)
    }
}

/// `"80, 85 x 8, 5 | RIR 2, 1"`, or [`NO_DATA`] for an empty slice.
pub fn format_session_summary(sets: &[&SetRecord], kind: ExerciseType) -> String {
    if sets.is_empty() {
        return NO_DATA.to_string();
    }

    let weights = sets.iter().map(|s| s.weight.trim()).join(", ");
    let reps = sets
        .iter()
        .map(|s| {
            if kind.is_hold() {
                format_duration(parse_duration(&s.reps))
            } else {
                s.reps.trim().to_string()
            }
        })
        .join(", ");

    let mut out = format!("{} x {}", weights, reps);

    // One slot per set so the lists stay aligned; a missing value reads `-`.
    let rirs: Vec<Option<&str>> = sets
        .iter()
        .map(|s| s.rir.as_deref().map(str::trim).filter(|r| !r.is_empty()))
        .collect();
    if rirs.iter().any(Option::is_some) {
        let values = rirs
            .iter()
            .map(|r| match r {
                Some(r) if kind == ExerciseType::Cardio => format_duration(parse_duration(r)),
                Some(r) => r.to_string(),
                None => NO_DATA.to_string(),
            })
            .join(", ");
        if kind == ExerciseType::Cardio {
            out.push_str(&format!(" | {}", values));
        } else {
            out.push_str(&format!(" | RIR {}", values));
        }
    }

    out
}

/// Aggregates records and recent-session summaries for one exercise.
pub fn exercise_stats(exercise_id: &ExerciseId, history: &[WorkoutSession], kind: ExerciseType) -> ExerciseStats {
    let sessions = sessions_with(history, exercise_id);
    let Some(last) = sessions.first() else {
        return ExerciseStats::default();
    };

    let mut stats = ExerciseStats::default();

    // Best session: first strictly greater score in newest-first order wins.
    let mut best: Option<(f64, Vec<&SetRecord>)> = None;

    for session in &sessions {
        let sets: Vec<&SetRecord> = counted_sets(session, exercise_id).collect();
        let mut session_max = f64::NEG_INFINITY;
        for set in &sets {
            if kind.supports_1rm() {
                stats.pr = stats.pr.max(estimate_1rm_text(&set.weight, &set.reps));
            }
            stats.pr_max = stats.pr_max.max(parse_number(&set.weight));
            session_max = session_max.max(set_score(set, kind));
        }

        if sets.is_empty() {
            continue;
        }
        if best.as_ref().is_none_or(|(score, _)| session_max > *score) {
            best = Some((session_max, sets));
        }
    }

    if let Some((_, sets)) = &best {
        stats.pr_session = format_session_summary(sets, kind);
    }

    let last_sets: Vec<&SetRecord> = counted_sets(last, exercise_id).collect();
    stats.last_session = format_session_summary(&last_sets, kind);
    stats.last_session_tonnage = last_sets
        .iter()
        .map(|s| parse_number(&s.weight) * parse_number(&s.reps))
        .sum();

    stats.last_best_set = last_sets
        .iter()
        .map(|s| (estimate_1rm_text(&s.weight, &s.reps), *s))
        .fold(None, |acc: Option<(u32, &SetRecord)>, (e, s)| match acc {
            Some((best, _)) if best >= e => acc,
            _ => Some((e, s)),
        })
        .map(|(e1rm, s)| BestSet {
            weight: s.weight.clone(),
            reps: s.reps.clone(),
            e1rm,
        });

    stats
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrengthRatios {
    pub squat: u32,
    pub bench: u32,
    pub deadlift: u32,
    pub total: u32,
    /// Total divided by body weight; `None` without a usable body weight.
    pub total_ratio: Option<f64>,
    pub squat_ratio: Option<f64>,
    pub bench_ratio: Option<f64>,
    pub deadlift_ratio: Option<f64>,
}

/// Squat/bench/deadlift records and their ratios to body weight.
pub fn strength_ratios(
    history: &[WorkoutSession],
    squat: &ExerciseId,
    bench: &ExerciseId,
    deadlift: &ExerciseId,
    body_weight: f64,
) -> StrengthRatios {
    let pr = |id: &ExerciseId| exercise_stats(id, history, ExerciseType::Polyarticulaire).pr;
    let (squat, bench, deadlift) = (pr(squat), pr(bench), pr(deadlift));
    let total = squat.saturating_add(bench).saturating_add(deadlift);

    let ratio = |v: u32| {
        (body_weight.is_finite() && body_weight > 0.0)
            .then(|| (v as f64 / body_weight * 100.0).round() / 100.0)
    };

    StrengthRatios {
        squat,
        bench,
        deadlift,
        total,
        total_ratio: ratio(total),
        squat_ratio: ratio(squat),
        bench_ratio: ratio(bench),
        deadlift_ratio: ratio(deadlift),
    }
}

/// Most recent body weight recorded on a finished session.
pub fn latest_body_weight(history: &[WorkoutSession]) -> Option<f64> {
    history
        .iter()
        .filter_map(|s| {
            let bw = parse_number(s.body_weight.as_deref()?);
            (bw > 0.0).then_some((s.start_time, bw))
        })
        .max_by_key(|(start, _)| *start)
        .map(|(_, bw)| bw)
}

pub fn format_tonnage(tonnage: f64) -> String {
    format!("{} kg", format_number(tonnage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExerciseInstance;
    use crate::utils::estimate_1rm;
    use pretty_assertions::assert_eq;

    fn done(weight: &str, reps: &str) -> SetRecord {
        SetRecord {
            done: true,
            ..SetRecord::new(weight, reps)
        }
    }

    fn warmup(weight: &str, reps: &str) -> SetRecord {
        SetRecord {
            is_warmup: true,
            ..done(weight, reps)
        }
    }

    fn session(id: i64, exercise: u64, sets: Vec<SetRecord>) -> WorkoutSession {
        WorkoutSession {
            id,
            start_time: id,
            exercises: vec![ExerciseInstance {
                sets,
                ..ExerciseInstance::new(exercise)
            }],
            ..Default::default()
        }
    }

    fn two_sessions() -> Vec<WorkoutSession> {
        vec![
            session(1_000, 1, vec![done("80", "8")]),
            session(2_000, 1, vec![warmup("40", "10"), done("85", "5")]),
        ]
    }

    #[test]
    fn warmups_are_excluded() {
        let stats = exercise_stats(&ExerciseId::from(1), &two_sessions(), ExerciseType::Polyarticulaire);
        assert_eq!(stats.last_session, "85 x 5");
        assert_eq!(stats.pr, estimate_1rm(80.0, 8.0).max(estimate_1rm(85.0, 5.0)));
        assert_eq!(stats.pr, 102);
        assert_eq!(stats.pr_max, 85.0);
        assert_eq!(stats.last_session_tonnage, 425.0);
        assert_eq!(
            stats.last_best_set,
            Some(BestSet {
                weight: "85".into(),
                reps: "5".into(),
                e1rm: 99
            })
        );
        assert_eq!(stats.pr_session, "80 x 8");
    }

    #[test]
    fn order_of_history_does_not_matter() {
        let mut reversed = two_sessions();
        reversed.reverse();
        let a = exercise_stats(&ExerciseId::from(1), &two_sessions(), ExerciseType::Polyarticulaire);
        let b = exercise_stats(&ExerciseId::from(1), &reversed, ExerciseType::Polyarticulaire);
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_exercise_gives_defaults() {
        let stats = exercise_stats(&ExerciseId::from(9), &two_sessions(), ExerciseType::Isolation);
        assert_eq!(stats, ExerciseStats::default());
        assert_eq!(stats.last_session, NO_DATA);
    }

    #[test]
    fn last_session_without_completed_sets() {
        let mut history = two_sessions();
        history.push(session(3_000, 1, vec![SetRecord::new("90", "3")]));
        let stats = exercise_stats(&ExerciseId::from(1), &history, ExerciseType::Polyarticulaire);
        assert_eq!(stats.last_session, NO_DATA);
        assert_eq!(stats.last_session_tonnage, 0.0);
        assert_eq!(stats.last_best_set, None);
        assert_eq!(stats.pr, 102);
    }

    #[test]
    fn rir_segment() {
        let mut a = done("100", "5");
        a.rir = Some("2".into());
        let mut b = done("100", "4");
        b.rir = Some("1".into());
        let history = vec![session(1, 1, vec![a, b])];
        let stats = exercise_stats(&ExerciseId::from(1), &history, ExerciseType::Polyarticulaire);
        assert_eq!(stats.last_session, "100, 100 x 5, 4 | RIR 2, 1");
    }

    #[test]
    fn rir_slots_stay_aligned() {
        let mut b = done("100", "4");
        b.rir = Some("1".into());
        let history = vec![session(1, 1, vec![done("100", "5"), b])];
        let stats = exercise_stats(&ExerciseId::from(1), &history, ExerciseType::Polyarticulaire);
        assert_eq!(stats.last_session, "100, 100 x 5, 4 | RIR -, 1");
    }

    #[test]
    fn hold_reps_are_normalized() {
        let history = vec![session(1, 5, vec![done("0", "90"), done("10", "1:30")])];
        let stats = exercise_stats(&ExerciseId::from(5), &history, ExerciseType::Isometrique);
        assert_eq!(stats.last_session, "0, 10 x 01:30, 01:30");
        assert_eq!(stats.pr, 0);
        assert_eq!(stats.pr_max, 10.0);
    }

    #[test]
    fn cardio_shows_duration() {
        let mut s = done("8", "5");
        s.rir = Some("1800".into());
        let history = vec![session(1, 6, vec![s])];
        let stats = exercise_stats(&ExerciseId::from(6), &history, ExerciseType::Cardio);
        assert_eq!(stats.last_session, "8 x 5 | 30:00");
        assert_eq!(stats.pr, 0);
    }

    #[test]
    fn best_session_uses_load_for_timed_types() {
        let history = vec![
            session(1, 5, vec![done("20", "30")]),
            session(2, 5, vec![done("10", "60")]),
        ];
        let stats = exercise_stats(&ExerciseId::from(5), &history, ExerciseType::Isometrique);
        assert_eq!(stats.pr_session, "20 x 00:30");
        assert_eq!(stats.last_session, "10 x 01:00");
    }

    #[test]
    fn ratios() {
        let history = vec![
            session(1, 1, vec![done("140", "1")]),
            session(2, 2, vec![done("100", "1")]),
            session(3, 3, vec![done("180", "1")]),
        ];
        let r = strength_ratios(&history, &1.into(), &2.into(), &3.into(), 80.0);
        assert_eq!(r.total, 420);
        assert_eq!(r.total_ratio, Some(5.25));
        assert_eq!(r.bench_ratio, Some(1.25));

        let r = strength_ratios(&history, &1.into(), &2.into(), &3.into(), 0.0);
        assert_eq!(r.total_ratio, None);
    }

    #[test]
    fn ratio_total_saturates() {
        let history = vec![
            session(1, 1, vec![done("4000000000", "1")]),
            session(2, 2, vec![done("4000000000", "1")]),
            session(3, 3, vec![done("4000000000", "1")]),
        ];
        let r = strength_ratios(&history, &1.into(), &2.into(), &3.into(), 80.0);
        assert_eq!(r.squat, 4_000_000_000);
        assert_eq!(r.total, u32::MAX);
    }

    #[test]
    fn body_weight_from_latest_session() {
        let mut a = session(1, 1, vec![]);
        a.body_weight = Some("80".into());
        let mut b = session(2, 1, vec![]);
        b.body_weight = Some("81,5".into());
        let c = session(3, 1, vec![]);
        assert_eq!(latest_body_weight(&[a, b, c]), Some(81.5));
    }
}
