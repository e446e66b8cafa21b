use thiserror::Error;

use crate::models::{ExerciseInstance, SetRecord};
use crate::stats::ExerciseStats;
use crate::utils::{format_number, parse_number};

/// (fraction of working weight, reps)
pub const WARMUP_RAMP: [(f64, u32); 3] = [(0.5, 8), (0.7, 5), (0.9, 2)];

/// Warm-up loads are rounded to what two of the smallest plates can make.
const LOAD_STEP: f64 = 1.25;

#[derive(Debug, Error, PartialEq)]
pub enum WarmupError {
    #[error("no working weight to base a warm-up on")]
    NoBaseWeight,

    #[error("warm-up length must be between 1 and {max}, got {got}")]
    InvalidCount { got: usize, max: usize },
}

/// Builds the first `count` steps of the warm-up ramp for `target_weight`.
pub fn generate_warmup(target_weight: &str, count: usize) -> Result<Vec<SetRecord>, WarmupError> {
    if count == 0 || count > WARMUP_RAMP.len() {
        return Err(WarmupError::InvalidCount {
            got: count,
            max: WARMUP_RAMP.len(),
        });
    }

    let base = parse_number(target_weight);
    if base <= 0.0 {
        return Err(WarmupError::NoBaseWeight);
    }

    Ok(WARMUP_RAMP
        .iter()
        .take(count)
        .map(|(fraction, reps)| {
            let load = (base * fraction / LOAD_STEP).round() * LOAD_STEP;
            SetRecord {
                is_warmup: true,
                done: false,
                ..SetRecord::new(format_number(load), reps.to_string())
            }
        })
        .collect())
}

/// Working weight to ramp towards: what is already typed in the current
/// session, otherwise the best set of the last session.
pub fn resolve_base_weight(in_progress: &[SetRecord], stats: &ExerciseStats) -> Option<String> {
    in_progress
        .iter()
        .filter(|s| !s.is_warmup)
        .map(|s| s.weight.trim())
        .find(|w| parse_number(w) > 0.0)
        .map(str::to_string)
        .or_else(|| {
            stats
                .last_best_set
                .as_ref()
                .map(|b| b.weight.clone())
                .filter(|w| parse_number(w) > 0.0)
        })
}

/// Generates a ramp for `instance` and puts it before its working sets.
pub fn add_warmup(instance: &mut ExerciseInstance, stats: &ExerciseStats, count: usize) -> Result<usize, WarmupError> {
    let base = resolve_base_weight(&instance.sets, stats).ok_or(WarmupError::NoBaseWeight)?;
    let ramp = generate_warmup(&base, count)?;
    let added = ramp.len();
    prepend_warmups(instance, ramp);
    Ok(added)
}

pub fn prepend_warmups(instance: &mut ExerciseInstance, warmups: Vec<SetRecord>) {
    instance.sets.splice(0..0, warmups);
}
