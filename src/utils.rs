use clap::ValueEnum;
use serde::Serialize;

use crate::types::ExerciseType;

/// Plates available per side, heaviest first.
pub const PLATE_INVENTORY: [f64; 5] = [20.0, 10.0, 5.0, 2.5, 1.25];

const PLATE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OneRmFormula {
    #[default]
    Wathen,
    Epley,
    Brzycki,
    Lombardi,
}

/// Parses loosely typed numeric input. Accepts `,` as decimal separator;
/// anything unparseable or non-finite is 0.
pub fn parse_number(text: &str) -> f64 {
    let cleaned = text.trim().replace(',', ".");
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Renders a number without a trailing `.0`, keeping up to two decimals.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    if value.fract() == 0.0 {
        return format!("{}", value as i64);
    }
    let s = format!("{:.2}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Estimated one-rep max (Wathen), rounded to the nearest kilogram.
pub fn estimate_1rm(weight: f64, reps: f64) -> u32 {
    estimate_1rm_with(weight, reps, OneRmFormula::Wathen)
}

pub fn estimate_1rm_text(weight: &str, reps: &str) -> u32 {
    estimate_1rm(parse_number(weight), parse_number(reps))
}

pub fn estimate_1rm_with(weight: f64, reps: f64, formula: OneRmFormula) -> u32 {
    if !weight.is_finite() || !reps.is_finite() || weight <= 0.0 || reps <= 0.0 {
        return 0;
    }
    if reps == 1.0 {
        return weight.round() as u32;
    }

    let estimate = match formula {
        OneRmFormula::Wathen => 100.0 * weight / (48.8 + 53.8 * (-0.075 * reps).exp()),
        OneRmFormula::Epley => weight * (1.0 + reps / 30.0),
        OneRmFormula::Brzycki => weight / (1.0278 - 0.0278 * reps),
        OneRmFormula::Lombardi => weight * reps.powf(0.10),
    };

    if !estimate.is_finite() || estimate <= 0.0 || estimate >= u32::MAX as f64 {
        return 0;
    }
    estimate.round() as u32
}

/// Seconds to `MM:SS`. Minutes are not wrapped into hours so the output
/// always parses back to the same value. Negative input renders as `-`.
pub fn format_duration(total_seconds: i64) -> String {
    if total_seconds < 0 {
        return "-".to_string();
    }
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Parses `SS`, `MM:SS` or `HH:MM:SS` into seconds. Malformed segments count
/// as zero, and so does a total that does not fit in an `i64`.
pub fn parse_duration(text: &str) -> i64 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }

    let segment = |s: &str| s.trim().parse::<i64>().ok().filter(|v| *v >= 0).unwrap_or(0);

    let parts: Vec<&str> = text.split(':').collect();
    let scales: &[i64] = match parts.len() {
        1 => &[1],
        2 => &[60, 1],
        3 => &[3600, 60, 1],
        _ => return 0,
    };
    parts
        .iter()
        .zip(scales)
        .try_fold(0i64, |acc, (part, scale)| {
            segment(part).checked_mul(*scale).and_then(|v| acc.checked_add(v))
        })
        .unwrap_or(0)
}

/// Normalizes a hand-typed time for display. The meaning of a bare number
/// depends on the exercise type: minutes for cardio, seconds for holds.
pub fn smart_format_time(text: &str, kind: ExerciseType) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    if !text.contains(':') {
        let Ok(n) = text.parse::<u64>() else {
            return text.to_string();
        };
        return match kind {
            ExerciseType::Cardio if n >= 60 => format!("{:02}:{:02}:00", n / 60, n % 60),
            ExerciseType::Cardio => format!("{:02}:00", n),
            ExerciseType::Isometrique | ExerciseType::Etirement => {
                format_duration(i64::try_from(n).unwrap_or(i64::MAX))
            }
            _ => text.to_string(),
        };
    }

    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
        return text.to_string();
    }
    parts
        .iter()
        .map(|p| format!("{:0>2}", p))
        .collect::<Vec<_>>()
        .join(":")
}

/// Greedy per-side plate breakdown. Empty when the input is not a number or
/// the target is lighter than the bar. The greedy pass may leave a remainder
/// below the smallest plate.
pub fn calculate_plates(target_total: f64, bar_weight: f64) -> Vec<f64> {
    if target_total.is_nan() || bar_weight.is_nan() || target_total < bar_weight {
        return Vec::new();
    }
    if !target_total.is_finite() || !bar_weight.is_finite() {
        return Vec::new();
    }

    let mut remainder = (target_total - bar_weight) / 2.0;
    let mut plates = Vec::new();
    for plate in PLATE_INVENTORY {
        while remainder + PLATE_EPSILON >= plate {
            plates.push(plate);
            remainder -= plate;
        }
    }
    plates
}

/// Total load reached with `plates` on each side of the bar.
pub fn loaded_total(bar_weight: f64, plates: &[f64]) -> f64 {
    bar_weight + 2.0 * plates.iter().sum::<f64>()
}

pub fn format_timestamp(ms: i64, fmt: &str) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|d| d.format(fmt).to_string())
        .unwrap_or_default()
}
