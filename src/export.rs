//! CSV export (one row per completed set) and JSON backups.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::codec::{self, Codec, CodecError};
use crate::models::{LibraryExercise, Program, WorkoutSession};
use crate::types::ExerciseType;
use crate::utils::{estimate_1rm_text, format_number, format_timestamp, parse_number};

pub const CSV_HEADER: [&str; 18] = [
    "Date",
    "Program",
    "Session",
    "RPE",
    "Bodyweight",
    "Exercise Order",
    "Exercise",
    "Muscle",
    "Type",
    "Note",
    "Set Order",
    "Weight",
    "Reps/Distance/Duration",
    "RIR/Duration",
    "Warmup",
    "Estimated 1RM",
    "Tonnage",
    "Completed At",
];

/// Quotes a field when it holds a delimiter, a quote or a line break.
pub fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_line<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields.into_iter().map(|f| escape_csv(f.as_ref())).join(",")
}

/// Flattens history into CSV. Sessions are written oldest first; `history`
/// itself is left in its original order.
pub fn generate_csv(history: &[WorkoutSession], library: &[LibraryExercise]) -> String {
    let mut lines = vec![csv_line(CSV_HEADER)];

    let sessions = history
        .iter()
        .sorted_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));

    for session in sessions {
        let date = format_timestamp(session.start_time, "%Y-%m-%d");

        for (ex_idx, instance) in session.exercises.iter().enumerate() {
            let entry = library.iter().find(|l| l.id == instance.exercise_id);
            let (name, muscle, kind) = match entry {
                Some(l) => (l.name.clone(), l.muscle.clone(), Some(l.kind)),
                None => (format!("Unknown ID: {}", instance.exercise_id), String::new(), None),
            };
            let supports_1rm = kind.is_none_or(ExerciseType::supports_1rm);

            for (set_idx, set) in instance.sets.iter().enumerate() {
                if !set.done {
                    continue;
                }

                let (e1rm, tonnage) = if set.is_warmup || !supports_1rm {
                    (0, 0.0)
                } else {
                    (
                        estimate_1rm_text(&set.weight, &set.reps),
                        parse_number(&set.weight) * parse_number(&set.reps),
                    )
                };

                let completed = set
                    .completed_at
                    .map(|t| format_timestamp(t, "%Y-%m-%dT%H:%M:%SZ"))
                    .unwrap_or_default();
                let ex_order = (ex_idx + 1).to_string();
                let set_order = (set_idx + 1).to_string();
                let e1rm = e1rm.to_string();
                let tonnage = format_number(tonnage);

                lines.push(csv_line([
                    date.as_str(),
                    session.program_name.as_str(),
                    session.session_name.as_str(),
                    session.fatigue.as_deref().unwrap_or(""),
                    session.body_weight.as_deref().unwrap_or(""),
                    ex_order.as_str(),
                    name.as_str(),
                    muscle.as_str(),
                    kind.map(ExerciseType::label).unwrap_or(""),
                    instance.notes.as_str(),
                    set_order.as_str(),
                    set.weight.as_str(),
                    set.reps.as_str(),
                    set.rir.as_deref().unwrap_or(""),
                    if set.is_warmup { "1" } else { "0" },
                    e1rm.as_str(),
                    tonnage.as_str(),
                    completed.as_str(),
                ]));
            }
        }
    }

    debug!(rows = lines.len() - 1, "generated csv");
    lines.join("\n") + "\n"
}

/// Full-state backup in the readable (full field name) shape.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Backup {
    pub library: Vec<LibraryExercise>,
    pub programs: Vec<Program>,
    pub history: Vec<WorkoutSession>,
}

pub fn backup_json(backup: &Backup) -> Result<String, CodecError> {
    serde_json::to_string_pretty(backup).map_err(|source| CodecError::Encode {
        kind: "backup",
        source,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BackupShape {
    HistoryOnly(Vec<Value>),
    Full {
        #[serde(default)]
        library: Vec<Value>,
        #[serde(default)]
        programs: Vec<Value>,
        history: Vec<Value>,
    },
}

fn hydrate_each<T: Codec>(values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|v| match codec::hydrate::<T>(v) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(error = %e, "skipping unreadable backup entry");
                None
            }
        })
        .collect()
}

/// Reads a backup file: either a bare history array or an object with a
/// `history` key. Entries may be in any persisted shape.
pub fn import_backup(text: &str) -> Result<Backup, CodecError> {
    let shape: BackupShape = serde_json::from_str(text).map_err(|source| CodecError::Malformed {
        kind: "backup",
        source,
    })?;

    Ok(match shape {
        BackupShape::HistoryOnly(history) => Backup {
            history: hydrate_each(history),
            ..Default::default()
        },
        BackupShape::Full {
            library,
            programs,
            history,
        } => Backup {
            library: hydrate_each(library),
            programs: hydrate_each(programs),
            history: hydrate_each(history),
        },
    })
}
