use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use liftbook::{
    models::{ExerciseId, LibraryExercise},
    stats::{ExerciseStats, NO_DATA, format_tonnage, sessions_with},
    tracker::Tracker,
    types::{ExerciseType, OutputFmt, best_muscle_suggestion, canonical_muscle, emit},
    utils::format_number,
};

use super::{fail, print_columns, warn};
use crate::cli::ExerciseCmd;

#[derive(Serialize)]
struct ExJson<'a> {
    /// Position usable with `ex show`; archived entries have none.
    idx: Option<usize>,
    id: &'a ExerciseId,
    name: &'a str,
    muscle: &'a str,
    kind: ExerciseType,
    equipment: &'a str,
    favorite: bool,
    archived: bool,
}

#[derive(Serialize)]
struct ShowJson<'a> {
    exercise: &'a LibraryExercise,
    sessions: usize,
    stats: ExerciseStats,
}

pub fn handle(cmd: ExerciseCmd, tracker: &mut Tracker, fmt: OutputFmt) -> Result<()> {
    match cmd {
        ExerciseCmd::Add {
            name,
            muscle,
            kind,
            equipment,
        } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                fail("exercise name must not be empty");
                return Ok(());
            }

            let Some(muscle) = canonical_muscle(&muscle) else {
                match best_muscle_suggestion(&muscle) {
                    Some(s) => fail(format!("unknown muscle `{muscle}`, did you mean `{s}`?")),
                    None => fail(format!("unknown muscle `{muscle}`")),
                }
                return Ok(());
            };

            if tracker
                .library
                .iter()
                .any(|e| e.name.eq_ignore_ascii_case(&name))
            {
                warn(format!(
                    "Exercise \"{name}\" already exists, use `ex list` to view all exercises"
                ));
                return Ok(());
            }

            let id = tracker.next_exercise_id();
            tracker.library.push(LibraryExercise {
                id: id.clone(),
                name: name.clone(),
                muscle: muscle.to_string(),
                equipment: equipment.trim().to_uppercase(),
                kind,
                ..Default::default()
            });
            println!("{} Exercise \"{}\" added (id {})", "info:".blue().bold(), name, id);
        }

        ExerciseCmd::List { muscle, all } => {
            let muscle = match muscle {
                Some(m) => match canonical_muscle(&m) {
                    Some(c) => Some(c),
                    None => {
                        fail(format!("unknown muscle `{m}`"));
                        return Ok(());
                    }
                },
                None => None,
            };

            let mut visible_idx = 0;
            let rows: Vec<ExJson> = tracker
                .library
                .iter()
                .filter_map(|e| {
                    let idx = (!e.is_archived).then(|| {
                        visible_idx += 1;
                        visible_idx
                    });
                    let keep = (all || !e.is_archived) && muscle.is_none_or(|m| e.muscle == m);
                    keep.then_some(ExJson {
                        idx,
                        id: &e.id,
                        name: &e.name,
                        muscle: &e.muscle,
                        kind: e.kind,
                        equipment: &e.equipment,
                        favorite: e.is_favorite,
                        archived: e.is_archived,
                    })
                })
                .collect();

            emit(fmt, &rows, || print_list(&rows));
        }

        ExerciseCmd::Show { exercise } => {
            let needle = exercise.join(" ");
            let Some(ex) = tracker.find_exercise(&needle) else {
                fail(format!("no exercise `{needle}` (see `ex list`)"));
                return Ok(());
            };
            let out = ShowJson {
                exercise: ex,
                sessions: sessions_with(&tracker.history, &ex.id).len(),
                stats: tracker.stats(&ex.id),
            };
            emit(fmt, &out, || print_details(&out));
        }

        ExerciseCmd::Archive { exercise } => {
            let Some(entry) = find_mut(tracker, &exercise) else {
                fail(format!("no exercise `{exercise}` (see `ex list`)"));
                return Ok(());
            };
            entry.is_archived = true;
            println!("{} \"{}\" archived, its history is kept", "info:".blue().bold(), entry.name);
        }

        ExerciseCmd::Favorite { exercise } => {
            let Some(entry) = find_mut(tracker, &exercise) else {
                fail(format!("no exercise `{exercise}` (see `ex list`)"));
                return Ok(());
            };
            entry.is_favorite = !entry.is_favorite;
            let state = if entry.is_favorite { "marked" } else { "unmarked" };
            println!("{} \"{}\" {} as favorite", "info:".blue().bold(), entry.name, state);
        }
    }

    Ok(())
}

fn find_mut<'a>(tracker: &'a mut Tracker, needle: &str) -> Option<&'a mut LibraryExercise> {
    let id = tracker.find_exercise(needle)?.id.clone();
    tracker.library.iter_mut().find(|e| e.id == id)
}

fn print_list(rows: &[ExJson]) {
    if rows.is_empty() {
        println!("{}", "  (no exercises found)".dimmed());
        return;
    }
    println!("{}", "Exercises:".cyan().bold());

    let idx_w = rows
        .iter()
        .filter_map(|r| r.idx)
        .max()
        .map(|i| i.to_string().len())
        .unwrap_or(1);

    let mut left = Vec::new();
    let mut right = Vec::new();
    for r in rows {
        let idx = match r.idx {
            Some(i) => format!("{i:>idx_w$}").yellow(),
            None => format!("{:>idx_w$}", "-").dimmed(),
        };
        let star = if r.favorite { " ★".yellow().to_string() } else { String::new() };
        let name = if r.archived {
            r.name.dimmed().to_string()
        } else {
            r.name.bold().to_string()
        };
        left.push(format!(" {idx} • {name}{star}"));

        let mut meta = vec![r.muscle.to_string(), r.kind.label().to_string()];
        if !r.equipment.is_empty() {
            meta.push(r.equipment.to_string());
        }
        if r.archived {
            meta.push("archived".to_string());
        }
        right.push(meta.join(" · ").dimmed().to_string());
    }
    print_columns(left, right);
}

fn print_details(out: &ShowJson) {
    let ex = out.exercise;
    let stats = &out.stats;

    println!("{} {}", "Exercise:".cyan().bold(), ex.name.bold());
    println!("  {:<14} {}", "muscle".dimmed(), ex.muscle);
    println!("  {:<14} {}", "type".dimmed(), ex.kind.label());
    if !ex.equipment.is_empty() {
        println!("  {:<14} {}", "equipment".dimmed(), ex.equipment);
    }
    println!("  {:<14} {}", "sessions".dimmed(), out.sessions);

    println!("\n{}", "Records:".cyan().bold());
    if ex.kind.supports_1rm() {
        let pr = if stats.pr > 0 { stats.pr.to_string() } else { NO_DATA.to_string() };
        println!("  {:<14} {}", "e1RM".dimmed(), pr.yellow().bold());
    }
    if stats.pr_max > 0.0 {
        println!("  {:<14} {}", "heaviest".dimmed(), format_number(stats.pr_max));
    }
    println!("  {:<14} {}", "best session".dimmed(), stats.pr_session);
    println!("  {:<14} {}", "last session".dimmed(), stats.last_session);
    if ex.kind.supports_1rm() && stats.last_session_tonnage > 0.0 {
        println!("  {:<14} {}", "last tonnage".dimmed(), format_tonnage(stats.last_session_tonnage));
    }
    if let Some(best) = &stats.last_best_set {
        println!(
            "  {:<14} {} x {} (e1RM {})",
            "last best set".dimmed(),
            best.weight,
            best.reps,
            best.e1rm
        );
    }

    if let Some(tips) = ex.tips.as_ref().filter(|t| !t.is_empty()) {
        println!("\n{}", "Technique:".cyan().bold());
        for (title, lines) in [
            ("setup", &tips.setup),
            ("execution", &tips.execution),
            ("mistakes", &tips.mistakes),
        ] {
            if lines.is_empty() {
                continue;
            }
            println!("  {}", title.dimmed());
            for l in lines {
                println!("    - {l}");
            }
        }
    }
}
