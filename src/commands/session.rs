use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use liftbook::{
    config::Config,
    models::{SetRecord, WorkoutSession},
    stats::{NO_DATA, format_tonnage},
    tracker::{SetEntry, Tracker},
    types::{ExerciseType, OutputFmt, emit},
    utils::{estimate_1rm_text, format_duration, parse_number, smart_format_time},
};

use super::{fail, local_time, now_ms};
use crate::cli::SessionCmd;

#[derive(Serialize)]
struct HistoryJson<'a> {
    idx: usize,
    id: i64,
    date: String,
    program: &'a str,
    session: &'a str,
    duration: Option<String>,
    exercises: usize,
    tonnage: f64,
}

pub fn handle(cmd: SessionCmd, tracker: &mut Tracker, cfg: &Config, fmt: OutputFmt) -> Result<()> {
    match cmd {
        SessionCmd::Start { program, session } => {
            let Some(prog) = tracker.find_program(&program) else {
                fail(format!("no program `{program}` (see `p list`)"));
                return Ok(());
            };
            let idx = match session.parse::<usize>() {
                Ok(n) => n.saturating_sub(1),
                Err(_) => match prog
                    .sessions
                    .iter()
                    .position(|s| s.name.eq_ignore_ascii_case(session.trim()))
                {
                    Some(i) => i,
                    None => {
                        fail(format!("no session `{session}` in program `{}`", prog.name));
                        return Ok(());
                    }
                },
            };
            let prog_id = prog.id.clone();

            match tracker.start_program_session(&prog_id, idx, now_ms()) {
                Ok(s) => println!(
                    "{} started {} / {}",
                    "ok:".green().bold(),
                    s.program_name.bold(),
                    s.session_name.bold()
                ),
                Err(e) => fail(e),
            }
        }

        SessionCmd::Adhoc { name } => match tracker.start_adhoc(&name, now_ms()) {
            Ok(s) => println!("{} started {}", "ok:".green().bold(), s.session_name.bold()),
            Err(e) => fail(e),
        },

        SessionCmd::Show => {
            let Some(current) = &tracker.current else {
                println!("{}", "(no active session)".dimmed());
                return Ok(());
            };
            emit(fmt, current, || print_session(tracker, current));
        }

        SessionCmd::AddEx { exercise, sets } => {
            let Some(ex) = tracker.find_exercise(&exercise) else {
                fail(format!("no exercise `{exercise}` (see `ex list`)"));
                return Ok(());
            };
            let (id, name) = (ex.id.clone(), ex.name.clone());
            match tracker.add_exercise(id, sets) {
                Ok(slot) => println!("{} #{} {} added", "ok:".green().bold(), slot, name.bold()),
                Err(e) => fail(e),
            }
        }

        SessionCmd::Log {
            exercise,
            weight,
            reps,
            rir,
            set,
            warmup,
            note,
        } => {
            let Some(id) = tracker
                .current
                .as_ref()
                .and_then(|s| s.exercises.get(exercise.wrapping_sub(1)))
                .map(|e| e.exercise_id.clone())
            else {
                match tracker.current {
                    Some(_) => fail(format!("no exercise at position {exercise} in the current session")),
                    None => fail("no session in progress"),
                }
                return Ok(());
            };

            let kind = tracker.exercise_kind(&id);
            let previous_pr = tracker.stats(&id).pr;
            let entry = SetEntry {
                weight: weight.trim().to_string(),
                reps: normalize_reps(&reps, kind),
                rir: rir.map(|r| match kind {
                    ExerciseType::Cardio => smart_format_time(&r, kind),
                    _ => r.trim().to_string(),
                }),
                notes: note,
                is_warmup: warmup,
            };

            match tracker.log_set(exercise, set, entry, now_ms()) {
                Ok((n, record)) => {
                    let e1rm = estimate_1rm_text(&record.weight, &record.reps);
                    print!(
                        "{} set {} logged: {}",
                        "ok:".green().bold(),
                        n,
                        describe_set(record, kind)
                    );
                    if kind.supports_1rm() && !record.is_warmup && e1rm > 0 {
                        print!(" {}", format!("(e1RM {e1rm})").dimmed());
                        if e1rm > previous_pr && previous_pr > 0 {
                            print!(" {}", "new PR!".yellow().bold());
                        }
                    }
                    println!();
                }
                Err(e) => fail(e),
            }
        }

        SessionCmd::Warmup { exercise, count } => {
            let count = count.unwrap_or_else(|| cfg.warmup_sets());
            match tracker.add_warmup(exercise, count) {
                Ok(added) => {
                    println!("{} {} warm-up sets added", "ok:".green().bold(), added);
                    if let Some(instance) = tracker
                        .current
                        .as_ref()
                        .and_then(|s| s.exercises.get(exercise - 1))
                    {
                        for s in instance.sets.iter().take(added) {
                            println!("    {} x {}", s.weight, s.reps);
                        }
                    }
                }
                Err(e) => fail(e),
            }
        }

        SessionCmd::Finish { bodyweight, fatigue } => {
            let bodyweight = bodyweight.map(|b| b.trim().to_string()).filter(|b| parse_number(b) > 0.0);
            match tracker.finish(bodyweight, fatigue.map(|f| f.to_string()), now_ms()) {
                Ok(s) => {
                    let s = s.clone();
                    let tonnage = session_tonnage(tracker, &s);
                    println!(
                        "{} session finished ({}, {} sets, {})",
                        "ok:".green().bold(),
                        s.duration_ms().map(|d| format_duration(d / 1000)).unwrap_or_default(),
                        s.exercises.iter().flat_map(|e| &e.sets).filter(|x| x.counts()).count(),
                        format_tonnage(tonnage)
                    );
                }
                Err(e) => fail(e),
            }
        }

        SessionCmd::Cancel => match tracker.cancel() {
            Ok(s) => println!(
                "{} session `{}` cancelled",
                "info:".blue().bold(),
                s.session_name
            ),
            Err(e) => fail(e),
        },

        SessionCmd::History { limit } => {
            let sessions = tracker.history_sorted();
            let rows: Vec<HistoryJson> = sessions
                .iter()
                .take(limit)
                .enumerate()
                .map(|(i, s)| HistoryJson {
                    idx: i + 1,
                    id: s.id,
                    date: local_time(s.start_time, "%Y-%m-%d %H:%M"),
                    program: &s.program_name,
                    session: &s.session_name,
                    duration: s.duration_ms().map(|d| format_duration(d / 1000)),
                    exercises: s.exercises.len(),
                    tonnage: session_tonnage(tracker, s),
                })
                .collect();

            emit(fmt, &rows, || {
                if rows.is_empty() {
                    println!("{}", "  (no finished sessions)".dimmed());
                    return;
                }
                println!("{}", "History:".cyan().bold());
                let left = rows
                    .iter()
                    .map(|r| {
                        format!(
                            " {} • {} {} / {}",
                            format!("{:>2}", r.idx).yellow(),
                            r.date,
                            r.program.bold(),
                            r.session
                        )
                    })
                    .collect();
                let right = rows
                    .iter()
                    .map(|r| {
                        format!(
                            "{} · {} exercises · {}",
                            r.duration.as_deref().unwrap_or(NO_DATA),
                            r.exercises,
                            format_tonnage(r.tonnage)
                        )
                        .dimmed()
                        .to_string()
                    })
                    .collect();
                super::print_columns(left, right);
            });
        }
    }

    Ok(())
}

/// Bare numbers typed for timed exercises become durations.
fn normalize_reps(reps: &str, kind: ExerciseType) -> String {
    match kind {
        ExerciseType::Cardio | ExerciseType::Isometrique | ExerciseType::Etirement => {
            smart_format_time(reps, kind)
        }
        _ => reps.trim().to_string(),
    }
}

fn describe_set(set: &SetRecord, kind: ExerciseType) -> String {
    let mut out = if set.weight.is_empty() {
        set.reps.clone()
    } else {
        format!("{} x {}", set.weight, set.reps)
    };
    if let Some(rir) = &set.rir {
        match kind {
            ExerciseType::Cardio => out.push_str(&format!(" ({rir})")),
            _ => out.push_str(&format!(" @ RIR {rir}")),
        }
    }
    out
}

fn session_tonnage(tracker: &Tracker, session: &WorkoutSession) -> f64 {
    session
        .exercises
        .iter()
        .filter(|e| tracker.exercise_kind(&e.exercise_id).supports_1rm())
        .flat_map(|e| &e.sets)
        .filter(|s| s.counts())
        .map(|s| parse_number(&s.weight) * parse_number(&s.reps))
        .sum()
}

fn print_session(tracker: &Tracker, session: &WorkoutSession) {
    let elapsed = (now_ms() - session.start_time).max(0) / 1000;
    println!(
        "{} {} / {} (started {}, duration: {})",
        "Session:".cyan().bold(),
        session.program_name.bold(),
        session.session_name.bold(),
        local_time(session.start_time, "%Y-%m-%d %H:%M"),
        format_duration(elapsed)
    );

    if session.exercises.is_empty() {
        println!("{}", "  (no exercises yet, use `session add-ex`)".dimmed());
        return;
    }

    println!("\n{}", "Exercises:".cyan().bold());
    for (i, instance) in session.exercises.iter().enumerate() {
        let kind = tracker.exercise_kind(&instance.exercise_id);
        let stats = tracker.stats(&instance.exercise_id);

        let mut target = Vec::new();
        if !instance.target_reps.is_empty() {
            target.push(format!("{} x {}", instance.sets.len(), instance.target_reps));
        }
        if let Some(rir) = &instance.target_rir {
            target.push(format!("RIR {rir}"));
        }
        if instance.rest > 0 {
            target.push(format!("rest {}", format_duration(instance.rest as i64)));
        }

        println!(
            " {} • {}{} {}",
            format!("{:>2}", i + 1).yellow(),
            tracker.exercise_name(&instance.exercise_id).bold(),
            if instance.is_bonus { " +".magenta().to_string() } else { String::new() },
            target.join(", ").dimmed()
        );
        println!(
            "      {} {}   {} {}",
            "last:".dimmed(),
            stats.last_session,
            "PR:".dimmed(),
            if stats.pr > 0 { stats.pr.to_string() } else { NO_DATA.to_string() }
        );

        for (n, set) in instance.sets.iter().enumerate() {
            let mark = if set.done { "✓".green() } else { "·".dimmed() };
            let label = if set.weight.is_empty() && set.reps.is_empty() {
                "-".dimmed().to_string()
            } else {
                describe_set(set, kind)
            };
            let warm = if set.is_warmup { " (warm-up)".dimmed().to_string() } else { String::new() };
            println!("      {} {}. {}{}", mark, n + 1, label, warm);
        }
        if !instance.notes.is_empty() {
            println!("      {} {}", "note:".dimmed(), instance.notes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_reps_are_normalized() {
        assert_eq!(normalize_reps("45", ExerciseType::Isometrique), "00:45");
        assert_eq!(normalize_reps("20", ExerciseType::Cardio), "20:00");
        assert_eq!(normalize_reps(" 8 ", ExerciseType::Isolation), "8");
    }

    #[test]
    fn set_description() {
        let mut set = SetRecord::new("100", "5");
        set.rir = Some("2".into());
        assert_eq!(describe_set(&set, ExerciseType::Polyarticulaire), "100 x 5 @ RIR 2");
        let hold = SetRecord::new("", "01:00");
        assert_eq!(describe_set(&hold, ExerciseType::Isometrique), "01:00");
    }
}
