use std::collections::BTreeSet;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};

use liftbook::{
    models::{Program, ProgramExercise, ProgramSession},
    tracker::Tracker,
    types::{OutputFmt, emit},
    utils::{format_duration, format_number, parse_duration},
};

use super::{fail, print_columns, warn};
use crate::cli::ProgramCmd;

#[derive(Debug, Deserialize)]
struct ProgramToml {
    name: String,
    #[serde(default)]
    sessions: Vec<SessionToml>,
}

#[derive(Debug, Deserialize)]
struct SessionToml {
    name: String,
    #[serde(default)]
    exercises: Vec<ExerciseToml>,
}

#[derive(Debug, Deserialize)]
struct ExerciseToml {
    name: String,
    sets: u32,
    reps: Option<Scalar>,
    rest: Option<Scalar>,
    target_rir: Option<Scalar>,
}

/// `reps = 5` and `reps = "8-12"` are both fine.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn text(&self) -> String {
        match self {
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) => format_number(*f),
            Scalar::Text(s) => s.trim().to_string(),
        }
    }
}

#[derive(Serialize)]
struct ProgJson<'a> {
    idx: usize,
    id: &'a str,
    name: &'a str,
    sessions: Vec<&'a str>,
}

pub async fn handle(cmd: ProgramCmd, tracker: &mut Tracker, fmt: OutputFmt) -> Result<()> {
    match cmd {
        ProgramCmd::Import { files } => {
            if files.is_empty() {
                warn("no program file provided");
            }
            for f in files {
                let text = match tokio::fs::read_to_string(&f).await {
                    Ok(t) => t,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        fail(format!("cannot open file `{f}`, file not found"));
                        continue;
                    }
                    Err(e) => return Err(e).with_context(|| format!("reading `{f}`")),
                };
                import_program(tracker, &text).with_context(|| format!("parsing `{f}`"))?;
            }
        }

        ProgramCmd::List => {
            let progs: Vec<ProgJson> = tracker
                .programs
                .iter()
                .enumerate()
                .map(|(i, p)| ProgJson {
                    idx: i + 1,
                    id: &p.id,
                    name: &p.name,
                    sessions: p.sessions.iter().map(|s| s.name.as_str()).collect(),
                })
                .collect();
            emit(fmt, &progs, || print_list(&progs));
        }

        ProgramCmd::Show { program } => {
            let Some(p) = tracker.find_program(&program) else {
                fail(format!("no program `{program}` (see `p list`)"));
                return Ok(());
            };
            emit(fmt, p, || print_program(tracker, p));
        }
    }
    Ok(())
}

/// Parses one program file and stores it. Programs naming unknown exercises
/// or reusing an existing name are skipped with a warning.
fn import_program(tracker: &mut Tracker, text: &str) -> Result<()> {
    let prog: ProgramToml = toml::from_str(text)?;

    if tracker
        .programs
        .iter()
        .any(|p| p.name.eq_ignore_ascii_case(&prog.name))
    {
        warn(format!("program `{}` already exists, skipping", prog.name));
        return Ok(());
    }

    match to_program(tracker, prog) {
        Ok(program) => {
            println!("{} `{}`", "ok:".green().bold(), program.name);
            tracker.programs.push(program);
        }
        Err((name, missing)) => warn(format!(
            "cannot import program `{name}`, missing exercises: {}",
            missing.join(", ")
        )),
    }
    Ok(())
}

/// Resolves exercise names against the library. On failure returns the
/// program name and every name that did not resolve.
fn to_program(tracker: &Tracker, prog: ProgramToml) -> std::result::Result<Program, (String, Vec<String>)> {
    let missing: BTreeSet<String> = prog
        .sessions
        .iter()
        .flat_map(|s| &s.exercises)
        .filter(|e| tracker.find_exercise(&e.name).is_none())
        .map(|e| e.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err((prog.name, missing.into_iter().collect()));
    }

    let sessions = prog
        .sessions
        .into_iter()
        .map(|s| ProgramSession {
            name: s.name,
            exercises: s
                .exercises
                .into_iter()
                .filter_map(|e| {
                    let id = tracker.find_exercise(&e.name)?.id.clone();
                    Some(ProgramExercise {
                        exercise_id: id,
                        sets: e.sets,
                        reps: e.reps.map(|r| r.text()).unwrap_or_default(),
                        rest: e
                            .rest
                            .map(|r| parse_duration(&r.text()).clamp(0, u32::MAX as i64) as u32)
                            .unwrap_or(0),
                        target_rir: e.target_rir.map(|r| r.text()).filter(|r| !r.is_empty()),
                    })
                })
                .collect(),
        })
        .collect();

    Ok(Program {
        id: uuid::Uuid::new_v4().to_string(),
        name: prog.name,
        sessions,
    })
}

fn print_list(progs: &[ProgJson]) {
    if progs.is_empty() {
        println!("{}", "  (no programs found)".dimmed());
        return;
    }

    println!("{}", "Programs:".cyan().bold());

    let idx_w = progs.len().to_string().len();
    let mut left = Vec::<String>::new();
    let mut right = Vec::<String>::new();

    for p in progs {
        let idx = format!("{:>width$}", p.idx, width = idx_w).yellow();
        left.push(format!(" {} • {}", idx, p.name.bold()));
        right.push(format!("{} sessions", p.sessions.len()).dimmed().to_string());

        for (i, s) in p.sessions.iter().enumerate() {
            let connector = if i + 1 == p.sessions.len() { "└─" } else { "├─" };
            left.push(format!(
                " {}   {} {} • {}",
                " ".repeat(idx_w),
                connector,
                (i + 1).to_string().yellow(),
                s
            ));
            right.push(String::new());
        }
    }

    print_columns(left, right);
}

fn print_program(tracker: &Tracker, p: &Program) {
    println!("{} {}", "Program:".cyan().bold(), p.name.bold());
    for (i, s) in p.sessions.iter().enumerate() {
        println!("\n {} • {}", (i + 1).to_string().yellow(), s.name.bold());
        for ex in &s.exercises {
            let mut line = format!("{} x {}", ex.sets, if ex.reps.is_empty() { "?" } else { &ex.reps });
            if let Some(rir) = &ex.target_rir {
                line.push_str(&format!(" @ RIR {rir}"));
            }
            if ex.rest > 0 {
                line.push_str(&format!(", rest {}", format_duration(ex.rest as i64)));
            }
            println!(
                "     - {} {}",
                tracker.exercise_name(&ex.exercise_id),
                line.dimmed()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftbook::models::{ExerciseId, LibraryExercise};
    use pretty_assertions::assert_eq;

    const PROGRAM: &str = r#"
        name = "Force"

        [[sessions]]
        name = "Jour A"

        [[sessions.exercises]]
        name = "Squat"
        sets = 5
        reps = 5
        rest = "3:00"
        target_rir = 2

        [[sessions.exercises]]
        name = "curl"
        sets = 3
        reps = "8-12"
        rest = 90
    "#;

    fn tracker() -> Tracker {
        Tracker {
            library: vec![
                LibraryExercise {
                    id: ExerciseId::from(1),
                    name: "Squat".into(),
                    ..Default::default()
                },
                LibraryExercise {
                    id: ExerciseId::from(2),
                    name: "Curl".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn resolves_names_and_scalars() {
        let t = tracker();
        let prog: ProgramToml = toml::from_str(PROGRAM).unwrap();
        let program = to_program(&t, prog).unwrap();
        assert_eq!(program.name, "Force");
        let exs = &program.sessions[0].exercises;
        assert_eq!(exs[0].exercise_id, ExerciseId::from(1));
        assert_eq!(exs[0].reps, "5");
        assert_eq!(exs[0].rest, 180);
        assert_eq!(exs[0].target_rir.as_deref(), Some("2"));
        assert_eq!(exs[1].exercise_id, ExerciseId::from(2));
        assert_eq!(exs[1].reps, "8-12");
        assert_eq!(exs[1].rest, 90);
    }

    #[test]
    fn missing_exercises_are_reported() {
        let mut t = tracker();
        t.library.pop();
        let prog: ProgramToml = toml::from_str(PROGRAM).unwrap();
        let (name, missing) = to_program(&t, prog).unwrap_err();
        assert_eq!(name, "Force");
        assert_eq!(missing, vec!["curl".to_string()]);
    }

    #[test]
    fn duplicate_names_are_skipped() {
        let mut t = tracker();
        import_program(&mut t, PROGRAM).unwrap();
        import_program(&mut t, PROGRAM).unwrap();
        assert_eq!(t.programs.len(), 1);
        assert!(import_program(&mut t, "name = ").is_err());
    }
}
