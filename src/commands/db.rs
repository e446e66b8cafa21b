use std::collections::HashSet;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use liftbook::{
    export::{Backup, backup_json, generate_csv, import_backup},
    tracker::Tracker,
};

use super::fail;
use crate::cli::DbCmd;

pub async fn handle(cmd: DbCmd, tracker: &mut Tracker) -> Result<()> {
    match cmd {
        DbCmd::ExportCsv { file } => {
            let path = file.unwrap_or_else(|| "liftbook.csv".to_string());
            let csv = generate_csv(&tracker.history, &tracker.library);
            tokio::fs::write(&path, csv)
                .await
                .with_context(|| format!("writing `{path}`"))?;
            println!(
                "{} {} sessions written to `{}`",
                "ok:".green().bold(),
                tracker.history.len(),
                path
            );
        }

        DbCmd::Export { file } => {
            let path = file.unwrap_or_else(|| "liftbook.json".to_string());
            let backup = Backup {
                library: tracker.library.clone(),
                programs: tracker.programs.clone(),
                history: tracker.history.clone(),
            };
            let json = backup_json(&backup)?;
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("writing `{path}`"))?;
            println!("{} backup written to `{}`", "ok:".green().bold(), path);
        }

        DbCmd::Import { file } => {
            let text = match tokio::fs::read_to_string(&file).await {
                Ok(t) => t,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    fail(format!("cannot open file `{file}`, file not found"));
                    return Ok(());
                }
                Err(e) => return Err(e).with_context(|| format!("reading `{file}`")),
            };
            let backup = match import_backup(&text) {
                Ok(b) => b,
                Err(e) => {
                    fail(e);
                    return Ok(());
                }
            };
            let added = merge(tracker, backup);
            info!(?added, "backup merged");
            println!(
                "{} imported {} sessions, {} exercises, {} programs",
                "ok:".green().bold(),
                added.0,
                added.1,
                added.2
            );
        }
    }
    Ok(())
}

/// Adds what the backup holds and the tracker lacks, matching on ids.
/// Existing entries win. Returns (sessions, exercises, programs) added.
fn merge(tracker: &mut Tracker, backup: Backup) -> (usize, usize, usize) {
    let seen: HashSet<i64> = tracker.history.iter().map(|s| s.id).collect();
    let sessions: Vec<_> = backup
        .history
        .into_iter()
        .filter(|s| !seen.contains(&s.id))
        .collect();

    let seen: HashSet<_> = tracker.library.iter().map(|e| e.id.clone()).collect();
    let exercises: Vec<_> = backup
        .library
        .into_iter()
        .filter(|e| !seen.contains(&e.id))
        .collect();

    let seen: HashSet<_> = tracker.programs.iter().map(|p| p.id.clone()).collect();
    let programs: Vec<_> = backup
        .programs
        .into_iter()
        .filter(|p| !seen.contains(&p.id))
        .collect();

    let counts = (sessions.len(), exercises.len(), programs.len());
    tracker.history.extend(sessions);
    tracker.library.extend(exercises);
    tracker.programs.extend(programs);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftbook::models::{ExerciseId, LibraryExercise, WorkoutSession};
    use pretty_assertions::assert_eq;

    #[test]
    fn merge_keeps_existing_entries() {
        let mut t = Tracker {
            library: vec![LibraryExercise {
                id: ExerciseId::from(1),
                name: "Squat".into(),
                ..Default::default()
            }],
            history: vec![WorkoutSession {
                id: 1,
                session_name: "mine".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let backup = Backup {
            library: vec![
                LibraryExercise {
                    id: ExerciseId::from(1),
                    name: "Other".into(),
                    ..Default::default()
                },
                LibraryExercise {
                    id: ExerciseId::from(2),
                    name: "Curl".into(),
                    ..Default::default()
                },
            ],
            programs: vec![],
            history: vec![
                WorkoutSession {
                    id: 1,
                    session_name: "theirs".into(),
                    ..Default::default()
                },
                WorkoutSession {
                    id: 2,
                    ..Default::default()
                },
            ],
        };

        assert_eq!(merge(&mut t, backup), (1, 1, 0));
        assert_eq!(t.history[0].session_name, "mine");
        assert_eq!(t.library[0].name, "Squat");
        assert_eq!(t.library[1].name, "Curl");
        assert_eq!(t.history.len(), 2);
    }
}
