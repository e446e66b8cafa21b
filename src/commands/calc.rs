use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use liftbook::{
    config::Config,
    stats::{latest_body_weight, strength_ratios},
    tracker::Tracker,
    types::{OutputFmt, emit},
    utils::{
        OneRmFormula, calculate_plates, estimate_1rm_with, format_number, loaded_total,
        parse_duration, parse_number, smart_format_time,
    },
};

use super::fail;
use crate::cli::CalcCmd;

#[derive(Serialize)]
struct OneRmJson {
    weight: f64,
    reps: f64,
    formula: OneRmFormula,
    e1rm: u32,
}

#[derive(Serialize)]
struct PlatesJson {
    target: f64,
    bar: f64,
    per_side: Vec<f64>,
    loaded: f64,
}

#[derive(Serialize)]
struct TimeJson {
    text: String,
    seconds: i64,
}

pub fn handle(cmd: CalcCmd, tracker: &Tracker, cfg: &Config, fmt: OutputFmt) -> Result<()> {
    match cmd {
        CalcCmd::OneRm { weight, reps, formula } => {
            let (w, r) = (parse_number(&weight), parse_number(&reps));
            let e1rm = estimate_1rm_with(w, r, formula);
            if e1rm == 0 {
                fail(format!("cannot estimate a 1RM from `{weight}` x `{reps}`"));
                return Ok(());
            }
            let out = OneRmJson {
                weight: w,
                reps: r,
                formula,
                e1rm,
            };
            emit(fmt, &out, || {
                println!(
                    "{} x {} → {} {}",
                    format_number(w),
                    format_number(r),
                    e1rm.to_string().yellow().bold(),
                    format!("({formula:?})").dimmed()
                );
            });
        }

        CalcCmd::Plates { target: raw, bar } => {
            let target = parse_number(&raw);
            let bar = bar.map(|b| parse_number(&b)).unwrap_or_else(|| cfg.bar_weight());
            if let Some(problem) = plates_problem(&raw, target, bar) {
                fail(problem);
                return Ok(());
            }
            let per_side = calculate_plates(target, bar);
            let out = PlatesJson {
                target,
                bar,
                loaded: loaded_total(bar, &per_side),
                per_side,
            };
            emit(fmt, &out, || print_plates(&out));
        }

        CalcCmd::Time { text, kind } => {
            let text = smart_format_time(&text, kind);
            let out = TimeJson {
                seconds: parse_duration(&text),
                text,
            };
            emit(fmt, &out, || {
                println!("{} {}", out.text.bold(), format!("({} s)", out.seconds).dimmed())
            });
        }

        CalcCmd::Ratios {
            squat,
            bench,
            deadlift,
            bodyweight,
        } => {
            let mut ids = Vec::with_capacity(3);
            for needle in [&squat, &bench, &deadlift] {
                match tracker.find_exercise(needle) {
                    Some(e) => ids.push(e.id.clone()),
                    None => {
                        fail(format!("no exercise `{needle}` (see `ex list`)"));
                        return Ok(());
                    }
                }
            }

            let bw = bodyweight
                .map(|b| parse_number(&b))
                .filter(|b| *b > 0.0)
                .or_else(|| latest_body_weight(&tracker.history))
                .unwrap_or(0.0);

            let ratios = strength_ratios(&tracker.history, &ids[0], &ids[1], &ids[2], bw);
            emit(fmt, &ratios, || {
                let ratio = |r: Option<f64>| {
                    r.map(|v| format!("{:.2} x BW", v))
                        .unwrap_or_else(|| "-".to_string())
                };
                println!("{}", "Strength ratios:".cyan().bold());
                println!("  {:<10} {:>5}  {}", "squat", ratios.squat, ratio(ratios.squat_ratio).dimmed());
                println!("  {:<10} {:>5}  {}", "bench", ratios.bench, ratio(ratios.bench_ratio).dimmed());
                println!("  {:<10} {:>5}  {}", "deadlift", ratios.deadlift, ratio(ratios.deadlift_ratio).dimmed());
                println!(
                    "  {:<10} {:>5}  {}",
                    "total".bold(),
                    ratios.total.to_string().yellow().bold(),
                    ratio(ratios.total_ratio)
                );
                if bw <= 0.0 {
                    println!("{}", "  (no body weight recorded, ratios unavailable)".dimmed());
                }
            });
        }
    }
    Ok(())
}

/// Only a non-numeric target or one lighter than the bar is refused; a
/// remainder below the smallest plate is shown as a closest load.
fn plates_problem(raw: &str, target: f64, bar: f64) -> Option<String> {
    let numeric = raw
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .is_ok_and(f64::is_finite);
    if !numeric {
        Some(format!("`{}` is not a load", raw.trim()))
    } else if target < bar {
        Some(format!(
            "cannot load {} on a {} bar",
            format_number(target),
            format_number(bar)
        ))
    } else {
        None
    }
}

fn print_plates(out: &PlatesJson) {
    if out.per_side.is_empty() {
        println!("{} {}", "per side:".dimmed(), "empty bar".bold());
    } else {
        let plates: Vec<String> = out.per_side.iter().map(|p| format_number(*p)).collect();
        println!("{} {}", "per side:".dimmed(), plates.join(" + ").bold());
    }
    let note = if (out.loaded - out.target).abs() > 1e-9 {
        format!(" (closest to {})", format_number(out.target))
    } else {
        String::new()
    };
    println!("{} {} kg{}", "loaded:".dimmed(), format_number(out.loaded), note.yellow());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plates_refuse_only_bad_or_light_targets() {
        assert_eq!(plates_problem("21", 21.0, 20.0), None);
        assert!(calculate_plates(21.0, 20.0).is_empty());
        assert_eq!(plates_problem("20", 20.0, 20.0), None);
        assert_eq!(plates_problem("82,5", 82.5, 20.0), None);
        assert_eq!(
            plates_problem("15", 15.0, 20.0).as_deref(),
            Some("cannot load 15 on a 20 bar")
        );
        assert_eq!(plates_problem("heavy", 0.0, 20.0).as_deref(), Some("`heavy` is not a load"));
    }
}
