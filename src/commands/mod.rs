use std::fmt::Display;

use chrono::{DateTime, Local};
use colored::Colorize;

pub mod calc;
pub mod config;
pub mod db;
pub mod exercise;
pub mod program;
pub mod session;

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Local wall-clock rendering of an epoch-millisecond timestamp.
pub fn local_time(ms: i64, fmt: &str) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|d| d.with_timezone(&Local).format(fmt).to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// User mistakes are reported, not propagated.
pub fn fail(msg: impl Display) {
    println!("{} {}", "error:".red().bold(), msg);
}

pub fn warn(msg: impl Display) {
    println!("{} {}", "warning:".yellow().bold(), msg);
}

/// Printable width of `s`, ignoring ANSI color sequences.
pub fn plain_len(s: &str) -> usize {
    let mut n = 0;
    let mut esc = false;
    for c in s.chars() {
        match (esc, c) {
            (true, 'm') => esc = false,
            (true, _) => {}
            (false, '\x1B') => esc = true,
            (false, _) => n += 1,
        }
    }
    n
}

/// Prints `left | right` rows with the bars aligned.
pub fn print_columns(left: Vec<String>, right: Vec<String>) {
    let width = left.iter().map(|s| plain_len(s)).max().unwrap_or(0);
    for (l, r) in left.into_iter().zip(right) {
        if r.is_empty() {
            println!("{l}");
        } else {
            let pad = width.saturating_sub(plain_len(&l));
            println!("{l}{} {} {r}", " ".repeat(pad), "|".blue());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_len_skips_escapes() {
        assert_eq!(plain_len("abc"), 3);
        assert_eq!(plain_len(&"abc".red().bold().to_string()), 3);
        assert_eq!(plain_len("é★"), 2);
    }
}
