use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use liftbook::{
    config::Config,
    types::{OutputFmt, emit},
};

use super::warn;
use crate::cli::ConfigCmd;

const KNOWN_KEYS: [&str; 3] = ["db_path", "bar_weight", "warmup_sets"];

pub fn handle(cmd: ConfigCmd, config_path: &Path, mut cfg: Config, fmt: OutputFmt) -> Result<()> {
    match cmd {
        ConfigCmd::List => emit(fmt, &cfg.map, || {
            if cfg.map.is_empty() {
                println!("{}", "(no config set)".dimmed());
            } else {
                println!("{}", "Config:".cyan().bold());
                for (k, v) in &cfg.map {
                    println!("  {} = {}", k.green(), v);
                }
            }
        }),

        ConfigCmd::Get { key } => match cfg.map.get(&key) {
            Some(val) => println!("{}", val),
            None => warn(format!("key `{}` not found", key)),
        },

        ConfigCmd::Set { key, val } => {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                warn(format!(
                    "`{}` is not a key liftbook reads (known: {})",
                    key,
                    KNOWN_KEYS.join(", ")
                ));
            }
            cfg.map.insert(key.clone(), val.clone());
            cfg.save(config_path)?;
            println!("{} set `{}` = `{}`", "info:".blue().bold(), key.green(), val);
        }

        ConfigCmd::Unset { key } => {
            if cfg.map.remove(&key).is_some() {
                cfg.save(config_path)?;
                println!("{} removed `{}`", "info:".blue().bold(), key.green());
            } else {
                warn(format!("key `{}` not found", key));
            }
        }
    }

    Ok(())
}
