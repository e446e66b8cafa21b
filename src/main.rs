use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

use cli::{Cli, Commands, DbCmd, ProgramCmd, SessionCmd};
use liftbook::{config, db, storage::Store, types::OutputFmt};

mod cli;
mod commands;

/// `-v`/`-q` shift the level around `warn`; `RUST_LOG` wins when set.
fn init_logging(verbose: u8, quiet: u8) {
    let level = log_level(verbose, quiet);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,liftbook={level}")));

    let show_src = matches!(level, "debug" | "trace");

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_file(show_src)
        .with_line_number(show_src)
        .compact()
        .init();
}

fn log_level(verbose: u8, quiet: u8) -> &'static str {
    match i16::from(verbose) - i16::from(quiet) {
        i16::MIN..=-2 => "off",
        -1 => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        3..=i16::MAX => "trace",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        json,
        verbose,
        quiet,
        cmd,
    } = Cli::parse();
    init_logging(verbose, quiet);

    let fmt = if json { OutputFmt::Json } else { OutputFmt::Text };
    let config_path = config::default_path()?;
    let cfg = config::Config::load(&config_path)?;

    let cmd = match cmd {
        Commands::Config(c) => return commands::config::handle(c, &config_path, cfg, fmt),
        other => other,
    };

    let db_path = cfg.db_path();
    debug!(db = %db_path, "opening store");
    let store = Store::new(db::open(&db_path).await?);
    let mut tracker = store.load_tracker().await?;

    let persist = matches!(
        cmd,
        Commands::Session(ref s) if !matches!(s, SessionCmd::Show | SessionCmd::History { .. })
    ) || matches!(
        cmd,
        Commands::Exercise(_) | Commands::Program(ProgramCmd::Import { .. }) | Commands::Db(DbCmd::Import { .. })
    );

    match cmd {
        Commands::Session(c) => commands::session::handle(c, &mut tracker, &cfg, fmt)?,
        Commands::Exercise(c) => commands::exercise::handle(c, &mut tracker, fmt)?,
        Commands::Program(c) => commands::program::handle(c, &mut tracker, fmt).await?,
        Commands::Calc(c) => commands::calc::handle(c, &tracker, &cfg, fmt)?,
        Commands::Db(c) => commands::db::handle(c, &mut tracker).await?,
        Commands::Config(_) => {}
    }

    if persist {
        store.save_tracker(&tracker).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_counts_shift_the_level() {
        assert_eq!(log_level(0, 0), "warn");
        assert_eq!(log_level(1, 0), "info");
        assert_eq!(log_level(0, 1), "error");
        assert_eq!(log_level(u8::MAX, 0), "trace");
        assert_eq!(log_level(0, u8::MAX), "off");
        assert_eq!(log_level(200, 199), "info");
    }
}
