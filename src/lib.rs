//! Core of an offline workout log: 1RM estimates, duration and plate math,
//! per-exercise statistics, warm-up ramps, CSV export and the compact
//! storage codec, plus the SQLite key-value store the CLI persists to.

pub mod codec;
pub mod config;
pub mod db;
pub mod export;
pub mod models;
pub mod stats;
pub mod storage;
pub mod tracker;
pub mod types;
pub mod utils;
pub mod warmup;

pub use types::{ExerciseType, OutputFmt};
