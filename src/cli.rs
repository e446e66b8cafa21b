use clap::{ArgAction, Parser, Subcommand};

use liftbook::{ExerciseType, utils::OneRmFormula};

#[derive(Parser)]
#[command(name = "liftbook", version, about = "Offline workout log")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Emit machine-readable JSON instead of colorful text.
    #[arg(global = true, long)]
    pub json: bool,

    /// More log output (repeatable)
    #[arg(global = true, short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Less log output (repeatable)
    #[arg(global = true, short, long, action = ArgAction::Count)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Session-scoped commands
    #[command(subcommand, visible_alias = "s")]
    Session(SessionCmd),

    /// Exercise library
    #[command(subcommand, visible_alias = "ex")]
    Exercise(ExerciseCmd),

    /// Program management
    #[command(subcommand, visible_alias = "p")]
    Program(ProgramCmd),

    /// 1RM, plates, durations and strength ratios
    #[command(subcommand, visible_alias = "c")]
    Calc(CalcCmd),

    /// Export and import data
    #[command(subcommand)]
    Db(DbCmd),

    /// View or edit liftbook config
    #[command(subcommand)]
    Config(ConfigCmd),
}

#[derive(Subcommand)]
pub enum SessionCmd {
    /// Start a session from a program
    #[command(visible_alias = "s")]
    Start {
        /// Program index (from `p list`), name or id
        program: String,

        /// Session number within the program, or its name
        session: String,
    },

    /// Start a session that follows no program
    #[command(visible_alias = "a")]
    Adhoc {
        /// Session name
        #[arg(default_value = "Séance libre")]
        name: String,
    },

    /// Show current session details
    #[command(visible_alias = "i")]
    Show,

    /// Add an exercise to the current session
    #[command(visible_alias = "add")]
    AddEx {
        /// Exercise index (from `ex list`) or name
        exercise: String,

        /// Number of empty sets to plan
        #[arg(short, long, default_value_t = 3)]
        sets: u32,
    },

    /// Log a set - Usage: session log EXERCISE WEIGHT REPS
    #[command(visible_alias = "l")]
    #[command(override_usage = "session log <EXERCISE> <WEIGHT> <REPS>")]
    Log {
        /// 1-based exercise position (same order shown in `session show`)
        #[arg(value_name = "EXERCISE")]
        exercise: usize,

        /// Weight in kg (distance or load for cardio)
        #[arg(value_name = "WEIGHT")]
        weight: String,

        /// Reps, or a duration for timed exercises
        #[arg(value_name = "REPS")]
        reps: String,

        /// Reps in reserve, or a duration for cardio
        #[arg(long)]
        rir: Option<String>,

        /// Specific set to overwrite (defaults to the next open set)
        #[arg(long, short = 's')]
        set: Option<usize>,

        /// Mark the set as a warm-up
        #[arg(long, short = 'w')]
        warmup: bool,

        /// Free-form note on the set
        #[arg(long, short = 'n')]
        note: Option<String>,
    },

    /// Prepend a warm-up ramp to an exercise
    #[command(visible_alias = "w")]
    Warmup {
        /// 1-based exercise position
        exercise: usize,

        /// Number of warm-up sets (1-3, defaults to config `warmup_sets`)
        #[arg(short, long)]
        count: Option<usize>,
    },

    /// End the current session and keep it in history
    #[command(visible_alias = "f")]
    Finish {
        /// Body weight at the end of the session
        #[arg(short, long)]
        bodyweight: Option<String>,

        /// Perceived fatigue, 1 to 5
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        fatigue: Option<u8>,
    },

    /// Cancel the current session
    #[command(visible_alias = "c")]
    Cancel,

    /// List finished sessions, newest first
    History {
        /// How many sessions to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Subcommand)]
pub enum ExerciseCmd {
    /// Add a new exercise
    #[command(visible_alias = "a")]
    Add {
        /// Exercise name
        name: String,

        /// Primary muscle group
        #[arg(short, long)]
        muscle: String,

        /// Exercise type
        #[arg(short = 't', long = "type", value_enum, default_value_t = ExerciseType::Isolation)]
        kind: ExerciseType,

        /// Equipment code (BB, DB, KB, M, C, BW...)
        #[arg(short, long, default_value = "")]
        equipment: String,
    },

    /// List exercises
    #[command(visible_alias = "l")]
    List {
        /// Filter by muscle group
        #[arg(short, long)]
        muscle: Option<String>,

        /// Include archived exercises
        #[arg(short, long)]
        all: bool,
    },

    /// Show exercise statistics
    #[command(visible_alias = "s", trailing_var_arg = true)]
    Show {
        /// Exercise index or name
        exercise: Vec<String>,
    },

    /// Hide an exercise from lists (history keeps it)
    Archive {
        /// Exercise index or name
        exercise: String,
    },

    /// Toggle the favorite flag
    #[command(visible_alias = "fav")]
    Favorite {
        /// Exercise index or name
        exercise: String,
    },
}

#[derive(Subcommand)]
pub enum ProgramCmd {
    /// Import one or more programs
    #[command(visible_alias = "i")]
    Import { files: Vec<String> },

    /// List programs
    #[command(visible_alias = "l")]
    List,

    /// Show a single program in detail
    #[command(visible_alias = "s")]
    Show {
        /// Program index (from `p list`) or exact name
        program: String,
    },
}

#[derive(Subcommand)]
pub enum CalcCmd {
    /// Estimate a one-rep max
    #[command(visible_alias = "1rm")]
    OneRm {
        weight: String,
        reps: String,

        #[arg(short, long, value_enum, default_value_t = OneRmFormula::Wathen)]
        formula: OneRmFormula,
    },

    /// Plates to load on each side of the bar
    Plates {
        /// Total target load
        target: String,

        /// Bar weight (defaults to config `bar_weight`)
        #[arg(short, long)]
        bar: Option<String>,
    },

    /// Normalize a duration the way the log stores it
    Time {
        text: String,

        #[arg(value_enum)]
        kind: ExerciseType,
    },

    /// Squat / bench / deadlift records and ratios to body weight
    Ratios {
        /// Squat exercise index or name
        squat: String,
        /// Bench press exercise index or name
        bench: String,
        /// Deadlift exercise index or name
        deadlift: String,
        /// Body weight (defaults to the last one recorded)
        bodyweight: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum DbCmd {
    /// Write finished sessions as CSV
    ExportCsv {
        /// Output file path (defaults to liftbook.csv)
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Write a full JSON backup
    Export {
        /// Output file path (defaults to liftbook.json)
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Restore from a JSON backup or a bare history array
    Import {
        /// Input JSON file path
        file: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Show all config keys
    List,

    /// Get the value of a key
    Get { key: String },

    /// Set or override a key
    Set { key: String, val: String },

    /// Remove a key
    Unset { key: String },
}
