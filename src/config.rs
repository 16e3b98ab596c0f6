use crate::load::DEFAULT_MAX_LOAD;
use crate::planner::{MIN_PERIODS_PER_DAY, PlannerSettings, SUBJECTS_PER_SECTION};
use clap::Parser;
use std::path::PathBuf;

/// Class schedule builder - HTTP server for automatic section timetables
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "SCHEDULER_BIND_ADDR", default_value = "127.0.0.1:8080")]
    pub bind_addr: String,

    /// Path to the `SQLite` roster database
    #[arg(long, env = "SCHEDULER_DB_PATH", default_value = "scheduler.sqlite3")]
    pub db_path: PathBuf,

    /// Subjects the planner aims to give each section
    #[arg(long, env = "SCHEDULER_SUBJECTS_PER_SECTION", default_value_t = SUBJECTS_PER_SECTION)]
    pub subjects_per_section: usize,

    /// Ceiling for teachers without a load row
    #[arg(long, env = "SCHEDULER_DEFAULT_MAX_LOAD", default_value_t = DEFAULT_MAX_LOAD)]
    pub default_max_load: u32,

    /// Load below which a teacher is preferred
    #[arg(long, env = "SCHEDULER_MIN_PERIODS_PER_DAY", default_value_t = MIN_PERIODS_PER_DAY)]
    pub min_periods_per_day: u32,
}

impl Config {
    pub fn planner(&self) -> PlannerSettings {
        PlannerSettings {
            subjects_per_section: self.subjects_per_section,
            min_periods_per_day: self.min_periods_per_day,
            default_max_load: self.default_max_load,
        }
    }
}
