//! Automatic class-schedule builder for a junior high school.
//!
//! Assigns teachers to (section, subject) pairs under department and load
//! constraints, places each assignment on a weekly slot without
//! double-booking a teacher or a section, and persists the result to a
//! SQLite roster store.

pub mod config;
pub mod context;
pub mod data;
pub mod engine;
pub mod error;
pub mod load;
pub mod mutator;
pub mod placer;
pub mod planner;
pub mod server;
pub mod store;
pub mod time_grid;
