use clap::Parser;
use class_scheduler::config::Config;
use class_scheduler::server::{self, AppState};
use class_scheduler::store;
use class_scheduler::time_grid::TimeGridRegistry;
use log::error;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();

    let conn = match store::open(&config.db_path) {
        Ok(conn) => conn,
        Err(e) => {
            error!("Could not open {}: {e}", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };

    let state = AppState::new(conn, TimeGridRegistry::default(), config.planner());
    if let Err(e) = server::run_server(&config.bind_addr, state).await {
        error!("Server stopped: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
