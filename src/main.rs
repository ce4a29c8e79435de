use std::fs::OpenOptions;
use std::path::Path;

use clap::Parser;
use flowstate::cli::commands::{Cli, Commands};
use flowstate::cli::handlers;

const LOG_ENV: &str = "FLOWSTATE_LOG";

/// Log to stderr for commands. The dashboard owns the terminal, so it logs
/// to `flowstate.log` in the data directory instead.
fn init_logging(tui_log_dir: Option<&Path>) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Warn);
    builder.parse_env(env_logger::Env::new().filter(LOG_ENV));

    if let Some(dir) = tui_log_dir {
        let file = std::fs::create_dir_all(dir).and_then(|_| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("flowstate.log"))
        });
        match file {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            // Nowhere safe to write; stay quiet rather than draw over the UI
            Err(_) => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    builder.init();
}

fn main() {
    let cli = Cli::parse();
    let data_dir = handlers::resolve_data_dir(cli.data_dir.as_deref());

    match cli.command {
        None => {
            // No subcommand → launch TUI
            init_logging(Some(&data_dir));
            log::info!("dashboard starting in {}", data_dir.display());
            if let Err(e) = flowstate::tui::run(&data_dir) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Init(args)) => {
            init_logging(None);
            if let Err(e) = handlers::cmd_init(&data_dir, args, cli.json) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(_) => {
            init_logging(None);
            if let Err(e) = handlers::dispatch(cli) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
