mod build_info;
mod cli;
mod host;
mod process;
mod state;

use clap::Subcommand;
use cli::args::{Args, Parser};
use cli::op::{Op, OpContext};
use cli::{Get, Ls, Mkdir, Mv, Put, Rm, Url, Version, Versions};
use state::AppState;

command_enum! {
    (Ls, Ls),
    (Versions, Versions),
    (Mkdir, Mkdir),
    (Rm, Rm),
    (Mv, Mv),
    (Put, Put),
    (Get, Get),
    (Url, Url),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let state = match AppState::load(args.config.clone()) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Error: Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let log_level = state.config.log_level().unwrap_or(tracing::Level::INFO);
    let guards = process::init_logging(&state.config, log_level);
    tracing::debug!(config = ?state.config_path, "loaded config");

    let ctx = match OpContext::new(args.bucket, &state) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to create object store client: {}", e);
            drop(guards);
            std::process::exit(1);
        }
    };

    let code = match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    // flush buffered log lines before exiting
    drop(guards);
    std::process::exit(code);
}
