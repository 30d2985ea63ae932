//! c3pa - evaluation CLI for LLM privacy-policy classification
//!
//! # Usage
//!
//! ```bash
//! # Combine repeated runs
//! c3pa merge --inputs run1.json run2.json --output combined.json
//!
//! # Score one file, dropping conflicting near-duplicate spans first
//! c3pa evaluate --input combined.json --filter --threshold 0.75
//!
//! # Compare two runs
//! c3pa compare --input1 before.json --input2 after.json --log comparison.txt
//!
//! # Label sampled policies (needs --features network)
//! c3pa infer --models openai:gpt-4.1-mini --policies-dir dumps/
//! ```
//!
//! Reports go to stdout; logs go to stderr, filtered by `RUST_LOG` or `-v`.
//! API keys are read from the environment or a `.env` file in the working
//! directory (or a parent).

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    use c3pa_eval::cli::commands::*;
    use c3pa_eval::cli::parser::{Cli, Commands};
    use clap_complete::generate;

    // Provider keys and C3PA_POLICIES_DIR may live in a .env file;
    // variables already set win.
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<(), String> = match cli.command {
        Commands::Merge(args) => merge::run(args),
        Commands::Compare(args) => compare::run(args),
        Commands::Evaluate(args) => evaluate::run(args),
        Commands::Infer(args) => infer::run(args),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "c3pa", &mut io::stdout());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
