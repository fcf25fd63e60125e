mod commands;

use clap::{Parser, Subcommand};
use commands::{Failure, EXIT_FAILURE};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "tagforge",
    version,
    about = "Build content-addressed amiibo and skylanders catalog distributions"
)]
struct Cli {
    /// Path to a tagforge.toml config file (default: ./tagforge.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output the build report as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Merge sources and patches and publish the distribution (the default).
    Build {
        /// Fail when two image sources publish the same path.
        #[arg(long, default_value_t = false)]
        strict_assets: bool,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("TAGFORGE_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let result = match std::env::current_dir() {
        Ok(workdir) => {
            let strict_assets = match cli.command {
                Some(Commands::Build { strict_assets }) => strict_assets,
                None => false,
            };
            commands::build::run(&workdir, cli.config.as_deref(), strict_assets, cli.json)
        }
        Err(e) => Err(Failure::new(
            EXIT_FAILURE,
            format!("cannot determine working directory: {e}"),
        )),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(failure) => {
            eprintln!("error: {}", failure.message);
            ExitCode::from(failure.code)
        }
    }
}
