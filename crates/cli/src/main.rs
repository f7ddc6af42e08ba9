//! assistctl - SteadyPoint control CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod bench;
mod profiler;

#[derive(Parser)]
#[command(name = "assistctl")]
#[command(about = "SteadyPoint assistive cursor toolkit")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the deterministic pointing benchmark over a target layout
    Bench {
        /// Target layout file (JSON)
        layout: PathBuf,
        /// Motor profile to map a config from
        #[arg(long)]
        profile: Option<PathBuf>,
        /// Assistive config document; overrides --profile
        #[arg(long)]
        assist: Option<PathBuf>,
        /// Number of trials
        #[arg(long, default_value_t = 10)]
        trials: u32,
        /// PRNG seed (hex)
        #[arg(long, default_value = "C0FFEE")]
        seed: String,
        /// Write the JSON report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Motor profiling tools
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Estimate a motor profile from a recorded trace
    Ingest {
        /// Trace file (line-delimited JSON)
        trace: PathBuf,
        /// Write the profile document here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also map the profile and write the config document here
        #[arg(long)]
        emit_config: Option<PathBuf>,
        /// Profile id to stamp into the output
        #[arg(long, default_value = "ingested")]
        profile_id: String,
    },
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Bench {
            layout,
            profile,
            assist,
            trials,
            seed,
            output,
        } => bench::run(&bench::BenchArgs {
            layout,
            profile,
            assist,
            trials,
            seed,
            output,
        }),
        Commands::Profile { command } => match command {
            ProfileCommands::Ingest {
                trace,
                out,
                emit_config,
                profile_id,
            } => profiler::ingest(&trace, out.as_deref(), emit_config.as_deref(), &profile_id),
        },
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
