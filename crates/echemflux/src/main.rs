use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
use commands::cv::{handle_cv_command, CvArgs};
use commands::gcd::{handle_gcd_command, GcdArgs};

/// Analysis of electrochemical instrument exports
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Galvanostatic charge/discharge: per-level capacity, energy and power density
    Gcd(GcdArgs),
    /// Cyclic voltammetry: normalize the export to SI units
    Cv(CvArgs),
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Gcd(args) => handle_gcd_command(args),
        Command::Cv(args) => handle_cv_command(args),
    }
}
