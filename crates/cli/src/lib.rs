pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use storefront_core::config::LoadOptions;

#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    about = "Storefront operator CLI",
    long_about = "Apply catalog migrations, load the demo catalog, and inspect settings.",
    after_help = concat!(
        "Examples:\n",
        "  storefront migrate\n",
        "  storefront --config prod.toml seed\n",
        "  storefront config"
    )
)]
pub struct Cli {
    /// Settings file to use instead of `storefront.toml` or `config/storefront.toml`.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Apply migrations, then load and verify the deterministic demo catalog")]
    Seed,
    #[command(about = "Print the effective configuration after file and environment overrides")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions { config_path: cli.config };

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(&options),
        Command::Seed => commands::seed::run(&options),
        Command::Config => commands::config::run(&options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
