use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use skillexec::config::Config;
use skillexec::dispatch::{self, Outcome};
use skillexec::error::SkillError;

/// Run one agent skill and print its result as JSON.
#[derive(Debug, Parser)]
#[command(name = "skillexec", version)]
struct Cli {
    /// Skill name: bash or text_editor
    #[arg(long)]
    skill: String,

    /// Skill parameters as one JSON object
    #[arg(long)]
    params: String,

    /// Optional TOML file overriding defaults, denylist and sandbox root
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Off unless RUST_LOG says otherwise. Stdout is reserved for the result.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let outcome = match Cli::try_parse() {
        Ok(cli) => match run(cli) {
            Ok(outcome) => outcome,
            Err(e) => Outcome::failure(&SkillError::Execution(format!("{e:#}"))),
        },
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => Outcome::failure(&SkillError::Validation(e.to_string().trim_end().to_owned())),
    };

    println!("{}", outcome.document);
    ExitCode::from(outcome.exit_code())
}

fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let config = match cli.config.as_deref() {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => return Ok(Outcome::failure(&e)),
        },
        None => Config::default(),
    };

    // One child process at most; no need for worker threads.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    Ok(runtime.block_on(dispatch::dispatch(&cli.skill, &cli.params, &config)))
}
