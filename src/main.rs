//! groom - interactive repository maintenance

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::context::CommandContext;
use cli::style::Stylize;
use cli::{FlowEnd, prompt_error};
use dialoguer::Select;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "groom",
    version,
    about = "Interactive repository maintenance: prune orphaned branches and merge dependency updates"
)]
struct Cli {
    /// Path to the git repository (defaults to the current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log git and gh activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Delete local branches that no longer exist on the remote
    Prune,
    /// Merge dependency-update PRs into the staging branch
    Deps,
}

const MENU: [&str; 3] = ["Prune branches", "Merge dependency updates", "Quit"];

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("git_groom=debug,groom=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_flow(command: Commands, ctx: &CommandContext) -> git_groom::error::Result<FlowEnd> {
    match command {
        Commands::Prune => cli::prune::run_prune(ctx).await,
        Commands::Deps => cli::deps::run_deps(ctx).await,
    }
}

fn pick_from_menu() -> git_groom::error::Result<Option<Commands>> {
    let choice = Select::new()
        .with_prompt("What would you like to do?")
        .items(&MENU[..])
        .default(0)
        .interact_opt()
        .map_err(prompt_error)?;
    Ok(match choice {
        Some(0) => Some(Commands::Prune),
        Some(1) => Some(Commands::Deps),
        _ => None,
    })
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let path = cli.path.unwrap_or_else(|| PathBuf::from("."));
    let ctx = CommandContext::new(&path, cli.config.as_deref())?;

    if let Some(command) = cli.command {
        return Ok(match run_flow(command, &ctx).await? {
            FlowEnd::Failed => ExitCode::FAILURE,
            FlowEnd::Menu | FlowEnd::Exit => ExitCode::SUCCESS,
        });
    }

    loop {
        let Some(command) = pick_from_menu()? else {
            return Ok(ExitCode::SUCCESS);
        };
        match run_flow(command, &ctx).await? {
            FlowEnd::Menu => anstream::println!(),
            FlowEnd::Exit => return Ok(ExitCode::SUCCESS),
            FlowEnd::Failed => return Ok(ExitCode::FAILURE),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            anstream::eprintln!("{} {e:#}", "Error:".error());
            ExitCode::FAILURE
        }
    }
}
