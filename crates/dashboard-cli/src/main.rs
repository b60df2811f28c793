mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;
use dashboard_core::DashboardError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("DASHBOARD_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "dashboard", &mut std::io::stdout());
        return Ok(());
    }

    let ctx = CliContext::load(&cli);
    if let Err(e) = run(&ctx, cli.command).await {
        let message = match e.downcast_ref::<DashboardError>() {
            Some(DashboardError::NotSignedIn) => {
                "Not signed in: pass --user or set DASHBOARD_USER".to_string()
            }
            _ => e.to_string(),
        };
        output::output_error(&message);
    }

    Ok(())
}

async fn run(ctx: &CliContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Board(board_cmd) => handlers::board::handle(ctx, board_cmd.action).await?,
        Commands::Note(note_cmd) => handlers::note::handle(ctx, note_cmd.action).await?,
        Commands::Keyword(keyword_cmd) => {
            handlers::keyword::handle(ctx, keyword_cmd.action).await?
        }
        Commands::Prompt(prompt_cmd) => handlers::assist::handle_prompt(prompt_cmd.action),
        Commands::Describe(args) => handlers::assist::handle_describe(ctx, args).await?,
        Commands::Apps(apps_cmd) => handlers::assist::handle_apps(ctx, apps_cmd.action).await?,
        Commands::Completions { .. } => {}
    }
    Ok(())
}
