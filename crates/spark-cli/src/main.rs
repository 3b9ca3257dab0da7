use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::{OwoColorize, Style};
use spark_core::auth;
use spark_core::db;
use spark_core::error::CoreError;
use spark_core::notify::ChangeNotifier;
use spark_core::repository::SqliteRepository;
use spark_core::timezone::validate_timezone;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod query_parser;
mod timezone;
mod util;
mod views;

use cli::{Cli, Commands};
use config::Config;

/// Logs go to stderr so they never mix with command output. `RUST_LOG` wins
/// over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Invalid configuration: {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    init_tracing(&config.log_level);

    if let Err(e) = run(cli.command, &config).await {
        handle_error(e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &Config) -> Result<()> {
    let timezone = config.timezone();
    validate_timezone(&timezone)?;
    let today = config.today()?;
    tracing::debug!(%timezone, %today, "resolved today");

    // Date tools need no storage.
    let command = match command {
        Commands::Calendar(command) => return commands::calendar::show_calendar(command, today),
        Commands::Suggest(command) => return commands::suggest::suggest_date(command, today),
        command => command,
    };

    let pool = db::establish_connection(&config.database_path)
        .await
        .with_context(|| format!("Could not open {}", config.database_path.display()))?;

    let command = match command {
        Commands::Auth(command) => return commands::auth::handle_auth(&pool, command.command).await,
        command => command,
    };

    let user = match auth::current_user(&pool).await? {
        Some(user) => user,
        None => auth::sign_in_anonymously(&pool).await?,
    };
    let repository = SqliteRepository::new(pool, user.id, ChangeNotifier::default());

    match command {
        Commands::Add(command) => commands::add::add_task(&repository, command, today).await,
        Commands::List(command) => {
            commands::list::list_tasks(&repository, command, config, today).await
        }
        Commands::Show(command) => commands::show::show_task(&repository, command, today).await,
        Commands::Do(command) => commands::r#do::do_task(&repository, command).await,
        Commands::Undo(command) => commands::r#do::undo_task(&repository, command).await,
        Commands::Edit(command) => commands::edit::edit_task(&repository, command, today).await,
        Commands::Delete(command) => commands::delete::delete_task(&repository, command).await,
        Commands::Area(command) => commands::area::handle_area(&repository, command.command).await,
        Commands::Project(command) => {
            commands::project::handle_project(&repository, command.command, today).await
        }
        Commands::Subtask(command) => {
            commands::subtask::handle_subtask(&repository, command.command).await
        }
        Commands::Recur(command) => {
            commands::recur::handle_recur(&repository, command.command, today).await
        }
        Commands::Block(command) => {
            commands::block::handle_block(&repository, command.command, &timezone, today).await
        }
        Commands::Calendar(_) | Commands::Suggest(_) | Commands::Auth(_) => Ok(()),
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    match err.downcast_ref::<CoreError>() {
        Some(CoreError::NotFound(s)) => {
            eprintln!("{} {}", "Error:".style(error_style), s);
        }
        Some(CoreError::AmbiguousId(items)) => {
            eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
            eprintln!("Did you mean one of these?");
            for (id, title) in items {
                eprintln!("  {} ({})", id.yellow(), title);
            }
        }
        Some(CoreError::InvalidInput(s)) => {
            eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
        }
        Some(CoreError::Unauthorized(s)) => {
            eprintln!("{} Not allowed: {}", "Error:".style(error_style), s);
        }
        Some(CoreError::NotSignedIn) => {
            eprintln!(
                "{} No user is signed in. Run `spark auth signin <email>` first.",
                "Error:".style(error_style)
            );
        }
        _ => eprintln!("{} {:#}", "Error:".style(error_style), err),
    }
}
