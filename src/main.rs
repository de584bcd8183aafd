mod commands;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use greenlight_core::AclRole;
use greenlight_core::logging::{TracingConfig, init_tracing};
use owo_colors::OwoColorize;

#[derive(Parser)]
#[command(name = "greenlight-cal")]
#[command(about = "Sync Green Light Cinema showtimes into a Google Calendar")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Calendar to operate on (defaults to CALENDAR_ID)
    #[arg(long, global = true)]
    calendar_id: Option<String>,

    /// Service account key file (defaults to CREDENTIALS_FILE or CREDENTIALS_JSON)
    #[arg(long, global = true)]
    credentials_file: Option<PathBuf>,

    /// Config file (defaults to ~/.config/greenlight-cal/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the calendar itself
    Calendar {
        #[command(subcommand)]
        command: CalendarCommand,
    },
    /// Manage showtime events
    Events {
        #[command(subcommand)]
        command: EventsCommand,
    },
}

#[derive(Subcommand)]
enum CalendarCommand {
    /// List calendars the service account can see
    List,
    /// Create a new calendar and print its id
    Create {
        /// Calendar name (defaults to calendar_name from config)
        name: Option<String>,

        /// Don't make the calendar publicly readable
        #[arg(long)]
        private: bool,
    },
    /// Delete the calendar
    Delete,
    /// Show who has access to the calendar
    Acl,
    /// Give someone owner access
    AddOwner { email: String },
    /// Take away someone's owner access
    RemoveOwner { email: String },
    /// Give someone write access
    AddWriter { email: String },
    /// Take away someone's write access
    RemoveWriter { email: String },
}

#[derive(Subcommand)]
enum EventsCommand {
    /// Scrape showtimes and sync them into the calendar
    Update {
        /// Show what would change without changing anything
        #[arg(long)]
        dry_run: bool,

        /// Delete events even when no showings were found (dangerous)
        #[arg(long)]
        force: bool,

        /// Read the showtimes page from a file instead of the web
        #[arg(long, conflicts_with = "showings_file")]
        html_file: Option<PathBuf>,

        /// Use showings from `events dump` instead of scraping
        #[arg(long)]
        showings_file: Option<PathBuf>,

        /// Sync into a local JSON file instead of Google Calendar
        #[arg(long)]
        calendar_file: Option<PathBuf>,
    },
    /// Scrape showtimes and print them as JSON
    Dump {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read the showtimes page from a file instead of the web
        #[arg(long)]
        html_file: Option<PathBuf>,
    },
    /// Print the calendar's events as JSON
    List {
        #[arg(long)]
        calendar_file: Option<PathBuf>,
    },
    /// Delete every event this tool created
    Clear {
        #[arg(long)]
        dry_run: bool,

        #[arg(long)]
        calendar_file: Option<PathBuf>,
    },
    /// Delete events by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing = if cli.global.verbose {
        TracingConfig::verbose()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing) {
        eprintln!("{} {}", "warning:".yellow(), e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = commands::Context::load(&cli.global)?;

    match cli.command {
        Commands::Calendar { command } => match command {
            CalendarCommand::List => commands::calendar::list(&ctx).await,
            CalendarCommand::Create { name, private } => {
                commands::calendar::create(&ctx, name, private).await
            }
            CalendarCommand::Delete => commands::calendar::delete(&ctx).await,
            CalendarCommand::Acl => commands::calendar::acl(&ctx).await,
            CalendarCommand::AddOwner { email } => {
                commands::calendar::add_member(&ctx, &email, AclRole::Owner).await
            }
            CalendarCommand::RemoveOwner { email } => {
                commands::calendar::remove_member(&ctx, &email, AclRole::Owner).await
            }
            CalendarCommand::AddWriter { email } => {
                commands::calendar::add_member(&ctx, &email, AclRole::Writer).await
            }
            CalendarCommand::RemoveWriter { email } => {
                commands::calendar::remove_member(&ctx, &email, AclRole::Writer).await
            }
        },
        Commands::Events { command } => match command {
            EventsCommand::Update {
                dry_run,
                force,
                html_file,
                showings_file,
                calendar_file,
            } => {
                let options = commands::events::UpdateOptions {
                    dry_run,
                    force,
                    html_file,
                    showings_file,
                    calendar_file,
                };
                commands::events::update(&ctx, options).await
            }
            EventsCommand::Dump { output, html_file } => {
                commands::events::dump(&ctx, output, html_file).await
            }
            EventsCommand::List { calendar_file } => commands::events::list(&ctx, calendar_file).await,
            EventsCommand::Clear {
                dry_run,
                calendar_file,
            } => commands::events::clear(&ctx, dry_run, calendar_file).await,
            EventsCommand::Delete { ids } => commands::events::delete(&ctx, &ids).await,
        },
    }
}
