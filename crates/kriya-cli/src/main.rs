//! Kriya CLI - command-line client for the Kriya job scheduler.

mod commands;
mod prompt;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use kriya_auth::AuthGateway;
use kriya_core::{init_logging, Config, Paths};
use kriya_jobs::JobsClient;
use kriya_storage::{FileSessionStore, SessionStore};

/// Kriya command-line interface.
#[derive(Parser)]
#[command(name = "kriya")]
#[command(about = "Manage scheduled jobs on Kriya")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Base directory for runtime files (session, config). Defaults to ~/.kriya
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password (or a federated credential)
    Login {
        /// Google ID token obtained from the provider, skipping the
        /// password prompt
        #[arg(long, value_name = "TOKEN")]
        google_credential: Option<String>,
    },
    /// Create an account (email verification by one-time password)
    Signup,
    /// Reset a forgotten password (email verification by one-time password)
    ResetPassword,
    /// Set a local password on a federated account
    SetPassword,
    /// Show session status
    Status,
    /// Sign out and clear the local session
    Logout,
    /// Manage scheduled jobs
    #[command(subcommand)]
    Job(JobCommands),
}

#[derive(Subcommand)]
enum JobCommands {
    /// List all jobs
    List,
    /// Show one job
    Show { id: String },
    /// Create a job interactively
    Create,
    /// Delete a job
    Delete { id: String },
    /// Run a job now, outside its schedule
    Run { id: String },
}

/// Shared wiring for every command: session store and HTTP clients.
pub(crate) struct App {
    pub store: Arc<dyn SessionStore>,
    pub gateway: AuthGateway,
    pub jobs: JobsClient,
}

impl App {
    fn build(config: &Config, paths: &Paths) -> anyhow::Result<Self> {
        // One HTTP client for both API surfaces: the auth cookie set at
        // sign-in must be visible to the job endpoints.
        let http_client = reqwest::Client::builder().cookie_store(true).build()?;

        let store: Arc<dyn SessionStore> =
            Arc::new(FileSessionStore::new(paths.session_file()));
        let gateway = AuthGateway::new(http_client.clone(), config.api_url());
        let jobs = JobsClient::new(http_client, config.api_url());

        Ok(Self {
            store,
            gateway,
            jobs,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    let config = Config::load(&paths)?;
    let app = App::build(&config, &paths)?;

    match cli.command {
        Commands::Login { google_credential } => {
            commands::auth::login(&app, google_credential.as_deref()).await?;
        }
        Commands::Signup => {
            commands::auth::signup(&app).await?;
        }
        Commands::ResetPassword => {
            commands::auth::reset_password(&app).await?;
        }
        Commands::SetPassword => {
            commands::auth::set_password(&app).await?;
        }
        Commands::Status => {
            commands::auth::status(&app).await?;
        }
        Commands::Logout => {
            commands::auth::logout(&app).await?;
        }
        Commands::Job(job_command) => match job_command {
            JobCommands::List => commands::jobs::list(&app).await?,
            JobCommands::Show { id } => commands::jobs::show(&app, &id).await?,
            JobCommands::Create => commands::jobs::create(&app).await?,
            JobCommands::Delete { id } => commands::jobs::delete(&app, &id).await?,
            JobCommands::Run { id } => commands::jobs::run(&app, &id).await?,
        },
    }

    Ok(())
}
