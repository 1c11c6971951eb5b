//! taskdeck command line client
//!
//! Wires the core synchronizer to the terminal: one command per user action.

mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskdeck_core::auth::Authenticator;
use taskdeck_core::config::ClientConfig;
use taskdeck_core::gateway::{HttpGateway, TaskApi};
use taskdeck_core::intent::{dispatch, AlwaysConfirm, Confirm, Dispatched, EditForm, Intent};
use taskdeck_core::session::{FileSessionStore, SessionStore};
use taskdeck_core::sync::Synchronizer;
use taskdeck_core::task::{TaskFields, TaskFilter, TaskId, TaskPriority, TaskStatus};
use taskdeck_core::ClientError;

use crate::terminal::{StdinConfirm, TerminalScreen};

#[derive(Parser, Debug)]
#[command(
    name = "taskdeck",
    version,
    about = "Terminal client for the taskdeck task API"
)]
struct Cli {
    /// Base URL of the task API (overrides TASKDECK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory holding the session file (overrides TASKDECK_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and log in
    Register {
        username: String,
        email: String,
        #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in with a username or email
    Login {
        identifier: String,
        #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out and forget the local session
    Logout,
    /// Show the task board
    List {
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        /// Only tasks due on this date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// Create a task
    Add {
        title: String,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Mark a task as done
    Done { id: TaskId },
    /// Delete a task
    Rm { id: TaskId },
    /// Edit a task; unspecified fields keep their current value
    Edit(EditArgs),
}

#[derive(Args, Debug, Default)]
struct EditArgs {
    id: TaskId,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    status: Option<TaskStatus>,
    #[arg(long)]
    priority: Option<TaskPriority>,
    #[arg(long, conflicts_with = "no_due")]
    due: Option<NaiveDate>,
    /// Remove the due date
    #[arg(long)]
    no_due: bool,
    #[arg(long, conflicts_with = "no_comment")]
    comment: Option<String>,
    /// Remove the comment
    #[arg(long)]
    no_comment: bool,
}

impl EditArgs {
    fn apply(self, form: &mut EditForm) {
        let fields = &mut form.fields;
        if let Some(title) = self.title {
            fields.title = title;
        }
        if let Some(status) = self.status {
            fields.status = status;
        }
        if let Some(priority) = self.priority {
            fields.priority = priority;
        }
        if self.no_due {
            fields.due_date = None;
        } else if let Some(due) = self.due {
            fields.due_date = Some(due);
        }
        if self.no_comment {
            fields.comment = None;
        } else if let Some(comment) = self.comment {
            fields.comment = Some(comment);
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck=warn,taskdeck_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn report(err: &anyhow::Error) -> ExitCode {
    if let Some(message) = error_message(err) {
        eprintln!("Error: {}", message);
    }
    match err.downcast_ref::<ClientError>() {
        Some(client_err) if client_err.is_silent() => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

/// Text to print for a failed command
///
/// Redirects have already put the login hint on screen, and cancellations
/// print nothing.
fn error_message(err: &anyhow::Error) -> Option<String> {
    match err.downcast_ref::<ClientError>() {
        Some(client_err) if client_err.is_silent() || client_err.redirects_to_login() => None,
        Some(client_err) => Some(client_err.user_message()),
        None => Some(format!("{:#}", err)),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::from_env();
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url);
    }
    if let Some(data_dir) = cli.data_dir {
        config = config.with_data_dir(data_dir);
    }
    debug!("Using API at {}", config.api_url);

    let api: Arc<dyn TaskApi> = Arc::new(HttpGateway::new(&config)?);
    let session_path = config.session_path();
    let session: Arc<dyn SessionStore> = Arc::new(
        FileSessionStore::new(&session_path)
            .await
            .with_context(|| format!("Failed to open session file {:?}", session_path))?,
    );
    let confirm: Box<dyn Confirm> = if cli.yes || config.assume_yes {
        Box::new(AlwaysConfirm)
    } else {
        Box::new(StdinConfirm)
    };
    let sync = Synchronizer::new(Arc::clone(&api), Arc::clone(&session), Arc::new(TerminalScreen));

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            Authenticator::new(api, session)
                .register(&username, &email, &password)
                .await?;
            println!("Registered and logged in as {}.", username);
        }
        Command::Login {
            identifier,
            password,
        } => {
            let auth = Authenticator::new(api, session)
                .login(&identifier, &password)
                .await?;
            let name = auth.username.unwrap_or(identifier);
            println!("Logged in as {}.", name);
        }
        Command::Logout => {
            sync.logout().await?;
            println!("Successfully logged out.");
        }
        Command::List {
            status,
            priority,
            due,
        } => {
            let filter = TaskFilter {
                status,
                priority,
                due_date: due,
            };
            sync.with_filter(filter).refresh().await?;
        }
        Command::Add {
            title,
            status,
            priority,
            due,
            comment,
        } => {
            let fields = TaskFields {
                title,
                status: status.unwrap_or_default(),
                priority: priority.unwrap_or_default(),
                due_date: due,
                comment,
            };
            sync.create(&fields).await?;
        }
        Command::Done { id } => {
            dispatch(Intent::MarkDone(id), &sync, confirm.as_ref()).await?;
        }
        Command::Rm { id } => {
            dispatch(Intent::Delete(id), &sync, confirm.as_ref()).await?;
        }
        Command::Edit(edits) => {
            let task = sync.load(edits.id).await?;
            let intent = Intent::Edit(EditForm::from_task(&task));
            if let Dispatched::OpenEditor(mut form) =
                dispatch(intent, &sync, confirm.as_ref()).await?
            {
                edits.apply(&mut form);
                form.submit(&sync).await?;
            }
        }
    }

    Ok(())
}
