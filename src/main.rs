use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use todostore::config::{Config, StorageBackend};
use todostore::datastore::{
    Diagnostics, FileStorage, KeyValueStorage, MemoryStorage, TaskEditor, TaskStore,
    TracingDiagnostics,
};
use todostore::model::{clamp_title, Task, TaskId};
use todostore::session::{ListSession, Submitted, ThemeContext};

#[derive(Parser)]
#[command(name = "todostore", version = env!("FULL_VERSION"), about = "Manage the local task list")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "TODOSTORE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print all tasks, newest first
    List,
    /// Add a task
    Add { title: Vec<String> },
    /// Flip a task between open and completed
    Toggle { id: TaskId },
    /// Delete a task
    Delete { id: TaskId },
    /// Rename a task through the list screen
    Rename { id: TaskId, title: Vec<String> },
    /// Print a single task through the edit path
    Show { id: String },
    /// Rename a single task through the edit path
    Edit { id: String, title: Vec<String> },
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    let env_filter = EnvFilter::try_from_env("TODOSTORE_LOG");
    todostore::log::setup(env_filter, config.log.as_ref())?;

    info!("Starting todostore: {}", env!("FULL_VERSION"));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match config.storage.backend.clone() {
            StorageBackend::Memory => {
                warn!("memory backend selected, changes will not outlive this process");
                run(Arc::new(MemoryStorage::new()), &config, cli.command).await
            }
            StorageBackend::File { path } => {
                run(Arc::new(FileStorage::new(path)), &config, cli.command).await
            }
        }
    })
}

async fn run<S: KeyValueStorage>(
    storage: Arc<S>,
    config: &Config,
    command: Command,
) -> anyhow::Result<()> {
    let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics);

    match command {
        Command::List => {
            let session = open_session(storage, config, diagnostics).await;
            close_session(session).await;
        }
        Command::Add { title } => {
            let mut session = open_session(storage, config, diagnostics).await;
            session.set_input(&title.join(" "));
            match session.submit() {
                Submitted::Added(id) => info!(id, "task added"),
                _ => warn!("blank title, nothing added"),
            }
            close_session(session).await;
        }
        Command::Toggle { id } => {
            let mut session = open_session(storage, config, diagnostics).await;
            session.toggle_completed(id);
            close_session(session).await;
        }
        Command::Delete { id } => {
            let mut session = open_session(storage, config, diagnostics).await;
            session.delete(id);
            close_session(session).await;
        }
        Command::Rename { id, title } => {
            let mut session = open_session(storage, config, diagnostics).await;
            session.select(id);
            if session.selected().is_none() {
                bail!("task {} not found", id);
            }
            session.set_input(&title.join(" "));
            session.submit();
            close_session(session).await;
        }
        Command::Show { id } => {
            let editor = TaskEditor::new(storage, config.storage.key.clone(), diagnostics);
            match editor.load_one(&id).await {
                Some(task) => print_task(&task),
                None => bail!("task {} not found", id),
            }
        }
        Command::Edit { id, title } => {
            let editor = TaskEditor::new(storage, config.storage.key.clone(), diagnostics);
            let mut task = match editor.load_one(&id).await {
                Some(task) => task,
                None => bail!("task {} not found", id),
            };
            task.title = clamp_title(&title.join(" "));
            let outcome = editor.save_one(task.clone()).await;
            if !outcome.is_done() {
                bail!("unable to save task {}", id);
            }
            info!(?outcome, "task saved");
            print_task(&task);
        }
    }
    Ok(())
}

async fn open_session<S: KeyValueStorage>(
    storage: Arc<S>,
    config: &Config,
    diagnostics: Arc<dyn Diagnostics>,
) -> ListSession<S> {
    let mut store = TaskStore::new(storage, config.store_settings(), diagnostics);
    store.initialize().await;
    ListSession::new(store, ThemeContext::new(config.theme.color_scheme))
}

async fn close_session<S: KeyValueStorage>(session: ListSession<S>) {
    session.store().flush().await;
    print_list(&session);
}

fn print_list<S: KeyValueStorage>(session: &ListSession<S>) {
    for task in session.visible_tasks() {
        print_task(&task);
    }
}

fn print_task(task: &Task) {
    let mark = if task.completed { "x" } else { " " };
    println!("{:>4} [{}] {}", task.id, mark, task.title);
}
