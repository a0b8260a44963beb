mod shell;

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tareas::app::{App, AppError, Screen};
use tareas::config::{API_URL_ENV, ClientConfig, ConfigError, STORAGE_PATH_ENV};
use tareas::net::api::ApiError;
use tareas::net::types::{NewTask, Priority, RegisterRequest, TaskPatch};
use tareas::views;
use tracing_subscriber::EnvFilter;

use crate::shell::ShellCommand;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("io failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid due date `{0}` (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("nothing to update; pass at least one field")]
    EmptyPatch,
}

impl CliError {
    fn is_unauthorized(&self) -> bool {
        match self {
            Self::Api(e) | Self::App(AppError::Api(e)) => e.is_unauthorized(),
            Self::App(AppError::LoginRequired) => true,
            _ => false,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tareas", about = "Task list client for the tareas API")]
struct Cli {
    /// Server base address [default: http://127.0.0.1:5000].
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Session storage file [default: ~/.tareas/storage.json].
    #[arg(long, env = STORAGE_PATH_ENV)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the API answers.
    Ping,
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        nombre: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Navigate to a route and render it.
    Open {
        #[arg(default_value = "/")]
        path: String,
    },
    Task(TaskCommand),
    /// Interactive navigation shell reading commands from stdin.
    Shell,
}

#[derive(Args, Debug)]
struct TaskCommand {
    #[command(subcommand)]
    command: TaskSubcommand,
}

#[derive(Subcommand, Debug)]
enum TaskSubcommand {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, help = "Due date, YYYY-MM-DD")]
        due: Option<String>,
    },
    Done {
        id: i64,
    },
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, help = "Due date, YYYY-MM-DD")]
        due: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
    },
    Delete {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    init_tracing();
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, ".env file ignored");
        }
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            if e.is_unauthorized() {
                eprintln!("inicia sesión con `tareas login --email <email> --password <password>`");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    Ok(ClientConfig::resolve(cli.api_url.as_deref(), cli.storage.clone())?)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = resolve_config(&cli)?;
    tracing::debug!(api_url = %config.api_url, storage = %config.storage_path.display(), "config resolved");
    let mut app = App::from_config(&config);

    match cli.command {
        Command::Ping => {
            println!("{}", app.api().ping().await?);
            Ok(())
        }
        Command::Login { email, password } => run_login(&app, &email, &password).await,
        Command::Register { nombre, email, password } => {
            app.register(&RegisterRequest { name: nombre, email, password }).await?;
            println!("Usuario registrado. Inicia sesión con `tareas login`.");
            Ok(())
        }
        Command::Logout => {
            app.logout()?;
            println!("Sesión cerrada.");
            Ok(())
        }
        Command::Open { path } => {
            let screen = app.open(&path).await?;
            print_screen(&screen);
            Ok(())
        }
        Command::Task(task) => run_task(&mut app, task).await,
        Command::Shell => run_shell(&mut app).await,
    }
}

async fn run_login(app: &App, email: &str, password: &str) -> Result<(), CliError> {
    let response = app.login(email, password).await?;
    match response.message {
        Some(message) => println!("{message} ({})", response.user.name),
        None => println!("Sesión iniciada ({})", response.user.name),
    }
    Ok(())
}

async fn run_task(app: &mut App, task: TaskCommand) -> Result<(), CliError> {
    app.require_auth()?;
    let api = app.api();

    match task.command {
        TaskSubcommand::Add { title, description, priority, due } => {
            let new_task = NewTask { title, description, priority, due_date: validate_due(due)? };
            let created = api.create_task(&new_task).await?;
            println!("{}", views::tasks::render(std::slice::from_ref(&created)));
        }
        TaskSubcommand::Done { id } => {
            let patch = TaskPatch { completed: Some(true), ..TaskPatch::default() };
            let updated = api.update_task(id, &patch).await?;
            println!("{}", views::tasks::render(std::slice::from_ref(&updated)));
        }
        TaskSubcommand::Update { id, title, description, priority, due, completed } => {
            let patch = TaskPatch { title, description, priority, due_date: validate_due(due)?, completed };
            if patch.is_empty() {
                return Err(CliError::EmptyPatch);
            }
            let updated = api.update_task(id, &patch).await?;
            println!("{}", views::tasks::render(std::slice::from_ref(&updated)));
        }
        TaskSubcommand::Delete { id } => {
            api.delete_task(id).await?;
            println!("Tarea {id} eliminada.");
        }
    }
    Ok(())
}

fn validate_due(due: Option<String>) -> Result<Option<String>, CliError> {
    match due {
        Some(raw) if views::calendar::parse_due_date(&raw).is_none() => Err(CliError::InvalidDate(raw)),
        other => Ok(other),
    }
}

fn print_screen(screen: &Screen) {
    let resolved = &screen.resolved;
    if resolved.guard_redirected {
        println!("{} requiere sesión; redirigido a {}", resolved.requested, resolved.path);
    }
    println!("== {} ==", resolved.path);
    println!("{}", screen.body);
}

async fn run_shell(app: &mut App) -> Result<(), CliError> {
    println!("{}", shell::HELP);
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("tareas> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            return Ok(());
        }

        let command = match shell::parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        if command == ShellCommand::Quit {
            return Ok(());
        }
        if let Err(e) = run_shell_command(app, command).await {
            println!("error: {e}");
        }
    }
}

async fn run_shell_command(app: &mut App, command: ShellCommand) -> Result<(), CliError> {
    match command {
        ShellCommand::Go(path) => print_screen(&app.open(&path).await?),
        ShellCommand::Back => match app.back().await? {
            Some(screen) => print_screen(&screen),
            None => println!("inicio del historial"),
        },
        ShellCommand::Forward => match app.forward().await? {
            Some(screen) => print_screen(&screen),
            None => println!("fin del historial"),
        },
        ShellCommand::Login { email, password } => run_login(app, &email, &password).await?,
        ShellCommand::Logout => {
            app.logout()?;
            println!("Sesión cerrada.");
        }
        ShellCommand::Where => println!("{}", app.router().current().unwrap_or("(sin navegación)")),
        ShellCommand::Help => println!("{}", shell::HELP),
        ShellCommand::Quit => {}
    }
    Ok(())
}
