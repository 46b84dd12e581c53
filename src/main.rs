use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use taskboard::config::AppConfig;
use taskboard::kanban_board::{reduce, Action, Board};
use taskboard::ui::{run_app, App};
use taskboard::{logging, ApiClient, BoardController, TaskApi};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(version, about = "Kanban board for a remote task API")]
struct Cli {
    /// API root, e.g. http://localhost:8000/api. Overrides TASKBOARD_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Where the interactive board writes its log. Overrides TASKBOARD_LOG_FILE.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every column and its tasks, then exit
    List,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()
        .and_then(|c| c.with_overrides(cli.api_url.as_deref(), cli.log_file.clone()))
        .context("Invalid configuration")?;

    match cli.command {
        Some(Commands::List) => {
            logging::init_stderr();
            list(&config).await
        }
        None => {
            let _guard = logging::init_file(&config.log_file).with_context(|| {
                format!("Failed to open log file {}", config.log_file.display())
            })?;
            interactive(&config).await
        }
    }
}

async fn list(config: &AppConfig) -> Result<()> {
    let api = ApiClient::new(&config.api_url);
    let tasks = api
        .fetch_tasks()
        .await
        .with_context(|| format!("Failed to load tasks from {}", config.api_url))?;
    let board = reduce(Board::default(), Action::SetBoardData(tasks));

    for status in board.column_order() {
        let Some(column) = board.column(&status) else {
            continue;
        };
        println!("{} ({}):", column.title, column.tasks.len());
        for task in &column.tasks {
            match task.description.as_deref().filter(|d| !d.is_empty()) {
                Some(description) => println!("  {}. {} - {}", task.order, task.title, description),
                None => println!("  {}. {}", task.order, task.title),
            }
        }
    }
    Ok(())
}

async fn interactive(config: &AppConfig) -> Result<()> {
    tracing::info!(api_url = %config.api_url, "starting board");
    let mut controller = BoardController::new(ApiClient::new(&config.api_url));
    // A failed load is shown on the board itself.
    let _ = controller.load().await;
    let mut app = App::new(controller, &config.api_url);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result.context("Board terminated with an error")
}
