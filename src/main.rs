// ============================================================================
// CryptoDash - Point d'entrée
// ============================================================================
// Programme TUI : classement CoinGecko paginé, fiche + graphique par coin
//
// Architecture :
// - Thread principal : event loop (render → résultats → input)
// - Worker thread : appels réseau (tokio), via channels mpsc
// - Logs : fichier avec rotation quotidienne (le TUI occupe le terminal)
// ============================================================================

use std::io;
use std::sync::mpsc;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use cryptodash::api::CoinGeckoClient;
use cryptodash::app::App;
use cryptodash::config::Config;
use cryptodash::handler::{dispatch, handle_event, handle_result};
use cryptodash::ui::{render, EventHandler};
use cryptodash::worker::{spawn_worker, AppCommand, AppResult};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

// ============================================================================
// Initialisation du logging
// ============================================================================

/// Initialise le logging vers fichier
///
/// ```bash
/// tail -f ~/.local/share/cryptodash/logs/cryptodash.log.*
/// RUST_LOG=cryptodash=trace cargo run
/// ```
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory {:?}", config.log_dir))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, "cryptodash.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour cryptodash, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cryptodash=debug,info".into()),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    info!(log_dir = ?config.log_dir, "Logging initialized");
    Ok(())
}

fn main() -> Result<()> {
    // Un .env absent n'est pas une erreur
    dotenv::dotenv().ok();

    let config = Config::from_env().context("Invalid configuration")?;

    // Sans logs l'application reste utilisable
    if let Err(e) = init_logging(&config) {
        eprintln!("⚠️  Warning: failed to initialize logging: {:#}", e);
    }

    info!(
        api = %config.api_base_url,
        currency = %config.vs_currency,
        per_page = config.per_page,
        "CryptoDash starting up"
    );

    let client = CoinGeckoClient::new(&config)?;

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();
    // Le worker n'est pas joint à la sortie : une requête en cours ne doit pas
    // bloquer la fermeture
    let _worker = spawn_worker(client, command_rx, result_tx);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let mut app = App::with_config(&config);
    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &command_tx, &result_rx);

    // Restaure le terminal même si la boucle a échoué
    debug!("Restoring terminal");
    let restored = restore_terminal(&mut terminal);

    match &result {
        Ok(()) => info!(purchases = app.purchases.len(), "Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result.and(restored)
}

// ============================================================================
// Event Loop
// ============================================================================
// À chaque itération :
//   1. Applique les résultats du worker (non bloquant)
//   2. Dessine l'interface
//   3. Attend un événement clavier (au plus 250ms)
// ============================================================================

fn run(
    terminal: &mut Tui,
    app: &mut App,
    events: &EventHandler,
    command_tx: &mpsc::Sender<AppCommand>,
    result_rx: &mpsc::Receiver<AppResult>,
) -> Result<()> {
    while app.is_running() {
        loop {
            match result_rx.try_recv() {
                Ok(result) => {
                    if let Some(command) = handle_result(app, result) {
                        dispatch(app, command_tx, command)?;
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    anyhow::bail!("Background worker disconnected");
                }
            }
        }

        terminal.draw(|frame| render(frame, app))?;

        let event = events.next().context("Failed to read terminal event")?;
        if let Some(command) = handle_event(app, &event) {
            dispatch(app, command_tx, command)?;
        }
    }

    Ok(())
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    // Si la suite échoue, le shell ne doit pas rester en raw mode
    let terminal = enter_alternate_screen();
    on_error(terminal, || {
        if let Err(e) = disable_raw_mode() {
            error!(error = ?e, "Failed to disable raw mode");
        }
    })
}

fn enter_alternate_screen() -> Result<Tui> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

/// Exécute `cleanup` uniquement si `result` est une erreur
fn on_error<T>(result: Result<T>, cleanup: impl FnOnce()) -> Result<T> {
    if result.is_err() {
        cleanup();
    }
    result
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
