use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::constants::UI_REFRESH_INTERVAL_MS;
use crate::session::{Turn, TurnOutcome};
use crate::tui::app::{App, InputAction, HELP_TEXT};
use crate::tui::render::render_ui;
use crate::utils::log_error;

/// Run the terminal UI
pub async fn run_ui(mut app: App) -> Result<()> {
    if !crossterm::tty::IsTty::is_tty(&io::stdout()) {
        eprintln!("❌ PinterPal requires an interactive terminal.");
        eprintln!("   Use --prompt for non-interactive mode.");
        return Err(anyhow::anyhow!("No interactive terminal available"));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Outcomes of spawned turns
    let (tx, mut rx) = mpsc::channel::<TurnOutcome>(16);

    if !app.auto_open {
        app.set_status(HELP_TEXT);
    }

    let res = run_app(&mut terminal, &mut app, tx, &mut rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log_error("❌", format!("UI loop failed: {:#}", err));
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn spawn_boot(app: &App) {
    let driver = app.driver.clone();
    tokio::spawn(async move {
        if !driver.boot().await {
            debug!("Boot deferred, a turn is in flight");
        }
    });
}

fn spawn_turn(app: &App, turn: Option<Turn>, tx: &mpsc::Sender<TurnOutcome>) {
    let driver = app.driver.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = match turn {
            Some(turn) => driver.submit(turn).await,
            None => driver.restart().await,
        };
        let _ = tx.send(outcome).await;
    });
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tx: mpsc::Sender<TurnOutcome>,
    rx: &mut mpsc::Receiver<TurnOutcome>,
) -> Result<()> {
    loop {
        // Retried each tick, so a boot that backed off for a turn runs once it is idle
        if app.wants_boot() {
            spawn_boot(app);
        }

        app.sync();
        terminal.draw(|f| {
            app.chat_height = f.area().height.saturating_sub(12);
            app.chat_width = f.area().width.saturating_sub(2);
            render_ui(f, app)
        })?;

        if event::poll(Duration::from_millis(UI_REFRESH_INTERVAL_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
                    app.quit();
                    break;
                }

                match key.code {
                    KeyCode::Enter => match app.take_input() {
                        InputAction::Submit(turn) => spawn_turn(app, Some(turn), &tx),
                        InputAction::Restart => spawn_turn(app, None, &tx),
                        InputAction::Help => app.set_status(HELP_TEXT),
                        InputAction::Quit => app.quit(),
                        InputAction::Unknown(message) => app.set_status(message),
                        InputAction::Nothing => {
                            debug!("Enter ignored");
                        }
                    },
                    KeyCode::Esc => app.clear_input(),
                    KeyCode::Left | KeyCode::BackTab => app.select_prev_chip(),
                    KeyCode::Right | KeyCode::Tab => app.select_next_chip(),
                    KeyCode::Up => app.scroll_up(1),
                    KeyCode::Down => app.scroll_down(1),
                    KeyCode::PageUp => app.page_up(),
                    KeyCode::PageDown => app.page_down(),
                    KeyCode::Char(c) => app.input.push(c),
                    KeyCode::Backspace => {
                        app.input.pop();
                    }
                    _ => {}
                }
            }
        }

        while let Ok(outcome) = rx.try_recv() {
            app.on_outcome(outcome);
        }

        if !app.running {
            break;
        }
    }

    Ok(())
}
