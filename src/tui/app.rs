use parking_lot::Mutex;
use std::sync::Arc;

use crate::app::Config;
use crate::constants::UI_SCROLL_LINES;
use crate::render::Renderer;
use crate::session::{SessionDriver, Turn, TurnOutcome};

use super::render::transcript_rows;

pub const HELP_TEXT: &str =
    ":restart opnieuw beginnen | :why waarom deze? | :quit stoppen | ←/→ keuze, Enter kiest";

/// What pressing Enter in the input line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Submit(Turn),
    Restart,
    Help,
    Quit,
    Unknown(String),
    Nothing,
}

/// Application state
pub struct App {
    /// Turn engine, shared with spawned turn tasks
    pub driver: Arc<SessionDriver>,
    /// Transcript the driver appends to
    pub view: Arc<Mutex<Renderer>>,
    /// User input buffer
    pub input: String,
    /// Is the app running?
    pub running: bool,
    /// Highlighted chip in the latest chip group
    pub selected_chip: usize,
    /// Status message
    pub status_message: Option<String>,
    /// Product table, shown in the header
    pub table: String,
    /// Service address, shown in the header
    pub base_url: String,
    /// Boot the conversation when the UI opens
    pub auto_open: bool,
    /// Height of the conversation pane at the last draw
    pub chat_height: u16,
    /// Text width of the conversation pane at the last draw
    pub chat_width: u16,
    seen_entries: usize,
}

impl App {
    pub fn new(driver: Arc<SessionDriver>, config: &Config) -> Self {
        let view = driver.renderer();
        Self {
            driver,
            view,
            input: String::new(),
            running: true,
            selected_chip: 0,
            status_message: None,
            table: config.widget.table.clone(),
            base_url: config.api.base_url.clone(),
            auto_open: config.widget.auto_open,
            chat_height: 20,
            chat_width: 78,
            seen_entries: 0,
        }
    }

    /// Reset chip selection once new entries arrive
    pub fn sync(&mut self) {
        let len = self.view.lock().len();
        if len != self.seen_entries {
            self.seen_entries = len;
            self.selected_chip = 0;
        }
    }

    fn chip_count(&self) -> usize {
        self.view
            .lock()
            .last_chip_group()
            .map(|g| g.chips.len())
            .unwrap_or(0)
    }

    pub fn select_next_chip(&mut self) {
        let count = self.chip_count();
        if count > 0 {
            self.selected_chip = (self.selected_chip + 1) % count;
        }
    }

    pub fn select_prev_chip(&mut self) {
        let count = self.chip_count();
        if count > 0 {
            self.selected_chip = (self.selected_chip + count - 1) % count;
        }
    }

    /// Auto-open is on and no boot has run yet, including one that backed off for a turn
    pub fn wants_boot(&self) -> bool {
        self.auto_open && !self.driver.is_booted() && !self.driver.is_waiting()
    }

    /// Interpret the input line, clearing it unless the text would be lost
    pub fn take_input(&mut self) -> InputAction {
        let text = self.input.trim().to_string();

        if let Some(command) = text.strip_prefix(':') {
            self.input.clear();
            return match command.trim() {
                "restart" | "r" => InputAction::Restart,
                "why" | "w" => match self.view.lock().last_card_group() {
                    Some(cards) => InputAction::Submit(cards.detail_turn()),
                    None => InputAction::Unknown("Nog geen aanbeveling om toe te lichten".into()),
                },
                "quit" | "q" => InputAction::Quit,
                "help" | "h" => InputAction::Help,
                other => InputAction::Unknown(format!("Onbekend commando: :{}", other)),
            };
        }

        if text.is_empty() {
            self.input.clear();
            let view = self.view.lock();
            return view
                .last_chip_group()
                .and_then(|group| group.turn_for(self.selected_chip))
                .map(InputAction::Submit)
                .unwrap_or(InputAction::Nothing);
        }

        // Keep the draft while a turn is pending; the driver would drop it anyway
        if self.driver.is_waiting() {
            return InputAction::Nothing;
        }

        self.input.clear();
        InputAction::Submit(Turn::prompt(text))
    }

    pub fn on_outcome(&mut self, outcome: TurnOutcome) {
        match outcome {
            TurnOutcome::Dropped => self.set_status("Even geduld, er loopt nog een vraag"),
            TurnOutcome::Failed => self.set_status("Het laatste bericht is mislukt"),
            TurnOutcome::Rendered(_) => self.clear_status(),
        }
    }

    /// Clear the input buffer
    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Set status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Scroll chat view up, bounded by the rendered transcript
    pub fn scroll_up(&mut self, amount: u16) {
        let mut view = self.view.lock();
        let total = transcript_rows(&view, self.chat_width);
        let max_scroll = total.saturating_sub(self.chat_height);
        view.scroll_up(amount, max_scroll);
    }

    /// Scroll chat view down
    pub fn scroll_down(&mut self, amount: u16) {
        self.view.lock().scroll_down(amount);
    }

    pub fn page_up(&mut self) {
        self.scroll_up(UI_SCROLL_LINES * 3);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(UI_SCROLL_LINES * 3);
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }
}
