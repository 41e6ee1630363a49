pub mod app;
pub mod cli;
pub mod constants;
pub mod render;
pub mod runtime;
pub mod sanitize;
pub mod session;
pub mod transport;
pub mod tui;
pub mod utils;

pub use app::{load_config, Config};
pub use render::{derive_progress, Renderer, ViewNode};
pub use sanitize::{to_safe_label, to_safe_text, SafeHtml};
pub use session::{SessionDriver, Turn, TurnOutcome};
pub use transport::{HttpTransport, Transport};
pub use utils::WidgetError;
