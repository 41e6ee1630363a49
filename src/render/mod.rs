// Gateway module for render - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod html;
mod progress;
mod renderer;
mod view;

// Public re-exports - the ONLY way to access render functionality
pub use html::render_html;
pub use progress::{derive_progress, remaining_hint};
pub use renderer::Renderer;
pub use view::{CardGroup, Chip, ChipGroup, ChipSource, Entry, ItemCard, ViewNode};
