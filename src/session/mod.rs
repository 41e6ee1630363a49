// Gateway module for session - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod driver;
mod items;
mod types;

// Public re-exports - the ONLY way to access session functionality
pub use driver::{SessionDriver, TurnOutcome};
pub use items::{
    first_present, resolve_facts, resolve_image, resolve_title, Item, FACT_KEYS, IMAGE_KEYS,
    TITLE_KEYS,
};
pub use types::{
    ChoiceRequest, OtherPayload, PromptRequest, QuestionKind, QuestionRecord, Recommendation,
    Stage, StageResponse, Starter, Turn, TurnReply,
};
