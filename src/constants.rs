/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8003";
pub const DEFAULT_API_USER: &str = "admin";
pub const DEFAULT_API_PASS: &str = "secret";
pub const DEFAULT_TABLE: &str = "wijnen";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 20;

// Endpoints
pub const PROMPT_PATH: &str = "/enrich-data/";
pub const CHOICE_PATH: &str = "/enrich-data/choice";
pub const STARTER_PATH: &str = "/starter";

// Conversation
pub const MAX_REMAINING_QUESTIONS: i64 = 3;
pub const PRIMARY_CHIP_COUNT: usize = 3;
pub const MAX_RECOMMENDED_ITEMS: usize = 3;
pub const MAX_ITEM_FACTS: usize = 3;
pub const RESTART_PROMPT: &str = "Start";
pub const DETAIL_PROMPT: &str = "Waarom deze?";
pub const VIEW_ITEM_LABEL: &str = "Bekijk";

// Canned bot messages
pub const DEFAULT_GREETING: &str =
    "Hoi! Ik help je snel naar de best passende keuze. Eerst een paar vragen, dat kost je minder dan 1 minuut.";
pub const UNRECOGNIZED_RESPONSE_MESSAGE: &str =
    "Ik heb een antwoord, maar ik weet niet hoe ik het moet tonen 🤔";
pub const GENERIC_ERROR_MESSAGE: &str =
    "Er ging iets mis bij het ophalen van een antwoord.";

// Starter fallback when /starter is unreachable
pub const DEFAULT_STARTER_QUESTION: &str = "Waar ben je naar op zoek?";
pub const DEFAULT_STARTER_SUGGESTIONS: &[&str] = &[
    "Rode wijn bij een stuk vlees",
    "Frisse witte wijn voor de zomer",
    "Een cadeau onder de 20 euro",
    "Iets bubbels voor een feestje",
];

// UI Configuration
pub const UI_REFRESH_INTERVAL_MS: u64 = 50;
pub const UI_SCROLL_LINES: u16 = 3;
