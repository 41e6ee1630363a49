use serde::Serialize;
use std::fmt;

/// Text that is safe to insert into a markup context.
///
/// Only the sanitizer can build one, so any view node holding a `SafeHtml`
/// went through [`to_safe_text`](super::to_safe_text) or [`escape_text`](super::escape_text).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SafeHtml(String);

impl SafeHtml {
    pub(super) fn new_unchecked(escaped: String) -> Self {
        Self(escaped)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode back to display text for frontends that don't interpret markup
    pub fn to_plain(&self) -> String {
        html_escape::decode_html_entities(&self.0).into_owned()
    }
}

impl fmt::Display for SafeHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
