// Gateway module for sanitize - follows the Train Station Pattern
// All content coming from the service or the user reaches markup through here

mod safe_html;
mod text;

pub use safe_html::SafeHtml;
pub use text::{
    decode_entities, escape_html, escape_text, safe_image_src, strip_tags, to_safe_label,
    to_safe_text,
};
