use once_cell::sync::Lazy;
use regex::Regex;

use super::safe_html::SafeHtml;

/// Markup tags and comments. A bare `<` that doesn't open a tag is kept and escaped later.
static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--.*?-->|</?[A-Za-z!?][^>]*>").expect("tag pattern is valid")
});

const SAFE_IMAGE_SCHEMES: &[&str] = &["http://", "https://", "data:image/"];

/// Decode HTML character entities (`&amp;`, `&#39;`, `&eacute;`, ...) in a single pass
pub fn decode_entities(raw: &str) -> String {
    html_escape::decode_html_entities(raw).into_owned()
}

/// Remove markup tags, keeping their text content
pub fn strip_tags(text: &str) -> String {
    TAG_PATTERN.replace_all(text, "").into_owned()
}

/// Escape the five HTML-significant characters
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Turn arbitrary server or user text into something safe to insert as markup
pub fn to_safe_text(raw: &str) -> SafeHtml {
    let decoded = decode_entities(raw);
    let stripped = strip_tags(&decoded);
    SafeHtml::new_unchecked(escape_html(&stripped))
}

/// Decode entities only, for labels that end up in plain-text nodes
pub fn to_safe_label(raw: &str) -> String {
    decode_entities(raw)
}

/// Escape user-typed text verbatim, without stripping anything that looks like a tag
pub fn escape_text(text: &str) -> SafeHtml {
    SafeHtml::new_unchecked(escape_html(text))
}

/// Sanitize an image reference for use in a `src` attribute.
/// Relative paths are allowed, script-capable schemes are refused.
pub fn safe_image_src(raw: &str) -> Option<SafeHtml> {
    let decoded = decode_entities(raw.trim());
    if decoded.is_empty() || decoded.chars().any(char::is_control) {
        return None;
    }

    let lower = decoded.to_ascii_lowercase();
    let has_scheme = lower
        .split(['/', '?', '#'])
        .next()
        .is_some_and(|head| head.contains(':'));
    let allowed = !has_scheme || SAFE_IMAGE_SCHEMES.iter().any(|s| lower.starts_with(s));

    allowed.then(|| SafeHtml::new_unchecked(escape_html(&decoded)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_script_tags_are_stripped() {
        let safe = to_safe_text("<script>alert('x')</script>Hallo");
        assert_eq!(safe.as_str(), "alert(&#39;x&#39;)Hallo");
    }

    #[test]
    fn test_encoded_markup_is_decoded_then_stripped() {
        let safe = to_safe_text("&lt;b&gt;Rood&lt;/b&gt; &amp; wit");
        assert_eq!(safe.as_str(), "Rood &amp; wit");
        assert_eq!(safe.to_plain(), "Rood & wit");
    }

    #[test]
    fn test_lone_angle_brackets_are_escaped() {
        let safe = to_safe_text("prijs < 20 > 10");
        assert_eq!(safe.as_str(), "prijs &lt; 20 &gt; 10");
    }

    #[test]
    fn test_attribute_injection_is_neutralised() {
        let safe = to_safe_text(r#"" onmouseover="x"#);
        assert!(!safe.as_str().contains('"'));
    }

    #[test]
    fn test_label_only_decodes() {
        assert_eq!(to_safe_label("Ros&eacute; &amp; co"), "Rosé & co");
        assert_eq!(to_safe_label("<b>Rood</b>"), "<b>Rood</b>");
    }

    #[test]
    fn test_escape_text_keeps_user_input_verbatim() {
        let safe = escape_text("<i>mijn</i> wijn");
        assert_eq!(safe.to_plain(), "<i>mijn</i> wijn");
        assert!(!safe.as_str().contains('<'));
    }

    #[test]
    fn test_image_src_rejects_script_schemes() {
        assert!(safe_image_src("javascript:alert(1)").is_none());
        assert!(safe_image_src(" JavaScript:alert(1)").is_none());
        assert!(safe_image_src("data:text/html;base64,AAAA").is_none());
        assert!(safe_image_src("").is_none());
    }

    #[test]
    fn test_image_src_accepts_http_and_relative() {
        assert_eq!(
            safe_image_src("https://cdn.example.com/a.jpg?w=72&h=72").unwrap().as_str(),
            "https://cdn.example.com/a.jpg?w=72&amp;h=72"
        );
        assert!(safe_image_src("/img/wijn.png").is_some());
        assert!(safe_image_src("img/wijn.png").is_some());
    }

    fn arb_hostile_text() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                "[a-zA-Z0-9 .,!?]{1,8}",
                Just("<script>".to_string()),
                Just("</script>".to_string()),
                Just("<b>".to_string()),
                Just("<".to_string()),
                Just(">".to_string()),
                Just("&lt;".to_string()),
                Just("&gt;".to_string()),
                Just("&amp;".to_string()),
                Just("&quot;".to_string()),
                Just("&#39;".to_string()),
                Just("&eacute;".to_string()),
                Just("\"".to_string()),
                Just("'".to_string()),
            ],
            0..12,
        )
        .prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn prop_safe_text_has_no_raw_angle_brackets(input in arb_hostile_text()) {
            let safe = to_safe_text(&input);
            prop_assert!(!safe.as_str().contains('<'));
            prop_assert!(!safe.as_str().contains('>'));
        }

        #[test]
        fn prop_safe_text_decodes_to_stripped_input(input in arb_hostile_text()) {
            let safe = to_safe_text(&input);
            prop_assert_eq!(decode_entities(safe.as_str()), strip_tags(&decode_entities(&input)));
        }
    }
}
