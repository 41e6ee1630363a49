use crate::constants::MAX_REMAINING_QUESTIONS;

/// Progress percentage for the number of questions still to come.
///
/// `remaining` is clamped into `0..=3` first, so the result always lies in `0..=100`.
/// Each outstanding question costs a third of the bar.
pub fn derive_progress(remaining: i64) -> f64 {
    let clamped = remaining.clamp(0, MAX_REMAINING_QUESTIONS);
    let answered = (MAX_REMAINING_QUESTIONS - clamped) as f64;
    (100.0 * answered / MAX_REMAINING_QUESTIONS as f64).clamp(0.0, 100.0)
}

/// "Nog 2 vragen…" hint under a question bubble
pub fn remaining_hint(remaining: i64) -> String {
    let noun = if remaining == 1 { "vraag" } else { "vragen" };
    format!("Nog {} {}…", remaining, noun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_endpoints_are_exact() {
        assert_eq!(derive_progress(0), 100.0);
        assert_eq!(derive_progress(3), 0.0);
    }

    #[test]
    fn test_two_remaining_is_about_a_third() {
        assert!((derive_progress(2) - 33.3).abs() < 0.1);
        assert!((derive_progress(1) - 66.7).abs() < 0.1);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(derive_progress(-5), 100.0);
        assert_eq!(derive_progress(42), 0.0);
    }

    #[test]
    fn test_hint_pluralisation() {
        assert_eq!(remaining_hint(1), "Nog 1 vraag…");
        assert_eq!(remaining_hint(2), "Nog 2 vragen…");
    }

    proptest! {
        #[test]
        fn prop_progress_is_bounded(remaining in any::<i64>()) {
            let pct = derive_progress(remaining);
            prop_assert!((0.0..=100.0).contains(&pct));
        }

        #[test]
        fn prop_progress_is_non_increasing(a in -10i64..10, b in -10i64..10) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(derive_progress(low) >= derive_progress(high));
        }
    }
}
