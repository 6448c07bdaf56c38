#[cfg(test)]
mod tests {
    use crate::validation::normalize_phone;
    use proptest::prelude::*;

    proptest! {
        // Normalization must be a fixed point after one application,
        // whatever separator soup the voice agent transcribes.
        #[test]
        fn test_normalize_phone_is_idempotent(raw in "[0-9+() -]{0,20}") {
            let once = normalize_phone(&raw);
            let twice = normalize_phone(&once);
            prop_assert_eq!(&once, &twice);
        }

        #[test]
        fn test_normalized_phone_has_leading_plus(raw in "[0-9() -]{1,20}") {
            let normalized = normalize_phone(&raw);
            prop_assert!(normalized.starts_with('+'));
        }

        #[test]
        fn test_normalization_drops_separators(raw in "[0-9() -]{1,20}") {
            let normalized = normalize_phone(&raw);
            prop_assert!(!normalized.contains(' '));
            prop_assert!(!normalized.contains('('));
            prop_assert!(!normalized.contains(')'));
            prop_assert!(!normalized.contains('-'));
        }
    }
}
