//! Property-based tests for identifier normalization.

use proptest::prelude::*;
use scholar_advisor::normalize::{SearchKey, classify, normalize};

/// Identifier-shaped tokens: no whitespace, no separators.
fn arb_identifier() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,19}"
}

proptest! {
    /// Normalizing twice is the same as normalizing once.
    #[test]
    fn normalize_is_idempotent(raw in ".{0,80}") {
        let once = normalize(&raw);
        prop_assert_eq!(normalize(&once), once);
    }

    /// Idempotence also holds for URL-like input built from markers and separators.
    #[test]
    fn normalize_is_idempotent_on_urls(
        parts in proptest::collection::vec(prop_oneof![
            Just("user=".to_string()),
            Just("&".to_string()),
            Just(" ".to_string()),
            "[a-z0-9?=/.]{0,8}",
        ], 0..10)
    ) {
        let raw = parts.concat();
        let once = normalize(&raw);
        prop_assert_eq!(normalize(&once), once);
    }

    /// The identifier is recovered from a profile URL with trailing parameters.
    #[test]
    fn profile_url_yields_identifier(
        id in arb_identifier(),
        host in "[a-z]{1,10}\\.[a-z]{2,3}",
        tail in "[a-z]{1,5}=[a-z0-9]{0,5}",
    ) {
        let url = format!("https://{host}/citations?user={id}&{tail}");
        prop_assert_eq!(normalize(&url), id);
    }

    /// A bare identifier is returned unchanged.
    #[test]
    fn bare_identifier_unchanged(id in arb_identifier()) {
        prop_assert_eq!(normalize(&id), id.clone());
        prop_assert_eq!(classify(&id), SearchKey::Identifier(id));
    }

    /// Anything with inner whitespace is a name.
    #[test]
    fn whitespace_classifies_as_name(a in "[A-Za-z]{1,10}", b in "[A-Za-z]{1,10}") {
        let text = format!("{a} {b}");
        prop_assert!(!classify(&text).is_identifier());
    }
}
