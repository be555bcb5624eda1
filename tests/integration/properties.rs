//! Property-based tests for expansion and identifier handling

use super::test_utils::march_fifth;
use proptest::prelude::*;
use upfold::expand::{expand_date_tokens, has_placeholder, slugify, Expander, FieldOptions, FixedClock};
use upfold::records::NoRecords;
use upfold::types::CombinedIdentifier;

proptest! {
    #[test]
    fn slugify_is_idempotent(input in any::<String>()) {
        let once = slugify(&input);
        prop_assert_eq!(slugify(&once), once);
    }

    #[test]
    fn slugify_output_is_lowercase_ascii_words(input in any::<String>()) {
        let slug = slugify(&input);
        prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!slug.starts_with('-'));
        prop_assert!(!slug.ends_with('-'));
        prop_assert!(!slug.contains("--"));
    }

    #[test]
    fn placeholder_free_paths_expand_unchanged(
        path in "[0-9]{1,2}:/[a-z0-9_/]{0,30}",
        dateformat in any::<bool>(),
        variableformat in any::<bool>(),
    ) {
        let clock = FixedClock(march_fifth());
        let expander = Expander::new(&clock, &NoRecords);
        let options = FieldOptions { dateformat, variableformat };
        prop_assert_eq!(expander.expand(&path, &options, 1), path);
    }

    #[test]
    fn date_expansion_leaves_no_date_tokens(prefix in "[a-z/]{0,10}") {
        let path = format!("1:/{}{{Y}}/{{m}}/{{d}}/{{W}}", prefix);
        let expanded = expand_date_tokens(&path, march_fifth());
        prop_assert!(!has_placeholder(&expanded));
        prop_assert!(expanded.ends_with("2024/03/05/10"));
    }

    #[test]
    fn identifier_display_parses_back(id in 1u32..1000, segments in prop::collection::vec("[a-z0-9_]{1,8}", 0..5)) {
        let raw = format!("{}:/{}", id, segments.join("/"));
        let parsed = CombinedIdentifier::parse(&raw).unwrap();
        prop_assert_eq!(parsed.storage_id(), id);
        prop_assert_eq!(parsed.segments(), segments.as_slice());
        prop_assert_eq!(CombinedIdentifier::parse(&parsed.to_string()).unwrap(), parsed);
    }
}
