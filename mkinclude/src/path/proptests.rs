//! Property-based tests for path resolution.
//!
//! Note: The normalize module already has light property tests. This module
//! runs the heavier equivalence grid behind the `property-tests` feature.

use super::resolver::PathResolver;
use proptest::prelude::*;
use std::path::{Path, PathBuf};

fn path_component_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,20}"
}

fn absolute_path_strategy() -> impl Strategy<Value = PathBuf> {
    prop::collection::vec(path_component_strategy(), 1..8).prop_map(|parts| {
        let mut path = PathBuf::from("/");
        for part in parts {
            path.push(part);
        }
        path
    })
}

fn relative_word_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just(".".to_string()),
            Just("..".to_string()),
            path_component_strategy(),
        ],
        1..10,
    )
    .prop_map(|parts| parts.join("/"))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 10000,
        max_shrink_iters: 10000,
        .. ProptestConfig::default()
    })]

    // Resolving relative to a base equals resolving the joined absolute word
    #[test]
    fn relative_matches_joined_absolute(base in absolute_path_strategy(), word in relative_word_strategy()) {
        let resolver = PathResolver::new();
        let relative = resolver.resolve(&word, &base).unwrap();
        let joined = format!("{}/{word}", base.display());
        let absolute = resolver.resolve(&joined, Path::new("/unrelated")).unwrap();
        prop_assert_eq!(relative, absolute);
    }

    // Resolution is idempotent
    #[test]
    fn resolution_idempotent(base in absolute_path_strategy(), word in relative_word_strategy()) {
        let resolver = PathResolver::new();
        let once = resolver.resolve(&word, &base).unwrap();
        let twice = resolver.resolve(once.as_str(), Path::new("/unrelated")).unwrap();
        prop_assert_eq!(once, twice);
    }

    // A resolved path never contains dot segments
    #[test]
    fn resolved_paths_have_no_dot_segments(base in absolute_path_strategy(), word in relative_word_strategy()) {
        let resolver = PathResolver::new();
        let resolved = resolver.resolve(&word, &base).unwrap();
        for segment in resolved.as_str().split('/') {
            prop_assert!(segment != "." && segment != "..");
        }
    }

    // The parent of a resolved path is a prefix of it
    #[test]
    fn parent_is_prefix(path in absolute_path_strategy()) {
        let resolver = PathResolver::new();
        let resolved = resolver.resolve(path.to_str().unwrap(), Path::new("/")).unwrap();
        prop_assert!(resolved.as_str().starts_with(resolved.parent().as_str()));
    }
}
