//! Property-based tests for remote decomposition and mirror path resolution.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::credential::Credential;
    use crate::mirror::resolve;
    use crate::remote::{decompose, RemoteDescriptor};
    use proptest::prelude::*;
    use std::path::{Component, Path, PathBuf};

    fn host() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9]{0,10}(\\.[a-z][a-z0-9]{0,10}){0,3}"
    }

    fn segments() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[A-Za-z0-9_][A-Za-z0-9_.-]{0,12}", 1..5)
    }

    proptest! {
        /// Property: decompose never panics on arbitrary input
        #[test]
        fn decompose_never_panics(input in ".*") {
            let _ = decompose(&input);
        }

        /// Property: resolve is deterministic (same input = same output)
        #[test]
        fn resolve_is_deterministic(input in ".*") {
            let root = Path::new("/mirror");
            let first = resolve(root, &input).ok();
            let second = resolve(root, &input).ok();
            prop_assert_eq!(first, second);
        }

        /// Property: a well-formed remote maps to root/host/segments
        #[test]
        fn resolve_joins_host_and_segments(host in host(), segments in segments()) {
            let url = format!("https://{}/{}", host, segments.join("/"));
            let path = resolve(Path::new("/mirror"), &url).unwrap();

            let mut expected = PathBuf::from("/mirror").join(&host);
            for segment in &segments {
                expected.push(segment);
            }
            prop_assert_eq!(path, expected);
        }

        /// Property: resolved paths never leave the mirror root
        #[test]
        fn resolve_stays_under_root(host in host(), parts in prop::collection::vec("(\\.\\.|\\.|%2e%2e|[a-z]{1,4})", 1..8)) {
            let url = format!("https://{}/{}/x.git", host, parts.join("/"));
            if let Ok(path) = resolve(Path::new("/mirror"), &url) {
                prop_assert!(path.starts_with("/mirror"));
                prop_assert!(!path.components().any(|c| c == Component::ParentDir));
            }
        }

        /// Property: a descriptor's host and path never carry userinfo
        #[test]
        fn descriptor_drops_userinfo(host in host(), segments in segments(), user in "[a-z]{1,8}", pass in "[a-z0-9]{1,8}") {
            let url = format!("https://{}:{}@{}/{}", user, pass, host, segments.join("/"));
            let remote = RemoteDescriptor::parse(&url).unwrap();
            prop_assert!(!remote.url().contains('@'));
            prop_assert_eq!(remote.host(), host.as_str());
        }

        /// Property: the redacted URL never contains the token
        #[test]
        fn redacted_url_hides_token(host in host(), segments in segments(), token in "[A-Za-z0-9]{12,24}") {
            let remote = RemoteDescriptor::parse(&format!("https://{}/{}", host, segments.join("/"))).unwrap();
            let credential = Credential::new("ci-bot", token.clone());
            prop_assert!(remote.connection_url(Some(&credential)).contains(&token));
            prop_assert!(!remote.redacted_url(Some(&credential)).contains(&token));
        }
    }
}
