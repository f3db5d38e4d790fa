//! Property-based tests for submission hashing.

use proptest::prelude::*;

use super::types::submission_hash;
use crate::attachment::AttachmentRef;
use crate::hash::ContentHash;

fn attachment_ref() -> impl Strategy<Value = AttachmentRef> {
    ("[a-z0-9._-]{1,24}", prop::collection::vec(any::<u8>(), 0..64))
        .prop_map(|(filename, blob)| AttachmentRef::new(filename, ContentHash::digest(&blob)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Same body and references always hash alike.
    #[test]
    fn prop_hash_deterministic(
        body in "\\PC{0,64}",
        refs in prop::collection::vec(attachment_ref(), 0..4),
    ) {
        prop_assert_eq!(submission_hash(&body, &refs), submission_hash(&body, &refs.clone()));
    }

    /// Swapping two references with different pairs changes the hash.
    #[test]
    fn prop_order_sensitive(
        body in "\\PC{0,32}",
        a in attachment_ref(),
        b in attachment_ref(),
    ) {
        prop_assume!(a.to_pair() != b.to_pair());
        let forward = submission_hash(&body, &[a.clone(), b.clone()]);
        let reversed = submission_hash(&body, &[b, a]);
        prop_assert_ne!(forward, reversed);
    }

    /// Every prefix of at least 10 characters matches its own hash.
    #[test]
    fn prop_prefix_matches(body in "\\PC{1,64}", len in 10usize..=40) {
        let hash = submission_hash(&body, &[]);
        let prefix = crate::hash::HashPrefix::parse(&hash.as_str()[..len]).unwrap();
        prop_assert!(hash.starts_with(&prefix));
    }
}
