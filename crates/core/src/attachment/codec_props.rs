//! Property-based tests for the attachment codec.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use proptest::prelude::*;

use super::codec::{decode, encode, key_for};
use super::types::{Attachment, HeaderMap};

fn header_map() -> impl Strategy<Value = HeaderMap> {
    prop::collection::btree_map(
        "[A-Za-z-]{1,16}",
        prop::collection::vec("[ -~]{0,32}", 1..3),
        0..4,
    )
}

fn timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_102_444_800, 0u32..1_000_000_000)
        .prop_map(|(secs, nanos)| DateTime::from_timestamp(secs, nanos).unwrap_or_default())
}

fn attachment() -> impl Strategy<Value = Attachment> {
    (
        "\\PC{0,40}",
        header_map(),
        any::<u64>(),
        timestamp(),
        prop::collection::vec(any::<u8>(), 0..2048),
    )
        .prop_map(|(filename, metadata, size, modified_at, content)| Attachment {
            filename,
            metadata,
            size,
            modified_at,
            content: Bytes::from(content),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// decode(encode(a)) == a
    #[test]
    fn prop_decode_inverts_encode(a in attachment()) {
        let blob = encode(&a).unwrap();
        prop_assert_eq!(decode(&blob).unwrap(), a);
    }

    /// Same value, same bytes, same key.
    #[test]
    fn prop_encode_deterministic(a in attachment()) {
        let first = encode(&a).unwrap();
        let second = encode(&a.clone()).unwrap();
        prop_assert_eq!(key_for(&first), key_for(&second));
        prop_assert_eq!(first, second);
    }

    /// Any strict prefix of a blob is rejected.
    #[test]
    fn prop_truncation_detected(a in attachment(), cut in any::<prop::sample::Index>()) {
        let blob = encode(&a).unwrap();
        let len = cut.index(blob.len());
        prop_assert!(decode(&blob[..len]).is_err());
    }
}
