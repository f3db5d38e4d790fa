//! Binary encoding of attachments.
//!
//! A blob is one format version byte followed by the bincode encoding of
//! [`Attachment`] with fixed-width little-endian integers. Header metadata is
//! an ordered map, so equal attachments always produce identical blobs and
//! therefore identical object keys.

use bincode::Options;
use bytes::Bytes;

use super::error::CodecError;
use super::types::Attachment;
use crate::hash::ContentHash;

/// Current blob format version.
pub const FORMAT_VERSION: u8 = 1;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
}

/// Encode an attachment into a self-contained blob.
///
/// # Errors
///
/// Returns an error only if serialization itself fails.
pub fn encode(attachment: &Attachment) -> Result<Bytes, CodecError> {
    let mut buf = Vec::with_capacity(attachment.content.len() + 256);
    buf.push(FORMAT_VERSION);
    options()
        .serialize_into(&mut buf, attachment)
        .map_err(CodecError::Encode)?;
    Ok(Bytes::from(buf))
}

/// Decode a blob produced by [`encode`].
///
/// # Errors
///
/// Returns an error if the blob is empty, has an unknown version, is
/// truncated, or carries trailing bytes.
pub fn decode(blob: &[u8]) -> Result<Attachment, CodecError> {
    let (&version, body) = blob.split_first().ok_or(CodecError::Empty)?;
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }

    // Length prefixes can never exceed the blob itself.
    options()
        .with_limit(body.len() as u64)
        .reject_trailing_bytes()
        .deserialize(body)
        .map_err(CodecError::Corrupt)
}

/// Object store key of an encoded blob.
#[must_use]
pub fn key_for(blob: &[u8]) -> ContentHash {
    ContentHash::digest(blob)
}
