//! Attachments and their stored blob format.
//!
//! This module provides:
//! - Upload and stored attachment types
//! - The deterministic blob codec
//! - `filename/key` references recorded on submissions

pub mod codec;
mod error;
mod types;

#[cfg(test)]
mod codec_props;

pub use codec::{FORMAT_VERSION, decode, encode, key_for};
pub use error::CodecError;
pub use types::{Attachment, AttachmentRef, HeaderMap, RawAttachment};
