//! Core submission logic for Hashdrop.
//!
//! This crate contains the domain with ZERO web or database dependencies.
//! Persistence is reached through [`submission::SubmissionRepository`].
//!
//! # Modules
//!
//! - `hash` - Content hashes and lookup prefixes
//! - `attachment` - Attachment types and the blob codec
//! - `storage` - Object storage via OpenDAL
//! - `submission` - Submit, resolve and fetch operations

pub mod attachment;
pub mod hash;
pub mod storage;
pub mod submission;
