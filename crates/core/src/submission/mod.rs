//! Submissions: a text body plus ordered attachment references, addressed
//! by a content hash.
//!
//! The hash of a submission is the SHA-1 of its body followed by each
//! `filename/key` pair in upload order, so identical submissions collapse to
//! one record and reordering attachments produces a different one.

mod error;
mod service;
mod types;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod testing;

pub use error::{FetchFailure, SubmissionError};
pub use service::{Clock, SubmissionLimits, SubmissionRepository, SubmissionService};
pub use types::{InsertOutcome, NewSubmission, Submission, SubmitResult, submission_hash};
