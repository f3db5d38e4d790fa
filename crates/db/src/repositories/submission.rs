//! Submission repository for database operations.
//!
//! Implements the submission store on the `uploads` table using SeaORM.

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use tracing::debug;

use crate::entities::uploads;
use hashdrop_core::attachment::AttachmentRef;
use hashdrop_core::hash::{ContentHash, HashPrefix};
use hashdrop_core::submission::{
    InsertOutcome, NewSubmission, Submission, SubmissionError,
    SubmissionRepository as SubmissionRepoTrait,
};

/// Submission repository implementation.
#[derive(Debug, Clone)]
pub struct SubmissionRepository {
    db: DatabaseConnection,
}

impl SubmissionRepository {
    /// Create a new submission repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl SubmissionRepoTrait for SubmissionRepository {
    async fn insert(&self, submission: NewSubmission) -> Result<InsertOutcome, SubmissionError> {
        let active_model = uploads::ActiveModel {
            hash: Set(submission.hash.as_str().to_string()),
            body: Set(submission.body),
            files: Set(submission
                .attachments
                .iter()
                .map(AttachmentRef::to_pair)
                .collect()),
            timestamp: Set(submission.created_at),
            ..Default::default()
        };

        // The unique constraint on hash arbitrates concurrent duplicates.
        let inserted = uploads::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(uploads::Column::Hash)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_insert_error)?;

        if inserted == 0 {
            debug!(hash = %submission.hash, "Submission already exists");
            return Ok(InsertOutcome::AlreadyExists(submission.hash));
        }

        Ok(InsertOutcome::Created(submission.hash))
    }

    async fn find_by_prefix(
        &self,
        prefix: &HashPrefix,
    ) -> Result<Option<Submission>, SubmissionError> {
        let model = uploads::Entity::find()
            .filter(uploads::Column::Hash.starts_with(prefix.as_str()))
            .order_by_asc(uploads::Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| SubmissionError::repository(e.to_string()))?;

        model.map(model_to_submission).transpose()
    }
}

fn map_insert_error(err: DbErr) -> SubmissionError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => SubmissionError::Conflict(detail),
        _ => SubmissionError::repository(err.to_string()),
    }
}

fn model_to_submission(model: uploads::Model) -> Result<Submission, SubmissionError> {
    let hash: ContentHash = model.hash.trim_end().parse().map_err(|e| {
        SubmissionError::repository(format!("row {} has a malformed hash: {e}", model.id))
    })?;

    let attachments = model
        .files
        .iter()
        .map(|pair| {
            AttachmentRef::parse_pair(pair).ok_or_else(|| {
                SubmissionError::repository(format!(
                    "row {} has a malformed attachment entry {pair:?}",
                    model.id
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Submission {
        id: model.id,
        hash,
        body: model.body,
        attachments,
        created_at: model.timestamp,
    })
}
