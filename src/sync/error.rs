//! Sync engine errors

use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::cursor::CursorParseError;
use crate::search::SearchError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("search error: {0}")]
    Search(#[from] SearchError),

    #[error(transparent)]
    InvalidCursor(#[from] CursorParseError),

    /// Backfill was requested for a scope the caller cannot see.
    #[error("scope {0} is not visible to the requesting user")]
    ScopeNotVisible(Uuid),
}
