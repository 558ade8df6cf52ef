//! Computed membership for dynamic albums
//!
//! Dynamic albums have no join-table rows. Each sync round evaluates
//! the album's filter expression once and derives everything the round
//! needs from the result: membership rows carrying each matching
//! asset's own update id, the asset payloads for viewers who cannot
//! reach them through any other scope, and the member id set that
//! scopes the exif scan.
//!
//! Known gap: an asset that stops matching a filter produces no delete
//! signal. Clients only converge on removal after a full re-evaluation
//! of the album.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::cursor::SyncAck;
use crate::domain::filters::AlbumFilters;
use crate::infrastructure::database::entities::{album, asset};
use crate::search::{FilterEvaluator, RecoveryPolicy, SearchPagination};
use crate::sync::error::SyncError;
use crate::sync::types::MembershipRow;
use tracing::warn;

/// One dynamic album's evaluation result for a round.
pub struct AlbumMembers {
    pub album_id: Uuid,
    /// Every matching asset id, unwindowed. Scopes the exif scan, which
    /// ranges over exif update ids rather than asset update ids.
    pub member_ids: Vec<Uuid>,
    /// Matching assets inside the requested window, ascending by
    /// update id.
    pub assets: Vec<asset::Model>,
}

impl AlbumMembers {
    pub fn membership_rows(&self) -> Vec<MembershipRow> {
        self.assets
            .iter()
            .map(|a| MembershipRow {
                album_id: self.album_id,
                asset_id: a.id,
                update_id: a.update_id,
            })
            .collect()
    }
}

/// Evaluate a dynamic album once for a round.
///
/// `after`/`before` bound the windowed asset run: `None` means no floor
/// (initial sync), backfills pass `(0, ack]`. Evaluated strictly: a
/// failed or timed-out filter aborts the round, so the cursor never
/// advances past rows that were not produced.
pub async fn evaluate_members(
    evaluator: &FilterEvaluator,
    album: &album::Model,
    after: Option<i64>,
    before: i64,
    settled_before: DateTime<Utc>,
    page_ceiling: u64,
) -> Result<AlbumMembers, SyncError> {
    let filters = match &album.filters {
        Some(stored) => AlbumFilters::from_stored(stored),
        None => AlbumFilters::from_stored(&Value::Null),
    };

    let page = evaluator
        .evaluate(
            album.id,
            album.owner_id,
            &filters,
            album.order.into(),
            SearchPagination::new(1, page_ceiling),
            RecoveryPolicy::Strict,
        )
        .await?;

    if page.has_next_page {
        warn!(
            album_id = %album.id,
            ceiling = page_ceiling,
            "dynamic album exceeds the evaluation ceiling, membership is truncated"
        );
    }

    let member_ids = page.items.iter().map(|a| a.id).collect();
    let mut assets: Vec<asset::Model> = page
        .items
        .into_iter()
        .filter(|a| in_window(a, after, before, settled_before))
        .collect();
    assets.sort_by_key(|a| a.update_id);

    Ok(AlbumMembers {
        album_id: album.id,
        member_ids,
        assets,
    })
}

/// Evaluation window for the current cursor: `(ack, ∞)`.
pub async fn members_since(
    evaluator: &FilterEvaluator,
    album: &album::Model,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
    page_ceiling: u64,
) -> Result<AlbumMembers, SyncError> {
    let floor = ack.map(|a| a.update_id().value());
    evaluate_members(evaluator, album, floor, i64::MAX, settled_before, page_ceiling).await
}

fn in_window(
    asset: &asset::Model,
    after: Option<i64>,
    before: i64,
    settled_before: DateTime<Utc>,
) -> bool {
    after.map_or(true, |floor| asset.update_id > floor)
        && asset.update_id <= before
        && asset.updated_at < settled_before
}
