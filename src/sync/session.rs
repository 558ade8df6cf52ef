//! Sync rounds and per-client session state
//!
//! A round emits, per entity type in dependency order: backfill rows
//! for scopes that became visible since the client's cursor, then
//! tombstones, then upserts. Backfilled rows sit at or below the
//! client's cursor, so the regular delta scans never revisit them.
//!
//! Visibility watermarks (partner and album-share create ids) are kept
//! per client and committed only once the client proves progress by
//! acknowledging a later cursor. Replaying the same cursor therefore
//! replays the same backfills, keeping rounds idempotent.

use std::collections::HashMap;
use std::sync::RwLock;

use async_stream::try_stream;
use chrono::Utc;
use futures::{Stream, TryStreamExt};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::SyncConfig;
use crate::domain::cursor::SyncAck;
use crate::infrastructure::database::entities::{album, asset, exif, partner};
use crate::infrastructure::database::Database;
use crate::search::FilterEvaluator;
use crate::sync::error::SyncError;
use crate::sync::merge::{merge_ascending, RunBuffer};
use crate::sync::types::{MembershipRow, SyncChange, SyncPayload};
use crate::sync::{dynamic, streams};

/// A visibility grant whose history the client asks to be caught up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackfillScope {
    /// An album, by id.
    Album(Uuid),
    /// A partner timeline, by the sharing user's id.
    Partner(Uuid),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Watermarks {
    partner_create_id: i64,
    album_share_create_id: i64,
}

#[derive(Default)]
struct SessionState {
    committed: Watermarks,
    /// Watermarks observed in the last round, keyed by the cursor the
    /// client presented for that round.
    staged: Option<(Option<SyncAck>, Watermarks)>,
    requested: Vec<BackfillScope>,
}

/// In-memory per-client session state.
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<Uuid, SessionState>>,
}

impl SessionStore {
    /// Start a round: promote staged watermarks if the client advanced
    /// past the cursor they were staged under, and drain any explicitly
    /// requested backfill scopes.
    fn begin_round(&self, principal: Uuid, ack: Option<SyncAck>) -> (Watermarks, Vec<BackfillScope>) {
        let Ok(mut sessions) = self.inner.write() else {
            return (Watermarks::default(), Vec::new());
        };
        let state = sessions.entry(principal).or_default();

        if let Some((staged_ack, watermarks)) = state.staged {
            if staged_ack != ack {
                state.committed = watermarks;
            }
            state.staged = None;
        }

        (state.committed, std::mem::take(&mut state.requested))
    }

    fn stage(&self, principal: Uuid, ack: Option<SyncAck>, watermarks: Watermarks) {
        if let Ok(mut sessions) = self.inner.write() {
            let state = sessions.entry(principal).or_default();
            state.staged = Some((ack, watermarks));
        }
    }

    fn request(&self, principal: Uuid, scope: BackfillScope) {
        if let Ok(mut sessions) = self.inner.write() {
            let state = sessions.entry(principal).or_default();
            if !state.requested.contains(&scope) {
                state.requested.push(scope);
            }
        }
    }
}

pub struct SyncService {
    db: Database,
    config: SyncConfig,
    evaluator: FilterEvaluator,
    sessions: SessionStore,
}

impl SyncService {
    pub fn new(db: Database, config: SyncConfig) -> Self {
        let evaluator = FilterEvaluator::new(db.conn().clone(), &config);
        Self {
            db,
            config,
            evaluator,
            sessions: SessionStore::default(),
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Queue a backfill for the next round. The scope must already be
    /// visible to the caller.
    pub async fn request_backfill(
        &self,
        principal: Uuid,
        scope: BackfillScope,
    ) -> Result<(), SyncError> {
        let db = self.db.conn();
        let visible = match scope {
            BackfillScope::Album(album_id) => album::Entity::find()
                .filter(album::Column::Id.eq(album_id))
                .filter(
                    album::Column::Id
                        .in_subquery(streams::visible_album_ids(principal, None)),
                )
                .one(db)
                .await?
                .is_some(),
            BackfillScope::Partner(sharer_id) => {
                partner::Entity::find_by_id((sharer_id, principal))
                    .one(db)
                    .await?
                    .is_some()
            }
        };
        if !visible {
            let id = match scope {
                BackfillScope::Album(id) | BackfillScope::Partner(id) => id,
            };
            return Err(SyncError::ScopeNotVisible(id));
        }
        self.sessions.request(principal, scope);
        Ok(())
    }

    /// One sync round for `principal`, resuming after `ack` (or from the
    /// beginning if the client holds no cursor).
    #[instrument(skip(self), fields(user = %principal))]
    pub fn sync(
        &self,
        principal: Uuid,
        ack: Option<SyncAck>,
    ) -> impl Stream<Item = Result<SyncChange, SyncError>> + '_ {
        try_stream! {
            let db = self.db.conn();
            let settled_before = Utc::now() - self.config.settle_window();
            let page_ceiling = self.config.dynamic_albums.page_ceiling;

            let (committed, requested) = self.sessions.begin_round(principal, ack);

            // Visibility grants created since the committed watermarks.
            let new_partners = streams::partners::created_after(
                principal,
                committed.partner_create_id,
                settled_before,
            )
            .all(db)
            .await?;
            let new_shares = streams::album_users::created_after(
                principal,
                committed.album_share_create_id,
                settled_before,
            )
            .all(db)
            .await?;

            let watermarks = Watermarks {
                partner_create_id: new_partners
                    .iter()
                    .map(|p| p.create_id)
                    .max()
                    .unwrap_or(committed.partner_create_id),
                album_share_create_id: new_shares
                    .iter()
                    .map(|s| s.create_id)
                    .max()
                    .unwrap_or(committed.album_share_create_id),
            };

            // Backfills only apply once the client holds a cursor; an
            // initial sync streams everything anyway. The range is
            // (0, ack]: history the cursor has already passed.
            let backfill_before = ack.map(|a| a.update_id().value());
            let (partner_scopes, album_scopes) = if backfill_before.is_some() {
                let mut partners: Vec<Uuid> =
                    new_partners.iter().map(|p| p.shared_by_id).collect();
                let mut album_ids: Vec<Uuid> =
                    new_shares.iter().map(|s| s.album_id).collect();
                for scope in requested {
                    match scope {
                        BackfillScope::Partner(id) if !partners.contains(&id) => {
                            partners.push(id)
                        }
                        BackfillScope::Album(id) if !album_ids.contains(&id) => {
                            album_ids.push(id)
                        }
                        _ => {}
                    }
                }
                let albums = if album_ids.is_empty() {
                    Vec::new()
                } else {
                    album::Entity::find()
                        .filter(album::Column::Id.is_in(album_ids))
                        .all(db)
                        .await?
                };
                (partners, albums)
            } else {
                (Vec::new(), Vec::new())
            };

            if !partner_scopes.is_empty() || !album_scopes.is_empty() {
                debug!(
                    partners = partner_scopes.len(),
                    albums = album_scopes.len(),
                    "backfilling newly visible scopes"
                );
            }

            // Evaluate every visible dynamic album once up front; the
            // asset, exif and membership sections all draw on these
            // results, and nothing may overlap the streamed scans on the
            // connection.
            let dynamic_albums = album::Entity::find()
                .filter(
                    album::Column::Id
                        .in_subquery(streams::visible_album_ids(principal, Some(true))),
                )
                .all(db)
                .await?;
            let mut dynamic_members = Vec::with_capacity(dynamic_albums.len());
            for dynamic_album in &dynamic_albums {
                dynamic_members.push(
                    dynamic::members_since(
                        &self.evaluator,
                        dynamic_album,
                        ack,
                        settled_before,
                        page_ceiling,
                    )
                    .await?,
                );
            }
            let mut dynamic_backfills = Vec::new();
            if let Some(before) = backfill_before {
                for scoped in album_scopes.iter().filter(|a| a.dynamic) {
                    dynamic_backfills.push(
                        dynamic::evaluate_members(
                            &self.evaluator,
                            scoped,
                            Some(0),
                            before,
                            settled_before,
                            page_ceiling,
                        )
                        .await?,
                    );
                }
            }

            // Users
            let mut rows = streams::users::deletes(ack, settled_before).stream(db).await?;
            while let Some(row) = rows.try_next().await? {
                yield SyncChange::new(row.id, SyncPayload::UserDelete(row));
            }
            drop(rows);
            let mut rows = streams::users::upserts(ack, settled_before).stream(db).await?;
            while let Some(row) = rows.try_next().await? {
                yield SyncChange::new(row.update_id, SyncPayload::UserUpsert(row));
            }
            drop(rows);

            // Partners
            let mut rows = streams::partners::deletes(principal, ack, settled_before)
                .stream(db)
                .await?;
            while let Some(row) = rows.try_next().await? {
                yield SyncChange::new(row.id, SyncPayload::PartnerDelete(row));
            }
            drop(rows);
            let mut rows = streams::partners::upserts(principal, ack, settled_before)
                .stream(db)
                .await?;
            while let Some(row) = rows.try_next().await? {
                yield SyncChange::new(row.update_id, SyncPayload::PartnerUpsert(row));
            }
            drop(rows);

            // Assets. The scan already covers static-album members; dynamic
            // members are computed runs interleaved by update id. An update
            // id names exactly one row, so equal keys collapse to one emit.
            if let Some(before) = backfill_before {
                let mut runs: Vec<Vec<asset::Model>> = Vec::new();
                for owner in &partner_scopes {
                    runs.push(
                        streams::assets::backfill(*owner, 0, before, settled_before)
                            .all(db)
                            .await?,
                    );
                }
                for scoped in album_scopes.iter().filter(|a| !a.dynamic) {
                    runs.push(
                        streams::assets::album_backfill(scoped.id, 0, before, settled_before)
                            .all(db)
                            .await?,
                    );
                }
                for members in &dynamic_backfills {
                    runs.push(members.assets.clone());
                }
                let mut last = None;
                for row in merge_ascending(runs) {
                    if last == Some(row.update_id) {
                        continue;
                    }
                    last = Some(row.update_id);
                    yield SyncChange::new(row.update_id, SyncPayload::AssetUpsert(row));
                }
            }
            let mut rows = streams::assets::deletes(principal, ack, settled_before)
                .stream(db)
                .await?;
            while let Some(row) = rows.try_next().await? {
                yield SyncChange::new(row.id, SyncPayload::AssetDelete(row));
            }
            drop(rows);
            let mut computed = RunBuffer::new(
                dynamic_members.iter().map(|m| m.assets.clone()).collect(),
            );
            let mut last = None;
            let mut rows = streams::assets::upserts(principal, ack, settled_before)
                .stream(db)
                .await?;
            while let Some(row) = rows.try_next().await? {
                for extra in computed.take_through(row.update_id) {
                    if last == Some(extra.update_id) || extra.update_id == row.update_id {
                        continue;
                    }
                    last = Some(extra.update_id);
                    yield SyncChange::new(extra.update_id, SyncPayload::AssetUpsert(extra));
                }
                last = Some(row.update_id);
                yield SyncChange::new(row.update_id, SyncPayload::AssetUpsert(row));
            }
            drop(rows);
            for extra in computed.drain() {
                if last == Some(extra.update_id) {
                    continue;
                }
                last = Some(extra.update_id);
                yield SyncChange::new(extra.update_id, SyncPayload::AssetUpsert(extra));
            }

            // Exif, same shape as assets. Exif has one row per asset, so a
            // concatenated dynamic member id list yields no duplicates of
            // its own.
            if let Some(before) = backfill_before {
                let mut runs: Vec<Vec<exif::Model>> = Vec::new();
                for owner in &partner_scopes {
                    runs.push(
                        streams::asset_exif::backfill(*owner, 0, before, settled_before)
                            .all(db)
                            .await?,
                    );
                }
                for scoped in album_scopes.iter().filter(|a| !a.dynamic) {
                    runs.push(
                        streams::asset_exif::album_backfill(scoped.id, 0, before, settled_before)
                            .all(db)
                            .await?,
                    );
                }
                for members in &dynamic_backfills {
                    if !members.member_ids.is_empty() {
                        runs.push(
                            streams::asset_exif::for_assets_backfill(
                                members.member_ids.clone(),
                                0,
                                before,
                                settled_before,
                            )
                            .all(db)
                            .await?,
                        );
                    }
                }
                let mut last = None;
                for row in merge_ascending(runs) {
                    if last == Some(row.update_id) {
                        continue;
                    }
                    last = Some(row.update_id);
                    yield SyncChange::new(row.update_id, SyncPayload::AssetExifUpsert(row));
                }
            }
            let member_ids: Vec<Uuid> = dynamic_members
                .iter()
                .flat_map(|m| m.member_ids.iter().copied())
                .collect();
            let computed_run = if member_ids.is_empty() {
                Vec::new()
            } else {
                streams::asset_exif::for_assets(member_ids, ack, settled_before)
                    .all(db)
                    .await?
            };
            let mut computed = RunBuffer::new(vec![computed_run]);
            let mut last = None;
            let mut rows = streams::asset_exif::upserts(principal, ack, settled_before)
                .stream(db)
                .await?;
            while let Some(row) = rows.try_next().await? {
                for extra in computed.take_through(row.update_id) {
                    if last == Some(extra.update_id) || extra.update_id == row.update_id {
                        continue;
                    }
                    last = Some(extra.update_id);
                    yield SyncChange::new(extra.update_id, SyncPayload::AssetExifUpsert(extra));
                }
                last = Some(row.update_id);
                yield SyncChange::new(row.update_id, SyncPayload::AssetExifUpsert(row));
            }
            drop(rows);
            for extra in computed.drain() {
                if last == Some(extra.update_id) {
                    continue;
                }
                last = Some(extra.update_id);
                yield SyncChange::new(extra.update_id, SyncPayload::AssetExifUpsert(extra));
            }

            // Albums. Newly visible albums sit at or below the cursor, so
            // their rows are emitted here; the regular scan covers the rest.
            if let Some(before) = backfill_before {
                for scoped in &album_scopes {
                    if scoped.update_id <= before && scoped.updated_at < settled_before {
                        yield SyncChange::new(
                            scoped.update_id,
                            SyncPayload::AlbumUpsert(scoped.clone()),
                        );
                    }
                }
            }
            let mut rows = streams::albums::deletes(principal, ack, settled_before)
                .stream(db)
                .await?;
            while let Some(row) = rows.try_next().await? {
                yield SyncChange::new(row.id, SyncPayload::AlbumDelete(row));
            }
            drop(rows);
            let mut rows = streams::albums::upserts(principal, ack, settled_before)
                .stream(db)
                .await?;
            while let Some(row) = rows.try_next().await? {
                yield SyncChange::new(row.update_id, SyncPayload::AlbumUpsert(row));
            }
            drop(rows);

            // Album membership: the dynamic runs computed up front merge
            // with the static join-table run.
            if let Some(before) = backfill_before {
                for scoped in &album_scopes {
                    let static_run: Vec<MembershipRow> =
                        streams::album_assets::backfill(scoped.id, 0, before, settled_before)
                            .all(db)
                            .await?
                            .into_iter()
                            .map(MembershipRow::from)
                            .collect();
                    let mut runs = vec![static_run];
                    if let Some(members) =
                        dynamic_backfills.iter().find(|m| m.album_id == scoped.id)
                    {
                        runs.push(members.membership_rows());
                    }
                    for row in merge_ascending(runs) {
                        yield SyncChange::new(
                            row.update_id,
                            SyncPayload::AlbumAssetUpsert(row),
                        );
                    }
                }
            }
            let mut rows = streams::album_assets::deletes(principal, ack, settled_before)
                .stream(db)
                .await?;
            while let Some(row) = rows.try_next().await? {
                yield SyncChange::new(row.id, SyncPayload::AlbumAssetDelete(row));
            }
            drop(rows);

            let mut runs: Vec<Vec<MembershipRow>> = Vec::with_capacity(dynamic_members.len() + 1);
            let static_run: Vec<MembershipRow> =
                streams::album_assets::upserts(principal, ack, settled_before)
                    .all(db)
                    .await?
                    .into_iter()
                    .map(MembershipRow::from)
                    .collect();
            runs.push(static_run);
            for members in &dynamic_members {
                runs.push(members.membership_rows());
            }
            for row in merge_ascending(runs) {
                yield SyncChange::new(row.update_id, SyncPayload::AlbumAssetUpsert(row));
            }

            // Album shares
            if let Some(before) = backfill_before {
                for scoped in &album_scopes {
                    let mut rows =
                        streams::album_users::backfill(scoped.id, 0, before, settled_before)
                            .stream(db)
                            .await?;
                    while let Some(row) = rows.try_next().await? {
                        yield SyncChange::new(
                            row.update_id,
                            SyncPayload::AlbumUserUpsert(row),
                        );
                    }
                }
            }
            let mut rows = streams::album_users::deletes(principal, ack, settled_before)
                .stream(db)
                .await?;
            while let Some(row) = rows.try_next().await? {
                yield SyncChange::new(row.id, SyncPayload::AlbumUserDelete(row));
            }
            drop(rows);
            let mut rows = streams::album_users::upserts(principal, ack, settled_before)
                .stream(db)
                .await?;
            while let Some(row) = rows.try_next().await? {
                yield SyncChange::new(row.update_id, SyncPayload::AlbumUserUpsert(row));
            }
            drop(rows);

            // Memories
            let mut rows = streams::memories::deletes(principal, ack, settled_before)
                .stream(db)
                .await?;
            while let Some(row) = rows.try_next().await? {
                yield SyncChange::new(row.id, SyncPayload::MemoryDelete(row));
            }
            drop(rows);
            let mut rows = streams::memories::upserts(principal, ack, settled_before)
                .stream(db)
                .await?;
            while let Some(row) = rows.try_next().await? {
                yield SyncChange::new(row.update_id, SyncPayload::MemoryUpsert(row));
            }
            drop(rows);

            let mut rows = streams::memory_assets::deletes(principal, ack, settled_before)
                .stream(db)
                .await?;
            while let Some(row) = rows.try_next().await? {
                yield SyncChange::new(row.id, SyncPayload::MemoryAssetDelete(row));
            }
            drop(rows);
            let mut rows = streams::memory_assets::upserts(principal, ack, settled_before)
                .stream(db)
                .await?;
            while let Some(row) = rows.try_next().await? {
                yield SyncChange::new(row.update_id, SyncPayload::MemoryAssetUpsert(row));
            }
            drop(rows);

            // Stacks
            if let Some(before) = backfill_before {
                for owner in &partner_scopes {
                    let mut rows = streams::stacks::backfill(*owner, 0, before, settled_before)
                        .stream(db)
                        .await?;
                    while let Some(row) = rows.try_next().await? {
                        yield SyncChange::new(row.update_id, SyncPayload::StackUpsert(row));
                    }
                }
            }
            let mut rows = streams::stacks::deletes(principal, ack, settled_before)
                .stream(db)
                .await?;
            while let Some(row) = rows.try_next().await? {
                yield SyncChange::new(row.id, SyncPayload::StackDelete(row));
            }
            drop(rows);
            let mut rows = streams::stacks::upserts(principal, ack, settled_before)
                .stream(db)
                .await?;
            while let Some(row) = rows.try_next().await? {
                yield SyncChange::new(row.update_id, SyncPayload::StackUpsert(row));
            }
            drop(rows);

            self.sessions.stage(principal, ack, watermarks);
        }
    }
}
