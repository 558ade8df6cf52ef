//! Filter evaluation against the asset catalog
//!
//! Compiles an [`AssetSearchQuery`] into one SQL statement. Only
//! timeline assets of the owner are candidates; hidden, archived and
//! trashed assets never match regardless of the expression.

use std::time::Duration;

use sea_orm::sea_query::{Expr, Func, Query, SelectStatement};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::config::SyncConfig;
use crate::domain::filters::{AlbumFilters, FilterOperator};
use crate::infrastructure::database::entities::{asset, asset_face, exif, tag_asset, tag_closure};
use crate::search::cache::FilterQueryCache;
use crate::search::query::{AssetSearchQuery, Page, SearchPagination, SortOrder};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("filter query timed out after {0:?}")]
    Timeout(Duration),
}

/// What to do when a dynamic album's query fails.
///
/// Sync rounds use strict: a partial evaluation must abort the round
/// rather than silently advance the cursor past missing rows.
/// Read-only convenience paths use best-effort, which logs and returns
/// an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryPolicy {
    #[default]
    Strict,
    BestEffort,
}

pub struct FilterEvaluator {
    db: DatabaseConnection,
    cache: FilterQueryCache,
    timeout: Duration,
}

impl FilterEvaluator {
    pub fn new(db: DatabaseConnection, config: &SyncConfig) -> Self {
        Self {
            db,
            cache: FilterQueryCache::new(
                config.filter_cache_ttl(),
                config.dynamic_albums.filter_cache_capacity,
            ),
            timeout: config.query_timeout(),
        }
    }

    /// Evaluate an album's filter expression for its owner.
    pub async fn evaluate(
        &self,
        album_id: Uuid,
        owner_id: Uuid,
        filters: &AlbumFilters,
        order: SortOrder,
        pagination: SearchPagination,
        policy: RecoveryPolicy,
    ) -> Result<Page<asset::Model>, SearchError> {
        let query = match self.cache.get(owner_id, filters) {
            Some(query) => query,
            None => {
                let query = AssetSearchQuery::from_filters(filters, owner_id);
                self.cache.insert(owner_id, filters.clone(), query.clone());
                query
            }
        };

        let select = build_select(&query, order, pagination);
        let result = tokio::time::timeout(self.timeout, select.all(&self.db)).await;

        let rows = match result {
            Ok(Ok(rows)) => rows,
            Ok(Err(err)) => {
                return self.recover(policy, album_id, SearchError::Database(err));
            }
            Err(_) => {
                return self.recover(policy, album_id, SearchError::Timeout(self.timeout));
            }
        };

        let has_next_page = rows.len() as u64 > pagination.size;
        let items = rows
            .into_iter()
            .take(pagination.size as usize)
            .collect();

        Ok(Page { items, has_next_page })
    }

    fn recover(
        &self,
        policy: RecoveryPolicy,
        album_id: Uuid,
        err: SearchError,
    ) -> Result<Page<asset::Model>, SearchError> {
        match policy {
            RecoveryPolicy::Strict => Err(err),
            RecoveryPolicy::BestEffort => {
                warn!(album_id = %album_id, error = %err, "dynamic album query failed, returning empty page");
                Ok(Page {
                    items: Vec::new(),
                    has_next_page: false,
                })
            }
        }
    }
}

/// Build the full statement: base visibility scope, the filter
/// expression, capture-time ordering, and a one-row lookahead for
/// `has_next_page`.
fn build_select(
    query: &AssetSearchQuery,
    order: SortOrder,
    pagination: SearchPagination,
) -> Select<asset::Entity> {
    let mut select = asset::Entity::find()
        .filter(asset::Column::OwnerId.eq(query.owner_id))
        .filter(asset::Column::DeletedAt.is_null())
        .filter(asset::Column::Visibility.eq(asset::AssetVisibility::Timeline));

    if let Some(condition) = filter_condition(query) {
        select = select.filter(condition);
    }

    select = match order {
        SortOrder::Asc => select.order_by_asc(asset::Column::FileCreatedAt),
        SortOrder::Desc => select.order_by_desc(asset::Column::FileCreatedAt),
    };

    select
        .limit(pagination.size + 1)
        .offset(pagination.offset())
}

/// Combine the per-field groups with the expression operator. The same
/// operator also applies inside the tag and person lists; the pieces of
/// a single group (structured location, date bounds, camera metadata)
/// always AND together.
fn filter_condition(query: &AssetSearchQuery) -> Option<Condition> {
    let mut groups: Vec<Condition> = Vec::new();

    if !query.tag_ids.is_empty() {
        groups.push(tags_group(query));
    }

    if !query.person_ids.is_empty() {
        groups.push(people_group(query));
    }

    if query.city.is_some() || query.state.is_some() || query.country.is_some() {
        let mut parts = Condition::all();
        if let Some(city) = &query.city {
            parts = parts.add(exif::Column::City.eq(city.clone()));
        }
        if let Some(state) = &query.state {
            parts = parts.add(exif::Column::State.eq(state.clone()));
        }
        if let Some(country) = &query.country {
            parts = parts.add(exif::Column::Country.eq(country.clone()));
        }
        groups.push(
            Condition::all().add(asset::Column::Id.in_subquery(exif_subquery(parts))),
        );
    }

    if query.taken_after.is_some() || query.taken_before.is_some() {
        let mut range = Condition::all();
        if let Some(start) = query.taken_after {
            range = range.add(asset::Column::FileCreatedAt.gte(start));
        }
        if let Some(end) = query.taken_before {
            range = range.add(asset::Column::FileCreatedAt.lte(end));
        }
        groups.push(range);
    }

    if let Some(media_type) = query.media_type {
        let kind = match media_type {
            crate::domain::filters::MediaType::Image => asset::AssetKind::Image,
            crate::domain::filters::MediaType::Video => asset::AssetKind::Video,
        };
        groups.push(Condition::all().add(asset::Column::Kind.eq(kind)));
    }

    let mut metadata = Condition::all();
    let mut has_metadata = false;
    if let Some(favorite) = query.is_favorite {
        metadata = metadata.add(asset::Column::IsFavorite.eq(favorite));
        has_metadata = true;
    }
    let mut camera = Condition::all();
    let mut has_camera = false;
    if let Some(make) = &query.make {
        camera = camera.add(exif::Column::Make.eq(make.clone()));
        has_camera = true;
    }
    if let Some(model) = &query.model {
        camera = camera.add(exif::Column::Model.eq(model.clone()));
        has_camera = true;
    }
    if let Some(lens_model) = &query.lens_model {
        camera = camera.add(exif::Column::LensModel.eq(lens_model.clone()));
        has_camera = true;
    }
    if let Some(rating) = query.rating {
        camera = camera.add(exif::Column::Rating.eq(rating));
        has_camera = true;
    }
    if has_camera {
        metadata = metadata.add(asset::Column::Id.in_subquery(exif_subquery(camera)));
        has_metadata = true;
    }
    if has_metadata {
        groups.push(metadata);
    }

    if groups.is_empty() {
        return None;
    }

    Some(match query.operator {
        FilterOperator::And => groups.into_iter().fold(Condition::all(), Condition::add),
        FilterOperator::Or => groups.into_iter().fold(Condition::any(), Condition::add),
    })
}

/// Tag matches include the whole subtree of each selected tag via the
/// closure table.
fn tags_group(query: &AssetSearchQuery) -> Condition {
    match query.operator {
        // ANY selected subtree contains the asset.
        FilterOperator::Or => Condition::all().add(
            asset::Column::Id.in_subquery(tag_subquery(query.tag_ids.iter().copied())),
        ),
        // EVERY selected subtree contains the asset.
        FilterOperator::And => query.tag_ids.iter().fold(Condition::all(), |cond, tag| {
            cond.add(asset::Column::Id.in_subquery(tag_subquery(std::iter::once(*tag))))
        }),
    }
}

fn tag_subquery(tag_ids: impl Iterator<Item = Uuid>) -> SelectStatement {
    Query::select()
        .column((tag_asset::Entity, tag_asset::Column::AssetId))
        .from(tag_asset::Entity)
        .inner_join(
            tag_closure::Entity,
            Expr::col((tag_closure::Entity, tag_closure::Column::DescendantId))
                .equals((tag_asset::Entity, tag_asset::Column::TagId)),
        )
        .and_where(
            Expr::col((tag_closure::Entity, tag_closure::Column::AncestorId)).is_in(tag_ids),
        )
        .to_owned()
}

fn people_group(query: &AssetSearchQuery) -> Condition {
    let mut sub = Query::select();
    sub.column((asset_face::Entity, asset_face::Column::AssetId))
        .from(asset_face::Entity)
        .and_where(
            Expr::col((asset_face::Entity, asset_face::Column::PersonId))
                .is_in(query.person_ids.iter().copied()),
        );

    if query.operator == FilterOperator::And && query.person_ids.len() > 1 {
        // All selected people must appear on the asset.
        sub.group_by_col((asset_face::Entity, asset_face::Column::AssetId))
            .and_having(
                Expr::expr(Func::count_distinct(Expr::col((
                    asset_face::Entity,
                    asset_face::Column::PersonId,
                ))))
                .gte(query.person_ids.len() as i64),
            );
    }

    Condition::all().add(asset::Column::Id.in_subquery(sub.to_owned()))
}

fn exif_subquery(condition: Condition) -> SelectStatement {
    Query::select()
        .column((exif::Entity, exif::Column::AssetId))
        .from(exif::Entity)
        .cond_where(condition)
        .to_owned()
}
