//! Search query model
//!
//! An [`AssetSearchQuery`] is the compiled form of a stored filter
//! expression, scoped to one owner. The single `operator` drives both
//! how fields combine with each other and how values combine inside the
//! tag and person lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::filters::{AlbumFilters, FilterOperator, LocationFilter, MediaType};
use crate::infrastructure::database::entities::album::AlbumOrder;

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchPagination {
    pub page: u64,
    pub size: u64,
}

impl SearchPagination {
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page: page.max(1),
            size,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.size
    }
}

/// One page of results plus a lookahead flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl From<AlbumOrder> for SortOrder {
    fn from(order: AlbumOrder) -> Self {
        match order {
            AlbumOrder::Asc => SortOrder::Asc,
            AlbumOrder::Desc => SortOrder::Desc,
        }
    }
}

/// Compiled, owner-scoped search query.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSearchQuery {
    pub owner_id: Uuid,
    pub operator: FilterOperator,
    pub tag_ids: Vec<Uuid>,
    pub person_ids: Vec<Uuid>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub taken_after: Option<DateTime<Utc>>,
    pub taken_before: Option<DateTime<Utc>>,
    pub media_type: Option<MediaType>,
    pub is_favorite: Option<bool>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub lens_model: Option<String>,
    pub rating: Option<i32>,
}

impl AssetSearchQuery {
    /// Compile a stored filter expression for one owner. Expects
    /// sanitized filters.
    pub fn from_filters(filters: &AlbumFilters, owner_id: Uuid) -> Self {
        let (city, state, country) = match &filters.location {
            Some(LocationFilter::Text(text)) => (Some(text.clone()), None, None),
            Some(LocationFilter::Structured {
                city,
                state,
                country,
            }) => (city.clone(), state.clone(), country.clone()),
            None => (None, None, None),
        };

        let (taken_after, taken_before) = match &filters.date_range {
            Some(range) => (Some(range.start), Some(range.end)),
            None => (None, None),
        };

        let metadata = filters.metadata.as_ref();

        Self {
            owner_id,
            operator: filters.operator,
            tag_ids: filters.tags.clone().unwrap_or_default(),
            person_ids: filters.people.clone().unwrap_or_default(),
            city,
            state,
            country,
            taken_after,
            taken_before,
            media_type: filters.asset_type,
            is_favorite: metadata.and_then(|m| m.is_favorite),
            make: metadata.and_then(|m| m.make.clone()),
            model: metadata.and_then(|m| m.model.clone()),
            lens_model: metadata.and_then(|m| m.lens_model.clone()),
            rating: metadata.and_then(|m| m.rating),
        }
    }

    /// True when no filter predicate is present. An empty query matches
    /// every visible asset of the owner.
    pub fn is_unfiltered(&self) -> bool {
        self.tag_ids.is_empty()
            && self.person_ids.is_empty()
            && self.city.is_none()
            && self.state.is_none()
            && self.country.is_none()
            && self.taken_after.is_none()
            && self.taken_before.is_none()
            && self.media_type.is_none()
            && self.is_favorite.is_none()
            && self.make.is_none()
            && self.model.is_none()
            && self.lens_model.is_none()
            && self.rating.is_none()
    }
}
