//! Dynamic-album filter expressions
//!
//! A filter expression is a flat record of optional fields combined with
//! a single `and`/`or` operator. Expressions are validated strictly on
//! the write path (field-level errors, nothing silently coerced) and
//! sanitized defensively on the read path, where stored blobs may
//! predate stricter validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// How the present fields of an expression are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    And,
    #[default]
    Or,
}

impl<'de> Deserialize<'de> for FilterOperator {
    // Stored expressions may carry operators written by older builds;
    // anything unrecognized falls back to `or`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.to_ascii_lowercase().as_str() {
            "and" => FilterOperator::And,
            _ => FilterOperator::Or,
        })
    }
}

/// Media kind filter (`IMAGE` / `VIDEO` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    Image,
    Video,
}

/// Free-text or structured location filter.
///
/// Free text is matched against the city column only; there is no fuzzy
/// matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationFilter {
    Text(String),
    Structured {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        city: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        state: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        country: Option<String>,
    },
}

impl LocationFilter {
    fn is_empty(&self) -> bool {
        match self {
            LocationFilter::Text(text) => text.trim().is_empty(),
            LocationFilter::Structured { city, state, country } => {
                let blank = |s: &Option<String>| {
                    s.as_deref().map_or(true, |v| v.trim().is_empty())
                };
                blank(city) && blank(state) && blank(country)
            }
        }
    }
}

/// Inclusive capture-time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRangeFilter {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Camera and asset-property filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lens_model: Option<String>,
    /// 0-5 stars
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
}

impl MetadataFilter {
    fn is_empty(&self) -> bool {
        self.is_favorite.is_none()
            && self.make.is_none()
            && self.model.is_none()
            && self.lens_model.is_none()
            && self.rating.is_none()
    }
}

/// Complete filter specification for a dynamic album.
///
/// An expression with no present fields matches every asset of the
/// album owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people: Option<Vec<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRangeFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<MediaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataFilter>,
    #[serde(default)]
    pub operator: FilterOperator,
}

impl AlbumFilters {
    pub fn is_empty(&self) -> bool {
        self.tags.is_none()
            && self.people.is_none()
            && self.location.is_none()
            && self.date_range.is_none()
            && self.asset_type.is_none()
            && self.metadata.is_none()
    }

    /// Defensive read path for stored filter blobs: parse leniently and
    /// sanitize the result. Unparseable blobs degrade to the empty
    /// expression rather than failing the read.
    pub fn from_stored(value: &Value) -> Self {
        serde_json::from_value::<AlbumFilters>(value.clone())
            .map(sanitize)
            .unwrap_or_default()
    }
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterValidationError {
    pub field: String,
    pub message: String,
    pub value: Value,
}

/// Outcome of validating a filter expression.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterValidationReport {
    pub errors: Vec<FilterValidationError>,
    pub warnings: Vec<String>,
}

impl FilterValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, field: &str, message: &str, value: impl Serialize) {
        self.errors.push(FilterValidationError {
            field: field.to_string(),
            message: message.to_string(),
            value: serde_json::to_value(value).unwrap_or(Value::Null),
        });
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}

/// Strict validation used on create/update paths. Nothing is coerced;
/// every offending field is reported with its value.
pub fn validate(filters: &AlbumFilters) -> FilterValidationReport {
    let mut report = FilterValidationReport::default();

    if let Some(tags) = &filters.tags {
        if tags.is_empty() {
            report.warn("Tags array is empty");
        }
        if has_duplicates(tags) {
            report.warn("Tags array contains duplicates");
        }
    }

    if let Some(people) = &filters.people {
        if people.is_empty() {
            report.warn("People array is empty");
        }
        if has_duplicates(people) {
            report.warn("People array contains duplicates");
        }
    }

    if let Some(location) = &filters.location {
        if location.is_empty() {
            report.error(
                "location",
                "Location must be a non-empty string or have at least one of city/state/country",
                location,
            );
        }
    }

    if let Some(range) = &filters.date_range {
        if range.start > range.end {
            report.error(
                "dateRange",
                "Start date must be before or equal to end date",
                range,
            );
        }
    }

    if let Some(metadata) = &filters.metadata {
        if let Some(rating) = metadata.rating {
            if !(0..=5).contains(&rating) {
                report.error("metadata.rating", "rating must be between 0 and 5", rating);
            }
        }
        let blank = |field: &Option<String>| {
            field.as_deref().is_some_and(|v| v.trim().is_empty())
        };
        if blank(&metadata.make) {
            report.error("metadata.make", "make cannot be blank", &metadata.make);
        }
        if blank(&metadata.model) {
            report.error("metadata.model", "model cannot be blank", &metadata.model);
        }
        if blank(&metadata.lens_model) {
            report.error(
                "metadata.lensModel",
                "lensModel cannot be blank",
                &metadata.lens_model,
            );
        }
    }

    if filters.is_empty() {
        report.warn("No filters specified - dynamic album will include all assets");
    }

    report
}

/// Deterministic repair used on defensive reads: drops empty and
/// duplicate array entries, blank strings, out-of-range ratings, and
/// inverted date ranges. Idempotent: `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize(filters: AlbumFilters) -> AlbumFilters {
    let mut out = AlbumFilters {
        operator: filters.operator,
        ..AlbumFilters::default()
    };

    if let Some(tags) = filters.tags {
        let tags = dedup(tags);
        if !tags.is_empty() {
            out.tags = Some(tags);
        }
    }

    if let Some(people) = filters.people {
        let people = dedup(people);
        if !people.is_empty() {
            out.people = Some(people);
        }
    }

    if let Some(location) = filters.location {
        out.location = sanitize_location(location);
    }

    if let Some(range) = filters.date_range {
        if range.start <= range.end {
            out.date_range = Some(range);
        }
    }

    out.asset_type = filters.asset_type;

    if let Some(metadata) = filters.metadata {
        let metadata = MetadataFilter {
            is_favorite: metadata.is_favorite,
            make: trimmed(metadata.make),
            model: trimmed(metadata.model),
            lens_model: trimmed(metadata.lens_model),
            rating: metadata.rating.filter(|r| (0..=5).contains(r)),
        };
        if !metadata.is_empty() {
            out.metadata = Some(metadata);
        }
    }

    out
}

fn sanitize_location(location: LocationFilter) -> Option<LocationFilter> {
    match location {
        LocationFilter::Text(text) => {
            let text = text.trim().to_string();
            (!text.is_empty()).then_some(LocationFilter::Text(text))
        }
        LocationFilter::Structured { city, state, country } => {
            let city = trimmed(city);
            let state = trimmed(state);
            let country = trimmed(country);
            if city.is_none() && state.is_none() && country.is_none() {
                None
            } else {
                Some(LocationFilter::Structured { city, state, country })
            }
        }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn dedup(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn has_duplicates(ids: &[Uuid]) -> bool {
    let mut seen = std::collections::HashSet::new();
    ids.iter().any(|id| !seen.insert(*id))
}
