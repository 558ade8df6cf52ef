//! Asset search: filter expressions compiled to SQL

pub mod cache;
pub mod evaluator;
pub mod query;

pub use cache::FilterQueryCache;
pub use evaluator::{FilterEvaluator, RecoveryPolicy, SearchError};
pub use query::{AssetSearchQuery, Page, SearchPagination, SortOrder};
