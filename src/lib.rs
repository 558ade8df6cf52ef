//! Aperture Sync
//!
//! Incremental synchronization engine for a self-hosted photo library.
//! Clients keep a local replica of server-side state (assets, albums,
//! memberships, partners, stacks, memories, users) by pulling changes
//! after an acknowledged cursor instead of refetching everything. The
//! engine merges two sources of album membership into one ordered change
//! stream: materialized join rows for static albums, and membership
//! computed on demand from a stored filter expression for dynamic albums.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod search;
pub mod services;
pub mod sync;

pub use config::SyncConfig;
pub use domain::cursor::{SyncAck, UpdateId};
pub use domain::filters::AlbumFilters;
pub use infrastructure::database::Database;
pub use search::FilterEvaluator;
pub use sync::{BackfillScope, SyncChange, SyncService};
