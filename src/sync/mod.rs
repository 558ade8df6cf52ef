//! Incremental sync engine
//!
//! A sync round streams, per entity type in dependency order, the
//! tombstones and upserts the client has not acknowledged yet. Dynamic
//! album membership is computed on the fly and merged into the static
//! membership stream so the client sees one ordered sequence.

pub mod dynamic;
pub mod error;
pub mod merge;
pub mod session;
pub mod streams;
pub mod types;

pub use error::SyncError;
pub use session::{BackfillScope, SessionStore, SyncService};
pub use types::{MembershipRow, SyncChange, SyncEntityType, SyncOp, SyncPayload};
