//! Tombstone tables
//!
//! Append-only. Each row's `id` is drawn from the change sequence in the
//! same transaction that deletes the live row, so deletes interleave with
//! upserts under one cursor.

pub mod album_assets_audit;
pub mod album_users_audit;
pub mod albums_audit;
pub mod assets_audit;
pub mod memories_audit;
pub mod memory_assets_audit;
pub mod partners_audit;
pub mod stacks_audit;
pub mod users_audit;
