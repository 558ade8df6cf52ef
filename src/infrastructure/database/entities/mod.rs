//! SeaORM entities for the library catalog and its audit tables
//!
//! Every live table carries an `update_id` stamped from the shared
//! change sequence on each write; audit tables record tombstones keyed
//! by an id drawn from the same sequence, so one cursor totally orders
//! upserts and deletes.

pub mod album;
pub mod album_asset;
pub mod album_user;
pub mod asset;
pub mod asset_face;
pub mod change_sequence;
pub mod exif;
pub mod memory;
pub mod memory_asset;
pub mod partner;
pub mod stack;
pub mod tag;
pub mod tag_asset;
pub mod tag_closure;
pub mod user;

pub mod audit;
