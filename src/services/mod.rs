//! Application services

pub mod dynamic_album;

pub use dynamic_album::{DynamicAlbumError, DynamicAlbumService};
