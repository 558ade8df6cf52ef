//! Pure value types shared across the engine

pub mod cursor;
pub mod filters;
