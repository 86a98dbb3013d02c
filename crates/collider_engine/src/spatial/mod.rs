//! Spatial partitioning data structures
//!
//! Provides spatial indexing of collider bounds for broad-phase collision
//! detection, linecasts and rectangle queries in 2D space.

mod spatial_hash;
pub mod spatial_query;

pub use spatial_hash::{SpatialHash, MAX_CELLS_PER_KEY};
pub use spatial_query::{ProxyKey, SpatialQuery};
