//! The `spatia` crate is a spatial geometry runtime: a dimension-tagged
//! geometry object model, wire codecs, and a union-find-based spatial
//! clustering engine accelerated by an R-tree.
//!
//! # Components
//!
//! - The geometry object model is re-exported from [`spatia_types`]
//!   (points through polyhedral surfaces, XY/XYZ/XYM/XYZM, SRID tags,
//!   cached bounding boxes).
//! - The serialization codec lives in [`wire`]: the internal binary form,
//!   WKB/EWKB and WKT/EWKT.
//! - The clustering engine ([`cluster`]): graph connectivity over
//!   pairwise intersection, and DBSCAN with ε-neighborhood and
//!   minimum-points semantics, both on a weighted [`UnionFind`].
//! - Geometry utilities the engine and its callers consume:
//!   [`wrap_x`](wrapx::wrap_x) longitude splitting and the
//!   [`remove_irrelevant_points_for_view`](decimate::remove_irrelevant_points_for_view)
//!   viewport decimator.
//!
//! Planar predicates, overlays and distances are delegated to the
//! [`geo`] computational-geometry stack through a narrow internal
//! adapter; this crate adds no robust predicates of its own.
//!
//! # Example
//!
//! ```
//! use spatia::cluster::cluster_intersecting;
//! use spatia::wire::{wkt, Checks};
//!
//! let geoms: Vec<_> = [
//!     "LINESTRING (0 0, 1 1)",
//!     "LINESTRING (1 1, 2 2)",
//!     "LINESTRING (5 5, 6 6)",
//! ]
//! .iter()
//! .map(|t| wkt::parse_wkt(t, Checks::NONE).unwrap())
//! .collect();
//!
//! let clusters = cluster_intersecting(&geoms).unwrap();
//! assert_eq!(clusters.len(), 2);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use spatia_types::*;
pub use spatia_wire as wire;

pub mod cluster;
pub mod decimate;
pub mod unionfind;
pub mod wrapx;

mod engine;
mod error;
mod index;

pub use cluster::{cluster_intersecting, cluster_within_distance, union_dbscan};
pub use decimate::remove_irrelevant_points_for_view;
pub use error::{ClusterError, EngineError};
pub use unionfind::UnionFind;
pub use wrapx::wrap_x;

/// A cooperative cancellation handle.
///
/// The clustering engine observes the token between spatial-index queries
/// and at predicate-evaluation boundaries; once cancelled, the running
/// operation aborts with [`ClusterError::Cancelled`] and leaks nothing.
/// Cloning shares the underlying flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    /// Request cancellation; safe to call from another thread or a signal
    /// context that owns a clone.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
