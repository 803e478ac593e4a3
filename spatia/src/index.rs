//! The transient spatial index: an R-tree over planar envelopes, one per
//! input geometry, rebuilt for every clustering call.

use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

use spatia_types::Bbox;

/// An R-tree mapping envelope rectangles to indices into the caller's
/// geometry array.
///
/// Queries may return false positives (anything whose envelope touches
/// the probe envelope) but never miss an intersecting entry.
pub(crate) struct EnvelopeIndex {
    tree: RTree<GeomWithData<Rectangle<[f64; 2]>, usize>>,
}

impl EnvelopeIndex {
    /// Bulk-load the index from `(input index, envelope)` pairs.
    pub fn build(entries: impl IntoIterator<Item = (usize, Bbox)>) -> EnvelopeIndex {
        let entries: Vec<_> = entries
            .into_iter()
            .map(|(id, b)| {
                GeomWithData::new(
                    Rectangle::from_corners([b.xmin, b.ymin], [b.xmax, b.ymax]),
                    id,
                )
            })
            .collect();
        log::debug!("building envelope index over {} entries", entries.len());
        EnvelopeIndex { tree: RTree::bulk_load(entries) }
    }

    /// Collect the indices of every stored envelope intersecting `env`
    /// into `out` (cleared first).
    pub fn query(&self, env: &Bbox, out: &mut Vec<usize>) {
        out.clear();
        let probe = AABB::from_corners([env.xmin, env.ymin], [env.xmax, env.ymax]);
        out.extend(
            self.tree
                .locate_in_envelope_intersecting(&probe)
                .map(|entry| entry.data),
        );
    }
}
