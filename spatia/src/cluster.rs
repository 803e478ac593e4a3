//! The spatial clustering engine: graph connectivity over pairwise
//! intersection, and DBSCAN with ε-neighborhood and minimum-points
//! semantics. Both run over a weighted [`UnionFind`] and an envelope
//! R-tree prefilter; predicates and distances come from the planar
//! engine adapter.
//!
//! Every entry point either returns a complete result or an error;
//! there are no partial results.

use geo::PreparedGeometry;

use spatia_types::{Bbox, Geometry, GeometryCollection, GeometryType};

use crate::engine;
use crate::index::EnvelopeIndex;
use crate::{CancelToken, ClusterError, UnionFind};

/// Partition `geoms` into the minimum number of groups such that any two
/// members of a group are connected by a chain of pairwise intersections.
///
/// The result is one [`GeometryCollection`] per group; the grouping (as a
/// set of sets of inputs) is invariant under permutation of the input.
/// Empty inputs land in singleton groups.
///
/// # Examples
///
/// ```
/// use spatia::cluster::cluster_intersecting;
/// use spatia::wire::{wkt, Checks};
///
/// let geoms: Vec<_> = ["POINT (0 0)", "POINT (0 0)", "POINT (9 9)"]
///     .iter()
///     .map(|t| wkt::parse_wkt(t, Checks::NONE).unwrap())
///     .collect();
/// assert_eq!(cluster_intersecting(&geoms).unwrap().len(), 2);
/// ```
pub fn cluster_intersecting(geoms: &[Geometry]) -> Result<Vec<GeometryCollection>, ClusterError> {
    cluster_intersecting_with_cancel(geoms, &CancelToken::new())
}

/// [`cluster_intersecting`] observing a cancellation token between
/// predicate evaluations.
pub fn cluster_intersecting_with_cancel(
    geoms: &[Geometry],
    cancel: &CancelToken,
) -> Result<Vec<GeometryCollection>, ClusterError> {
    let mut uf = UnionFind::new(geoms.len() as u32);
    union_intersecting_pairs(geoms, &mut uf, cancel)?;
    let clusters = combine_geometries(&mut uf, geoms);
    log::debug!(
        "clustered {} inputs into {} intersecting groups",
        geoms.len(),
        clusters.len()
    );
    Ok(clusters)
}

/// Group `geoms` so that members of a group are separated by no more than
/// `tolerance`: DBSCAN with `min_points = 1` plus collection assembly.
pub fn cluster_within_distance(
    geoms: &[Geometry],
    tolerance: f64,
) -> Result<Vec<GeometryCollection>, ClusterError> {
    cluster_within_distance_with_cancel(geoms, tolerance, &CancelToken::new())
}

/// [`cluster_within_distance`] observing a cancellation token.
pub fn cluster_within_distance_with_cancel(
    geoms: &[Geometry],
    tolerance: f64,
    cancel: &CancelToken,
) -> Result<Vec<GeometryCollection>, ClusterError> {
    let (mut uf, _) = union_dbscan_with_cancel(geoms, tolerance, 1, cancel)?;
    Ok(combine_geometries(&mut uf, geoms))
}

/// DBSCAN over `geoms`: unions the clusters into the returned
/// [`UnionFind`] and reports, per input, whether it ended up in a cluster
/// at all (core or border) rather than as noise.
///
/// - a point is **core** when at least `min_points` inputs (itself
///   included) lie within `eps` of it;
/// - core points within `eps` of each other share a cluster;
/// - a non-core point within `eps` of a core point is a **border** point
///   of the first cluster that claims it, and never merges clusters.
///
/// `min_points <= 1` makes every non-empty input core and reduces the
/// algorithm to transitive closure of "distance ≤ eps", which skips the
/// neighbor bookkeeping entirely.
pub fn union_dbscan(
    geoms: &[Geometry],
    eps: f64,
    min_points: u32,
) -> Result<(UnionFind, Vec<bool>), ClusterError> {
    union_dbscan_with_cancel(geoms, eps, min_points, &CancelToken::new())
}

/// [`union_dbscan`] observing a cancellation token.
pub fn union_dbscan_with_cancel(
    geoms: &[Geometry],
    eps: f64,
    min_points: u32,
    cancel: &CancelToken,
) -> Result<(UnionFind, Vec<bool>), ClusterError> {
    let mut uf = UnionFind::new(geoms.len() as u32);
    let in_cluster = if min_points <= 1 {
        union_dbscan_minpoints_1(geoms, &mut uf, eps, cancel)?
    } else {
        union_dbscan_general(geoms, &mut uf, eps, min_points as usize, cancel)?
    };
    Ok((uf, in_cluster))
}

fn to_engine_all(
    geoms: &[Geometry],
) -> Result<Vec<Option<geo_types::Geometry<f64>>>, ClusterError> {
    geoms
        .iter()
        .map(|g| {
            if g.is_empty() {
                Ok(None)
            } else {
                engine::to_engine(g).map(Some).map_err(ClusterError::from)
            }
        })
        .collect()
}

fn envelope_entries(geoms: &[Geometry]) -> impl Iterator<Item = (usize, Bbox)> + '_ {
    geoms
        .iter()
        .enumerate()
        .filter_map(|(i, g)| g.compute_box2d().map(|b| (i, b)))
}

fn union_intersecting_pairs(
    geoms: &[Geometry],
    uf: &mut UnionFind,
    cancel: &CancelToken,
) -> Result<(), ClusterError> {
    if geoms.len() <= 1 {
        return Ok(());
    }
    let engine_geoms = to_engine_all(geoms)?;
    let index = EnvelopeIndex::build(envelope_entries(geoms));

    // Prepared geometries are built lazily and kept for the whole call.
    let mut prepared: Vec<Option<PreparedGeometry<'_, &geo_types::Geometry<f64>>>> =
        (0..geoms.len()).map(|_| None).collect();
    let mut found = Vec::new();

    for p in 0..geoms.len() {
        let ep = match &engine_geoms[p] {
            Some(e) => e,
            None => continue,
        };
        let env = match geoms[p].compute_box2d() {
            Some(b) => b,
            None => continue,
        };
        index.query(&env, &mut found);

        // Points and multipoints gain nothing from preparation; use the
        // direct predicate for them.
        let plain = matches!(
            geoms[p].geom_type(),
            GeometryType::Point | GeometryType::MultiPoint
        );

        for &q in &found {
            if cancel.is_cancelled() {
                return Err(ClusterError::Cancelled);
            }
            if p == q || uf.find(p as u32) == uf.find(q as u32) {
                continue;
            }
            let eq = match &engine_geoms[q] {
                Some(e) => e,
                None => continue,
            };
            let hit = if plain {
                engine::intersects(ep, eq)
            } else {
                let prep = prepared[p].get_or_insert_with(|| engine::prepare(ep));
                engine::prepared_intersects(prep, eq)
            };
            if hit {
                uf.union(p as u32, q as u32);
            }
        }
    }
    Ok(())
}

/// The query window: the geometry's envelope padded by `eps` on every
/// side (for a point input this is the eps-square around its coordinate).
fn dbscan_query_envelope(g: &Geometry, eps: f64) -> Option<Bbox> {
    let mut env = g.compute_box2d()?;
    env.expand2d(eps);
    Some(env)
}

fn union_dbscan_minpoints_1(
    geoms: &[Geometry],
    uf: &mut UnionFind,
    eps: f64,
    cancel: &CancelToken,
) -> Result<Vec<bool>, ClusterError> {
    let n = geoms.len();
    let in_cluster = vec![true; n];
    if n <= 1 {
        return Ok(in_cluster);
    }
    let engine_geoms = to_engine_all(geoms)?;
    let index = EnvelopeIndex::build(envelope_entries(geoms));
    let mut found = Vec::new();

    for p in 0..n {
        let ep = match &engine_geoms[p] {
            Some(e) => e,
            None => continue,
        };
        let env = match dbscan_query_envelope(&geoms[p], eps) {
            Some(env) => env,
            None => continue,
        };
        index.query(&env, &mut found);
        for &q in &found {
            if cancel.is_cancelled() {
                return Err(ClusterError::Cancelled);
            }
            if uf.find(p as u32) == uf.find(q as u32) {
                continue;
            }
            let eq = match &engine_geoms[q] {
                Some(e) => e,
                None => continue,
            };
            let dist = engine::distance(ep, eq);
            if !dist.is_finite() {
                return Err(ClusterError::Distance(p, q));
            }
            if dist <= eps {
                uf.union(p as u32, q as u32);
            }
        }
    }
    Ok(in_cluster)
}

fn union_dbscan_general(
    geoms: &[Geometry],
    uf: &mut UnionFind,
    eps: f64,
    min_points: usize,
    cancel: &CancelToken,
) -> Result<Vec<bool>, ClusterError> {
    let n = geoms.len();
    let mut in_cluster = vec![false; n];
    // Not even enough inputs to form one cluster.
    if n < min_points {
        return Ok(in_cluster);
    }
    let engine_geoms = to_engine_all(geoms)?;
    let index = EnvelopeIndex::build(envelope_entries(geoms));

    let mut is_core = vec![false; n];
    let mut neighbors: Vec<usize> = Vec::with_capacity(min_points);
    let mut found = Vec::new();

    for p in 0..n {
        let ep = match &engine_geoms[p] {
            Some(e) => e,
            None => continue,
        };
        let env = match dbscan_query_envelope(&geoms[p], eps) {
            Some(env) => env,
            None => continue,
        };
        index.query(&env, &mut found);

        // The envelope filter bounds the neighbor count from above.
        if found.len() < min_points {
            continue;
        }
        neighbors.clear();

        for &q in &found {
            if cancel.is_cancelled() {
                return Err(ClusterError::Cancelled);
            }
            if neighbors.len() >= min_points {
                // p is already core and unioned; a distance to q can only
                // teach us something if q is in a different cluster and is
                // not a border point bound to it.
                if uf.find(p as u32) == uf.find(q as u32) {
                    continue;
                }
                if in_cluster[q] && !is_core[q] {
                    continue;
                }
            }
            let eq = match &engine_geoms[q] {
                Some(e) => e,
                None => continue,
            };
            let dist = engine::distance(ep, eq);
            if !dist.is_finite() {
                return Err(ClusterError::Distance(p, q));
            }
            if dist > eps {
                continue;
            }
            if neighbors.len() < min_points {
                // Not yet sure p is core; set q aside.
                neighbors.push(q);
                if neighbors.len() == min_points {
                    is_core[p] = true;
                    in_cluster[p] = true;
                    for &m in &neighbors {
                        union_if_available(uf, p, m, &is_core, &mut in_cluster);
                    }
                }
            } else {
                union_if_available(uf, p, q, &is_core, &mut in_cluster);
            }
        }
    }
    Ok(in_cluster)
}

/// Union `p`'s cluster with `q`'s unless `q` is a border point already
/// claimed by another cluster; clusters only merge through core points.
fn union_if_available(
    uf: &mut UnionFind,
    p: usize,
    q: usize,
    is_core: &[bool],
    in_cluster: &mut [bool],
) {
    if in_cluster[q] {
        if is_core[q] {
            uf.union(p as u32, q as u32);
        }
    } else {
        uf.union(p as u32, q as u32);
        in_cluster[q] = true;
    }
}

/// Assemble one collection per union-find cluster, members in
/// ordered-by-cluster order (ascending input index within a cluster).
/// Each collection takes its SRID from its first member.
fn combine_geometries(uf: &mut UnionFind, geoms: &[Geometry]) -> Vec<GeometryCollection> {
    let order = uf.ordered_by_cluster();
    let mut clusters = Vec::with_capacity(uf.num_clusters() as usize);
    let mut members: Vec<Geometry> = Vec::new();
    for (i, &idx) in order.iter().enumerate() {
        members.push(geoms[idx as usize].clone());
        let run_ends = match order.get(i + 1) {
            Some(&next) => uf.find(next) != uf.find(idx),
            None => true,
        };
        if run_ends {
            let srid = members[0].srid();
            let mut col = GeometryCollection::new(std::mem::take(&mut members));
            col.srid = srid;
            clusters.push(col);
        }
    }
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use spatia_wire::{wkt, Checks};

    fn geoms(texts: &[&str]) -> Vec<Geometry> {
        texts
            .iter()
            .map(|t| wkt::parse_wkt(t, Checks::NONE).unwrap())
            .collect()
    }

    #[test]
    fn empty_input_yields_empty_result() {
        assert_eq!(cluster_intersecting(&[]).unwrap().len(), 0);
        assert_eq!(cluster_within_distance(&[], 1.0).unwrap().len(), 0);
        let (uf, mask) = union_dbscan(&[], 1.0, 5).unwrap();
        assert!(uf.is_empty());
        assert!(mask.is_empty());
    }

    #[test]
    fn single_input_is_one_cluster() {
        let input = geoms(&["POINT (0 0)"]);
        let clusters = cluster_intersecting(&input).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].geoms.len(), 1);

        let clusters = cluster_within_distance(&input, 1.0).unwrap();
        assert_eq!(clusters.len(), 1);
    }

    #[test]
    fn curve_input_is_an_engine_error() {
        let input = geoms(&["CIRCULARSTRING (0 0, 1 1, 2 0)", "POINT (0 0)"]);
        assert!(matches!(
            cluster_intersecting(&input),
            Err(ClusterError::Engine(_))
        ));
    }

    #[test]
    fn cancelled_token_aborts() {
        let input = geoms(&["LINESTRING (0 0, 1 1)", "LINESTRING (1 1, 2 2)"]);
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(matches!(
            cluster_intersecting_with_cancel(&input, &cancel),
            Err(ClusterError::Cancelled)
        ));
        assert!(matches!(
            cluster_within_distance_with_cancel(&input, 1.0, &cancel),
            Err(ClusterError::Cancelled)
        ));
    }

    #[test]
    fn cluster_srid_comes_from_members() {
        let mut input = geoms(&["POINT (0 0)", "POINT (5 5)"]);
        for g in &mut input {
            g.set_srid(Some(4326));
        }
        let clusters = cluster_intersecting(&input).unwrap();
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(|c| c.srid == Some(4326)));
    }
}
