//! Clustering scenarios: connectivity clustering, distance clustering
//! and DBSCAN classification, including order-independence of the
//! resulting partition.

use spatia::cluster::{cluster_intersecting, cluster_within_distance, union_dbscan};
use spatia::wire::{wkt, Checks, WktVariant};
use spatia::{Geometry, GeometryCollection};

fn geoms(texts: &[&str]) -> Vec<Geometry> {
    texts
        .iter()
        .map(|t| wkt::parse_wkt(t, Checks::NONE).unwrap())
        .collect()
}

/// Every result collection must structurally match exactly one unused
/// expected collection (order of clusters and of members is not part of
/// the contract being checked here).
fn assert_clusters_match(results: &[GeometryCollection], expected: &[&str]) {
    assert_eq!(
        results.len(),
        expected.len(),
        "expected {} clusters, got {}",
        expected.len(),
        results.len()
    );
    let expected: Vec<Geometry> = geoms(expected);
    let mut used = vec![false; expected.len()];
    'outer: for r in results {
        let r = Geometry::GeometryCollection(r.clone());
        for (i, e) in expected.iter().enumerate() {
            if !used[i] && r.same(e) {
                used[i] = true;
                continue 'outer;
            }
        }
        panic!(
            "unmatched cluster {}",
            wkt::write_wkt(&r, WktVariant::Extended, 15)
        );
    }
}

const A: &str = "LINESTRING (0 0, 1 1)";
const B: &str = "LINESTRING (1 1, 2 2)";
const C: &str = "LINESTRING (5 5, 6 6)";

#[test]
fn chained_lines_form_two_clusters() {
    let near = "GEOMETRYCOLLECTION (LINESTRING (0 0, 1 1), LINESTRING (1 1, 2 2))";
    let far = "GEOMETRYCOLLECTION (LINESTRING (5 5, 6 6))";

    for input in [[A, B, C], [B, C, A], [C, A, B]] {
        let input = geoms(&input);
        assert_clusters_match(&cluster_intersecting(&input).unwrap(), &[near, far]);
        assert_clusters_match(&cluster_within_distance(&input, 0.0).unwrap(), &[near, far]);
    }
}

#[test]
fn distance_threshold_merges_clusters() {
    let input = geoms(&[A, B, C]);
    let partial = [
        "GEOMETRYCOLLECTION (LINESTRING (0 0, 1 1), LINESTRING (1 1, 2 2))",
        "GEOMETRYCOLLECTION (LINESTRING (5 5, 6 6))",
    ];
    let all = ["GEOMETRYCOLLECTION (LINESTRING (0 0, 1 1), LINESTRING (1 1, 2 2), LINESTRING (5 5, 6 6))"];

    let gap = 18.0_f64.sqrt();
    assert_clusters_match(&cluster_within_distance(&input, 0.0).unwrap(), &partial);
    assert_clusters_match(
        &cluster_within_distance(&input, gap - 1e-7).unwrap(),
        &partial,
    );
    assert_clusters_match(&cluster_within_distance(&input, gap + 1e-7).unwrap(), &all);
}

#[test]
fn nonsequential_chain_is_one_cluster() {
    let input = geoms(&[
        "LINESTRING (0 0, 1 1)",
        "LINESTRING (1 1, 2 2)",
        "LINESTRING (5 5, 6 6)",
        "LINESTRING (5 5, 4 4)",
        "LINESTRING (3 3, 2 2)",
        "LINESTRING (3 3, 4 4)",
    ]);
    let expected = ["GEOMETRYCOLLECTION (LINESTRING (0 0, 1 1), LINESTRING (1 1, 2 2), LINESTRING (5 5, 6 6), LINESTRING (5 5, 4 4), LINESTRING (3 3, 2 2), LINESTRING (3 3, 4 4))"];
    assert_clusters_match(&cluster_intersecting(&input).unwrap(), &expected);
    assert_clusters_match(&cluster_within_distance(&input, 0.0).unwrap(), &expected);
}

#[test]
fn single_input() {
    let input = geoms(&["POINT (0 0)"]);
    let expected = ["GEOMETRYCOLLECTION (POINT (0 0))"];
    assert_clusters_match(&cluster_intersecting(&input).unwrap(), &expected);
    assert_clusters_match(&cluster_within_distance(&input, 1.0).unwrap(), &expected);
}

#[test]
fn empty_inputs_form_singleton_clusters() {
    let input = geoms(&["POLYGON EMPTY", "LINESTRING EMPTY"]);
    let expected = [
        "GEOMETRYCOLLECTION (LINESTRING EMPTY)",
        "GEOMETRYCOLLECTION (POLYGON EMPTY)",
    ];
    assert_clusters_match(&cluster_intersecting(&input).unwrap(), &expected);
    assert_clusters_match(&cluster_within_distance(&input, 1.0).unwrap(), &expected);
}

#[test]
fn point_inputs_use_the_direct_predicate() {
    let input = geoms(&["MULTIPOINT ((0 0), (0 1))", "POINT (0 0)"]);
    assert_clusters_match(
        &cluster_intersecting(&input).unwrap(),
        &["GEOMETRYCOLLECTION (MULTIPOINT ((0 0), (0 1)), POINT (0 0))"],
    );

    let input = geoms(&[
        "GEOMETRYCOLLECTION (POINT (0 0), POINT (0 1))",
        "POINT (0 0)",
    ]);
    assert_clusters_match(
        &cluster_intersecting(&input).unwrap(),
        &["GEOMETRYCOLLECTION (GEOMETRYCOLLECTION (POINT (0 0), POINT (0 1)), POINT (0 0))"],
    );

    let input = geoms(&["POINT (3 3)", "POINT (3 3)"]);
    assert_clusters_match(
        &cluster_intersecting(&input).unwrap(),
        &["GEOMETRYCOLLECTION (POINT (3 3), POINT (3 3))"],
    );
}

/// Memberships as a set of sets, independent of cluster and member order.
fn membership_sets(clusters: &[GeometryCollection]) -> Vec<Vec<String>> {
    let mut sets: Vec<Vec<String>> = clusters
        .iter()
        .map(|c| {
            let mut members: Vec<String> = c
                .geoms
                .iter()
                .map(|g| wkt::write_wkt(g, WktVariant::Extended, 17))
                .collect();
            members.sort();
            members
        })
        .collect();
    sets.sort();
    sets
}

#[test]
fn partition_is_invariant_under_input_permutation() {
    let base = [
        "LINESTRING (0 0, 1 1)",
        "LINESTRING (1 1, 2 2)",
        "LINESTRING (2 2, 3 3)",
        "LINESTRING (5 5, 6 6)",
        "POINT (1 1)",
        "POINT (10 10)",
        "POLYGON ((2.5 2.5, 7 2.5, 7 7, 2.5 7, 2.5 2.5))",
    ];
    let reference = membership_sets(&cluster_intersecting(&geoms(&base)).unwrap());

    // A handful of deterministic permutations via rotation and swap.
    for rot in 0..base.len() {
        let mut permuted: Vec<&str> = base.to_vec();
        permuted.rotate_left(rot);
        if rot % 2 == 1 {
            let last = permuted.len() - 1;
            permuted.swap(0, last);
        }
        let clusters = cluster_intersecting(&geoms(&permuted)).unwrap();
        assert_eq!(membership_sets(&clusters), reference, "rotation {rot}");
    }
}

#[test]
fn zero_tolerance_matches_intersection_clustering() {
    let input = geoms(&[
        "LINESTRING (0 0, 1 1)",
        "LINESTRING (1 1, 2 2)",
        "POINT (9 9)",
        "POLYGON ((0 0, 0.5 0, 0.5 0.5, 0 0))",
    ]);
    let by_distance = membership_sets(&cluster_within_distance(&input, 0.0).unwrap());
    let by_predicate = membership_sets(&cluster_intersecting(&input).unwrap());
    assert_eq!(by_distance, by_predicate);
}

#[test]
fn dbscan_border_point_does_not_bridge_clusters() {
    // POINT (1 0) is within eps of both groups but has too few neighbors
    // to be core, so it joins the first cluster as a border point and the
    // two clusters stay apart.
    let input = geoms(&[
        "POINT (0 0)",
        "POINT (-1 0)",
        "POINT (-1 -0.1)",
        "POINT (-1 0.1)",
        "POINT (1 0)",
        "POINT (2 0)",
        "POINT (3 0)",
        "POINT (3 -0.1)",
        "POINT (3 0.1)",
    ]);
    let (mut uf, in_cluster) = union_dbscan(&input, 1.01, 5).unwrap();
    assert!(in_cluster.iter().all(|&b| b));

    let ids = uf.collapsed_cluster_ids(Some(&in_cluster));
    let expected = [0, 0, 0, 0, 0, 1, 1, 1, 1];
    for (i, &want) in expected.iter().enumerate() {
        assert_eq!(ids[i], Some(want), "point {i}");
    }
}

#[test]
fn dbscan_classification_matches_definition() {
    // Law: p is in a cluster iff p is core or within eps of a core point.
    let input = geoms(&[
        "POINT (0 0)",
        "POINT (0.5 0)",
        "POINT (1 0)",
        "POINT (2.2 0)",
        "POINT (9 9)",
    ]);
    let eps = 1.3;
    let min_points = 3;
    let n = input.len();

    let dist = |a: usize, b: usize| -> f64 {
        let pa = input[a].as_point().unwrap().point4().unwrap();
        let pb = input[b].as_point().unwrap().point4().unwrap();
        pa.distance2d(&pb)
    };
    let core: Vec<bool> = (0..n)
        .map(|p| (0..n).filter(|&q| dist(p, q) <= eps).count() >= min_points)
        .collect();
    let expected: Vec<bool> = (0..n)
        .map(|p| core[p] || (0..n).any(|q| core[q] && dist(p, q) <= eps))
        .collect();

    let (_, in_cluster) = union_dbscan(&input, eps, min_points as u32).unwrap();
    assert_eq!(in_cluster, expected);
}

#[test]
fn dbscan_single_point_noise_vs_min_points_one() {
    let input = geoms(&["POINT (1 1)"]);

    let (mut uf, in_cluster) = union_dbscan(&input, 0.0, 5).unwrap();
    assert_eq!(in_cluster, vec![false]);
    assert_eq!(uf.collapsed_cluster_ids(Some(&in_cluster)), vec![None]);

    let (mut uf, in_cluster) = union_dbscan(&input, 0.0, 1).unwrap();
    assert_eq!(in_cluster, vec![true]);
    assert_eq!(uf.collapsed_cluster_ids(Some(&in_cluster)), vec![Some(0)]);
}

#[test]
fn dbscan_fewer_inputs_than_min_points_is_all_noise() {
    let input = geoms(&[
        "POLYGONM ((-71.1319 42.2503 1, -71.132 42.2502 3, -71.1323 42.2504 -2, -71.1322 42.2505 1, -71.1319 42.2503 0))",
        "POLYGONM ((-71.1319 42.2512 0, -71.1318 42.2511 20, -71.1317 42.2511 -20, -71.1317 42.251 5, -71.1317 42.2509 4, -71.132 42.2511 6, -71.1319 42.2512 30))",
    ]);
    let (_, in_cluster) = union_dbscan(&input, 20.1, 5).unwrap();
    assert_eq!(in_cluster, vec![false, false]);
}

#[test]
fn dbscan_polygons_within_distance() {
    let input = geoms(&[
        "POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))",
        "POLYGON ((2 0, 3 0, 3 1, 2 1, 2 0))",
        "POLYGON ((40 40, 41 40, 41 41, 40 40))",
    ]);
    // The first two squares are 1 apart edge to edge.
    let clusters = cluster_within_distance(&input, 1.5).unwrap();
    assert_eq!(clusters.len(), 2);
    let clusters = cluster_within_distance(&input, 0.5).unwrap();
    assert_eq!(clusters.len(), 3);
}

#[test]
fn member_order_within_cluster_follows_input_order() {
    let input = geoms(&[B, C, A]);
    let clusters = cluster_intersecting(&input).unwrap();
    assert_eq!(clusters.len(), 2);
    // The B/A cluster lists B before A because B came first in the input.
    let first = &clusters[0];
    assert_eq!(first.geoms.len(), 2);
    assert!(first.geoms[0].same(&geoms(&[B])[0]));
    assert!(first.geoms[1].same(&geoms(&[A])[0]));
}
