//! Longitude-wrap scenarios: clones, point shifts, line and polygon
//! splits, and recursion through collections.

use spatia::wire::{wkt, Checks, WktVariant};
use spatia::{wrap_x, Geometry, GeometryType};

fn parse(text: &str) -> Geometry {
    wkt::parse_wkt(text, Checks::NONE).unwrap()
}

fn assert_wraps_to(input: &str, cut_x: f64, amount: f64, expected: &str) {
    let wrapped = wrap_x(&parse(input), cut_x, amount).unwrap();
    let expected = parse(expected);
    assert!(
        wrapped.same(&expected),
        "got {}",
        wkt::write_wkt(&wrapped, WktVariant::Extended, 15)
    );
}

#[test]
fn empty_geometry_is_cloned() {
    assert_wraps_to("POLYGON EMPTY", 0.0, 20.0, "POLYGON EMPTY");
}

#[test]
fn zero_amount_is_a_clone() {
    assert_wraps_to("LINESTRING (0 0, 10 0)", 8.0, 0.0, "LINESTRING (0 0, 10 0)");
}

#[test]
fn point_shifts_only_on_the_selected_side() {
    assert_wraps_to("POINT (0 0)", 2.0, 10.0, "POINT (10 0)");
    assert_wraps_to("POINT (0 0)", 0.0, 20.0, "POINT (0 0)");
    assert_wraps_to("POINT (0 0)", 0.0, -20.0, "POINT (0 0)");
    assert_wraps_to("POINT (5 1)", 2.0, -10.0, "POINT (-5 1)");
}

#[test]
fn straddling_line_splits_and_shifts() {
    assert_wraps_to(
        "LINESTRING (0 0, 10 0)",
        8.0,
        -10.0,
        "MULTILINESTRING ((0 0, 8 0), (-2 0, 0 0))",
    );
}

#[test]
fn line_fully_on_one_side_translates_or_stays() {
    assert_wraps_to("LINESTRING (3 0, 5 0)", 8.0, -10.0, "LINESTRING (3 0, 5 0)");
    assert_wraps_to("LINESTRING (9 0, 12 0)", 8.0, -10.0, "LINESTRING (-1 0, 2 0)");
}

#[test]
fn multiline_members_wrap_independently() {
    assert_wraps_to(
        "MULTILINESTRING ((-5 -2, 0 0), (0 0, 10 10))",
        0.0,
        20.0,
        "MULTILINESTRING ((15 -2, 20 0), (0 0, 10 10))",
    );
}

#[test]
fn collection_recurses_per_member() {
    assert_wraps_to(
        "GEOMETRYCOLLECTION (MULTILINESTRING ((-5 -2, 0 0), (0 0, 10 10)), POINT (-5 0), POLYGON EMPTY)",
        0.0,
        20.0,
        "GEOMETRYCOLLECTION (MULTILINESTRING ((15 -2, 20 0), (0 0, 10 10)), POINT (15 0), POLYGON EMPTY)",
    );
}

#[test]
fn straddling_polygon_splits_into_two_parts() {
    let wrapped = wrap_x(
        &parse("POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))"),
        8.0,
        20.0,
    )
    .unwrap();
    // The slab left of x=8 shifts to [20, 28]; the rest stays put, so the
    // result is two disjoint faces.
    let mp = wrapped.as_multi_polygon().expect("disjoint parts");
    assert_eq!(mp.polygons.len(), 2);
    let bbox = wrapped.compute_box2d().unwrap();
    assert_eq!(bbox.xmin, 8.0);
    assert_eq!(bbox.xmax, 28.0);
    assert_eq!((bbox.ymin, bbox.ymax), (0.0, 10.0));
}

#[test]
fn adjoining_pieces_dissolve_back_into_one_polygon() {
    // The shifted piece lands exactly against the kept piece, and the
    // union dissolves the seam.
    let wrapped = wrap_x(
        &parse("POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))"),
        8.0,
        -10.0,
    )
    .unwrap();
    assert_eq!(wrapped.geom_type(), GeometryType::Polygon);
    let bbox = wrapped.compute_box2d().unwrap();
    assert_eq!((bbox.xmin, bbox.xmax), (-2.0, 8.0));
    assert_eq!(wrapped.dimension(), Some(2));
}

#[test]
fn multipolygon_with_holes_wraps_like_the_original() {
    let wrapped = wrap_x(
        &parse(
            "MULTIPOLYGON (\
             ((0 0, 10 0, 10 10, 0 10, 0 0), (2 2, 4 2, 4 4, 2 4, 2 2)),\
             ((0 11, 10 11, 10 21, 0 21, 0 11), (2 13, 4 13, 4 15, 2 15, 2 13)))",
        ),
        2.0,
        20.0,
    )
    .unwrap();
    // Each member splits at x=2, so the typed multi degrades to a
    // collection of two multipolygons.
    let col = wrapped.as_collection().expect("split members");
    assert_eq!(col.geoms.len(), 2);
    for member in &col.geoms {
        let mp = member.as_multi_polygon().expect("two faces per member");
        assert_eq!(mp.polygons.len(), 2);
    }
    let bbox = wrapped.compute_box2d().unwrap();
    assert_eq!((bbox.xmin, bbox.xmax), (2.0, 22.0));
    assert_eq!((bbox.ymin, bbox.ymax), (0.0, 21.0));
}

#[test]
fn curved_input_is_unsupported() {
    let err = wrap_x(&parse("CIRCULARSTRING (0 0, 1 1, 2 0)"), 1.0, 5.0).unwrap_err();
    assert!(err.to_string().contains("CircularString"));
}

#[test]
fn srid_is_preserved_through_the_split() {
    let mut g = parse("LINESTRING (0 0, 10 0)");
    g.set_srid(Some(4326));
    let wrapped = wrap_x(&g, 8.0, -10.0).unwrap();
    assert_eq!(wrapped.srid(), Some(4326));
}
