//! Round-trip laws: every codec's writer output parses back to a
//! structurally identical geometry, for every variant and dimensionality.

use spatia_wire::{serial, wkb, wkt, Checks, Endian, WkbVariant, WktVariant};

/// A corpus covering every variant, the four dimensionalities, empties,
/// nesting, and negative/fractional ordinates.
fn corpus() -> Vec<spatia_types::Geometry> {
    let texts = [
        "POINT (1 2)",
        "POINT Z (1 2 3)",
        "POINT M (1 2 3)",
        "POINT ZM (1 2 3 4)",
        "POINT EMPTY",
        "POINT Z EMPTY",
        "LINESTRING (0 0, 1 1, 2 0.5)",
        "LINESTRING ZM (0 0 1 2, 1 1 3 4)",
        "LINESTRING EMPTY",
        "CIRCULARSTRING (0 0, 1 1, 2 0)",
        "CIRCULARSTRING EMPTY",
        "COMPOUNDCURVE (CIRCULARSTRING (0 0, 1 1, 2 0), (2 0, 4 0))",
        "COMPOUNDCURVE EMPTY",
        "TRIANGLE ((0 0, 1 0, 0 1, 0 0))",
        "TRIANGLE EMPTY",
        "POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0), (2 2, 4 2, 4 4, 2 2))",
        "POLYGON Z ((0 0 5, 10 0 5, 10 10 5, 0 0 5))",
        "POLYGON EMPTY",
        "CURVEPOLYGON (CIRCULARSTRING (0 0, 4 0, 4 4, 0 4, 0 0), (1 1, 3 3, 3 1, 1 1))",
        "CURVEPOLYGON EMPTY",
        "MULTIPOINT ((0 0), (1.25 -7), EMPTY)",
        "MULTIPOINT M (1 2 3, 4 5 6)",
        "MULTIPOINT EMPTY",
        "MULTILINESTRING ((0 0, 1 1), (2 2, 3 3), EMPTY)",
        "MULTILINESTRING EMPTY",
        "MULTICURVE ((0 0, 1 1), CIRCULARSTRING (0 0, 1 1, 2 0))",
        "MULTICURVE EMPTY",
        "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), EMPTY, ((5 5, 6 5, 6 6, 5 5)))",
        "MULTIPOLYGON EMPTY",
        "MULTISURFACE (CURVEPOLYGON (CIRCULARSTRING (0 0, 4 0, 4 4, 0 4, 0 0)), ((10 10, 14 12, 11 10, 10 10)))",
        "MULTISURFACE EMPTY",
        "POLYHEDRALSURFACE Z (((0 0 0, 0 1 0, 1 1 0, 1 0 0, 0 0 0)), ((0 0 0, 0 0 1, 0 1 1, 0 1 0, 0 0 0)))",
        "POLYHEDRALSURFACE EMPTY",
        "TIN Z (((0 0 0, 0 0 1, 0 1 0, 0 0 0)), ((0 0 0, 0 1 0, 1 1 0, 0 0 0)))",
        "TIN EMPTY",
        "GEOMETRYCOLLECTION (POINT (2 0), POLYGON ((0 0, 1 0, 1 1, 0 0)), GEOMETRYCOLLECTION (LINESTRING (0 0, 1 1)))",
        "GEOMETRYCOLLECTION EMPTY",
    ];
    let mut geoms: Vec<_> = texts
        .iter()
        .map(|t| wkt::parse_wkt(t, Checks::ALL).unwrap_or_else(|e| panic!("{t}: {e}")))
        .collect();

    // SRID-tagged and bbox-carrying copies.
    let mut tagged = wkt::parse_wkt("LINESTRING (0 0, 4 4)", Checks::ALL).unwrap();
    tagged.set_srid(Some(3857));
    tagged.add_bbox();
    geoms.push(tagged);

    let mut fractional =
        wkt::parse_wkt("POINT (0.30000000000000004 -1234567.8912345678)", Checks::NONE).unwrap();
    fractional.set_srid(Some(4326));
    geoms.push(fractional);

    geoms
}

#[test]
fn wkt_roundtrip() {
    for g in corpus() {
        for variant in [WktVariant::Iso, WktVariant::Extended] {
            let text = wkt::write_wkt(&g, variant, 20);
            let back = wkt::parse_wkt(&text, Checks::NONE)
                .unwrap_or_else(|e| panic!("reparse {text:?}: {e}"));
            assert!(back.same(&g), "{text}");
        }
    }
}

#[test]
fn wkt_output_reparses_under_full_checks() {
    for g in corpus() {
        let text = wkt::write_wkt(&g, WktVariant::Iso, 20);
        wkt::parse_wkt(&text, Checks::ALL).unwrap_or_else(|e| panic!("{text:?}: {e}"));
    }
}

#[test]
fn serial_roundtrip() {
    for g in corpus() {
        let bytes = serial::to_bytes(&g);
        let back = serial::from_bytes(&bytes).unwrap();
        assert!(back.same(&g), "{}", wkt::write_wkt(&g, WktVariant::Iso, 20));
        assert_eq!(back.srid(), g.srid());
    }
}

#[test]
fn wkb_roundtrip_both_endians() {
    for g in corpus() {
        for endian in [Endian::Little, Endian::Big] {
            let bytes = wkb::write_wkb(&g, WkbVariant::Extended, endian);
            let back = wkb::read_wkb(&bytes, Checks::NONE).unwrap();
            assert!(back.same(&g), "{}", wkt::write_wkt(&g, WktVariant::Iso, 20));
            assert_eq!(back.srid(), g.srid());
        }
    }
}

#[test]
fn hex_wkb_roundtrip() {
    for g in corpus() {
        let hex = wkb::write_hex_wkb(&g, WkbVariant::Extended, Endian::Little);
        assert!(hex.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_lowercase()));
        let back = wkb::read_hex_wkb(&hex, Checks::NONE).unwrap();
        assert!(back.same(&g));
    }
}

#[test]
fn host_surface_composes() {
    let serialized = spatia_wire::parse_wkt("SRID=31370;POLYGON ((0 0, 4 0, 4 4, 0 0))", Checks::ALL)
        .unwrap();
    let text = spatia_wire::emit_wkt(&serialized, 15).unwrap();
    assert_eq!(text, "SRID=31370;POLYGON((0 0,4 0,4 4,0 0))");

    let ewkb = spatia_wire::emit_wkb(&serialized, Endian::Little).unwrap();
    let reparsed = spatia_wire::parse_wkb(&ewkb, Checks::ALL).unwrap();
    assert_eq!(reparsed, serialized);
}
