use deepzoom::{DeepZoomError, PyramidDescriptor, SourceFormat, TileRect};

fn descriptor(w: u32, h: u32, tile_size: u32, overlap: u32) -> PyramidDescriptor {
    PyramidDescriptor::new(w, h, tile_size, overlap, SourceFormat::Jpg).expect("valid descriptor")
}

#[test]
fn concrete_512x384_pyramid() {
    let d = descriptor(512, 384, 256, 0);
    assert_eq!(d.num_levels(), 10);
    assert_eq!(d.dimensions(9).unwrap(), (512, 384));
    assert_eq!(d.dimensions(8).unwrap(), (256, 192));
    assert_eq!(d.dimensions(0).unwrap(), (1, 1));
    assert_eq!(d.tile_count(9).unwrap(), (2, 2));
    assert_eq!(d.tile_bounds(9, 0, 0).unwrap(), TileRect { x: 0, y: 0, width: 256, height: 256 });
    let last = d.tile_bounds(9, 1, 1).unwrap();
    assert_eq!((last.x, last.y, last.right(), last.bottom()), (256, 256, 512, 384));
}

#[test]
fn level_count_and_top_dimensions_hold_for_many_sizes() {
    let mut sizes = vec![(1, 1), (1, 7), (3, 2), (255, 256), (257, 3), (1920, 1080), (4095, 4097), (10_000, 3)];
    for k in 1..20 {
        let p = 1u32 << k;
        sizes.push((p - 1, p / 2));
        sizes.push((p, 1));
        sizes.push((5, p + 1));
    }
    for (w, h) in sizes {
        let d = descriptor(w, h, 254, 1);
        let expected = (w.max(h) as f64).log2().floor() as u32 + 1;
        assert_eq!(d.num_levels(), expected, "{}x{}", w, h);
        assert_eq!(d.dimensions(d.num_levels() - 1).unwrap(), (w, h), "{}x{}", w, h);
        let (w0, h0) = d.dimensions(0).unwrap();
        assert!(w0 <= 2 && h0 <= 2 && w0 >= 1 && h0 >= 1, "level 0 of {}x{} is {}x{}", w, h, w0, h0);
    }
}

#[test]
fn each_level_halves_rounding_up() {
    let d = descriptor(1000, 333, 256, 0);
    for level in 1..d.num_levels() {
        let (w, h) = d.dimensions(level).unwrap();
        let (pw, ph) = d.dimensions(level - 1).unwrap();
        assert_eq!((pw, ph), (w.div_ceil(2), h.div_ceil(2)));
    }
}

#[test]
fn scale_is_power_of_two() {
    let d = descriptor(512, 384, 256, 0);
    assert_eq!(d.scale(9).unwrap(), 1.0);
    assert_eq!(d.scale(8).unwrap(), 0.5);
    assert_eq!(d.scale(0).unwrap(), 1.0 / 512.0);
}

#[test]
fn levels_outside_pyramid_are_rejected() {
    let d = descriptor(512, 384, 256, 0);
    assert!(matches!(d.scale(10), Err(DeepZoomError::InvalidLevel { level: 10, num_levels: 10 })));
    assert!(matches!(d.dimensions(11), Err(DeepZoomError::InvalidLevel { .. })));
    assert!(matches!(d.tile_count(42), Err(DeepZoomError::InvalidLevel { .. })));
    assert!(matches!(d.tile_bounds(10, 0, 0), Err(DeepZoomError::InvalidLevel { .. })));
}

#[test]
fn tile_coordinates_outside_level_are_rejected() {
    let d = descriptor(512, 384, 256, 0);
    let err = d.tile_bounds(9, 2, 0).unwrap_err();
    assert!(matches!(
        err,
        DeepZoomError::InvalidTileCoordinate { level: 9, column: 2, row: 0, columns: 2, rows: 2 }
    ));
    assert!(matches!(d.tile_bounds(9, 0, 2), Err(DeepZoomError::InvalidTileCoordinate { .. })));
    assert!(matches!(d.tile_bounds(0, 1, 0), Err(DeepZoomError::InvalidTileCoordinate { .. })));
}

#[test]
fn overlap_only_leads_after_first_row_and_column() {
    let d = descriptor(1024, 1024, 256, 10);
    let top = d.num_levels() - 1;

    let first = d.tile_bounds(top, 0, 0).unwrap();
    assert_eq!(first, TileRect { x: 0, y: 0, width: 266, height: 266 });

    let b = d.tile_bounds(top, 1, 0).unwrap();
    assert_eq!(b.x, 256 - 10);
    assert_eq!(b.y, 0);
    assert_eq!(b.width, 256 + 20);
    assert_eq!(b.height, 256 + 10);

    let last = d.tile_bounds(top, 3, 3).unwrap();
    assert_eq!(last, TileRect { x: 758, y: 758, width: 266, height: 266 });
}

#[test]
fn bounds_are_clipped_at_level_edge() {
    let d = descriptor(600, 300, 256, 3);
    let top = d.num_levels() - 1;
    assert_eq!(d.tile_count(top).unwrap(), (3, 2));
    let b = d.tile_bounds(top, 2, 1).unwrap();
    assert_eq!((b.x, b.y), (509, 253));
    assert_eq!((b.right(), b.bottom()), (600, 300));
}

#[test]
fn tile_cores_partition_every_level() {
    for &(w, h, ts, ov) in &[(512, 384, 256, 0), (1000, 333, 128, 1), (300, 700, 64, 4), (17, 5, 4, 2), (1, 1, 256, 0)] {
        let d = descriptor(w, h, ts, ov);
        for level in 0..d.num_levels() {
            let (lw, lh) = d.dimensions(level).unwrap();
            let (cols, rows) = d.tile_count(level).unwrap();
            let mut coverage = vec![0u8; (lw * lh) as usize];
            for (c, r) in d.tiles(level).unwrap() {
                let b = d.tile_bounds(level, c, r).unwrap();
                assert!(b.width > 0 && b.height > 0);
                assert!(b.right() <= lw && b.bottom() <= lh);

                let lead_x = if c == 0 { 0 } else { ov };
                let lead_y = if r == 0 { 0 } else { ov };
                let core_x = b.x + lead_x;
                let core_y = b.y + lead_y;
                let core_w = (b.width - lead_x).min(ts);
                let core_h = (b.height - lead_y).min(ts);
                assert_eq!((core_x, core_y), (c * ts, r * ts));
                if c + 1 < cols {
                    assert_eq!(b.right(), core_x + ts + ov.min(lw - core_x - ts));
                }
                if r + 1 < rows {
                    assert_eq!(b.bottom(), core_y + ts + ov.min(lh - core_y - ts));
                }

                for y in core_y..core_y + core_h {
                    for x in core_x..core_x + core_w {
                        coverage[(y * lw + x) as usize] += 1;
                    }
                }
            }
            assert!(coverage.iter().all(|&n| n == 1), "level {} of {}x{} not partitioned", level, w, h);
        }
    }
}

#[test]
fn tiles_enumerates_full_grid() {
    let d = descriptor(600, 300, 256, 0);
    let tiles = d.tiles(d.num_levels() - 1).unwrap();
    assert_eq!(tiles.len(), 6);
    assert_eq!(tiles[0], (0, 0));
    assert_eq!(tiles[1], (0, 1));
    assert_eq!(tiles[5], (2, 1));
}

#[test]
fn serializes_to_dzi_xml() {
    let d = PyramidDescriptor::new(512, 384, 254, 1, SourceFormat::Png).unwrap();
    let record = d.serialize();
    assert_eq!(record.format, SourceFormat::Png);
    assert_eq!((record.width, record.height, record.tile_size, record.overlap), (512, 384, 254, 1));
    assert_eq!(
        record.to_xml(),
        r#"<?xml version="1.0" ?><Image Format="png" Overlap="1" TileSize="254" xmlns="http://schemas.microsoft.com/deepzoom/2008"><Size Height="384" Width="512"/></Image>"#
    );
}

#[test]
fn save_writes_descriptor_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("image.dzi");
    let d = descriptor(20, 10, 256, 0);
    d.save(&path).unwrap();
    let xml = std::fs::read_to_string(&path).unwrap();
    assert_eq!(xml, d.serialize().to_xml());
    assert!(xml.contains(r#"Format="jpg""#));
}

#[test]
fn rejects_degenerate_geometry() {
    assert!(matches!(PyramidDescriptor::new(0, 10, 256, 0, SourceFormat::Jpg), Err(DeepZoomError::InvalidConfig(_))));
    assert!(matches!(PyramidDescriptor::new(10, 10, 0, 0, SourceFormat::Jpg), Err(DeepZoomError::InvalidConfig(_))));
}

#[test]
fn overlap_must_be_smaller_than_tile_size() {
    assert!(matches!(PyramidDescriptor::new(17, 5, 4, 4, SourceFormat::Jpg), Err(DeepZoomError::InvalidConfig(_))));
    assert!(matches!(PyramidDescriptor::new(17, 5, 4, 10, SourceFormat::Jpg), Err(DeepZoomError::InvalidConfig(_))));
    assert!(matches!(
        PyramidDescriptor::new(1024, 1024, 256, 3_000_000_000, SourceFormat::Jpg),
        Err(DeepZoomError::InvalidConfig(_))
    ));
}

#[test]
fn largest_overlap_keeps_full_leading_offset() {
    let d = descriptor(17, 5, 4, 3);
    let top = d.num_levels() - 1;
    let b = d.tile_bounds(top, 1, 0).unwrap();
    assert_eq!(b, TileRect { x: 1, y: 0, width: 10, height: 5 });
    let last = d.tile_bounds(top, 4, 1).unwrap();
    assert_eq!(last, TileRect { x: 13, y: 1, width: 4, height: 4 });
}
