#[allow(dead_code)]
mod common;

use std::path::Path;

use mosaic_core::config::StitchConfig;
use mosaic_core::pipeline::run_pipeline;

/// Two tiles whose volumes share no real overlap (pure noise on both) should
/// still drive the pipeline to completion: the pair aligner may emit a
/// low-score junk pair or none at all, and either way the initial-position
/// estimator's nominal fallback keeps every tile positioned.
#[test]
fn unrelated_tile_content_does_not_crash_the_pipeline() {
    let mut fixture = common::Fixture::new();
    let a = common::crop_tile(&common::world(128, 128), 128, 0, 0, 64, 64, 3, 0.0, 1);
    let b = common::crop_tile(&common::world(128, 128), 128, 64, 64, 64, 64, 3, 0.0, 2);

    let a_path = fixture.add_tile("x_0_y_0_z_0.raw", a);
    let b_path = fixture.add_tile("x_100_y_0_z_0.raw", b);

    let mut cfg = StitchConfig::default();
    cfg.align.overlap = 40;
    cfg.align.max_shift_z = 0;
    cfg.align.max_shift_x = 8;
    cfg.align.z_frame = 1;
    cfg.optimizer.islands = 1;
    cfg.optimizer.n_t_adj = 2;
    cfg.optimizer.evolution_rounds = 2;

    let opener = |p: &Path| fixture.open(p);
    let output = run_pipeline(fixture.dir.path(), &cfg, &opener).unwrap();

    assert_eq!(output.grid.len(), 2);
    for path in [&a_path, &b_path] {
        let idx = output.grid.index_by_name(path).unwrap();
        assert!(output.grid.tile(idx).absolute.is_some());
    }
}

/// A tile whose name doesn't parse still leaves the rest of the directory
/// ingestible; only the unparseable entry is dropped from the grid.
#[test]
fn unparseable_tile_name_is_skipped_not_fatal() {
    let mut fixture = common::Fixture::new();
    let plane = common::world(128, 128);
    fixture.add_tile(
        "x_0_y_0_z_0.raw",
        common::crop_tile(&plane, 128, 0, 0, 64, 64, 3, 0.0, 1),
    );
    fixture.add_tile(
        "x_100_y_0_z_0.raw",
        common::crop_tile(&plane, 128, 0, 40, 64, 64, 3, 0.0, 2),
    );
    std::fs::write(fixture.dir.path().join("notes.txt"), b"not a tile").unwrap();

    let cfg = StitchConfig::default();
    let opener = |p: &Path| fixture.open(p);
    let output = run_pipeline(fixture.dir.path(), &cfg, &opener).unwrap();
    assert_eq!(output.grid.len(), 2);
}
