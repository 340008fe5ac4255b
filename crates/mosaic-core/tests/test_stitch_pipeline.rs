#[allow(dead_code)]
mod common;

use std::path::Path;

use mosaic_core::config::StitchConfig;
use mosaic_core::pipeline::run_pipeline;

const YSIZE: usize = 80;
const XSIZE: usize = 80;
const OVERLAP: usize = 40;
const NZ: usize = 3;
const WORLD_W: usize = 120;

fn small_cfg() -> StitchConfig {
    let mut cfg = StitchConfig::default();
    cfg.align.overlap = OVERLAP;
    cfg.align.max_shift_z = 0;
    cfg.align.max_shift_x = 8;
    cfg.align.z_frame = 1;
    cfg.optimizer.islands = 2;
    cfg.optimizer.n_t_adj = 4;
    cfg.optimizer.evolution_rounds = 2;
    cfg.optimizer.bound_along_overlap = (30.0, 50.0);
    cfg.optimizer.bound_lateral = (-5.0, 5.0);
    cfg.optimizer.bound_pz = (-1.0, 1.0);
    cfg
}

/// A 2x2 grid of tiles cropped out of one larger noise-free world image, each
/// overlapping its neighbors by exactly `OVERLAP` pixels, should register
/// back to within a pixel or two of the true crop offsets.
#[test]
fn recovers_exact_offsets_on_a_noise_free_2x2_grid() {
    let plane = common::world(WORLD_W, WORLD_W);
    let mut fixture = common::Fixture::new();

    let a = fixture.add_tile(
        "x_0_y_0_z_0.raw",
        common::crop_tile(&plane, WORLD_W, 0, 0, YSIZE, XSIZE, NZ, 0.0, 1),
    );
    let b = fixture.add_tile(
        "x_100_y_0_z_0.raw",
        common::crop_tile(&plane, WORLD_W, 0, OVERLAP, YSIZE, XSIZE, NZ, 0.0, 2),
    );
    let c = fixture.add_tile(
        "x_0_y_100_z_0.raw",
        common::crop_tile(&plane, WORLD_W, OVERLAP, 0, YSIZE, XSIZE, NZ, 0.0, 3),
    );
    let d = fixture.add_tile(
        "x_100_y_100_z_0.raw",
        common::crop_tile(&plane, WORLD_W, OVERLAP, OVERLAP, YSIZE, XSIZE, NZ, 0.0, 4),
    );

    let cfg = small_cfg();
    let opener = |p: &Path| fixture.open(p);
    let output = run_pipeline(fixture.dir.path(), &cfg, &opener).unwrap();

    assert_eq!(output.pairs.len(), 4, "expected both south and east pairs for all four tiles");

    let pos = |path: &std::path::PathBuf| {
        let idx = output.grid.index_by_name(path).unwrap();
        output.grid.tile(idx).absolute.unwrap()
    };
    let (pa, pb, pc, pd) = (pos(&a), pos(&b), pos(&c), pos(&d));

    assert!((pa.xs - 0).abs() <= 2 && (pa.ys - 0).abs() <= 2);
    assert!((pb.xs - OVERLAP as i64).abs() <= 2 && (pb.ys - 0).abs() <= 2);
    assert!((pc.xs - 0).abs() <= 2 && (pc.ys - OVERLAP as i64).abs() <= 2);
    assert!(
        (pd.xs - OVERLAP as i64).abs() <= 2 && (pd.ys - OVERLAP as i64).abs() <= 2,
        "got {:?}",
        pd
    );
}

/// The same grid with mild per-pixel noise on every tile should still
/// register within a small tolerance; NCC is robust to noise this light.
#[test]
fn tolerates_light_gaussian_like_noise() {
    let plane = common::world(WORLD_W, WORLD_W);
    let mut fixture = common::Fixture::new();
    let noise = 5.0;

    let a = fixture.add_tile(
        "x_0_y_0_z_0.raw",
        common::crop_tile(&plane, WORLD_W, 0, 0, YSIZE, XSIZE, NZ, noise, 11),
    );
    let b = fixture.add_tile(
        "x_100_y_0_z_0.raw",
        common::crop_tile(&plane, WORLD_W, 0, OVERLAP, YSIZE, XSIZE, NZ, noise, 22),
    );
    let c = fixture.add_tile(
        "x_0_y_100_z_0.raw",
        common::crop_tile(&plane, WORLD_W, OVERLAP, 0, YSIZE, XSIZE, NZ, noise, 33),
    );
    let d = fixture.add_tile(
        "x_100_y_100_z_0.raw",
        common::crop_tile(&plane, WORLD_W, OVERLAP, OVERLAP, YSIZE, XSIZE, NZ, noise, 44),
    );

    let cfg = small_cfg();
    let opener = |p: &Path| fixture.open(p);
    let output = run_pipeline(fixture.dir.path(), &cfg, &opener).unwrap();

    let pos = |path: &std::path::PathBuf| {
        let idx = output.grid.index_by_name(path).unwrap();
        output.grid.tile(idx).absolute.unwrap()
    };
    let (pa, pb, pc, pd) = (pos(&a), pos(&b), pos(&c), pos(&d));

    assert!((pa.xs - 0).abs() <= 4 && (pa.ys - 0).abs() <= 4);
    assert!((pb.xs - OVERLAP as i64).abs() <= 4);
    assert!((pc.ys - OVERLAP as i64).abs() <= 4);
    assert!((pd.xs - OVERLAP as i64).abs() <= 4 && (pd.ys - OVERLAP as i64).abs() <= 4);
}

/// Descending stage axes (`ascending_tiles_x = false`) must mirror nominal
/// coordinates without changing the set of recovered relative offsets.
#[test]
fn descending_x_axis_still_registers_the_grid() {
    let plane = common::world(WORLD_W, WORLD_W);
    let mut fixture = common::Fixture::new();

    fixture.add_tile(
        "x_0_y_0_z_0.raw",
        common::crop_tile(&plane, WORLD_W, 0, OVERLAP, YSIZE, XSIZE, NZ, 0.0, 1),
    );
    fixture.add_tile(
        "x_100_y_0_z_0.raw",
        common::crop_tile(&plane, WORLD_W, 0, 0, YSIZE, XSIZE, NZ, 0.0, 2),
    );

    let mut cfg = small_cfg();
    cfg.ascending_tiles_x = false;
    let opener = |p: &Path| fixture.open(p);
    let output = run_pipeline(fixture.dir.path(), &cfg, &opener).unwrap();

    assert_eq!(output.grid.len(), 2);
    assert_eq!(output.pairs.len(), 1);
}
