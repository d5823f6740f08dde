use millpath_camtools::{
    CarveParameters, CellState, Grid, LevelCarver, TargetMask, Walker, WalkerParameters,
};
use millpath_core::{MotionEvent, MotionLog, Point};

fn carver(tool_radius: i32) -> LevelCarver {
    LevelCarver::new(CarveParameters {
        tool_radius,
        ..CarveParameters::default()
    })
    .unwrap()
}

#[test]
fn test_empty_stock_is_fully_carved() {
    let mask = TargetMask::new(10, 10);
    let mut log = MotionLog::new();
    let level = carver(2).carve_mask(&mask, &mut log, 5).unwrap();

    assert_eq!(level.report.remaining_stock, 0);
    assert_eq!(level.grid.stock_count(), 0);
    assert_eq!(level.report.flood_fill_searches, 0);
    assert_eq!(level.report.flood_fill_routes, 0);
    assert_eq!(level.report.raises, 0);
    assert_eq!(level.report.abandoned, 0);
    assert_eq!(level.report.cells_removed, 16 * 16);
    assert_eq!(level.report.walker_steps, 66);
    // Only the slivers the walker leaves behind need a straight hop
    assert_eq!(level.report.direct_routes, 4);
}

#[test]
fn test_walker_alone_leaves_slivers_on_empty_stock() {
    let mut grid = Grid::from_mask(&TargetMask::new(10, 10), 2).unwrap();
    let mut log = MotionLog::new();
    grid.remove_material(Point::origin()).unwrap();

    let walker = Walker::new(WalkerParameters::default());
    let outcome = walker.run(&mut grid, &mut log, Point::origin()).unwrap();

    assert_eq!(outcome.steps, 66);
    assert_eq!(outcome.end, Point::new(9, 4));
    let left: Vec<Point> = grid
        .cells()
        .filter(|(_, c)| c.is_stock())
        .map(|(p, _)| p)
        .collect();
    assert_eq!(left.len(), 4);
    for p in [
        Point::new(3, 0),
        Point::new(4, 0),
        Point::new(4, 11),
        Point::new(11, 11),
    ] {
        assert!(left.contains(&p), "{} was carved", p);
    }
}

#[test]
fn test_column_is_never_cut() {
    let rows = vec![".....#...."; 10];
    let mask = TargetMask::from_rows(&rows).unwrap();
    let mut log = MotionLog::new();
    let level = carver(2).carve_mask(&mask, &mut log, 5).unwrap();
    let grid = &level.grid;

    assert_eq!(grid.target_count(), 10);
    for (p, cell) in grid.cells() {
        assert!(!(cell.is_target && cell.is_removed), "target cut at {}", p);
    }
    for p in log.moves() {
        assert!(
            grid.compute_volume(p) >= 0,
            "tool footprint at {} overlaps the column",
            p
        );
    }

    // Both sides of the column are carved, the far one through a flood fill
    assert!(grid.is_removed(Point::new(4, 8)));
    assert!(grid.is_removed(Point::new(12, 8)));
    assert!(level.report.flood_fill_searches > 0);
    assert!(level.report.flood_fill_routes > 0);
    assert_eq!(level.report.abandoned, 0);
}

#[test]
fn test_levels_share_one_sink() {
    let mask = TargetMask::from_rows(&["....", ".##.", "...."]).unwrap();
    let carver = carver(1);
    let mut log = MotionLog::new();

    let first = carver.carve_mask(&mask, &mut log, 4).unwrap();
    let second = carver.carve_mask(&mask, &mut log, 8).unwrap();

    assert_eq!(first.report.depth, 4);
    assert_eq!(second.report.depth, 8);
    let depths: Vec<i32> = log
        .events()
        .iter()
        .filter_map(|e| match e {
            MotionEvent::Depth(d) if *d > 0 => Some(*d),
            _ => None,
        })
        .collect();
    assert_eq!(depths.first(), Some(&4));
    assert_eq!(depths.last(), Some(&8));
    assert_eq!(log.events().last(), Some(&MotionEvent::Move(Point::origin())));
}

#[test]
fn test_snapshot_after_level() {
    let mask = TargetMask::from_rows(&["...", ".#.", "..."]).unwrap();
    let mut log = MotionLog::new();
    let level = carver(1).carve_mask(&mask, &mut log, 2).unwrap();
    let snapshot = level.grid.snapshot();

    assert_eq!(snapshot.count(CellState::Target), 1);
    assert_eq!(snapshot.count(CellState::Stock), level.report.remaining_stock);
    assert_eq!(snapshot.state(Point::new(3, 3)), Some(CellState::Target));
}
