//! Depth level carving
//!
//! A level starts with the tool lowered at the grid origin and alternates
//! between the local walker and the global planner until nothing carvable
//! is left, then raises the tool and returns to the origin.
//!
//! ```text
//! Search --Direct/FloodFill--> Carve --> Search
//! Search --Unreachable--> raise, travel, lower --> Carve
//! Search --Unreachable again--> abandon --> Search
//! Search --Exhausted--> Done
//! ```

use crate::error::{CamToolError, CamToolResult};
use crate::grid::Grid;
use crate::planner::{GlobalPlanner, Route};
use crate::target_mask::TargetMask;
use crate::walker::{Walker, WalkerParameters};
use millpath_core::{MotionSink, Point};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarveParameters {
    /// Tool radius in pixels
    pub tool_radius: i32,
    /// Walker score multiplier for N, S, E and W steps
    pub orthogonal_weight: i32,
    /// Walker score multiplier for centers next to target material
    pub target_proximity_factor: i32,
}

impl Default for CarveParameters {
    fn default() -> Self {
        Self {
            tool_radius: 18,
            orthogonal_weight: 2,
            target_proximity_factor: 2,
        }
    }
}

impl CarveParameters {
    pub fn validate(&self) -> CamToolResult<()> {
        if self.tool_radius < 1 {
            return Err(CamToolError::InvalidParameters(format!(
                "tool radius must be at least 1, got {}",
                self.tool_radius
            )));
        }
        if self.orthogonal_weight < 1 {
            return Err(CamToolError::InvalidParameters(format!(
                "orthogonal weight must be at least 1, got {}",
                self.orthogonal_weight
            )));
        }
        if self.target_proximity_factor < 1 {
            return Err(CamToolError::InvalidParameters(format!(
                "target proximity factor must be at least 1, got {}",
                self.target_proximity_factor
            )));
        }
        Ok(())
    }

    fn walker(&self) -> WalkerParameters {
        WalkerParameters {
            orthogonal_weight: self.orthogonal_weight,
            proximity_factor: self.target_proximity_factor,
        }
    }
}

/// What happened on one depth level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelReport {
    pub depth: i32,
    pub walker_steps: usize,
    pub direct_routes: usize,
    pub flood_fill_routes: usize,
    pub flood_fill_searches: usize,
    /// Trips through the rest plane to reach an isolated target
    pub raises: usize,
    pub abandoned: usize,
    pub cells_removed: usize,
    /// Stock cells left when the level finished
    pub remaining_stock: usize,
}

/// A finished level: the final grid and its report
#[derive(Debug, Clone)]
pub struct CarvedLevel {
    pub grid: Grid,
    pub report: LevelReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LevelState {
    Search,
    Carve(Point),
    Done,
}

pub struct LevelCarver {
    params: CarveParameters,
    walker: Walker,
}

impl LevelCarver {
    pub fn new(params: CarveParameters) -> CamToolResult<Self> {
        params.validate()?;
        Ok(Self {
            walker: Walker::new(params.walker()),
            params,
        })
    }

    pub fn params(&self) -> &CarveParameters {
        &self.params
    }

    /// Build the grid for `mask` and carve it at `depth`
    pub fn carve_mask<S: MotionSink>(
        &self,
        mask: &TargetMask,
        sink: &mut S,
        depth: i32,
    ) -> CamToolResult<CarvedLevel> {
        let mut grid = Grid::from_mask(mask, self.params.tool_radius)?;
        let report = self.carve_level(&mut grid, sink, depth)?;
        Ok(CarvedLevel { grid, report })
    }

    /// Carve everything reachable on `grid` at `depth`
    ///
    /// The tool is brought to the grid origin, lowered, and raised back to
    /// the rest plane at the origin when the level is done.
    pub fn carve_level<S: MotionSink>(
        &self,
        grid: &mut Grid,
        sink: &mut S,
        depth: i32,
    ) -> CamToolResult<LevelReport> {
        if grid.radius() != self.params.tool_radius {
            return Err(CamToolError::InvalidParameters(format!(
                "grid radius {} does not match tool radius {}",
                grid.radius(),
                self.params.tool_radius
            )));
        }

        let origin = Point::origin();
        if grid.compute_volume(origin) < 0 {
            return Err(CamToolError::PlanningFailed(format!(
                "tool footprint at {} overlaps target material",
                origin
            )));
        }

        let removed_before = grid.removed_count();
        let mut report = LevelReport {
            depth,
            ..LevelReport::default()
        };
        let mut planner = GlobalPlanner::new();
        let mut retried: HashSet<Point> = HashSet::new();

        if sink.position() != origin {
            sink.move_to(origin)?;
        }
        sink.move_depth(depth)?;
        grid.remove_material(origin)?;

        let mut position = origin;
        let mut state = LevelState::Search;
        while state != LevelState::Done {
            state = match state {
                LevelState::Search => match planner.next_route(grid, sink, position)? {
                    Route::Direct { target } => {
                        report.direct_routes += 1;
                        LevelState::Carve(target)
                    }
                    Route::FloodFill { target, .. } => {
                        report.flood_fill_routes += 1;
                        LevelState::Carve(target)
                    }
                    // A raise lands on a target with stock in its footprint and
                    // carves it, so its volume drops to zero and the spiral scan
                    // never offers it again. Abandoning only fires if a target
                    // keeps its volume after being carved.
                    Route::Unreachable { target } if !retried.insert(target) => {
                        tracing::warn!("Abandoning unreachable target {} at depth {}", target, depth);
                        planner.abandon(target);
                        LevelState::Search
                    }
                    Route::Unreachable { target } => {
                        tracing::debug!("Raising to reach {} at depth {}", target, depth);
                        sink.move_depth(0)?;
                        sink.move_to(target)?;
                        sink.move_depth(depth)?;
                        report.raises += 1;
                        LevelState::Carve(target)
                    }
                    Route::Exhausted => LevelState::Done,
                },
                LevelState::Carve(at) => {
                    grid.remove_material(at)?;
                    let outcome = self.walker.run(grid, sink, at)?;
                    report.walker_steps += outcome.steps;
                    position = outcome.end;
                    LevelState::Search
                }
                LevelState::Done => LevelState::Done,
            };
        }

        sink.move_depth(0)?;
        sink.move_to(origin)?;

        report.flood_fill_searches = planner.flood_fill_searches();
        report.abandoned = planner.abandoned_count();
        report.cells_removed = grid.removed_count() - removed_before;
        report.remaining_stock = grid.stock_count();
        tracing::info!(
            "Level {} done: {} cells removed, {} walker steps, {} direct, {} flood fill, {} raises, {} abandoned, {} stock left",
            depth,
            report.cells_removed,
            report.walker_steps,
            report.direct_routes,
            report.flood_fill_routes,
            report.raises,
            report.abandoned,
            report.remaining_stock
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use millpath_core::{MotionEvent, MotionLog};

    fn small_tool() -> CarveParameters {
        CarveParameters {
            tool_radius: 2,
            ..CarveParameters::default()
        }
    }

    #[test]
    fn test_parameter_validation() {
        assert!(CarveParameters::default().validate().is_ok());
        let bad = CarveParameters {
            tool_radius: 0,
            ..CarveParameters::default()
        };
        assert!(LevelCarver::new(bad).is_err());
        let bad = CarveParameters {
            orthogonal_weight: 0,
            ..CarveParameters::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_radius_mismatch() {
        let carver = LevelCarver::new(small_tool()).unwrap();
        let mut grid = Grid::new(10, 10, 3).unwrap();
        let mut log = MotionLog::new();
        assert!(matches!(
            carver.carve_level(&mut grid, &mut log, 5),
            Err(CamToolError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_start_on_target_fails() {
        let carver = LevelCarver::new(small_tool()).unwrap();
        let mut grid = Grid::new(10, 10, 2).unwrap();
        grid.set_target(Point::new(1, 1)).unwrap();
        let mut log = MotionLog::new();
        assert!(matches!(
            carver.carve_level(&mut grid, &mut log, 5),
            Err(CamToolError::PlanningFailed(_))
        ));
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_level_lowers_first_and_returns_home() {
        let carver = LevelCarver::new(small_tool()).unwrap();
        let mut grid = Grid::new(8, 8, 2).unwrap();
        let mut log = MotionLog::new();
        let report = carver.carve_level(&mut grid, &mut log, 7).unwrap();

        let events = log.events();
        assert_eq!(events.first(), Some(&MotionEvent::Depth(7)));
        assert_eq!(events.last(), Some(&MotionEvent::Move(Point::origin())));
        assert_eq!(events[events.len() - 2], MotionEvent::Depth(0));
        assert_eq!(report.depth, 7);
        assert_eq!(report.remaining_stock, 0);
        assert_eq!(report.cells_removed, 64);
    }

    #[test]
    fn test_isolated_pocket_needs_a_raise() {
        // A closed ring of target with stock inside and outside
        let rows = [
            "...........",
            ".#########.",
            ".#.......#.",
            ".#.......#.",
            ".#.......#.",
            ".#.......#.",
            ".#.......#.",
            ".#.......#.",
            ".#.......#.",
            ".#########.",
            "...........",
        ];
        let mask = TargetMask::from_rows(&rows).unwrap();
        let carver = LevelCarver::new(CarveParameters {
            tool_radius: 1,
            ..CarveParameters::default()
        })
        .unwrap();
        let mut log = MotionLog::new();
        let level = carver.carve_mask(&mask, &mut log, 3).unwrap();

        assert!(level.report.raises >= 1);
        assert_eq!(level.report.abandoned, 0);
        assert_eq!(log.raises(), level.report.raises + 1);
        assert!(level.grid.cells().all(|(_, c)| !(c.is_target && c.is_removed)));
        assert!(level.grid.is_removed(Point::new(7, 7)));

        // Every raise is followed by a move onto its target, which is then
        // carved and never offered again
        let events = log.events();
        let mut raised = Vec::new();
        for pair in events.windows(2) {
            if let [MotionEvent::Depth(0), MotionEvent::Move(target)] = pair {
                raised.push(*target);
            }
        }
        // The last pair is the return to the origin
        raised.pop();
        assert_eq!(raised.len(), level.report.raises);
        for target in &raised {
            assert!(level.grid.is_visited(*target));
            assert_eq!(level.grid.compute_volume(*target), 0);
        }
        let mut unique = raised.clone();
        unique.sort_by_key(|p| (p.x, p.y));
        unique.dedup();
        assert_eq!(unique.len(), raised.len());
    }

    #[test]
    fn test_raised_target_is_not_offered_again() {
        let rows = ["#####", "#...#", "#...#", "#...#", "#####"];
        let mask = TargetMask::from_rows(&rows).unwrap();
        let mut grid = Grid::from_mask(&mask, 1).unwrap();
        let mut planner = GlobalPlanner::new();

        let inside = Point::new(4, 4);
        assert!(grid.removable_volume(inside) > 0);
        grid.remove_material(inside).unwrap();
        assert_eq!(grid.removable_volume(inside), 0);
        assert_ne!(planner.nearest_carvable(&mut grid, inside), Some(inside));
    }
}
