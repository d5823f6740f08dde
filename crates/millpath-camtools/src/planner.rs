//! Global path planner
//!
//! When the walker gets stuck the planner picks the nearest cell that still
//! has stock to remove and finds a way to get there without the tool
//! footprint ever touching target material. A straight line is tried
//! first. If that is blocked, a flood fill over a [`DistanceField`] finds a
//! route that goes around the silhouette, preferring routes that carve more
//! on the way.

use crate::error::CamToolResult;
use crate::geometry::{Footprint, RectSpiral};
use crate::grid::Grid;
use crate::removal::LineMode;
use millpath_core::{Direction, MotionSink, Point};
use std::collections::HashSet;

/// Distance of a cell the search has not reached
pub const UNREACHED: i32 = 0x1fff_ffff;

#[derive(Debug, Clone, Copy)]
struct Node {
    /// Distance back to the origin when leaving in each direction,
    /// indexed by [`Direction::index`]
    dist: [i32; 8],
    volume: Option<i32>,
}

impl Node {
    fn unreached() -> Self {
        Self {
            dist: [UNREACHED; 8],
            volume: None,
        }
    }
}

/// Cost of one flood fill step for a tool of `radius`
///
/// `4r²`, raised to one more than a full footprint for tiny tools. A stored
/// distance then always exceeds the distance of the cell it points back
/// to, so backtracking cannot cycle.
pub fn step_cost(radius: i32) -> i32 {
    let side = 2 * radius + 1;
    let footprint = Footprint::new(Point::new(radius, radius), radius, side, side).count() as i32;
    (4 * radius * radius).max(footprint + 1)
}

/// Per-search counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Sweeps over the whole grid
    pub passes: usize,
    /// A carvable cell got a finite distance
    pub found: bool,
}

/// Direction-tagged shortest distances from a single origin
///
/// Each cell keeps eight distances, one per direction to leave it in.
/// Stepping in the direction with the smallest distance from any reached
/// cell leads back to the origin. Built fresh for every search.
#[derive(Debug, Clone)]
pub struct DistanceField {
    width: i32,
    height: i32,
    origin: Point,
    nodes: Vec<Node>,
}

impl DistanceField {
    pub fn new(width: i32, height: i32, origin: Point) -> Self {
        let size = (width.max(0) as usize) * (height.max(0) as usize);
        let mut field = Self {
            width,
            height,
            origin,
            nodes: vec![Node::unreached(); size],
        };
        if let Some(index) = field.index(origin) {
            field.nodes[index].dist = [0; 8];
        }
        field
    }

    /// Run the flood fill over `grid` starting at `origin`
    pub fn search(grid: &mut Grid, origin: Point) -> (Self, SearchStats) {
        let mut field = Self::new(grid.width(), grid.height(), origin);
        let cost = step_cost(grid.radius());
        let mut sweep = Sweep {
            best_found: UNREACHED,
            found: false,
            updated: false,
            last_updated: origin,
        };
        let mut stats = SearchStats::default();

        loop {
            let center = field.sweep_center(stats.passes, sweep.last_updated);
            sweep.updated = false;
            for a in RectSpiral::new(center, field.width, field.height) {
                field.relax(grid, a, cost, &mut sweep);
            }
            stats.passes += 1;
            if !sweep.updated || sweep.found {
                break;
            }
        }

        stats.found = sweep.found;
        tracing::debug!(
            "Flood fill from {}: {} passes, found={}",
            origin,
            stats.passes,
            stats.found
        );
        (field, stats)
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    fn index(&self, p: Point) -> Option<usize> {
        (p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height)
            .then(|| (p.y as usize) * (self.width as usize) + (p.x as usize))
    }

    /// Distance of `p` when leaving it towards `dir`
    pub fn distance(&self, p: Point, dir: Direction) -> i32 {
        self.index(p)
            .map_or(UNREACHED, |i| self.nodes[i].dist[dir.index()])
    }

    /// Smallest distance of `p` over all directions
    pub fn best(&self, p: Point) -> i32 {
        self.best_direction(p).map_or(UNREACHED, |(_, d)| d)
    }

    /// Direction with the smallest distance, earliest direction on ties
    pub fn best_direction(&self, p: Point) -> Option<(Direction, i32)> {
        let node = &self.nodes[self.index(p)?];
        Direction::ALL
            .into_iter()
            .map(|dir| (dir, node.dist[dir.index()]))
            .min_by_key(|(dir, d)| (*d, dir.index()))
    }

    pub fn is_reached(&self, p: Point) -> bool {
        self.best(p) < UNREACHED
    }

    fn volume(&mut self, grid: &mut Grid, index: usize, p: Point) -> i32 {
        if let Some(volume) = self.nodes[index].volume {
            return volume;
        }
        let volume = grid.removable_volume(p);
        self.nodes[index].volume = Some(volume);
        volume
    }

    /// Pass 0 sweeps around the origin, passes 1 to 4 around the corners,
    /// the rest around the most recently improved cell.
    fn sweep_center(&self, pass: usize, last_updated: Point) -> Point {
        let (right, bottom) = (self.width - 1, self.height - 1);
        match pass % 8 {
            0 => self.origin,
            1 => Point::new(0, 0),
            2 => Point::new(right, 0),
            3 => Point::new(0, bottom),
            4 => Point::new(right, bottom),
            _ => last_updated,
        }
    }

    /// Offer a path through `a` to each of its neighbours
    fn relax(&mut self, grid: &mut Grid, a: Point, step_cost: i32, sweep: &mut Sweep) {
        let base = self.best(a);
        if base >= UNREACHED {
            return;
        }
        let candidate = base.saturating_add(step_cost);

        for dir in Direction::ALL {
            if candidate >= sweep.best_found {
                return;
            }
            let b = a.step(dir);
            let Some(index) = self.index(b) else {
                continue;
            };
            let volume = self.volume(grid, index, b);
            if volume > 0 && sweep.best_found == UNREACHED {
                sweep.best_found = candidate;
                sweep.found = true;
            }

            let back = dir.opposite().index();
            if volume >= 0 && candidate < self.nodes[index].dist[back] {
                // Cells that carve more look closer.
                self.nodes[index].dist[back] = candidate - volume;
                sweep.updated = true;
                sweep.last_updated = b;
            }
        }
    }

    /// Reached carvable cell with the smallest distance
    ///
    /// Cells are visited in spiral order around the origin, so the nearest
    /// one wins a tie.
    pub fn nearest_reached_carvable(
        &self,
        grid: &mut Grid,
        skip: &HashSet<Point>,
    ) -> Option<Point> {
        let mut best: Option<(Point, i32)> = None;
        for p in RectSpiral::from_ring(self.origin, self.width, self.height, 1) {
            if skip.contains(&p) || grid.removable_volume(p) <= 0 {
                continue;
            }
            let d = self.best(p);
            if d < best.map_or(UNREACHED, |(_, d)| d) {
                best = Some((p, d));
            }
        }
        best.map(|(p, _)| p)
    }

    /// Cells from the origin (excluded) to `target` (included)
    ///
    /// `None` when the smallest-distance directions do not lead back to the
    /// origin.
    pub fn path_to(&self, target: Point) -> Option<Vec<Point>> {
        let limit = self.nodes.len();
        let mut path = Vec::new();
        let mut p = target;
        while p != self.origin {
            if path.len() >= limit {
                return None;
            }
            path.push(p);
            let (dir, d) = self.best_direction(p)?;
            if d >= UNREACHED {
                return None;
            }
            p = p.step(dir);
        }
        path.reverse();
        Some(path)
    }
}

struct Sweep {
    best_found: i32,
    found: bool,
    updated: bool,
    last_updated: Point,
}

/// Result of one planning step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Reached along a straight line
    Direct { target: Point },
    /// Reached by following a flood-fill path
    FloodFill { target: Point, path: Vec<Point> },
    /// Stock remains at `target` but no safe path leads there
    Unreachable { target: Point },
    /// Nothing left to carve on this level
    Exhausted,
}

/// Chooses and travels to the next carvable cell
#[derive(Debug, Default)]
pub struct GlobalPlanner {
    abandoned: HashSet<Point>,
    flood_fill_searches: usize,
}

impl GlobalPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nearest cell with stock to remove, skipping abandoned cells
    pub fn nearest_carvable(&self, grid: &mut Grid, from: Point) -> Option<Point> {
        RectSpiral::new(from, grid.width(), grid.height())
            .find(|p| !self.abandoned.contains(p) && grid.removable_volume(*p) > 0)
    }

    /// Move the tool from `from` to the next carvable cell
    ///
    /// For [`Route::Direct`] and [`Route::FloodFill`] the moves have been
    /// emitted and the material along the way removed. Nothing is emitted
    /// for the other routes.
    pub fn next_route<S: MotionSink>(
        &mut self,
        grid: &mut Grid,
        sink: &mut S,
        from: Point,
    ) -> CamToolResult<Route> {
        let Some(target) = self.nearest_carvable(grid, from) else {
            return Ok(Route::Exhausted);
        };

        if grid.trace_line(from, target, LineMode::Probe)? == target {
            grid.trace_line(from, target, LineMode::Carve)?;
            if target != from {
                sink.move_to(target)?;
            }
            tracing::debug!("Direct route {} -> {}", from, target);
            return Ok(Route::Direct { target });
        }

        self.flood_fill_searches += 1;
        let (field, _) = DistanceField::search(grid, from);
        let Some(reached) = field.nearest_reached_carvable(grid, &self.abandoned) else {
            return Ok(Route::Unreachable { target });
        };
        let Some(path) = field.path_to(reached) else {
            tracing::warn!("Flood fill path to {} does not lead back to {}", reached, from);
            return Ok(Route::Unreachable { target });
        };

        for p in &path {
            sink.move_to(*p)?;
            grid.remove_material(*p)?;
        }
        tracing::debug!(
            "Flood fill route {} -> {} in {} steps",
            from,
            reached,
            path.len()
        );
        Ok(Route::FloodFill {
            target: reached,
            path,
        })
    }

    /// Never plan to `p` again on this level
    pub fn abandon(&mut self, p: Point) {
        self.abandoned.insert(p);
    }

    pub fn is_abandoned(&self, p: Point) -> bool {
        self.abandoned.contains(&p)
    }

    pub fn abandoned_count(&self) -> usize {
        self.abandoned.len()
    }

    pub fn flood_fill_searches(&self) -> usize {
        self.flood_fill_searches
    }
}
