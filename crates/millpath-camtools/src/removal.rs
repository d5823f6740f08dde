//! Removal evaluator
//!
//! How much stock would the tool take out if its center stood at a given
//! cell, and what happens to the grid when it does. Volumes are memoized
//! per cell; [`Grid::remove_material`] invalidates every cached volume
//! that the removal could have changed.

use crate::error::CamToolResult;
use crate::geometry::{in_radius, Footprint, Line};
use crate::grid::Grid;
use millpath_core::Point;

/// Volume reported for centers whose footprint touches target material,
/// and for centers outside the grid
pub const BLOCKED: i32 = -1;

/// Multiplier applied to the ring score of [`Grid::removable_volume_weighted`]
pub const RING_WEIGHT: i64 = 7;

/// How a traced line treats the cells it crosses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    /// Only check that the tool could travel the line
    Probe,
    /// Remove material at every cell reached
    Carve,
}

impl Grid {
    /// Stock cells inside the footprint at `center`, or [`BLOCKED`]
    ///
    /// The result is cached until a nearby removal invalidates it.
    pub fn removable_volume(&mut self, center: Point) -> i32 {
        let Some(index) = self.index(center) else {
            return BLOCKED;
        };
        if let Some(volume) = self.cells[index].volume {
            return volume;
        }
        let volume = self.compute_volume(center);
        self.cells[index].volume = Some(volume);
        volume
    }

    /// Uncached volume computation over the current grid state
    pub fn compute_volume(&self, center: Point) -> i32 {
        if !self.contains(center) {
            return BLOCKED;
        }
        let mut count = 0;
        for p in self.footprint(center) {
            let cell = &self.cells[self.index_unchecked(p)];
            if cell.is_target {
                return BLOCKED;
            }
            if !cell.is_removed {
                count += 1;
            }
        }
        count
    }

    /// Volume score biased toward the silhouette and away from carved areas
    ///
    /// Looks at the ring one cell wider than the footprint: target material
    /// there multiplies the score by `proximity_factor`, and every removed
    /// cell there divides it further.
    pub fn removable_volume_weighted(&mut self, center: Point, proximity_factor: i32) -> i32 {
        let volume = self.removable_volume(center);
        if volume < 0 {
            return volume;
        }

        let radius = self.radius();
        let mut near_target = false;
        let mut removed_nearby: i64 = 0;
        for p in self.footprint_with_radius(center, radius + 1) {
            if in_radius(p, center, radius) {
                continue;
            }
            let cell = &self.cells[self.index_unchecked(p)];
            near_target |= cell.is_target;
            if cell.is_removed {
                removed_nearby += 1;
            }
        }

        let mut score = RING_WEIGHT * (radius as i64 + 1) * volume as i64;
        if near_target {
            score *= proximity_factor as i64;
        }
        (score / (removed_nearby + 1)).min(i32::MAX as i64) as i32
    }

    /// Carve the tool footprint at `center`
    ///
    /// Marks every stock cell in the footprint removed and the center
    /// visited, and drops the cached volume of every cell within twice the
    /// tool radius. Target cells are never marked. Returns how many cells
    /// were newly removed.
    pub fn remove_material(&mut self, center: Point) -> CamToolResult<usize> {
        let center_index = self.index(center).ok_or_else(|| self.out_of_bounds(center))?;

        // Volumes only shrink and blocked centers stay blocked, so only
        // positive entries can go stale.
        for p in Footprint::new(center, self.radius() * 2, self.width(), self.height()) {
            let index = self.index_unchecked(p);
            let cell = &mut self.cells[index];
            if cell.volume.is_some_and(|v| v > 0) {
                cell.volume = None;
            }
        }

        let mut removed = 0;
        for p in self.footprint(center) {
            let index = self.index_unchecked(p);
            let cell = &mut self.cells[index];
            if cell.is_stock() {
                cell.is_removed = true;
                removed += 1;
            }
        }

        let cell = &mut self.cells[center_index];
        cell.is_visited = true;
        Ok(removed)
    }

    /// Walk the Bresenham line from `from` to `to`
    ///
    /// Stops before the first cell whose footprint would touch target
    /// material (or leave the grid) and returns the last cell reached,
    /// which equals `to` when the whole line is clear. In
    /// [`LineMode::Carve`] material is removed at every reached cell.
    pub fn trace_line(&mut self, from: Point, to: Point, mode: LineMode) -> CamToolResult<Point> {
        let mut reached = from;
        for p in Line::new(from, to) {
            if self.removable_volume(p) < 0 {
                return Ok(reached);
            }
            if mode == LineMode::Carve {
                self.remove_material(p)?;
            }
            reached = p;
        }
        Ok(reached)
    }
}
