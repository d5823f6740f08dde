//! Greedy local carving walker
//!
//! From its current cell the walker looks at the eight neighbours, scores
//! each with the weighted removable volume and steps to the best one,
//! carving as it goes. It stops when no neighbour would remove anything.

use crate::error::CamToolResult;
use crate::grid::Grid;
use millpath_core::{Direction, MotionSink, Point};
use std::cmp::Reverse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkerParameters {
    /// Score multiplier for N, S, E and W steps
    pub orthogonal_weight: i32,
    /// Score multiplier for centers next to target material
    pub proximity_factor: i32,
}

impl Default for WalkerParameters {
    fn default() -> Self {
        Self {
            orthogonal_weight: 2,
            proximity_factor: 2,
        }
    }
}

/// Where a walk ended and how long it was
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOutcome {
    pub end: Point,
    pub steps: usize,
}

pub struct Walker {
    params: WalkerParameters,
}

impl Walker {
    pub fn new(params: WalkerParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &WalkerParameters {
        &self.params
    }

    /// Weighted scores of the eight neighbours of `from`, indexed by
    /// [`Direction::index`]
    pub fn score_neighbours(&self, grid: &mut Grid, from: Point) -> [i32; 8] {
        let mut scores = [0; 8];
        for dir in Direction::ALL {
            let score = grid.removable_volume_weighted(from.step(dir), self.params.proximity_factor);
            scores[dir.index()] = if dir.is_orthogonal() && score > 0 {
                score.saturating_mul(self.params.orthogonal_weight)
            } else {
                score
            };
        }
        scores
    }

    /// Walk from `start` until stuck, emitting one move per step
    pub fn run<S: MotionSink>(
        &self,
        grid: &mut Grid,
        sink: &mut S,
        start: Point,
    ) -> CamToolResult<WalkOutcome> {
        let mut position = start;
        let mut steps = 0;
        while let Some(dir) = best_direction(&self.score_neighbours(grid, position)) {
            position = position.step(dir);
            sink.move_to(position)?;
            grid.remove_material(position)?;
            steps += 1;
        }
        Ok(WalkOutcome {
            end: position,
            steps,
        })
    }
}

/// Highest positive score; equal scores go to the earlier direction
pub fn best_direction(scores: &[i32; 8]) -> Option<Direction> {
    scores
        .iter()
        .enumerate()
        .filter(|(_, score)| **score > 0)
        .max_by_key(|(index, score)| (**score, Reverse(*index)))
        .and_then(|(index, _)| Direction::from_index(index))
}
