//! Raster world model
//!
//! The [`Grid`] holds one [`Cell`] per pixel of the stock plus a border
//! margin of `radius + 1` on every side, so the tool center can circle the
//! whole part without reaching outside the array. Cells are only mutated
//! through grid operations; see the `removal` module for the material
//! removal evaluator that works on top of it.

use crate::error::{CamToolError, CamToolResult};
use crate::geometry::Footprint;
use crate::snapshot::{CellState, GridSnapshot};
use crate::target_mask::TargetMask;
use millpath_core::Point;

/// State of one raster position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    /// Part of the protected shape; never removed
    pub is_target: bool,
    /// Already carved away
    pub is_removed: bool,
    /// The tool center has stood here
    pub is_visited: bool,
    /// Memoized removable volume; `None` when stale
    pub(crate) volume: Option<i32>,
}

impl Cell {
    /// Memoized removable volume, `None` when not computed or invalidated
    pub fn cached_volume(&self) -> Option<i32> {
        self.volume
    }

    /// Stock that is still present
    pub fn is_stock(&self) -> bool {
        !self.is_target && !self.is_removed
    }

    pub(crate) fn state(&self) -> CellState {
        if self.is_target {
            CellState::Target
        } else if self.is_visited {
            CellState::Visited
        } else if self.is_removed {
            CellState::Removed
        } else {
            CellState::Stock
        }
    }
}

/// Stock, target and removal state for one depth level
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    radius: i32,
    pub(crate) cells: Vec<Cell>,
}

impl Grid {
    /// Solid stock with no target material
    pub fn new(width: i32, height: i32, radius: i32) -> CamToolResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(CamToolError::InvalidParameters(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if radius < 1 {
            return Err(CamToolError::InvalidParameters(format!(
                "tool radius must be at least 1, got {}",
                radius
            )));
        }
        Ok(Self {
            width,
            height,
            radius,
            cells: vec![Cell::default(); (width as usize) * (height as usize)],
        })
    }

    /// Grid for a silhouette, surrounded by a `radius + 1` margin of stock
    pub fn from_mask(mask: &TargetMask, radius: i32) -> CamToolResult<Self> {
        let margin = radius + 1;
        let width = mask.width() as i32 + 2 * margin;
        let height = mask.height() as i32 + 2 * margin;
        let mut grid = Self::new(width, height, radius)?;
        for y in 0..mask.height() {
            for x in 0..mask.width() {
                if mask.is_target(x, y) {
                    let p = Point::new(x as i32 + margin, y as i32 + margin);
                    let index = grid.index_unchecked(p);
                    grid.cells[index].is_target = true;
                }
            }
        }
        tracing::debug!(
            "Grid {}x{} (margin {}) with {} target cells",
            width,
            height,
            margin,
            mask.target_count()
        );
        Ok(grid)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Tool radius in cells
    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Border added around a silhouette by [`Grid::from_mask`]
    pub fn margin(&self) -> i32 {
        self.radius + 1
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    pub(crate) fn index(&self, p: Point) -> Option<usize> {
        self.contains(p).then(|| self.index_unchecked(p))
    }

    pub(crate) fn index_unchecked(&self, p: Point) -> usize {
        (p.y as usize) * (self.width as usize) + (p.x as usize)
    }

    pub(crate) fn out_of_bounds(&self, point: Point) -> CamToolError {
        millpath_core::Error::OutOfBounds {
            point,
            width: self.width,
            height: self.height,
        }
        .into()
    }

    /// Cell at `p`, `None` outside the grid
    pub fn cell(&self, p: Point) -> Option<&Cell> {
        self.index(p).map(|i| &self.cells[i])
    }

    /// True when `p` is inside the grid and part of the protected shape
    pub fn is_target(&self, p: Point) -> bool {
        self.cell(p).is_some_and(|c| c.is_target)
    }

    pub fn is_removed(&self, p: Point) -> bool {
        self.cell(p).is_some_and(|c| c.is_removed)
    }

    pub fn is_visited(&self, p: Point) -> bool {
        self.cell(p).is_some_and(|c| c.is_visited)
    }

    /// Mark `p` as protected material
    ///
    /// Fails when the cell has already been carved. Cached volumes of every
    /// center whose footprint covers `p` are invalidated.
    pub fn set_target(&mut self, p: Point) -> CamToolResult<()> {
        let index = self.index(p).ok_or_else(|| self.out_of_bounds(p))?;
        if self.cells[index].is_removed {
            return Err(CamToolError::InvalidParameters(format!(
                "cell {} is already removed",
                p
            )));
        }
        self.cells[index].is_target = true;
        for q in self.footprint_with_radius(p, self.radius) {
            let i = self.index_unchecked(q);
            self.cells[i].volume = None;
        }
        Ok(())
    }

    /// Tool footprint centered at `center`, clipped to the grid
    pub fn footprint(&self, center: Point) -> Footprint {
        self.footprint_with_radius(center, self.radius)
    }

    pub fn footprint_with_radius(&self, center: Point, radius: i32) -> Footprint {
        Footprint::new(center, radius, self.width, self.height)
    }

    /// Every cell with its position, row-major
    pub fn cells(&self) -> impl Iterator<Item = (Point, &Cell)> + '_ {
        let width = self.width as usize;
        self.cells.iter().enumerate().map(move |(i, cell)| {
            (Point::new((i % width) as i32, (i / width) as i32), cell)
        })
    }

    pub fn removed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_removed).count()
    }

    pub fn target_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_target).count()
    }

    /// Cells that are neither target nor removed
    pub fn stock_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_stock()).count()
    }

    /// Read-only copy of the cell states for rendering
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot::new(
            self.width,
            self.height,
            self.cells.iter().map(Cell::state).collect(),
        )
    }
}
