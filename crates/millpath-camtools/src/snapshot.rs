//! Read-only grid snapshots
//!
//! Rendering never touches the live grid: it works on a [`GridSnapshot`]
//! copied out at a point of interest, typically the end of a depth level.

use crate::error::CamToolResult;
use image::{Rgb, RgbImage};
use millpath_core::Point;
use std::path::Path;

/// Collapsed state of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    Stock,
    Target,
    Removed,
    /// Removed, and the tool center passed over it
    Visited,
}

impl CellState {
    /// Colour used when rendering
    pub fn color(self) -> Rgb<u8> {
        match self {
            CellState::Stock => Rgb([0, 0, 0]),
            CellState::Target => Rgb([0, 127, 0]),
            CellState::Removed => Rgb([127, 0, 0]),
            CellState::Visited => Rgb([255, 64, 64]),
        }
    }

    /// Character used by [`GridSnapshot::to_ascii`]
    pub fn symbol(self) -> char {
        match self {
            CellState::Stock => '.',
            CellState::Target => '#',
            CellState::Removed => ' ',
            CellState::Visited => '+',
        }
    }
}

/// Immutable copy of a grid's cell states
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSnapshot {
    width: i32,
    height: i32,
    states: Vec<CellState>,
}

impl GridSnapshot {
    pub(crate) fn new(width: i32, height: i32, states: Vec<CellState>) -> Self {
        Self {
            width,
            height,
            states,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// State at `p`, `None` outside the snapshot
    pub fn state(&self, p: Point) -> Option<CellState> {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return None;
        }
        Some(self.states[(p.y * self.width + p.x) as usize])
    }

    pub fn count(&self, state: CellState) -> usize {
        self.states.iter().filter(|s| **s == state).count()
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            self.states[(y * self.width as u32 + x) as usize].color()
        })
    }

    pub fn save_png(&self, path: &Path) -> CamToolResult<()> {
        self.to_rgb_image()
            .save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// One text line per row, for logs and test failure messages
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.states.len() + self.height as usize);
        for row in self.states.chunks(self.width as usize) {
            out.extend(row.iter().map(|s| s.symbol()));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn test_snapshot_reflects_grid() {
        let mut grid = Grid::new(9, 9, 1).unwrap();
        grid.set_target(Point::new(0, 0)).unwrap();
        grid.remove_material(Point::new(5, 5)).unwrap();
        let snapshot = grid.snapshot();

        assert_eq!(snapshot.state(Point::new(0, 0)), Some(CellState::Target));
        assert_eq!(snapshot.state(Point::new(5, 5)), Some(CellState::Visited));
        assert_eq!(snapshot.state(Point::new(5, 4)), Some(CellState::Removed));
        assert_eq!(snapshot.state(Point::new(8, 8)), Some(CellState::Stock));
        assert_eq!(snapshot.state(Point::new(9, 0)), None);
        assert_eq!(snapshot.count(CellState::Removed), 4);
    }

    #[test]
    fn test_ascii_rendering() {
        let mut grid = Grid::new(3, 2, 1).unwrap();
        grid.set_target(Point::new(2, 1)).unwrap();
        assert_eq!(grid.snapshot().to_ascii(), "...\n..#\n");
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.png");
        let grid = Grid::new(4, 3, 1).unwrap();
        grid.snapshot().save_png(&path).unwrap();

        let image = image::open(&path).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
    }
}
