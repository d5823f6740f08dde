//! # millpath CAM tools
//!
//! Material-removal simulation and path planning for 2.5D carving of a
//! raster silhouette.
//!
//! ## Components
//!
//! - **Target mask**: decodes the silhouette image into protected pixels
//! - **Grid**: stock/target/removed state per cell, with a tool-sized margin
//! - **Geometry**: spiral, disk footprint and Bresenham line iterators
//! - **Removal evaluator**: memoized removable volume and material removal
//! - **Walker**: greedy eight-direction carving
//! - **Planner**: nearest carvable cell search with direct and flood-fill routes
//! - **Carver**: per-level state machine driving walker and planner
//! - **Snapshot**: read-only copies of the grid for rendering

pub mod carver;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod planner;
pub mod removal;
pub mod snapshot;
pub mod target_mask;
pub mod walker;

// Re-export commonly used items
pub use carver::{CarveParameters, CarvedLevel, LevelCarver, LevelReport};
pub use error::{CamToolError, CamToolResult};
pub use geometry::{Footprint, Line, RectSpiral, Spiral};
pub use grid::{Cell, Grid};
pub use planner::{step_cost, DistanceField, GlobalPlanner, Route, SearchStats, UNREACHED};
pub use removal::{LineMode, BLOCKED};
pub use snapshot::{CellState, GridSnapshot};
pub use target_mask::TargetMask;
pub use walker::{WalkOutcome, Walker, WalkerParameters};
