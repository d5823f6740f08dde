//! # millpath Core
//!
//! Core types, traits, and utilities for millpath.
//! Provides the pixel-space coordinate model shared by the carving engine
//! and the motion compiler, the machine profile types, and the
//! [`MotionSink`] seam between them.

pub mod data;
pub mod error;
pub mod motion;

pub use data::{DriftCompensation, Direction, Point, SpeedProfile};
pub use error::{Error, Result};
pub use motion::{MotionEvent, MotionLog, MotionSink};
