//! # millpath Communication
//!
//! Everything between the carving engine and the controller: the motion
//! compiler that turns pixel moves into the controller's line-oriented
//! command language, and a replay parser that reads that language back.

pub mod communication;

pub use communication::{
    CommandBuffer, CommandReplay, MachineState, MotionCompiler, MotionParameters, ReplayEvent,
    DEFAULT_LINE_BUDGET,
};
