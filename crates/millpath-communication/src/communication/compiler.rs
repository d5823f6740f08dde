//! Motion compiler
//!
//! Turns the pixel-level moves of the carving engine into the controller's
//! text commands. Runs of steps in one direction are merged into a single
//! linear move, X is corrected for the machine's depth-dependent drift,
//! and Z changes are broken into small increments with a backlash wiggle
//! on the way down.

use super::buffered::{CommandBuffer, DEFAULT_LINE_BUDGET};
use millpath_core::{DriftCompensation, MotionSink, Point, Result, SpeedProfile};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Machine-specific settings of the compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionParameters {
    pub drift: DriftCompensation,
    /// Speed pair used while Z moves
    pub plunge: SpeedProfile,
    /// Speed pair restored after Z moves
    pub cruise: SpeedProfile,
    /// Largest single Z step
    pub z_increment: i32,
    /// Upward overshoot after each downward Z step; 0 disables it
    pub backlash: i32,
    /// Longest allowed command line in bytes
    pub line_budget: usize,
}

impl Default for MotionParameters {
    fn default() -> Self {
        Self {
            drift: DriftCompensation::default(),
            plunge: SpeedProfile::plunge(),
            cruise: SpeedProfile::cruise(),
            z_increment: 5,
            backlash: 2,
            line_budget: DEFAULT_LINE_BUDGET,
        }
    }
}

/// Position the controller believes it is at, in machine units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MachineState {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl MachineState {
    pub(crate) fn sync_header(&self) -> String {
        format!("x{} y{} z{} c", self.x, self.y, self.z)
    }
}

/// [`MotionSink`] that writes controller commands
pub struct MotionCompiler<W: Write> {
    params: MotionParameters,
    buffer: CommandBuffer<W>,
    /// Last pixel position serialized as a move
    flushed: Point,
    /// End of the pending aggregate; equals `flushed` when nothing is pending
    target: Point,
    depth: i32,
    machine: MachineState,
    moves_emitted: usize,
}

impl<W: Write> MotionCompiler<W> {
    /// Compiler at the rest position, pixel (0, 0) and depth 0
    pub fn new(writer: W, params: MotionParameters) -> Self {
        Self {
            buffer: CommandBuffer::with_budget(writer, params.line_budget),
            params,
            flushed: Point::origin(),
            target: Point::origin(),
            depth: 0,
            machine: MachineState::default(),
            moves_emitted: 0,
        }
    }

    pub fn params(&self) -> &MotionParameters {
        &self.params
    }

    pub fn machine_state(&self) -> MachineState {
        self.machine
    }

    /// XY moves written so far
    pub fn moves_emitted(&self) -> usize {
        self.moves_emitted
    }

    pub fn lines_written(&self) -> usize {
        self.buffer.lines_written()
    }

    /// Emit the pending aggregate and terminate the current line
    pub fn finish(&mut self) -> Result<()> {
        self.flush_pending()?;
        self.buffer.flush()?;
        Ok(())
    }

    /// Finish and give back the writer
    pub fn into_inner(mut self) -> Result<W> {
        self.flush_pending()?;
        Ok(self.buffer.into_inner()?)
    }

    fn push(&mut self, group: &str) -> Result<()> {
        let machine = self.machine;
        self.buffer.push_group(group, || machine.sync_header())?;
        Ok(())
    }

    fn flush_pending(&mut self) -> Result<()> {
        if self.target != self.flushed {
            self.emit_move(self.target)?;
        }
        Ok(())
    }

    /// Serialize a move to `p`, writing only the axes that change
    fn emit_move(&mut self, p: Point) -> Result<()> {
        let mx = self.params.drift.to_machine(p.x, self.depth);
        let my = p.y;
        self.flushed = p;
        self.target = p;
        if mx == self.machine.x && my == self.machine.y {
            return Ok(());
        }

        let mut axes = Vec::with_capacity(3);
        if mx != self.machine.x {
            axes.push(format!("x{}", mx));
        }
        if my != self.machine.y {
            axes.push(format!("y{}", my));
        }
        axes.push("m".to_string());
        self.push(&axes.join(" "))?;

        self.machine.x = mx;
        self.machine.y = my;
        self.moves_emitted += 1;
        Ok(())
    }

    fn emit_z(&mut self, z: i32) -> Result<()> {
        self.push(&format!("z{} m", z))?;
        self.machine.z = z;
        Ok(())
    }

    fn continues_run(&self, p: Point) -> bool {
        let (rx, ry) = (self.target.x - self.flushed.x, self.target.y - self.flushed.y);
        let (sx, sy) = (p.x - self.target.x, p.y - self.target.y);
        let cross = rx as i64 * sy as i64 - ry as i64 * sx as i64;
        let dot = rx as i64 * sx as i64 + ry as i64 * sy as i64;
        cross == 0 && dot > 0
    }
}

impl<W: Write> MotionSink for MotionCompiler<W> {
    fn move_to(&mut self, p: Point) -> Result<()> {
        if p == self.target {
            return Ok(());
        }
        if self.target != self.flushed && !self.continues_run(p) {
            self.emit_move(self.target)?;
        }
        self.target = p;
        Ok(())
    }

    fn move_depth(&mut self, depth: i32) -> Result<()> {
        self.flush_pending()?;
        self.buffer.end_line()?;
        let plunge = self.params.plunge.command();
        self.push(&plunge)?;

        let increment = self.params.z_increment.max(1);
        while self.depth != depth {
            let step = (depth - self.depth).clamp(-increment, increment);
            self.depth += step;
            // Drift depends on depth, so X has to follow every Z step.
            self.emit_move(self.flushed)?;
            self.emit_z(self.depth)?;
            if step > 0 && self.params.backlash > 0 {
                self.emit_z(self.depth - self.params.backlash)?;
                self.emit_z(self.depth)?;
            }
        }

        let cruise = self.params.cruise.command();
        self.push(&cruise)?;
        self.buffer.end_line()?;
        tracing::trace!("Depth {} reached", depth);
        Ok(())
    }

    fn position(&self) -> Point {
        self.target
    }

    fn depth(&self) -> i32 {
        self.depth
    }
}
