//! Motion sink abstraction
//!
//! The carving engine produces pixel-level tool moves; something else turns
//! them into machine commands. [`MotionSink`] is the seam between the two.

use crate::data::Point;
use crate::error::Result;

/// Consumer of pixel-level tool motion
pub trait MotionSink {
    /// Move the tool center to `target` at the current depth
    fn move_to(&mut self, target: Point) -> Result<()>;

    /// Move the tool to `depth`; 0 is the rest plane, larger is deeper
    fn move_depth(&mut self, depth: i32) -> Result<()>;

    /// Last requested XY position
    fn position(&self) -> Point;

    /// Current depth
    fn depth(&self) -> i32;
}

/// A single recorded motion request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEvent {
    Move(Point),
    Depth(i32),
}

/// In-memory sink that records every request
///
/// Useful for dry runs and for checking planner output without
/// serializing commands.
#[derive(Debug, Clone, Default)]
pub struct MotionLog {
    events: Vec<MotionEvent>,
    position: Point,
    depth: i32,
}

impl MotionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event in the order it was requested
    pub fn events(&self) -> &[MotionEvent] {
        &self.events
    }

    /// Only the XY targets, in order
    pub fn moves(&self) -> Vec<Point> {
        self.events
            .iter()
            .filter_map(|event| match event {
                MotionEvent::Move(p) => Some(*p),
                MotionEvent::Depth(_) => None,
            })
            .collect()
    }

    /// Number of depth changes that returned to the rest plane
    pub fn raises(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, MotionEvent::Depth(0)))
            .count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl MotionSink for MotionLog {
    fn move_to(&mut self, target: Point) -> Result<()> {
        self.events.push(MotionEvent::Move(target));
        self.position = target;
        Ok(())
    }

    fn move_depth(&mut self, depth: i32) -> Result<()> {
        self.events.push(MotionEvent::Depth(depth));
        self.depth = depth;
        Ok(())
    }

    fn position(&self) -> Point {
        self.position
    }

    fn depth(&self) -> i32 {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_log_records_in_order() {
        let mut log = MotionLog::new();
        log.move_depth(10).unwrap();
        log.move_to(Point::new(1, 2)).unwrap();
        log.move_to(Point::new(3, 2)).unwrap();
        log.move_depth(0).unwrap();

        assert_eq!(log.moves(), vec![Point::new(1, 2), Point::new(3, 2)]);
        assert_eq!(log.raises(), 1);
        assert_eq!(log.position(), Point::new(3, 2));
        assert_eq!(log.depth(), 0);
        assert_eq!(log.events().len(), 4);
    }
}
