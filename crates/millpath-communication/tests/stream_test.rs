use millpath_communication::{
    CommandBuffer, CommandReplay, MachineState, MotionCompiler, MotionParameters,
    DEFAULT_LINE_BUDGET,
};
use millpath_core::{Direction, MotionLog, MotionSink, Point, Result};
use proptest::prelude::*;

/// Forwards every request to two sinks
struct Tee<'a> {
    log: &'a mut MotionLog,
    compiler: &'a mut MotionCompiler<Vec<u8>>,
}

impl MotionSink for Tee<'_> {
    fn move_to(&mut self, target: Point) -> Result<()> {
        self.log.move_to(target)?;
        self.compiler.move_to(target)
    }

    fn move_depth(&mut self, depth: i32) -> Result<()> {
        self.log.move_depth(depth)?;
        self.compiler.move_depth(depth)
    }

    fn position(&self) -> Point {
        self.compiler.position()
    }

    fn depth(&self) -> i32 {
        self.compiler.depth()
    }
}

fn header() -> String {
    "x0 y0 z0 c".to_string()
}

#[test]
fn test_group_filling_budget_stays_on_line() {
    let mut buffer = CommandBuffer::new(Vec::new());
    buffer.push_group(&"a".repeat(100), header).unwrap();
    buffer.push_group(&"b".repeat(100), header).unwrap();
    assert_eq!(buffer.pending_len(), 10 + 1 + 100 + 1 + 100);
    buffer.push_group(&"c".repeat(41), header).unwrap();
    assert_eq!(buffer.pending_len(), DEFAULT_LINE_BUDGET);
    assert_eq!(buffer.lines_written(), 0);
}

#[test]
fn test_group_overflowing_by_one_byte_starts_new_line() {
    let mut buffer = CommandBuffer::new(Vec::new());
    buffer.push_group(&"a".repeat(100), header).unwrap();
    buffer.push_group(&"b".repeat(100), header).unwrap();
    buffer.push_group(&"c".repeat(42), header).unwrap();
    assert_eq!(buffer.lines_written(), 1);

    let out = String::from_utf8(buffer.into_inner().unwrap()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].len(), 212);
    assert_eq!(lines[1], format!("x0 y0 z0 c {}", "c".repeat(42)));
}

#[test]
fn test_lower_and_raise_restore_machine_x() {
    let mut compiler = MotionCompiler::new(Vec::new(), MotionParameters::default());
    compiler.move_to(Point::new(100, 50)).unwrap();
    compiler.move_depth(10).unwrap();
    compiler.move_depth(0).unwrap();
    assert_eq!(
        compiler.machine_state(),
        MachineState {
            x: 100,
            y: 50,
            z: 0
        }
    );
}

#[test]
fn test_long_run_respects_budget() {
    let mut compiler = MotionCompiler::new(Vec::new(), MotionParameters::default());
    for i in 1..400 {
        compiler.move_to(Point::new(i, i % 3)).unwrap();
    }
    compiler.move_depth(25).unwrap();
    compiler.move_to(Point::origin()).unwrap();
    let out = String::from_utf8(compiler.into_inner().unwrap()).unwrap();
    assert!(out.lines().count() > 1);
    for line in out.lines() {
        assert!(line.len() <= DEFAULT_LINE_BUDGET);
        assert!(line.starts_with('x'));
    }
}

/// Every position the replay reports must appear in the requested moves,
/// in order
fn is_subsequence(needle: &[Point], haystack: &[Point]) -> bool {
    let mut rest = haystack.iter();
    needle.iter().all(|p| rest.any(|q| q == p))
}

proptest! {
    #[test]
    fn replay_reproduces_requested_positions(
        steps in prop::collection::vec((0usize..8, 1i32..6), 1..200),
        depths in prop::collection::vec(0i32..40, 0..4),
    ) {
        let mut log = MotionLog::new();
        let mut compiler = MotionCompiler::new(Vec::new(), MotionParameters::default());
        {
            let mut tee = Tee { log: &mut log, compiler: &mut compiler };
            let mut p = Point::new(50, 50);
            tee.move_to(p).unwrap();
            for (i, (dir, len)) in steps.iter().enumerate() {
                let dir = Direction::from_index(*dir).unwrap();
                for _ in 0..*len {
                    p = p.step(dir);
                    tee.move_to(p).unwrap();
                }
                if let Some(depth) = depths.get(i) {
                    tee.move_depth(*depth).unwrap();
                }
            }
            tee.move_depth(0).unwrap();
        }
        let final_position = compiler.position();
        let out = String::from_utf8(compiler.into_inner().unwrap()).unwrap();

        let replay = CommandReplay::parse(&out, MotionParameters::default().drift).unwrap();
        let positions = replay.positions();
        prop_assert!(replay.max_line_len() <= DEFAULT_LINE_BUDGET);
        prop_assert!(is_subsequence(&positions, &log.moves()));
        prop_assert_eq!(positions.last().copied(), Some(final_position));
        prop_assert_eq!(replay.final_state().z, 0);
    }
}
