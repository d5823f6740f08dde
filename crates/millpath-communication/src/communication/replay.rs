//! Command stream replay
//!
//! Reads a command stream back and reconstructs where the tool went, in
//! pixel coordinates. Used to check emitted output without a machine.
//!
//! Tokens are separated by spaces and consist of a letter and an optional
//! signed integer:
//!
//! | token      | meaning                                  |
//! |------------|------------------------------------------|
//! | `x`,`y`,`z`| set the pending axis target              |
//! | `s`, `d`   | speed and delay of the following moves   |
//! | `c`        | take the pending targets as the position |
//! | `m`        | move to the pending targets              |

use super::compiler::MachineState;
use millpath_core::{DriftCompensation, Error, Point, Result, SpeedProfile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayEvent {
    /// Position set without moving
    Sync(MachineState),
    Speed(SpeedProfile),
    Move(MachineState),
}

/// A parsed command stream
#[derive(Debug, Clone)]
pub struct CommandReplay {
    drift: DriftCompensation,
    events: Vec<ReplayEvent>,
    lines: usize,
    max_line_len: usize,
}

impl CommandReplay {
    /// Parse `input`, using `drift` to map machine X back to pixels
    pub fn parse(input: &str, drift: DriftCompensation) -> Result<Self> {
        let mut replay = Self {
            drift,
            events: Vec::new(),
            lines: 0,
            max_line_len: 0,
        };
        let mut current = MachineState::default();
        let mut speed = SpeedProfile::new(0, 0);

        for (number, line) in input.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            replay.lines += 1;
            replay.max_line_len = replay.max_line_len.max(line.len());

            let mut pending = current;
            for token in line.split_whitespace() {
                let (letter, value) = split_token(token)
                    .ok_or_else(|| malformed(number, token))?;
                match (letter, value) {
                    ('x', Some(v)) => pending.x = v,
                    ('y', Some(v)) => pending.y = v,
                    ('z', Some(v)) => pending.z = v,
                    ('s', Some(v)) if v >= 0 => speed.speed = v as u32,
                    ('d', Some(v)) if v >= 0 => {
                        speed.delay = v as u32;
                        replay.events.push(ReplayEvent::Speed(speed));
                    }
                    ('c', None) => {
                        current = pending;
                        replay.events.push(ReplayEvent::Sync(current));
                    }
                    ('m', None) => {
                        current = pending;
                        replay.events.push(ReplayEvent::Move(current));
                    }
                    _ => return Err(malformed(number, token)),
                }
            }
        }

        tracing::debug!(
            "Replayed {} lines, {} events",
            replay.lines,
            replay.events.len()
        );
        Ok(replay)
    }

    pub fn events(&self) -> &[ReplayEvent] {
        &self.events
    }

    /// Non-empty lines in the stream
    pub fn line_count(&self) -> usize {
        self.lines
    }

    /// Length in bytes of the longest line
    pub fn max_line_len(&self) -> usize {
        self.max_line_len
    }

    fn to_pixel(&self, state: &MachineState) -> Point {
        Point::new(self.drift.to_pixel(state.x, state.z), state.y)
    }

    fn state_at(&self, index: usize) -> Option<MachineState> {
        match self.events.get(index)? {
            ReplayEvent::Sync(state) | ReplayEvent::Move(state) => Some(*state),
            ReplayEvent::Speed(_) => None,
        }
    }

    /// Pixel position of the event at `index`
    ///
    /// The compiler corrects X for the new depth just before the Z move
    /// itself, so a position followed by a Z-only move is evaluated at
    /// the depth of that move.
    fn pixel_at(&self, index: usize, state: &MachineState) -> Point {
        let next = (index + 1..self.events.len()).find_map(|i| self.state_at(i));
        match next {
            Some(next) if next.x == state.x && next.y == state.y && next.z != state.z => {
                self.to_pixel(&MachineState { z: next.z, ..*state })
            }
            _ => self.to_pixel(state),
        }
    }

    /// Pixel positions reached by moves, skipping moves that only change
    /// depth or compensate drift
    pub fn positions(&self) -> Vec<Point> {
        let mut positions = Vec::new();
        let mut last = Point::origin();
        let mut previous = MachineState::default();
        for (index, event) in self.events.iter().enumerate() {
            match event {
                ReplayEvent::Sync(state) => {
                    last = self.pixel_at(index, state);
                    previous = *state;
                }
                ReplayEvent::Move(state) => {
                    let z_only = state.x == previous.x && state.y == previous.y;
                    previous = *state;
                    if z_only {
                        continue;
                    }
                    let p = self.pixel_at(index, state);
                    if p != last {
                        positions.push(p);
                        last = p;
                    }
                }
                ReplayEvent::Speed(_) => {}
            }
        }
        positions
    }

    /// XY distance travelled by moves, in machine steps
    ///
    /// Each move counts its longer axis, the time the steppers run for a
    /// linear move. Sync tokens reposition without travel.
    pub fn travel_length(&self) -> u64 {
        let mut previous = MachineState::default();
        let mut length = 0;
        for event in &self.events {
            match event {
                ReplayEvent::Sync(state) => previous = *state,
                ReplayEvent::Move(state) => {
                    let dx = state.x.abs_diff(previous.x);
                    let dy = state.y.abs_diff(previous.y);
                    length += u64::from(dx.max(dy));
                    previous = *state;
                }
                ReplayEvent::Speed(_) => {}
            }
        }
        length
    }

    /// Machine state after the last event
    pub fn final_state(&self) -> MachineState {
        self.events
            .iter()
            .rev()
            .find_map(|event| match event {
                ReplayEvent::Sync(state) | ReplayEvent::Move(state) => Some(*state),
                ReplayEvent::Speed(_) => None,
            })
            .unwrap_or_default()
    }

    /// Pixel position after the last event
    pub fn final_position(&self) -> Point {
        self.to_pixel(&self.final_state())
    }
}

fn split_token(token: &str) -> Option<(char, Option<i32>)> {
    let mut chars = token.chars();
    let letter = chars.next()?;
    let rest = chars.as_str();
    if rest.is_empty() {
        return Some((letter, None));
    }
    rest.parse().ok().map(|v| (letter, Some(v)))
}

fn malformed(line: usize, token: &str) -> Error {
    Error::invalid_input(format!("line {}: unexpected token '{}'", line + 1, token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_line() {
        let replay =
            CommandReplay::parse("x0 y0 z0 c x5 m y3 m\n", DriftCompensation::none()).unwrap();
        assert_eq!(replay.line_count(), 1);
        assert_eq!(replay.events().len(), 3);
        assert_eq!(replay.positions(), vec![Point::new(5, 0), Point::new(5, 3)]);
    }

    #[test]
    fn test_negative_coordinates() {
        let replay =
            CommandReplay::parse("x0 y0 z0 c x-4 y-1 m\n", DriftCompensation::none()).unwrap();
        assert_eq!(replay.final_state().x, -4);
        assert_eq!(replay.positions(), vec![Point::new(-4, -1)]);
    }

    #[test]
    fn test_speed_tokens() {
        let replay = CommandReplay::parse("s8000 d4000\n", DriftCompensation::none()).unwrap();
        assert_eq!(
            replay.events(),
            &[ReplayEvent::Speed(SpeedProfile::plunge())]
        );
    }

    #[test]
    fn test_drift_moves_are_not_positions() {
        let input = "x10 y0 z0 c s8000 d4000 x8 m z5 m z3 m z5 m x6 m z10 m s4000 d3200\n\
                     x6 y0 z10 c s8000 d4000 x8 m z5 m x10 m z0 m s4000 d3200\n";
        let replay = CommandReplay::parse(input, DriftCompensation::default()).unwrap();
        assert!(replay.positions().is_empty());
        assert_eq!(replay.final_position(), Point::new(10, 0));
        assert_eq!(replay.final_state().z, 0);
    }

    #[test]
    fn test_malformed_tokens() {
        let drift = DriftCompensation::none();
        assert!(CommandReplay::parse("x0 y0 z0 c q1 m\n", drift).is_err());
        assert!(CommandReplay::parse("xabc m\n", drift).is_err());
        assert!(CommandReplay::parse("x m\n", drift).is_err());
        assert!(CommandReplay::parse("c5\n", drift).is_err());
        let err = CommandReplay::parse("\nx1 m\nx2 w\n", drift).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_travel_length_counts_longer_axis() {
        let input = "x0 y0 z0 c x5 m y3 m x2 y-1 m z10 m
                     x40 y40 z10 c x38 m
";
        let replay = CommandReplay::parse(input, DriftCompensation::none()).unwrap();
        // 5 + 3 + max(3, 4) + 0, the sync jump is free, then 2
        assert_eq!(replay.travel_length(), 14);
    }

    #[test]
    fn test_empty_stream() {
        let replay = CommandReplay::parse("", DriftCompensation::none()).unwrap();
        assert_eq!(replay.line_count(), 0);
        assert_eq!(replay.final_state(), MachineState::default());
        assert_eq!(replay.travel_length(), 0);
    }
}
