//! Machine profiles
//!
//! Numbers that describe one particular stepper-driven mill rather than
//! the part being carved: the empirically tuned X skew per unit of depth
//! and the speed settings the controller expects for plunging and cruising.

use serde::{Deserialize, Serialize};

/// Linear X drift per unit of depth, as a rational coefficient
///
/// The reference machine drifts 48 X-steps per millimetre of Z travel,
/// which in pixel units is 41856 / 100000 per depth unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftCompensation {
    pub numerator: i64,
    pub denominator: i64,
}

impl DriftCompensation {
    /// Create a compensation coefficient
    pub const fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// No compensation at all
    pub const fn none() -> Self {
        Self::new(0, 1)
    }

    /// X correction at `depth`, truncated toward zero
    pub fn offset(&self, depth: i32) -> i32 {
        if self.denominator == 0 {
            return 0;
        }
        (self.numerator * depth as i64 / self.denominator) as i32
    }

    /// Machine X for pixel X at `depth`
    pub fn to_machine(&self, x: i32, depth: i32) -> i32 {
        x - self.offset(depth)
    }

    /// Pixel X for machine X at `depth`
    pub fn to_pixel(&self, machine_x: i32, depth: i32) -> i32 {
        machine_x + self.offset(depth)
    }
}

impl Default for DriftCompensation {
    fn default() -> Self {
        Self::new(41856, 100000)
    }
}

/// Controller speed pair, serialized as `s<speed> d<delay>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedProfile {
    /// Value of the `s` token
    pub speed: u32,
    /// Value of the `d` token
    pub delay: u32,
}

impl SpeedProfile {
    pub const fn new(speed: u32, delay: u32) -> Self {
        Self { speed, delay }
    }

    /// Slow profile for the Z axis, whose motor must move slowly
    pub const fn plunge() -> Self {
        Self::new(8000, 4000)
    }

    /// Normal XY milling profile
    pub const fn cruise() -> Self {
        Self::new(4000, 3200)
    }

    /// The command group for this profile
    pub fn command(&self) -> String {
        format!("s{} d{}", self.speed, self.delay)
    }
}
