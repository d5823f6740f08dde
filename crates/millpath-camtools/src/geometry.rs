//! Raster geometry primitives
//!
//! Lazy integer iterators used by every grid operation:
//! - [`Spiral`]: concentric square rings around a center, nearest first
//! - [`RectSpiral`]: the same rings clipped to a rectangle, finite
//! - [`Footprint`]: every point of a disk, row by row, clipped to a rectangle
//! - [`Line`]: Bresenham rasterization between two pixels, endpoints included
//!
//! None of them borrow the grid, so callers can mutate cells while iterating.

use millpath_core::Point;

/// Square rings of increasing radius around a center
///
/// Ring `a` visits its perimeter clockwise starting at the top-left corner:
///
/// ```text
///     9 ....
///       1 2 3
///       8   4
///       7 6 5
/// ```
///
/// Ring 0 is the center itself. The sequence is infinite; see
/// [`RectSpiral`] for the bounded variant.
#[derive(Debug, Clone)]
pub struct Spiral {
    center: Point,
    start_ring: i32,
    current: Point,
    ring: i32,
    started: bool,
}

impl Spiral {
    /// Spiral starting at the center
    pub fn new(center: Point) -> Self {
        Self::from_ring(center, 0)
    }

    /// Spiral starting at the top-left corner of `ring`
    pub fn from_ring(center: Point, ring: i32) -> Self {
        let ring = ring.max(0);
        Self {
            center,
            start_ring: ring,
            current: center.offset(-ring, -ring),
            ring,
            started: false,
        }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    /// Ring of the most recently yielded point
    pub fn ring(&self) -> i32 {
        self.ring
    }

    /// Rewind to the first point
    pub fn restart(&mut self) {
        *self = Self::from_ring(self.center, self.start_ring);
    }

    fn advance(&mut self) {
        let (cx, cy) = (self.center.x, self.center.y);
        let a = self.ring;
        let Point { x, y } = self.current;

        self.current = if a == 0 {
            self.ring = 1;
            Point::new(cx - 1, cy - 1)
        } else if y == cy - a && x < cx + a {
            Point::new(x + 1, y)
        } else if x == cx + a && y < cy + a {
            Point::new(x, y + 1)
        } else if y == cy + a && x > cx - a {
            Point::new(x - 1, y)
        } else if x == cx - a && y > cy - a + 1 {
            Point::new(x, y - 1)
        } else {
            self.ring += 1;
            Point::new(cx - a - 1, cy - a - 1)
        };
    }
}

impl Iterator for Spiral {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.started {
            self.advance();
        } else {
            self.started = true;
        }
        Some(self.current)
    }
}

/// [`Spiral`] restricted to `[0, width) x [0, height)`
///
/// Ends once the ring exceeds `width + height`, by which point every cell
/// of the rectangle has been produced exactly once.
#[derive(Debug, Clone)]
pub struct RectSpiral {
    spiral: Spiral,
    width: i32,
    height: i32,
    finished: bool,
}

impl RectSpiral {
    pub fn new(center: Point, width: i32, height: i32) -> Self {
        Self::from_ring(center, width, height, 0)
    }

    pub fn from_ring(center: Point, width: i32, height: i32, ring: i32) -> Self {
        Self {
            spiral: Spiral::from_ring(center, ring),
            width,
            height,
            finished: width <= 0 || height <= 0,
        }
    }

    /// Ring of the most recently yielded point
    pub fn ring(&self) -> i32 {
        self.spiral.ring()
    }

    pub fn restart(&mut self) {
        self.spiral.restart();
        self.finished = self.width <= 0 || self.height <= 0;
    }
}

impl Iterator for RectSpiral {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.finished {
            return None;
        }
        loop {
            let p = self.spiral.next()?;
            if self.spiral.ring() > self.width + self.height {
                self.finished = true;
                return None;
            }
            if in_rect(p, self.width, self.height) {
                return Some(p);
            }
        }
    }
}

/// True when `p` lies in `[0, width) x [0, height)`
pub fn in_rect(p: Point, width: i32, height: i32) -> bool {
    p.x >= 0 && p.y >= 0 && p.x < width && p.y < height
}

/// True when `p` is within Euclidean distance `radius` of `center`
pub fn in_radius(p: Point, center: Point, radius: i32) -> bool {
    let r = radius as i64;
    p.distance_squared(center) <= r * r
}

/// Integer points of a disk, row by row, clipped to a rectangle
#[derive(Debug, Clone)]
pub struct Footprint {
    center: Point,
    radius: i32,
    x_min: i32,
    x_max: i32,
    y_max: i32,
    x: i32,
    y: i32,
}

impl Footprint {
    pub fn new(center: Point, radius: i32, width: i32, height: i32) -> Self {
        let x_min = (center.x - radius).max(0);
        let x_max = (center.x + radius).min(width - 1);
        let y_min = (center.y - radius).max(0);
        let y_max = (center.y + radius).min(height - 1);
        Self {
            center,
            radius,
            x_min,
            x_max,
            // an empty row range when the radius is negative
            y_max: if radius < 0 { y_min - 1 } else { y_max },
            x: x_min,
            y: y_min,
        }
    }
}

impl Iterator for Footprint {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        while self.y <= self.y_max {
            while self.x <= self.x_max {
                let p = Point::new(self.x, self.y);
                self.x += 1;
                if in_radius(p, self.center, self.radius) {
                    return Some(p);
                }
            }
            self.y += 1;
            self.x = self.x_min;
        }
        None
    }
}

/// Bresenham line from `from` to `to`, both endpoints included
#[derive(Debug, Clone)]
pub struct Line {
    current: Point,
    target: Point,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl Line {
    pub fn new(from: Point, to: Point) -> Self {
        let dx = (to.x - from.x).abs();
        let dy = (to.y - from.y).abs();
        Self {
            current: from,
            target: to,
            dx,
            dy,
            sx: if from.x < to.x { 1 } else { -1 },
            sy: if from.y < to.y { 1 } else { -1 },
            err: dx - dy,
            done: false,
        }
    }
}

impl Iterator for Line {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.done {
            return None;
        }
        let p = self.current;
        if p == self.target {
            self.done = true;
            return Some(p);
        }
        let e2 = 2 * self.err;
        if e2 > -self.dy {
            self.err -= self.dy;
            self.current.x += self.sx;
        }
        if e2 < self.dx {
            self.err += self.dx;
            self.current.y += self.sy;
        }
        Some(p)
    }
}
