//! Vector paths
//!
//! A minimal path builder used by the background renderers to describe beam
//! curves and border outlines. Paths are plain data; drawing them (and
//! applying a dash/`pathLength` reveal) is the host renderer's job.

use crate::geometry::{Point, Rect};

/// Number of line segments used when flattening one curve command
const CURVE_SEGMENTS: usize = 24;

/// Path command
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    /// Move to a point
    MoveTo(Point),
    /// Line to a point
    LineTo(Point),
    /// Quadratic Bézier curve
    QuadTo { control: Point, end: Point },
    /// Cubic Bézier curve
    CubicTo {
        control1: Point,
        control2: Point,
        end: Point,
    },
    /// Close the current subpath
    Close,
}

/// A vector path built from commands
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    /// Create a new empty path
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Create a path from a vector of commands
    pub fn from_commands(commands: Vec<PathCommand>) -> Self {
        Self { commands }
    }

    /// Move to a point
    pub fn move_to(mut self, x: f32, y: f32) -> Self {
        self.commands.push(PathCommand::MoveTo(Point::new(x, y)));
        self
    }

    /// Line to a point
    pub fn line_to(mut self, x: f32, y: f32) -> Self {
        self.commands.push(PathCommand::LineTo(Point::new(x, y)));
        self
    }

    /// Quadratic Bézier curve
    pub fn quad_to(mut self, cx: f32, cy: f32, x: f32, y: f32) -> Self {
        self.commands.push(PathCommand::QuadTo {
            control: Point::new(cx, cy),
            end: Point::new(x, y),
        });
        self
    }

    /// Cubic Bézier curve
    pub fn cubic_to(mut self, cx1: f32, cy1: f32, cx2: f32, cy2: f32, x: f32, y: f32) -> Self {
        self.commands.push(PathCommand::CubicTo {
            control1: Point::new(cx1, cy1),
            control2: Point::new(cx2, cy2),
            end: Point::new(x, y),
        });
        self
    }

    /// Close the path
    pub fn close(mut self) -> Self {
        self.commands.push(PathCommand::Close);
        self
    }

    /// Closed rectangle outline, clockwise from the top-left corner
    pub fn rect(rect: Rect) -> Self {
        Path::new()
            .move_to(rect.x(), rect.y())
            .line_to(rect.right(), rect.y())
            .line_to(rect.right(), rect.bottom())
            .line_to(rect.x(), rect.bottom())
            .close()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Flatten the path into a polyline (curves are subdivided uniformly)
    pub fn flatten(&self) -> Vec<Point> {
        let mut points = Vec::new();
        let mut current = Point::ZERO;
        let mut subpath_start = Point::ZERO;

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    current = p;
                    subpath_start = p;
                    points.push(p);
                }
                PathCommand::LineTo(p) => {
                    current = p;
                    points.push(p);
                }
                PathCommand::QuadTo { control, end } => {
                    let start = current;
                    for i in 1..=CURVE_SEGMENTS {
                        let t = i as f32 / CURVE_SEGMENTS as f32;
                        points.push(quad_point(start, control, end, t));
                    }
                    current = end;
                }
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                } => {
                    let start = current;
                    for i in 1..=CURVE_SEGMENTS {
                        let t = i as f32 / CURVE_SEGMENTS as f32;
                        points.push(cubic_point(start, control1, control2, end, t));
                    }
                    current = end;
                }
                PathCommand::Close => {
                    points.push(subpath_start);
                    current = subpath_start;
                }
            }
        }

        points
    }

    /// Approximate arc length of the whole path
    pub fn length(&self) -> f32 {
        self.flatten()
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }

    /// Point at a fraction (0.0 to 1.0) of the path's arc length
    ///
    /// Returns `None` for an empty path.
    pub fn point_at(&self, fraction: f32) -> Option<Point> {
        let points = self.flatten();
        let first = *points.first()?;
        let total: f32 = points.windows(2).map(|p| p[0].distance(p[1])).sum();
        if total <= f32::EPSILON {
            return Some(first);
        }

        let mut remaining = fraction.clamp(0.0, 1.0) * total;
        for pair in points.windows(2) {
            let seg = pair[0].distance(pair[1]);
            if remaining <= seg {
                let t = if seg > 0.0 { remaining / seg } else { 0.0 };
                return Some(pair[0].lerp(pair[1], t));
            }
            remaining -= seg;
        }
        points.last().copied()
    }
}

fn quad_point(p0: Point, p1: Point, p2: Point, t: f32) -> Point {
    let mt = 1.0 - t;
    Point::new(
        mt * mt * p0.x + 2.0 * mt * t * p1.x + t * t * p2.x,
        mt * mt * p0.y + 2.0 * mt * t * p1.y + t * t * p2.y,
    )
}

fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}
