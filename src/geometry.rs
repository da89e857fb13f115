//! Geometric transforms shared by the footprint and symbol pipelines.
//!
//! EasyEDA geometry arrives in mils in the editor's device coordinate space.
//! Everything here converts into millimetres and solves the one genuinely
//! tricky problem of the source format: arcs are given in SVG endpoint
//! parameterization (start, end, radii, rotation, large-arc and sweep flags)
//! and have to be re-derived into center form before KiCad can use them.

use crate::easyeda::error::{ConvertError, ConvertResult};

/// Mils per millimetre as used by the EasyEDA editor (1 raw unit = 1/3.937 mm).
pub const MILS_PER_MM: f64 = 3.937;

/// Converts a raw EasyEDA value (mils) to millimetres.
#[must_use]
pub fn mil_to_mm(value: f64) -> f64 {
    value / MILS_PER_MM
}

/// Converts millimetres back to raw EasyEDA mils.
#[must_use]
pub fn mm_to_mil(value: f64) -> f64 {
    value * MILS_PER_MM
}

/// A 2-D point or vector in whatever unit the context implies.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this point translated by `(dx, dy)`.
    #[must_use]
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Converts both coordinates from mils to millimetres.
    #[must_use]
    pub fn mil_to_mm(self) -> Self {
        Self::new(mil_to_mm(self.x), mil_to_mm(self.y))
    }
}

/// An elliptical arc in center form, derived from endpoint parameterization.
///
/// Angles are in radians in the ellipse's local (pre-rotation) frame.
/// `sweep_angle` is signed: positive sweeps match a set sweep flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipticalArc {
    /// Ellipse center.
    pub center: Point,
    /// Semi-major radius along the local X axis (possibly corrected upward).
    pub rx: f64,
    /// Semi-minor radius along the local Y axis.
    pub ry: f64,
    /// X-axis rotation in degrees.
    pub x_rotation: f64,
    /// Angle of the start point, radians.
    pub start_angle: f64,
    /// Signed swept angle, radians.
    pub sweep_angle: f64,
}

impl EllipticalArc {
    /// Solves the SVG endpoint parameterization for the ellipse center.
    ///
    /// The standard sign rule applies: the center discriminant is taken
    /// negative when the large-arc flag equals the sweep flag. A negative
    /// discriminant is clamped to zero (the radii were infeasible and have
    /// been scaled up, forcing the large-arc branch). A zero denominator is
    /// a degenerate arc and yields a geometry error.
    ///
    /// When `start == end` the arc is a full circle whose center sits at
    /// distance `rx` from the start point, to the right for a set sweep
    /// flag and to the left otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Geometry`] when the radii are zero or the
    /// center equation degenerates.
    pub fn from_endpoints(
        start: Point,
        end: Point,
        rx: f64,
        ry: f64,
        x_rotation: f64,
        large_arc: bool,
        sweep: bool,
    ) -> ConvertResult<Self> {
        if rx == 0.0 || ry == 0.0 {
            return Err(ConvertError::geometry("arc with zero radius"));
        }
        let (mut rx, mut ry) = (rx.abs(), ry.abs());

        if start == end {
            // Full circle: offset the center sideways from the coincident
            // endpoints according to the winding direction.
            // The start angle must land back on the coincident endpoints,
            // which sit on opposite sides of the center per direction.
            let offset = if sweep { rx } else { -rx };
            return Ok(Self {
                center: Point::new(start.x + offset, start.y),
                rx,
                ry,
                x_rotation,
                start_angle: if sweep { std::f64::consts::PI } else { 0.0 },
                sweep_angle: if sweep {
                    2.0 * std::f64::consts::PI
                } else {
                    -2.0 * std::f64::consts::PI
                },
            });
        }

        let (sin_rot, cos_rot) = x_rotation.to_radians().sin_cos();

        // Step 1: half-difference of the endpoints, rotated into the
        // ellipse's local frame.
        let dx = (start.x - end.x) / 2.0;
        let dy = (start.y - end.y) / 2.0;
        let x1p = cos_rot * dx + sin_rot * dy;
        let y1p = -sin_rot * dx + cos_rot * dy;

        // Step 2: correct infeasible radii by scaling both up uniformly.
        // Once corrected, exactly one arc exists and it is the large one.
        let mut large_arc = large_arc;
        let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if lambda > 1.0 {
            let scale = lambda.sqrt();
            rx *= scale;
            ry *= scale;
            large_arc = true;
        }

        let rx_sq = rx * rx;
        let ry_sq = ry * ry;
        let x1p_sq = x1p * x1p;
        let y1p_sq = y1p * y1p;

        let denominator = rx_sq * y1p_sq + ry_sq * x1p_sq;
        if denominator == 0.0 {
            return Err(ConvertError::geometry(
                "degenerate arc: center equation has zero denominator",
            ));
        }

        let sign = if large_arc == sweep { -1.0 } else { 1.0 };
        let discriminant = ((rx_sq * ry_sq - rx_sq * y1p_sq - ry_sq * x1p_sq) / denominator).max(0.0);
        let coef = sign * discriminant.sqrt();

        let cxp = coef * rx * y1p / ry;
        let cyp = -coef * ry * x1p / rx;

        // Step 3: rotate the local center back into the global frame.
        let cx = cos_rot * cxp - sin_rot * cyp + (start.x + end.x) / 2.0;
        let cy = sin_rot * cxp + cos_rot * cyp + (start.y + end.y) / 2.0;

        // Step 4: signed angles of the center→start and center→end vectors.
        let start_angle = angle_between(1.0, 0.0, (x1p - cxp) / rx, (y1p - cyp) / ry);
        let mut sweep_angle = angle_between(
            (x1p - cxp) / rx,
            (y1p - cyp) / ry,
            (-x1p - cxp) / rx,
            (-y1p - cyp) / ry,
        );

        // Flip the swept direction so it matches the requested winding.
        if !sweep && sweep_angle > 0.0 {
            sweep_angle -= 2.0 * std::f64::consts::PI;
        } else if sweep && sweep_angle < 0.0 {
            sweep_angle += 2.0 * std::f64::consts::PI;
        }

        Ok(Self {
            center: Point::new(cx, cy),
            rx,
            ry,
            x_rotation,
            start_angle,
            sweep_angle,
        })
    }

    /// Evaluates the arc at a local-frame angle (radians).
    #[must_use]
    pub fn point_at(&self, theta: f64) -> Point {
        let (sin_rot, cos_rot) = self.x_rotation.to_radians().sin_cos();
        let (sin_t, cos_t) = theta.sin_cos();
        Point::new(
            self.center.x + self.rx * cos_t * cos_rot - self.ry * sin_t * sin_rot,
            self.center.y + self.rx * cos_t * sin_rot + self.ry * sin_t * cos_rot,
        )
    }

    /// Returns the arc's start point.
    #[must_use]
    pub fn start_point(&self) -> Point {
        self.point_at(self.start_angle)
    }

    /// Returns the arc's end point.
    #[must_use]
    pub fn end_point(&self) -> Point {
        self.point_at(self.start_angle + self.sweep_angle)
    }

    /// Returns the point halfway along the swept angle.
    #[must_use]
    pub fn midpoint(&self) -> Point {
        self.point_at(self.start_angle + self.sweep_angle / 2.0)
    }

    /// Samples the arc into a point list, excluding the start point.
    ///
    /// The segment count grows with the swept angle, one segment per 10
    /// degrees, never below 8.
    #[must_use]
    pub fn sample(&self) -> Vec<Point> {
        let degrees = self.sweep_angle.to_degrees().abs();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let segments = ((degrees / 10.0).ceil() as usize).max(8);

        #[allow(clippy::cast_precision_loss)]
        (1..=segments)
            .map(|i| {
                let t = i as f64 / segments as f64;
                self.point_at(self.start_angle + self.sweep_angle * t)
            })
            .collect()
    }
}

/// Signed angle between vectors `(ux, uy)` and `(vx, vy)`, radians.
fn angle_between(ux: f64, uy: f64, vx: f64, vy: f64) -> f64 {
    let n = (ux * ux + uy * uy).sqrt() * (vx * vx + vy * vy).sqrt();
    let cos = ((ux * vx + uy * vy) / n).clamp(-1.0, 1.0);
    let angle = cos.acos();
    if ux * vy - uy * vx < 0.0 {
        -angle
    } else {
        angle
    }
}

/// One command of an SVG-like outline path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    /// Move to an absolute point.
    MoveTo(Point),
    /// Line to an absolute point.
    LineTo(Point),
    /// Elliptical arc to an absolute end point.
    Arc {
        /// Semi-major radius.
        rx: f64,
        /// Semi-minor radius.
        ry: f64,
        /// X-axis rotation in degrees.
        x_rotation: f64,
        /// Large-arc flag.
        large_arc: bool,
        /// Sweep flag.
        sweep: bool,
        /// Arc end point.
        end: Point,
    },
    /// Close the path (a no-op for implicitly closed polygons).
    Close,
}

/// Tokenizes an SVG-like path consisting of `M`, `L`, `A` and `Z` commands.
///
/// Coordinates may be separated by spaces or commas, and a command letter
/// may repeat its arguments (`L x1 y1 x2 y2`). Any other command letter is
/// rejected rather than silently producing wrong geometry.
///
/// # Errors
///
/// Returns [`ConvertError::Geometry`] on unsupported commands or malformed
/// numbers.
pub fn parse_path(path: &str) -> ConvertResult<Vec<PathCommand>> {
    let mut commands = Vec::new();
    let mut numbers: Vec<f64> = Vec::new();
    let mut current = None;

    let flush = |commands: &mut Vec<PathCommand>,
                 numbers: &mut Vec<f64>,
                 command: Option<char>|
     -> ConvertResult<()> {
        let Some(command) = command else {
            if numbers.is_empty() {
                return Ok(());
            }
            return Err(ConvertError::geometry("path data before any command"));
        };
        match command {
            'M' | 'L' => {
                if numbers.is_empty() || numbers.len() % 2 != 0 {
                    return Err(ConvertError::geometry(format!(
                        "path command '{command}' expects coordinate pairs, got {} values",
                        numbers.len()
                    )));
                }
                for pair in numbers.chunks_exact(2) {
                    let point = Point::new(pair[0], pair[1]);
                    if command == 'M' && commands.is_empty() {
                        commands.push(PathCommand::MoveTo(point));
                    } else {
                        commands.push(PathCommand::LineTo(point));
                    }
                }
            }
            'A' => {
                if numbers.is_empty() || numbers.len() % 7 != 0 {
                    return Err(ConvertError::geometry(format!(
                        "path command 'A' expects 7 values, got {}",
                        numbers.len()
                    )));
                }
                for args in numbers.chunks_exact(7) {
                    commands.push(PathCommand::Arc {
                        rx: args[0],
                        ry: args[1],
                        x_rotation: args[2],
                        large_arc: args[3] != 0.0,
                        sweep: args[4] != 0.0,
                        end: Point::new(args[5], args[6]),
                    });
                }
            }
            'Z' => {
                if !numbers.is_empty() {
                    return Err(ConvertError::geometry("path command 'Z' takes no values"));
                }
                commands.push(PathCommand::Close);
            }
            other => {
                return Err(ConvertError::geometry(format!(
                    "unsupported path command '{other}'"
                )));
            }
        }
        numbers.clear();
        Ok(())
    };

    let mut token = String::new();
    for ch in path.chars() {
        if ch.is_ascii_alphabetic() {
            if !token.is_empty() {
                numbers.push(parse_number(&token)?);
                token.clear();
            }
            flush(&mut commands, &mut numbers, current)?;
            current = Some(ch.to_ascii_uppercase());
        } else if ch.is_whitespace() || ch == ',' {
            if !token.is_empty() {
                numbers.push(parse_number(&token)?);
                token.clear();
            }
        } else {
            token.push(ch);
        }
    }
    if !token.is_empty() {
        numbers.push(parse_number(&token)?);
    }
    flush(&mut commands, &mut numbers, current)?;

    Ok(commands)
}

fn parse_number(token: &str) -> ConvertResult<f64> {
    token
        .parse::<f64>()
        .map_err(|_| ConvertError::geometry(format!("invalid path number '{token}'")))
}

/// Expands a tokenized path into a flat point list.
///
/// `M` and `L` contribute their points directly; `A` is expanded through
/// [`EllipticalArc::sample`]; `Z` contributes nothing since the resulting
/// polygon closes implicitly.
///
/// # Errors
///
/// Returns [`ConvertError::Geometry`] when an arc command degenerates or the
/// path does not start with a move.
pub fn expand_path(commands: &[PathCommand]) -> ConvertResult<Vec<Point>> {
    let mut points: Vec<Point> = Vec::new();

    for command in commands {
        match *command {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => points.push(p),
            PathCommand::Arc {
                rx,
                ry,
                x_rotation,
                large_arc,
                sweep,
                end,
            } => {
                let start = *points
                    .last()
                    .ok_or_else(|| ConvertError::geometry("arc command without a start point"))?;
                let arc =
                    EllipticalArc::from_endpoints(start, end, rx, ry, x_rotation, large_arc, sweep)?;
                points.extend(arc.sample());
            }
            PathCommand::Close => {}
        }
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn unit_conversion_is_invertible() {
        for value in [0.0, 1.0, 39.37, -12.5, 1e6] {
            assert!((mm_to_mil(mil_to_mm(value)) - value).abs() < TOLERANCE);
        }
    }

    #[test]
    fn ten_mils_is_2_54_mm() {
        assert!(approx(mil_to_mm(10.0), 2.540_005_08));
    }

    #[test]
    fn semicircle_center() {
        // Start (0,0), end (2,0), radius 1: the center must sit at (1,0).
        let arc = EllipticalArc::from_endpoints(
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            1.0,
            1.0,
            0.0,
            false,
            true,
        )
        .unwrap();
        assert!(approx(arc.center.x, 1.0));
        assert!(approx(arc.center.y, 0.0));
        assert!(approx(arc.sweep_angle.abs(), std::f64::consts::PI));
    }

    #[test]
    fn endpoints_survive_center_derivation() {
        let cases = [
            (Point::new(0.0, 0.0), Point::new(10.0, 4.0), 7.0, 7.0, 0.0, false, true),
            (Point::new(-3.0, 2.0), Point::new(5.0, -1.0), 6.0, 4.0, 30.0, true, false),
            (Point::new(1.0, 1.0), Point::new(2.0, 3.0), 2.0, 2.0, 0.0, true, true),
        ];
        for (start, end, rx, ry, rot, large, sweep) in cases {
            let arc =
                EllipticalArc::from_endpoints(start, end, rx, ry, rot, large, sweep).unwrap();
            let s = arc.start_point();
            let e = arc.end_point();
            assert!(approx(s.x, start.x) && approx(s.y, start.y), "start {s:?} vs {start:?}");
            assert!(approx(e.x, end.x) && approx(e.y, end.y), "end {e:?} vs {end:?}");
            // The sweep direction matches the flag.
            assert_eq!(arc.sweep_angle > 0.0, sweep);
        }
    }

    #[test]
    fn infeasible_radii_are_scaled_up() {
        // Endpoints 10 apart but radius 1: radii must be corrected.
        let arc = EllipticalArc::from_endpoints(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            1.0,
            1.0,
            0.0,
            false,
            true,
        )
        .unwrap();
        assert!(arc.rx >= 5.0);
        let s = arc.start_point();
        assert!(approx(s.x, 0.0) && approx(s.y, 0.0));
    }

    #[test]
    fn full_circle_center_offset() {
        let start = Point::new(3.0, 4.0);
        let arc =
            EllipticalArc::from_endpoints(start, start, 2.5, 2.5, 0.0, false, true).unwrap();
        assert!(approx(arc.center.x, 5.5));
        assert!(approx(arc.center.y, 4.0));

        let ccw = EllipticalArc::from_endpoints(start, start, 2.5, 2.5, 0.0, false, false).unwrap();
        assert!(approx(ccw.center.x, 0.5));

        // Both windings must land the start point back on the coincident
        // endpoints, with the midpoint diametrically opposite.
        for circle in [&arc, &ccw] {
            let s = circle.start_point();
            assert!(approx(s.x, start.x) && approx(s.y, start.y));
            let e = circle.end_point();
            assert!(approx(e.x, start.x) && approx(e.y, start.y));
            let m = circle.midpoint();
            assert!(approx((m.x - circle.center.x).abs(), 2.5));
            assert!(!approx(m.x, start.x));
        }
    }

    #[test]
    fn sampling_has_minimum_resolution() {
        let arc = EllipticalArc::from_endpoints(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            5.0,
            5.0,
            0.0,
            false,
            true,
        )
        .unwrap();
        assert!(arc.sample().len() >= 8);

        let circle = EllipticalArc::from_endpoints(
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            5.0,
            5.0,
            0.0,
            false,
            true,
        )
        .unwrap();
        // A full circle samples finer than a short arc.
        assert!(circle.sample().len() > arc.sample().len());
    }

    #[test]
    fn path_tokenizer_accepts_mlaz() {
        let commands = parse_path("M 0 0 L 10,0 10 10 A 5 5 0 0 1 0 10 Z").unwrap();
        assert_eq!(commands.len(), 5);
        assert_eq!(commands[0], PathCommand::MoveTo(Point::new(0.0, 0.0)));
        assert_eq!(commands[2], PathCommand::LineTo(Point::new(10.0, 10.0)));
        assert!(matches!(commands[3], PathCommand::Arc { sweep: true, .. }));
        assert_eq!(commands[4], PathCommand::Close);
    }

    #[test]
    fn path_tokenizer_rejects_curves() {
        let err = parse_path("M 0 0 C 1 1 2 2 3 3").unwrap_err();
        assert!(err.to_string().contains("unsupported path command 'C'"));
    }

    #[test]
    fn expand_path_samples_arcs() {
        let commands = parse_path("M 0 0 L 4 0 A 2 2 0 0 1 0 0").unwrap();
        let points = expand_path(&commands).unwrap();
        // Two explicit points plus at least 8 arc samples.
        assert!(points.len() >= 10);
        let last = points.last().unwrap();
        assert!(approx(last.x, 0.0) && approx(last.y, 0.0));
    }
}
