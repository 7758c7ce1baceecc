//! Expansion of stroked polylines into fillable outlines.

use smallvec::SmallVec;

use crate::{CurveChain, CurveError, Path, Point, Vec2, Winding};

/// Collection of values representing lengths in a dash pattern.
pub type Dashes = SmallVec<[f64; 4]>;

/// Defines the connection between two segments of a stroke.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Join {
    /// A straight line connecting the segments.
    Bevel,
    /// The segments are extended to their natural intersection point,
    /// falling back to bevel past the miter limit.
    #[default]
    Miter,
    /// An arc between the segments.
    Round,
}

/// Defines the shape to be drawn at the ends of a stroke.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cap {
    /// Flat cap.
    #[default]
    Butt,
    /// Square cap with dimensions equal to half the stroke width.
    Square,
    /// Rounded cap with radius equal to half the stroke width.
    Round,
}

/// Describes the visual style of a stroke.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrokeStyle {
    /// Width of the stroke.
    pub width: f64,
    /// Style for connecting segments of the stroke.
    pub join: Join,
    /// Limit for miter joins, as a multiple of half the stroke width.
    ///
    /// Corners whose miter point would lie further from the vertex than
    /// this limit times the half-width render as bevels instead.
    pub miter_limit: f64,
    /// Style for capping the beginning of an open subpath.
    pub start_cap: Cap,
    /// Style for capping the end of an open subpath.
    pub end_cap: Cap,
    /// Lengths of dashes in alternating on/off order.
    pub dash_pattern: Dashes,
    /// Offset of the first dash.
    pub dash_offset: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            join: Join::default(),
            miter_limit: 4.0,
            start_cap: Cap::default(),
            end_cap: Cap::default(),
            dash_pattern: SmallVec::default(),
            dash_offset: 0.0,
        }
    }
}

impl StrokeStyle {
    /// Creates a new stroke with the specified width.
    pub fn new(width: f64) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    /// Builder method for setting the join style.
    pub fn with_join(mut self, join: Join) -> Self {
        self.join = join;
        self
    }

    /// Builder method for setting the limit for miter joins.
    pub fn with_miter_limit(mut self, limit: f64) -> Self {
        self.miter_limit = limit;
        self
    }

    /// Builder method for setting the cap style for the start of the
    /// stroke.
    pub fn with_start_cap(mut self, cap: Cap) -> Self {
        self.start_cap = cap;
        self
    }

    /// Builder method for setting the cap style for the end of the
    /// stroke.
    pub fn with_end_cap(mut self, cap: Cap) -> Self {
        self.end_cap = cap;
        self
    }

    /// Builder method for setting the cap style for both ends.
    pub fn with_caps(self, cap: Cap) -> Self {
        self.with_start_cap(cap).with_end_cap(cap)
    }

    /// Builder method for setting the dashing parameters.
    pub fn with_dashes<P>(mut self, offset: f64, pattern: P) -> Self
    where
        P: IntoIterator<Item = f64>,
    {
        self.dash_offset = offset;
        self.dash_pattern = pattern.into_iter().collect();
        self
    }
}

/// Expand a stroked polyline into a fillable outline.
///
/// The returned path uses the [`NonZero`](Winding::NonZero) rule. An open
/// polyline becomes one closed contour running up one side and back down
/// the other with caps at the ends; a closed polyline becomes two
/// oppositely-wound contours enclosing the stroke band. When the style
/// carries a dash pattern, each dash run is outlined separately.
///
/// # Errors
///
/// Returns [`CurveError::EmptyDashPattern`] when a dash pattern is
/// present but has no positive entry.
pub fn stroke_to_fill(
    points: &[Point],
    closed: bool,
    style: &StrokeStyle,
) -> Result<Path, CurveError> {
    let mut out = Path::with_winding(Winding::NonZero);
    if style.dash_pattern.is_empty() {
        stroke_polyline(&mut out, points, closed, style);
    } else {
        let chain = CurveChain::from_polyline(points, closed);
        for run in chain.to_dashes(&style.dash_pattern, style.dash_offset)? {
            let mut run_points: Vec<Point> = Vec::with_capacity(run.segments().len() + 1);
            for (i, seg) in run.segments().iter().enumerate() {
                if i == 0 {
                    run_points.push(seg.start());
                }
                run_points.push(seg.end());
            }
            stroke_polyline(&mut out, &run_points, false, style);
        }
    }
    Ok(out)
}

fn stroke_polyline(out: &mut Path, points: &[Point], closed: bool, style: &StrokeStyle) {
    let pts = dedup_points(points, closed);
    if pts.len() < 2 {
        return;
    }
    let half = style.width * 0.5;
    if closed {
        let left = offset_side(&pts, true, half, style);
        let mut right = offset_side(&pts, true, -half, style);
        right.reverse();
        emit_polygon(out, &left);
        emit_polygon(out, &right);
    } else {
        let mut outline = offset_side(&pts, false, half, style);
        let n = pts.len();
        let end_dir = (pts[n - 1] - pts[n - 2]).normalize_or_zero();
        add_cap(&mut outline, pts[n - 1], end_dir, half, style.end_cap);
        let right = offset_side(&pts, false, -half, style);
        outline.extend(right.iter().rev().copied());
        let start_dir = (pts[0] - pts[1]).normalize_or_zero();
        add_cap(&mut outline, pts[0], start_dir, half, style.start_cap);
        emit_polygon(out, &outline);
    }
}

fn dedup_points(points: &[Point], closed: bool) -> Vec<Point> {
    let mut pts: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if pts.last() != Some(&p) {
            pts.push(p);
        }
    }
    if closed && pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    pts
}

/// Offset polyline for one side of the stroke, with join geometry at the
/// vertices. `offset` is signed: positive for the left side of travel.
fn offset_side(pts: &[Point], closed: bool, offset: f64, style: &StrokeStyle) -> Vec<Point> {
    let n = pts.len();
    let dir = |i: usize| (pts[(i + 1) % n] - pts[i]).normalize_or_zero();
    let mut out = Vec::new();
    if !closed {
        out.push(pts[0] + dir(0).turn_90() * offset);
    }
    let vertices = if closed { 0..n } else { 1..n - 1 };
    for v in vertices {
        let prev_edge = if v == 0 { n - 1 } else { v - 1 };
        let d0 = dir(prev_edge);
        let d1 = dir(v);
        join_at(&mut out, pts[v], d0, d1, offset, style);
    }
    if !closed {
        out.push(pts[n - 1] + dir(n - 2).turn_90() * offset);
    }
    out
}

fn join_at(out: &mut Vec<Point>, v: Point, d0: Vec2, d1: Vec2, offset: f64, style: &StrokeStyle) {
    let a = v + d0.turn_90() * offset;
    let b = v + d1.turn_90() * offset;
    let turn = d0.cross(d1);
    if turn.abs() < 1e-12 {
        out.push(a);
        return;
    }
    // the outer side bends away from the turn; the inner side just bevels
    // over and lets the nonzero fill absorb the overlap
    let outer = offset * turn < 0.0;
    if !outer {
        out.push(a);
        out.push(b);
        return;
    }
    let half = offset.abs();
    match style.join {
        Join::Bevel => {
            out.push(a);
            out.push(b);
        }
        Join::Miter => match line_line_intersection(a, d0, b, d1) {
            Some(m) if (m - v).hypot() <= style.miter_limit * half => {
                out.push(a);
                out.push(m);
                out.push(b);
            }
            _ => {
                out.push(a);
                out.push(b);
            }
        },
        Join::Round => {
            out.push(a);
            arc_between(out, v, a, b, half);
            out.push(b);
        }
    }
}

fn line_line_intersection(a: Point, da: Vec2, b: Point, db: Vec2) -> Option<Point> {
    let denom = da.cross(db);
    if denom.abs() < 1e-12 {
        return None;
    }
    let t = (b - a).cross(db) / denom;
    Some(a + da * t)
}

/// Interior points of the arc from `a` to `b` around `center`, taking
/// the short way.
fn arc_between(out: &mut Vec<Point>, center: Point, a: Point, b: Point, radius: f64) {
    let th0 = (a - center).atan2();
    let mut sweep = (b - center).atan2() - th0;
    if sweep > std::f64::consts::PI {
        sweep -= 2.0 * std::f64::consts::PI;
    } else if sweep < -std::f64::consts::PI {
        sweep += 2.0 * std::f64::consts::PI;
    }
    let steps = arc_steps(radius * sweep.abs());
    for k in 1..steps {
        let th = th0 + sweep * (k as f64) / (steps as f64);
        out.push(center + Vec2::from_angle(th) * radius);
    }
}

/// Number of polygon steps used to approximate an arc of the given
/// length.
fn arc_steps(arc_len: f64) -> usize {
    (arc_len * 4.0).clamp(4.0, 64.0) as usize
}

fn add_cap(out: &mut Vec<Point>, center: Point, d_out: Vec2, half: f64, cap: Cap) {
    // the outline arrives at center + m * half and leaves from the
    // mirrored point
    let m = d_out.turn_90();
    match cap {
        Cap::Butt => {}
        Cap::Square => {
            out.push(center + (m + d_out) * half);
            out.push(center + (d_out - m) * half);
        }
        Cap::Round => {
            let th0 = m.atan2();
            let steps = arc_steps(half * std::f64::consts::PI);
            for k in 1..steps {
                let th = th0 - std::f64::consts::PI * (k as f64) / (steps as f64);
                out.push(center + Vec2::from_angle(th) * half);
            }
        }
    }
}

fn emit_polygon(out: &mut Path, pts: &[Point]) {
    if pts.len() < 3 {
        return;
    }
    out.move_to(pts[0]);
    for &p in &pts[1..] {
        out.line_to(p);
    }
    out.close();
}
