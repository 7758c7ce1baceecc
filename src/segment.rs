//! Parametric Bezier segments of order one to three.

use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use arrayvec::ArrayVec;

use crate::common::{bernstein_roots, GAUSS_LEGENDRE_COEFFS_24};
use crate::{CurveError, CurveLUT, Point, Rect, Vec2};

/// Default number of sampling steps for [`BezierSegment::lut`].
pub const DEFAULT_LUT_STEPS: usize = 100;

/// A Bezier curve segment of order 1 (line), 2 (quadratic) or 3 (cubic).
///
/// A segment is immutable once constructed. Derived quantities (hodograph
/// control points, extrema parameters, bounding box, arc length, sampling
/// table) are computed lazily and memoized, so a segment that has been
/// queried once can be read from multiple threads without recomputation.
#[derive(Clone, Debug)]
pub struct BezierSegment {
    points: ArrayVec<Point, 4>,
    deriv_pts: OnceLock<ArrayVec<Point, 3>>,
    extrema: OnceLock<Extrema>,
    bounds: OnceLock<Rect>,
    length: OnceLock<f64>,
    lut: OnceLock<CurveLUT>,
}

/// Per-axis extrema parameters of a segment.
///
/// These are the parameters where one coordinate's first (and, for cubics,
/// second) derivative vanishes, restricted to [0, 1].
#[derive(Clone, Debug, Default)]
pub(crate) struct Extrema {
    pub(crate) x: ArrayVec<f64, 3>,
    pub(crate) y: ArrayVec<f64, 3>,
}

impl PartialEq for BezierSegment {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl fmt::Display for BezierSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bezier(")?;
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, ")")
    }
}

impl BezierSegment {
    fn from_raw(points: ArrayVec<Point, 4>) -> BezierSegment {
        BezierSegment {
            points,
            deriv_pts: OnceLock::new(),
            extrema: OnceLock::new(),
            bounds: OnceLock::new(),
            length: OnceLock::new(),
            lut: OnceLock::new(),
        }
    }

    /// Create a segment from a slice of 2 to 4 control points.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidOrder`] when the slice does not hold
    /// between two and four points.
    pub fn from_points(points: &[Point]) -> Result<BezierSegment, CurveError> {
        if !(2..=4).contains(&points.len()) {
            return Err(CurveError::InvalidOrder {
                points: points.len(),
            });
        }
        Ok(Self::from_raw(points.iter().copied().collect()))
    }

    /// A straight-line segment (order 1).
    pub fn linear(p0: Point, p1: Point) -> BezierSegment {
        Self::from_raw([p0, p1].into_iter().collect())
    }

    /// A quadratic segment (order 2).
    pub fn quadratic(p0: Point, p1: Point, p2: Point) -> BezierSegment {
        Self::from_raw([p0, p1, p2].into_iter().collect())
    }

    /// A cubic segment (order 3).
    pub fn cubic(p0: Point, p1: Point, p2: Point, p3: Point) -> BezierSegment {
        Self::from_raw([p0, p1, p2, p3].into_iter().collect())
    }

    /// The order of the curve: 1, 2 or 3.
    #[inline]
    pub fn order(&self) -> usize {
        self.points.len() - 1
    }

    /// The control points.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The first control point.
    #[inline]
    pub fn start(&self) -> Point {
        self.points[0]
    }

    /// The last control point.
    #[inline]
    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Evaluate the curve at parameter `t`.
    ///
    /// Values outside [0, 1] clamp to the corresponding endpoint.
    pub fn eval(&self, t: f64) -> Point {
        let t = t.clamp(0.0, 1.0);
        eval_poly(&self.points, t)
    }

    /// The hodograph (derivative curve) control points.
    fn deriv_points(&self) -> &[Point] {
        self.deriv_pts.get_or_init(|| derive(&self.points))
    }

    /// The derivative vector of the curve at `t`.
    ///
    /// At a degenerate endpoint (coincident control points) the hodograph
    /// vanishes; in that case the parameter is nudged inward until a usable
    /// direction appears, so tangents at the ends of such curves stay
    /// meaningful.
    pub fn deriv(&self, t: f64) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        let dpts = self.deriv_points();
        let mut d = eval_poly(dpts, t).to_vec2();
        if d.hypot2() < 1e-20 && (t == 0.0 || t == 1.0) {
            for n in 0..10 {
                let inward = 10f64.powi(n - 10);
                let nt = if t == 1.0 { 1.0 - inward } else { inward };
                d = eval_poly(dpts, nt).to_vec2();
                if d.hypot2() >= 1e-20 {
                    break;
                }
            }
        }
        d
    }

    /// The unit tangent vector at `t`, or the zero vector for a fully
    /// degenerate segment.
    pub fn tangent(&self, t: f64) -> Vec2 {
        self.deriv(t).normalize_or_zero()
    }

    /// The unit normal vector at `t` (the tangent rotated 90°), or the
    /// zero vector for a fully degenerate segment.
    pub fn normal(&self, t: f64) -> Vec2 {
        self.tangent(t).turn_90()
    }

    /// The signed curvature at `t`.
    ///
    /// Returns 0 for straight or degenerate configurations.
    pub fn curvature(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let d1 = self.deriv_points();
        if d1.len() < 2 {
            return 0.0;
        }
        let d2 = derive3(d1);
        let d = eval_poly(d1, t).to_vec2();
        let dd = eval_poly(&d2, t).to_vec2();
        let num = d.cross(dd);
        let dnm = d.hypot2().powf(1.5);
        if num == 0.0 || dnm == 0.0 {
            0.0
        } else {
            num / dnm
        }
    }

    pub(crate) fn extrema_xy(&self) -> &Extrema {
        self.extrema.get_or_init(|| {
            let d1 = derive(&self.points);
            let d2 = derive3(&d1);
            let one_axis = |get: fn(Point) -> f64| -> ArrayVec<f64, 3> {
                let vals: ArrayVec<f64, 3> = d1.iter().map(|&p| get(p)).collect();
                let first = droots(&vals);
                if self.order() == 3 {
                    let vals2: ArrayVec<f64, 2> = d2.iter().map(|&p| get(p)).collect();
                    merge_distinct(&first, &droots(&vals2))
                } else {
                    first.iter().copied().collect()
                }
            };
            Extrema {
                x: one_axis(|p| p.x),
                y: one_axis(|p| p.y),
            }
        })
    }

    /// All extrema parameters of both axes, sorted and deduplicated.
    ///
    /// For cubics this includes the parameters where the second derivative
    /// vanishes per axis, which is what monotonic decomposition needs.
    pub fn extrema(&self) -> ArrayVec<f64, 6> {
        let e = self.extrema_xy();
        merge_distinct(&e.x, &e.y)
    }

    /// The exact axis-aligned bounding box.
    ///
    /// Extrema are found by solving the derivative's root equation per
    /// axis, so unlike sampling at fixed steps there is no step error.
    pub fn bounding_box(&self) -> Rect {
        *self.bounds.get_or_init(|| {
            let e = self.extrema_xy().clone();
            let mut bb = Rect::from_points(self.start(), self.end());
            for &t in e.x.iter().chain(e.y.iter()) {
                bb = bb.union_pt(self.eval(t));
            }
            bb
        })
    }

    /// The arc length of the segment.
    ///
    /// Numerically integrates the hodograph magnitude over [0, 1] with a
    /// fixed order-24 Gauss-Legendre quadrature, so the accuracy does not
    /// depend on a step count.
    pub fn arclen(&self) -> f64 {
        *self.length.get_or_init(|| {
            let dpts = self.deriv_points();
            0.5 * GAUSS_LEGENDRE_COEFFS_24
                .iter()
                .map(|&(wi, xi)| {
                    let t = 0.5 * (xi + 1.0);
                    wi * eval_poly(dpts, t).to_vec2().hypot()
                })
                .sum::<f64>()
        })
    }

    /// Build a fresh lookup table with `steps` uniform parameter steps
    /// (producing `steps + 1` samples).
    pub fn build_lut(&self, steps: usize) -> CurveLUT {
        let steps = steps.max(1);
        let mut out = CurveLUT::with_capacity(steps + 1);
        for n in 0..=steps {
            let t = n as f64 / steps as f64;
            out.add(t, self.eval(t));
        }
        out
    }

    /// The memoized default-resolution lookup table.
    pub fn lut(&self) -> &CurveLUT {
        self.lut.get_or_init(|| self.build_lut(DEFAULT_LUT_STEPS))
    }

    /// The curve parameter at arc length `length` from the start,
    /// estimated through the segment's lookup table.
    pub fn ratio_from_length(&self, length: f64) -> f64 {
        self.lut().estimate_at_length(length).t
    }

    /// Subdivide at `t` with de Casteljau's algorithm, producing two
    /// curves of the same order that together cover the original.
    pub fn split(&self, t: f64) -> (BezierSegment, BezierSegment) {
        let t = t.clamp(0.0, 1.0);
        let mut work = self.points.clone();
        let mut left: ArrayVec<Point, 4> = ArrayVec::new();
        let mut right: ArrayVec<Point, 4> = ArrayVec::new();
        left.push(work[0]);
        right.push(work[work.len() - 1]);
        while work.len() > 1 {
            for i in 0..work.len() - 1 {
                work[i] = work[i].lerp(work[i + 1], t);
            }
            work.truncate(work.len() - 1);
            left.push(work[0]);
            right.push(work[work.len() - 1]);
        }
        right.reverse();
        (Self::from_raw(left), Self::from_raw(right))
    }

    /// The sub-curve covering the parameter range `range` of this curve.
    pub fn subsegment(&self, range: Range<f64>) -> BezierSegment {
        let mut t0 = range.start.clamp(0.0, 1.0);
        let mut t1 = range.end.clamp(0.0, 1.0);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        let (_, right) = self.split(t0);
        let local = if t0 >= 1.0 {
            0.0
        } else {
            (t1 - t0) / (1.0 - t0)
        };
        let (mid, _) = right.split(local);
        mid
    }

    /// The same curve with the control point order reversed.
    pub fn reverse(&self) -> BezierSegment {
        let mut points = self.points.clone();
        points.reverse();
        Self::from_raw(points)
    }

    /// Whether the segment is close enough to its chord to be treated as a
    /// straight line.
    ///
    /// Measured as the summed deviation of the control points from the
    /// chord, relative to the chord length.
    pub fn is_linear(&self) -> bool {
        let base_len = (self.end() - self.start()).hypot();
        let aligned = align(&self.points, self.start(), self.end());
        let deviation: f64 = aligned.iter().map(|p| p.y.abs()).sum();
        deviation < base_len / 50.0
    }

    /// Whether the segment is "simple": all control points on one side of
    /// the baseline (for cubics), and the end normals within 60° of each
    /// other.
    ///
    /// Simple pieces have bounded turning, so linear and bounding-box
    /// approximations of them are safe during intersection search.
    pub fn is_simple(&self) -> bool {
        if self.order() == 3 {
            let a1 = angle(self.points[0], self.points[3], self.points[1]);
            let a2 = angle(self.points[0], self.points[3], self.points[2]);
            if (a1 > 0.0 && a2 < 0.0) || (a1 < 0.0 && a2 > 0.0) {
                return false;
            }
        }
        let n1 = self.normal(0.0);
        let n2 = self.normal(1.0);
        let s = n1.dot(n2).clamp(-1.0, 1.0);
        s.acos().abs() < std::f64::consts::FRAC_PI_3
    }

    /// The same geometry expressed as a cubic.
    ///
    /// Lines and quadratics are degree-raised exactly; cubics are returned
    /// unchanged.
    pub fn to_cubic(&self) -> BezierSegment {
        match *self.points {
            [p0, p1] => {
                let d = (p1 - p0) / 3.0;
                Self::cubic(p0, p0 + d, p0 + d + d, p1)
            }
            [p0, p1, p2] => Self::cubic(
                p0,
                p0 + (p1 - p0) * (2.0 / 3.0),
                p2 + (p1 - p2) * (2.0 / 3.0),
                p2,
            ),
            _ => self.clone(),
        }
    }
}

/// Direct Bernstein-basis evaluation of a control polygon at `t`.
///
/// `points` may be a hodograph of any length 1 to 4; the endpoints are
/// returned exactly at t = 0 and t = 1.
pub(crate) fn eval_poly(points: &[Point], t: f64) -> Point {
    let order = points.len() - 1;
    if t == 0.0 || order == 0 {
        return points[0];
    }
    if t == 1.0 {
        return points[order];
    }
    let mt = 1.0 - t;
    match *points {
        [p0, p1] => (p0.to_vec2() * mt + p1.to_vec2() * t).to_point(),
        [p0, p1, p2] => {
            let a = mt * mt;
            let b = mt * t * 2.0;
            let c = t * t;
            (p0.to_vec2() * a + p1.to_vec2() * b + p2.to_vec2() * c).to_point()
        }
        [p0, p1, p2, p3] => {
            let mt2 = mt * mt;
            let t2 = t * t;
            let a = mt2 * mt;
            let b = mt2 * t * 3.0;
            let c = mt * t2 * 3.0;
            let d = t * t2;
            (p0.to_vec2() * a + p1.to_vec2() * b + p2.to_vec2() * c + p3.to_vec2() * d).to_point()
        }
        _ => unreachable!("control polygon limited to order 3"),
    }
}

/// One level of hodograph control points: n * (p[i+1] - p[i]).
fn derive(points: &[Point]) -> ArrayVec<Point, 3> {
    let c = (points.len() - 1) as f64;
    points
        .windows(2)
        .map(|w| ((w[1] - w[0]) * c).to_point())
        .collect()
}

fn derive3(points: &[Point]) -> ArrayVec<Point, 2> {
    let c = points.len().saturating_sub(1) as f64;
    points
        .windows(2)
        .map(|w| ((w[1] - w[0]) * c).to_point())
        .collect()
}

/// Roots of a Bernstein-form polynomial given by its control values,
/// restricted to [0, 1].
fn droots(vals: &[f64]) -> ArrayVec<f64, 2> {
    // derivative control values have at most three entries, so at most
    // two roots come back
    bernstein_roots(vals)
        .into_iter()
        .filter(|t| (0.0..=1.0).contains(t))
        .collect()
}

/// Merge two sorted root lists into one sorted list without near-duplicate
/// entries.
fn merge_distinct<const A: usize, const B: usize, const O: usize>(
    a: &ArrayVec<f64, A>,
    b: &ArrayVec<f64, B>,
) -> ArrayVec<f64, O> {
    let mut all: ArrayVec<f64, O> = ArrayVec::new();
    all.extend(a.iter().copied());
    all.extend(b.iter().copied());
    all.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
    let mut out: ArrayVec<f64, O> = ArrayVec::new();
    for v in all {
        match out.last() {
            Some(&last) if (v - last).abs() <= 1e-9 => {}
            _ => out.push(v),
        }
    }
    out
}

/// Signed angle at `o` between the rays toward `v1` and `v2`.
fn angle(o: Point, v1: Point, v2: Point) -> f64 {
    let d1 = v1 - o;
    let d2 = v2 - o;
    d1.cross(d2).atan2(d1.dot(d2))
}

/// Rotate and translate `points` into the frame where the line from
/// `origin` toward `toward` becomes the positive X axis.
pub(crate) fn align(points: &[Point], origin: Point, toward: Point) -> ArrayVec<Point, 4> {
    let th = -(toward - origin).atan2();
    let (s, c) = th.sin_cos();
    points
        .iter()
        .map(|&p| {
            let v = p - origin;
            Point::new(v.x * c - v.y * s, v.x * s + v.y * c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn arch() -> BezierSegment {
        BezierSegment::cubic(
            Point::new(0.0, 0.0),
            Point::new(30.0, 100.0),
            Point::new(70.0, 100.0),
            Point::new(100.0, 0.0),
        )
    }

    #[test]
    fn invalid_orders_rejected() {
        let p = Point::ZERO;
        assert_eq!(
            BezierSegment::from_points(&[p]),
            Err(CurveError::InvalidOrder { points: 1 })
        );
        assert_eq!(
            BezierSegment::from_points(&[p; 5]),
            Err(CurveError::InvalidOrder { points: 5 })
        );
        assert!(BezierSegment::from_points(&[p, Point::new(1.0, 1.0)]).is_ok());
    }

    #[test]
    fn eval_boundary_is_exact() {
        for seg in [
            BezierSegment::linear(Point::new(1.5, 2.5), Point::new(-3.0, 7.0)),
            BezierSegment::quadratic(
                Point::new(0.1, 0.2),
                Point::new(5.0, -3.0),
                Point::new(9.9, 1.1),
            ),
            arch(),
        ] {
            assert_eq!(seg.eval(0.0), seg.start());
            assert_eq!(seg.eval(1.0), seg.end());
            // out-of-range parameters clamp
            assert_eq!(seg.eval(-2.0), seg.start());
            assert_eq!(seg.eval(3.0), seg.end());
        }
    }

    #[test]
    fn bounding_box_contains_random_samples() {
        let seg = BezierSegment::cubic(
            Point::new(10.0, -5.0),
            Point::new(-40.0, 60.0),
            Point::new(90.0, 90.0),
            Point::new(20.0, 5.0),
        );
        let bb = seg.bounding_box().inflate(1e-9, 1e-9);
        let mut rng = rand::rng();
        for _ in 0..1000 {
            let t: f64 = rng.random_range(0.0..=1.0);
            let p = seg.eval(t);
            assert!(
                p.x >= bb.x0 && p.x <= bb.x1 && p.y >= bb.y0 && p.y <= bb.y1,
                "point {p} at t={t} outside {bb:?}"
            );
        }
    }

    #[test]
    fn bounding_box_is_tight() {
        // symmetric arch peaks at y = 75 (t = 0.5)
        let bb = arch().bounding_box();
        assert!((bb.y1 - 75.0).abs() < 1e-9);
        assert!((bb.x0 - 0.0).abs() < 1e-9);
        assert!((bb.x1 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn split_is_consistent_with_eval() {
        let seg = arch();
        let mut rng = rand::rng();
        for _ in 0..100 {
            let t: f64 = rng.random_range(0.0..=1.0);
            let (left, right) = seg.split(t);
            let p = seg.eval(t);
            assert!(left.end().distance(p) < 1e-9);
            assert!(right.start().distance(p) < 1e-9);
            assert!(left.start().distance(seg.start()) < 1e-9);
            assert!(right.end().distance(seg.end()) < 1e-9);
        }
    }

    #[test]
    fn subsegment_matches_parent() {
        let seg = arch();
        let sub = seg.subsegment(0.25..0.75);
        for n in 0..=10 {
            let local = n as f64 / 10.0;
            let global = 0.25 + local * 0.5;
            assert!(sub.eval(local).distance(seg.eval(global)) < 1e-9);
        }
    }

    #[test]
    fn straight_line_arclen() {
        let seg = BezierSegment::linear(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!((seg.arclen() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn arclen_quadrature_matches_lut_chords() {
        let seg = arch();
        let quad = seg.arclen();
        let chords = seg.build_lut(1000).total_length();
        assert!((quad - chords).abs() < quad * 1e-4);
    }

    #[test]
    fn degenerate_tangent_is_zero() {
        let p = Point::new(4.0, 4.0);
        let seg = BezierSegment::linear(p, p);
        assert_eq!(seg.tangent(0.5), Vec2::ZERO);
        assert_eq!(seg.normal(0.5), Vec2::ZERO);
    }

    #[test]
    fn coincident_endpoint_tangent_nudges_inward() {
        // first control point coincides with the start
        let seg = BezierSegment::cubic(
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(50.0, 100.0),
            Point::new(100.0, 0.0),
        );
        let t = seg.tangent(0.0);
        assert!(t.hypot() > 0.9, "expected a usable direction, got {t}");
    }

    #[test]
    fn simpleness() {
        assert!(!arch().is_simple());
        let gentle = arch().subsegment(0.0..0.2);
        assert!(gentle.is_simple());
    }

    #[test]
    fn linearity() {
        let flat = BezierSegment::cubic(
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.01),
            Point::new(70.0, -0.01),
            Point::new(100.0, 0.0),
        );
        assert!(flat.is_linear());
        assert!(!arch().is_linear());
    }

    #[test]
    fn quad_to_cubic_is_exact() {
        let quad = BezierSegment::quadratic(
            Point::new(0.0, 0.0),
            Point::new(50.0, 100.0),
            Point::new(100.0, 0.0),
        );
        let cubic = quad.to_cubic();
        assert_eq!(cubic.order(), 3);
        for n in 0..=20 {
            let t = n as f64 / 20.0;
            assert!(quad.eval(t).distance(cubic.eval(t)) < 1e-9);
        }
    }

    #[test]
    fn reverse_flips_parameterization() {
        let seg = arch();
        let rev = seg.reverse();
        assert!(rev.eval(0.25).distance(seg.eval(0.75)) < 1e-12);
    }
}
