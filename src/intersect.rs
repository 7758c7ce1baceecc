//! Curve/curve and curve/line intersection search.

use arrayvec::ArrayVec;

use crate::common::bernstein_roots;
use crate::segment::{align, eval_poly};
use crate::{BezierSegment, Point, Rect};

/// Default bounding-box size at which subdivision accepts an intersection.
pub const DEFAULT_INTERSECTION_THRESHOLD: f64 = 0.5;

/// Hard cap on subdivision steps for one curve pair.
///
/// Overlapping or coincident curves never converge to isolated
/// intersection points; the cap turns that case into a truncated result
/// instead of unbounded work.
const MAX_SUBDIVISIONS: usize = 1 << 16;

/// Intersection parameters keep five decimal digits, which also collapses
/// near-duplicate hits from adjacent subdivision cells.
fn round_param(t: f64) -> f64 {
    const R: f64 = 100_000.0;
    (t * R).trunc() / R
}

/// A piece of a curve remembering its parameter range on the original.
#[derive(Clone, Debug)]
pub struct SubSegment {
    /// The extracted piece, reparameterized over [0, 1].
    pub curve: BezierSegment,
    /// Parameter on the original curve where this piece starts.
    pub t0: f64,
    /// Parameter on the original curve where this piece ends.
    pub t1: f64,
}

impl SubSegment {
    fn mid_param(&self) -> f64 {
        0.5 * (self.t0 + self.t1)
    }

    fn split_half(&self) -> (SubSegment, SubSegment) {
        let (a, b) = self.curve.split(0.5);
        let mid = self.mid_param();
        (
            SubSegment {
                curve: a,
                t0: self.t0,
                t1: mid,
            },
            SubSegment {
                curve: b,
                t0: mid,
                t1: self.t1,
            },
        )
    }
}

/// An infinite-precision line segment between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    /// The start of the segment.
    pub p0: Point,
    /// The end of the segment.
    pub p1: Point,
}

impl Line {
    /// A new line segment.
    #[inline]
    pub const fn new(p0: Point, p1: Point) -> Line {
        Line { p0, p1 }
    }

    /// The length of the segment.
    #[inline]
    pub fn length(&self) -> f64 {
        (self.p1 - self.p0).hypot()
    }

    /// The point at parameter `t`.
    #[inline]
    pub fn eval(&self, t: f64) -> Point {
        self.p0.lerp(self.p1, t)
    }

    fn bounding_box(&self) -> Rect {
        Rect::from_points(self.p0, self.p1)
    }
}

/// Decompose a curve into simple pieces.
///
/// The curve is first cut at its per-axis extrema, making each piece
/// monotonic, then each piece is walked in 1% parameter steps, growing a
/// window as long as it stays [simple](BezierSegment::is_simple) and
/// emitting it when it stops. Returns an empty list when the curve cannot
/// be reduced, i.e. some region stays non-simple below one step.
pub fn reduce(curve: &BezierSegment) -> Vec<SubSegment> {
    if curve.is_linear() {
        return vec![SubSegment {
            curve: curve.clone(),
            t0: 0.0,
            t1: 1.0,
        }];
    }
    const STEP: f64 = 0.01;
    let mut cuts: Vec<f64> = vec![0.0];
    for t in curve.extrema() {
        if t > 1e-12 && t < 1.0 - 1e-12 {
            cuts.push(t);
        }
    }
    cuts.push(1.0);

    let mut out = Vec::new();
    for w in cuts.windows(2) {
        let (lo, hi) = (w[0], w[1]);
        let piece = curve.subsegment(lo..hi);
        let map = |local: f64| lo + local * (hi - lo);
        let mut t1 = 0.0;
        while t1 < 1.0 {
            let mut t2 = (t1 + STEP).min(1.0);
            let mut grown: Option<(f64, BezierSegment)> = None;
            loop {
                let sub = piece.subsegment(t1..t2);
                if !sub.is_simple() {
                    break;
                }
                grown = Some((t2, sub));
                if t2 >= 1.0 {
                    break;
                }
                t2 = (t2 + STEP).min(1.0);
            }
            match grown {
                Some((end, sub)) => {
                    out.push(SubSegment {
                        curve: sub,
                        t0: map(t1),
                        t1: map(end),
                    });
                    t1 = end;
                }
                // not simple within a single step, give up on the curve
                None => return Vec::new(),
            }
        }
    }
    out
}

/// The strict midpoint-distance overlap test used during subdivision.
///
/// Unlike [`Rect::overlaps`] this admits boxes of zero width or height,
/// which line-like curve pieces produce.
fn boxes_near(a: Rect, b: Rect) -> bool {
    let dx = (a.center().x - b.center().x).abs();
    let dy = (a.center().y - b.center().y).abs();
    dx < 0.5 * (a.width() + b.width()) && dy < 0.5 * (a.height() + b.height())
}

fn small_enough(r: Rect, threshold: f64) -> bool {
    r.width().abs() + r.height().abs() < threshold
}

/// Recursive bounding-box subdivision over one pair, via an explicit
/// worklist.
fn pair_iteration(
    left: &SubSegment,
    right: &SubSegment,
    threshold: f64,
    out: &mut Vec<(f64, f64)>,
) {
    let mut work = vec![(left.clone(), right.clone())];
    let mut budget = MAX_SUBDIVISIONS;
    while let Some((a, b)) = work.pop() {
        if budget == 0 {
            return;
        }
        budget -= 1;
        let ba = a.curve.bounding_box();
        let bb = b.curve.bounding_box();
        if small_enough(ba, threshold) && small_enough(bb, threshold) {
            out.push((round_param(a.mid_param()), round_param(b.mid_param())));
            continue;
        }
        let (a1, a2) = a.split_half();
        let (b1, b2) = b.split_half();
        for (ca, cb) in [(&a1, &b1), (&a1, &b2), (&a2, &b1), (&a2, &b2)] {
            if boxes_near(ca.curve.bounding_box(), cb.curve.bounding_box()) {
                work.push(((*ca).clone(), (*cb).clone()));
            }
        }
    }
}

fn sub_segment_intersections(
    left: &[SubSegment],
    right: &[SubSegment],
    threshold: f64,
) -> Vec<(f64, f64)> {
    let mut out = Vec::new();
    for l in left {
        for r in right {
            if boxes_near(l.curve.bounding_box(), r.curve.bounding_box()) {
                pair_iteration(l, r, threshold, &mut out);
            }
        }
    }
    out.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    });
    out.dedup();
    out
}

/// All intersections between two curves, as parameter pairs `(ta, tb)`.
///
/// `threshold` bounds the bounding-box size at which subdivision stops;
/// smaller values refine the parameters further.
pub fn curve_intersections(
    a: &BezierSegment,
    b: &BezierSegment,
    threshold: f64,
) -> Vec<(f64, f64)> {
    sub_segment_intersections(&reduce(a), &reduce(b), threshold)
}

/// Self-intersections of one curve, as parameter pairs on that curve.
///
/// The curve is reduced to simple pieces and each piece is tested against
/// the non-adjacent pieces after it, so the shared endpoints of neighbors
/// do not register as hits.
pub fn self_intersections(curve: &BezierSegment, threshold: f64) -> Vec<(f64, f64)> {
    let reduced = reduce(curve);
    let mut out = Vec::new();
    for i in 0..reduced.len().saturating_sub(2) {
        let left = &reduced[i..i + 1];
        let right = &reduced[i + 2..];
        out.extend(sub_segment_intersections(left, right, threshold));
    }
    out.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    });
    out.dedup();
    out
}

/// Parameters on `curve` where it crosses the segment `line`.
///
/// The control points are rotated into the line's frame and the aligned
/// Y polynomial is solved analytically, then roots are kept only where
/// the curve point actually lies within the segment's extent.
pub fn line_intersections(curve: &BezierSegment, line: Line) -> Vec<f64> {
    if line.length() < 1e-12 {
        return Vec::new();
    }
    let aligned = align(curve.points(), line.p0, line.p1);
    let ys: ArrayVec<f64, 4> = aligned.iter().map(|p| p.y).collect();
    let bb = line.bounding_box().inflate(1e-9, 1e-9);
    let mut out: Vec<f64> = bernstein_roots(&ys)
        .into_iter()
        .filter(|&t| (0.0..=1.0).contains(&t))
        .filter(|&t| {
            let p = eval_poly(curve.points(), t);
            p.x >= bb.x0 && p.x <= bb.x1 && p.y >= bb.y0 && p.y <= bb.y1
        })
        .collect();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    out.dedup();
    out
}
