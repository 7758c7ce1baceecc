//! Chains of Bezier segments with a shared length-proportional parameter.

use std::sync::OnceLock;

use crate::{BezierSegment, CurveError, Point, Rect, Vec2};

/// Per-segment placement inside a chain's arc-length space.
#[derive(Clone, Copy, Debug)]
struct CurveInfo {
    start_length: f64,
    end_length: f64,
    bounds: Rect,
}

impl CurveInfo {
    fn length(&self) -> f64 {
        self.end_length - self.start_length
    }
}

/// An ordered sequence of [`BezierSegment`]s addressed by one global
/// parameter.
///
/// The global parameter `t` in [0, 1] is proportional to arc length
/// across segments: `t` maps to the position `t * length()` along the
/// chain, which selects a segment and a local parameter inside it. Within
/// one segment the local parameter is the segment's own (non-uniform)
/// parameterization; [`ratio_from_length`](CurveChain::ratio_from_length)
/// compensates for that through the segment lookup tables.
#[derive(Clone, Debug, Default)]
pub struct CurveChain {
    segments: Vec<BezierSegment>,
    closed: bool,
    infos: OnceLock<Vec<CurveInfo>>,
}

impl PartialEq for CurveChain {
    fn eq(&self, other: &Self) -> bool {
        self.closed == other.closed && self.segments == other.segments
    }
}

impl CurveChain {
    /// A chain over the given segments.
    ///
    /// Segments are expected to connect end-to-start; this is not
    /// enforced, see [`is_contiguous`](CurveChain::is_contiguous).
    pub fn new(segments: Vec<BezierSegment>, closed: bool) -> CurveChain {
        CurveChain {
            segments,
            closed,
            infos: OnceLock::new(),
        }
    }

    /// A chain of straight segments through `points`, in order.
    ///
    /// When `closed`, a final segment from the last point back to the
    /// first is appended.
    pub fn from_polyline(points: &[Point], closed: bool) -> CurveChain {
        let mut segments: Vec<BezierSegment> = points
            .windows(2)
            .map(|w| BezierSegment::linear(w[0], w[1]))
            .collect();
        if closed && points.len() >= 2 {
            let last = points[points.len() - 1];
            if last != points[0] {
                segments.push(BezierSegment::linear(last, points[0]));
            }
        }
        CurveChain::new(segments, closed)
    }

    /// The segments of the chain.
    #[inline]
    pub fn segments(&self) -> &[BezierSegment] {
        &self.segments
    }

    /// Whether the chain represents a closed contour.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether every segment starts where the previous one ends (and, for
    /// closed chains, the last ends where the first starts).
    pub fn is_contiguous(&self) -> bool {
        let eps = 1e-9;
        for w in self.segments.windows(2) {
            if w[0].end().distance(w[1].start()) > eps {
                return false;
            }
        }
        if self.closed {
            if let (Some(first), Some(last)) = (self.segments.first(), self.segments.last()) {
                if last.end().distance(first.start()) > eps {
                    return false;
                }
            }
        }
        true
    }

    fn infos(&self) -> &[CurveInfo] {
        self.infos.get_or_init(|| {
            let mut acc = 0.0;
            self.segments
                .iter()
                .map(|seg| {
                    let start_length = acc;
                    acc += seg.arclen();
                    CurveInfo {
                        start_length,
                        end_length: acc,
                        bounds: seg.bounding_box(),
                    }
                })
                .collect()
        })
    }

    /// The total arc length of the chain.
    pub fn length(&self) -> f64 {
        self.infos().last().map(|i| i.end_length).unwrap_or(0.0)
    }

    /// The bounding box of the whole chain.
    pub fn bounds(&self) -> Rect {
        let infos = self.infos();
        match infos.split_first() {
            Some((first, rest)) => rest
                .iter()
                .fold(first.bounds, |bb, info| bb.union(info.bounds)),
            None => Rect::ZERO,
        }
    }

    /// Map a global parameter to a segment index and local parameter.
    fn locate(&self, t: f64) -> (usize, f64) {
        let infos = self.infos();
        if infos.is_empty() {
            return (0, 0.0);
        }
        let t = t.clamp(0.0, 1.0);
        let pos = t * self.length();
        let i = infos
            .partition_point(|info| info.end_length <= pos)
            .min(infos.len() - 1);
        let info = &infos[i];
        let span = info.length();
        let local = if span > 0.0 {
            ((pos - info.start_length) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (i, local)
    }

    /// Evaluate the chain at global parameter `t` in [0, 1].
    ///
    /// An empty chain evaluates to the origin.
    pub fn eval(&self, t: f64) -> Point {
        if self.segments.is_empty() {
            return Point::ZERO;
        }
        let (i, local) = self.locate(t);
        self.segments[i].eval(local)
    }

    /// The unit tangent at global parameter `t`.
    pub fn tangent(&self, t: f64) -> Vec2 {
        if self.segments.is_empty() {
            return Vec2::ZERO;
        }
        let (i, local) = self.locate(t);
        self.segments[i].tangent(local)
    }

    /// The unit normal at global parameter `t`.
    pub fn normal(&self, t: f64) -> Vec2 {
        self.tangent(t).turn_90()
    }

    /// The global parameter lying at arc length `length` from the start.
    ///
    /// Values at or below zero map to 0, values at or beyond the total
    /// length map to 1. Within a segment the inversion goes through the
    /// segment's lookup table, so evaluating the result lands at the
    /// requested arc length up to the table resolution.
    pub fn ratio_from_length(&self, length: f64) -> f64 {
        let total = self.length();
        // the negated comparison also routes NaN to the start
        if !(length > 0.0) || total <= 0.0 {
            return 0.0;
        }
        if length >= total {
            return 1.0;
        }
        let infos = self.infos();
        let i = infos
            .partition_point(|info| info.end_length <= length)
            .min(infos.len() - 1);
        let info = &infos[i];
        let local_t = self.segments[i].ratio_from_length(length - info.start_length);
        let start_ratio = info.start_length / total;
        let end_ratio = info.end_length / total;
        start_ratio + local_t * (end_ratio - start_ratio)
    }

    /// The sub-chain between global parameters `t0` and `t1`.
    ///
    /// The parameters may be given in either order; an empty range yields
    /// an empty open chain. The result is always an open chain.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::SplitOutOfRange`] when either parameter lies
    /// outside [0, 1] (including NaN). This is a caller contract
    /// violation rather than a geometric degeneracy, so it fails loudly
    /// instead of clamping.
    pub fn split(&self, t0: f64, t1: f64) -> Result<CurveChain, CurveError> {
        for t in [t0, t1] {
            if !(0.0..=1.0).contains(&t) {
                return Err(CurveError::SplitOutOfRange { t });
            }
        }
        let (mut t0, mut t1) = (t0, t1);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if self.segments.is_empty() || t0 == t1 {
            return Ok(CurveChain::new(Vec::new(), false));
        }
        let (i0, r0) = self.locate(t0);
        let (i1, r1) = self.locate(t1);
        let mut out = Vec::new();
        if i0 == i1 {
            out.push(self.segments[i0].subsegment(r0..r1));
        } else {
            if r0 < 1.0 {
                out.push(self.segments[i0].subsegment(r0..1.0));
            }
            out.extend(self.segments[i0 + 1..i1].iter().cloned());
            if r1 > 0.0 {
                out.push(self.segments[i1].subsegment(0.0..r1));
            }
        }
        Ok(CurveChain::new(out, false))
    }

    /// The sub-chain between arc lengths `l0` and `l1` from the start.
    ///
    /// Lengths outside the chain clamp to its ends, matching
    /// [`ratio_from_length`](CurveChain::ratio_from_length).
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::SplitOutOfRange`] when a length argument is
    /// NaN.
    pub fn split_by_length(&self, l0: f64, l1: f64) -> Result<CurveChain, CurveError> {
        for l in [l0, l1] {
            if l.is_nan() {
                return Err(CurveError::SplitOutOfRange { t: l });
            }
        }
        self.split(self.ratio_from_length(l0), self.ratio_from_length(l1))
    }

    /// Cut the chain into dash runs.
    ///
    /// `pattern` alternates drawn and skipped lengths, starting drawn, and
    /// repeats cyclically until the chain is exhausted. `offset` shifts
    /// the pattern start along the chain; a trailing drawn phase is
    /// truncated at the end of the chain rather than wrapped.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::EmptyDashPattern`] when the pattern is empty
    /// or has no positive entry.
    pub fn to_dashes(&self, pattern: &[f64], offset: f64) -> Result<Vec<CurveChain>, CurveError> {
        if pattern.is_empty() || !pattern.iter().any(|&d| d > 0.0) {
            return Err(CurveError::EmptyDashPattern);
        }
        let total = self.length();
        let mut out = Vec::new();
        let mut current = offset;
        let mut index = 0usize;
        while current < total {
            let len = pattern[index % pattern.len()];
            let drawn = index % 2 == 0;
            if drawn && len > 0.0 && current + len > 0.0 {
                let run = self.split_by_length(current, current + len)?;
                if !run.segments.is_empty() {
                    out.push(run);
                }
            }
            current += len;
            index += 1;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elbow() -> CurveChain {
        CurveChain::from_polyline(
            &[
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
            ],
            false,
        )
    }

    #[test]
    fn global_parameter_is_length_proportional() {
        let chain = elbow();
        assert!((chain.length() - 20.0).abs() < 1e-12);
        assert!(chain.eval(0.0).distance(Point::new(0.0, 0.0)) < 1e-12);
        assert!(chain.eval(0.25).distance(Point::new(5.0, 0.0)) < 1e-12);
        assert!(chain.eval(0.5).distance(Point::new(10.0, 0.0)) < 1e-12);
        assert!(chain.eval(0.75).distance(Point::new(10.0, 5.0)) < 1e-12);
        assert!(chain.eval(1.0).distance(Point::new(10.0, 10.0)) < 1e-12);
    }

    #[test]
    fn tangent_turns_at_the_corner() {
        let chain = elbow();
        assert!((chain.tangent(0.25) - Vec2::new(1.0, 0.0)).hypot() < 1e-12);
        assert!((chain.tangent(0.75) - Vec2::new(0.0, 1.0)).hypot() < 1e-12);
    }

    #[test]
    fn ratio_from_length_clamps_and_is_monotonic() {
        let chain = elbow();
        assert_eq!(chain.ratio_from_length(-3.0), 0.0);
        assert_eq!(chain.ratio_from_length(0.0), 0.0);
        assert_eq!(chain.ratio_from_length(20.0), 1.0);
        assert_eq!(chain.ratio_from_length(99.0), 1.0);
        let mut prev = 0.0;
        for n in 0..=40 {
            let t = chain.ratio_from_length(n as f64 * 0.5);
            assert!(t >= prev, "ratio must not decrease");
            prev = t;
        }
    }

    #[test]
    fn eval_at_ratio_lands_at_requested_length() {
        let chain = elbow();
        let t = chain.ratio_from_length(15.0);
        assert!(chain.eval(t).distance(Point::new(10.0, 5.0)) < 1e-6);
    }

    #[test]
    fn split_extracts_the_middle() {
        let chain = elbow();
        let mid = chain.split(0.25, 0.75).unwrap();
        assert!(!mid.is_closed());
        assert!((mid.length() - 10.0).abs() < 1e-9);
        assert!(mid.eval(0.0).distance(Point::new(5.0, 0.0)) < 1e-9);
        assert!(mid.eval(1.0).distance(Point::new(10.0, 5.0)) < 1e-9);
        // reversed arguments give the same piece
        assert_eq!(mid, chain.split(0.75, 0.25).unwrap());
        // an empty range gives an empty chain
        assert!(chain.split(0.5, 0.5).unwrap().segments().is_empty());
    }

    #[test]
    fn split_rejects_out_of_range_parameters() {
        let chain = elbow();
        assert_eq!(
            chain.split(-3.0, 7.0),
            Err(CurveError::SplitOutOfRange { t: -3.0 })
        );
        assert_eq!(
            chain.split(0.5, 1.5),
            Err(CurveError::SplitOutOfRange { t: 1.5 })
        );
        assert!(matches!(
            chain.split(f64::NAN, 0.5),
            Err(CurveError::SplitOutOfRange { t }) if t.is_nan()
        ));
        // the unit endpoints themselves are fine
        let whole = chain.split(0.0, 1.0).unwrap();
        assert!((whole.length() - chain.length()).abs() < 1e-9);
    }

    #[test]
    fn dashes_truncate_at_the_end() {
        let chain = CurveChain::from_polyline(
            &[Point::new(0.0, 0.0), Point::new(23.0, 0.0)],
            false,
        );
        let dashes = chain.to_dashes(&[5.0, 5.0], 0.0).unwrap();
        assert_eq!(dashes.len(), 3);
        let drawn: f64 = dashes.iter().map(CurveChain::length).sum();
        // runs are [0,5], [10,15] and the truncated [20,23]
        assert!((drawn - 13.0).abs() < 1e-9);
    }

    #[test]
    fn dash_offset_shifts_the_pattern() {
        let chain = CurveChain::from_polyline(
            &[Point::new(0.0, 0.0), Point::new(20.0, 0.0)],
            false,
        );
        let dashes = chain.to_dashes(&[5.0, 5.0], 2.0).unwrap();
        assert!(dashes[0].eval(0.0).distance(Point::new(2.0, 0.0)) < 1e-9);
    }

    #[test]
    fn degenerate_patterns_are_rejected() {
        let chain = elbow();
        assert_eq!(
            chain.to_dashes(&[], 0.0),
            Err(CurveError::EmptyDashPattern)
        );
        assert_eq!(
            chain.to_dashes(&[0.0, 0.0], 0.0),
            Err(CurveError::EmptyDashPattern)
        );
    }

    #[test]
    fn contiguity() {
        assert!(elbow().is_contiguous());
        let gap = CurveChain::new(
            vec![
                BezierSegment::linear(Point::new(0.0, 0.0), Point::new(5.0, 0.0)),
                BezierSegment::linear(Point::new(6.0, 0.0), Point::new(9.0, 0.0)),
            ],
            false,
        );
        assert!(!gap.is_contiguous());
    }

    #[test]
    fn closed_polyline_gets_a_closing_segment() {
        let square = CurveChain::from_polyline(
            &[
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ],
            true,
        );
        assert_eq!(square.segments().len(), 4);
        assert!(square.is_closed());
        assert!(square.is_contiguous());
        assert!((square.length() - 40.0).abs() < 1e-12);
    }
}
