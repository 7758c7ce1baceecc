//! Sampled parameter/point/length lookup tables over one curve segment.

use crate::Point;

/// A lookup table of samples along a curve, mapping between the curve
/// parameter, the sampled point, and the cumulative chord length.
///
/// The table is intentionally approximate: queries binary-search for the
/// bracketing pair of samples and linearly interpolate within it, they do
/// not re-solve the curve between samples.
#[derive(Clone, Debug, Default)]
pub struct CurveLUT {
    ts: Vec<f64>,
    points: Vec<Point>,
    lengths: Vec<f64>,
}

/// An interpolated position on a curve, as estimated from a [`CurveLUT`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Estimation {
    /// The estimated point on the curve.
    pub point: Point,
    /// The estimated curve parameter.
    pub t: f64,
    /// The estimated arc length from the start of the curve.
    pub length: f64,
}

impl CurveLUT {
    /// Create an empty table with room for `capacity` samples.
    pub fn with_capacity(capacity: usize) -> CurveLUT {
        CurveLUT {
            ts: Vec::with_capacity(capacity),
            points: Vec::with_capacity(capacity),
            lengths: Vec::with_capacity(capacity),
        }
    }

    /// Append a sample at parameter `t`.
    ///
    /// Samples must be added in increasing parameter order; the cumulative
    /// length is accumulated from the chord to the previous sample.
    pub fn add(&mut self, t: f64, point: Point) {
        let length = match self.points.last() {
            Some(&prev) => self.lengths[self.lengths.len() - 1] + prev.distance(point),
            None => 0.0,
        };
        self.ts.push(t);
        self.points.push(point);
        self.lengths.push(length);
    }

    /// The number of samples in the table.
    pub fn len(&self) -> usize {
        self.ts.len()
    }

    /// Whether the table has no samples.
    pub fn is_empty(&self) -> bool {
        self.ts.is_empty()
    }

    /// The sampled points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The accumulated chord length over all samples.
    pub fn total_length(&self) -> f64 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    fn sample(&self, i: usize) -> Estimation {
        Estimation {
            point: self.points[i],
            t: self.ts[i],
            length: self.lengths[i],
        }
    }

    /// Interpolate between the bracketing samples of `value` in `keys`.
    fn estimate_in(&self, keys: &[f64], value: f64) -> Estimation {
        debug_assert!(!keys.is_empty(), "lut must contain samples");
        if value <= keys[0] {
            return self.sample(0);
        }
        let last = keys.len() - 1;
        if value >= keys[last] {
            return self.sample(last);
        }
        // index of the first sample strictly above `value`
        let hi = keys.partition_point(|&k| k <= value);
        let lo = hi - 1;
        let span = keys[hi] - keys[lo];
        let ratio = if span > 0.0 {
            (value - keys[lo]) / span
        } else {
            0.0
        };
        Estimation {
            point: self.points[lo].lerp(self.points[hi], ratio),
            t: self.ts[lo] + (self.ts[hi] - self.ts[lo]) * ratio,
            length: self.lengths[lo] + (self.lengths[hi] - self.lengths[lo]) * ratio,
        }
    }

    /// Estimate the position at curve parameter `t`.
    pub fn estimate_at_t(&self, t: f64) -> Estimation {
        self.estimate_in(&self.ts, t)
    }

    /// Estimate the position at arc length `length` from the curve start.
    pub fn estimate_at_length(&self, length: f64) -> Estimation {
        self.estimate_in(&self.lengths, length)
    }

    /// Resample the table at uniform *length* fractions.
    ///
    /// The resulting table has the same number of samples, but its index
    /// spacing corresponds to equal arc length rather than equal parameter
    /// steps, which is what even point spacing along a curved path needs.
    pub fn to_equidistant(&self) -> CurveLUT {
        let mut out = CurveLUT::with_capacity(self.len());
        if self.is_empty() {
            return out;
        }
        let total = self.total_length();
        let steps = self.len() - 1;
        for n in 0..=steps {
            let target = if steps == 0 {
                0.0
            } else {
                total * (n as f64) / (steps as f64)
            };
            let est = self.estimate_at_length(target);
            out.add(est.t, est.point);
        }
        out
    }

    /// The recorded sample closest to `point`.
    ///
    /// This is a nearest-sample query, not a projection onto the exact
    /// curve; its resolution is the table's sampling density.
    pub fn closest(&self, point: Point) -> Option<Estimation> {
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in self.points.iter().enumerate() {
            let d = p.distance_squared(point);
            if best.map(|(_, bd)| d < bd).unwrap_or(true) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| self.sample(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_lut() -> CurveLUT {
        // uniform samples along the segment (0,0)..(10,0)
        let mut lut = CurveLUT::with_capacity(11);
        for n in 0..=10 {
            let t = n as f64 / 10.0;
            lut.add(t, Point::new(t * 10.0, 0.0));
        }
        lut
    }

    #[test]
    fn estimate_at_t_interpolates() {
        let lut = straight_lut();
        let est = lut.estimate_at_t(0.25);
        assert!((est.point.x - 2.5).abs() < 1e-12);
        assert!((est.length - 2.5).abs() < 1e-12);
    }

    #[test]
    fn estimate_at_length_clamps() {
        let lut = straight_lut();
        assert_eq!(lut.estimate_at_length(-5.0).t, 0.0);
        assert_eq!(lut.estimate_at_length(100.0).t, 1.0);
        let est = lut.estimate_at_length(7.5);
        assert!((est.t - 0.75).abs() < 1e-12);
    }

    #[test]
    fn equidistant_has_uniform_length_spacing() {
        // a parabolic arc has non-uniform chord spacing per parameter step
        let mut lut = CurveLUT::with_capacity(101);
        for n in 0..=100 {
            let t = n as f64 / 100.0;
            lut.add(t, Point::new(t * 10.0, t * t * 10.0));
        }
        let equi = lut.to_equidistant();
        let step = equi.total_length() / 100.0;
        for i in 1..equi.len() {
            let d = equi.lengths[i] - equi.lengths[i - 1];
            assert!((d - step).abs() < step * 0.25, "uneven spacing at {i}");
        }
    }

    #[test]
    fn closest_picks_nearest_sample() {
        let lut = straight_lut();
        let est = lut.closest(Point::new(3.1, 4.0)).unwrap();
        assert!((est.point.x - 3.0).abs() < 1e-12);
    }
}
