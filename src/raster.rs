//! Scanline rasterization of filled paths.

use std::collections::HashMap;

use crate::{BezierSegment, Path, Point, Winding};

/// Fixed-point scale: 20 sub-units per coordinate unit.
///
/// All scanline arithmetic happens on integers at this scale, which keeps
/// edge ordering and crossing decisions exact and reproducible.
const SCALE: i64 = 20;

#[inline]
fn to_fixed(v: f64) -> i64 {
    (v * SCALE as f64) as i64
}

#[inline]
fn from_fixed(v: i64) -> f64 {
    v as f64 / SCALE as f64
}

/// A non-horizontal polygon edge in fixed-point space, normalized so the
/// first endpoint has the smaller y.
#[derive(Clone, Copy, Debug)]
struct Edge {
    ax: i64,
    ay: i64,
    by: i64,
    dx: i64,
    dy: i64,
    /// Fixed-point y-intercept, valid when `dx != 0`.
    h: i64,
    /// +1 when the original edge pointed toward increasing y, -1 when it
    /// was flipped during normalization.
    wind: i32,
}

impl Edge {
    /// Build a normalized edge, or `None` for degenerate and horizontal
    /// input. Horizontal edges never cross a scanline and are excluded
    /// from the crossing count entirely.
    fn new(a: (i64, i64), b: (i64, i64)) -> Option<Edge> {
        if a == b || a.1 == b.1 {
            return None;
        }
        let (a, b, wind) = if a.1 < b.1 { (a, b, 1) } else { (b, a, -1) };
        let dx = b.0 - a.0;
        let dy = b.1 - a.1;
        let h = if dx != 0 { a.1 - (a.0 * dy) / dx } else { 0 };
        Some(Edge {
            ax: a.0,
            ay: a.1,
            by: b.1,
            dx,
            dy,
            h,
            wind,
        })
    }

    /// Half-open in y: the top scanline is included, the bottom excluded,
    /// so shared vertices of adjacent edges count exactly once.
    #[inline]
    fn contains_y(&self, y: i64) -> bool {
        y >= self.ay && y < self.by
    }

    #[inline]
    fn intersect_x(&self, y: i64) -> i64 {
        if self.dx == 0 {
            self.ax
        } else {
            ((y - self.h) * self.dx) / self.dy
        }
    }
}

/// One tier of y-bucketed edge indices.
#[derive(Debug)]
struct Bucket {
    y_size: i64,
    map: HashMap<i64, Vec<usize>>,
}

impl Bucket {
    fn new(y_size: i64) -> Bucket {
        Bucket {
            y_size,
            map: HashMap::new(),
        }
    }

    #[inline]
    fn index(&self, y: i64) -> i64 {
        y.div_euclid(self.y_size)
    }

    fn span(&self, edge: &Edge) -> i64 {
        self.index(edge.by) - self.index(edge.ay)
    }

    fn add(&mut self, idx: usize, edge: &Edge) {
        for b in self.index(edge.ay)..=self.index(edge.by) {
            self.map.entry(b).or_default().push(idx);
        }
    }

    fn candidates(&self, y: i64) -> &[usize] {
        self.map
            .get(&self.index(y))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Small, medium and big bucket tiers.
///
/// Short edges land in fine buckets, long ones in coarse buckets, so a
/// scanline inspects one bucket per tier instead of every edge.
#[derive(Debug)]
struct Buckets {
    tiers: [Bucket; 3],
}

impl Buckets {
    fn new() -> Buckets {
        Buckets {
            tiers: [
                Bucket::new(4 * SCALE),
                Bucket::new(16 * SCALE),
                Bucket::new(64 * SCALE),
            ],
        }
    }

    fn add(&mut self, idx: usize, edge: &Edge) {
        for tier in &mut self.tiers {
            if tier.span(edge) < 4 {
                tier.add(idx, edge);
                return;
            }
        }
        // falls through only when even the big tier spans too much; the
        // big tier takes it regardless
        self.tiers[2].add(idx, edge);
    }
}

/// A scanline rasterizer over a filled [`Path`].
///
/// Construction flattens the path's curves into polygon edges at the
/// segment lookup-table resolution and indexes them by y. Every subpath
/// is treated as closed for filling, whether or not it was explicitly
/// closed.
#[derive(Debug)]
pub struct PathRasterizer {
    edges: Vec<Edge>,
    buckets: Buckets,
    winding: Winding,
}

impl PathRasterizer {
    /// Build a rasterizer for `path`, filling with the path's own
    /// winding rule.
    pub fn new(path: &Path) -> PathRasterizer {
        let mut raster = PathRasterizer {
            edges: Vec::new(),
            buckets: Buckets::new(),
            winding: path.winding(),
        };
        for chain in path.to_chains() {
            raster.add_polygon(&flatten_chain_segments(chain.segments()));
        }
        raster
    }

    fn add_polygon(&mut self, points: &[Point]) {
        if points.len() < 2 {
            return;
        }
        let fixed: Vec<(i64, i64)> = points
            .iter()
            .map(|p| (to_fixed(p.x), to_fixed(p.y)))
            .collect();
        for i in 0..fixed.len() {
            let a = fixed[i];
            let b = fixed[(i + 1) % fixed.len()];
            if let Some(edge) = Edge::new(a, b) {
                let idx = self.edges.len();
                self.edges.push(edge);
                self.buckets.add(idx, &edge);
            }
        }
    }

    /// The fill rule used by [`scanline`](PathRasterizer::scanline) and
    /// [`contains_point`](PathRasterizer::contains_point).
    #[inline]
    pub fn winding(&self) -> Winding {
        self.winding
    }

    fn scanline_fixed(&self, y: i64, winding: Winding) -> Vec<(i64, i64)> {
        let mut crossings: Vec<(i64, i32)> = Vec::new();
        for tier in &self.buckets.tiers {
            for &idx in tier.candidates(y) {
                let edge = &self.edges[idx];
                if edge.contains_y(y) {
                    crossings.push((edge.intersect_x(y), edge.wind));
                }
            }
        }
        crossings.sort_by_key(|&(x, _)| x);
        let mut spans: Vec<(i64, i64)> = Vec::new();
        match winding {
            Winding::EvenOdd => {
                for pair in crossings.chunks_exact(2) {
                    push_span(&mut spans, pair[0].0, pair[1].0);
                }
            }
            Winding::NonZero => {
                let mut count = 0;
                let mut start = 0;
                for &(x, wind) in &crossings {
                    let was_inside = count != 0;
                    count += wind;
                    if !was_inside && count != 0 {
                        start = x;
                    } else if was_inside && count == 0 {
                        push_span(&mut spans, start, x);
                    }
                }
            }
        }
        spans
    }

    /// The filled spans crossed by the horizontal line at `y`, as
    /// `(x_start, x_end)` pairs in increasing x.
    pub fn scanline(&self, y: f64) -> Vec<(f64, f64)> {
        self.scanline_with(y, self.winding)
    }

    /// Like [`scanline`](PathRasterizer::scanline) with an explicit fill
    /// rule.
    pub fn scanline_with(&self, y: f64, winding: Winding) -> Vec<(f64, f64)> {
        self.scanline_fixed(to_fixed(y), winding)
            .into_iter()
            .map(|(x0, x1)| (from_fixed(x0), from_fixed(x1)))
            .collect()
    }

    /// Whether the filled region contains `p` under the rasterizer's
    /// winding rule.
    pub fn contains_point(&self, p: Point) -> bool {
        self.contains_point_with(p, self.winding)
    }

    /// Like [`contains_point`](PathRasterizer::contains_point) with an
    /// explicit fill rule.
    pub fn contains_point_with(&self, p: Point, winding: Winding) -> bool {
        let x = to_fixed(p.x);
        self.scanline_fixed(to_fixed(p.y), winding)
            .iter()
            .any(|&(x0, x1)| x >= x0 && x <= x1)
    }
}

/// Merge spans that touch at the same x into one.
fn push_span(spans: &mut Vec<(i64, i64)>, x0: i64, x1: i64) {
    if let Some(last) = spans.last_mut() {
        if x0 <= last.1 {
            last.1 = last.1.max(x1);
            return;
        }
    }
    spans.push((x0, x1));
}

/// Flatten a chain's segments into a polygon vertex list.
fn flatten_chain_segments(segments: &[BezierSegment]) -> Vec<Point> {
    let mut points = Vec::new();
    for seg in segments {
        let sampled: &[Point] = if seg.order() == 1 {
            seg.points()
        } else {
            seg.lut().points()
        };
        let skip = usize::from(!points.is_empty());
        points.extend_from_slice(&sampled[skip.min(sampled.len())..]);
    }
    points
}

/// Whether the filled regions of two paths overlap.
///
/// This is a vertex-sampling approximation: it tests each path's
/// flattened outline vertices for containment in the other. Overlap whose
/// interior contains no vertex of either outline (such as two long thin
/// rectangles crossing) can be missed.
pub fn paths_intersect(a: &Path, b: &Path) -> bool {
    let ra = PathRasterizer::new(a);
    let rb = PathRasterizer::new(b);
    let vertices = |p: &Path| -> Vec<Point> {
        p.to_chains()
            .iter()
            .flat_map(|c| flatten_chain_segments(c.segments()))
            .collect()
    };
    vertices(a).iter().any(|&v| rb.contains_point(v))
        || vertices(b).iter().any(|&v| ra.contains_point(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rect;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64, winding: Winding) -> Path {
        let mut path = Path::with_winding(winding);
        path.rect(Rect::new(x0, y0, x1, y1));
        path
    }

    #[test]
    fn square_scanline_is_one_span() {
        let raster = PathRasterizer::new(&square(0.0, 0.0, 10.0, 10.0, Winding::EvenOdd));
        let spans = raster.scanline(5.0);
        assert_eq!(spans.len(), 1);
        let (x0, x1) = spans[0];
        assert!((x0 - 0.0).abs() < 0.1);
        assert!((x1 - 10.0).abs() < 0.1);
    }

    #[test]
    fn square_containment() {
        let raster = PathRasterizer::new(&square(0.0, 0.0, 10.0, 10.0, Winding::EvenOdd));
        assert!(raster.contains_point(Point::new(5.0, 5.0)));
        assert!(!raster.contains_point(Point::new(15.0, 5.0)));
        assert!(!raster.contains_point(Point::new(5.0, -1.0)));
    }

    #[test]
    fn bottom_edge_is_exclusive() {
        let raster = PathRasterizer::new(&square(0.0, 0.0, 10.0, 10.0, Winding::EvenOdd));
        assert!(raster.scanline(10.0).is_empty());
        assert!(!raster.scanline(0.0).is_empty());
    }

    #[test]
    fn winding_rules_disagree_on_nested_same_wound_squares() {
        // both subpaths wound the same direction
        let mut path = Path::with_winding(Winding::NonZero);
        path.rect(Rect::new(0.0, 0.0, 20.0, 20.0));
        path.rect(Rect::new(5.0, 5.0, 15.0, 15.0));
        let raster = PathRasterizer::new(&path);
        let center = Point::new(10.0, 10.0);
        assert!(raster.contains_point_with(center, Winding::NonZero));
        assert!(!raster.contains_point_with(center, Winding::EvenOdd));
        // the ring between the squares is inside under both rules
        let ring = Point::new(2.0, 10.0);
        assert!(raster.contains_point_with(ring, Winding::NonZero));
        assert!(raster.contains_point_with(ring, Winding::EvenOdd));
    }

    #[test]
    fn unclosed_subpath_fills_as_if_closed() {
        let mut path = Path::new();
        path.move_to(Point::new(0.0, 0.0));
        path.line_to(Point::new(10.0, 0.0));
        path.line_to(Point::new(10.0, 10.0));
        path.line_to(Point::new(0.0, 10.0));
        // no close()
        let raster = PathRasterizer::new(&path);
        assert!(raster.contains_point(Point::new(5.0, 5.0)));
    }

    #[test]
    fn curved_outline_containment() {
        let mut path = Path::new();
        path.move_to(Point::new(0.0, 0.0));
        path.curve_to(
            Point::new(30.0, 100.0),
            Point::new(70.0, 100.0),
            Point::new(100.0, 0.0),
        );
        path.close();
        let raster = PathRasterizer::new(&path);
        assert!(raster.contains_point(Point::new(50.0, 30.0)));
        assert!(!raster.contains_point(Point::new(50.0, 80.0)));
        assert!(!raster.contains_point(Point::new(-5.0, 30.0)));
    }

    #[test]
    fn overlap_queries() {
        let a = square(0.0, 0.0, 10.0, 10.0, Winding::EvenOdd);
        let b = square(5.0, 5.0, 15.0, 15.0, Winding::EvenOdd);
        let c = square(20.0, 20.0, 30.0, 30.0, Winding::EvenOdd);
        assert!(paths_intersect(&a, &b));
        assert!(!paths_intersect(&a, &c));
        // full containment counts as overlap
        let inner = square(2.0, 2.0, 8.0, 8.0, Winding::EvenOdd);
        assert!(paths_intersect(&a, &inner));
    }
}
