//! Multi-contour vector paths.

use crate::{BezierSegment, CurveChain, Point, Rect};

/// The fill rule deciding which regions of a path are inside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Winding {
    /// A point is inside when a ray from it crosses the outline an odd
    /// number of times.
    EvenOdd,
    /// A point is inside when the signed crossing count of a ray from it
    /// is nonzero.
    #[default]
    NonZero,
}

/// One element of a path outline.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathEl {
    /// Start a new subpath at the point.
    MoveTo(Point),
    /// A straight line to the point.
    LineTo(Point),
    /// A quadratic segment through one control point.
    QuadTo(Point, Point),
    /// A cubic segment through two control points.
    CurveTo(Point, Point, Point),
    /// Close the current subpath back to its start.
    ClosePath,
}

/// A vector path built from move/line/quad/cubic elements, with a fill
/// rule.
///
/// The builder methods normalize as they go: a `move_to` directly after
/// another `move_to` replaces it, and a `line_to` to the current point is
/// dropped. Mutation happens through `&mut Path`; derived values such as
/// [`bounds`](Path::bounds) and [`to_chains`](Path::to_chains) are
/// computed from the element list on demand.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    elements: Vec<PathEl>,
    winding: Winding,
    current: Option<Point>,
    subpath_start: Option<Point>,
}

impl Path {
    /// An empty path with the default fill rule.
    pub fn new() -> Path {
        Path::default()
    }

    /// An empty path with the given fill rule.
    pub fn with_winding(winding: Winding) -> Path {
        Path {
            winding,
            ..Path::default()
        }
    }

    /// The fill rule.
    #[inline]
    pub fn winding(&self) -> Winding {
        self.winding
    }

    /// Change the fill rule.
    pub fn set_winding(&mut self, winding: Winding) {
        self.winding = winding;
    }

    /// The elements of the path.
    #[inline]
    pub fn elements(&self) -> &[PathEl] {
        &self.elements
    }

    /// Whether the path has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The point drawing continues from, if a subpath is in progress.
    #[inline]
    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    /// Start a new subpath at `p`.
    ///
    /// A `move_to` immediately after another `move_to` replaces it, so
    /// repositioning never leaves empty subpaths behind.
    pub fn move_to(&mut self, p: Point) {
        if let Some(PathEl::MoveTo(last)) = self.elements.last_mut() {
            *last = p;
        } else {
            self.elements.push(PathEl::MoveTo(p));
        }
        self.current = Some(p);
        self.subpath_start = Some(p);
    }

    /// A straight line from the current point to `p`.
    ///
    /// Without an open subpath this degrades to `move_to(p)`. A line to
    /// the exact current point is dropped.
    pub fn line_to(&mut self, p: Point) {
        match self.current {
            None => self.move_to(p),
            Some(cur) if cur == p => {}
            Some(_) => {
                self.elements.push(PathEl::LineTo(p));
                self.current = Some(p);
            }
        }
    }

    /// A quadratic segment from the current point to `p2` with control
    /// point `p1`.
    ///
    /// Without an open subpath this degrades to `move_to(p2)`.
    pub fn quad_to(&mut self, p1: Point, p2: Point) {
        if self.current.is_none() {
            self.move_to(p2);
            return;
        }
        self.elements.push(PathEl::QuadTo(p1, p2));
        self.current = Some(p2);
    }

    /// A cubic segment from the current point to `p3` with control points
    /// `p1` and `p2`.
    ///
    /// Without an open subpath this degrades to `move_to(p3)`.
    pub fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        if self.current.is_none() {
            self.move_to(p3);
            return;
        }
        self.elements.push(PathEl::CurveTo(p1, p2, p3));
        self.current = Some(p3);
    }

    /// Close the current subpath.
    ///
    /// The current point returns to the subpath start; further drawing
    /// commands begin a new subpath from there.
    pub fn close(&mut self) {
        if self.current.is_some() {
            self.elements.push(PathEl::ClosePath);
            self.current = self.subpath_start;
        }
    }

    /// Append a rectangle as its own closed subpath.
    pub fn rect(&mut self, r: Rect) {
        self.move_to(Point::new(r.x0, r.y0));
        self.line_to(Point::new(r.x1, r.y0));
        self.line_to(Point::new(r.x1, r.y1));
        self.line_to(Point::new(r.x0, r.y1));
        self.close();
    }

    /// Break the path into one [`CurveChain`] per subpath.
    ///
    /// A closed subpath whose last point does not coincide with its start
    /// gets an implicit closing line segment. Subpaths without any
    /// drawing commands are skipped.
    pub fn to_chains(&self) -> Vec<CurveChain> {
        let mut out = Vec::new();
        let mut segments: Vec<BezierSegment> = Vec::new();
        let mut start = Point::ZERO;
        let mut cur = Point::ZERO;
        let mut flush = |segments: &mut Vec<BezierSegment>, closed: bool| {
            if !segments.is_empty() {
                out.push(CurveChain::new(std::mem::take(segments), closed));
            }
        };
        for el in &self.elements {
            match *el {
                PathEl::MoveTo(p) => {
                    flush(&mut segments, false);
                    start = p;
                    cur = p;
                }
                PathEl::LineTo(p) => {
                    segments.push(BezierSegment::linear(cur, p));
                    cur = p;
                }
                PathEl::QuadTo(p1, p2) => {
                    segments.push(BezierSegment::quadratic(cur, p1, p2));
                    cur = p2;
                }
                PathEl::CurveTo(p1, p2, p3) => {
                    segments.push(BezierSegment::cubic(cur, p1, p2, p3));
                    cur = p3;
                }
                PathEl::ClosePath => {
                    if cur != start {
                        segments.push(BezierSegment::linear(cur, start));
                    }
                    flush(&mut segments, true);
                    cur = start;
                }
            }
        }
        flush(&mut segments, false);
        out
    }

    /// The bounding box of the path outline.
    pub fn bounds(&self) -> Rect {
        let chains = self.to_chains();
        match chains.split_first() {
            Some((first, rest)) => rest
                .iter()
                .fold(first.bounds(), |bb, chain| bb.union(chain.bounds())),
            None => Rect::ZERO,
        }
    }
}

impl Extend<PathEl> for Path {
    fn extend<T: IntoIterator<Item = PathEl>>(&mut self, iter: T) {
        for el in iter {
            match el {
                PathEl::MoveTo(p) => self.move_to(p),
                PathEl::LineTo(p) => self.line_to(p),
                PathEl::QuadTo(p1, p2) => self.quad_to(p1, p2),
                PathEl::CurveTo(p1, p2, p3) => self.curve_to(p1, p2, p3),
                PathEl::ClosePath => self.close(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_move_to_replaces() {
        let mut path = Path::new();
        path.move_to(Point::new(1.0, 1.0));
        path.move_to(Point::new(5.0, 5.0));
        assert_eq!(path.elements(), &[PathEl::MoveTo(Point::new(5.0, 5.0))]);
    }

    #[test]
    fn line_to_current_point_is_dropped() {
        let mut path = Path::new();
        path.move_to(Point::new(1.0, 1.0));
        path.line_to(Point::new(1.0, 1.0));
        assert_eq!(path.elements().len(), 1);
        path.line_to(Point::new(2.0, 1.0));
        assert_eq!(path.elements().len(), 2);
    }

    #[test]
    fn line_to_on_empty_path_degrades_to_move_to() {
        let mut path = Path::new();
        path.line_to(Point::new(3.0, 4.0));
        assert_eq!(path.elements(), &[PathEl::MoveTo(Point::new(3.0, 4.0))]);
    }

    #[test]
    fn close_adds_implicit_segment_in_chains() {
        let mut path = Path::new();
        path.move_to(Point::new(0.0, 0.0));
        path.line_to(Point::new(10.0, 0.0));
        path.line_to(Point::new(10.0, 10.0));
        path.close();
        let chains = path.to_chains();
        assert_eq!(chains.len(), 1);
        assert!(chains[0].is_closed());
        // two explicit lines plus the implicit closing one
        assert_eq!(chains[0].segments().len(), 3);
        assert!(chains[0].is_contiguous());
    }

    #[test]
    fn subpaths_become_separate_chains() {
        let mut path = Path::new();
        path.rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        path.move_to(Point::new(20.0, 0.0));
        path.line_to(Point::new(30.0, 10.0));
        let chains = path.to_chains();
        assert_eq!(chains.len(), 2);
        assert!(chains[0].is_closed());
        assert!(!chains[1].is_closed());
    }

    #[test]
    fn drawing_after_close_starts_at_the_subpath_start() {
        let mut path = Path::new();
        path.move_to(Point::new(0.0, 0.0));
        path.line_to(Point::new(10.0, 0.0));
        path.close();
        assert_eq!(path.current_point(), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn bounds_cover_curved_extrema() {
        let mut path = Path::new();
        path.move_to(Point::new(0.0, 0.0));
        path.curve_to(
            Point::new(30.0, 100.0),
            Point::new(70.0, 100.0),
            Point::new(100.0, 0.0),
        );
        let bb = path.bounds();
        assert!((bb.y1 - 75.0).abs() < 1e-9);
        assert!((bb.x1 - 100.0).abs() < 1e-9);
    }
}
