//! 2D vector-curve geometry engine.
//!
//! The trazo library contains the math that sits between authored vector
//! paths and a renderer: parametric Bezier segments of order one to three,
//! multi-segment curve chains with a seamless length-based parameter space,
//! curve/curve and curve/line intersection search, a fixed-point scanline
//! rasterizer with winding-rule fill semantics, and a stroke-to-fill
//! outliner with caps, joins and dashing.
//!
//! # Examples
//!
//! Evaluating a curve and querying its exact bounding box:
//! ```
//! use trazo::{BezierSegment, Point};
//!
//! let curve = BezierSegment::cubic(
//!     Point::new(0.0, 0.0),
//!     Point::new(30.0, 100.0),
//!     Point::new(70.0, 100.0),
//!     Point::new(100.0, 0.0),
//! );
//! assert_eq!(curve.eval(0.0), Point::new(0.0, 0.0));
//! assert_eq!(curve.eval(1.0), Point::new(100.0, 0.0));
//! let bb = curve.bounding_box();
//! assert!(bb.y1 <= 75.0 + 1e-9);
//! ```
//!
//! Filling a path with a winding rule:
//! ```
//! use trazo::{Path, PathRasterizer, Point, Winding};
//!
//! let mut path = Path::with_winding(Winding::EvenOdd);
//! path.move_to(Point::new(0.0, 0.0));
//! path.line_to(Point::new(10.0, 0.0));
//! path.line_to(Point::new(10.0, 10.0));
//! path.line_to(Point::new(0.0, 10.0));
//! path.close();
//! let raster = PathRasterizer::new(&path);
//! assert!(raster.contains_point(Point::new(5.0, 5.0)));
//! assert!(!raster.contains_point(Point::new(15.0, 5.0)));
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::doc_markdown, rustdoc::broken_intra_doc_links)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(unused_qualifications)]
#![allow(
    clippy::unreadable_literal,
    clippy::many_single_char_names,
    clippy::excessive_precision
)]

mod chain;
pub mod common;
mod error;
mod intersect;
mod lut;
mod path;
mod point;
mod raster;
mod rect;
mod segment;
mod stroke;
mod vec2;

pub use crate::chain::*;
pub use crate::error::*;
pub use crate::intersect::*;
pub use crate::lut::*;
pub use crate::path::*;
pub use crate::point::*;
pub use crate::raster::*;
pub use crate::rect::*;
pub use crate::segment::*;
pub use crate::stroke::*;
pub use crate::vec2::*;
