// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Traits the core needs from its external collaborators.
//!
//! The core never talks to a GPU, shapes text, or computes path booleans
//! itself. A backend hands out opaque [`ResourceKey`]s for brushes, pens, and
//! text layouts, and a geometry library implements [`GeometryCombiner`].

use core::fmt;

use kurbo::BezPath;

use crate::layer::TextBlock;
use crate::paint::{Brush, Pen};

/// An opaque handle to a backend-managed resource (brush, pen, text layout).
///
/// Keys are assigned by the backend and stored by the cache without
/// interpretation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey(pub u64);

impl fmt::Debug for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceKey({})", self.0)
    }
}

/// Creates realized device resources.
///
/// Implementations typically wrap a device context. Keys that the cache
/// replaces are reported through
/// [`Document::take_retired`](crate::document::Document::take_retired) so the
/// implementation can free them.
pub trait ResourceFactory {
    /// Realizes a brush.
    fn create_brush(&mut self, brush: &Brush) -> ResourceKey;

    /// Realizes a pen.
    fn create_pen(&mut self, pen: &Pen) -> ResourceKey;

    /// Shapes and lays out a text block.
    fn create_text_layout(&mut self, text: &TextBlock) -> ResourceKey;
}

/// A path boolean operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CombineMode {
    /// Area covered by either operand.
    Union,
    /// Area covered by both operands.
    Intersect,
    /// Area covered by exactly one operand.
    Xor,
    /// Area of the first operand not covered by the second.
    Exclude,
}

/// Computes path booleans.
pub trait GeometryCombiner {
    /// Combines two paths expressed in the same coordinate space.
    fn combine(&mut self, a: &BezPath, b: &BezPath, mode: CombineMode, tolerance: f64) -> BezPath;
}
