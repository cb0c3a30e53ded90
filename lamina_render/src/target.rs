// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, BezPath};
use lamina_core::backend::{ResourceFactory, ResourceKey};

/// A drawing surface.
///
/// Resource keys passed to the draw calls come from this target's own
/// [`ResourceFactory`] methods, realized lazily by the document cache.
/// Keys the cache drops are reported by
/// [`Document::take_retired`](lamina_core::Document::take_retired).
///
/// Calls nest: every `push_*` is matched by the corresponding `pop_*`
/// before the enclosing scope pops.
pub trait RenderTarget: ResourceFactory {
    /// Concatenates `transform` onto the current transform.
    fn push_transform(&mut self, transform: Affine);

    /// Restores the transform from before the matching push.
    fn pop_transform(&mut self);

    /// Starts an isolated layer composited with `opacity`, optionally
    /// clipped to `clip` (in the current coordinate space).
    fn push_layer(&mut self, opacity: f32, clip: Option<&BezPath>);

    /// Composites the layer started by the matching push.
    fn pop_layer(&mut self);

    /// Fills `path` with a realized brush.
    fn fill(&mut self, path: &BezPath, brush: ResourceKey);

    /// Strokes `path` with a realized pen.
    fn stroke(&mut self, path: &BezPath, pen: ResourceKey);

    /// Draws a laid-out text block at the current origin, painted with a
    /// realized brush when one is set.
    fn draw_text(&mut self, layout: ResourceKey, brush: Option<ResourceKey>);
}
