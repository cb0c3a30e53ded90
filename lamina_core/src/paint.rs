// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Brushes, pens, and the document swatch palette.
//!
//! These are device-independent descriptions. A rendering backend turns them
//! into realized resources through
//! [`ResourceFactory`](crate::backend::ResourceFactory); the cache holds the
//! resulting keys.

use alloc::vec::Vec;

use kurbo::{Cap, Join, Point};

/// A straight-alpha RGBA color with `f32` components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
    /// Alpha component.
    pub a: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    /// Creates a color from RGBA components.
    #[inline]
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from RGB components.
    #[inline]
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }
}

/// A color stop in a gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient in `0.0..=1.0`.
    pub offset: f32,
    /// Color at this position.
    pub color: Color,
}

/// How an area is painted.
#[derive(Clone, Debug, PartialEq)]
pub enum Brush {
    /// A single color.
    Solid(Color),
    /// A linear gradient between two points in layer space.
    LinearGradient {
        /// Gradient start point.
        start: Point,
        /// Gradient end point.
        end: Point,
        /// Color stops, sorted by offset.
        stops: Vec<GradientStop>,
    },
    /// A radial gradient in layer space.
    RadialGradient {
        /// Gradient center.
        center: Point,
        /// Gradient radius.
        radius: f64,
        /// Color stops, sorted by offset.
        stops: Vec<GradientStop>,
    },
}

impl Brush {
    /// Creates a solid brush.
    #[inline]
    #[must_use]
    pub const fn solid(color: Color) -> Self {
        Self::Solid(color)
    }
}

/// How an outline is painted.
#[derive(Clone, Debug, PartialEq)]
pub struct Pen {
    /// Paint along the outline.
    pub brush: Brush,
    /// Stroke width in layer units.
    pub width: f64,
    /// Corner style.
    pub join: Join,
    /// End-cap style for open figures.
    pub cap: Cap,
    /// Alternating dash and gap lengths; empty for a solid line.
    pub dashes: Vec<f64>,
}

impl Pen {
    /// Creates a solid pen with miter joins and butt caps.
    #[must_use]
    pub fn new(brush: Brush, width: f64) -> Self {
        Self {
            brush,
            width,
            join: Join::Miter,
            cap: Cap::Butt,
            dashes: Vec::new(),
        }
    }
}

/// The document's swatch palette.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Palette {
    /// Brush swatches.
    pub brushes: Vec<Brush>,
    /// Pen swatches.
    pub pens: Vec<Pen>,
}

impl Palette {
    /// Creates an empty palette.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            brushes: Vec::new(),
            pens: Vec::new(),
        }
    }
}
