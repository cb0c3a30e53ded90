// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Kind-specific layer data.

use alloc::string::String;

use kurbo::{Size, Vec2};

use super::id::LayerId;
use crate::path::PathData;

/// An axis-aligned rectangle anchored at the layer origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectangleShape {
    /// Width and height.
    pub size: Size,
    /// Corner radius; zero for square corners.
    pub corner_radius: f64,
}

/// An ellipse centered on the layer origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EllipseShape {
    /// Horizontal and vertical radii.
    pub radii: Vec2,
}

/// A block of text laid out in a box anchored at the layer origin.
///
/// Shaping is performed by the backend; the core only knows the layout box.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    /// The text content.
    pub text: String,
    /// Font family name.
    pub font_family: String,
    /// Font size in layer units.
    pub font_size: f64,
    /// Layout box size.
    pub size: Size,
}

/// What a layer is.
///
/// Only [`Group`](Self::Group) holds children.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerKind {
    /// A container.
    Group,
    /// A (possibly rounded) rectangle.
    Rectangle(RectangleShape),
    /// An ellipse.
    Ellipse(EllipseShape),
    /// Arbitrary path geometry.
    Path(PathData),
    /// A text block.
    Text(TextBlock),
    /// Draws another layer with this layer's paint.
    ///
    /// The reference is weak: a clone of a destroyed layer draws nothing.
    Clone(LayerId),
}

impl LayerKind {
    /// Returns whether this kind can hold children.
    #[inline]
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Group)
    }

    /// Returns the clone target, if this is a clone.
    #[inline]
    #[must_use]
    pub const fn clone_target(&self) -> Option<LayerId> {
        match self {
            Self::Clone(target) => Some(*target),
            _ => None,
        }
    }

    /// Returns a short human-readable name for the kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Rectangle(_) => "rectangle",
            Self::Ellipse(_) => "ellipse",
            Self::Path(_) => "path",
            Self::Text(_) => "text",
            Self::Clone(_) => "clone",
        }
    }
}
