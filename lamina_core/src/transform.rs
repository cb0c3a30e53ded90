// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform helpers.
//!
//! Kurbo composes column-vector style: `a * b` applies `b` first. A layer's
//! absolute transform is therefore `absolute(parent) * local(layer)`.

use kurbo::{Affine, Rect};

/// Determinants smaller than this are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Returns whether `affine` has a finite, non-zero determinant.
#[must_use]
pub fn is_invertible(affine: Affine) -> bool {
    let det = affine.determinant();
    det.is_finite() && det.abs() > SINGULAR_EPSILON
}

/// Maps the four corners of `rect` through `affine` and returns their
/// axis-aligned bounding box.
#[must_use]
pub fn map_bounds(rect: Rect, affine: Affine) -> Rect {
    affine.transform_rect_bbox(rect)
}

/// Computes a layer's new local transform for an edit expressed as a
/// layer-space `local` part and a document-space `global` part.
///
/// `world` is the absolute transform of the layer's parent. The result is
/// `world⁻¹ · global · world · current · local`, so `local` acts in the
/// layer's own coordinates while `global` acts in document coordinates.
/// When `world` is singular, `global` is applied in parent coordinates.
#[must_use]
pub fn compose_edit(current: Affine, world: Affine, local: Affine, global: Affine) -> Affine {
    if is_invertible(world) {
        world.inverse() * global * world * current * local
    } else {
        global * current * local
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Vec2};

    use super::*;

    fn approx(a: Affine, b: Affine) -> bool {
        a.as_coeffs()
            .iter()
            .zip(b.as_coeffs().iter())
            .all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn singular_detection() {
        assert!(is_invertible(Affine::scale(2.0)));
        assert!(!is_invertible(Affine::scale_non_uniform(1.0, 0.0)));
    }

    #[test]
    fn rotated_bounds_use_corners() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = map_bounds(r, Affine::rotate(core::f64::consts::FRAC_PI_4));
        let half_diag = 10.0 * core::f64::consts::SQRT_2 / 2.0;
        assert!((b.width() - 2.0 * half_diag).abs() < 1e-9);
        assert!((b.x0 + half_diag).abs() < 1e-9);
    }

    #[test]
    fn global_edit_acts_in_document_space() {
        // Parent translated by (100, 0); a document-space scale about the
        // origin must also scale the parent's offset.
        let world = Affine::translate(Vec2::new(100.0, 0.0));
        let next = compose_edit(Affine::IDENTITY, world, Affine::IDENTITY, Affine::scale(2.0));
        let absolute = world * next;
        let p = absolute * Point::new(1.0, 0.0);
        assert!((p - Point::new(202.0, 0.0)).hypot() < 1e-9, "got {p:?}");
    }

    #[test]
    fn local_edit_acts_in_layer_space() {
        let current = Affine::translate(Vec2::new(10.0, 0.0));
        let next = compose_edit(current, Affine::IDENTITY, Affine::scale(3.0), Affine::IDENTITY);
        assert!(approx(next, current * Affine::scale(3.0)));
    }

    #[test]
    fn singular_world_falls_back() {
        let world = Affine::scale_non_uniform(0.0, 1.0);
        let next = compose_edit(Affine::IDENTITY, world, Affine::IDENTITY, Affine::scale(2.0));
        assert!(approx(next, Affine::scale(2.0)));
    }
}
