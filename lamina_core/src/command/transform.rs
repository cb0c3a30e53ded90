// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use kurbo::Affine;

use super::{check_targets, same_set};
use crate::document::Document;
use crate::error::{CommandError, StructureError};
use crate::layer::LayerId;
use crate::transform::is_invertible;

/// Applies a layer-space and a document-space transform to a set of layers.
///
/// See [`Document::apply_transform`] for how the two parts compose. Revert
/// restores the captured local transforms exactly rather than applying
/// inverses.
#[derive(Clone, Debug)]
pub struct TransformLayers {
    layers: Vec<LayerId>,
    local: Affine,
    global: Affine,
    original: Vec<Affine>,
}

impl TransformLayers {
    /// Transforms `layers`; a missing part is the identity.
    #[must_use]
    pub fn new(layers: Vec<LayerId>, local: Option<Affine>, global: Option<Affine>) -> Self {
        Self {
            layers,
            local: local.unwrap_or(Affine::IDENTITY),
            global: global.unwrap_or(Affine::IDENTITY),
            original: Vec::new(),
        }
    }

    /// Returns the layers being transformed.
    #[must_use]
    pub fn layers(&self) -> &[LayerId] {
        &self.layers
    }

    /// Returns the layer-space part.
    #[must_use]
    pub fn local(&self) -> Affine {
        self.local
    }

    /// Returns the document-space part.
    #[must_use]
    pub fn global(&self) -> Affine {
        self.global
    }

    pub(super) fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        check_targets(&self.layers)?;
        if self.layers.contains(&doc.root()) {
            return Err(StructureError::RootImmutable.into());
        }
        if !is_invertible(self.local) || !is_invertible(self.global) {
            return Err(CommandError::NotInvertible);
        }
        self.original = self
            .layers
            .iter()
            .map(|&layer| doc.store().local_transform(layer))
            .collect();
        for &layer in &self.layers {
            doc.apply_transform(layer, Some(self.local), Some(self.global))?;
        }
        Ok(())
    }

    pub(super) fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        for (&layer, &original) in self.layers.iter().zip(&self.original).rev() {
            doc.set_transform(layer, original)?;
        }
        Ok(())
    }

    /// Layer-space parts chain on the right, document-space parts on the left.
    pub(super) fn merge(&self, newer: &Self) -> Option<Self> {
        if !same_set(&self.layers, &newer.layers) {
            return None;
        }
        Some(Self {
            layers: self.layers.clone(),
            local: self.local * newer.local,
            global: newer.global * self.global,
            original: self.original.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::{Rect, Size, Vec2};

    use super::*;
    use crate::command::Command;
    use crate::layer::{LayerKind, RectangleShape};

    #[test]
    fn singular_transform_is_rejected() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let a = doc.create_layer(LayerKind::Group);
        let mut cmd = Command::from(TransformLayers::new(
            vec![a],
            Some(Affine::scale_non_uniform(1.0, 0.0)),
            None,
        ));
        assert_eq!(cmd.apply(&mut doc), Err(CommandError::NotInvertible));
        assert_eq!(doc.store().local_transform(a), Affine::IDENTITY);
    }

    #[test]
    fn revert_restores_exact_locals() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let root = doc.root();
        let a = doc.create_layer(LayerKind::Rectangle(RectangleShape {
            size: Size::new(3.0, 3.0),
            corner_radius: 0.0,
        }));
        doc.add(root, a, None).unwrap();
        let start = Affine::rotate(0.3).then_translate(Vec2::new(1.0, 2.0));
        doc.set_transform(a, start).unwrap();

        let mut cmd = Command::from(TransformLayers::new(
            vec![a],
            Some(Affine::scale(1.7)),
            Some(Affine::rotate(1.1)),
        ));
        cmd.apply(&mut doc).unwrap();
        assert_ne!(doc.store().local_transform(a), start);
        cmd.revert(&mut doc).unwrap();
        assert_eq!(doc.store().local_transform(a), start, "bit-exact revert");
    }

    #[test]
    fn root_cannot_be_transformed() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let root = doc.root();
        let mut cmd = Command::from(TransformLayers::new(
            vec![root],
            None,
            Some(Affine::scale(2.0)),
        ));
        assert_eq!(
            cmd.apply(&mut doc),
            Err(CommandError::Structure(StructureError::RootImmutable))
        );
        assert_eq!(
            doc.absolute_transform(root),
            Affine::IDENTITY,
            "root stays at the identity"
        );
    }

    #[test]
    fn merge_composes_parts() {
        let a_local = Affine::scale(2.0);
        let b_local = Affine::translate(Vec2::new(1.0, 0.0));
        let a_global = Affine::rotate(0.5);
        let b_global = Affine::translate(Vec2::new(0.0, 3.0));
        let mut doc = Document::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let id = doc.create_layer(LayerKind::Group);
        let first = TransformLayers::new(vec![id], Some(a_local), Some(a_global));
        let second = TransformLayers::new(vec![id], Some(b_local), Some(b_global));
        let merged = first.merge(&second).unwrap();
        assert_eq!(merged.local(), a_local * b_local);
        assert_eq!(merged.global(), b_global * a_global);
    }
}
