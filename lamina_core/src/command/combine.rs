// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use kurbo::BezPath;

use super::{detach_all, replacement_slot, restore_all, sibling_placements};
use crate::backend::{CombineMode, GeometryCombiner};
use crate::document::{Document, Placement};
use crate::error::{CommandError, StructureError};
use crate::layer::{LayerId, LayerKind};
use crate::path::PathData;

/// Replaces sibling shapes with one path layer holding their boolean
/// combination.
///
/// The boolean is computed once, at construction, in the operands' parent
/// space. Operands are folded bottom first, so for [`CombineMode::Exclude`]
/// the bottom operand is the base that the others cut into. The result takes
/// the bottom operand's fill and stroke.
#[derive(Clone, Debug)]
pub struct CombinePaths {
    operands: Vec<LayerId>,
    mode: CombineMode,
    result: LayerId,
    removed: Vec<(LayerId, Placement)>,
}

impl CombinePaths {
    /// Computes the combination and creates the (detached) result layer.
    ///
    /// # Errors
    ///
    /// Fails without modifying the document if there are fewer than two
    /// operands, if they do not share a parent, or if one has no geometry.
    pub fn new<C: GeometryCombiner + ?Sized>(
        doc: &mut Document,
        operands: Vec<LayerId>,
        mode: CombineMode,
        combiner: &mut C,
    ) -> Result<Self, CommandError> {
        if operands.len() < 2 {
            return Err(CommandError::TooFewOperands);
        }
        let placed = sibling_placements(doc, &operands)?;
        let tolerance = doc.cache_config().tolerance;

        let mut combined: Option<BezPath> = None;
        for &(layer, _) in &placed {
            let local = doc.store().local_transform(layer);
            let mut path = doc
                .geometry(layer)
                .cloned()
                .ok_or(CommandError::MissingGeometry(layer))?;
            path.apply_affine(local);
            combined = Some(match combined {
                None => path,
                Some(acc) => combiner.combine(&acc, &path, mode, tolerance),
            });
        }
        let combined = combined.unwrap_or_default();

        let bottom = placed[0].0;
        let fill = doc.store().fill(bottom).cloned();
        let stroke = doc.store().stroke(bottom).cloned();
        let result = doc.create_layer(LayerKind::Path(PathData::from_bez_path(&combined)));
        doc.set_name(result, mode_label(mode));
        doc.set_fill(result, fill);
        doc.set_stroke(result, stroke);
        log::debug!(
            "combined {} operands with {mode:?} into {result:?}",
            operands.len()
        );

        Ok(Self {
            operands,
            mode,
            result,
            removed: Vec::new(),
        })
    }

    /// Returns the operand layers.
    #[must_use]
    pub fn operands(&self) -> &[LayerId] {
        &self.operands
    }

    /// Returns the boolean mode.
    #[must_use]
    pub fn mode(&self) -> CombineMode {
        self.mode
    }

    /// Returns the path layer this command inserts.
    #[must_use]
    pub fn result(&self) -> LayerId {
        self.result
    }

    pub(super) fn description(&self) -> &'static str {
        mode_label(self.mode)
    }

    pub(super) fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        let placed = sibling_placements(doc, &self.operands)?;
        if doc.parent(self.result).is_some() {
            return Err(StructureError::AlreadyParented(self.result).into());
        }
        let parent = placed[0].1.parent;
        let slot = replacement_slot(&placed);
        detach_all(doc, &placed)?;
        doc.add(parent, self.result, Some(slot))?;
        self.removed = placed;
        Ok(())
    }

    pub(super) fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        doc.remove(self.result)?;
        restore_all(doc, &self.removed)
    }
}

fn mode_label(mode: CombineMode) -> &'static str {
    match mode {
        CombineMode::Union => "Union",
        CombineMode::Intersect => "Intersect",
        CombineMode::Xor => "Exclusive Or",
        CombineMode::Exclude => "Exclude",
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::{Affine, Rect, Size, Vec2};

    use super::*;
    use crate::command::Command;
    use crate::layer::RectangleShape;
    use crate::paint::{Brush, Color};

    /// Concatenates operands and records the calls it sees.
    #[derive(Default)]
    struct Concat {
        calls: Vec<CombineMode>,
    }

    impl GeometryCombiner for Concat {
        fn combine(
            &mut self,
            a: &BezPath,
            b: &BezPath,
            mode: CombineMode,
            _tolerance: f64,
        ) -> BezPath {
            self.calls.push(mode);
            let mut out = a.clone();
            out.extend(b.elements().iter().copied());
            out
        }
    }

    fn square(doc: &mut Document, at: Vec2) -> LayerId {
        let id = doc.create_layer(LayerKind::Rectangle(RectangleShape {
            size: Size::new(10.0, 10.0),
            corner_radius: 0.0,
        }));
        doc.set_transform(id, Affine::translate(at)).unwrap();
        let root = doc.root();
        doc.add(root, id, None).unwrap();
        id
    }

    #[test]
    fn combine_replaces_operands() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let root = doc.root();
        let a = square(&mut doc, Vec2::ZERO);
        let b = square(&mut doc, Vec2::new(20.0, 0.0));
        let c = square(&mut doc, Vec2::new(40.0, 0.0));
        doc.set_fill(a, Some(Brush::solid(Color::BLACK)));

        let mut combiner = Concat::default();
        let op = CombinePaths::new(&mut doc, vec![b, a], CombineMode::Union, &mut combiner)
            .unwrap();
        assert_eq!(combiner.calls, vec![CombineMode::Union], "one fold step");
        let result = op.result();
        assert_eq!(
            doc.store().fill(result),
            Some(&Brush::solid(Color::BLACK)),
            "paint comes from the bottom operand"
        );

        let mut cmd = Command::from(op);
        cmd.apply(&mut doc).unwrap();
        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![result, c]);
        let bounds = doc.bounds(result).unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 30.0, 10.0));

        cmd.revert(&mut doc).unwrap();
        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![a, b, c]);
    }

    #[test]
    fn operands_need_geometry() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let root = doc.root();
        let a = square(&mut doc, Vec2::ZERO);
        let g = doc.create_layer(LayerKind::Group);
        doc.add(root, g, None).unwrap();
        let before = doc.store().len();
        let err = CombinePaths::new(&mut doc, vec![a, g], CombineMode::Xor, &mut Concat::default())
            .unwrap_err();
        assert_eq!(err, CommandError::MissingGeometry(g));
        assert_eq!(doc.store().len(), before, "no result layer on failure");
    }

    #[test]
    fn single_operand_is_rejected() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let a = square(&mut doc, Vec2::ZERO);
        let err = CombinePaths::new(&mut doc, vec![a], CombineMode::Union, &mut Concat::default())
            .unwrap_err();
        assert_eq!(err, CommandError::TooFewOperands);
    }
}
