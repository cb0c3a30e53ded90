// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use super::{check_targets, same_set};
use crate::document::Document;
use crate::error::CommandError;
use crate::layer::{LayerId, LayerKind, TextBlock};
use crate::paint::{Brush, Pen};

/// Replaces the content of a text layer.
///
/// Consecutive edits of the same layer merge, so a burst of keystrokes
/// undoes in one step.
#[derive(Clone, Debug)]
pub struct ModifyText {
    layer: LayerId,
    text: TextBlock,
    previous: Option<TextBlock>,
}

impl ModifyText {
    /// Sets `layer`'s text block to `text`.
    #[must_use]
    pub fn new(layer: LayerId, text: TextBlock) -> Self {
        Self {
            layer,
            text,
            previous: None,
        }
    }

    /// Returns the text layer.
    #[must_use]
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Returns the text block being installed.
    #[must_use]
    pub fn text(&self) -> &TextBlock {
        &self.text
    }

    pub(super) fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        let LayerKind::Text(current) = doc.store().kind(self.layer) else {
            return Err(CommandError::KindMismatch(self.layer));
        };
        self.previous = Some(current.clone());
        doc.set_kind(self.layer, LayerKind::Text(self.text.clone()))?;
        Ok(())
    }

    pub(super) fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        if let Some(previous) = self.previous.clone() {
            doc.set_kind(self.layer, LayerKind::Text(previous))?;
        }
        Ok(())
    }

    pub(super) fn merge(&self, newer: &Self) -> Option<Self> {
        (self.layer == newer.layer).then(|| Self {
            layer: self.layer,
            text: newer.text.clone(),
            previous: self.previous.clone(),
        })
    }
}

/// Changes the fill and/or stroke of a set of layers.
///
/// `None` leaves that paint untouched; `Some(None)` clears it.
#[derive(Clone, Debug)]
pub struct ModifyPaint {
    layers: Vec<LayerId>,
    fill: Option<Option<Brush>>,
    stroke: Option<Option<Pen>>,
    previous: Vec<(Option<Brush>, Option<Pen>)>,
}

impl ModifyPaint {
    /// Changes both paints.
    #[must_use]
    pub fn new(
        layers: Vec<LayerId>,
        fill: Option<Option<Brush>>,
        stroke: Option<Option<Pen>>,
    ) -> Self {
        Self {
            layers,
            fill,
            stroke,
            previous: Vec::new(),
        }
    }

    /// Changes only the fill.
    #[must_use]
    pub fn fill(layers: Vec<LayerId>, fill: Option<Brush>) -> Self {
        Self::new(layers, Some(fill), None)
    }

    /// Changes only the stroke.
    #[must_use]
    pub fn stroke(layers: Vec<LayerId>, stroke: Option<Pen>) -> Self {
        Self::new(layers, None, Some(stroke))
    }

    /// Returns the target layers.
    #[must_use]
    pub fn layers(&self) -> &[LayerId] {
        &self.layers
    }

    pub(super) fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        check_targets(&self.layers)?;
        self.previous = self
            .layers
            .iter()
            .map(|&layer| {
                (
                    doc.store().fill(layer).cloned(),
                    doc.store().stroke(layer).cloned(),
                )
            })
            .collect();
        for &layer in &self.layers {
            if let Some(fill) = &self.fill {
                doc.set_fill(layer, fill.clone());
            }
            if let Some(stroke) = &self.stroke {
                doc.set_stroke(layer, stroke.clone());
            }
        }
        Ok(())
    }

    pub(super) fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        for (&layer, (fill, stroke)) in self.layers.iter().zip(&self.previous) {
            if self.fill.is_some() {
                doc.set_fill(layer, fill.clone());
            }
            if self.stroke.is_some() {
                doc.set_stroke(layer, stroke.clone());
            }
        }
        Ok(())
    }

    /// The newer change wins for each paint it touches.
    pub(super) fn merge(&self, newer: &Self) -> Option<Self> {
        if !same_set(&self.layers, &newer.layers) {
            return None;
        }
        Some(Self {
            layers: self.layers.clone(),
            fill: newer.fill.clone().or_else(|| self.fill.clone()),
            stroke: newer.stroke.clone().or_else(|| self.stroke.clone()),
            previous: self.previous.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;

    use kurbo::{Rect, Size};

    use super::*;
    use crate::command::Command;
    use crate::paint::Color;

    fn text(s: &str) -> TextBlock {
        TextBlock {
            text: String::from(s),
            font_family: String::from("Sans"),
            font_size: 12.0,
            size: Size::new(50.0, 14.0),
        }
    }

    #[test]
    fn text_edit_round_trips() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let t = doc.create_layer(LayerKind::Text(text("a")));
        let mut cmd = Command::from(ModifyText::new(t, text("ab")));
        cmd.apply(&mut doc).unwrap();
        assert_eq!(doc.store().kind(t), &LayerKind::Text(text("ab")));
        cmd.revert(&mut doc).unwrap();
        assert_eq!(doc.store().kind(t), &LayerKind::Text(text("a")));
    }

    #[test]
    fn text_edit_needs_text_layer() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let g = doc.create_layer(LayerKind::Group);
        let mut cmd = Command::from(ModifyText::new(g, text("x")));
        assert_eq!(cmd.apply(&mut doc), Err(CommandError::KindMismatch(g)));
    }

    #[test]
    fn paint_revert_touches_only_changed_paint() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let a = doc.create_layer(LayerKind::Group);
        let red = Brush::solid(Color::rgb(1.0, 0.0, 0.0));
        let pen = Pen::new(Brush::solid(Color::BLACK), 1.0);
        doc.set_stroke(a, Some(pen.clone()));

        let mut cmd = Command::from(ModifyPaint::fill(vec![a], Some(red.clone())));
        cmd.apply(&mut doc).unwrap();
        assert_eq!(doc.store().fill(a), Some(&red));
        assert_eq!(doc.store().stroke(a), Some(&pen));
        cmd.revert(&mut doc).unwrap();
        assert_eq!(doc.store().fill(a), None);
        assert_eq!(doc.store().stroke(a), Some(&pen));
    }

    #[test]
    fn paint_merge_prefers_newer() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let a = doc.create_layer(LayerKind::Group);
        let red = Brush::solid(Color::rgb(1.0, 0.0, 0.0));
        let blue = Brush::solid(Color::rgb(0.0, 0.0, 1.0));
        let pen = Pen::new(Brush::solid(Color::BLACK), 1.0);
        let first = ModifyPaint::new(vec![a], Some(Some(red)), Some(Some(pen.clone())));
        let second = ModifyPaint::fill(vec![a], Some(blue.clone()));
        let merged = first.merge(&second).unwrap();
        assert_eq!(merged.fill, Some(Some(blue)));
        assert_eq!(merged.stroke, Some(Some(pen)));
    }
}
