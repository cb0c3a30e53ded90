// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document traversal that drives a [`RenderTarget`].

use alloc::vec::Vec;

use kurbo::{Affine, BezPath};
use lamina_core::Document;
use lamina_core::layer::{LayerId, LayerKind};
use lamina_core::transform::is_invertible;

use crate::target::RenderTarget;

/// Counts of what one [`render`] call drew.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Visible layers visited (clone targets count again per clone).
    pub layers: usize,
    /// Fill calls issued.
    pub fills: usize,
    /// Stroke calls issued.
    pub strokes: usize,
    /// Text blocks drawn.
    pub texts: usize,
    /// Clones skipped because their target was already being drawn through
    /// a clone further up the stack.
    pub skipped_clones: usize,
}

/// Draws `doc` onto `target`, bottom layer first.
///
/// For every visible layer the walker pushes its local transform, wraps the
/// content in an isolated layer when it has partial opacity or a clip, and
/// then draws it: groups recurse into their children bottom to top, shapes
/// issue a fill then a stroke, text draws its layout, and clones draw their
/// target's content with the clone's paint substituted in.
pub fn render<T: RenderTarget + ?Sized>(doc: &mut Document, target: &mut T) -> RenderStats {
    let mut stats = RenderStats::default();
    let root = doc.root();
    draw_layer(doc, target, root, &mut stats);
    log::trace!("rendered {stats:?}");
    stats
}

fn draw_layer<T: RenderTarget + ?Sized>(
    doc: &mut Document,
    target: &mut T,
    id: LayerId,
    stats: &mut RenderStats,
) {
    if doc.store().flags(id).hidden {
        return;
    }
    stats.layers += 1;
    target.push_transform(doc.store().local_transform(id));

    let opacity = doc.store().opacity(id);
    let clip = clip_path(doc, id);
    let isolated = opacity < 1.0 || clip.is_some();
    if isolated {
        target.push_layer(opacity, clip.as_ref());
    }

    draw_content(doc, target, id, stats);

    if isolated {
        target.pop_layer();
    }
    target.pop_transform();
}

fn draw_content<T: RenderTarget + ?Sized>(
    doc: &mut Document,
    target: &mut T,
    id: LayerId,
    stats: &mut RenderStats,
) {
    match doc.store().kind(id) {
        LayerKind::Group => {
            let children: Vec<_> = doc.children(id).collect();
            for child in children {
                draw_layer(doc, target, child, stats);
            }
        }
        LayerKind::Clone(source) => {
            let source = *source;
            if !doc.is_alive(source) {
                return;
            }
            let fill = doc.store().fill(id).cloned();
            let stroke = doc.store().stroke(id).cloned();
            let drawn = doc.with_substituted_paint(source, fill, stroke, |doc| {
                stats.layers += 1;
                draw_content(doc, target, source, stats);
            });
            if drawn.is_none() {
                stats.skipped_clones += 1;
            }
        }
        LayerKind::Text(_) => {
            let brush = doc.fill(id, target);
            if let Some(layout) = doc.text_layout(id, target) {
                target.draw_text(layout, brush);
                stats.texts += 1;
            }
        }
        LayerKind::Rectangle(_) | LayerKind::Ellipse(_) | LayerKind::Path(_) => {
            let brush = doc.fill(id, target);
            let pen = doc.stroke(id, target);
            let Some(path) = doc.geometry(id) else {
                return;
            };
            if let Some(brush) = brush {
                target.fill(path, brush);
                stats.fills += 1;
            }
            if let Some(pen) = pen {
                target.stroke(path, pen);
                stats.strokes += 1;
            }
        }
    }
}

/// The clip layer's outline expressed in `id`'s coordinate space.
fn clip_path(doc: &mut Document, id: LayerId) -> Option<BezPath> {
    let clip = doc.store().clip(id)?;
    if !doc.is_alive(clip) {
        return None;
    }
    let own = doc.absolute_transform(id);
    if !is_invertible(own) {
        return None;
    }
    let into_own: Affine = own.inverse() * doc.absolute_transform(clip);
    let mut path = doc.geometry(clip)?.clone();
    path.apply_affine(into_own);
    Some(path)
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;

    use kurbo::{Rect, Size, Vec2};
    use lamina_core::backend::{ResourceFactory, ResourceKey};
    use lamina_core::layer::{RectangleShape, TextBlock};
    use lamina_core::paint::{Brush, Color, Pen};

    use super::*;

    #[derive(Debug, PartialEq)]
    enum Call {
        PushTransform(Affine),
        PopTransform,
        PushLayer(f32, bool),
        PopLayer,
        Fill(ResourceKey),
        Stroke(ResourceKey),
        Text(ResourceKey),
    }

    /// Records calls and realizes brushes by remembering them.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
        brushes: Vec<Brush>,
        next: u64,
    }

    impl Recorder {
        fn key(&mut self) -> ResourceKey {
            self.next += 1;
            ResourceKey(self.next)
        }

        fn fills(&self) -> Vec<&Brush> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    Call::Fill(key) => Some(&self.brushes[key.0 as usize - 1]),
                    _ => None,
                })
                .collect()
        }
    }

    impl ResourceFactory for Recorder {
        fn create_brush(&mut self, brush: &Brush) -> ResourceKey {
            self.brushes.push(brush.clone());
            let key = self.key();
            assert_eq!(key.0 as usize, self.brushes.len(), "brush keys index brushes");
            key
        }

        fn create_pen(&mut self, pen: &Pen) -> ResourceKey {
            self.create_brush(&pen.brush)
        }

        fn create_text_layout(&mut self, _text: &TextBlock) -> ResourceKey {
            self.brushes.push(Brush::solid(Color::TRANSPARENT));
            self.key()
        }
    }

    impl RenderTarget for Recorder {
        fn push_transform(&mut self, transform: Affine) {
            self.calls.push(Call::PushTransform(transform));
        }

        fn pop_transform(&mut self) {
            self.calls.push(Call::PopTransform);
        }

        fn push_layer(&mut self, opacity: f32, clip: Option<&BezPath>) {
            self.calls.push(Call::PushLayer(opacity, clip.is_some()));
        }

        fn pop_layer(&mut self) {
            self.calls.push(Call::PopLayer);
        }

        fn fill(&mut self, _path: &BezPath, brush: ResourceKey) {
            self.calls.push(Call::Fill(brush));
        }

        fn stroke(&mut self, _path: &BezPath, pen: ResourceKey) {
            self.calls.push(Call::Stroke(pen));
        }

        fn draw_text(&mut self, layout: ResourceKey, _brush: Option<ResourceKey>) {
            self.calls.push(Call::Text(layout));
        }
    }

    fn square(doc: &mut Document) -> LayerId {
        doc.create_layer(LayerKind::Rectangle(RectangleShape {
            size: Size::new(10.0, 10.0),
            corner_radius: 0.0,
        }))
    }

    fn red() -> Brush {
        Brush::solid(Color::rgb(1.0, 0.0, 0.0))
    }

    fn blue() -> Brush {
        Brush::solid(Color::rgb(0.0, 0.0, 1.0))
    }

    #[test]
    fn shape_draws_fill_then_stroke_inside_its_transform() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 50.0, 50.0));
        let root = doc.root();
        let a = square(&mut doc);
        doc.add(root, a, None).unwrap();
        doc.set_transform(a, Affine::translate(Vec2::new(5.0, 5.0))).unwrap();
        doc.set_fill(a, Some(red()));
        doc.set_stroke(a, Some(Pen::new(blue(), 2.0)));

        let mut rec = Recorder::default();
        let stats = render(&mut doc, &mut rec);
        assert_eq!(stats.fills, 1);
        assert_eq!(stats.strokes, 1);
        assert_eq!(
            rec.calls,
            vec![
                Call::PushTransform(Affine::IDENTITY),
                Call::PushTransform(Affine::translate(Vec2::new(5.0, 5.0))),
                Call::Fill(ResourceKey(1)),
                Call::Stroke(ResourceKey(2)),
                Call::PopTransform,
                Call::PopTransform,
            ]
        );
    }

    #[test]
    fn children_draw_bottom_to_top_and_hidden_are_skipped() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 50.0, 50.0));
        let root = doc.root();
        let bottom = square(&mut doc);
        let hidden = square(&mut doc);
        let top = square(&mut doc);
        for (id, brush) in [(bottom, red()), (hidden, red()), (top, blue())] {
            doc.add(root, id, None).unwrap();
            doc.set_fill(id, Some(brush));
        }
        doc.set_hidden(hidden, true);

        let mut rec = Recorder::default();
        render(&mut doc, &mut rec);
        assert_eq!(rec.fills(), vec![&red(), &blue()]);
    }

    #[test]
    fn opacity_and_clip_isolate_content() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 50.0, 50.0));
        let root = doc.root();
        let mask = square(&mut doc);
        let a = square(&mut doc);
        let b = square(&mut doc);
        doc.add(root, a, None).unwrap();
        doc.add(root, b, None).unwrap();
        doc.set_opacity(a, 0.5);
        doc.set_clip(b, Some(mask));

        let mut rec = Recorder::default();
        render(&mut doc, &mut rec);
        assert!(rec.calls.contains(&Call::PushLayer(0.5, false)), "opacity layer");
        assert!(rec.calls.contains(&Call::PushLayer(1.0, true)), "clip layer");
        let pushes = rec
            .calls
            .iter()
            .filter(|c| matches!(c, Call::PushLayer(..)))
            .count();
        let pops = rec.calls.iter().filter(|c| **c == Call::PopLayer).count();
        assert_eq!(pushes, pops, "balanced layers");
    }

    #[test]
    fn clone_draws_target_with_its_own_paint() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 50.0, 50.0));
        let root = doc.root();
        let source = square(&mut doc);
        doc.add(root, source, None).unwrap();
        doc.set_fill(source, Some(red()));
        let clone = doc.create_layer(LayerKind::Clone(source));
        doc.add(root, clone, None).unwrap();
        doc.set_fill(clone, Some(blue()));
        doc.set_transform(clone, Affine::translate(Vec2::new(20.0, 0.0))).unwrap();
        let _ = doc.take_invalidations();

        let mut rec = Recorder::default();
        let stats = render(&mut doc, &mut rec);
        assert_eq!(rec.fills(), vec![&red(), &blue()]);
        assert_eq!(stats.skipped_clones, 0);
        assert_eq!(doc.store().fill(source), Some(&red()), "paint restored");
    }

    #[test]
    fn clone_of_own_ancestor_is_drawn_once() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 50.0, 50.0));
        let root = doc.root();
        let group = doc.create_layer(LayerKind::Group);
        let a = square(&mut doc);
        doc.add(root, group, None).unwrap();
        doc.add(group, a, None).unwrap();
        doc.set_fill(a, Some(red()));
        let clone = doc.create_layer(LayerKind::Clone(group));
        doc.add(group, clone, None).unwrap();

        let mut rec = Recorder::default();
        let stats = render(&mut doc, &mut rec);
        assert_eq!(stats.fills, 2, "group content plus one level of clone");
        assert_eq!(stats.skipped_clones, 1, "nested clone is refused");
    }

    #[test]
    fn text_draws_its_layout() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 50.0, 50.0));
        let root = doc.root();
        let t = doc.create_layer(LayerKind::Text(TextBlock {
            text: String::from("hi"),
            font_family: String::from("Sans"),
            font_size: 10.0,
            size: Size::new(20.0, 12.0),
        }));
        doc.add(root, t, None).unwrap();

        let mut rec = Recorder::default();
        let stats = render(&mut doc, &mut rec);
        assert_eq!(stats.texts, 1);
        assert!(rec.calls.iter().any(|c| matches!(c, Call::Text(_))));
    }
}
