// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON snapshot of a document.
//!
//! [`snapshot`] describes the attached layer tree as nested JSON objects,
//! including each layer's local transform (kurbo coefficient order), paint
//! presence, and cached local and absolute bounds. Querying bounds fills the
//! cache, which is why the document is borrowed mutably.

use std::io::{self, Write};

use kurbo::Rect;
use serde_json::{Value, json};

use lamina_core::Document;
use lamina_core::layer::{LayerId, LayerKind};

/// Describes `doc` as a JSON value.
pub fn snapshot(doc: &mut Document) -> Value {
    let root = doc.root();
    let canvas = doc.canvas();
    json!({
        "canvas": rect(Some(canvas)),
        "layers": doc.store().len(),
        "structure_revision": doc.structure_revision(),
        "root": layer(doc, root),
    })
}

/// Writes [`snapshot`] as pretty-printed JSON.
pub fn write(doc: &mut Document, writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &snapshot(doc))?;
    writeln!(writer)
}

fn layer(doc: &mut Document, id: LayerId) -> Value {
    let bounds = doc.bounds(id);
    let absolute = doc.absolute_bounds(id);
    let store = doc.store();
    let flags = store.flags(id);
    let clone_of = match store.kind(id) {
        LayerKind::Clone(target) => Some(handle(*target)),
        _ => None,
    };
    let mut value = json!({
        "id": handle(id),
        "name": store.name(id),
        "kind": store.kind(id).label(),
        "transform": store.local_transform(id).as_coeffs(),
        "opacity": store.opacity(id),
        "hidden": flags.hidden,
        "selected": flags.selected,
        "filled": store.fill(id).is_some(),
        "stroked": store.stroke(id).is_some(),
        "clip": store.clip(id).map(handle),
        "clone_of": clone_of,
        "bounds": rect(bounds),
        "absolute_bounds": rect(absolute),
    });
    let children: Vec<_> = doc.children(id).collect();
    if !children.is_empty() {
        value["children"] = children.into_iter().map(|c| layer(doc, c)).collect();
    }
    value
}

fn handle(id: LayerId) -> String {
    format!("{}.{}", id.index(), id.generation())
}

fn rect(r: Option<Rect>) -> Value {
    r.map_or(Value::Null, |r| json!([r.x0, r.y0, r.x1, r.y1]))
}

#[cfg(test)]
mod tests {
    use kurbo::{Affine, Size, Vec2};
    use lamina_core::layer::RectangleShape;

    use super::*;

    #[test]
    fn snapshot_nests_children_with_bounds() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 100.0, 50.0));
        let root = doc.root();
        let r = doc.create_layer(LayerKind::Rectangle(RectangleShape {
            size: Size::new(10.0, 20.0),
            corner_radius: 0.0,
        }));
        doc.add(root, r, None).unwrap();
        doc.set_transform(r, Affine::translate(Vec2::new(5.0, 5.0))).unwrap();

        let value = snapshot(&mut doc);
        assert_eq!(value["canvas"], json!([0.0, 0.0, 100.0, 50.0]));
        let child = &value["root"]["children"][0];
        assert_eq!(child["kind"], "rectangle");
        assert_eq!(child["bounds"], json!([0.0, 0.0, 10.0, 20.0]));
        assert_eq!(child["absolute_bounds"], json!([5.0, 5.0, 15.0, 25.0]));
        assert!(child.get("children").is_none(), "leaves omit children");
    }

    #[test]
    fn write_emits_parseable_json() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut out = Vec::new();
        write(&mut doc, &mut out).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["root"]["name"], "Root");
        assert_eq!(parsed["root"]["bounds"], Value::Null, "empty group");
    }
}
