// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indented text outline of a layer tree.

use std::fmt::Write;

use lamina_core::Document;
use lamina_core::layer::{LayerKind, TraversalOrder};

/// Renders the attached layers of `doc` as an outline, one layer per line,
/// children indented two spaces below their parent.
///
/// Each line reads `name (kind) #index.generation`, followed by `hidden` or
/// `selected` markers and, for clones, the target handle.
#[must_use]
pub fn dump(doc: &Document) -> String {
    let mut out = String::new();
    let store = doc.store();
    for (id, depth) in doc.flatten(doc.root(), None, TraversalOrder::Ascending) {
        let kind = store.kind(id);
        let _ = write!(
            out,
            "{:indent$}{} ({}) #{}.{}",
            "",
            store.name(id),
            kind.label(),
            id.index(),
            id.generation(),
            indent = depth * 2,
        );
        if let LayerKind::Clone(target) = kind {
            let _ = write!(out, " -> #{}.{}", target.index(), target.generation());
        }
        let flags = store.flags(id);
        if flags.hidden {
            out.push_str(" hidden");
        }
        if flags.selected {
            out.push_str(" selected");
        }
        out.push('\n');
    }
    out
}
