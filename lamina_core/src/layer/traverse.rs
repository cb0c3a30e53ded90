// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec;
use alloc::vec::Vec;

use super::id::{INVALID, LayerId};
use super::store::LayerStore;

/// An iterator over the direct children of a layer, bottom to top.
///
/// Created by [`LayerStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a LayerStore,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a LayerStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = LayerId;

    fn next(&mut self) -> Option<LayerId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(self.store.id_at(idx))
    }
}

/// An iterator over the ancestors of a layer, nearest first.
///
/// Created by [`LayerStore::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    store: &'a LayerStore,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(store: &'a LayerStore, start: u32) -> Self {
        Self {
            store,
            current: store.parent[start as usize],
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = LayerId;

    fn next(&mut self) -> Option<LayerId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.parent[idx as usize];
        Some(self.store.id_at(idx))
    }
}

/// Sibling order used by [`Flatten`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TraversalOrder {
    /// Bottom-most sibling first (render order).
    #[default]
    Ascending,
    /// Top-most sibling first (hit-test order).
    TopFirst,
}

/// A lazy pre-order walk over a subtree yielding `(layer, depth)`.
///
/// The starting layer has depth 0. Each node is yielded exactly once; nodes
/// deeper than the depth limit are neither yielded nor visited.
///
/// Created by [`LayerStore::flatten`].
#[derive(Debug)]
pub struct Flatten<'a> {
    store: &'a LayerStore,
    stack: Vec<(u32, usize)>,
    max_depth: Option<usize>,
    order: TraversalOrder,
    visible_only: bool,
}

impl<'a> Flatten<'a> {
    pub(crate) fn new(
        store: &'a LayerStore,
        root: u32,
        max_depth: Option<usize>,
        order: TraversalOrder,
    ) -> Self {
        Self {
            store,
            stack: vec![(root, 0)],
            max_depth,
            order,
            visible_only: false,
        }
    }

    /// Skips hidden layers together with their subtrees.
    #[must_use]
    pub fn visible_only(mut self) -> Self {
        self.visible_only = true;
        self
    }

    fn push_children(&mut self, idx: u32, depth: usize) {
        let store = self.store;
        // The stack pops last-in first, so push in the reverse of the
        // desired visiting order.
        match self.order {
            TraversalOrder::TopFirst => {
                let mut c = store.first_child[idx as usize];
                while c != INVALID {
                    self.stack.push((c, depth));
                    c = store.next_sibling[c as usize];
                }
            }
            TraversalOrder::Ascending => {
                let mut c = store.first_child[idx as usize];
                if c == INVALID {
                    return;
                }
                while store.next_sibling[c as usize] != INVALID {
                    c = store.next_sibling[c as usize];
                }
                while c != INVALID {
                    self.stack.push((c, depth));
                    c = store.prev_sibling[c as usize];
                }
            }
        }
    }
}

impl Iterator for Flatten<'_> {
    type Item = (LayerId, usize);

    fn next(&mut self) -> Option<(LayerId, usize)> {
        loop {
            let (idx, depth) = self.stack.pop()?;
            if self.visible_only && self.store.flags[idx as usize].hidden {
                continue;
            }
            if self.max_depth.is_none_or(|max| depth < max) {
                self.push_children(idx, depth + 1);
            }
            return Some((self.store.id_at(idx), depth));
        }
    }
}
