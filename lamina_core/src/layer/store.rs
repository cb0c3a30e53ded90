// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays layer storage with allocation, topology, and property management.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Affine;
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::{INVALID, LayerId};
use super::kind::LayerKind;
use super::traverse::{Ancestors, Children, Flatten, TraversalOrder};
use crate::dirty;
use crate::error::StructureError;
use crate::paint::{Brush, Pen};

/// Per-layer boolean flags.
///
/// A [`hidden`](Self::hidden) layer is skipped, together with its subtree, by
/// rendering and hit-testing. Properties can still be mutated while hidden.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LayerFlags {
    /// Whether the layer (and its subtree) is hidden.
    pub hidden: bool,
    /// Whether the layer is part of the editor selection.
    pub selected: bool,
}

/// Struct-of-arrays storage for all layers.
///
/// Layers are addressed by [`LayerId`] handles. Internally, each layer occupies
/// a slot in parallel arrays. Destroyed layers are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// Mutation goes through [`Document`](crate::document::Document), which keeps
/// the derived-data cache in step; the store itself is exposed read-only.
#[derive(Debug)]
pub struct LayerStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Properties --
    pub(crate) name: Vec<String>,
    pub(crate) kind: Vec<LayerKind>,
    pub(crate) local_transform: Vec<Affine>,
    pub(crate) opacity: Vec<f32>,
    pub(crate) flags: Vec<LayerFlags>,
    pub(crate) clip: Vec<Option<LayerId>>,
    pub(crate) fill: Vec<Option<Brush>>,
    pub(crate) stroke: Vec<Option<Pen>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
    revision: u64,
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStore {
    /// Creates an empty layer store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            name: Vec::new(),
            kind: Vec::new(),
            local_transform: Vec::new(),
            opacity: Vec::new(),
            flags: Vec::new(),
            clip: Vec::new(),
            fill: Vec::new(),
            stroke: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            revision: 0,
        }
    }

    // -- Allocation API --

    /// Creates a new detached layer and returns its handle.
    ///
    /// The layer starts with an empty name, an identity transform, full
    /// opacity, default flags, no clip, and no paint.
    pub(crate) fn create_layer(&mut self, kind: LayerKind) -> LayerId {
        let clone_target = kind.clone_target();
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot. The generation was bumped on destroy.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.name[i] = String::new();
            self.kind[i] = kind;
            self.local_transform[i] = Affine::IDENTITY;
            self.opacity[i] = 1.0;
            self.flags[i] = LayerFlags::default();
            self.clip[i] = None;
            self.fill[i] = None;
            self.stroke[i] = None;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.name.push(String::new());
            self.kind.push(kind);
            self.local_transform.push(Affine::IDENTITY);
            self.opacity.push(1.0);
            self.flags.push(LayerFlags::default());
            self.clip.push(None);
            self.fill.push(None);
            self.stroke.push(None);
            self.generation.push(0);
            idx
        };

        if let Some(target) = clone_target {
            self.validate(target);
            // A fresh layer cannot be anyone's target yet, so no cycle.
            self.link_clone(idx, target.idx);
        }

        self.pending_added.push(idx);
        self.id_at(idx)
    }

    /// Destroys a detached or attached childless layer, freeing its slot.
    ///
    /// Clones of the layer keep their (now stale) target and draw nothing.
    ///
    /// # Panics
    ///
    /// Panics if the layer has children (remove them first) or if the handle
    /// is stale.
    pub(crate) fn destroy_layer(&mut self, id: LayerId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy layer with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.detach(idx);
        }

        // Clones lose their geometry.
        self.dirty.mark_with(idx, dirty::GEOMETRY, &EagerPolicy);
        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
        self.pending_removed.push(idx);
    }

    /// Returns whether the given handle refers to a live layer.
    #[must_use]
    pub fn is_alive(&self, id: LayerId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the number of live layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Returns whether the store holds no live layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a counter that changes on every add, remove, and move.
    #[must_use]
    pub fn structure_revision(&self) -> u64 {
        self.revision
    }

    // -- Topology API --

    /// Inserts `child` into `parent`'s child list at `index`, or on top when
    /// `index` is `None`.
    ///
    /// Marks the child's subtree for transform recomputation and the
    /// parent's ancestor chain for bounds recomputation.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub(crate) fn insert_child(
        &mut self,
        parent: LayerId,
        child: LayerId,
        index: Option<usize>,
    ) -> Result<usize, StructureError> {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;

        if self.parent[c as usize] != INVALID {
            return Err(StructureError::AlreadyParented(child));
        }
        if !self.kind[p as usize].is_container() {
            return Err(StructureError::NotAContainer(parent));
        }
        if p == c || self.is_ancestor(child, parent) {
            return Err(StructureError::Cycle {
                node: child,
                parent,
            });
        }
        let count = self.child_count(parent);
        let index = index.unwrap_or(count);
        if index > count {
            return Err(StructureError::IndexOutOfRange {
                index,
                len: count + 1,
            });
        }

        self.link(p, c, index);

        // Child depends on parent for TRANSFORM; parent depends on child for BOUNDS.
        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
        let _ = self.dirty.add_dependency(p, c, dirty::BOUNDS);

        self.dirty.mark_with(c, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(p, dirty::BOUNDS, &EagerPolicy);
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.revision += 1;
        Ok(index)
    }

    /// Removes `child` from its parent, returning the former parent and index.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub(crate) fn remove_from_parent(
        &mut self,
        child: LayerId,
    ) -> Result<(LayerId, usize), StructureError> {
        self.validate(child);
        let c = child.idx;
        let p = self.parent[c as usize];
        if p == INVALID {
            return Err(StructureError::NotAChild(child));
        }
        let index = self.position_in_parent(c);
        self.detach(c);
        Ok((self.id_at(p), index))
    }

    /// Moves `child` to `index` within its current parent, returning the old
    /// index.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub(crate) fn move_child(
        &mut self,
        child: LayerId,
        index: usize,
    ) -> Result<usize, StructureError> {
        self.validate(child);
        let c = child.idx;
        let p = self.parent[c as usize];
        if p == INVALID {
            return Err(StructureError::NotAChild(child));
        }
        let count = self.child_count(self.id_at(p));
        if index >= count {
            return Err(StructureError::IndexOutOfRange { index, len: count });
        }
        let old = self.position_in_parent(c);
        if old != index {
            self.unlink_from_parent(c);
            self.link(p, c, index);
            self.dirty.mark(p, dirty::TOPOLOGY);
            self.revision += 1;
        }
        Ok(old)
    }

    /// Returns the parent of a layer, if any.
    #[must_use]
    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of a layer, bottom to top.
    #[must_use]
    pub fn children(&self, id: LayerId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the number of direct children.
    #[must_use]
    pub fn child_count(&self, id: LayerId) -> usize {
        self.children(id).count()
    }

    /// Returns the child at `index` (0 is the bottom).
    #[must_use]
    pub fn child_at(&self, parent: LayerId, index: usize) -> Option<LayerId> {
        self.children(parent).nth(index)
    }

    /// Returns the position of a layer within its parent's child list.
    #[must_use]
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.validate(id);
        (self.parent[id.idx as usize] != INVALID).then(|| self.position_in_parent(id.idx))
    }

    /// Returns an iterator over the ancestors of a layer, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: LayerId) -> Ancestors<'_> {
        self.validate(id);
        Ancestors::new(self, id.idx)
    }

    /// Returns whether `ancestor` is a strict ancestor of `node`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: LayerId, node: LayerId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Returns a lazy pre-order walk over the subtree rooted at `root`.
    ///
    /// Nodes deeper than `max_depth` (relative to `root`) are skipped.
    #[must_use]
    pub fn flatten(
        &self,
        root: LayerId,
        max_depth: Option<usize>,
        order: TraversalOrder,
    ) -> Flatten<'_> {
        self.validate(root);
        Flatten::new(self, root.idx, max_depth, order)
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the name of a layer.
    #[must_use]
    pub fn name(&self, id: LayerId) -> &str {
        self.validate(id);
        &self.name[id.idx as usize]
    }

    /// Returns the kind data of a layer.
    #[must_use]
    pub fn kind(&self, id: LayerId) -> &LayerKind {
        self.validate(id);
        &self.kind[id.idx as usize]
    }

    /// Returns the local transform of a layer.
    #[must_use]
    pub fn local_transform(&self, id: LayerId) -> Affine {
        self.validate(id);
        self.local_transform[id.idx as usize]
    }

    /// Returns the opacity of a layer.
    #[must_use]
    pub fn opacity(&self, id: LayerId) -> f32 {
        self.validate(id);
        self.opacity[id.idx as usize]
    }

    /// Returns the flags of a layer.
    #[must_use]
    pub fn flags(&self, id: LayerId) -> LayerFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Returns the clip layer of a layer.
    #[must_use]
    pub fn clip(&self, id: LayerId) -> Option<LayerId> {
        self.validate(id);
        self.clip[id.idx as usize]
    }

    /// Returns the fill brush of a layer.
    #[must_use]
    pub fn fill(&self, id: LayerId) -> Option<&Brush> {
        self.validate(id);
        self.fill[id.idx as usize].as_ref()
    }

    /// Returns the stroke pen of a layer.
    #[must_use]
    pub fn stroke(&self, id: LayerId) -> Option<&Pen> {
        self.validate(id);
        self.stroke[id.idx as usize].as_ref()
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the name of a layer.
    pub(crate) fn set_name(&mut self, id: LayerId, name: String) {
        self.validate(id);
        self.name[id.idx as usize] = name;
        self.dirty.mark(id.idx, dirty::APPEARANCE);
    }

    /// Replaces the kind data of a layer.
    ///
    /// Marks GEOMETRY eagerly (reaching every clone) and BOUNDS eagerly
    /// (reaching every ancestor).
    ///
    /// # Panics
    ///
    /// Panics if the handle, or a new clone target, is stale.
    pub(crate) fn set_kind(&mut self, id: LayerId, kind: LayerKind) -> Result<(), StructureError> {
        self.validate(id);
        let idx = id.idx;
        if !kind.is_container() && self.first_child[idx as usize] != INVALID {
            return Err(StructureError::NotAContainer(id));
        }
        if let Some(target) = kind.clone_target() {
            self.validate(target);
            if self.clone_chain_reaches(target, id) {
                return Err(StructureError::CloneCycle { clone: id, target });
            }
        }

        if let Some(old) = self.kind[idx as usize].clone_target() {
            self.dirty.remove_dependency(idx, old.idx, dirty::GEOMETRY);
            self.dirty.remove_dependency(idx, old.idx, dirty::BOUNDS);
        }
        if let Some(target) = kind.clone_target() {
            self.link_clone(idx, target.idx);
        }
        self.kind[idx as usize] = kind;

        self.dirty.mark_with(idx, dirty::GEOMETRY, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::BOUNDS, &EagerPolicy);
        self.dirty.mark(idx, dirty::TEXT);
        Ok(())
    }

    /// Sets the local transform of a layer.
    ///
    /// Marks TRANSFORM with eager propagation to descendants, and the
    /// parent's BOUNDS with eager propagation to ancestors.
    pub(crate) fn set_transform(&mut self, id: LayerId, transform: Affine) {
        self.validate(id);
        let idx = id.idx;
        self.local_transform[idx as usize] = transform;
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        let p = self.parent[idx as usize];
        if p != INVALID {
            self.dirty.mark_with(p, dirty::BOUNDS, &EagerPolicy);
        }
    }

    /// Sets the opacity of a layer.
    pub(crate) fn set_opacity(&mut self, id: LayerId, opacity: f32) {
        self.validate(id);
        self.opacity[id.idx as usize] = opacity;
        self.dirty.mark(id.idx, dirty::APPEARANCE);
    }

    /// Sets the flags of a layer.
    pub(crate) fn set_flags(&mut self, id: LayerId, flags: LayerFlags) {
        self.validate(id);
        self.flags[id.idx as usize] = flags;
        self.dirty.mark(id.idx, dirty::APPEARANCE);
    }

    /// Sets the clip layer of a layer.
    pub(crate) fn set_clip(&mut self, id: LayerId, clip: Option<LayerId>) {
        self.validate(id);
        self.clip[id.idx as usize] = clip;
        self.dirty.mark(id.idx, dirty::APPEARANCE);
    }

    /// Sets the fill brush of a layer.
    pub(crate) fn set_fill(&mut self, id: LayerId, fill: Option<Brush>) {
        self.validate(id);
        self.fill[id.idx as usize] = fill;
        self.dirty.mark(id.idx, dirty::FILL);
    }

    /// Sets the stroke pen of a layer.
    pub(crate) fn set_stroke(&mut self, id: LayerId, stroke: Option<Pen>) {
        self.validate(id);
        self.stroke[id.idx as usize] = stroke;
        self.dirty.mark(id.idx, dirty::STROKE);
    }

    // -- Internal helpers --

    /// Builds the current handle for slot `idx`.
    #[inline]
    pub(crate) fn id_at(&self, idx: u32) -> LayerId {
        LayerId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Returns whether slot `idx` holds a live layer.
    pub(crate) fn is_slot_live(&self, idx: u32) -> bool {
        idx < self.len && !self.free_list.contains(&idx)
    }

    /// Returns the number of allocated slots, live or free.
    pub(crate) fn slot_count(&self) -> usize {
        self.len as usize
    }

    /// Panics if the handle is stale.
    fn validate(&self, id: LayerId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale LayerId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Follows clone targets from `start`; true if the chain reaches `needle`.
    fn clone_chain_reaches(&self, start: LayerId, needle: LayerId) -> bool {
        let mut current = start;
        // Chains are acyclic, so the walk is bounded by the layer count.
        for _ in 0..=self.len {
            if current == needle {
                return true;
            }
            match self.kind[current.idx as usize].clone_target() {
                Some(next) if self.is_alive(next) => current = next,
                _ => return false,
            }
        }
        true
    }

    /// Makes clone `c` follow target `t` for geometry and bounds.
    fn link_clone(&mut self, c: u32, t: u32) {
        let _ = self.dirty.add_dependency(c, t, dirty::GEOMETRY);
        // Fails only for a clone inside its own target; its bounds then cut
        // the recursion instead.
        let _ = self.dirty.add_dependency(c, t, dirty::BOUNDS);
    }

    fn position_in_parent(&self, idx: u32) -> usize {
        let mut count = 0;
        let mut prev = self.prev_sibling[idx as usize];
        while prev != INVALID {
            count += 1;
            prev = self.prev_sibling[prev as usize];
        }
        count
    }

    /// Splices `c` into `p`'s child list so that it ends up at `index`.
    fn link(&mut self, p: u32, c: u32, index: usize) {
        self.parent[c as usize] = p;
        if index == 0 {
            let next = self.first_child[p as usize];
            self.first_child[p as usize] = c;
            self.prev_sibling[c as usize] = INVALID;
            self.next_sibling[c as usize] = next;
            if next != INVALID {
                self.prev_sibling[next as usize] = c;
            }
            return;
        }
        // Walk to the sibling that will sit directly below `c`.
        let mut prev = self.first_child[p as usize];
        for _ in 1..index {
            prev = self.next_sibling[prev as usize];
        }
        let next = self.next_sibling[prev as usize];
        self.next_sibling[prev as usize] = c;
        self.prev_sibling[c as usize] = prev;
        self.next_sibling[c as usize] = next;
        if next != INVALID {
            self.prev_sibling[next as usize] = c;
        }
    }

    /// Unlinks `c` from its parent and updates dependencies and dirty state.
    fn detach(&mut self, c: u32) {
        let p = self.parent[c as usize];
        self.unlink_from_parent(c);

        self.dirty.remove_dependency(c, p, dirty::TRANSFORM);
        self.dirty.remove_dependency(p, c, dirty::BOUNDS);

        self.dirty.mark_with(c, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(p, dirty::BOUNDS, &EagerPolicy);
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.revision += 1;
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}
