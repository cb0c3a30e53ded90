// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The editable document.
//!
//! A [`Document`] owns the layer arena, the root group, the swatch palette,
//! the canvas rectangle, and the derived-data cache. Every mutation goes
//! through a method here so that the cache is brought up to date before the
//! call returns: stale entries are cleared and [`Invalidation`]s are queued.
//!
//! Queries that may compute derived data take `&mut self`.

use alloc::string::String;
use alloc::vec::Vec;
use core::mem;

use kurbo::{Affine, BezPath, ParamCurveNearest, Point, Rect, Shape};

use crate::backend::{ResourceFactory, ResourceKey};
use crate::cache::{CacheConfig, CacheManager, CacheStats, Invalidation};
use crate::error::StructureError;
use crate::layer::{
    Ancestors, Children, Flatten, LayerFlags, LayerId, LayerKind, LayerStore, TraversalOrder,
};
use crate::paint::{Brush, Palette, Pen};
use crate::transform::{compose_edit, is_invertible};

/// Where a layer sits in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    /// The containing group.
    pub parent: LayerId,
    /// Position in the parent's child list (0 is the bottom).
    pub index: usize,
}

/// Where the members of a grouped selection sat before grouping.
#[derive(Clone, Debug)]
struct GroupOrigin {
    group: LayerId,
    /// The group's own placement right after grouping.
    placement: Placement,
    /// Child count of the group's parent right after grouping.
    siblings: usize,
    /// Members bottom first with their placements before grouping.
    members: Vec<(LayerId, Placement)>,
}

/// A layer tree with its palette, canvas, and cache.
#[derive(Debug)]
pub struct Document {
    store: LayerStore,
    cache: CacheManager,
    root: LayerId,
    canvas: Rect,
    palette: Palette,
    /// Clone targets whose paint is currently substituted.
    substituting: Vec<LayerId>,
    group_origins: Vec<GroupOrigin>,
}

impl Document {
    /// Creates an empty document with the given canvas rectangle.
    #[must_use]
    pub fn new(canvas: Rect) -> Self {
        Self::with_config(canvas, CacheConfig::default())
    }

    /// Creates an empty document with explicit cache tuning.
    #[must_use]
    pub fn with_config(canvas: Rect, config: CacheConfig) -> Self {
        let mut store = LayerStore::new();
        let root = store.create_layer(LayerKind::Group);
        store.set_name(root, String::from("Root"));
        let mut cache = CacheManager::new(config);
        cache.sync(&mut store);
        let _ = cache.take_invalidations();
        Self {
            store,
            cache,
            root,
            canvas,
            palette: Palette::new(),
            substituting: Vec::new(),
            group_origins: Vec::new(),
        }
    }

    /// Replaces this document with `replacement` in one step, returning the
    /// previous document.
    ///
    /// Used when a background load finishes. Layer handles and history
    /// entries referring to the old document must be discarded.
    pub fn install(&mut self, replacement: Self) -> Self {
        log::debug!(
            "installing document with {} layers (replacing {})",
            replacement.store.len(),
            self.store.len()
        );
        mem::replace(self, replacement)
    }

    // -- Accessors --

    /// Returns the root group.
    #[must_use]
    pub fn root(&self) -> LayerId {
        self.root
    }

    /// Returns the read-only layer store.
    #[must_use]
    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    /// Returns the canvas rectangle.
    #[must_use]
    pub fn canvas(&self) -> Rect {
        self.canvas
    }

    /// Sets the canvas rectangle.
    pub fn set_canvas(&mut self, canvas: Rect) {
        self.canvas = canvas;
    }

    /// Returns the swatch palette.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Returns the swatch palette for editing.
    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    /// Returns whether the handle refers to a live layer.
    #[must_use]
    pub fn is_alive(&self, id: LayerId) -> bool {
        self.store.is_alive(id)
    }

    /// Returns a counter that changes on every structural edit.
    #[must_use]
    pub fn structure_revision(&self) -> u64 {
        self.store.structure_revision()
    }

    // -- Scene graph --

    /// Creates a detached layer.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is a clone of a stale handle.
    pub fn create_layer(&mut self, kind: LayerKind) -> LayerId {
        let id = self.store.create_layer(kind);
        self.sync();
        id
    }

    /// Attaches `node` to `parent` at `index` (on top when `None`), returning
    /// the index it landed at.
    ///
    /// # Errors
    ///
    /// Fails without modifying the document if `node` is the root or already
    /// has a parent, if the edit would create a cycle, if `parent` is not a
    /// group, or if `index` is past the end.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn add(
        &mut self,
        parent: LayerId,
        node: LayerId,
        index: Option<usize>,
    ) -> Result<usize, StructureError> {
        let result = if node == self.root {
            Err(StructureError::RootImmutable)
        } else {
            self.store.insert_child(parent, node, index)
        };
        match result {
            Ok(_) => self.sync(),
            Err(err) => log::warn!("rejected add of {node:?} to {parent:?}: {err}"),
        }
        result
    }

    /// Detaches `node` from its parent, returning where it was.
    ///
    /// The layer stays alive (detached) so it can be re-attached.
    ///
    /// # Errors
    ///
    /// Fails if `node` is the root or has no parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove(&mut self, node: LayerId) -> Result<Placement, StructureError> {
        let result = if node == self.root {
            Err(StructureError::RootImmutable)
        } else {
            self.store.remove_from_parent(node)
        };
        match result {
            Ok((parent, index)) => {
                self.sync();
                Ok(Placement { parent, index })
            }
            Err(err) => {
                log::warn!("rejected removal of {node:?}: {err}");
                Err(err)
            }
        }
    }

    /// Moves `node` to `index` within its parent, returning the old index.
    ///
    /// # Errors
    ///
    /// Fails if `node` is the root, has no parent, or `index` is out of range.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn move_to(&mut self, node: LayerId, index: usize) -> Result<usize, StructureError> {
        let result = if node == self.root {
            Err(StructureError::RootImmutable)
        } else {
            self.store.move_child(node, index)
        };
        match result {
            Ok(_) => self.sync(),
            Err(err) => log::warn!("rejected move of {node:?} to {index}: {err}"),
        }
        result
    }

    /// Detaches `id` if needed and destroys it together with its subtree.
    ///
    /// # Errors
    ///
    /// Fails if `id` is the root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy(&mut self, id: LayerId) -> Result<(), StructureError> {
        if id == self.root {
            return Err(StructureError::RootImmutable);
        }
        if self.store.parent(id).is_some() {
            self.store.remove_from_parent(id)?;
        }
        let subtree: Vec<LayerId> = self
            .store
            .flatten(id, None, TraversalOrder::Ascending)
            .map(|(layer, _)| layer)
            .collect();
        // Pre-order lists parents first, so destroy back to front.
        for &layer in subtree.iter().rev() {
            self.store.destroy_layer(layer);
        }
        let store = &self.store;
        self.group_origins.retain(|o| store.is_alive(o.group));
        self.sync();
        Ok(())
    }

    /// Remembers where the members of the freshly created `group` sat before
    /// they were grouped.
    pub(crate) fn record_group_origin(
        &mut self,
        group: LayerId,
        members: Vec<(LayerId, Placement)>,
    ) {
        let Some(placement) = self.placement(group) else {
            return;
        };
        let siblings = self.store.child_count(placement.parent);
        self.group_origins.retain(|o| o.group != group);
        self.group_origins.push(GroupOrigin {
            group,
            placement,
            siblings,
            members,
        });
    }

    /// Returns the pre-grouping placements of `group`'s members, if the
    /// group, its siblings, and its contents are as they were right after
    /// grouping.
    pub(crate) fn group_origin(&self, group: LayerId) -> Option<&[(LayerId, Placement)]> {
        let origin = self.group_origins.iter().find(|o| o.group == group)?;
        let placement = self.placement(group)?;
        let unchanged = placement == origin.placement
            && self.store.child_count(placement.parent) == origin.siblings
            && self
                .children(group)
                .eq(origin.members.iter().map(|(layer, _)| *layer));
        unchanged.then_some(origin.members.as_slice())
    }

    /// Destroys `id` if it is still alive and detached.
    pub(crate) fn destroy_detached(&mut self, id: LayerId) {
        if id != self.root && self.store.is_alive(id) && self.store.parent(id).is_none() {
            log::debug!("destroying detached {id:?}");
            let _ = self.destroy(id);
        }
    }

    /// Returns the parent of a layer.
    #[must_use]
    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.store.parent(id)
    }

    /// Returns the children of a layer, bottom to top.
    #[must_use]
    pub fn children(&self, id: LayerId) -> Children<'_> {
        self.store.children(id)
    }

    /// Returns the position of a layer in its parent.
    #[must_use]
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.store.index_of(id)
    }

    /// Returns the placement of an attached layer.
    #[must_use]
    pub fn placement(&self, id: LayerId) -> Option<Placement> {
        let parent = self.store.parent(id)?;
        let index = self.store.index_of(id)?;
        Some(Placement { parent, index })
    }

    /// Returns the ancestors of a layer, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: LayerId) -> Ancestors<'_> {
        self.store.ancestors(id)
    }

    /// Returns a lazy pre-order walk of the subtree rooted at `root`.
    #[must_use]
    pub fn flatten(
        &self,
        root: LayerId,
        max_depth: Option<usize>,
        order: TraversalOrder,
    ) -> Flatten<'_> {
        self.store.flatten(root, max_depth, order)
    }

    // -- Properties --

    /// Renames a layer.
    pub fn set_name(&mut self, id: LayerId, name: impl Into<String>) {
        self.store.set_name(id, name.into());
        self.sync();
    }

    /// Replaces a layer's kind data.
    ///
    /// # Errors
    ///
    /// Fails if a clone would clone itself, or if a group with children
    /// would stop being a container.
    pub fn set_kind(&mut self, id: LayerId, kind: LayerKind) -> Result<(), StructureError> {
        let result = self.store.set_kind(id, kind);
        match result {
            Ok(()) => self.sync(),
            Err(err) => log::warn!("rejected kind change of {id:?}: {err}"),
        }
        result
    }

    /// Sets a layer's local transform.
    ///
    /// # Errors
    ///
    /// Fails if `id` is the root, whose transform is always the identity.
    pub fn set_transform(&mut self, id: LayerId, transform: Affine) -> Result<(), StructureError> {
        if id == self.root {
            log::warn!("rejected transform of the root");
            return Err(StructureError::RootImmutable);
        }
        self.store.set_transform(id, transform);
        self.sync();
        Ok(())
    }

    /// Edits a layer's transform with a layer-space part and a
    /// document-space part.
    ///
    /// See [`compose_edit`] for the composition rule.
    ///
    /// # Errors
    ///
    /// Fails if `id` is the root.
    pub fn apply_transform(
        &mut self,
        id: LayerId,
        local: Option<Affine>,
        global: Option<Affine>,
    ) -> Result<(), StructureError> {
        if id == self.root {
            log::warn!("rejected transform of the root");
            return Err(StructureError::RootImmutable);
        }
        let world = match self.store.parent(id) {
            Some(parent) => self.cache.absolute_transform(&self.store, parent),
            None => Affine::IDENTITY,
        };
        let next = compose_edit(
            self.store.local_transform(id),
            world,
            local.unwrap_or(Affine::IDENTITY),
            global.unwrap_or(Affine::IDENTITY),
        );
        self.set_transform(id, next)
    }

    /// Sets a layer's opacity.
    pub fn set_opacity(&mut self, id: LayerId, opacity: f32) {
        self.store.set_opacity(id, opacity);
        self.sync();
    }

    /// Shows or hides a layer and its subtree.
    pub fn set_hidden(&mut self, id: LayerId, hidden: bool) {
        let flags = LayerFlags {
            hidden,
            ..self.store.flags(id)
        };
        self.store.set_flags(id, flags);
        self.sync();
    }

    /// Adds a layer to, or removes it from, the selection.
    pub fn set_selected(&mut self, id: LayerId, selected: bool) {
        let flags = LayerFlags {
            selected,
            ..self.store.flags(id)
        };
        self.store.set_flags(id, flags);
        self.sync();
    }

    /// Sets the layer whose geometry clips this layer.
    pub fn set_clip(&mut self, id: LayerId, clip: Option<LayerId>) {
        self.store.set_clip(id, clip);
        self.sync();
    }

    /// Sets a layer's fill brush.
    pub fn set_fill(&mut self, id: LayerId, fill: Option<Brush>) {
        self.store.set_fill(id, fill);
        self.sync();
    }

    /// Sets a layer's stroke pen.
    pub fn set_stroke(&mut self, id: LayerId, stroke: Option<Pen>) {
        self.store.set_stroke(id, stroke);
        self.sync();
    }

    // -- Derived data --

    /// Returns a layer's local bounds (memoized).
    pub fn bounds(&mut self, id: LayerId) -> Option<Rect> {
        self.cache.bounds(&self.store, id)
    }

    /// Returns a layer's bounds in document space (memoized).
    pub fn absolute_bounds(&mut self, id: LayerId) -> Option<Rect> {
        self.cache.absolute_bounds(&self.store, id)
    }

    /// Returns the transform from layer space to document space (memoized).
    pub fn absolute_transform(&mut self, id: LayerId) -> Affine {
        self.cache.absolute_transform(&self.store, id)
    }

    /// Returns a layer's geometry in layer space (memoized).
    pub fn geometry(&mut self, id: LayerId) -> Option<&BezPath> {
        self.cache.geometry(&self.store, id)
    }

    /// Returns the realized fill (memoized).
    pub fn fill<F: ResourceFactory + ?Sized>(
        &mut self,
        id: LayerId,
        factory: &mut F,
    ) -> Option<ResourceKey> {
        self.cache.fill(&self.store, id, factory)
    }

    /// Returns the realized stroke (memoized).
    pub fn stroke<F: ResourceFactory + ?Sized>(
        &mut self,
        id: LayerId,
        factory: &mut F,
    ) -> Option<ResourceKey> {
        self.cache.stroke(&self.store, id, factory)
    }

    /// Returns the text layout of a text layer (memoized).
    pub fn text_layout<F: ResourceFactory + ?Sized>(
        &mut self,
        id: LayerId,
        factory: &mut F,
    ) -> Option<ResourceKey> {
        self.cache.text_layout(&self.store, id, factory)
    }

    /// Returns the cache tuning this document was created with.
    #[must_use]
    pub fn cache_config(&self) -> CacheConfig {
        self.cache.config()
    }

    /// Returns cache recompute counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    // -- Hit testing --

    /// Finds the topmost visible layer under `point` (document space).
    ///
    /// Candidates are visited top-first. A layer is hit when its fill
    /// contains the point, or when its stroke passes within half the pen
    /// width (plus [`CacheConfig::hit_tolerance`]). The result is the hit
    /// layer's ancestor at depth `min_depth` (the root has depth 0, its
    /// children depth 1), or the hit layer itself when it sits at that depth.
    /// Layers shallower than `min_depth` are never reported.
    pub fn hit_test(&mut self, point: Point, min_depth: usize) -> Option<LayerId> {
        let slack = self.cache.config().hit_tolerance;
        let mut found = None;
        for (id, depth) in self
            .store
            .flatten(self.root, None, TraversalOrder::TopFirst)
            .visible_only()
        {
            if depth < min_depth {
                continue;
            }
            // Clones draw with the target's paint wherever they have none.
            let source = match self.store.kind(id) {
                LayerKind::Clone(target) if self.store.is_alive(*target) => Some(*target),
                _ => None,
            };
            let filled = self
                .store
                .fill(id)
                .or_else(|| source.and_then(|t| self.store.fill(t)))
                .is_some();
            let pen_width = self
                .store
                .stroke(id)
                .or_else(|| source.and_then(|t| self.store.stroke(t)))
                .map(|pen| pen.width);
            if !filled && pen_width.is_none() {
                continue;
            }
            let absolute = self.cache.absolute_transform(&self.store, id);
            if !is_invertible(absolute) {
                continue;
            }
            let local = absolute.inverse() * point;
            let Some(geometry) = self.cache.geometry(&self.store, id) else {
                continue;
            };
            if hits(geometry, local, filled, pen_width, slack) {
                found = Some((id, depth));
                break;
            }
        }
        let (hit, depth) = found?;
        if depth == min_depth {
            Some(hit)
        } else {
            self.store.ancestors(hit).nth(depth - min_depth - 1)
        }
    }

    // -- Cache control --

    /// Starts (or nests) a scope in which notifications are held.
    pub fn suppress_invalidation(&mut self) {
        self.cache.suppress();
    }

    /// Ends a suppression scope. Returns `false` if none was active.
    pub fn restore_invalidation(&mut self) -> bool {
        self.cache.restore()
    }

    /// Takes the published change notifications.
    pub fn take_invalidations(&mut self) -> Vec<Invalidation> {
        self.cache.take_invalidations()
    }

    /// Takes the device keys the cache no longer references.
    pub fn take_retired(&mut self) -> Vec<ResourceKey> {
        self.cache.take_retired()
    }

    /// Drops cached geometry, bounds, and transforms.
    pub fn release_scene_resources(&mut self) {
        self.cache.release_scene();
    }

    /// Drops realized brushes, pens, and text layouts (e.g. on device loss).
    pub fn release_device_resources(&mut self) {
        self.cache.release_device();
    }

    /// Drops every cached value.
    pub fn release_resources(&mut self) {
        self.cache.release_scene();
        self.cache.release_device();
    }

    /// Runs `f` with `target`'s fill and stroke temporarily replaced.
    ///
    /// `None` keeps the target's own paint. Notifications raised by the swap
    /// and its undo are coalesced. Returns `None` without running `f` if
    /// `target` is already being substituted further up the stack.
    pub fn with_substituted_paint<R>(
        &mut self,
        target: LayerId,
        fill: Option<Brush>,
        stroke: Option<Pen>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> Option<R> {
        if self.substituting.contains(&target) {
            log::warn!("refusing re-entrant paint substitution of {target:?}");
            return None;
        }
        self.substituting.push(target);
        self.suppress_invalidation();

        let saved_fill = fill.map(|brush| {
            let old = self.store.fill(target).cloned();
            self.set_fill(target, Some(brush));
            old
        });
        let saved_stroke = stroke.map(|pen| {
            let old = self.store.stroke(target).cloned();
            self.set_stroke(target, Some(pen));
            old
        });

        let result = f(self);

        if let Some(old) = saved_fill {
            self.set_fill(target, old);
        }
        if let Some(old) = saved_stroke {
            self.set_stroke(target, old);
        }
        self.restore_invalidation();
        self.substituting.retain(|t| *t != target);
        Some(result)
    }

    fn sync(&mut self) {
        self.cache.sync(&mut self.store);
    }
}

fn hits(geometry: &BezPath, point: Point, filled: bool, pen_width: Option<f64>, slack: f64) -> bool {
    if filled && geometry.contains(point) {
        return true;
    }
    pen_width.is_some_and(|width| {
        let reach = width / 2.0 + slack;
        geometry
            .segments()
            .any(|seg| seg.nearest(point, 1e-6).distance_sq <= reach * reach)
    })
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use kurbo::{Size, Vec2};

    use super::*;
    use crate::cache::InvalidationKind;
    use crate::layer::RectangleShape;
    use crate::paint::Color;

    fn rect(w: f64, h: f64) -> LayerKind {
        LayerKind::Rectangle(RectangleShape {
            size: Size::new(w, h),
            corner_radius: 0.0,
        })
    }

    fn doc() -> Document {
        Document::new(Rect::new(0.0, 0.0, 100.0, 100.0))
    }

    fn filled(doc: &mut Document, kind: LayerKind, parent: LayerId) -> LayerId {
        let id = doc.create_layer(kind);
        doc.set_fill(id, Some(Brush::solid(Color::BLACK)));
        doc.add(parent, id, None).unwrap();
        id
    }

    #[test]
    fn global_scale_doubles_rectangle() {
        let mut doc = doc();
        let root = doc.root();
        let r = filled(&mut doc, rect(10.0, 10.0), root);
        assert_eq!(doc.absolute_bounds(r), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));

        doc.apply_transform(r, None, Some(Affine::scale(2.0))).unwrap();
        assert_eq!(doc.absolute_bounds(r), Some(Rect::new(0.0, 0.0, 20.0, 20.0)));
        assert_eq!(doc.bounds(root), Some(Rect::new(0.0, 0.0, 20.0, 20.0)));
    }

    #[test]
    fn root_is_immutable() {
        let mut doc = doc();
        let root = doc.root();
        let g = doc.create_layer(LayerKind::Group);
        assert_eq!(doc.add(g, root, None), Err(StructureError::RootImmutable));
        assert_eq!(doc.remove(root), Err(StructureError::RootImmutable));
        assert_eq!(doc.move_to(root, 0), Err(StructureError::RootImmutable));
        assert_eq!(doc.destroy(root), Err(StructureError::RootImmutable));
        assert_eq!(
            doc.set_transform(root, Affine::scale(2.0)),
            Err(StructureError::RootImmutable)
        );
        assert_eq!(
            doc.apply_transform(root, None, Some(Affine::scale(2.0))),
            Err(StructureError::RootImmutable)
        );
        assert_eq!(
            doc.absolute_transform(root),
            Affine::IDENTITY,
            "root stays at the identity"
        );
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let mut doc = doc();
        let root = doc.root();
        let bottom = filled(&mut doc, rect(50.0, 50.0), root);
        let top = filled(&mut doc, rect(20.0, 20.0), root);

        assert_eq!(doc.hit_test(Point::new(10.0, 10.0), 1), Some(top));
        assert_eq!(doc.hit_test(Point::new(40.0, 40.0), 1), Some(bottom));
        assert_eq!(doc.hit_test(Point::new(80.0, 80.0), 1), None);

        doc.set_hidden(top, true);
        assert_eq!(doc.hit_test(Point::new(10.0, 10.0), 1), Some(bottom));
    }

    #[test]
    fn hit_test_maps_through_transforms() {
        let mut doc = doc();
        let root = doc.root();
        let r = filled(&mut doc, rect(10.0, 10.0), root);
        doc.set_transform(r, Affine::translate(Vec2::new(50.0, 50.0))).unwrap();
        assert_eq!(doc.hit_test(Point::new(5.0, 5.0), 1), None);
        assert_eq!(doc.hit_test(Point::new(55.0, 55.0), 1), Some(r));
    }

    #[test]
    fn unpainted_clone_hits_with_target_paint() {
        let mut doc = doc();
        let root = doc.root();
        let source = filled(&mut doc, rect(10.0, 10.0), root);
        let clone = doc.create_layer(LayerKind::Clone(source));
        doc.set_transform(clone, Affine::translate(Vec2::new(50.0, 50.0))).unwrap();
        doc.add(root, clone, None).unwrap();

        assert_eq!(doc.hit_test(Point::new(55.0, 55.0), 1), Some(clone));
        assert_eq!(doc.hit_test(Point::new(5.0, 5.0), 1), Some(source));
    }

    #[test]
    fn hit_test_reports_ancestor_at_min_depth() {
        let mut doc = doc();
        let root = doc.root();
        let g = doc.create_layer(LayerKind::Group);
        doc.add(root, g, None).unwrap();
        let leaf = filled(&mut doc, rect(10.0, 10.0), g);

        assert_eq!(doc.hit_test(Point::new(5.0, 5.0), 1), Some(g));
        assert_eq!(doc.hit_test(Point::new(5.0, 5.0), 2), Some(leaf));
        assert_eq!(doc.hit_test(Point::new(5.0, 5.0), 3), None);
    }

    #[test]
    fn stroke_hit_uses_half_width() {
        let mut doc = doc();
        let root = doc.root();
        let r = doc.create_layer(rect(40.0, 40.0));
        doc.set_stroke(r, Some(Pen::new(Brush::solid(Color::BLACK), 4.0)));
        doc.add(root, r, None).unwrap();

        assert_eq!(doc.hit_test(Point::new(20.0, 1.5), 1), Some(r), "on the edge");
        assert_eq!(doc.hit_test(Point::new(20.0, 20.0), 1), None, "unfilled interior");
        assert_eq!(doc.hit_test(Point::new(20.0, -3.0), 1), None, "beyond half width");
    }

    #[test]
    fn substitution_swaps_and_restores() {
        let mut doc = doc();
        let root = doc.root();
        let target = filled(&mut doc, rect(10.0, 10.0), root);
        let _ = doc.take_invalidations();

        let red = Brush::solid(Color::rgb(1.0, 0.0, 0.0));
        let seen = doc.with_substituted_paint(target, Some(red.clone()), None, |doc| {
            doc.store().fill(target).cloned()
        });
        assert_eq!(seen, Some(Some(red)));
        assert_eq!(doc.store().fill(target), Some(&Brush::solid(Color::BLACK)));

        let fills: Vec<_> = doc
            .take_invalidations()
            .into_iter()
            .filter(|inv| inv.kind == InvalidationKind::Fill)
            .collect();
        assert_eq!(
            fills,
            vec![Invalidation {
                layer: target,
                kind: InvalidationKind::Fill
            }],
            "swap and restore coalesce to one notification"
        );
    }

    #[test]
    fn substitution_is_not_reentrant() {
        let mut doc = doc();
        let root = doc.root();
        let target = filled(&mut doc, rect(10.0, 10.0), root);
        let nested = doc.with_substituted_paint(target, None, None, |doc| {
            doc.with_substituted_paint(target, None, None, |_| ())
        });
        assert_eq!(nested, Some(None));
        assert_eq!(
            doc.with_substituted_paint(target, None, None, |_| 1),
            Some(1),
            "guard is released"
        );
    }

    #[test]
    fn destroy_removes_subtree() {
        let mut doc = doc();
        let root = doc.root();
        let g = doc.create_layer(LayerKind::Group);
        doc.add(root, g, None).unwrap();
        let a = filled(&mut doc, rect(1.0, 1.0), g);
        doc.destroy(g).unwrap();
        assert!(!doc.is_alive(g));
        assert!(!doc.is_alive(a));
        assert_eq!(doc.children(root).count(), 0);
    }

    #[test]
    fn install_swaps_documents() {
        let mut doc = doc();
        let root = doc.root();
        let _ = filled(&mut doc, rect(1.0, 1.0), root);

        let loaded = Document::new(Rect::new(0.0, 0.0, 640.0, 480.0));
        let old = doc.install(loaded);
        assert_eq!(old.store().len(), 2);
        assert_eq!(doc.store().len(), 1);
        assert_eq!(doc.canvas(), Rect::new(0.0, 0.0, 640.0, 480.0));
    }
}
