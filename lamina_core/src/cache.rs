// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazily memoized derived data.
//!
//! The [`CacheManager`] holds, per layer, the expensive values renderers and
//! tools ask for: local and absolute bounds, absolute transforms, geometry,
//! and realized device resources. Every entry is created on first query,
//! cleared when its inputs change, and recomputed on the next query. Nothing
//! is recomputed eagerly.
//!
//! # Invalidation
//!
//! After each document mutation the manager drains every
//! [`dirty`](crate::dirty) channel, clears the affected entries, and emits one
//! [`Invalidation`] per drained layer and channel. While suppression is
//! active ([`CacheManager::suppress`]), entries are still cleared (so reads
//! observe the new values) but notifications are held; when the outermost
//! suppression ends they are coalesced to one per layer and kind and
//! published together.
//!
//! # Tiers
//!
//! Scene data (geometry, bounds, transforms) and device data (brushes, pens,
//! text layouts) can be released independently, e.g. on device loss.
//! Every device key the cache drops is queued as *retired* so the backend can
//! free it.

use alloc::vec::Vec;
use core::mem;

use kurbo::{Affine, BezPath, Ellipse, Point, Rect, RoundedRect, Shape};
use understory_dirty::{Channel, EagerPolicy};

use crate::backend::{ResourceFactory, ResourceKey};
use crate::dirty;
use crate::layer::{INVALID, LayerId, LayerKind, LayerStore};
use crate::transform::map_bounds;

/// Cache tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheConfig {
    /// Maximum deviation when approximating curves (ellipses, arcs, rounded
    /// corners) with cubic Béziers.
    pub tolerance: f64,
    /// Extra distance, beyond half the pen width, that still counts as a
    /// stroke hit.
    pub hit_tolerance: f64,
}

impl CacheConfig {
    /// Creates a configuration with the given tolerances.
    #[must_use]
    pub const fn new(tolerance: f64, hit_tolerance: f64) -> Self {
        Self {
            tolerance,
            hit_tolerance,
        }
    }

    /// Tolerances suited to screen-resolution editing.
    #[must_use]
    pub const fn interactive() -> Self {
        Self::new(0.1, 0.0)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::interactive()
    }
}

/// What part of a layer's derived data changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvalidationKind {
    /// Geometry (kind data, or a clone target's geometry).
    Geometry,
    /// Local bounds (own geometry, or a descendant moved).
    Bounds,
    /// Absolute transform (own or an ancestor's transform, or re-parenting).
    Transform,
    /// Fill brush.
    Fill,
    /// Stroke pen.
    Stroke,
    /// Text layout.
    Text,
    /// Opacity, visibility, selection, clip, or name.
    Appearance,
    /// Child list.
    Structure,
}

/// A change notification for one layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Invalidation {
    /// The layer whose derived data changed.
    pub layer: LayerId,
    /// What changed.
    pub kind: InvalidationKind,
}

/// Number of recomputations per derived kind since the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Local bounds.
    pub bounds: u64,
    /// Absolute bounds.
    pub absolute_bounds: u64,
    /// Absolute transforms.
    pub absolute_transform: u64,
    /// Geometry.
    pub geometry: u64,
    /// Realized fills.
    pub fill: u64,
    /// Realized strokes.
    pub stroke: u64,
    /// Text layouts.
    pub text_layout: u64,
}

/// A cached value with a validity flag.
#[derive(Clone, Debug, Default)]
struct Entry<T> {
    value: T,
    valid: bool,
}

impl<T: Default> Entry<T> {
    fn get(&self) -> Option<&T> {
        self.valid.then_some(&self.value)
    }

    fn set(&mut self, value: T) {
        self.value = value;
        self.valid = true;
    }

    /// Invalidates the entry, returning the previous value if it was valid.
    fn clear(&mut self) -> Option<T> {
        mem::replace(&mut self.valid, false).then(|| mem::take(&mut self.value))
    }
}

/// Per-layer memoized derived data.
#[derive(Debug, Default)]
pub struct CacheManager {
    config: CacheConfig,

    // -- Scene tier --
    bounds: Vec<Entry<Option<Rect>>>,
    absolute_bounds: Vec<Entry<Option<Rect>>>,
    absolute_transform: Vec<Entry<Affine>>,
    geometry: Vec<Entry<Option<BezPath>>>,

    // -- Device tier --
    fill: Vec<Entry<Option<ResourceKey>>>,
    stroke: Vec<Entry<Option<ResourceKey>>>,
    text_layout: Vec<Entry<Option<ResourceKey>>>,

    /// Stack depth of each layer whose bounds are being computed, to cut
    /// clone references back into their own ancestry.
    visiting: Vec<Option<usize>>,
    depth: usize,
    /// Shallowest frame a cut pointed at and that has not finished yet.
    /// Values computed above it are truncated and not memoized.
    cut: Option<usize>,

    // -- Notifications --
    suppression: u32,
    held: Vec<Invalidation>,
    outbox: Vec<Invalidation>,
    retired: Vec<ResourceKey>,

    stats: CacheStats,
}

impl CacheManager {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Returns recompute counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Resets recompute counters to zero.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    // -- Queries --

    /// Returns the local bounds of a layer, or `None` if it has no extent
    /// (an empty group, or a clone of a destroyed layer).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn bounds(&mut self, store: &LayerStore, id: LayerId) -> Option<Rect> {
        let _ = store.kind(id);
        self.ensure_len(store.slot_count());
        self.bounds_at(store, id.index())
    }

    /// Returns the composed transform from layer space to document space.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn absolute_transform(&mut self, store: &LayerStore, id: LayerId) -> Affine {
        let _ = store.kind(id);
        self.ensure_len(store.slot_count());
        self.absolute_transform_at(store, id.index())
    }

    /// Returns the local bounds mapped to document space (corner-based).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn absolute_bounds(&mut self, store: &LayerStore, id: LayerId) -> Option<Rect> {
        let _ = store.kind(id);
        self.ensure_len(store.slot_count());
        let i = id.index() as usize;
        if let Some(value) = self.absolute_bounds[i].get() {
            return *value;
        }
        let value = self
            .bounds_at(store, id.index())
            .map(|b| map_bounds(b, self.absolute_transform_at(store, id.index())));
        self.stats.absolute_bounds += 1;
        self.absolute_bounds[i].set(value);
        value
    }

    /// Returns the geometry of a layer in its own coordinate space.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn geometry(&mut self, store: &LayerStore, id: LayerId) -> Option<&BezPath> {
        let _ = store.kind(id);
        self.ensure_len(store.slot_count());
        self.geometry_at(store, id.index())
    }

    /// Returns the realized fill of a layer.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn fill<F: ResourceFactory + ?Sized>(
        &mut self,
        store: &LayerStore,
        id: LayerId,
        factory: &mut F,
    ) -> Option<ResourceKey> {
        let brush = store.fill(id);
        self.ensure_len(store.slot_count());
        let i = id.index() as usize;
        if let Some(key) = self.fill[i].get() {
            return *key;
        }
        let key = brush.map(|b| factory.create_brush(b));
        log::trace!("realized fill for {id:?}: {key:?}");
        self.stats.fill += 1;
        self.fill[i].set(key);
        key
    }

    /// Returns the realized stroke of a layer.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn stroke<F: ResourceFactory + ?Sized>(
        &mut self,
        store: &LayerStore,
        id: LayerId,
        factory: &mut F,
    ) -> Option<ResourceKey> {
        let pen = store.stroke(id);
        self.ensure_len(store.slot_count());
        let i = id.index() as usize;
        if let Some(key) = self.stroke[i].get() {
            return *key;
        }
        let key = pen.map(|p| factory.create_pen(p));
        log::trace!("realized stroke for {id:?}: {key:?}");
        self.stats.stroke += 1;
        self.stroke[i].set(key);
        key
    }

    /// Returns the text layout of a text layer, `None` for other kinds.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn text_layout<F: ResourceFactory + ?Sized>(
        &mut self,
        store: &LayerStore,
        id: LayerId,
        factory: &mut F,
    ) -> Option<ResourceKey> {
        let kind = store.kind(id);
        self.ensure_len(store.slot_count());
        let i = id.index() as usize;
        if let Some(key) = self.text_layout[i].get() {
            return *key;
        }
        let key = match kind {
            LayerKind::Text(text) => Some(factory.create_text_layout(text)),
            _ => None,
        };
        self.stats.text_layout += 1;
        self.text_layout[i].set(key);
        key
    }

    // -- Suppression --

    /// Starts (or nests) a suppression scope.
    pub fn suppress(&mut self) {
        self.suppression += 1;
    }

    /// Ends a suppression scope, publishing coalesced notifications when the
    /// outermost scope ends.
    ///
    /// Returns `false` (and does nothing) if no scope is active.
    pub fn restore(&mut self) -> bool {
        if self.suppression == 0 {
            log::warn!("restore_invalidation called without matching suppress");
            return false;
        }
        self.suppression -= 1;
        if self.suppression == 0 {
            let held = mem::take(&mut self.held);
            let mut coalesced: Vec<Invalidation> = Vec::with_capacity(held.len());
            for inv in held {
                if !coalesced.contains(&inv) {
                    coalesced.push(inv);
                }
            }
            log::trace!("publishing {} coalesced invalidations", coalesced.len());
            self.outbox.extend(coalesced);
        }
        true
    }

    /// Returns whether a suppression scope is active.
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.suppression > 0
    }

    /// Takes every published notification, oldest first.
    pub fn take_invalidations(&mut self) -> Vec<Invalidation> {
        mem::take(&mut self.outbox)
    }

    /// Takes every device key the cache has dropped.
    pub fn take_retired(&mut self) -> Vec<ResourceKey> {
        mem::take(&mut self.retired)
    }

    // -- Release --

    /// Drops all geometry, bounds, and transform entries.
    pub fn release_scene(&mut self) {
        log::debug!("releasing scene resources for {} slots", self.geometry.len());
        for i in 0..self.geometry.len() {
            self.bounds[i].clear();
            self.absolute_bounds[i].clear();
            self.absolute_transform[i].clear();
            self.geometry[i].clear();
        }
    }

    /// Drops all realized device resources, retiring their keys.
    pub fn release_device(&mut self) {
        log::debug!("releasing device resources for {} slots", self.fill.len());
        for i in 0..self.fill.len() {
            self.clear_device(i);
        }
    }

    // -- Dispatch --

    /// Drains every dirty channel, clears stale entries, and routes
    /// notifications to the outbox (or holds them while suppressed).
    pub(crate) fn sync(&mut self, store: &mut LayerStore) {
        self.ensure_len(store.slot_count());

        for idx in mem::take(&mut store.pending_removed) {
            self.forget(idx as usize);
        }
        for idx in mem::take(&mut store.pending_added) {
            self.forget(idx as usize);
        }

        let geometry = drain(store, dirty::GEOMETRY, true);
        for &idx in &geometry {
            if store.is_slot_live(idx) {
                // Geometry feeds local bounds, which feed every ancestor.
                store.dirty.mark_with(idx, dirty::BOUNDS, &EagerPolicy);
            }
            let i = idx as usize;
            self.geometry[i].clear();
            self.bounds[i].clear();
            self.absolute_bounds[i].clear();
        }
        self.publish(store, &geometry, InvalidationKind::Geometry);

        let bounds = drain(store, dirty::BOUNDS, true);
        for &idx in &bounds {
            let i = idx as usize;
            self.bounds[i].clear();
            self.absolute_bounds[i].clear();
        }
        self.publish(store, &bounds, InvalidationKind::Bounds);

        let transforms = drain(store, dirty::TRANSFORM, true);
        for &idx in &transforms {
            let i = idx as usize;
            self.absolute_transform[i].clear();
            self.absolute_bounds[i].clear();
        }
        self.publish(store, &transforms, InvalidationKind::Transform);

        let fills = drain(store, dirty::FILL, false);
        for &idx in &fills {
            self.retire(Slot::Fill, idx as usize);
        }
        self.publish(store, &fills, InvalidationKind::Fill);

        let strokes = drain(store, dirty::STROKE, false);
        for &idx in &strokes {
            self.retire(Slot::Stroke, idx as usize);
        }
        self.publish(store, &strokes, InvalidationKind::Stroke);

        let texts = drain(store, dirty::TEXT, false);
        for &idx in &texts {
            self.retire(Slot::Text, idx as usize);
        }
        self.publish(store, &texts, InvalidationKind::Text);

        let appearance = drain(store, dirty::APPEARANCE, false);
        self.publish(store, &appearance, InvalidationKind::Appearance);

        let topology = drain(store, dirty::TOPOLOGY, false);
        self.publish(store, &topology, InvalidationKind::Structure);
    }

    // -- Internal helpers --

    fn ensure_len(&mut self, len: usize) {
        if self.geometry.len() >= len {
            return;
        }
        self.bounds.resize_with(len, Entry::default);
        self.absolute_bounds.resize_with(len, Entry::default);
        self.absolute_transform.resize_with(len, Entry::default);
        self.geometry.resize_with(len, Entry::default);
        self.fill.resize_with(len, Entry::default);
        self.stroke.resize_with(len, Entry::default);
        self.text_layout.resize_with(len, Entry::default);
        self.visiting.resize(len, None);
    }

    fn publish(&mut self, store: &LayerStore, keys: &[u32], kind: InvalidationKind) {
        let mut count = 0_usize;
        for &idx in keys {
            if !store.is_slot_live(idx) {
                continue;
            }
            let inv = Invalidation {
                layer: store.id_at(idx),
                kind,
            };
            if self.suppression > 0 {
                self.held.push(inv);
            } else {
                self.outbox.push(inv);
            }
            count += 1;
        }
        if count > 0 {
            log::trace!(
                "{count} {kind:?} invalidations ({})",
                if self.suppression > 0 { "held" } else { "published" }
            );
        }
    }

    /// Resets every entry of a slot that was destroyed or reallocated.
    fn forget(&mut self, i: usize) {
        self.bounds[i].clear();
        self.absolute_bounds[i].clear();
        self.absolute_transform[i].clear();
        self.geometry[i].clear();
        self.clear_device(i);
    }

    fn clear_device(&mut self, i: usize) {
        self.retire(Slot::Fill, i);
        self.retire(Slot::Stroke, i);
        self.retire(Slot::Text, i);
    }

    fn retire(&mut self, slot: Slot, i: usize) {
        let entry = match slot {
            Slot::Fill => &mut self.fill[i],
            Slot::Stroke => &mut self.stroke[i],
            Slot::Text => &mut self.text_layout[i],
        };
        if let Some(Some(key)) = entry.clear() {
            self.retired.push(key);
        }
    }

    fn bounds_at(&mut self, store: &LayerStore, idx: u32) -> Option<Rect> {
        let i = idx as usize;
        if let Some(value) = self.bounds[i].get() {
            return *value;
        }
        if let Some(depth) = self.visiting[i] {
            self.cut = Some(self.cut.map_or(depth, |cut| cut.min(depth)));
            return None;
        }
        let depth = self.depth;
        self.visiting[i] = Some(depth);
        self.depth += 1;
        let value = match &store.kind[i] {
            LayerKind::Group => {
                let mut acc: Option<Rect> = None;
                let mut c = store.first_child[i];
                while c != INVALID {
                    if let Some(child) = self.bounds_at(store, c) {
                        let mapped = map_bounds(child, store.local_transform[c as usize]);
                        acc = Some(acc.map_or(mapped, |a| a.union(mapped)));
                    }
                    c = store.next_sibling[c as usize];
                }
                acc
            }
            LayerKind::Rectangle(rect) => Some(Rect::from_origin_size(Point::ORIGIN, rect.size)),
            LayerKind::Ellipse(ellipse) => Some(Rect::new(
                -ellipse.radii.x,
                -ellipse.radii.y,
                ellipse.radii.x,
                ellipse.radii.y,
            )),
            LayerKind::Path(_) => self.geometry_at(store, idx).map(Shape::bounding_box),
            LayerKind::Text(text) => Some(Rect::from_origin_size(Point::ORIGIN, text.size)),
            LayerKind::Clone(target) => {
                if store.is_alive(*target) {
                    self.bounds_at(store, target.index())
                } else {
                    None
                }
            }
        };
        self.depth -= 1;
        self.visiting[i] = None;
        log::trace!("recomputed bounds for slot {idx}: {value:?}");
        self.stats.bounds += 1;
        match self.cut {
            Some(cut) if cut < depth => {
                log::trace!("bounds for slot {idx} cut short, not memoized");
            }
            _ => {
                self.cut = None;
                self.bounds[i].set(value);
            }
        }
        value
    }

    fn absolute_transform_at(&mut self, store: &LayerStore, idx: u32) -> Affine {
        let i = idx as usize;
        if let Some(value) = self.absolute_transform[i].get() {
            return *value;
        }
        let local = store.local_transform[i];
        let p = store.parent[i];
        let value = if p == INVALID {
            local
        } else {
            self.absolute_transform_at(store, p) * local
        };
        self.stats.absolute_transform += 1;
        self.absolute_transform[i].set(value);
        value
    }

    fn geometry_at(&mut self, store: &LayerStore, idx: u32) -> Option<&BezPath> {
        let i = idx as usize;
        if !self.geometry[i].valid {
            let tolerance = self.config.tolerance;
            let value = match &store.kind[i] {
                LayerKind::Group => None,
                LayerKind::Rectangle(rect) => {
                    let r = Rect::from_origin_size(Point::ORIGIN, rect.size);
                    Some(if rect.corner_radius > 0.0 {
                        RoundedRect::from_rect(r, rect.corner_radius).to_path(tolerance)
                    } else {
                        r.to_path(tolerance)
                    })
                }
                LayerKind::Ellipse(ellipse) => {
                    Some(Ellipse::new(Point::ORIGIN, ellipse.radii, 0.0).to_path(tolerance))
                }
                LayerKind::Path(data) => Some(data.to_bez_path(tolerance)),
                LayerKind::Text(text) => {
                    Some(Rect::from_origin_size(Point::ORIGIN, text.size).to_path(tolerance))
                }
                LayerKind::Clone(target) => {
                    if store.is_alive(*target) {
                        self.geometry_at(store, target.index()).cloned()
                    } else {
                        None
                    }
                }
            };
            log::trace!("rebuilt geometry for slot {idx}");
            self.stats.geometry += 1;
            self.geometry[i].set(value);
        }
        self.geometry[i].get().and_then(Option::as_ref)
    }
}

#[derive(Clone, Copy)]
enum Slot {
    Fill,
    Stroke,
    Text,
}

fn drain(store: &mut LayerStore, channel: Channel, propagating: bool) -> Vec<u32> {
    if propagating {
        store
            .dirty
            .drain(channel)
            .affected()
            .deterministic()
            .run()
            .collect()
    } else {
        store.dirty.drain(channel).deterministic().run().collect()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::{Size, Vec2};

    use super::*;
    use crate::layer::{EllipseShape, RectangleShape};
    use crate::paint::{Brush, Color, Pen};

    fn rect(w: f64, h: f64) -> LayerKind {
        LayerKind::Rectangle(RectangleShape {
            size: Size::new(w, h),
            corner_radius: 0.0,
        })
    }

    struct Counter(u64);

    impl ResourceFactory for Counter {
        fn create_brush(&mut self, _: &Brush) -> ResourceKey {
            self.0 += 1;
            ResourceKey(self.0)
        }
        fn create_pen(&mut self, _: &Pen) -> ResourceKey {
            self.0 += 1;
            ResourceKey(self.0)
        }
        fn create_text_layout(&mut self, _: &crate::layer::TextBlock) -> ResourceKey {
            self.0 += 1;
            ResourceKey(self.0)
        }
    }

    fn setup() -> (LayerStore, CacheManager, LayerId) {
        let mut store = LayerStore::new();
        let root = store.create_layer(LayerKind::Group);
        let mut cache = CacheManager::new(CacheConfig::default());
        cache.sync(&mut store);
        (store, cache, root)
    }

    #[test]
    fn bounds_are_memoized() {
        let (mut store, mut cache, root) = setup();
        let a = store.create_layer(rect(10.0, 20.0));
        store.insert_child(root, a, None).unwrap();
        cache.sync(&mut store);

        let first = cache.bounds(&store, root);
        let computed = cache.stats().bounds;
        let second = cache.bounds(&store, root);
        assert_eq!(first, second);
        assert_eq!(
            cache.stats().bounds,
            computed,
            "second query must not recompute"
        );
        assert_eq!(first, Some(Rect::new(0.0, 0.0, 10.0, 20.0)));
    }

    #[test]
    fn child_transform_invalidates_ancestor_bounds() {
        let (mut store, mut cache, root) = setup();
        let g = store.create_layer(LayerKind::Group);
        let a = store.create_layer(rect(10.0, 10.0));
        store.insert_child(root, g, None).unwrap();
        store.insert_child(g, a, None).unwrap();
        cache.sync(&mut store);
        assert_eq!(
            cache.bounds(&store, root),
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        );

        store.set_transform(a, Affine::translate(Vec2::new(5.0, 0.0)));
        cache.sync(&mut store);
        assert_eq!(
            cache.bounds(&store, root),
            Some(Rect::new(5.0, 0.0, 15.0, 10.0)),
            "root bounds follow a grandchild's transform"
        );
    }

    #[test]
    fn parent_transform_invalidates_descendant_absolutes() {
        let (mut store, mut cache, root) = setup();
        let g = store.create_layer(LayerKind::Group);
        let a = store.create_layer(rect(10.0, 10.0));
        store.insert_child(root, g, None).unwrap();
        store.insert_child(g, a, None).unwrap();
        cache.sync(&mut store);
        assert_eq!(cache.absolute_transform(&store, a), Affine::IDENTITY);

        store.set_transform(g, Affine::scale(2.0));
        cache.sync(&mut store);
        assert_eq!(cache.absolute_transform(&store, a), Affine::scale(2.0));
        assert_eq!(
            cache.absolute_bounds(&store, a),
            Some(Rect::new(0.0, 0.0, 20.0, 20.0))
        );
    }

    #[test]
    fn empty_group_has_no_bounds() {
        let (store, mut cache, root) = setup();
        assert_eq!(cache.bounds(&store, root), None);
    }

    #[test]
    fn ellipse_is_centered() {
        let (mut store, mut cache, _) = setup();
        let e = store.create_layer(LayerKind::Ellipse(EllipseShape {
            radii: Vec2::new(4.0, 2.0),
        }));
        cache.sync(&mut store);
        assert_eq!(
            cache.bounds(&store, e),
            Some(Rect::new(-4.0, -2.0, 4.0, 2.0))
        );
        let path_box = cache.geometry(&store, e).map(Shape::bounding_box);
        let path_box = path_box.expect("ellipse geometry");
        assert!((path_box.width() - 8.0).abs() < 0.2);
    }

    #[test]
    fn clone_follows_target_geometry() {
        let (mut store, mut cache, _) = setup();
        let target = store.create_layer(rect(10.0, 10.0));
        let clone = store.create_layer(LayerKind::Clone(target));
        cache.sync(&mut store);
        assert_eq!(
            cache.bounds(&store, clone),
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        );

        store.set_kind(target, rect(30.0, 5.0)).unwrap();
        cache.sync(&mut store);
        let invalidations = cache.take_invalidations();
        assert!(
            invalidations.contains(&Invalidation {
                layer: clone,
                kind: InvalidationKind::Geometry
            }),
            "clone is notified when its target changes"
        );
        assert_eq!(
            cache.bounds(&store, clone),
            Some(Rect::new(0.0, 0.0, 30.0, 5.0))
        );

        store.destroy_layer(target);
        cache.sync(&mut store);
        assert_eq!(cache.bounds(&store, clone), None);
        assert!(cache.geometry(&store, clone).is_none());
    }

    #[test]
    fn clone_of_own_ancestor_terminates() {
        let (mut store, mut cache, root) = setup();
        let g = store.create_layer(LayerKind::Group);
        let a = store.create_layer(rect(10.0, 10.0));
        store.insert_child(root, g, None).unwrap();
        store.insert_child(g, a, None).unwrap();
        let clone = store.create_layer(LayerKind::Clone(g));
        store.insert_child(g, clone, None).unwrap();
        cache.sync(&mut store);
        assert_eq!(
            cache.bounds(&store, g),
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        );
        assert_eq!(
            cache.bounds(&store, clone),
            Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
            "a clone seen through its own target is not stuck at None"
        );
    }

    #[test]
    fn realized_resources_retire_on_change() {
        let (mut store, mut cache, _) = setup();
        let mut factory = Counter(0);
        let a = store.create_layer(rect(1.0, 1.0));
        store.set_fill(a, Some(Brush::solid(Color::BLACK)));
        cache.sync(&mut store);

        let key = cache.fill(&store, a, &mut factory);
        assert_eq!(key, Some(ResourceKey(1)));
        assert_eq!(cache.fill(&store, a, &mut factory), key, "memoized");

        store.set_fill(a, Some(Brush::solid(Color::WHITE)));
        cache.sync(&mut store);
        assert_eq!(cache.take_retired(), [ResourceKey(1)]);
        assert_eq!(cache.fill(&store, a, &mut factory), Some(ResourceKey(2)));
    }

    #[test]
    fn device_release_keeps_scene() {
        let (mut store, mut cache, _) = setup();
        let mut factory = Counter(0);
        let a = store.create_layer(rect(1.0, 1.0));
        store.set_stroke(a, Some(Pen::new(Brush::solid(Color::BLACK), 1.0)));
        cache.sync(&mut store);
        let _ = cache.bounds(&store, a);
        let _ = cache.stroke(&store, a, &mut factory);

        let before = cache.stats();
        cache.release_device();
        let _ = cache.bounds(&store, a);
        let _ = cache.stroke(&store, a, &mut factory);
        let after = cache.stats();
        assert_eq!(after.bounds, before.bounds, "scene tier survives");
        assert_eq!(after.stroke, before.stroke + 1, "device tier rebuilt");
        assert_eq!(cache.take_retired(), [ResourceKey(1)]);

        cache.release_scene();
        let _ = cache.bounds(&store, a);
        assert_eq!(cache.stats().bounds, before.bounds + 1);
    }

    #[test]
    fn suppression_coalesces() {
        let (mut store, mut cache, _) = setup();
        let a = store.create_layer(rect(1.0, 1.0));
        cache.sync(&mut store);
        let _ = cache.take_invalidations();

        cache.suppress();
        cache.suppress();
        for shade in [0.1, 0.2, 0.3] {
            store.set_fill(a, Some(Brush::solid(Color::rgb(shade, 0.0, 0.0))));
            cache.sync(&mut store);
        }
        assert!(cache.restore());
        assert!(cache.take_invalidations().is_empty(), "still nested");
        assert!(cache.restore());
        let published: Vec<_> = cache.take_invalidations();
        assert_eq!(
            published,
            [Invalidation {
                layer: a,
                kind: InvalidationKind::Fill
            }]
        );
        assert!(!cache.restore(), "unbalanced restore is a no-op");
    }
}
