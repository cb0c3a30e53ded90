// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Commands that reshape the layer tree.

use alloc::vec::Vec;

use kurbo::Affine;

use super::{check_targets, detach_all, replacement_slot, restore_all, sibling_placements};
use crate::document::{Document, Placement};
use crate::error::{CommandError, StructureError};
use crate::layer::{LayerId, LayerKind};

/// Attaches an existing detached layer.
#[derive(Clone, Debug)]
pub struct AddLayer {
    layer: LayerId,
    parent: LayerId,
    index: Option<usize>,
}

impl AddLayer {
    /// Attaches `layer` to `parent` at `index` (on top when `None`).
    #[must_use]
    pub fn new(layer: LayerId, parent: LayerId, index: Option<usize>) -> Self {
        Self {
            layer,
            parent,
            index,
        }
    }

    /// Returns the layer being added.
    #[must_use]
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub(super) fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        doc.add(self.parent, self.layer, self.index)?;
        Ok(())
    }

    pub(super) fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        doc.remove(self.layer)?;
        Ok(())
    }
}

/// Detaches a set of layers, remembering where each one was.
#[derive(Clone, Debug)]
pub struct RemoveLayers {
    layers: Vec<LayerId>,
    /// Captured placements ordered by parent then index.
    removed: Vec<(LayerId, Placement)>,
}

impl RemoveLayers {
    /// Removes `layers`. They may have different parents.
    #[must_use]
    pub fn new(layers: Vec<LayerId>) -> Self {
        Self {
            layers,
            removed: Vec::new(),
        }
    }

    /// Returns the layers being removed.
    #[must_use]
    pub fn layers(&self) -> &[LayerId] {
        &self.layers
    }

    pub(super) fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        check_targets(&self.layers)?;
        let mut removed = Vec::with_capacity(self.layers.len());
        for &layer in &self.layers {
            if layer == doc.root() {
                return Err(StructureError::RootImmutable.into());
            }
            let placement = doc
                .placement(layer)
                .ok_or(StructureError::NotAChild(layer))?;
            removed.push((layer, placement));
        }
        removed.sort_by_key(|(_, p)| (p.parent, p.index));
        // Highest index first keeps the captured indices of the rest valid.
        detach_all(doc, &removed)?;
        self.removed = removed;
        Ok(())
    }

    pub(super) fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        restore_all(doc, &self.removed)
    }
}

/// Wraps sibling layers in a new group placed where the topmost of them was.
#[derive(Clone, Debug)]
pub struct GroupLayers {
    layers: Vec<LayerId>,
    group: LayerId,
    /// Members bottom first, with where they were before grouping.
    members: Vec<(LayerId, Placement)>,
}

impl GroupLayers {
    /// Creates the (detached) group that will hold `layers`.
    ///
    /// The group is owned by the command until it is applied.
    pub fn new(doc: &mut Document, layers: Vec<LayerId>) -> Self {
        let group = doc.create_layer(LayerKind::Group);
        doc.set_name(group, "Group");
        Self {
            layers,
            group,
            members: Vec::new(),
        }
    }

    /// Returns the layers being grouped.
    #[must_use]
    pub fn layers(&self) -> &[LayerId] {
        &self.layers
    }

    /// Returns the group layer this command inserts.
    #[must_use]
    pub fn group(&self) -> LayerId {
        self.group
    }

    pub(super) fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        let placed = sibling_placements(doc, &self.layers)?;
        if doc.parent(self.group).is_some() {
            return Err(StructureError::AlreadyParented(self.group).into());
        }
        let parent = placed[0].1.parent;
        let slot = replacement_slot(&placed);
        detach_all(doc, &placed)?;
        doc.add(parent, self.group, Some(slot))?;
        for (layer, _) in &placed {
            doc.add(self.group, *layer, None)?;
        }
        doc.record_group_origin(self.group, placed.clone());
        self.members = placed;
        Ok(())
    }

    pub(super) fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        for (layer, _) in self.members.iter().rev() {
            doc.remove(*layer)?;
        }
        doc.remove(self.group)?;
        restore_all(doc, &self.members)
    }
}

/// Dissolves a group, moving its children into the group's parent.
///
/// Children keep their on-screen position: each child's local transform is
/// pre-multiplied by the group's. A group made by [`GroupLayers`] that is
/// still where grouping left it, with the same children and siblings, puts
/// every child back at the index it had before grouping. Otherwise the
/// children take the group's slot, bottom first.
#[derive(Clone, Debug)]
pub struct UngroupLayer {
    group: LayerId,
    placement: Option<Placement>,
    /// Children bottom first with their local transforms inside the group.
    children: Vec<(LayerId, Affine)>,
}

impl UngroupLayer {
    /// Ungroups `group`.
    #[must_use]
    pub fn new(group: LayerId) -> Self {
        Self {
            group,
            placement: None,
            children: Vec::new(),
        }
    }

    /// Returns the group being dissolved.
    #[must_use]
    pub fn group(&self) -> LayerId {
        self.group
    }

    pub(super) fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        if self.group == doc.root() {
            return Err(StructureError::RootImmutable.into());
        }
        if !matches!(doc.store().kind(self.group), LayerKind::Group) {
            return Err(CommandError::NotAGroup(self.group));
        }
        let placement = doc
            .placement(self.group)
            .ok_or(StructureError::NotAChild(self.group))?;
        let outer = doc.store().local_transform(self.group);
        let children: Vec<_> = doc
            .children(self.group)
            .map(|child| (child, doc.store().local_transform(child)))
            .collect();
        let targets: Vec<Placement> = match doc.group_origin(self.group) {
            Some(origin) => origin.iter().map(|(_, at)| *at).collect(),
            None => (0..children.len())
                .map(|offset| Placement {
                    parent: placement.parent,
                    index: placement.index + offset,
                })
                .collect(),
        };

        for (child, _) in children.iter().rev() {
            doc.remove(*child)?;
        }
        doc.remove(self.group)?;
        // Ascending indices, so each insert lands at its final slot.
        for ((child, local), at) in children.iter().zip(&targets) {
            doc.set_transform(*child, outer * *local)?;
            doc.add(at.parent, *child, Some(at.index))?;
        }

        self.placement = Some(placement);
        self.children = children;
        Ok(())
    }

    pub(super) fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        let Some(placement) = self.placement else {
            return Ok(());
        };
        for (child, _) in self.children.iter().rev() {
            doc.remove(*child)?;
        }
        doc.add(placement.parent, self.group, Some(placement.index))?;
        for (child, local) in &self.children {
            doc.set_transform(*child, *local)?;
            doc.add(self.group, *child, None)?;
        }
        Ok(())
    }
}

/// Where [`ChangeZOrder`] moves a layer among its siblings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZOrder {
    /// One step toward the top.
    Forward,
    /// One step toward the bottom.
    Backward,
    /// To the top of the sibling list.
    ToFront,
    /// To the bottom of the sibling list.
    ToBack,
    /// To an explicit index.
    To(usize),
}

/// Reorders a layer among its siblings.
#[derive(Clone, Debug)]
pub struct ChangeZOrder {
    layer: LayerId,
    to: ZOrder,
    from: Option<usize>,
}

impl ChangeZOrder {
    /// Moves `layer` as described by `to`.
    #[must_use]
    pub fn new(layer: LayerId, to: ZOrder) -> Self {
        Self {
            layer,
            to,
            from: None,
        }
    }

    /// Returns the layer being moved.
    #[must_use]
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub(super) fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        if self.layer == doc.root() {
            return Err(StructureError::RootImmutable.into());
        }
        let placement = doc
            .placement(self.layer)
            .ok_or(StructureError::NotAChild(self.layer))?;
        let last = doc.store().child_count(placement.parent) - 1;
        let index = match self.to {
            ZOrder::Forward => (placement.index + 1).min(last),
            ZOrder::Backward => placement.index.saturating_sub(1),
            ZOrder::ToFront => last,
            ZOrder::ToBack => 0,
            ZOrder::To(index) => index,
        };
        self.from = Some(doc.move_to(self.layer, index)?);
        Ok(())
    }

    pub(super) fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        if let Some(from) = self.from {
            doc.move_to(self.layer, from)?;
        }
        Ok(())
    }
}
