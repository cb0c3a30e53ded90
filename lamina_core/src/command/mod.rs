// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reversible document edits.
//!
//! Every user-visible edit is a [`Command`] wrapping one [`Operation`] from a
//! closed set. Applying and reverting are exact inverses: after
//! `apply` then `revert` the scene graph, transforms, and paint are what they
//! were before.
//!
//! Preconditions are checked before any mutation, so an `Err` from `apply`
//! leaves the document untouched.
//!
//! Commands that create layers (adding, grouping, combining) own those
//! layers while detached; when a command is discarded from the
//! [`History`](crate::history::History) the layers nobody can reach any more
//! are destroyed.

mod combine;
mod property;
mod structure;
mod transform;

use alloc::vec::Vec;
use core::fmt;
use core::mem;

pub use combine::CombinePaths;
pub use property::{ModifyPaint, ModifyText};
pub use structure::{AddLayer, ChangeZOrder, GroupLayers, RemoveLayers, UngroupLayer, ZOrder};
pub use transform::TransformLayers;

use crate::document::{Document, Placement};
use crate::error::{CommandError, StructureError};
use crate::layer::LayerId;
use crate::time::HostTime;

/// Monotonic command identifier assigned by the history.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CommandId(pub u64);

impl fmt::Debug for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandId({})", self.0)
    }
}

/// The closed set of edits.
#[derive(Clone, Debug)]
pub enum Operation {
    /// See [`AddLayer`].
    AddLayer(AddLayer),
    /// See [`RemoveLayers`].
    RemoveLayers(RemoveLayers),
    /// See [`GroupLayers`].
    GroupLayers(GroupLayers),
    /// See [`UngroupLayer`].
    UngroupLayer(UngroupLayer),
    /// See [`TransformLayers`].
    TransformLayers(TransformLayers),
    /// See [`CombinePaths`].
    CombinePaths(CombinePaths),
    /// See [`ChangeZOrder`].
    ChangeZOrder(ChangeZOrder),
    /// See [`ModifyText`].
    ModifyText(ModifyText),
    /// See [`ModifyPaint`].
    ModifyPaint(ModifyPaint),
}

macro_rules! operation_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Operation {
                fn from(op: $variant) -> Self {
                    Self::$variant(op)
                }
            }

            impl From<$variant> for Command {
                fn from(op: $variant) -> Self {
                    Self::new(Operation::$variant(op))
                }
            }
        )*
    };
}

operation_from!(
    AddLayer,
    RemoveLayers,
    GroupLayers,
    UngroupLayer,
    TransformLayers,
    CombinePaths,
    ChangeZOrder,
    ModifyText,
    ModifyPaint,
);

/// A recorded edit: an operation plus its identity and timestamp.
#[derive(Clone, Debug)]
pub struct Command {
    id: CommandId,
    time: HostTime,
    op: Operation,
}

impl Command {
    /// Wraps an operation. Identity and time are assigned when the history
    /// records it.
    #[must_use]
    pub fn new(op: Operation) -> Self {
        Self {
            id: CommandId::default(),
            time: HostTime::default(),
            op,
        }
    }

    /// Returns the identifier (zero until recorded).
    #[must_use]
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Returns when the command was recorded (or last merged into).
    #[must_use]
    pub fn time(&self) -> HostTime {
        self.time
    }

    /// Returns the wrapped operation.
    #[must_use]
    pub fn operation(&self) -> &Operation {
        &self.op
    }

    /// Returns a short human-readable description for undo menus.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match &self.op {
            Operation::AddLayer(_) => "Add Layer",
            Operation::RemoveLayers(_) => "Delete",
            Operation::GroupLayers(_) => "Group",
            Operation::UngroupLayer(_) => "Ungroup",
            Operation::TransformLayers(_) => "Transform",
            Operation::CombinePaths(op) => op.description(),
            Operation::ChangeZOrder(_) => "Arrange",
            Operation::ModifyText(_) => "Edit Text",
            Operation::ModifyPaint(_) => "Change Paint",
        }
    }

    /// Returns the layers this command edits.
    #[must_use]
    pub fn targets(&self) -> Vec<LayerId> {
        match &self.op {
            Operation::AddLayer(op) => alloc::vec![op.layer()],
            Operation::RemoveLayers(op) => op.layers().to_vec(),
            Operation::GroupLayers(op) => op.layers().to_vec(),
            Operation::UngroupLayer(op) => alloc::vec![op.group()],
            Operation::TransformLayers(op) => op.layers().to_vec(),
            Operation::CombinePaths(op) => op.operands().to_vec(),
            Operation::ChangeZOrder(op) => alloc::vec![op.layer()],
            Operation::ModifyText(op) => alloc::vec![op.layer()],
            Operation::ModifyPaint(op) => op.layers().to_vec(),
        }
    }

    /// Performs the edit.
    ///
    /// # Errors
    ///
    /// Fails without modifying the document if a precondition does not hold.
    pub fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        match &mut self.op {
            Operation::AddLayer(op) => op.apply(doc),
            Operation::RemoveLayers(op) => op.apply(doc),
            Operation::GroupLayers(op) => op.apply(doc),
            Operation::UngroupLayer(op) => op.apply(doc),
            Operation::TransformLayers(op) => op.apply(doc),
            Operation::CombinePaths(op) => op.apply(doc),
            Operation::ChangeZOrder(op) => op.apply(doc),
            Operation::ModifyText(op) => op.apply(doc),
            Operation::ModifyPaint(op) => op.apply(doc),
        }
    }

    /// Undoes a previous [`apply`](Self::apply).
    ///
    /// # Errors
    ///
    /// Fails if the document was changed structurally behind the command's
    /// back so that the inverse edit no longer fits.
    pub fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        match &mut self.op {
            Operation::AddLayer(op) => op.revert(doc),
            Operation::RemoveLayers(op) => op.revert(doc),
            Operation::GroupLayers(op) => op.revert(doc),
            Operation::UngroupLayer(op) => op.revert(doc),
            Operation::TransformLayers(op) => op.revert(doc),
            Operation::CombinePaths(op) => op.revert(doc),
            Operation::ChangeZOrder(op) => op.revert(doc),
            Operation::ModifyText(op) => op.revert(doc),
            Operation::ModifyPaint(op) => op.revert(doc),
        }
    }

    /// Returns whether `other` is the same kind of edit on exactly the same
    /// set of layers.
    #[must_use]
    pub fn same_kind_and_targets(&self, other: &Self) -> bool {
        mem::discriminant(&self.op) == mem::discriminant(&other.op)
            && same_set(&self.targets(), &other.targets())
    }

    /// Combines this command with a newer one into a single equivalent
    /// command, keeping this command's identity and captured originals.
    ///
    /// Returns `None` when the pair cannot be merged.
    #[must_use]
    pub fn merge(&self, newer: &Self) -> Option<Self> {
        let op = match (&self.op, &newer.op) {
            (Operation::TransformLayers(a), Operation::TransformLayers(b)) => {
                Operation::TransformLayers(a.merge(b)?)
            }
            (Operation::ModifyText(a), Operation::ModifyText(b)) => {
                Operation::ModifyText(a.merge(b)?)
            }
            (Operation::ModifyPaint(a), Operation::ModifyPaint(b)) => {
                Operation::ModifyPaint(a.merge(b)?)
            }
            _ => return None,
        };
        Some(Self {
            id: self.id,
            time: newer.time,
            op,
        })
    }

    pub(crate) fn stamp(&mut self, id: CommandId, time: HostTime) {
        self.id = id;
        self.time = time;
    }

    /// Returns whether this command names `layer`, as a target or as a
    /// layer it creates.
    pub(crate) fn refers_to(&self, layer: LayerId) -> bool {
        let created = match &self.op {
            Operation::GroupLayers(op) => Some(op.group()),
            Operation::CombinePaths(op) => Some(op.result()),
            _ => None,
        };
        created == Some(layer) || self.targets().contains(&layer)
    }

    /// Layers that stay detached while this command is reverted.
    pub(crate) fn detached_when_reverted(&self) -> Vec<LayerId> {
        match &self.op {
            Operation::AddLayer(op) => alloc::vec![op.layer()],
            Operation::GroupLayers(op) => alloc::vec![op.group()],
            Operation::CombinePaths(op) => alloc::vec![op.result()],
            _ => Vec::new(),
        }
    }

    /// Layers that stay detached while this command is applied.
    pub(crate) fn detached_when_applied(&self) -> Vec<LayerId> {
        match &self.op {
            Operation::RemoveLayers(op) => op.layers().to_vec(),
            Operation::UngroupLayer(op) => alloc::vec![op.group()],
            Operation::CombinePaths(op) => op.operands().to_vec(),
            _ => Vec::new(),
        }
    }
}

// -- Shared precondition checks --

/// Rejects empty target lists and duplicates.
fn check_targets(targets: &[LayerId]) -> Result<(), CommandError> {
    if targets.is_empty() {
        return Err(CommandError::EmptyTargets);
    }
    for (i, a) in targets.iter().enumerate() {
        if targets[..i].contains(a) {
            return Err(CommandError::DuplicateTarget(*a));
        }
    }
    Ok(())
}

/// Returns the placement of every target, bottom first, requiring one shared
/// parent.
fn sibling_placements(
    doc: &Document,
    targets: &[LayerId],
) -> Result<Vec<(LayerId, Placement)>, CommandError> {
    check_targets(targets)?;
    let mut placed = Vec::with_capacity(targets.len());
    for &layer in targets {
        if layer == doc.root() {
            return Err(StructureError::RootImmutable.into());
        }
        let placement = doc
            .placement(layer)
            .ok_or(StructureError::NotAChild(layer))?;
        placed.push((layer, placement));
    }
    let parent = placed[0].1.parent;
    if placed.iter().any(|(_, p)| p.parent != parent) {
        return Err(CommandError::MixedParents);
    }
    placed.sort_by_key(|(_, p)| p.index);
    Ok(placed)
}

/// Index a replacement layer takes when `placed` (bottom first) are removed:
/// the slot of the topmost one.
fn replacement_slot(placed: &[(LayerId, Placement)]) -> usize {
    let top = placed.last().map_or(0, |(_, p)| p.index);
    top + 1 - placed.len()
}

/// Detaches `placed` (bottom first) from the top down.
fn detach_all(doc: &mut Document, placed: &[(LayerId, Placement)]) -> Result<(), CommandError> {
    for (layer, _) in placed.iter().rev() {
        doc.remove(*layer)?;
    }
    Ok(())
}

/// Re-attaches layers at their captured placements, lowest index first.
fn restore_all(doc: &mut Document, placed: &[(LayerId, Placement)]) -> Result<(), CommandError> {
    for (layer, placement) in placed {
        doc.add(placement.parent, *layer, Some(placement.index))?;
    }
    Ok(())
}

/// Order-insensitive comparison of target sets.
fn same_set(a: &[LayerId], b: &[LayerId]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

#[cfg(test)]
mod tests {
    use kurbo::{Affine, Rect};

    use super::*;
    use crate::layer::LayerKind;

    #[test]
    fn target_checks() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let a = doc.create_layer(LayerKind::Group);
        assert_eq!(check_targets(&[]), Err(CommandError::EmptyTargets));
        assert_eq!(
            check_targets(&[a, a]),
            Err(CommandError::DuplicateTarget(a))
        );
        assert_eq!(
            sibling_placements(&doc, &[a]),
            Err(CommandError::Structure(StructureError::NotAChild(a)))
        );
    }

    #[test]
    fn mixed_parents_are_rejected() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let root = doc.root();
        let g = doc.create_layer(LayerKind::Group);
        let a = doc.create_layer(LayerKind::Group);
        let b = doc.create_layer(LayerKind::Group);
        doc.add(root, g, None).unwrap();
        doc.add(root, a, None).unwrap();
        doc.add(g, b, None).unwrap();
        assert_eq!(
            sibling_placements(&doc, &[a, b]),
            Err(CommandError::MixedParents)
        );
    }

    #[test]
    fn merge_requires_same_kind_and_targets() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let a = doc.create_layer(LayerKind::Group);
        let b = doc.create_layer(LayerKind::Group);
        let move_a = Command::from(TransformLayers::new(
            alloc::vec![a],
            None,
            Some(Affine::scale(2.0)),
        ));
        let move_b = Command::from(TransformLayers::new(
            alloc::vec![b],
            None,
            Some(Affine::scale(2.0)),
        ));
        let add_a = Command::from(AddLayer::new(a, doc.root(), None));
        assert!(!move_a.same_kind_and_targets(&move_b));
        assert!(!move_a.same_kind_and_targets(&add_a));
        assert!(move_a.merge(&move_b).is_none(), "different targets");
        assert!(move_a.merge(&add_a).is_none(), "different kinds");
        assert!(move_a.merge(&move_a.clone()).is_some());
    }

    #[test]
    fn set_comparison_ignores_order() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let a = doc.create_layer(LayerKind::Group);
        let b = doc.create_layer(LayerKind::Group);
        assert!(same_set(&[a, b], &[b, a]));
        assert!(!same_set(&[a, b], &[a]));
    }
}
