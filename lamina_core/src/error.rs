// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Structural violations are detected before any mutation, so an `Err` always
//! means the document is unchanged. Cache misses, incompatible merges, and
//! device loss are not errors (see [`cache`](crate::cache) and
//! [`Command::merge`](crate::command::Command::merge)).

use crate::layer::LayerId;

/// A scene-graph edit that would break a tree invariant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    /// The node is already attached to a parent.
    #[error("{0:?} already has a parent")]
    AlreadyParented(LayerId),
    /// Attaching the node would make it its own ancestor.
    #[error("attaching {node:?} under {parent:?} would create a cycle")]
    Cycle {
        /// The node being attached.
        node: LayerId,
        /// The requested parent.
        parent: LayerId,
    },
    /// The requested parent cannot hold children.
    #[error("{0:?} is not a container")]
    NotAContainer(LayerId),
    /// The node is not attached to a parent.
    #[error("{0:?} is not attached to a parent")]
    NotAChild(LayerId),
    /// A child index is past the end of the child list.
    #[error("index {index} out of range for {len} children")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of children (plus one when inserting).
        len: usize,
    },
    /// The document root cannot be moved, removed, or re-parented.
    #[error("the document root cannot be edited structurally")]
    RootImmutable,
    /// A clone would (transitively) clone itself.
    #[error("{clone:?} cannot clone {target:?}: clone cycle")]
    CloneCycle {
        /// The clone layer.
        clone: LayerId,
        /// The requested target.
        target: LayerId,
    },
}

/// A command whose preconditions do not hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// A scene-graph edit inside the command was rejected.
    #[error(transparent)]
    Structure(#[from] StructureError),
    /// The command has no targets.
    #[error("command has no targets")]
    EmptyTargets,
    /// A layer appears twice in the target set.
    #[error("{0:?} appears more than once in the target set")]
    DuplicateTarget(LayerId),
    /// Targets must share one parent for this command.
    #[error("targets do not share a parent")]
    MixedParents,
    /// A transform matrix has a zero determinant.
    #[error("transform is not invertible")]
    NotInvertible,
    /// A layer has no geometry to operate on.
    #[error("{0:?} has no geometry")]
    MissingGeometry(LayerId),
    /// The layer kind does not support this command.
    #[error("{0:?} has the wrong kind for this command")]
    KindMismatch(LayerId),
    /// The layer is not a group.
    #[error("{0:?} is not a group")]
    NotAGroup(LayerId),
    /// Too few operands for a combination.
    #[error("at least two operands are required")]
    TooFewOperands,
}

