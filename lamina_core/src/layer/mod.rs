// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer tree data model.
//!
//! A *layer* is a node in the document scene graph. Each layer has:
//!
//! - An identity ([`LayerId`]): a generational handle that becomes stale when
//!   the layer is destroyed, preventing use-after-free bugs at the API level.
//! - Topology: parent, first-child, and sibling links forming an ordered
//!   tree. Child order is z-order, index 0 at the bottom.
//! - Properties: name, [`LayerKind`] data, local transform, opacity,
//!   [`LayerFlags`], an optional clip layer, and optional fill and stroke.
//!
//! Layers are stored in struct-of-arrays layout with index-based handles.
//! Only [`LayerKind::Group`] layers hold children; the document root is a
//! group.
//!
//! # Dirty tracking
//!
//! Every mutation marks the matching [`dirty`](crate::dirty) channel so the
//! [`CacheManager`](crate::cache::CacheManager) can clear exactly the derived
//! data that went stale.

mod id;
mod kind;
mod store;
mod traverse;

pub use id::{INVALID, LayerId};
pub use kind::{EllipseShape, LayerKind, RectangleShape, TextBlock};
pub use store::{LayerFlags, LayerStore};
pub use traverse::{Ancestors, Children, Flatten, TraversalOrder};
