// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Lamina uses multi-channel dirty tracking (via [`understory_dirty`]) to
//! propagate invalidation through the layer tree. Each channel represents an
//! independent category of derived data.
//!
//! # Dependency edges
//!
//! - **[`TRANSFORM`]**: child depends on parent. Marking a layer with
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) marks every descendant,
//!   because absolute transforms are inherited.
//! - **[`BOUNDS`]**: parent depends on child. Marking a layer eagerly marks
//!   every ancestor, because group bounds aggregate their children.
//! - **[`GEOMETRY`]**: clone depends on its target. Marking a target eagerly
//!   marks every clone of it (and clones of those clones).
//!
//! [`FILL`], [`STROKE`], [`TEXT`], [`APPEARANCE`], and [`TOPOLOGY`] are
//! local: only the explicitly marked layer appears in the drain output.
//!
//! # Consumption
//!
//! The [`CacheManager`](crate::cache::CacheManager) drains every channel after
//! each document mutation, clears the affected cache entries, and turns the
//! drained keys into [`Invalidation`](crate::cache::Invalidation)
//! notifications.

use understory_dirty::Channel;

/// Kind data changed; geometry must be rebuilt for the layer and its clones.
pub const GEOMETRY: Channel = Channel::new(0);

/// Local bounds changed; aggregate bounds of every ancestor are stale.
pub const BOUNDS: Channel = Channel::new(1);

/// Local transform or ancestry changed; absolute transforms of the subtree
/// are stale.
pub const TRANSFORM: Channel = Channel::new(2);

/// Fill brush changed.
pub const FILL: Channel = Channel::new(3);

/// Stroke pen changed.
pub const STROKE: Channel = Channel::new(4);

/// Text content or layout box changed.
pub const TEXT: Channel = Channel::new(5);

/// Opacity, visibility, selection, clip, or name changed.
pub const APPEARANCE: Channel = Channel::new(6);

/// Child list changed.
pub const TOPOLOGY: Channel = Channel::new(7);
