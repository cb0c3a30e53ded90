// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer scene graph, derived-data cache, and undo history for vector
//! documents.
//!
//! `lamina_core` is the model half of a vector editor. It is `no_std`
//! compatible (with `alloc`) and never performs file or pixel I/O: rendering
//! backends, font shaping, and file formats plug in through the traits in
//! [`backend`].
//!
//! # Architecture
//!
//! ```text
//!   Tool ──► Command ──► History::apply() ──► Document mutation
//!                                                  │
//!                         dirty channels ◄─────────┘
//!                               │
//!                               ▼
//!   CacheManager (drain, clear entries, publish Invalidations)
//!                               │
//!                               ▼
//!   Renderer ──► Document::geometry() / bounds() / fill() ...
//! ```
//!
//! **[`layer`]**: Struct-of-arrays layer arena with generational handles,
//! ordered child lists, and lazy pre-order traversal.
//!
//! **[`document`]**: The [`Document`](document::Document): root group,
//! palette, canvas bounds, scene-graph edits, hit-testing, and cached queries.
//!
//! **[`cache`]**: Lazily memoized bounds, transforms, geometry, and realized
//! device resources, with suppression and tiered release.
//!
//! **[`dirty`]**: Dirty-tracking channels (via `understory_dirty`) that carry
//! invalidation to descendants, ancestors, and clones.
//!
//! **[`history`]**: Append-only command log with cursor and time-windowed
//! merging.
//!
//! **[`command`]**: The closed set of reversible edits.
//!
//! **[`path`]**: Path instructions and editable node lists.
//!
//! **[`transform`]**: Corner-based bounds mapping and the
//! `apply_transform` composition rule.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies and
//!   the mutex-backed [`SharedDocument`](sync::SharedDocument).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod backend;
pub mod cache;
pub mod command;
pub mod dirty;
pub mod document;
pub mod error;
pub mod history;
pub mod layer;
pub mod paint;
pub mod path;
#[cfg(feature = "std")]
pub mod sync;
pub mod time;
pub mod transform;

pub use document::Document;
pub use error::{CommandError, StructureError};
pub use history::{History, HistoryConfig};
