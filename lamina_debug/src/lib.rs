// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Log output, tree dumps, and JSON snapshots for lamina diagnostics.
//!
//! - [`pretty::PrettyLogger`]: a [`log::Log`] backend writing one line per
//!   record.
//! - [`tree::dump`]: an indented text outline of a document's layer tree.
//! - [`snapshot::snapshot`]: a JSON description of a document, including
//!   cached bounds, for post-mortem inspection.

pub mod pretty;
pub mod snapshot;
pub mod tree;
