// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering protocol for [`lamina_core`] documents.
//!
//! The core owns the scene graph and the cached geometry and device
//! resources. This crate walks a document and replays it onto a
//! backend-provided [`RenderTarget`]:
//!
//! - [`RenderTarget`]: the drawing surface a backend implements (transform
//!   stack, opacity/clip layers, fill, stroke, and text).
//! - [`render`]: draws a whole document bottom to top and reports
//!   [`RenderStats`].
//!
//! Clone layers draw their target's content with the clone's own paint,
//! substituted for the duration of the draw through
//! [`Document::with_substituted_paint`](lamina_core::Document::with_substituted_paint).

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod target;
mod walk;

pub use target::RenderTarget;
pub use walk::{RenderStats, render};
