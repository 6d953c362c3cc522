//! Graphics context.
//!
//! A graphics context is an object giving access to a backend: the piece of code that actually
//! talks to a graphics driver (a GPU or a software implementation). This crate doesn’t create
//! contexts; windowing crates (or the [`headless`](crate::headless) module) do.
//!
//! # On context and threads
//!
//! - An object which type implements [`GraphicsContext`] must be `!Send` and `!Sync`.
//! - You can only create a single context per thread.

use crate::backend::{geometry::Geometry as GeometryBackend, pipeline::Pipeline};
use crate::geometry::GeometryBuilder;
use crate::pipeline::PipelineState;

/// Class of graphics context.
///
/// Such a context must not be Send nor Sync, which means that you cannot share it between
/// threads in any way (move / borrow).
pub unsafe trait GraphicsContext {
  /// Backend type reached through this context.
  type Backend: ?Sized;

  /// Access the backend.
  fn backend(&mut self) -> &mut Self::Backend;

  /// Start building a new [`Geometry`](crate::geometry::Geometry).
  fn new_geometry(&mut self) -> GeometryBuilder<'_, Self::Backend>
  where
    Self::Backend: GeometryBackend,
  {
    GeometryBuilder::new(self)
  }

  /// Prepare the default framebuffer for a new frame.
  ///
  /// `size` is the framebuffer size in pixels; it is used when the viewport of `state` covers the
  /// whole framebuffer.
  fn start_frame(&mut self, size: [u32; 2], state: &PipelineState)
  where
    Self::Backend: Pipeline,
  {
    unsafe { self.backend().start_frame(size, state) }
  }
}
