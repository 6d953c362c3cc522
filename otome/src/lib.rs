//! # Scoped GPU resources for small interactive renderers
//!
//! otome is the resource layer of a scene-switching rendering harness. It gives you a handful of
//! owning types that wrap driver handles and release them exactly once:
//!
//! - [`Stage`] and [`Program`]: shader stages compiled from source text and linked in pairs. A
//!   program discovers its active uniforms once, at link time, and keeps them in a
//!   [`UniformTable`]. Uploading to a name the driver did not report is a silent no-op.
//! - [`Geometry`]: a vertex array with one interleaved vertex buffer and an optional index buffer,
//!   described by a validated [`VertexLayout`].
//! - [`Texture`]: a 2D texture uploaded from already decoded texels.
//!
//! # Backends
//!
//! Types in this crate are generic over a _backend_ type. A backend implements the unsafe traits
//! of the [`backend`] module and is reached through a [`GraphicsContext`]. The `otome-gl` crate
//! provides an OpenGL 3.3 backend; the [`headless`] module (behind the `headless` feature, on by
//! default) provides a software stand-in that records driver traffic, useful for testing
//! resource discipline without a GPU.
//!
//! # Threads
//!
//! Backends are `!Send` and `!Sync`; all creation, binding and destruction happens on the thread
//! owning the context.
//!
//! [`Stage`]: crate::shader::Stage
//! [`Program`]: crate::shader::Program
//! [`UniformTable`]: crate::shader::UniformTable
//! [`Geometry`]: crate::geometry::Geometry
//! [`VertexLayout`]: crate::geometry::VertexLayout
//! [`Texture`]: crate::texture::Texture
//! [`GraphicsContext`]: crate::context::GraphicsContext

#![deny(missing_docs)]

pub mod backend;
pub mod context;
pub mod geometry;
#[cfg(feature = "headless")]
pub mod headless;
pub mod pipeline;
pub mod shader;
pub mod texture;
