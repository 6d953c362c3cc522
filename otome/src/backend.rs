//! Backend interfacing.
//!
//! Almost everything declared in this module and its submodules is `unsafe`. An end-user is not
//! supposed to implement any of this. Library authors might use some traits from here, required by
//! generic code, but no one but backend authors should implement any symbols from here.
//!
//! Representation objects (`*Repr` associated types) own their driver handles: dropping one
//! releases what it holds. The owning types of the crate root only wrap them.

pub mod geometry;
pub mod pipeline;
pub mod shader;
pub mod texture;

/// Everything a scene needs from a backend.
pub trait Backend: shader::Shader + geometry::Geometry + texture::Texture + pipeline::Pipeline {}

impl<B> Backend for B where
  B: ?Sized + shader::Shader + geometry::Geometry + texture::Texture + pipeline::Pipeline
{
}
