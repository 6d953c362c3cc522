//! Geometry backend interface.

use crate::geometry::{GeometryError, Mode, VertexLayout};

/// Vertex array, vertex buffer and index buffer management.
pub unsafe trait Geometry {
  /// Backend representation of a geometry. Dropping it disables the attribute slots it enabled
  /// and deletes its vertex array and buffers.
  type GeometryRepr;

  /// Allocate a vertex array, upload `vertices` (and `indices`, if any) with static usage and
  /// enable every attribute of `layout`.
  ///
  /// `layout` is already validated and `vertices` / `indices` are consistent with it. Any
  /// allocation failure must release what was created so far and yield
  /// [`GeometryError::ResourceError`].
  unsafe fn new_geometry(
    &mut self,
    vertices: &[f32],
    indices: Option<&[u32]>,
    layout: &VertexLayout,
    mode: Mode,
  ) -> Result<Self::GeometryRepr, GeometryError>;

  /// Bind the vertex array and draw `count` vertices (or indices, for indexed geometries).
  unsafe fn render(geometry: &Self::GeometryRepr, count: usize);
}
