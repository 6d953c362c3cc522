//! GPU geometries.
//!
//! A [`Geometry`] owns a vertex array, a single vertex buffer holding interleaved `f32`
//! attributes and, optionally, an index buffer of `u32` indices. The shape of a vertex is given by
//! a [`VertexLayout`]: an ordered set of [`AttributeDescriptor`]s sharing one stride.
//!
//! Layouts are checked before anything reaches the driver. Every attribute must fit inside the
//! stride; layouts written with a component _count_ where a byte _size_ was meant are rejected
//! instead of silently reading garbage.
//!
//! Geometries are built with a [`GeometryBuilder`], obtained from
//! [`GraphicsContext::new_geometry`](crate::context::GraphicsContext::new_geometry).

use std::error;
use std::fmt;
use std::mem;

use crate::backend::geometry::Geometry as GeometryBackend;
use crate::context::GraphicsContext;

/// Size of a single vertex component, in bytes.
pub const COMPONENT_SIZE: usize = mem::size_of::<f32>();

/// Primitive mode.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
  /// A single line, expressed by two vertices.
  Line,
  /// A triangle, expressed by three vertices.
  Triangle,
}

impl Default for Mode {
  fn default() -> Self {
    Mode::Triangle
  }
}

/// A single vertex attribute in an interleaved vertex buffer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AttributeDescriptor {
  /// Attribute slot (shader input location).
  pub slot: u32,
  /// Number of `f32` components, in `1..=4`.
  pub components: usize,
  /// Offset of the first component from the start of a vertex, in bytes.
  pub offset: usize,
}

impl AttributeDescriptor {
  /// Create a new attribute descriptor.
  pub const fn new(slot: u32, components: usize, offset: usize) -> Self {
    AttributeDescriptor {
      slot,
      components,
      offset,
    }
  }

  /// Size of the attribute, in bytes; saturates at `usize::MAX`.
  pub const fn size(&self) -> usize {
    self.components.saturating_mul(COMPONENT_SIZE)
  }

  /// Byte offset right past the attribute; saturates at `usize::MAX`.
  pub const fn end(&self) -> usize {
    self.offset.saturating_add(self.size())
  }
}

/// Reasons a [`VertexLayout`] is refused.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LayoutError {
  /// The layout has no attribute.
  Empty,
  /// An attribute has a component count outside `1..=4`.
  InvalidComponentCount {
    /// Slot of the attribute.
    slot: u32,
    /// Declared component count.
    components: usize,
  },
  /// Two attributes use the same slot.
  DuplicateSlot(u32),
  /// The stride is zero or not a whole number of components.
  InvalidStride(usize),
  /// An attribute offset is not a whole number of components.
  MisalignedOffset {
    /// Slot of the attribute.
    slot: u32,
    /// Declared offset.
    offset: usize,
  },
  /// An attribute reaches past the stride.
  AttributeOutOfStride {
    /// Slot of the attribute.
    slot: u32,
    /// Byte offset right past the attribute.
    end: usize,
    /// Declared stride.
    stride: usize,
  },
  /// Two attributes share bytes.
  Overlap(u32, u32),
}

impl fmt::Display for LayoutError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      LayoutError::Empty => f.write_str("empty vertex layout"),
      LayoutError::InvalidComponentCount { slot, components } => write!(
        f,
        "attribute {} has {} components (expected 1 to 4)",
        slot, components
      ),
      LayoutError::DuplicateSlot(slot) => write!(f, "attribute slot {} used twice", slot),
      LayoutError::InvalidStride(stride) => write!(f, "invalid stride: {} bytes", stride),
      LayoutError::MisalignedOffset { slot, offset } => write!(
        f,
        "attribute {} starts at byte {}, not a multiple of {}",
        slot, offset, COMPONENT_SIZE
      ),
      LayoutError::AttributeOutOfStride { slot, end, stride } => write!(
        f,
        "attribute {} ends at byte {} but the stride is {} bytes",
        slot, end, stride
      ),
      LayoutError::Overlap(a, b) => write!(f, "attributes {} and {} overlap", a, b),
    }
  }
}

impl error::Error for LayoutError {}

/// Interleaved vertex layout.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VertexLayout {
  attributes: Vec<AttributeDescriptor>,
  stride: usize,
}

impl VertexLayout {
  /// Tightly packed layout: attributes follow each other in the given order and the stride is
  /// the sum of their sizes.
  ///
  /// Each item is `(slot, components)`.
  pub fn interleaved(attributes: &[(u32, usize)]) -> Result<Self, LayoutError> {
    let mut offset = 0;
    let mut descs = Vec::with_capacity(attributes.len());

    for &(slot, components) in attributes {
      if !(1..=4).contains(&components) {
        return Err(LayoutError::InvalidComponentCount { slot, components });
      }

      let desc = AttributeDescriptor::new(slot, components, offset);
      offset += desc.size();
      descs.push(desc);
    }

    Self::with_stride(offset, descs)
  }

  /// Layout with explicit offsets and stride (in bytes).
  pub fn with_stride(
    stride: usize,
    attributes: Vec<AttributeDescriptor>,
  ) -> Result<Self, LayoutError> {
    if attributes.is_empty() {
      return Err(LayoutError::Empty);
    }

    if stride == 0 || stride % COMPONENT_SIZE != 0 {
      return Err(LayoutError::InvalidStride(stride));
    }

    for (i, desc) in attributes.iter().enumerate() {
      if !(1..=4).contains(&desc.components) {
        return Err(LayoutError::InvalidComponentCount {
          slot: desc.slot,
          components: desc.components,
        });
      }

      if desc.offset % COMPONENT_SIZE != 0 {
        return Err(LayoutError::MisalignedOffset {
          slot: desc.slot,
          offset: desc.offset,
        });
      }

      match desc.offset.checked_add(desc.size()) {
        Some(end) if end <= stride => (),
        end => {
          return Err(LayoutError::AttributeOutOfStride {
            slot: desc.slot,
            end: end.unwrap_or(usize::MAX),
            stride,
          });
        }
      }

      for other in &attributes[..i] {
        if other.slot == desc.slot {
          return Err(LayoutError::DuplicateSlot(desc.slot));
        }

        if desc.offset < other.end() && other.offset < desc.end() {
          return Err(LayoutError::Overlap(other.slot, desc.slot));
        }
      }
    }

    Ok(VertexLayout { attributes, stride })
  }

  /// Attributes, in declaration order.
  pub fn attributes(&self) -> &[AttributeDescriptor] {
    &self.attributes
  }

  /// Stride, in bytes.
  pub fn stride(&self) -> usize {
    self.stride
  }

  /// Number of `f32` a single vertex spans in the vertex buffer.
  pub fn floats_per_vertex(&self) -> usize {
    self.stride / COMPONENT_SIZE
  }
}

/// Errors that can occur while building a [`Geometry`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GeometryError {
  /// Invalid vertex layout.
  Layout(LayoutError),
  /// No vertex layout was provided.
  NoLayout,
  /// The vertex data doesn’t hold a whole number of vertices.
  VertexDataMismatch {
    /// Number of floats provided.
    len: usize,
    /// Floats per vertex, according to the layout.
    floats_per_vertex: usize,
  },
  /// An index refers to a vertex that doesn’t exist.
  IndexOutOfBounds {
    /// Faulty index.
    index: u32,
    /// Number of vertices.
    vertex_count: usize,
  },
  /// The driver failed to allocate a vertex array or a buffer.
  ResourceError(String),
}

impl GeometryError {
  /// The driver failed to allocate a vertex array or a buffer.
  pub fn resource_error(reason: impl Into<String>) -> Self {
    GeometryError::ResourceError(reason.into())
  }
}

impl fmt::Display for GeometryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GeometryError::Layout(ref e) => write!(f, "invalid vertex layout: {}", e),
      GeometryError::NoLayout => f.write_str("no vertex layout"),
      GeometryError::VertexDataMismatch {
        len,
        floats_per_vertex,
      } => write!(
        f,
        "{} floats of vertex data is not a multiple of {} floats per vertex",
        len, floats_per_vertex
      ),
      GeometryError::IndexOutOfBounds {
        index,
        vertex_count,
      } => write!(
        f,
        "index {} out of bounds ({} vertices)",
        index, vertex_count
      ),
      GeometryError::ResourceError(ref e) => write!(f, "GPU resource error: {}", e),
    }
  }
}

impl error::Error for GeometryError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      GeometryError::Layout(e) => Some(e),
      _ => None,
    }
  }
}

impl From<LayoutError> for GeometryError {
  fn from(e: LayoutError) -> Self {
    GeometryError::Layout(e)
  }
}

/// [`Geometry`] builder.
pub struct GeometryBuilder<'a, B>
where
  B: ?Sized,
{
  backend: &'a mut B,
  vertices: Vec<f32>,
  indices: Option<Vec<u32>>,
  layout: Option<VertexLayout>,
  mode: Mode,
}

impl<'a, B> GeometryBuilder<'a, B>
where
  B: ?Sized + GeometryBackend,
{
  /// Create a new, empty builder.
  pub fn new<C>(ctx: &'a mut C) -> Self
  where
    C: ?Sized + GraphicsContext<Backend = B>,
  {
    GeometryBuilder {
      backend: ctx.backend(),
      vertices: Vec::new(),
      indices: None,
      layout: None,
      mode: Mode::default(),
    }
  }

  /// Interleaved vertex data.
  pub fn set_vertices(mut self, vertices: impl Into<Vec<f32>>) -> Self {
    self.vertices = vertices.into();
    self
  }

  /// Indices; the geometry is drawn indexed when set.
  pub fn set_indices(mut self, indices: impl Into<Vec<u32>>) -> Self {
    self.indices = Some(indices.into());
    self
  }

  /// Vertex layout.
  pub fn set_layout(mut self, layout: VertexLayout) -> Self {
    self.layout = Some(layout);
    self
  }

  /// Primitive mode. Defaults to [`Mode::Triangle`].
  pub fn set_mode(mut self, mode: Mode) -> Self {
    self.mode = mode;
    self
  }

  /// Check the configuration and upload everything.
  pub fn build(self) -> Result<Geometry<B>, GeometryError> {
    let layout = self.layout.ok_or(GeometryError::NoLayout)?;

    let floats_per_vertex = layout.floats_per_vertex();
    if self.vertices.len() % floats_per_vertex != 0 {
      return Err(GeometryError::VertexDataMismatch {
        len: self.vertices.len(),
        floats_per_vertex,
      });
    }

    let vertex_count = self.vertices.len() / floats_per_vertex;

    if let Some(ref indices) = self.indices {
      if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(GeometryError::IndexOutOfBounds {
          index,
          vertex_count,
        });
      }
    }

    let repr = unsafe {
      self.backend.new_geometry(
        &self.vertices,
        self.indices.as_deref(),
        &layout,
        self.mode,
      )?
    };

    log::debug!(
      "geometry created: {} vertices, {} indices, stride {} bytes",
      vertex_count,
      self.indices.as_ref().map_or(0, Vec::len),
      layout.stride()
    );

    Ok(Geometry {
      repr,
      layout,
      mode: self.mode,
      vertex_count,
      index_count: self.indices.map(|i| i.len()),
    })
  }
}

/// GPU geometry.
///
/// Dropping a geometry disables its attribute slots and deletes its vertex array and buffers.
pub struct Geometry<B>
where
  B: ?Sized + GeometryBackend,
{
  repr: B::GeometryRepr,
  layout: VertexLayout,
  mode: Mode,
  vertex_count: usize,
  index_count: Option<usize>,
}

impl<B> Geometry<B>
where
  B: ?Sized + GeometryBackend,
{
  /// Draw the geometry.
  ///
  /// Indexed geometries draw all of their indices; others draw all of their vertices. The vertex
  /// array is bound as part of the call.
  pub fn draw(&self) {
    let count = self.index_count.unwrap_or(self.vertex_count);
    unsafe { B::render(&self.repr, count) }
  }

  /// Number of vertices.
  pub fn vertex_count(&self) -> usize {
    self.vertex_count
  }

  /// Number of indices, if indexed.
  pub fn index_count(&self) -> Option<usize> {
    self.index_count
  }

  /// Vertex layout.
  pub fn layout(&self) -> &VertexLayout {
    &self.layout
  }

  /// Primitive mode.
  pub fn mode(&self) -> Mode {
    self.mode
  }

  /// Release the geometry now.
  pub fn destroy(self) {}
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn interleaved_offsets_and_stride() {
    let layout = VertexLayout::interleaved(&[(0, 4), (1, 3)]).unwrap();

    assert_eq!(layout.stride(), 28);
    assert_eq!(layout.floats_per_vertex(), 7);
    assert_eq!(
      layout.attributes(),
      &[
        AttributeDescriptor::new(0, 4, 0),
        AttributeDescriptor::new(1, 3, 16)
      ]
    );
  }

  #[test]
  fn explicit_layout_with_padding() {
    let layout = VertexLayout::with_stride(
      32,
      vec![
        AttributeDescriptor::new(1, 3, 16),
        AttributeDescriptor::new(0, 2, 0),
      ],
    )
    .unwrap();

    assert_eq!(layout.floats_per_vertex(), 8);
  }

  #[test]
  fn stride_given_as_component_count_is_rejected() {
    // color vec4 followed by position vec3, with the color stride written as a count
    let err = VertexLayout::with_stride(
      4,
      vec![
        AttributeDescriptor::new(0, 4, 0),
        AttributeDescriptor::new(1, 3, 16),
      ],
    )
    .unwrap_err();

    assert_eq!(
      err,
      LayoutError::AttributeOutOfStride {
        slot: 0,
        end: 16,
        stride: 4
      }
    );
  }

  #[test]
  fn offset_past_stride_is_rejected() {
    let err = VertexLayout::with_stride(12, vec![AttributeDescriptor::new(0, 3, 4)]).unwrap_err();
    assert!(matches!(err, LayoutError::AttributeOutOfStride { .. }));
  }

  #[test]
  fn invalid_layouts() {
    assert_eq!(VertexLayout::interleaved(&[]), Err(LayoutError::Empty));
    assert_eq!(
      VertexLayout::interleaved(&[(0, 5)]),
      Err(LayoutError::InvalidComponentCount {
        slot: 0,
        components: 5
      })
    );
    assert_eq!(
      VertexLayout::interleaved(&[(0, 3), (0, 2)]),
      Err(LayoutError::DuplicateSlot(0))
    );
    assert_eq!(
      VertexLayout::with_stride(14, vec![AttributeDescriptor::new(0, 3, 0)]),
      Err(LayoutError::InvalidStride(14))
    );
    assert_eq!(
      VertexLayout::with_stride(16, vec![AttributeDescriptor::new(0, 2, 2)]),
      Err(LayoutError::MisalignedOffset { slot: 0, offset: 2 })
    );
    assert_eq!(
      VertexLayout::with_stride(
        24,
        vec![
          AttributeDescriptor::new(0, 3, 0),
          AttributeDescriptor::new(1, 3, 8)
        ]
      ),
      Err(LayoutError::Overlap(0, 1))
    );
  }

  #[test]
  fn huge_layouts_are_refused() {
    assert_eq!(
      VertexLayout::interleaved(&[(0, usize::MAX)]),
      Err(LayoutError::InvalidComponentCount {
        slot: 0,
        components: usize::MAX
      })
    );
    assert_eq!(
      VertexLayout::interleaved(&[(0, 4), (1, usize::MAX / 2)]),
      Err(LayoutError::InvalidComponentCount {
        slot: 1,
        components: usize::MAX / 2
      })
    );
    assert_eq!(
      VertexLayout::with_stride(16, vec![AttributeDescriptor::new(0, 1, usize::MAX - 3)]),
      Err(LayoutError::AttributeOutOfStride {
        slot: 0,
        end: usize::MAX,
        stride: 16
      })
    );
    assert_eq!(
      VertexLayout::with_stride(16, vec![AttributeDescriptor::new(0, 4, usize::MAX - 7)]),
      Err(LayoutError::AttributeOutOfStride {
        slot: 0,
        end: usize::MAX,
        stride: 16
      })
    );
  }
}
