//! 2D textures.
//!
//! Textures are created from texels that were already decoded by someone else (an image crate,
//! a procedural generator…). They are immutable once created.

use std::error;
use std::fmt;

use crate::backend::texture::Texture as TextureBackend;
use crate::context::GraphicsContext;

/// Pixel format of the texels handed to [`Texture::new`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PixelFormat {
  /// Red, green and blue channels, one byte each.
  RGB,
  /// Red, green, blue and alpha channels, one byte each.
  RGBA,
}

impl PixelFormat {
  /// Number of channels.
  pub fn channels(self) -> usize {
    match self {
      PixelFormat::RGB => 3,
      PixelFormat::RGBA => 4,
    }
  }
}

/// Minification and magnification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FilterMode {
  /// Nearest texel.
  Nearest,
  /// Linear interpolation of the neighboring texels.
  Linear,
}

/// Errors that might happen when creating a texture.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TextureError {
  /// The texel buffer doesn’t match the dimensions.
  SizeMismatch {
    /// Expected number of bytes.
    expected: usize,
    /// Number of bytes provided.
    found: usize,
  },
  /// The driver failed to allocate or upload the texture.
  ResourceError(String),
}

impl TextureError {
  /// The driver failed to allocate or upload the texture.
  pub fn resource_error(reason: impl Into<String>) -> Self {
    TextureError::ResourceError(reason.into())
  }
}

impl fmt::Display for TextureError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      TextureError::SizeMismatch { expected, found } => write!(
        f,
        "texel size mismatch: expected {} bytes, got {}",
        expected, found
      ),
      TextureError::ResourceError(ref e) => write!(f, "GPU resource error: {}", e),
    }
  }
}

impl error::Error for TextureError {}

/// A 2D texture.
///
/// Dropping a texture deletes it.
pub struct Texture<B>
where
  B: ?Sized + TextureBackend,
{
  repr: B::TextureRepr,
  size: [u32; 2],
  format: PixelFormat,
  filter: FilterMode,
}

impl<B> Texture<B>
where
  B: ?Sized + TextureBackend,
{
  /// Create a texture out of tightly packed texels.
  pub fn new<C>(
    ctx: &mut C,
    size: [u32; 2],
    format: PixelFormat,
    filter: FilterMode,
    texels: &[u8],
  ) -> Result<Self, TextureError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
  {
    let expected = size[0] as usize * size[1] as usize * format.channels();
    if texels.len() != expected {
      return Err(TextureError::SizeMismatch {
        expected,
        found: texels.len(),
      });
    }

    let repr = unsafe { ctx.backend().new_texture(size, format, filter, texels)? };
    log::debug!("texture created: {}×{} {:?}", size[0], size[1], format);

    Ok(Texture {
      repr,
      size,
      format,
      filter,
    })
  }

  /// Bind to texture unit `unit`.
  pub fn bind(&self, unit: u32) {
    unsafe { B::bind_texture(&self.repr, unit) }
  }

  /// Clear texture unit 0.
  pub fn unbind(&self) {
    unsafe { B::unbind_texture(&self.repr) }
  }

  /// Width of the texture.
  pub fn width(&self) -> u32 {
    self.size[0]
  }

  /// Height of the texture.
  pub fn height(&self) -> u32 {
    self.size[1]
  }

  /// Pixel format the texels were uploaded with.
  pub fn format(&self) -> PixelFormat {
    self.format
  }

  /// Filter mode.
  pub fn filter(&self) -> FilterMode {
    self.filter
  }

  /// Release the texture now.
  pub fn destroy(self) {}
}
