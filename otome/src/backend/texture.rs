//! Texture backend interface.

use crate::texture::{FilterMode, PixelFormat, TextureError};

/// 2D texture management.
pub unsafe trait Texture {
  /// Backend representation of a texture. Dropping it deletes the texture.
  type TextureRepr;

  /// Allocate a 2D texture with repeat wrapping and `filter` for both minification and
  /// magnification, upload `texels` and generate mipmaps.
  ///
  /// `texels` is tightly packed, one byte per channel, and its length matches the dimensions.
  unsafe fn new_texture(
    &mut self,
    size: [u32; 2],
    format: PixelFormat,
    filter: FilterMode,
    texels: &[u8],
  ) -> Result<Self::TextureRepr, TextureError>;

  /// Bind the texture to texture unit `unit`.
  unsafe fn bind_texture(texture: &Self::TextureRepr, unit: u32);

  /// Clear texture unit 0.
  unsafe fn unbind_texture(texture: &Self::TextureRepr);
}
