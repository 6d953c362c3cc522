use crate::gl33::{state::GLState, GL33};
use gl::{self, types::*};
use otome::{
  backend::texture::Texture as TextureBackend,
  texture::{FilterMode, PixelFormat, TextureError},
};
use std::{cell::RefCell, os::raw::c_void, rc::Rc};

/// OpenGL 2D texture.
#[derive(Debug)]
pub struct Texture {
  pub(crate) handle: GLuint,
  state: Rc<RefCell<GLState>>,
}

impl Texture {
  /// Driver handle of the texture.
  pub fn handle(&self) -> GLuint {
    self.handle
  }
}

impl Drop for Texture {
  fn drop(&mut self) {
    unsafe {
      self.state.borrow_mut().unbind_texture(self.handle);
      gl::DeleteTextures(1, &self.handle);
    }
  }
}

unsafe impl TextureBackend for GL33 {
  type TextureRepr = Texture;

  unsafe fn new_texture(
    &mut self,
    size: [u32; 2],
    format: PixelFormat,
    filter: FilterMode,
    texels: &[u8],
  ) -> Result<Self::TextureRepr, TextureError> {
    while gl::GetError() != gl::NO_ERROR {}

    let mut handle: GLuint = 0;
    gl::GenTextures(1, &mut handle);

    if handle == 0 {
      return Err(TextureError::resource_error("cannot create texture"));
    }

    let texture = Texture {
      handle,
      state: self.state.clone(),
    };

    let mut st = self.state.borrow_mut();
    st.bind_texture(handle);

    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::REPEAT as GLint);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::REPEAT as GLint);

    let (min, mag) = opengl_filter(filter);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, min as GLint);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, mag as GLint);

    let (internal, pixel_format) = opengl_pixel_format(format);

    // rows are tightly packed
    gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
    gl::TexImage2D(
      gl::TEXTURE_2D,
      0,
      internal as GLint,
      size[0] as GLsizei,
      size[1] as GLsizei,
      0,
      pixel_format,
      gl::UNSIGNED_BYTE,
      texels.as_ptr() as *const c_void,
    );
    gl::GenerateMipmap(gl::TEXTURE_2D);

    match gl::GetError() {
      gl::NO_ERROR => Ok(texture),
      gl::OUT_OF_MEMORY => Err(TextureError::resource_error(
        "out of memory while allocating texture storage",
      )),
      e => Err(TextureError::resource_error(format!(
        "cannot upload texels: error {:#x}",
        e
      ))),
    }
  }

  unsafe fn bind_texture(texture: &Self::TextureRepr, unit: u32) {
    let mut st = texture.state.borrow_mut();
    st.set_texture_unit(unit);
    st.bind_texture(texture.handle);
  }

  unsafe fn unbind_texture(texture: &Self::TextureRepr) {
    let mut st = texture.state.borrow_mut();
    st.set_texture_unit(0);
    st.bind_texture(0);
  }
}

fn opengl_filter(filter: FilterMode) -> (GLenum, GLenum) {
  match filter {
    FilterMode::Nearest => (gl::NEAREST_MIPMAP_NEAREST, gl::NEAREST),
    FilterMode::Linear => (gl::LINEAR_MIPMAP_LINEAR, gl::LINEAR),
  }
}

fn opengl_pixel_format(format: PixelFormat) -> (GLenum, GLenum) {
  match format {
    PixelFormat::RGB => (gl::RGB8, gl::RGB),
    PixelFormat::RGBA => (gl::RGBA8, gl::RGBA),
  }
}
