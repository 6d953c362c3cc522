use crate::gl33::{
  state::{Bind, GLState},
  GL33,
};
use gl::{self, types::*};
use otome::{
  backend::geometry::Geometry as GeometryBackend,
  geometry::{GeometryError, Mode, VertexLayout},
};
use std::{cell::RefCell, mem, os::raw::c_void, ptr, rc::Rc};

/// OpenGL geometry: a vertex array object, its vertex buffer and an optional index buffer.
#[derive(Debug)]
pub struct Geometry {
  vao: GLuint,
  vbo: GLuint,
  ebo: Option<GLuint>,
  slots: Vec<GLuint>,
  mode: GLenum,
  state: Rc<RefCell<GLState>>,
}

impl Geometry {
  /// Attribute slots this geometry enabled.
  pub fn slots(&self) -> &[GLuint] {
    &self.slots
  }
}

impl Drop for Geometry {
  fn drop(&mut self) {
    unsafe {
      let mut st = self.state.borrow_mut();

      if self.vao != 0 {
        st.bind_vertex_array(self.vao, Bind::Cached);

        for &slot in &self.slots {
          gl::DisableVertexAttribArray(slot);
        }

        st.unbind_vertex_array();
        gl::DeleteVertexArrays(1, &self.vao);
      }

      if self.vbo != 0 {
        st.unbind_buffer(self.vbo);
        gl::DeleteBuffers(1, &self.vbo);
      }

      if let Some(ebo) = self.ebo {
        st.unbind_buffer(ebo);
        gl::DeleteBuffers(1, &ebo);
      }
    }
  }
}

unsafe impl GeometryBackend for GL33 {
  type GeometryRepr = Geometry;

  unsafe fn new_geometry(
    &mut self,
    vertices: &[f32],
    indices: Option<&[u32]>,
    layout: &VertexLayout,
    mode: Mode,
  ) -> Result<Self::GeometryRepr, GeometryError> {
    // drain stale errors so that the checks below only see ours
    while gl::GetError() != gl::NO_ERROR {}

    let mut geometry = Geometry {
      vao: 0,
      vbo: 0,
      ebo: None,
      slots: Vec::new(),
      mode: opengl_mode(mode),
      state: self.state.clone(),
    };

    gl::GenVertexArrays(1, &mut geometry.vao);

    if geometry.vao == 0 {
      return Err(GeometryError::resource_error("cannot create vertex array"));
    }

    let mut st = self.state.borrow_mut();

    // force binding the vertex array so that previously bound vertex arrays (possibly the same
    // handle) don’t prevent us from binding here
    st.bind_vertex_array(geometry.vao, Bind::Forced);

    gl::GenBuffers(1, &mut geometry.vbo);

    if geometry.vbo == 0 {
      st.unbind_vertex_array();
      return Err(GeometryError::resource_error("cannot create vertex buffer"));
    }

    // force binding as it’s meaningful when a vao is bound
    st.bind_array_buffer(geometry.vbo, Bind::Forced);
    gl::BufferData(
      gl::ARRAY_BUFFER,
      mem::size_of_val(vertices) as GLsizeiptr,
      vertices.as_ptr() as *const c_void,
      gl::STATIC_DRAW,
    );

    if let Err(e) = check_allocation("vertex buffer") {
      st.unbind_vertex_array();
      return Err(e);
    }

    set_vertex_pointers(layout);
    geometry.slots = layout.attributes().iter().map(|a| a.slot).collect();

    if let Some(indices) = indices {
      let mut ebo: GLuint = 0;
      gl::GenBuffers(1, &mut ebo);

      if ebo == 0 {
        st.unbind_vertex_array();
        return Err(GeometryError::resource_error("cannot create index buffer"));
      }

      geometry.ebo = Some(ebo);

      st.bind_element_array_buffer(ebo, Bind::Forced);
      gl::BufferData(
        gl::ELEMENT_ARRAY_BUFFER,
        mem::size_of_val(indices) as GLsizeiptr,
        indices.as_ptr() as *const c_void,
        gl::STATIC_DRAW,
      );

      if let Err(e) = check_allocation("index buffer") {
        st.unbind_vertex_array();
        return Err(e);
      }
    }

    st.unbind_vertex_array();

    Ok(geometry)
  }

  unsafe fn render(geometry: &Self::GeometryRepr, count: usize) {
    geometry
      .state
      .borrow_mut()
      .bind_vertex_array(geometry.vao, Bind::Cached);

    if geometry.ebo.is_some() {
      gl::DrawElements(
        geometry.mode,
        count as GLsizei,
        gl::UNSIGNED_INT,
        ptr::null::<c_void>(),
      );
    } else {
      gl::DrawArrays(geometry.mode, 0, count as GLsizei);
    }
  }
}

unsafe fn check_allocation(what: &str) -> Result<(), GeometryError> {
  match gl::GetError() {
    gl::NO_ERROR => Ok(()),
    gl::OUT_OF_MEMORY => Err(GeometryError::resource_error(format!(
      "out of memory while allocating the {}",
      what
    ))),
    e => Err(GeometryError::resource_error(format!(
      "cannot allocate the {}: error {:#x}",
      what, e
    ))),
  }
}

// Describe every attribute of the layout to the bound vertex array.
unsafe fn set_vertex_pointers(layout: &VertexLayout) {
  let stride = layout.stride() as GLsizei;

  for attr in layout.attributes() {
    gl::VertexAttribPointer(
      attr.slot,
      attr.components as GLint,
      gl::FLOAT,
      gl::FALSE,
      stride,
      ptr::null::<c_void>().add(attr.offset),
    );
    gl::EnableVertexAttribArray(attr.slot);
  }
}

fn opengl_mode(mode: Mode) -> GLenum {
  match mode {
    Mode::Line => gl::LINES,
    Mode::Triangle => gl::TRIANGLES,
  }
}
