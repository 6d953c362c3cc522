//! Graphics state.

use gl::types::*;
use std::cell::RefCell;
use std::error;
use std::fmt;
use std::marker::PhantomData;

// TLS synchronization barrier for `GLState`.
thread_local!(static TLS_ACQUIRE_GFX_STATE: RefCell<Option<()>> = RefCell::new(Some(())));

/// Last value sent to the driver, if known.
#[derive(Debug)]
struct Cached<T>(Option<T>)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  /// Cache a value.
  fn new(initial: T) -> Self {
    Cached(Some(initial))
  }

  /// Explicitly invalidate a value.
  fn invalidate(&mut self) {
    self.0 = None;
  }

  fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  /// A non-cached value is always invalid; a cached one is invalid if it differs from `new_val`.
  fn is_invalid(&self, new_val: &T) -> bool {
    match &self.0 {
      Some(ref t) => t != new_val,
      _ => true,
    }
  }
}

/// Driver state shadowed on the CPU side.
///
/// Binds, program switches and fixed-function toggles only reach the driver when they change
/// something. Handles are `u32::MAX` when unknown, which no driver hands out.
#[derive(Debug)]
pub struct GLState {
  _a: PhantomData<*const ()>, // !Send and !Sync

  // viewport
  viewport: Cached<[GLint; 4]>,

  // clear buffers
  clear_color: Cached<[GLfloat; 4]>,
  clear_depth: Cached<GLfloat>,

  // depth test
  depth_test: Cached<DepthTest>,

  // texture
  current_texture_unit: Cached<GLenum>,
  bound_textures: Vec<GLuint>,

  // array buffer
  bound_array_buffer: GLuint,

  // element buffer
  bound_element_array_buffer: GLuint,

  // vertex array
  bound_vertex_array: GLuint,

  // shader program
  current_program: GLuint,
}

impl GLState {
  /// Acquire the state of the context current on this thread; only one acquisition per thread
  /// succeeds.
  pub(crate) fn new() -> Result<Self, StateQueryError> {
    TLS_ACQUIRE_GFX_STATE.with(|rc| {
      let mut inner = rc.borrow_mut();

      match *inner {
        Some(_) => {
          inner.take();
          Self::get_from_context()
        }

        None => Err(StateQueryError::UnavailableGLState),
      }
    })
  }

  /// Read the initial state from the current OpenGL context.
  fn get_from_context() -> Result<Self, StateQueryError> {
    unsafe {
      let viewport = Cached::new(get_ctx_viewport());
      let clear_color = Cached::new(get_ctx_clear_color());
      let clear_depth = Cached::new(get_ctx_clear_depth());
      let depth_test = Cached::new(get_ctx_depth_test()?);
      let current_texture_unit = Cached::new(get_ctx_current_texture_unit());
      let bound_textures = vec![0; 48]; // 48 is the platform minimal requirement
      let bound_array_buffer = 0;
      let bound_element_array_buffer = 0;
      let bound_vertex_array = get_ctx_bound_vertex_array();
      let current_program = get_ctx_current_program();

      Ok(GLState {
        _a: PhantomData,
        viewport,
        clear_color,
        clear_depth,
        depth_test,
        current_texture_unit,
        bound_textures,
        bound_array_buffer,
        bound_element_array_buffer,
        bound_vertex_array,
        current_program,
      })
    }
  }

  /// Forget everything cached.
  ///
  /// Call this after issuing raw OpenGL calls through [`GL33::state`](super::GL33::state): the
  /// next state change of every kind goes to the driver.
  pub fn invalidate(&mut self) {
    self.viewport.invalidate();
    self.clear_color.invalidate();
    self.clear_depth.invalidate();
    self.depth_test.invalidate();
    self.current_texture_unit.invalidate();
    self.bound_textures.iter_mut().for_each(|t| *t = u32::MAX);
    self.bound_array_buffer = u32::MAX;
    self.bound_element_array_buffer = u32::MAX;
    self.bound_vertex_array = u32::MAX;
    self.current_program = u32::MAX;
  }

  pub(crate) unsafe fn set_viewport(&mut self, viewport: [GLint; 4]) {
    if self.viewport.is_invalid(&viewport) {
      gl::Viewport(viewport[0], viewport[1], viewport[2], viewport[3]);
      self.viewport.set(viewport);
    }
  }

  pub(crate) unsafe fn set_clear_color(&mut self, clear_color: [GLfloat; 4]) {
    if self.clear_color.is_invalid(&clear_color) {
      gl::ClearColor(
        clear_color[0],
        clear_color[1],
        clear_color[2],
        clear_color[3],
      );
      self.clear_color.set(clear_color);
    }
  }

  pub(crate) unsafe fn set_clear_depth(&mut self, clear_depth: GLfloat) {
    if self.clear_depth.is_invalid(&clear_depth) {
      gl::ClearDepth(clear_depth as GLdouble);
      self.clear_depth.set(clear_depth);
    }
  }

  pub(crate) unsafe fn set_depth_test(&mut self, depth_test: DepthTest) {
    if self.depth_test.is_invalid(&depth_test) {
      match depth_test {
        DepthTest::On => gl::Enable(gl::DEPTH_TEST),
        DepthTest::Off => gl::Disable(gl::DEPTH_TEST),
      }

      self.depth_test.set(depth_test);
    }
  }

  pub(crate) unsafe fn set_texture_unit(&mut self, unit: u32) {
    let unit = unit as GLenum;

    if self.current_texture_unit.is_invalid(&unit) {
      gl::ActiveTexture(gl::TEXTURE0 + unit);
      self.current_texture_unit.set(unit);
    }
  }

  /// Bind a 2D texture to the active texture unit.
  pub(crate) unsafe fn bind_texture(&mut self, handle: GLuint) {
    let unit = match self.current_texture_unit.0 {
      Some(unit) => unit as usize,
      None => {
        // unknown active unit; force it back to a known one
        self.set_texture_unit(0);
        0
      }
    };

    match self.bound_textures.get(unit).copied() {
      Some(handle_) if handle != handle_ => {
        gl::BindTexture(gl::TEXTURE_2D, handle);
        self.bound_textures[unit] = handle;
      }

      None => {
        gl::BindTexture(gl::TEXTURE_2D, handle);

        // not enough registered texture units; let’s grow a bit more
        self.bound_textures.resize(unit + 1, 0);
        self.bound_textures[unit] = handle;
      }

      _ => (), // cached
    }
  }

  /// Forget about a texture about to be deleted; the driver reverts its units to texture 0.
  pub(crate) fn unbind_texture(&mut self, handle: GLuint) {
    for bound in &mut self.bound_textures {
      if *bound == handle {
        *bound = 0;
      }
    }
  }

  pub(crate) unsafe fn bind_array_buffer(&mut self, handle: GLuint, bind: Bind) {
    if bind == Bind::Forced || self.bound_array_buffer != handle {
      gl::BindBuffer(gl::ARRAY_BUFFER, handle);
      self.bound_array_buffer = handle;
    }
  }

  pub(crate) unsafe fn bind_element_array_buffer(&mut self, handle: GLuint, bind: Bind) {
    if bind == Bind::Forced || self.bound_element_array_buffer != handle {
      gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, handle);
      self.bound_element_array_buffer = handle;
    }
  }

  /// Forget about a buffer about to be deleted.
  pub(crate) unsafe fn unbind_buffer(&mut self, handle: GLuint) {
    if self.bound_array_buffer == handle {
      self.bind_array_buffer(0, Bind::Cached);
    } else if self.bound_element_array_buffer == handle {
      self.bind_element_array_buffer(0, Bind::Cached);
    }
  }

  pub(crate) unsafe fn bind_vertex_array(&mut self, handle: GLuint, bind: Bind) {
    if bind == Bind::Forced || self.bound_vertex_array != handle {
      gl::BindVertexArray(handle);
      self.bound_vertex_array = handle;

      // the element array binding is part of the vertex array state
      self.bound_element_array_buffer = 0;
    }
  }

  pub(crate) unsafe fn unbind_vertex_array(&mut self) {
    self.bind_vertex_array(0, Bind::Cached)
  }

  pub(crate) unsafe fn use_program(&mut self, handle: GLuint) {
    if self.current_program != handle {
      gl::UseProgram(handle);
      self.current_program = handle;
    }
  }

  /// Stop using a program if it’s the current one.
  pub(crate) unsafe fn unuse_program(&mut self, handle: GLuint) {
    if self.current_program == handle {
      self.use_program(0);
    }
  }
}

/// Should the binding be cached or forced to the provided value?
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Bind {
  Forced,
  Cached,
}

/// An error that might happen when the context is queried.
#[non_exhaustive]
#[derive(Debug)]
pub enum StateQueryError {
  /// The [`GLState`] object is unavailable.
  ///
  /// That might occur if the current thread doesn’t support allocating a new graphics state. It
  /// might happen if you try to have more than one state on the same thread, for instance.
  UnavailableGLState,
  /// Corrupted depth test state.
  UnknownDepthTestState(GLboolean),
}

impl fmt::Display for StateQueryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StateQueryError::UnavailableGLState => write!(f, "unavailable graphics state"),
      StateQueryError::UnknownDepthTestState(ref s) => write!(f, "unknown depth test state: {}", s),
    }
  }
}

impl error::Error for StateQueryError {}

unsafe fn get_ctx_viewport() -> [GLint; 4] {
  let mut data = [0; 4];
  gl::GetIntegerv(gl::VIEWPORT, data.as_mut_ptr());
  data
}

unsafe fn get_ctx_clear_color() -> [GLfloat; 4] {
  let mut data = [0.; 4];
  gl::GetFloatv(gl::COLOR_CLEAR_VALUE, data.as_mut_ptr());
  data
}

unsafe fn get_ctx_clear_depth() -> GLfloat {
  let mut data = 1.;
  gl::GetFloatv(gl::DEPTH_CLEAR_VALUE, &mut data);
  data
}

unsafe fn get_ctx_depth_test() -> Result<DepthTest, StateQueryError> {
  let state = gl::IsEnabled(gl::DEPTH_TEST);

  match state {
    gl::TRUE => Ok(DepthTest::On),
    gl::FALSE => Ok(DepthTest::Off),
    _ => Err(StateQueryError::UnknownDepthTestState(state)),
  }
}

unsafe fn get_ctx_current_texture_unit() -> GLenum {
  let mut active_texture = gl::TEXTURE0 as GLint;
  gl::GetIntegerv(gl::ACTIVE_TEXTURE, &mut active_texture);
  active_texture as GLenum - gl::TEXTURE0
}

unsafe fn get_ctx_bound_vertex_array() -> GLuint {
  let mut bound = 0 as GLint;
  gl::GetIntegerv(gl::VERTEX_ARRAY_BINDING, &mut bound);
  bound as GLuint
}

unsafe fn get_ctx_current_program() -> GLuint {
  let mut used = 0 as GLint;
  gl::GetIntegerv(gl::CURRENT_PROGRAM, &mut used);
  used as GLuint
}

/// Whether or not depth test should be enabled.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum DepthTest {
  /// The depth test is enabled.
  On,
  /// The depth test is disabled.
  Off,
}
