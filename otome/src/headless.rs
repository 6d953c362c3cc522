//! Headless backend.
//!
//! [`Headless`] is a software stand-in for a graphics driver. It doesn’t rasterize anything; it
//! keeps track of the objects a real driver would hold and of every call made to it, so that
//! resource discipline can be checked without a GPU:
//!
//! - Shader sources are scanned for their global declarations. Compilation fails on `#error`
//!   directives, unbalanced brackets and missing `main`. Linking fails when a fragment input has no
//!   matching vertex output. Uniforms the source never reads are not reported active.
//! - An optional memory budget makes buffer and texture uploads fail with out-of-memory.
//! - Attribute slots enabled on each vertex array are tracked, including on deleted vertex arrays.
//! - Draw calls made with a deleted program, or without any, are recorded as violations, as are
//!   uploads of mismatched uniform types.

mod glsl;

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::backend::geometry::Geometry;
use crate::backend::pipeline::Pipeline;
use crate::backend::shader::{Shader, Uniformable};
use crate::backend::texture::Texture;
use crate::context::GraphicsContext;
use crate::geometry::{GeometryError, Mode, VertexLayout};
use crate::pipeline::PipelineState;
use crate::shader::types::{Mat33, Mat44, Vec2, Vec3, Vec4};
use crate::shader::{ActiveUniform, ProgramError, StageError, StageType, UniformType};
use crate::texture::{FilterMode, PixelFormat, TextureError};

use self::glsl::Declarations;

/// A driver call, as recorded by [`Headless`].
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
  /// A shader object was created.
  CreateShader(u32, StageType),
  /// A shader object was deleted.
  DeleteShader(u32),
  /// A program object was created.
  CreateProgram(u32),
  /// A shader was attached to a program.
  AttachShader {
    /// Program handle.
    program: u32,
    /// Shader handle.
    shader: u32,
  },
  /// A program was linked.
  LinkProgram(u32),
  /// A shader was detached from a program.
  DetachShader {
    /// Program handle.
    program: u32,
    /// Shader handle.
    shader: u32,
  },
  /// A program object was deleted.
  DeleteProgram(u32),
  /// The current program changed (`0` for none).
  UseProgram(u32),
  /// A uniform value was uploaded.
  Uniform {
    /// Program handle.
    program: u32,
    /// Uniform location.
    location: i32,
  },
  /// A vertex array was created.
  GenVertexArray(u32),
  /// The bound vertex array changed (`0` for none).
  BindVertexArray(u32),
  /// A buffer was created.
  GenBuffer(u32),
  /// Data was uploaded to a buffer.
  BufferData {
    /// Buffer handle.
    buffer: u32,
    /// Size of the upload, in bytes.
    bytes: usize,
  },
  /// An attribute slot was set up and enabled.
  EnableVertexAttrib {
    /// Vertex array handle.
    vertex_array: u32,
    /// Attribute slot.
    slot: u32,
    /// Component count.
    components: usize,
    /// Stride, in bytes.
    stride: usize,
    /// Offset, in bytes.
    offset: usize,
  },
  /// An attribute slot was disabled.
  DisableVertexAttrib {
    /// Vertex array handle.
    vertex_array: u32,
    /// Attribute slot.
    slot: u32,
  },
  /// A vertex array was deleted.
  DeleteVertexArray(u32),
  /// A buffer was deleted.
  DeleteBuffer(u32),
  /// Non-indexed draw.
  DrawArrays {
    /// Primitive mode.
    mode: Mode,
    /// Number of vertices.
    count: usize,
  },
  /// Indexed draw.
  DrawElements {
    /// Primitive mode.
    mode: Mode,
    /// Number of indices.
    count: usize,
  },
  /// A texture was created.
  GenTexture(u32),
  /// Texels were uploaded to a texture.
  TexImage2D {
    /// Texture handle.
    texture: u32,
    /// Width, in texels.
    width: u32,
    /// Height, in texels.
    height: u32,
    /// Pixel format.
    format: PixelFormat,
    /// Min / mag filter.
    filter: FilterMode,
  },
  /// Mipmaps were generated for a texture.
  GenerateMipmap(u32),
  /// A texture was bound to a texture unit (`0` for none).
  BindTexture {
    /// Texture unit.
    unit: u32,
    /// Texture handle.
    texture: u32,
  },
  /// A texture was deleted.
  DeleteTexture(u32),
  /// The viewport changed.
  Viewport([u32; 4]),
  /// The framebuffer was cleared.
  Clear {
    /// Color buffer cleared.
    color: bool,
    /// Depth buffer cleared.
    depth: bool,
  },
}

/// A value stored at a uniform location.
#[derive(Clone, Debug, PartialEq)]
pub enum UniformValue {
  /// `float`.
  Float(f32),
  /// `int` (or sampler unit).
  Int(i32),
  /// `bool`.
  Bool(bool),
  /// `vec2`.
  Vec2([f32; 2]),
  /// `vec3`.
  Vec3([f32; 3]),
  /// `vec4`.
  Vec4([f32; 4]),
  /// `ivec2`.
  IVec2([i32; 2]),
  /// `ivec3`.
  IVec3([i32; 3]),
  /// `ivec4`.
  IVec4([i32; 4]),
  /// `mat3`, column-major.
  Mat33([f32; 9]),
  /// `mat4`, column-major.
  Mat44([f32; 16]),
}

/// Number of live objects of each kind.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LiveObjects {
  /// Shader objects.
  pub shaders: usize,
  /// Program objects.
  pub programs: usize,
  /// Vertex arrays.
  pub vertex_arrays: usize,
  /// Buffers.
  pub buffers: usize,
  /// Textures.
  pub textures: usize,
}

#[derive(Debug)]
struct ProgramObject {
  uniforms: Vec<ActiveUniform>,
}

#[derive(Debug, Default)]
struct VertexArrayObject {
  enabled: BTreeSet<u32>,
  deleted: bool,
}

#[derive(Debug, Default)]
struct Driver {
  next_handle: u32,
  calls: Vec<Call>,
  shaders: HashMap<u32, (StageType, Declarations)>,
  programs: HashMap<u32, ProgramObject>,
  deleted_programs: BTreeSet<u32>,
  vertex_arrays: HashMap<u32, VertexArrayObject>,
  buffers: HashMap<u32, usize>,
  textures: HashMap<u32, usize>,
  memory_budget: Option<usize>,
  current_program: u32,
  bound_vertex_array: u32,
  texture_unit: u32,
  bound_textures: HashMap<u32, u32>,
  uniform_values: HashMap<(u32, i32), UniformValue>,
  violations: Vec<String>,
}

impl Driver {
  fn gen(&mut self) -> u32 {
    self.next_handle += 1;
    self.next_handle
  }

  fn memory_used(&self) -> usize {
    self.buffers.values().sum::<usize>() + self.textures.values().sum::<usize>()
  }

  fn reserve(&self, bytes: usize) -> Result<(), String> {
    match self.memory_budget {
      Some(budget) if self.memory_used() + bytes > budget => Err(format!(
        "GL_OUT_OF_MEMORY: cannot allocate {} bytes ({} of {} in use)",
        bytes,
        self.memory_used(),
        budget
      )),
      _ => Ok(()),
    }
  }

  fn use_program(&mut self, handle: u32) {
    if self.current_program != handle {
      self.current_program = handle;
      self.calls.push(Call::UseProgram(handle));
    }
  }

  fn bind_vertex_array(&mut self, handle: u32) {
    if self.bound_vertex_array != handle {
      self.bound_vertex_array = handle;
      self.calls.push(Call::BindVertexArray(handle));
    }
  }

  fn bind_texture(&mut self, unit: u32, texture: u32) {
    self.texture_unit = unit;

    if self.bound_textures.get(&unit).copied().unwrap_or(0) != texture {
      self.bound_textures.insert(unit, texture);
      self.calls.push(Call::BindTexture { unit, texture });
    }
  }

  fn delete_shader(&mut self, handle: u32) {
    self.shaders.remove(&handle);
    self.calls.push(Call::DeleteShader(handle));
  }

  fn delete_program(&mut self, handle: u32) {
    self.programs.remove(&handle);
    self.deleted_programs.insert(handle);
    self.uniform_values.retain(|&(program, _), _| program != handle);
    self.calls.push(Call::DeleteProgram(handle));
  }

  fn delete_buffer(&mut self, handle: u32) {
    self.buffers.remove(&handle);
    self.calls.push(Call::DeleteBuffer(handle));
  }

  fn delete_vertex_array(&mut self, handle: u32) {
    if self.bound_vertex_array == handle {
      self.bind_vertex_array(0);
    }

    if let Some(vao) = self.vertex_arrays.get_mut(&handle) {
      vao.deleted = true;
    }

    self.calls.push(Call::DeleteVertexArray(handle));
  }

  fn delete_texture(&mut self, handle: u32) {
    self.textures.remove(&handle);

    // deleting a bound texture reverts its units to texture 0
    for bound in self.bound_textures.values_mut() {
      if *bound == handle {
        *bound = 0;
      }
    }

    self.calls.push(Call::DeleteTexture(handle));
  }

  fn link(&self, vertex: u32, fragment: u32) -> Result<Vec<ActiveUniform>, String> {
    let (vs, fs) = match (self.shaders.get(&vertex), self.shaders.get(&fragment)) {
      (Some((_, vs)), Some((_, fs))) => (vs, fs),
      _ => return Err("error: attached shader was deleted".to_owned()),
    };

    for input in &fs.inputs {
      let matched = vs
        .outputs
        .iter()
        .any(|output| output.name == input.name && output.ty == input.ty);

      if !matched {
        return Err(format!(
          "error: fragment shader input `{}` has no matching vertex shader output",
          input.name
        ));
      }
    }

    let mut uniforms: Vec<ActiveUniform> = Vec::new();
    for decl in vs.uniforms.iter().chain(&fs.uniforms) {
      let name = if decl.array {
        format!("{}[0]", decl.name)
      } else {
        decl.name.clone()
      };

      if !decl.used || uniforms.iter().any(|u| u.name == name) {
        continue;
      }

      uniforms.push(ActiveUniform {
        name,
        location: uniforms.len() as i32,
        ty: uniform_type(&decl.ty),
      });
    }

    Ok(uniforms)
  }

  fn upload(&mut self, program: u32, location: i32, ty: UniformType, value: UniformValue) {
    self.use_program(program);

    let declared = self
      .programs
      .get(&program)
      .and_then(|p| p.uniforms.iter().find(|u| u.location == location))
      .map(|u| u.ty);

    match declared {
      Some(declared) if compatible(declared, ty) => {
        self.uniform_values.insert((program, location), value);
        self.calls.push(Call::Uniform { program, location });
      }

      Some(declared) => self.violations.push(format!(
        "GL_INVALID_OPERATION: {} uploaded to {} uniform at location {}",
        ty, declared, location
      )),

      None => self.violations.push(format!(
        "GL_INVALID_OPERATION: no uniform at location {} of program {}",
        location, program
      )),
    }
  }

  fn draw(&mut self, vertex_array: u32, call: Call) {
    self.bind_vertex_array(vertex_array);

    if self.current_program == 0 {
      self.violations.push("draw call without a current program".to_owned());
    } else if self.deleted_programs.contains(&self.current_program) {
      self.violations.push(format!(
        "draw call with deleted program {}",
        self.current_program
      ));
    }

    self.calls.push(call);
  }
}

fn uniform_type(glsl: &str) -> UniformType {
  match glsl {
    "int" => UniformType::Int,
    "uint" => UniformType::UInt,
    "float" => UniformType::Float,
    "bool" => UniformType::Bool,
    "ivec2" => UniformType::IVec2,
    "ivec3" => UniformType::IVec3,
    "ivec4" => UniformType::IVec4,
    "vec2" => UniformType::Vec2,
    "vec3" => UniformType::Vec3,
    "vec4" => UniformType::Vec4,
    "bvec2" => UniformType::BVec2,
    "bvec3" => UniformType::BVec3,
    "bvec4" => UniformType::BVec4,
    "mat2" => UniformType::M22,
    "mat3" => UniformType::M33,
    "mat4" => UniformType::M44,
    "sampler2D" => UniformType::Sampler2D,
    "samplerCube" => UniformType::Cubemap,
    _ => UniformType::Other(0),
  }
}

// Upload type against declared type, following the glUniform* rules.
fn compatible(declared: UniformType, uploaded: UniformType) -> bool {
  declared == uploaded
    || matches!(
      (declared, uploaded),
      (UniformType::Sampler2D, UniformType::Int)
        | (UniformType::Cubemap, UniformType::Int)
        | (UniformType::Bool, UniformType::Int)
        | (UniformType::Int, UniformType::Bool)
    )
}

/// Headless backend and context.
///
/// Cloning is not possible: a backend is one driver. Inspection methods borrow immutably, so a
/// test can keep the context around and look at it between operations.
#[derive(Debug, Default)]
pub struct Headless {
  driver: Rc<RefCell<Driver>>,
}

impl Headless {
  /// Create a headless backend with unlimited memory.
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a headless backend that fails allocations past `bytes` of buffer and texture memory.
  pub fn with_memory_budget(bytes: usize) -> Self {
    let headless = Self::default();
    headless.driver.borrow_mut().memory_budget = Some(bytes);
    headless
  }

  /// Every call recorded so far.
  pub fn calls(&self) -> Vec<Call> {
    self.driver.borrow().calls.clone()
  }

  /// Drain the call log.
  pub fn take_calls(&self) -> Vec<Call> {
    std::mem::take(&mut self.driver.borrow_mut().calls)
  }

  /// Number of attribute slots still enabled, over every vertex array ever created (deleted ones
  /// included).
  pub fn enabled_attribute_slots(&self) -> usize {
    self
      .driver
      .borrow()
      .vertex_arrays
      .values()
      .map(|vao| vao.enabled.len())
      .sum()
  }

  /// Live objects, by kind.
  pub fn live(&self) -> LiveObjects {
    let driver = self.driver.borrow();

    LiveObjects {
      shaders: driver.shaders.len(),
      programs: driver.programs.len(),
      vertex_arrays: driver.vertex_arrays.values().filter(|v| !v.deleted).count(),
      buffers: driver.buffers.len(),
      textures: driver.textures.len(),
    }
  }

  /// Values of every uniform of every live program, keyed by `(program, location)`.
  pub fn uniform_values(&self) -> HashMap<(u32, i32), UniformValue> {
    self.driver.borrow().uniform_values.clone()
  }

  /// Value of a uniform in the current program.
  pub fn current_uniform(&self, location: i32) -> Option<UniformValue> {
    let driver = self.driver.borrow();
    driver
      .uniform_values
      .get(&(driver.current_program, location))
      .cloned()
  }

  /// Current program, if any.
  pub fn current_program(&self) -> Option<u32> {
    Some(self.driver.borrow().current_program).filter(|&h| h != 0)
  }

  /// Texture bound to `unit`, if any.
  pub fn bound_texture(&self, unit: u32) -> Option<u32> {
    self
      .driver
      .borrow()
      .bound_textures
      .get(&unit)
      .copied()
      .filter(|&h| h != 0)
  }

  /// Bytes of buffer and texture memory in use.
  pub fn memory_used(&self) -> usize {
    self.driver.borrow().memory_used()
  }

  /// Misuses detected so far.
  pub fn violations(&self) -> Vec<String> {
    self.driver.borrow().violations.clone()
  }
}

unsafe impl GraphicsContext for Headless {
  type Backend = Self;

  fn backend(&mut self) -> &mut Self::Backend {
    self
  }
}

/// Headless shader stage.
#[derive(Debug)]
pub struct HeadlessStage {
  handle: u32,
  driver: Rc<RefCell<Driver>>,
}

impl Drop for HeadlessStage {
  fn drop(&mut self) {
    self.driver.borrow_mut().delete_shader(self.handle);
  }
}

/// Headless shader program.
#[derive(Debug)]
pub struct HeadlessProgram {
  handle: u32,
  driver: Rc<RefCell<Driver>>,
}

impl HeadlessProgram {
  /// Driver handle.
  pub fn handle(&self) -> u32 {
    self.handle
  }

  fn upload(&mut self, location: i32, ty: UniformType, value: UniformValue) {
    self
      .driver
      .borrow_mut()
      .upload(self.handle, location, ty, value);
  }
}

impl Drop for HeadlessProgram {
  fn drop(&mut self) {
    self.driver.borrow_mut().delete_program(self.handle);
  }
}

unsafe impl Shader for Headless {
  type StageRepr = HeadlessStage;

  type ProgramRepr = HeadlessProgram;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    let mut driver = self.driver.borrow_mut();
    let handle = driver.gen();
    driver.calls.push(Call::CreateShader(handle, ty));

    match glsl::compile(src) {
      Ok(decls) => {
        driver.shaders.insert(handle, (ty, decls));

        Ok(HeadlessStage {
          handle,
          driver: self.driver.clone(),
        })
      }

      Err(log) => {
        driver.delete_shader(handle);
        Err(StageError::compilation_failed(ty, log))
      }
    }
  }

  unsafe fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError> {
    let mut driver = self.driver.borrow_mut();
    let program = driver.gen();
    driver.calls.push(Call::CreateProgram(program));

    for shader in [vertex.handle, fragment.handle] {
      driver.calls.push(Call::AttachShader { program, shader });
    }

    driver.calls.push(Call::LinkProgram(program));

    match driver.link(vertex.handle, fragment.handle) {
      Ok(uniforms) => {
        for shader in [vertex.handle, fragment.handle] {
          driver.calls.push(Call::DetachShader { program, shader });
        }

        driver.programs.insert(program, ProgramObject { uniforms });

        Ok(HeadlessProgram {
          handle: program,
          driver: self.driver.clone(),
        })
      }

      Err(log) => {
        driver.delete_program(program);
        Err(ProgramError::link_failed(log))
      }
    }
  }

  unsafe fn active_uniforms(program: &Self::ProgramRepr) -> Vec<ActiveUniform> {
    program
      .driver
      .borrow()
      .programs
      .get(&program.handle)
      .map(|p| p.uniforms.clone())
      .unwrap_or_default()
  }

  unsafe fn bind_program(program: &Self::ProgramRepr) {
    program.driver.borrow_mut().use_program(program.handle);
  }

  unsafe fn unbind_program(program: &Self::ProgramRepr) {
    let mut driver = program.driver.borrow_mut();

    if driver.current_program == program.handle {
      driver.use_program(0);
    }
  }
}

macro_rules! impl_Uniformable {
  ($t:ty, $uty:ident, |$v:ident| $value:expr) => {
    unsafe impl Uniformable<$t> for Headless {
      const TY: UniformType = UniformType::$uty;

      unsafe fn update(program: &mut HeadlessProgram, location: i32, $v: $t) {
        program.upload(location, <Self as Uniformable<$t>>::TY, $value);
      }
    }
  };
}

impl_Uniformable!(f32, Float, |v| UniformValue::Float(v));
impl_Uniformable!(i32, Int, |v| UniformValue::Int(v));
impl_Uniformable!(bool, Bool, |v| UniformValue::Bool(v));
impl_Uniformable!(Vec2<f32>, Vec2, |v| UniformValue::Vec2(v.0));
impl_Uniformable!(Vec3<f32>, Vec3, |v| UniformValue::Vec3(v.0));
impl_Uniformable!(Vec4<f32>, Vec4, |v| UniformValue::Vec4(v.0));
impl_Uniformable!(Vec2<i32>, IVec2, |v| UniformValue::IVec2(v.0));
impl_Uniformable!(Vec3<i32>, IVec3, |v| UniformValue::IVec3(v.0));
impl_Uniformable!(Vec4<i32>, IVec4, |v| UniformValue::IVec4(v.0));
impl_Uniformable!(Mat33<f32>, M33, |v| UniformValue::Mat33(v.0));
impl_Uniformable!(Mat44<f32>, M44, |v| UniformValue::Mat44(v.0));

/// Headless geometry.
#[derive(Debug)]
pub struct HeadlessGeometry {
  vao: u32,
  vbo: u32,
  ebo: Option<u32>,
  slots: Vec<u32>,
  mode: Mode,
  driver: Rc<RefCell<Driver>>,
}

impl Drop for HeadlessGeometry {
  fn drop(&mut self) {
    let mut driver = self.driver.borrow_mut();
    driver.bind_vertex_array(self.vao);

    for &slot in &self.slots {
      if let Some(vao) = driver.vertex_arrays.get_mut(&self.vao) {
        vao.enabled.remove(&slot);
      }

      driver.calls.push(Call::DisableVertexAttrib {
        vertex_array: self.vao,
        slot,
      });
    }

    driver.bind_vertex_array(0);
    driver.delete_vertex_array(self.vao);

    // 0 when the vertex upload failed
    if self.vbo != 0 {
      driver.delete_buffer(self.vbo);
    }

    if let Some(ebo) = self.ebo {
      driver.delete_buffer(ebo);
    }
  }
}

// Allocate a buffer and upload `bytes` to it.
fn upload_buffer(driver: &RefCell<Driver>, bytes: usize) -> Result<u32, GeometryError> {
  let mut driver = driver.borrow_mut();
  let buffer = driver.gen();
  driver.calls.push(Call::GenBuffer(buffer));

  driver.buffers.insert(buffer, 0);
  driver.calls.push(Call::BufferData { buffer, bytes });

  if let Err(e) = driver.reserve(bytes) {
    driver.delete_buffer(buffer);
    return Err(GeometryError::resource_error(e));
  }

  driver.buffers.insert(buffer, bytes);

  Ok(buffer)
}

unsafe impl Geometry for Headless {
  type GeometryRepr = HeadlessGeometry;

  unsafe fn new_geometry(
    &mut self,
    vertices: &[f32],
    indices: Option<&[u32]>,
    layout: &VertexLayout,
    mode: Mode,
  ) -> Result<Self::GeometryRepr, GeometryError> {
    let vao = {
      let mut driver = self.driver.borrow_mut();
      let vao = driver.gen();
      driver.calls.push(Call::GenVertexArray(vao));
      driver.vertex_arrays.insert(vao, VertexArrayObject::default());
      driver.bind_vertex_array(vao);
      vao
    };

    let mut geometry = HeadlessGeometry {
      vao,
      vbo: 0,
      ebo: None,
      slots: Vec::new(),
      mode,
      driver: self.driver.clone(),
    };

    // partially built geometries are released by their drop
    geometry.vbo = upload_buffer(&self.driver, vertices.len() * 4)?;

    if let Some(indices) = indices {
      geometry.ebo = Some(upload_buffer(&self.driver, indices.len() * 4)?);
    }

    let mut driver = self.driver.borrow_mut();
    for desc in layout.attributes() {
      driver.calls.push(Call::EnableVertexAttrib {
        vertex_array: vao,
        slot: desc.slot,
        components: desc.components,
        stride: layout.stride(),
        offset: desc.offset,
      });

      if let Some(vao) = driver.vertex_arrays.get_mut(&vao) {
        vao.enabled.insert(desc.slot);
      }

      geometry.slots.push(desc.slot);
    }

    Ok(geometry)
  }

  unsafe fn render(geometry: &Self::GeometryRepr, count: usize) {
    let call = if geometry.ebo.is_some() {
      Call::DrawElements {
        mode: geometry.mode,
        count,
      }
    } else {
      Call::DrawArrays {
        mode: geometry.mode,
        count,
      }
    };

    geometry.driver.borrow_mut().draw(geometry.vao, call);
  }
}

/// Headless texture.
#[derive(Debug)]
pub struct HeadlessTexture {
  handle: u32,
  driver: Rc<RefCell<Driver>>,
}

impl Drop for HeadlessTexture {
  fn drop(&mut self) {
    self.driver.borrow_mut().delete_texture(self.handle);
  }
}

unsafe impl Texture for Headless {
  type TextureRepr = HeadlessTexture;

  unsafe fn new_texture(
    &mut self,
    size: [u32; 2],
    format: PixelFormat,
    filter: FilterMode,
    texels: &[u8],
  ) -> Result<Self::TextureRepr, TextureError> {
    let mut driver = self.driver.borrow_mut();
    let handle = driver.gen();
    driver.calls.push(Call::GenTexture(handle));
    driver.textures.insert(handle, 0);

    let unit = driver.texture_unit;
    driver.bind_texture(unit, handle);

    driver.calls.push(Call::TexImage2D {
      texture: handle,
      width: size[0],
      height: size[1],
      format,
      filter,
    });

    if let Err(e) = driver.reserve(texels.len()) {
      driver.delete_texture(handle);
      return Err(TextureError::resource_error(e));
    }

    driver.textures.insert(handle, texels.len());
    driver.calls.push(Call::GenerateMipmap(handle));

    Ok(HeadlessTexture {
      handle,
      driver: self.driver.clone(),
    })
  }

  unsafe fn bind_texture(texture: &Self::TextureRepr, unit: u32) {
    texture.driver.borrow_mut().bind_texture(unit, texture.handle);
  }

  unsafe fn unbind_texture(texture: &Self::TextureRepr) {
    texture.driver.borrow_mut().bind_texture(0, 0);
  }
}

unsafe impl Pipeline for Headless {
  unsafe fn start_frame(&mut self, size: [u32; 2], state: &PipelineState) {
    let mut driver = self.driver.borrow_mut();
    driver.calls.push(Call::Viewport(state.viewport.rect(size)));
    driver.calls.push(Call::Clear {
      color: state.clear_color.is_some(),
      depth: state.clear_depth.is_some(),
    });
  }
}
