use crate::gl33::{state::GLState, GL33};
use gl::{self, types::*};
use otome::{
  backend::shader::{Shader, Uniformable},
  shader::{
    types::{Mat33, Mat44, Vec2, Vec3, Vec4},
    ActiveUniform, ProgramError, StageError, StageType, UniformType,
  },
};
use std::{
  cell::RefCell,
  ffi::CString,
  ptr::{null, null_mut},
  rc::Rc,
};

#[derive(Debug)]
pub struct Stage {
  handle: GLuint,
  ty: StageType,
}

impl Stage {
  /// Type of the stage.
  pub fn ty(&self) -> StageType {
    self.ty
  }
}

impl Drop for Stage {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteShader(self.handle);
    }
  }
}

#[derive(Debug)]
pub struct Program {
  pub(crate) handle: GLuint,
  state: Rc<RefCell<GLState>>,
}

impl Drop for Program {
  fn drop(&mut self) {
    unsafe {
      self.state.borrow_mut().unuse_program(self.handle);
      gl::DeleteProgram(self.handle);
    }
  }
}

impl Program {
  /// Driver handle of the program.
  pub fn handle(&self) -> GLuint {
    self.handle
  }

  fn link(&self) -> Result<(), ProgramError> {
    let handle = self.handle;

    unsafe {
      gl::LinkProgram(handle);

      let mut linked: GLint = gl::FALSE.into();
      gl::GetProgramiv(handle, gl::LINK_STATUS, &mut linked);

      if linked == gl::TRUE.into() {
        Ok(())
      } else {
        let mut log_len: GLint = 0;
        gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

        let mut log: Vec<u8> = vec![0; log_len.max(0) as usize];
        gl::GetProgramInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

        Err(ProgramError::link_failed(info_log(log)))
      }
    }
  }

  // the program must be current before any glUniform* call
  unsafe fn make_current(&self) {
    self.state.borrow_mut().use_program(self.handle);
  }
}

unsafe impl Shader for GL33 {
  type StageRepr = Stage;

  type ProgramRepr = Program;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    let c_src = CString::new(glsl_pragma_src(src).into_bytes())
      .map_err(|e| StageError::compilation_failed(ty, format!("invalid source: {}", e)))?;

    let handle = gl::CreateShader(opengl_shader_type(ty));

    if handle == 0 {
      return Err(StageError::compilation_failed(
        ty,
        "unable to create shader stage",
      ));
    }

    gl::ShaderSource(handle, 1, [c_src.as_ptr()].as_ptr(), null());
    gl::CompileShader(handle);

    let mut compiled: GLint = gl::FALSE.into();
    gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut compiled);

    if compiled == gl::TRUE.into() {
      Ok(Stage { handle, ty })
    } else {
      let mut log_len: GLint = 0;
      gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

      let mut log: Vec<u8> = vec![0; log_len.max(0) as usize];
      gl::GetShaderInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

      gl::DeleteShader(handle);

      Err(StageError::compilation_failed(ty, info_log(log)))
    }
  }

  unsafe fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError> {
    let handle = gl::CreateProgram();

    if handle == 0 {
      return Err(ProgramError::link_failed("unable to create shader program"));
    }

    gl::AttachShader(handle, vertex.handle);
    gl::AttachShader(handle, fragment.handle);

    // dropping the program on failure deletes it
    let program = Program {
      handle,
      state: self.state.clone(),
    };
    let linked = program.link();

    gl::DetachShader(handle, vertex.handle);
    gl::DetachShader(handle, fragment.handle);

    linked.map(move |_| program)
  }

  unsafe fn active_uniforms(program: &Self::ProgramRepr) -> Vec<ActiveUniform> {
    let handle = program.handle;

    let mut count: GLint = 0;
    gl::GetProgramiv(handle, gl::ACTIVE_UNIFORMS, &mut count);

    // get the max length of the returned names
    let mut max_len: GLint = 0;
    gl::GetProgramiv(handle, gl::ACTIVE_UNIFORM_MAX_LENGTH, &mut max_len);

    let mut uniforms = Vec::with_capacity(count.max(0) as usize);

    for index in 0..count.max(0) as GLuint {
      let mut name = vec![0u8; max_len.max(1) as usize];
      let mut name_len: GLsizei = 0;
      let mut size: GLint = 0;
      let mut glty: GLenum = 0;

      gl::GetActiveUniform(
        handle,
        index,
        max_len,
        &mut name_len,
        &mut size,
        &mut glty,
        name.as_mut_ptr() as *mut GLchar,
      );

      name.truncate(name_len.max(0) as usize);

      // uniforms living in blocks have no location
      let location = match CString::new(name.clone()) {
        Ok(c_name) => gl::GetUniformLocation(handle, c_name.as_ptr() as *const GLchar),
        Err(_) => -1,
      };

      uniforms.push(ActiveUniform {
        name: String::from_utf8_lossy(&name).into_owned(),
        location,
        ty: uniform_type(glty),
      });
    }

    uniforms
  }

  unsafe fn bind_program(program: &Self::ProgramRepr) {
    program.make_current();
  }

  unsafe fn unbind_program(program: &Self::ProgramRepr) {
    program.state.borrow_mut().unuse_program(program.handle);
  }
}

fn opengl_shader_type(t: StageType) -> GLenum {
  match t {
    StageType::VertexShader => gl::VERTEX_SHADER,
    StageType::FragmentShader => gl::FRAGMENT_SHADER,
  }
}

const GLSL_PRAGMA: &str = "#version 330 core\n";

fn glsl_pragma_src(src: &str) -> String {
  let has_version = src
    .lines()
    .any(|line| line.trim_start().starts_with("#version"));

  if has_version {
    src.to_owned()
  } else {
    let mut pragma = String::from(GLSL_PRAGMA);
    pragma.push_str(src);
    pragma
  }
}

// info logs are NUL-terminated
fn info_log(mut log: Vec<u8>) -> String {
  if let Some(nul) = log.iter().position(|&b| b == 0) {
    log.truncate(nul);
  }

  String::from_utf8_lossy(&log).trim_end().to_owned()
}

fn uniform_type(glty: GLenum) -> UniformType {
  match glty {
    gl::INT => UniformType::Int,
    gl::UNSIGNED_INT => UniformType::UInt,
    gl::FLOAT => UniformType::Float,
    gl::BOOL => UniformType::Bool,
    gl::INT_VEC2 => UniformType::IVec2,
    gl::INT_VEC3 => UniformType::IVec3,
    gl::INT_VEC4 => UniformType::IVec4,
    gl::FLOAT_VEC2 => UniformType::Vec2,
    gl::FLOAT_VEC3 => UniformType::Vec3,
    gl::FLOAT_VEC4 => UniformType::Vec4,
    gl::BOOL_VEC2 => UniformType::BVec2,
    gl::BOOL_VEC3 => UniformType::BVec3,
    gl::BOOL_VEC4 => UniformType::BVec4,
    gl::FLOAT_MAT2 => UniformType::M22,
    gl::FLOAT_MAT3 => UniformType::M33,
    gl::FLOAT_MAT4 => UniformType::M44,
    gl::SAMPLER_2D => UniformType::Sampler2D,
    gl::SAMPLER_CUBE => UniformType::Cubemap,
    other => UniformType::Other(other),
  }
}

macro_rules! impl_Uniformable {
  (vec $t:ty, $uty:tt, $f:tt) => {
    unsafe impl Uniformable<$t> for GL33 {
      const TY: UniformType = UniformType::$uty;

      unsafe fn update(program: &mut Program, location: i32, value: $t) {
        program.make_current();
        gl::$f(location, 1, value.as_ptr() as _);
      }
    }
  };

  (mat $t:ty, $uty:tt, $f:tt) => {
    unsafe impl Uniformable<$t> for GL33 {
      const TY: UniformType = UniformType::$uty;

      unsafe fn update(program: &mut Program, location: i32, value: $t) {
        program.make_current();
        gl::$f(location, 1, gl::FALSE, value.as_ptr() as _);
      }
    }
  };

  ($t:ty, $uty:tt, $f:tt) => {
    unsafe impl Uniformable<$t> for GL33 {
      const TY: UniformType = UniformType::$uty;

      unsafe fn update(program: &mut Program, location: i32, value: $t) {
        program.make_current();
        gl::$f(location, value);
      }
    }
  };
}

impl_Uniformable!(i32, Int, Uniform1i);
impl_Uniformable!(vec Vec2<i32>, IVec2, Uniform2iv);
impl_Uniformable!(vec Vec3<i32>, IVec3, Uniform3iv);
impl_Uniformable!(vec Vec4<i32>, IVec4, Uniform4iv);

impl_Uniformable!(f32, Float, Uniform1f);
impl_Uniformable!(vec Vec2<f32>, Vec2, Uniform2fv);
impl_Uniformable!(vec Vec3<f32>, Vec3, Uniform3fv);
impl_Uniformable!(vec Vec4<f32>, Vec4, Uniform4fv);

impl_Uniformable!(mat Mat33<f32>, M33, UniformMatrix3fv);
impl_Uniformable!(mat Mat44<f32>, M44, UniformMatrix4fv);

unsafe impl Uniformable<bool> for GL33 {
  const TY: UniformType = UniformType::Bool;

  unsafe fn update(program: &mut Program, location: i32, value: bool) {
    program.make_current();
    gl::Uniform1i(location, value as GLint);
  }
}
