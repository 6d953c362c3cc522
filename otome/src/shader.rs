//! Shader stages, programs and uniforms.
//!
//! A [`Stage`] is a single compiled shader stage. Two of them, a vertex and a fragment stage, are
//! linked into a [`Program`]. Stages are consumed by linking: whatever the outcome, their handles
//! are gone once [`Program::from_stages`] returns.
//!
//! # Uniforms
//!
//! Right after a successful link, the program asks the driver for every _active_ uniform and
//! records its name, location and type in a [`UniformTable`]. That table never changes afterwards.
//! Uploads look names up in it: a name the driver did not report (unknown, or removed by the GLSL
//! compiler because it was unused) is skipped without error. Call sites therefore never need to
//! care whether a uniform survived compilation.

pub mod types;

use std::collections::HashMap;
use std::error;
use std::fmt;

use crate::backend::shader::{Shader, Uniformable};
use crate::context::GraphicsContext;

/// A shader stage type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StageType {
  /// Vertex shader.
  VertexShader,
  /// Fragment shader.
  FragmentShader,
}

impl fmt::Display for StageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageType::VertexShader => f.write_str("vertex shader"),
      StageType::FragmentShader => f.write_str("fragment shader"),
    }
  }
}

/// Errors that shader stages can emit.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StageError {
  /// Occurs when a shader fails to compile. The log is the driver’s, untouched.
  CompilationFailed(StageType, String),
}

impl StageError {
  /// Occurs when a shader fails to compile.
  pub fn compilation_failed(ty: StageType, reason: impl Into<String>) -> Self {
    StageError::CompilationFailed(ty, reason.into())
  }
}

impl fmt::Display for StageError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageError::CompilationFailed(ref ty, ref r) => write!(f, "{} compilation error: {}", ty, r),
    }
  }
}

impl error::Error for StageError {}

/// Errors that a [`Program`] can generate.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProgramError {
  /// A shader stage failed to compile.
  Stage(StageError),
  /// Program link failed. The log is the driver’s, untouched.
  LinkFailed(String),
  /// A stage was handed in the wrong position.
  StageMismatch {
    /// Stage type the position expects.
    expected: StageType,
    /// Stage type that was given.
    found: StageType,
  },
}

impl ProgramError {
  /// Program link failed.
  pub fn link_failed(reason: impl Into<String>) -> Self {
    ProgramError::LinkFailed(reason.into())
  }
}

impl fmt::Display for ProgramError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ProgramError::Stage(ref e) => write!(f, "shader program has stage error: {}", e),
      ProgramError::LinkFailed(ref s) => write!(f, "shader program failed to link: {}", s),
      ProgramError::StageMismatch { expected, found } => {
        write!(f, "expected a {}, got a {}", expected, found)
      }
    }
  }
}

impl error::Error for ProgramError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      ProgramError::Stage(e) => Some(e),
      _ => None,
    }
  }
}

impl From<StageError> for ProgramError {
  fn from(e: StageError) -> Self {
    ProgramError::Stage(e)
  }
}

/// Type of a uniform, as reflected by the driver.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UniformType {
  /// 32-bit signed integer.
  Int,
  /// 32-bit unsigned integer.
  UInt,
  /// 32-bit floating-point number.
  Float,
  /// Boolean.
  Bool,
  /// 2D signed integral vector.
  IVec2,
  /// 3D signed integral vector.
  IVec3,
  /// 4D signed integral vector.
  IVec4,
  /// 2D floating-point vector.
  Vec2,
  /// 3D floating-point vector.
  Vec3,
  /// 4D floating-point vector.
  Vec4,
  /// 2D boolean vector.
  BVec2,
  /// 3D boolean vector.
  BVec3,
  /// 4D boolean vector.
  BVec4,
  /// 2×2 floating-point matrix.
  M22,
  /// 3×3 floating-point matrix.
  M33,
  /// 4×4 floating-point matrix.
  M44,
  /// 2D texture sampler.
  Sampler2D,
  /// Cubemap sampler.
  Cubemap,
  /// Any type this crate cannot upload to; carries the raw driver enum.
  Other(u32),
}

impl fmt::Display for UniformType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      UniformType::Int => f.write_str("int"),
      UniformType::UInt => f.write_str("uint"),
      UniformType::Float => f.write_str("float"),
      UniformType::Bool => f.write_str("bool"),
      UniformType::IVec2 => f.write_str("ivec2"),
      UniformType::IVec3 => f.write_str("ivec3"),
      UniformType::IVec4 => f.write_str("ivec4"),
      UniformType::Vec2 => f.write_str("vec2"),
      UniformType::Vec3 => f.write_str("vec3"),
      UniformType::Vec4 => f.write_str("vec4"),
      UniformType::BVec2 => f.write_str("bvec2"),
      UniformType::BVec3 => f.write_str("bvec3"),
      UniformType::BVec4 => f.write_str("bvec4"),
      UniformType::M22 => f.write_str("mat2"),
      UniformType::M33 => f.write_str("mat3"),
      UniformType::M44 => f.write_str("mat4"),
      UniformType::Sampler2D => f.write_str("sampler2D"),
      UniformType::Cubemap => f.write_str("samplerCube"),
      UniformType::Other(ty) => write!(f, "unknown type {:#x}", ty),
    }
  }
}

/// An active uniform, as listed by the driver after linking.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActiveUniform {
  /// Name, as reported (arrays come back as `name[0]`).
  pub name: String,
  /// Location to upload to. Uniforms living in blocks have no location and report `-1`.
  pub location: i32,
  /// Reflected type.
  pub ty: UniformType,
}

/// Location and type of a discovered uniform.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UniformEntry {
  /// Location to upload to.
  pub location: i32,
  /// Reflected type.
  pub ty: UniformType,
}

/// Name to location mapping of a program’s active uniforms.
///
/// Built once, at link time.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UniformTable {
  entries: HashMap<String, UniformEntry>,
}

impl UniformTable {
  /// Build a table out of the driver’s active uniform list.
  ///
  /// Array uniforms are registered under their bare name (`lights[0]` becomes `lights`); uniforms
  /// without a location are left out.
  pub fn from_active(uniforms: impl IntoIterator<Item = ActiveUniform>) -> Self {
    let entries = uniforms
      .into_iter()
      .filter(|u| u.location >= 0)
      .map(|u| {
        let name = u
          .name
          .strip_suffix("[0]")
          .map(str::to_owned)
          .unwrap_or(u.name);
        let entry = UniformEntry {
          location: u.location,
          ty: u.ty,
        };

        (name, entry)
      })
      .collect();

    UniformTable { entries }
  }

  /// Look a uniform up.
  pub fn get(&self, name: &str) -> Option<&UniformEntry> {
    self.entries.get(name)
  }

  /// Location of a uniform, if active.
  pub fn location(&self, name: &str) -> Option<i32> {
    self.get(name).map(|e| e.location)
  }

  /// Whether a uniform is active.
  pub fn contains(&self, name: &str) -> bool {
    self.entries.contains_key(name)
  }

  /// Number of active uniforms.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Whether no uniform is active.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Iterate over `(name, entry)` pairs, in no particular order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformEntry)> {
    self.entries.iter().map(|(name, e)| (name.as_str(), e))
  }
}

/// A compiled shader stage.
///
/// Dropping a stage releases it. Stages are consumed when linked into a [`Program`].
pub struct Stage<B>
where
  B: ?Sized + Shader,
{
  repr: B::StageRepr,
  ty: StageType,
}

impl<B> Stage<B>
where
  B: ?Sized + Shader,
{
  /// Compile a new stage from its source.
  ///
  /// Sources without a `#version` directive get the backend’s default one.
  pub fn new<C, R>(ctx: &mut C, ty: StageType, src: R) -> Result<Self, StageError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
    R: AsRef<str>,
  {
    unsafe {
      ctx
        .backend()
        .new_stage(ty, src.as_ref())
        .map(|repr| Stage { repr, ty })
    }
  }

  /// Type of this stage.
  pub fn ty(&self) -> StageType {
    self.ty
  }

  /// Release the stage now.
  pub fn destroy(self) {}
}

/// A linked shader program, with its uniform table.
///
/// Dropping a program releases it. Unbind it first if it is current.
pub struct Program<B>
where
  B: ?Sized + Shader,
{
  repr: B::ProgramRepr,
  uniforms: UniformTable,
}

impl<B> Program<B>
where
  B: ?Sized + Shader,
{
  /// Link a vertex and a fragment stage together.
  ///
  /// Both stages are consumed and released whether linking succeeds or not. On success, the
  /// uniform table is filled from the driver’s active uniform list.
  pub fn from_stages<C>(
    ctx: &mut C,
    vertex: Stage<B>,
    fragment: Stage<B>,
  ) -> Result<Self, ProgramError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
  {
    check_stage(&vertex, StageType::VertexShader)?;
    check_stage(&fragment, StageType::FragmentShader)?;

    let repr = unsafe { ctx.backend().new_program(&vertex.repr, &fragment.repr)? };

    // stages are not needed anymore once linked
    drop(vertex);
    drop(fragment);

    let uniforms = UniformTable::from_active(unsafe { B::active_uniforms(&repr) });
    for (name, entry) in uniforms.iter() {
      log::debug!(
        "active uniform {} ({}) at location {}",
        name,
        entry.ty,
        entry.location
      );
    }

    Ok(Program { repr, uniforms })
  }

  /// Compile both stages from their sources, then link them.
  pub fn from_strings<C>(ctx: &mut C, vertex: &str, fragment: &str) -> Result<Self, ProgramError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
  {
    let vertex = Stage::new(ctx, StageType::VertexShader, vertex)?;
    let fragment = Stage::new(ctx, StageType::FragmentShader, fragment)?;

    Self::from_stages(ctx, vertex, fragment)
  }

  /// Uniforms discovered at link time.
  pub fn uniforms(&self) -> &UniformTable {
    &self.uniforms
  }

  /// Make this program current.
  pub fn bind(&self) {
    unsafe { B::bind_program(&self.repr) }
  }

  /// Stop using this program, if it is current.
  pub fn unbind(&self) {
    unsafe { B::unbind_program(&self.repr) }
  }

  /// Upload a value to the uniform called `name`.
  ///
  /// Returns whether the value reached the driver; names missing from the uniform table are
  /// skipped.
  pub fn upload<T>(&mut self, name: &str, value: T) -> bool
  where
    B: Uniformable<T>,
  {
    match self.uniforms.location(name) {
      Some(location) => {
        unsafe { <B as Uniformable<T>>::update(&mut self.repr, location, value) };
        true
      }

      None => {
        log::trace!("skipping upload to inactive uniform {}", name);
        false
      }
    }
  }

  /// Release the program now.
  pub fn destroy(self) {}
}

fn check_stage<B>(stage: &Stage<B>, expected: StageType) -> Result<(), ProgramError>
where
  B: ?Sized + Shader,
{
  if stage.ty == expected {
    Ok(())
  } else {
    Err(ProgramError::StageMismatch {
      expected,
      found: stage.ty,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn active(name: &str, location: i32, ty: UniformType) -> ActiveUniform {
    ActiveUniform {
      name: name.to_owned(),
      location,
      ty,
    }
  }

  #[test]
  fn uniform_table_strips_array_suffix() {
    let table = UniformTable::from_active(vec![
      active("uView", 0, UniformType::M44),
      active("uOffsets[0]", 1, UniformType::Vec2),
    ]);

    assert_eq!(table.len(), 2);
    assert_eq!(table.location("uView"), Some(0));
    assert_eq!(table.location("uOffsets"), Some(1));
    assert!(!table.contains("uOffsets[0]"));
  }

  #[test]
  fn uniform_table_skips_block_members() {
    let table = UniformTable::from_active(vec![
      active("uTime", 3, UniformType::Float),
      active("Matrices.view", -1, UniformType::M44),
    ]);

    assert_eq!(table.len(), 1);
    assert_eq!(table.get("uTime").map(|e| e.ty), Some(UniformType::Float));
    assert_eq!(table.location("Matrices.view"), None);
  }

  #[test]
  fn empty_uniform_table() {
    let table = UniformTable::from_active(Vec::new());

    assert!(table.is_empty());
    assert_eq!(table.iter().count(), 0);
  }

  #[test]
  fn stage_error_display() {
    let e = StageError::compilation_failed(StageType::FragmentShader, "0:1: syntax error");
    assert_eq!(
      e.to_string(),
      "fragment shader compilation error: 0:1: syntax error"
    );

    let e = ProgramError::from(e);
    assert!(e.to_string().starts_with("shader program has stage error"));
  }
}
