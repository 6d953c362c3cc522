//! Shader backend interface.

use crate::shader::{ActiveUniform, ProgramError, StageError, StageType, UniformType};

/// Shader stage and program creation.
pub unsafe trait Shader {
  /// Backend representation of a compiled stage.
  type StageRepr;

  /// Backend representation of a linked program.
  type ProgramRepr;

  /// Compile a stage. On failure the driver handle must already be released and the error must
  /// carry the driver log verbatim.
  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError>;

  /// Attach both stages to a new program and link it.
  ///
  /// On success, both stages are detached again. On failure, the program handle is released before
  /// returning.
  unsafe fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError>;

  /// Every uniform the driver reports active for a linked program.
  unsafe fn active_uniforms(program: &Self::ProgramRepr) -> Vec<ActiveUniform>;

  /// Make the program current.
  unsafe fn bind_program(program: &Self::ProgramRepr);

  /// Clear the current program if `program` is the current one.
  unsafe fn unbind_program(program: &Self::ProgramRepr);
}

/// Values that can be sent to a uniform location.
pub unsafe trait Uniformable<T>: Shader {
  /// Reflected type the value maps to.
  const TY: UniformType;

  /// Upload `value` at `location` of `program`.
  ///
  /// `location` comes from the program’s uniform table and is never negative.
  unsafe fn update(program: &mut Self::ProgramRepr, location: i32, value: T);
}
