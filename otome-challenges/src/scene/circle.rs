use otome::{
  context::GraphicsContext,
  geometry::{Geometry, VertexLayout},
  shader::{types::Mat44, types::Vec2, Program},
};

use super::{load_program, release_program, upload_projection, upload_view, SceneEnv};
use crate::{
  error::SceneError,
  platform::{FrameTime, PlatformServices},
  shapes, SceneBackend,
};

/// A procedural circle, animated over time.
pub struct CircleScene<B>
where
  B: ?Sized + SceneBackend,
{
  program: Program<B>,
  geometry: Geometry<B>,
}

impl<B> CircleScene<B>
where
  B: ?Sized + SceneBackend,
{
  pub(super) fn new<C, P>(ctx: &mut C, platform: &mut P, env: &SceneEnv) -> Result<Self, SceneError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
    P: ?Sized + PlatformServices,
  {
    let mut program = load_program(
      ctx,
      platform,
      "shaders/vertex/base.glsl",
      "shaders/fragment/circle.glsl",
    )?;

    let geometry = ctx
      .new_geometry()
      .set_vertices(&shapes::UNIT_SQUARE[..])
      .set_indices(&shapes::UNIT_SQUARE_INDICES[..])
      .set_layout(VertexLayout::interleaved(&[(0, 3)])?)
      .build()?;

    upload_projection(&mut program, env.size);
    upload_view(&mut program, [0., 0., 2.], [0., 0., 0.]);
    program.upload("uTransform", Mat44::IDENTITY);
    // the quad is sampled in its own [0, 1] space
    program.upload("uResolution", Vec2::new(1., 1.));

    Ok(CircleScene { program, geometry })
  }

  pub(super) fn program_mut(&mut self) -> &mut Program<B> {
    &mut self.program
  }

  pub(super) fn update(&mut self, time: FrameTime) {
    self.program.upload("uTime", time.elapsed);
  }

  pub(super) fn draw(&mut self) {
    self.program.bind();
    self.geometry.draw();
  }

  pub(super) fn dispose(self) {
    self.geometry.destroy();
    release_program(self.program);
  }
}
