use otome::{
  context::GraphicsContext,
  geometry::{Geometry, VertexLayout},
  shader::{types::Mat44, Program},
  texture::{FilterMode, Texture},
};

use super::{
  load_program, load_texture, release_program, upload_projection, upload_view, SceneEnv,
};
use crate::{
  error::SceneError,
  platform::{FrameTime, PlatformServices},
  shapes, SceneBackend,
};

const TEXTURES: [&str; 2] = ["textures/test_texture_02.png", "textures/awesomeface.png"];

/// A plane blending two textures, on units 0 and 1.
pub struct TexturedPlaneScene<B>
where
  B: ?Sized + SceneBackend,
{
  program: Program<B>,
  geometry: Geometry<B>,
  textures: [Texture<B>; 2],
}

impl<B> TexturedPlaneScene<B>
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
      "shaders/vertex/texture.glsl",
      "shaders/fragment/combined_texture.glsl",
    )?;

    let geometry = ctx
      .new_geometry()
      .set_vertices(&shapes::PLANE[..])
      .set_indices(&shapes::PLANE_INDICES[..])
      .set_layout(VertexLayout::interleaved(&[(0, 3), (1, 2)])?)
      .build()?;

    let textures = [
      load_texture(ctx, platform, TEXTURES[0], FilterMode::Linear)?,
      load_texture(ctx, platform, TEXTURES[1], FilterMode::Linear)?,
    ];

    upload_projection(&mut program, env.size);
    upload_view(&mut program, [0., 0., 2.], [0., 0., 0.]);
    program.upload("uTransform", Mat44::IDENTITY);
    program.upload("uTexture1", 0i32);
    program.upload("uTexture2", 1i32);

    Ok(TexturedPlaneScene {
      program,
      geometry,
      textures,
    })
  }

  pub(super) fn program_mut(&mut self) -> &mut Program<B> {
    &mut self.program
  }

  pub(super) fn update(&mut self, _: FrameTime) {}

  pub(super) fn draw(&mut self) {
    self.program.bind();

    for (unit, texture) in self.textures.iter().enumerate() {
      texture.bind(unit as u32);
    }

    self.geometry.draw();
  }

  pub(super) fn dispose(self) {
    self.geometry.destroy();

    for texture in self.textures {
      texture.unbind();
      texture.destroy();
    }

    release_program(self.program);
  }
}
