use cgmath::{Matrix4, Rad, Vector3};
use otome::{
  context::GraphicsContext,
  geometry::{Geometry, VertexLayout},
  shader::Program,
  texture::{FilterMode, Texture},
};
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{
  load_program, load_texture, release_program, upload_projection, upload_view, SceneEnv,
};
use crate::{
  camera,
  error::SceneError,
  platform::{FrameTime, PlatformServices},
  shapes, SceneBackend,
};

const TEXTURES: [&str; 3] = [
  "textures/test_texture_03.png",
  "textures/test_texture_02.png",
  "textures/test_texture_04.png",
];

const ORBIT_RADIUS: f32 = 10.;
const ORBIT_HEIGHT: f32 = 4.;

/// A square field of textured cubes.
///
/// One geometry and one program serve every cube; each cube picks one of three shared textures.
pub struct TexturedCubesScene<B>
where
  B: ?Sized + SceneBackend,
{
  program: Program<B>,
  geometry: Geometry<B>,
  textures: Vec<Texture<B>>,
  cubes: Vec<Cube>,
}

/// Placement and texture of a cube.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cube {
  /// Center.
  pub position: [f32; 3],
  /// Index in the texture pool.
  pub texture: usize,
}

impl<B> TexturedCubesScene<B>
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
      "shaders/fragment/texture.glsl",
    )?;

    let geometry = ctx
      .new_geometry()
      .set_vertices(shapes::cube())
      .set_layout(VertexLayout::interleaved(&[(0, 3), (1, 2)])?)
      .build()?;

    let mut textures = Vec::with_capacity(TEXTURES.len());
    for path in TEXTURES {
      textures.push(load_texture(ctx, platform, path, FilterMode::Nearest)?);
    }

    upload_projection(&mut program, env.size);
    program.upload("uTexture", 0i32);

    let cubes = field(env.cube_field, textures.len(), env.seed);
    log::debug!("cube field: {} cubes, seed {}", cubes.len(), env.seed);

    let mut scene = TexturedCubesScene {
      program,
      geometry,
      textures,
      cubes,
    };
    scene.update(FrameTime::default());

    Ok(scene)
  }

  /// Cubes of the field.
  pub fn cubes(&self) -> &[Cube] {
    &self.cubes
  }

  pub(super) fn program_mut(&mut self) -> &mut Program<B> {
    &mut self.program
  }

  pub(super) fn update(&mut self, time: FrameTime) {
    let eye = camera::orbit(Rad(time.elapsed), ORBIT_RADIUS, ORBIT_HEIGHT);
    upload_view(&mut self.program, eye, [0., 0., 0.]);
  }

  pub(super) fn draw(&mut self) {
    self.program.bind();

    for cube in &self.cubes {
      let [x, y, z] = cube.position;
      let transform = Matrix4::from_translation(Vector3::new(x, y, z));
      self
        .program
        .upload("uTransform", camera::to_mat44(transform));

      if let Some(texture) = self.textures.get(cube.texture) {
        texture.bind(0);
      }

      self.geometry.draw();
    }
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

/// An `amount`×`amount` field centered on the origin, with textures picked by a PRNG seeded with
/// `seed`.
pub fn field(amount: usize, pool: usize, seed: u64) -> Vec<Cube> {
  let mut rng = StdRng::seed_from_u64(seed);
  let offset = amount as f32 / 2.;
  let mut cubes = Vec::with_capacity(amount * amount);

  for z in 0..amount {
    for x in 0..amount {
      cubes.push(Cube {
        position: [x as f32 - offset, 0., z as f32 - offset],
        texture: if pool == 0 { 0 } else { rng.gen_range(0..pool) },
      });
    }
  }

  cubes
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn field_is_centered() {
    let cubes = field(10, 3, 0);
    assert_eq!(cubes.len(), 100);
    assert_eq!(cubes[0].position, [-5., 0., -5.]);
    assert_eq!(cubes[99].position, [4., 0., 4.]);
  }

  #[test]
  fn textures_come_from_the_pool() {
    assert!(field(8, 3, 42).iter().all(|c| c.texture < 3));
  }

  #[test]
  fn same_seed_same_field() {
    assert_eq!(field(6, 3, 7), field(6, 3, 7));
  }

  #[test]
  fn empty_field() {
    assert!(field(0, 3, 0).is_empty());
  }
}
