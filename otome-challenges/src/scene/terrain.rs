use cgmath::Deg;
use otome::{
  context::GraphicsContext,
  geometry::{Geometry, VertexLayout},
  shader::Program,
};

use super::{load_program, release_program, upload_projection, upload_view, SceneEnv};
use crate::{
  camera,
  cooldown::Cooldown,
  error::SceneError,
  input::{InputState, Key},
  platform::{FrameTime, PlatformServices},
  terrain, SceneBackend,
};

/// Subdivisions of a fresh terrain.
pub const DEFAULT_SUBDIVISIONS: u32 = 10;

/// Upper bound on subdivisions.
pub const MAX_SUBDIVISIONS: u32 = 512;

/// Seconds between two subdivision changes.
pub const SUBDIVISION_COOLDOWN: f32 = 0.4;

/// Camera speed, in degrees per second.
const ORBIT_SPEED: f32 = 30.;
const ORBIT_RADIUS: f32 = terrain::SIZE;
const ORBIT_HEIGHT: f32 = 10.;
const TARGET: [f32; 3] = [0., 0., 2.];

/// An animated grid whose subdivision count follows the arrow keys.
pub struct TerrainScene<B>
where
  B: ?Sized + SceneBackend,
{
  program: Program<B>,
  // empty only when a rebuild failed
  geometry: Option<Geometry<B>>,
  subdivisions: u32,
  rotation: Deg<f32>,
  cooldown: Cooldown,
}

impl<B> TerrainScene<B>
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
      "shaders/vertex/terrain.glsl",
      "shaders/fragment/terrain.glsl",
    )?;

    let geometry = build_grid(ctx, DEFAULT_SUBDIVISIONS)?;

    upload_projection(&mut program, env.size);

    let mut scene = TerrainScene {
      program,
      geometry: Some(geometry),
      subdivisions: DEFAULT_SUBDIVISIONS,
      rotation: Deg(0.),
      cooldown: Cooldown::new(SUBDIVISION_COOLDOWN),
    };
    scene.upload_camera();

    Ok(scene)
  }

  /// Current subdivision count.
  pub fn subdivisions(&self) -> u32 {
    self.subdivisions
  }

  /// Replace the grid with one of `subdivisions` cells per side; the program is kept.
  ///
  /// The old grid is released before the new one is allocated. If allocation fails, nothing is
  /// drawn until the next successful rebuild.
  pub fn rebuild<C>(&mut self, ctx: &mut C, subdivisions: u32) -> Result<(), SceneError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
  {
    let subdivisions = subdivisions.clamp(1, MAX_SUBDIVISIONS);

    if let Some(old) = self.geometry.take() {
      old.destroy();
    }

    self.geometry = Some(build_grid(ctx, subdivisions)?);
    self.subdivisions = subdivisions;
    log::info!("terrain subdivisions: {}", subdivisions);

    Ok(())
  }

  pub(super) fn program_mut(&mut self) -> &mut Program<B> {
    &mut self.program
  }

  pub(super) fn update<C>(
    &mut self,
    ctx: &mut C,
    input: &InputState,
    time: FrameTime,
  ) -> Result<(), SceneError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
  {
    self.cooldown.tick(time.delta);
    self.rotation += Deg(ORBIT_SPEED * time.delta);
    self.upload_camera();
    self.program.upload("uTime", time.elapsed);

    let wanted = if input.is_key_pressed(Key::Right) {
      Some(self.subdivisions.saturating_sub(1))
    } else if input.is_key_pressed(Key::Left) {
      Some(self.subdivisions + 1)
    } else {
      None
    };

    match wanted {
      Some(n) if (1..=MAX_SUBDIVISIONS).contains(&n) && self.cooldown.trigger() => {
        self.rebuild(ctx, n)
      }
      _ => Ok(()),
    }
  }

  pub(super) fn draw(&mut self) {
    if let Some(ref geometry) = self.geometry {
      self.program.bind();
      geometry.draw();
    }
  }

  pub(super) fn dispose(self) {
    if let Some(geometry) = self.geometry {
      geometry.destroy();
    }

    release_program(self.program);
  }

  fn upload_camera(&mut self) {
    let eye = camera::orbit(self.rotation, ORBIT_RADIUS, ORBIT_HEIGHT);
    upload_view(&mut self.program, eye, TARGET);
  }
}

fn build_grid<B, C>(ctx: &mut C, subdivisions: u32) -> Result<Geometry<B>, SceneError>
where
  B: ?Sized + SceneBackend,
  C: ?Sized + GraphicsContext<Backend = B>,
{
  let grid = terrain::grid(subdivisions);
  let geometry = ctx
    .new_geometry()
    .set_vertices(grid.vertices)
    .set_indices(grid.indices)
    .set_layout(VertexLayout::interleaved(&[(0, 3)])?)
    .build()?;

  Ok(geometry)
}
