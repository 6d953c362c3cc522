use cgmath::{Matrix4, Vector3};
use otome::{
  context::GraphicsContext,
  geometry::{AttributeDescriptor, Geometry, Mode, VertexLayout},
  shader::Program,
};

use super::{load_program, release_program, upload_projection, upload_view, SceneEnv, SceneKind};
use crate::{
  camera,
  error::SceneError,
  input::{InputState, Key},
  platform::{FrameTime, PlatformServices},
  shapes, SceneBackend,
};

/// Units per second.
pub const MOVE_SPEED: f32 = 10.;

/// Bound of the position on both axes.
pub const MOVE_BOUND: f32 = 10.;

const EYE: [f32; 3] = [0., 0., 10.];

/// A colored shape moved around with WASD.
pub struct ShapeScene<B>
where
  B: ?Sized + SceneBackend,
{
  kind: SceneKind,
  program: Program<B>,
  geometry: Geometry<B>,
  position: [f32; 2],
}

impl<B> ShapeScene<B>
where
  B: ?Sized + SceneBackend,
{
  pub(super) fn new<C, P>(
    kind: SceneKind,
    ctx: &mut C,
    platform: &mut P,
    env: &SceneEnv,
  ) -> Result<Self, SceneError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
    P: ?Sized + PlatformServices,
  {
    let mut program = load_program(
      ctx,
      platform,
      "shaders/vertex/colored.glsl",
      "shaders/fragment/colored.glsl",
    )?;

    let colored = VertexLayout::interleaved(&[(0, 4), (1, 3)])?;

    let builder = ctx.new_geometry();
    let builder = match kind {
      SceneKind::Triangles => builder.set_vertices(&shapes::TRIANGLES[..]).set_layout(colored),
      SceneKind::Square => builder
        .set_vertices(&shapes::SQUARE[..])
        .set_indices(&shapes::SQUARE_INDICES[..])
        .set_layout(colored),
      SceneKind::Star => builder
        .set_vertices(&shapes::STAR[..])
        .set_indices(&shapes::STAR_INDICES[..])
        .set_layout(colored),
      _ => {
        // explicit offsets, checked against the stride
        let layout = VertexLayout::with_stride(
          shapes::COLORED_FLOATS * 4,
          vec![
            AttributeDescriptor::new(0, 4, 0),
            AttributeDescriptor::new(1, 3, 4 * 4),
          ],
        )?;

        builder
          .set_vertices(&shapes::OUTLINE[..])
          .set_indices(&shapes::OUTLINE_INDICES[..])
          .set_layout(layout)
          .set_mode(Mode::Line)
      }
    };
    let geometry = builder.build()?;

    upload_projection(&mut program, env.size);
    upload_view(&mut program, EYE, [0., 0., 0.]);

    let mut scene = ShapeScene {
      kind,
      program,
      geometry,
      position: [0., 0.],
    };
    scene.upload_transform();

    Ok(scene)
  }

  pub(super) fn kind(&self) -> SceneKind {
    self.kind
  }

  /// Position of the shape on the XY plane.
  pub fn position(&self) -> [f32; 2] {
    self.position
  }

  pub(super) fn program_mut(&mut self) -> &mut Program<B> {
    &mut self.program
  }

  pub(super) fn update(&mut self, input: &InputState, time: FrameTime) {
    self.position = step(self.position, input, time.delta);
    self.upload_transform();
  }

  pub(super) fn draw(&mut self) {
    self.program.bind();
    self.geometry.draw();
  }

  pub(super) fn dispose(self) {
    self.geometry.destroy();
    release_program(self.program);
  }

  fn upload_transform(&mut self) {
    let [x, y] = self.position;
    let transform = Matrix4::from_translation(Vector3::new(x, y, 0.));
    self.program.upload("uTransform", camera::to_mat44(transform));
  }
}

// W and S move along Y (W wins when both are held), A and D along X.
fn step([mut x, mut y]: [f32; 2], input: &InputState, delta: f32) -> [f32; 2] {
  let d = MOVE_SPEED * delta;

  if input.is_key_pressed(Key::W) {
    y += d;
  } else if input.is_key_pressed(Key::S) {
    y -= d;
  }

  if input.is_key_pressed(Key::D) {
    x += d;
  }

  if input.is_key_pressed(Key::A) {
    x -= d;
  }

  [
    x.clamp(-MOVE_BOUND, MOVE_BOUND),
    y.clamp(-MOVE_BOUND, MOVE_BOUND),
  ]
}
