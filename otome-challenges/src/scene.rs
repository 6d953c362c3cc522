//! Scenes.
//!
//! A [`SceneKind`] names a scene without owning anything. [`Scene::initialize`] turns it into an
//! active [`Scene`] holding one program, its geometries and its textures; [`Scene::dispose`]
//! releases them (geometries first, then textures, then the program).

mod circle;
mod shape;
mod terrain;
mod textured_cubes;
mod textured_plane;

use std::{fmt, str::FromStr};

use image::DynamicImage;
use otome::{
  context::GraphicsContext,
  shader::Program,
  texture::{FilterMode, PixelFormat, Texture},
};

pub use self::{
  circle::CircleScene, shape::ShapeScene, terrain::TerrainScene,
  textured_cubes::TexturedCubesScene, textured_plane::TexturedPlaneScene,
};
use crate::{
  camera,
  error::SceneError,
  input::{InputState, Key},
  platform::{FrameTime, PlatformServices, WindowSize},
  SceneBackend,
};

/// Every scene, in index order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SceneKind {
  /// Two colored triangles.
  Triangles,
  /// An indexed colored square.
  Square,
  /// An indexed colored star.
  Star,
  /// The outline of a square, drawn with lines.
  Outline,
  /// A procedural circle in a fragment shader.
  Circle,
  /// A plane blending two textures.
  TexturedPlane,
  /// A field of textured cubes under an orbiting camera.
  TexturedCubes,
  /// A subdivided, animated terrain grid.
  Terrain,
}

impl SceneKind {
  /// Every kind, by index.
  pub const ALL: [SceneKind; 8] = [
    SceneKind::Triangles,
    SceneKind::Square,
    SceneKind::Star,
    SceneKind::Outline,
    SceneKind::Circle,
    SceneKind::TexturedPlane,
    SceneKind::TexturedCubes,
    SceneKind::Terrain,
  ];

  /// Kind at a 1-based index.
  pub fn from_index(index: usize) -> Option<Self> {
    index.checked_sub(1).and_then(|i| Self::ALL.get(i)).copied()
  }

  /// 1-based index.
  pub fn index(self) -> usize {
    self as usize + 1
  }

  /// Name, as accepted by [`FromStr`].
  pub fn name(self) -> &'static str {
    match self {
      SceneKind::Triangles => "triangles",
      SceneKind::Square => "square",
      SceneKind::Star => "star",
      SceneKind::Outline => "outline",
      SceneKind::Circle => "circle",
      SceneKind::TexturedPlane => "textured-plane",
      SceneKind::TexturedCubes => "textured-cubes",
      SceneKind::Terrain => "terrain",
    }
  }

  /// Number key switching to this kind.
  pub fn key(self) -> Key {
    Key::DIGITS[self as usize]
  }
}

impl fmt::Display for SceneKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Error returned when parsing an unknown scene name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownSceneName(pub String);

impl fmt::Display for UnknownSceneName {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "unknown scene: {}", self.0)?;
    f.write_str(" (expected one of")?;

    for kind in SceneKind::ALL {
      write!(f, " {}", kind)?;
    }

    f.write_str(", or an index)")
  }
}

impl std::error::Error for UnknownSceneName {}

impl FromStr for SceneKind {
  type Err = UnknownSceneName;

  /// Parse a scene name or a 1-based index.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();

    if let Ok(index) = s.parse::<usize>() {
      return Self::from_index(index).ok_or_else(|| UnknownSceneName(s.to_owned()));
    }

    let lower = s.to_ascii_lowercase().replace('_', "-");
    Self::ALL
      .iter()
      .copied()
      .find(|kind| kind.name() == lower)
      .ok_or_else(|| UnknownSceneName(s.to_owned()))
  }
}

/// Parameters shared by every scene initialization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEnv {
  /// Framebuffer size, for projections.
  pub size: WindowSize,
  /// Side of the textured cube field.
  pub cube_field: usize,
  /// Seed of texture choices in the cube field.
  pub seed: u64,
}

impl Default for SceneEnv {
  fn default() -> Self {
    SceneEnv {
      size: WindowSize::new(960, 540),
      cube_field: 10,
      seed: 0,
    }
  }
}

impl SceneEnv {
  /// Set the framebuffer size.
  pub fn set_size(self, size: WindowSize) -> Self {
    SceneEnv { size, ..self }
  }

  /// Set the side of the cube field.
  pub fn set_cube_field(self, cube_field: usize) -> Self {
    SceneEnv { cube_field, ..self }
  }

  /// Set the seed of texture choices.
  pub fn set_seed(self, seed: u64) -> Self {
    SceneEnv { seed, ..self }
  }
}

/// An active scene.
pub enum Scene<B>
where
  B: ?Sized + SceneBackend,
{
  /// [`SceneKind::Triangles`], [`SceneKind::Square`], [`SceneKind::Star`] and
  /// [`SceneKind::Outline`].
  Shape(ShapeScene<B>),
  /// [`SceneKind::Circle`].
  Circle(CircleScene<B>),
  /// [`SceneKind::TexturedPlane`].
  TexturedPlane(TexturedPlaneScene<B>),
  /// [`SceneKind::TexturedCubes`].
  TexturedCubes(TexturedCubesScene<B>),
  /// [`SceneKind::Terrain`].
  Terrain(TerrainScene<B>),
}

impl<B> Scene<B>
where
  B: ?Sized + SceneBackend,
{
  /// Allocate everything a scene of kind `kind` needs.
  ///
  /// On error, whatever was allocated before the failure is released before returning.
  pub fn initialize<C, P>(
    kind: SceneKind,
    ctx: &mut C,
    platform: &mut P,
    env: &SceneEnv,
  ) -> Result<Self, SceneError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
    P: ?Sized + PlatformServices,
  {
    let scene = match kind {
      SceneKind::Triangles | SceneKind::Square | SceneKind::Star | SceneKind::Outline => {
        Scene::Shape(ShapeScene::new(kind, ctx, platform, env)?)
      }
      SceneKind::Circle => Scene::Circle(CircleScene::new(ctx, platform, env)?),
      SceneKind::TexturedPlane => Scene::TexturedPlane(TexturedPlaneScene::new(ctx, platform, env)?),
      SceneKind::TexturedCubes => Scene::TexturedCubes(TexturedCubesScene::new(ctx, platform, env)?),
      SceneKind::Terrain => Scene::Terrain(TerrainScene::new(ctx, platform, env)?),
    };

    Ok(scene)
  }

  /// Kind of this scene.
  pub fn kind(&self) -> SceneKind {
    match self {
      Scene::Shape(s) => s.kind(),
      Scene::Circle(_) => SceneKind::Circle,
      Scene::TexturedPlane(_) => SceneKind::TexturedPlane,
      Scene::TexturedCubes(_) => SceneKind::TexturedCubes,
      Scene::Terrain(_) => SceneKind::Terrain,
    }
  }

  /// Advance the scene by one frame.
  ///
  /// Only the terrain allocates here (when its subdivision count changes).
  pub fn update<C>(
    &mut self,
    ctx: &mut C,
    input: &InputState,
    time: FrameTime,
  ) -> Result<(), SceneError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
  {
    match self {
      Scene::Shape(s) => s.update(input, time),
      Scene::Circle(s) => s.update(time),
      Scene::TexturedPlane(s) => s.update(time),
      Scene::TexturedCubes(s) => s.update(time),
      Scene::Terrain(s) => return s.update(ctx, input, time),
    }

    Ok(())
  }

  /// Issue the draw calls of the scene.
  pub fn draw(&mut self) {
    match self {
      Scene::Shape(s) => s.draw(),
      Scene::Circle(s) => s.draw(),
      Scene::TexturedPlane(s) => s.draw(),
      Scene::TexturedCubes(s) => s.draw(),
      Scene::Terrain(s) => s.draw(),
    }
  }

  /// Follow a framebuffer resize.
  pub fn resize(&mut self, size: WindowSize) {
    let program = match self {
      Scene::Shape(s) => s.program_mut(),
      Scene::Circle(s) => s.program_mut(),
      Scene::TexturedPlane(s) => s.program_mut(),
      Scene::TexturedCubes(s) => s.program_mut(),
      Scene::Terrain(s) => s.program_mut(),
    };

    upload_projection(program, size);
  }

  /// Release everything.
  pub fn dispose(self) {
    match self {
      Scene::Shape(s) => s.dispose(),
      Scene::Circle(s) => s.dispose(),
      Scene::TexturedPlane(s) => s.dispose(),
      Scene::TexturedCubes(s) => s.dispose(),
      Scene::Terrain(s) => s.dispose(),
    }
  }
}

// Compile and link the two stages found at `vs` and `fs`.
fn load_program<B, C, P>(
  ctx: &mut C,
  platform: &mut P,
  vs: &str,
  fs: &str,
) -> Result<Program<B>, SceneError>
where
  B: ?Sized + SceneBackend,
  C: ?Sized + GraphicsContext<Backend = B>,
  P: ?Sized + PlatformServices,
{
  let vs_src = platform.fetch_shader(vs)?;
  let fs_src = platform.fetch_shader(fs)?;

  let program = Program::from_strings(ctx, &vs_src, &fs_src)?;
  log::debug!(
    "linked {} + {} ({} active uniforms)",
    vs,
    fs,
    program.uniforms().len()
  );

  Ok(program)
}

// Fetch, flip and upload an image.
fn load_texture<B, C, P>(
  ctx: &mut C,
  platform: &mut P,
  path: &str,
  filter: FilterMode,
) -> Result<Texture<B>, SceneError>
where
  B: ?Sized + SceneBackend,
  C: ?Sized + GraphicsContext<Backend = B>,
  P: ?Sized + PlatformServices,
{
  let image = platform.fetch_image(path)?;
  let (size, format, texels) = texels(&image);
  let texture = Texture::new(ctx, size, format, filter, &texels)?;

  Ok(texture)
}

// Texel upload of an image: bottom row first, RGBA if the image has an alpha channel.
fn texels(image: &DynamicImage) -> ([u32; 2], PixelFormat, Vec<u8>) {
  let flipped = image.flipv();

  if flipped.color().has_alpha() {
    let rgba = flipped.to_rgba8();
    let (w, h) = rgba.dimensions();
    ([w, h], PixelFormat::RGBA, rgba.into_raw())
  } else {
    let rgb = flipped.to_rgb8();
    let (w, h) = rgb.dimensions();
    ([w, h], PixelFormat::RGB, rgb.into_raw())
  }
}

fn upload_projection<B>(program: &mut Program<B>, size: WindowSize)
where
  B: ?Sized + SceneBackend,
{
  program.bind();
  program.upload("uProjection", camera::to_mat44(camera::projection(size)));
}

fn upload_view<B>(program: &mut Program<B>, eye: [f32; 3], target: [f32; 3])
where
  B: ?Sized + SceneBackend,
{
  program.upload("uView", camera::to_mat44(camera::look_at(eye, target)));
}

// Drop a program after making sure it is not current anymore.
fn release_program<B>(program: Program<B>)
where
  B: ?Sized + SceneBackend,
{
  program.unbind();
  program.destroy();
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage, Rgba, RgbaImage};

  #[test]
  fn indices_round_trip() {
    for (i, kind) in SceneKind::ALL.iter().enumerate() {
      assert_eq!(kind.index(), i + 1);
      assert_eq!(SceneKind::from_index(i + 1), Some(*kind));
      assert_eq!(kind.key(), Key::digit(i + 1).unwrap());
    }

    assert_eq!(SceneKind::from_index(0), None);
    assert_eq!(SceneKind::from_index(9), None);
  }

  #[test]
  fn parse_names_and_indices() {
    assert_eq!("square".parse::<SceneKind>(), Ok(SceneKind::Square));
    assert_eq!("Textured_Cubes".parse::<SceneKind>(), Ok(SceneKind::TexturedCubes));
    assert_eq!("8".parse::<SceneKind>(), Ok(SceneKind::Terrain));
    assert!("9".parse::<SceneKind>().is_err());
    assert!("teapot".parse::<SceneKind>().is_err());

    for kind in SceneKind::ALL {
      assert_eq!(kind.to_string().parse::<SceneKind>(), Ok(kind));
    }
  }

  #[test]
  fn texels_are_flipped() {
    let mut img = RgbImage::new(1, 2);
    img.put_pixel(0, 0, Rgb([255, 0, 0]));
    img.put_pixel(0, 1, Rgb([0, 0, 255]));

    let (size, format, texels) = texels(&DynamicImage::ImageRgb8(img));

    assert_eq!(size, [1, 2]);
    assert_eq!(format, PixelFormat::RGB);
    assert_eq!(texels, [0, 0, 255, 255, 0, 0]);
  }

  #[test]
  fn alpha_images_upload_as_rgba() {
    let img = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4]));
    let (size, format, texels) = texels(&DynamicImage::ImageRgba8(img));

    assert_eq!(size, [2, 2]);
    assert_eq!(format, PixelFormat::RGBA);
    assert_eq!(texels.len(), 16);
  }
}
