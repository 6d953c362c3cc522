//! What scenes need from the platform running them.

use image::DynamicImage;

use crate::error::FetchError;

/// Asset access.
///
/// Paths are logical: `shaders/vertex/colored.glsl`, `textures/awesomeface.png` and so on. How
/// they map to files (or to anything else) is up to the implementor.
pub trait PlatformServices {
  /// Source text of a shader stage.
  fn fetch_shader(&mut self, path: &str) -> Result<String, FetchError>;

  /// A decoded image.
  fn fetch_image(&mut self, path: &str) -> Result<DynamicImage, FetchError>;
}

impl<P> PlatformServices for &mut P
where
  P: ?Sized + PlatformServices,
{
  fn fetch_shader(&mut self, path: &str) -> Result<String, FetchError> {
    (**self).fetch_shader(path)
  }

  fn fetch_image(&mut self, path: &str) -> Result<DynamicImage, FetchError> {
    (**self).fetch_image(path)
  }
}

/// Framebuffer size, in pixels.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct WindowSize {
  /// Width.
  pub width: u32,
  /// Height.
  pub height: u32,
}

impl WindowSize {
  /// A new size.
  pub const fn new(width: u32, height: u32) -> Self {
    WindowSize { width, height }
  }

  /// Width over height; minimized windows (zero height) count as square.
  pub fn aspect_ratio(self) -> f32 {
    if self.width == 0 || self.height == 0 {
      1.
    } else {
      self.width as f32 / self.height as f32
    }
  }

  /// As `[width, height]`.
  pub fn to_array(self) -> [u32; 2] {
    [self.width, self.height]
  }
}

impl From<[u32; 2]> for WindowSize {
  fn from([width, height]: [u32; 2]) -> Self {
    WindowSize { width, height }
  }
}

/// Frame timing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
  /// Seconds since the previous frame.
  pub delta: f32,
  /// Seconds since the start.
  pub elapsed: f32,
}

impl FrameTime {
  /// Timing of a frame.
  pub const fn new(delta: f32, elapsed: f32) -> Self {
    FrameTime { delta, elapsed }
  }

  /// The frame after this one, `delta` seconds later.
  pub fn advance(self, delta: f32) -> Self {
    FrameTime {
      delta,
      elapsed: self.elapsed + delta,
    }
  }
}
