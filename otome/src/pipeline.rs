//! Frame state.
//!
//! What gets cleared and how the default framebuffer is set up before a scene draws, see
//! [`GraphicsContext::start_frame`](crate::context::GraphicsContext::start_frame).

/// The viewport being part of the [`PipelineState`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Viewport {
  /// The whole framebuffer is used.
  Whole,
  /// The viewport is specific and the rectangle area is user-defined.
  Specific {
    /// The lower position on the X axis to start the viewport rectangle at.
    x: u32,
    /// The lower position on the Y axis to start the viewport rectangle at.
    y: u32,
    /// The width of the viewport.
    width: u32,
    /// The height of the viewport.
    height: u32,
  },
}

impl Viewport {
  /// Rectangle `[x, y, width, height]` covered in a framebuffer of size `size`.
  pub fn rect(self, size: [u32; 2]) -> [u32; 4] {
    match self {
      Viewport::Whole => [0, 0, size[0], size[1]],
      Viewport::Specific {
        x,
        y,
        width,
        height,
      } => [x, y, width, height],
    }
  }
}

/// Per-frame render state.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineState {
  /// Color to clear the color buffer with; `None` leaves it untouched.
  pub clear_color: Option<[f32; 4]>,

  /// Depth to clear the depth buffer with; `None` leaves it untouched.
  pub clear_depth: Option<f32>,

  /// Whether depth testing is performed.
  pub depth_test: bool,

  /// Viewport to render in.
  pub viewport: Viewport,
}

impl Default for PipelineState {
  /// Default [`PipelineState`]:
  ///
  /// - Clear color is `Some([0.3, 0.4, 0.5, 1.])`.
  /// - Depth value is `Some(1.)`.
  /// - Depth test is on.
  /// - The viewport uses the whole framebuffer.
  fn default() -> Self {
    PipelineState {
      clear_color: Some([0.3, 0.4, 0.5, 1.]),
      clear_depth: Some(1.),
      depth_test: true,
      viewport: Viewport::Whole,
    }
  }
}

impl PipelineState {
  /// Create a default [`PipelineState`].
  pub fn new() -> Self {
    Self::default()
  }

  /// Set the clear color.
  pub fn set_clear_color(self, clear_color: impl Into<Option<[f32; 4]>>) -> Self {
    Self {
      clear_color: clear_color.into(),
      ..self
    }
  }

  /// Set the clear depth.
  pub fn set_clear_depth(self, clear_depth: impl Into<Option<f32>>) -> Self {
    Self {
      clear_depth: clear_depth.into(),
      ..self
    }
  }

  /// Enable or disable depth testing.
  pub fn enable_depth_test(self, depth_test: bool) -> Self {
    Self { depth_test, ..self }
  }

  /// Set the viewport.
  pub fn set_viewport(self, viewport: Viewport) -> Self {
    Self { viewport, ..self }
  }
}
