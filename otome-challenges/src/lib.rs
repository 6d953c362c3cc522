//! Scenes ("challenges") for the otome harness, and the host switching between them.
//!
//! A frame driver owns a [`GraphicsContext`], an implementation of [`PlatformServices`] and an
//! [`InputState`] it keeps up to date. Each frame it hands them to [`SceneHost::frame`], which
//! switches scenes on number keys (debounced), clears the framebuffer, then updates and draws the
//! active scene:
//!
//! ```ignore
//! let mut host = SceneHost::new(SceneEnv::default(), HostConfig::default());
//! host.switch_to(SceneKind::Square, &mut ctx, &mut platform)?;
//!
//! loop {
//!   // … poll events into `input` …
//!   host.frame(&mut ctx, &mut platform, &input, time)?;
//!   // … swap buffers …
//! }
//! ```
//!
//! Scenes are generic over the backend, so the same code runs on OpenGL and on the headless
//! backend of the `otome` crate.
//!
//! [`GraphicsContext`]: otome::context::GraphicsContext
//! [`PlatformServices`]: crate::platform::PlatformServices
//! [`InputState`]: crate::input::InputState
//! [`SceneHost::frame`]: crate::host::SceneHost::frame

pub mod camera;
pub mod cooldown;
pub mod error;
pub mod host;
pub mod input;
pub mod platform;
pub mod scene;
pub mod shaders;
pub mod shapes;
pub mod terrain;

use otome::{
  backend::{shader::Uniformable, Backend},
  shader::types::{Mat44, Vec2},
};

pub use crate::{
  error::{FetchError, SceneError},
  host::{HostConfig, SceneHost},
  input::{InputState, Key, MouseButton},
  platform::{FrameTime, PlatformServices, WindowSize},
  scene::{Scene, SceneEnv, SceneKind},
};

/// Backends able to run every scene: the uniform types scenes upload must be supported.
pub trait SceneBackend:
  Backend + Uniformable<f32> + Uniformable<i32> + Uniformable<Vec2<f32>> + Uniformable<Mat44<f32>>
{
}

impl<B> SceneBackend for B where
  B: ?Sized
    + Backend
    + Uniformable<f32>
    + Uniformable<i32>
    + Uniformable<Vec2<f32>>
    + Uniformable<Mat44<f32>>
{
}
