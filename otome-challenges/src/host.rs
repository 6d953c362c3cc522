//! Scene switching and frame driving.

use otome::{context::GraphicsContext, pipeline::PipelineState};

use crate::{
  cooldown::Cooldown,
  error::SceneError,
  input::InputState,
  platform::{FrameTime, PlatformServices, WindowSize},
  scene::{Scene, SceneEnv, SceneKind},
  SceneBackend,
};

/// Seconds between two honoured switch requests.
pub const DEFAULT_SWITCH_COOLDOWN: f32 = 0.4;

/// [`SceneHost`] configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct HostConfig {
  /// Seconds between two honoured [`SceneHost::request_switch`] calls.
  pub switch_cooldown: f32,
  /// State the framebuffer is prepared with before each frame.
  pub pipeline: PipelineState,
}

impl Default for HostConfig {
  fn default() -> Self {
    HostConfig {
      switch_cooldown: DEFAULT_SWITCH_COOLDOWN,
      pipeline: PipelineState::default(),
    }
  }
}

impl HostConfig {
  /// Default configuration.
  pub fn new() -> Self {
    Self::default()
  }

  /// Set the switch cooldown.
  pub fn set_switch_cooldown(self, switch_cooldown: f32) -> Self {
    HostConfig {
      switch_cooldown,
      ..self
    }
  }

  /// Set the frame pipeline state.
  pub fn set_pipeline(self, pipeline: PipelineState) -> Self {
    HostConfig { pipeline, ..self }
  }
}

/// Owner of the active scene.
///
/// At most one scene is active. Switching disposes the active scene before the next one starts
/// allocating; if that initialization fails, no scene is active until the next successful switch.
pub struct SceneHost<B>
where
  B: ?Sized + SceneBackend,
{
  env: SceneEnv,
  pipeline: PipelineState,
  switch_cooldown: Cooldown,
  current: Option<Scene<B>>,
}

impl<B> SceneHost<B>
where
  B: ?Sized + SceneBackend,
{
  /// A host with no active scene.
  pub fn new(env: SceneEnv, config: HostConfig) -> Self {
    SceneHost {
      env,
      pipeline: config.pipeline,
      switch_cooldown: Cooldown::new(config.switch_cooldown),
      current: None,
    }
  }

  /// Environment handed to scene initializations.
  pub fn env(&self) -> &SceneEnv {
    &self.env
  }

  /// Kind of the active scene.
  pub fn current_kind(&self) -> Option<SceneKind> {
    self.current.as_ref().map(Scene::kind)
  }

  /// Whether a scene is active.
  pub fn is_active(&self) -> bool {
    self.current.is_some()
  }

  /// Active scene.
  pub fn scene(&self) -> Option<&Scene<B>> {
    self.current.as_ref()
  }

  /// Active scene, mutably.
  pub fn scene_mut(&mut self) -> Option<&mut Scene<B>> {
    self.current.as_mut()
  }

  /// Dispose the active scene, then initialize one of kind `kind`.
  ///
  /// Switching to the active kind re-initializes it.
  pub fn switch_to<C, P>(
    &mut self,
    kind: SceneKind,
    ctx: &mut C,
    platform: &mut P,
  ) -> Result<(), SceneError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
    P: ?Sized + PlatformServices,
  {
    if let Some(scene) = self.current.take() {
      log::debug!("disposing scene {}", scene.kind());
      scene.dispose();
    }

    match Scene::initialize(kind, ctx, platform, &self.env) {
      Ok(scene) => {
        log::info!("switched to scene {} ({})", kind.index(), kind);
        self.current = Some(scene);
        Ok(())
      }

      Err(e) => {
        log::error!("cannot initialize scene {}: {}", kind, e);
        Err(e)
      }
    }
  }

  /// [`SceneHost::switch_to`] the scene at the 1-based `index`.
  pub fn switch_to_index<C, P>(
    &mut self,
    index: usize,
    ctx: &mut C,
    platform: &mut P,
  ) -> Result<(), SceneError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
    P: ?Sized + PlatformServices,
  {
    match SceneKind::from_index(index) {
      Some(kind) => self.switch_to(kind, ctx, platform),

      None => {
        log::warn!("ignoring switch to unknown scene {}", index);
        Err(SceneError::UnknownScene(index))
      }
    }
  }

  /// Debounced [`SceneHost::switch_to`].
  ///
  /// Returns `Ok(false)` without doing anything if the previous honoured request is more recent
  /// than the switch cooldown.
  pub fn request_switch<C, P>(
    &mut self,
    kind: SceneKind,
    ctx: &mut C,
    platform: &mut P,
  ) -> Result<bool, SceneError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
    P: ?Sized + PlatformServices,
  {
    if !self.switch_cooldown.trigger() {
      log::trace!("switch to {} debounced", kind);
      return Ok(false);
    }

    self.switch_to(kind, ctx, platform).map(|_| true)
  }

  /// Follow a framebuffer resize.
  pub fn resize(&mut self, size: WindowSize) {
    self.env.size = size;

    if let Some(ref mut scene) = self.current {
      scene.resize(size);
    }
  }

  /// Run one frame.
  ///
  /// Ticks the switch cooldown, honours a held number key, prepares the framebuffer, then updates
  /// and draws the active scene. A failed switch is returned after the framebuffer has been
  /// cleared, so that the frame still presents something.
  pub fn frame<C, P>(
    &mut self,
    ctx: &mut C,
    platform: &mut P,
    input: &InputState,
    time: FrameTime,
  ) -> Result<(), SceneError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
    P: ?Sized + PlatformServices,
  {
    self.switch_cooldown.tick(time.delta);

    let requested = SceneKind::ALL
      .iter()
      .copied()
      .find(|kind| input.is_key_pressed(kind.key()));

    let switched = match requested {
      Some(kind) => self.request_switch(kind, ctx, platform).map(|_| ()),
      None => Ok(()),
    };

    ctx.start_frame(self.env.size.to_array(), &self.pipeline);

    if let Some(ref mut scene) = self.current {
      scene.update(ctx, input, time)?;
      scene.draw();
    }

    switched
  }

  /// Dispose the active scene, if any.
  pub fn dispose(&mut self) {
    if let Some(scene) = self.current.take() {
      log::debug!("disposing scene {}", scene.kind());
      scene.dispose();
    }
  }
}

impl<B> Drop for SceneHost<B>
where
  B: ?Sized + SceneBackend,
{
  fn drop(&mut self) {
    self.dispose();
  }
}
