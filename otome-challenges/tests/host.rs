use std::collections::HashMap;

use image::{DynamicImage, RgbImage, RgbaImage};
use otome::geometry::Mode;
use otome::headless::{Call, Headless, LiveObjects};
use otome::shader::ProgramError;
use otome_challenges::{
  shaders, FetchError, FrameTime, HostConfig, InputState, Key, PlatformServices, Scene,
  SceneEnv, SceneError, SceneHost, SceneKind, WindowSize,
};

/// Built-in shaders and tiny generated images; any path can be overridden or hidden.
#[derive(Default)]
struct FakePlatform {
  shader_overrides: HashMap<String, String>,
  missing: Vec<String>,
}

impl FakePlatform {
  fn without(mut self, path: &str) -> Self {
    self.missing.push(path.to_owned());
    self
  }

  fn with_shader(mut self, path: &str, src: &str) -> Self {
    self.shader_overrides.insert(path.to_owned(), src.to_owned());
    self
  }
}

impl PlatformServices for FakePlatform {
  fn fetch_shader(&mut self, path: &str) -> Result<String, FetchError> {
    if self.missing.iter().any(|p| p == path) {
      return Err(FetchError::NotFound(path.to_owned()));
    }

    if let Some(src) = self.shader_overrides.get(path) {
      return Ok(src.clone());
    }

    shaders::builtin(path)
      .map(str::to_owned)
      .ok_or_else(|| FetchError::NotFound(path.to_owned()))
  }

  fn fetch_image(&mut self, path: &str) -> Result<DynamicImage, FetchError> {
    if self.missing.iter().any(|p| p == path) {
      return Err(FetchError::NotFound(path.to_owned()));
    }

    if path.ends_with("awesomeface.png") {
      Ok(DynamicImage::ImageRgba8(RgbaImage::new(4, 4)))
    } else {
      Ok(DynamicImage::ImageRgb8(RgbImage::new(4, 4)))
    }
  }
}

fn init_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}

fn host() -> SceneHost<Headless> {
  init_logger();

  let env = SceneEnv::default()
    .set_size(WindowSize::new(800, 600))
    .set_cube_field(2)
    .set_seed(1);

  SceneHost::new(env, HostConfig::default())
}

fn is_release(call: &Call) -> bool {
  matches!(
    call,
    Call::DeleteProgram(_) | Call::DeleteVertexArray(_) | Call::DeleteBuffer(_) | Call::DeleteTexture(_)
  )
}

fn is_allocation(call: &Call) -> bool {
  matches!(
    call,
    Call::CreateShader(..)
      | Call::CreateProgram(_)
      | Call::GenVertexArray(_)
      | Call::GenBuffer(_)
      | Call::GenTexture(_)
  )
}

fn count(calls: &[Call], f: impl Fn(&Call) -> bool) -> usize {
  calls.iter().filter(|c| f(c)).count()
}

#[test]
fn switch_disposes_before_initializing() {
  let mut ctx = Headless::new();
  let mut platform = FakePlatform::default();
  let mut host = host();

  for (from, to) in [
    (SceneKind::Square, SceneKind::Circle),
    (SceneKind::TexturedPlane, SceneKind::Terrain),
    (SceneKind::TexturedCubes, SceneKind::Outline),
    (SceneKind::Star, SceneKind::Star),
  ] {
    host.switch_to(from, &mut ctx, &mut platform).unwrap();
    ctx.take_calls();

    host.switch_to(to, &mut ctx, &mut platform).unwrap();
    let calls = ctx.take_calls();

    let last_release = calls.iter().rposition(is_release).unwrap();
    let first_allocation = calls.iter().position(is_allocation).unwrap();
    assert!(last_release < first_allocation, "{} -> {}", from, to);
    assert_eq!(host.current_kind(), Some(to));
  }
}

#[test]
fn switch_releases_everything_of_the_previous_scene() {
  let mut ctx = Headless::new();
  let mut platform = FakePlatform::default();
  let mut host = host();

  host
    .switch_to(SceneKind::TexturedPlane, &mut ctx, &mut platform)
    .unwrap();
  assert_eq!(
    ctx.live(),
    LiveObjects {
      shaders: 0,
      programs: 1,
      vertex_arrays: 1,
      buffers: 2,
      textures: 2,
    }
  );

  host
    .switch_to(SceneKind::Triangles, &mut ctx, &mut platform)
    .unwrap();
  assert_eq!(
    ctx.live(),
    LiveObjects {
      shaders: 0,
      programs: 1,
      vertex_arrays: 1,
      buffers: 1,
      textures: 0,
    }
  );

  host.dispose();
  assert_eq!(ctx.live(), LiveObjects::default());
  assert_eq!(ctx.enabled_attribute_slots(), 0);
  assert_eq!(ctx.current_program(), None);
}

#[test]
fn requests_closer_than_the_cooldown_switch_once() {
  let mut ctx = Headless::new();
  let mut platform = FakePlatform::default();
  let mut host = host();

  let mut input = InputState::new();
  input.set_key(Key::Num2, true);

  // key held for two frames, 0.1 s apart
  let mut time = FrameTime::default();
  for _ in 0..2 {
    time = time.advance(0.1);
    host.frame(&mut ctx, &mut platform, &input, time).unwrap();
  }

  let calls = ctx.take_calls();
  assert_eq!(count(&calls, |c| matches!(c, Call::CreateProgram(_))), 1);
  assert_eq!(host.current_kind(), Some(SceneKind::Square));

  // still cooling down
  input.set_key(Key::Num2, false);
  input.set_key(Key::Num5, true);
  time = time.advance(0.1);
  host.frame(&mut ctx, &mut platform, &input, time).unwrap();
  assert_eq!(host.current_kind(), Some(SceneKind::Square));

  time = time.advance(0.3);
  host.frame(&mut ctx, &mut platform, &input, time).unwrap();
  assert_eq!(host.current_kind(), Some(SceneKind::Circle));
}

#[test]
fn request_switch_reports_debouncing() {
  let mut ctx = Headless::new();
  let mut platform = FakePlatform::default();
  let mut host = host();

  assert!(host
    .request_switch(SceneKind::Star, &mut ctx, &mut platform)
    .unwrap());
  assert!(!host
    .request_switch(SceneKind::Circle, &mut ctx, &mut platform)
    .unwrap());
  assert_eq!(host.current_kind(), Some(SceneKind::Star));
}

#[test]
fn failed_initialization_leaves_nothing_active() {
  let mut ctx = Headless::new();
  let mut platform = FakePlatform::default().without("textures/awesomeface.png");
  let mut host = host();

  host.switch_to(SceneKind::Square, &mut ctx, &mut platform).unwrap();

  // the first texture, the geometry and the program are allocated before the failure
  let err = host
    .switch_to(SceneKind::TexturedPlane, &mut ctx, &mut platform)
    .unwrap_err();

  match err {
    SceneError::Fetch(FetchError::NotFound(path)) => assert_eq!(path, "textures/awesomeface.png"),
    e => panic!("unexpected error: {}", e),
  }

  assert!(!host.is_active());
  assert_eq!(host.current_kind(), None);
  assert_eq!(ctx.live(), LiveObjects::default());
  assert_eq!(ctx.enabled_attribute_slots(), 0);

  // the next switch starts from a clean slate
  host.switch_to(SceneKind::Circle, &mut ctx, &mut platform).unwrap();
  assert!(host.is_active());
}

#[test]
fn compile_errors_carry_the_driver_log() {
  let mut ctx = Headless::new();
  let mut platform = FakePlatform::default().with_shader(
    "shaders/fragment/circle.glsl",
    "void main() {}\n#error broken on purpose\n",
  );
  let mut host = host();

  let err = host
    .switch_to(SceneKind::Circle, &mut ctx, &mut platform)
    .unwrap_err();

  match err {
    SceneError::Program(ProgramError::Stage(e)) => {
      assert!(e.to_string().contains("broken on purpose"), "{}", e)
    }
    e => panic!("unexpected error: {}", e),
  }

  assert!(!host.is_active());
  assert_eq!(ctx.live(), LiveObjects::default());
}

#[test]
fn out_of_memory_is_a_resource_error() {
  // the plane buffers and the RGB texture fit, the RGBA one does not
  let mut ctx = Headless::with_memory_budget(200);
  let mut platform = FakePlatform::default();
  let mut host = host();

  let err = host
    .switch_to(SceneKind::TexturedPlane, &mut ctx, &mut platform)
    .unwrap_err();

  assert!(matches!(err, SceneError::Texture(_)), "{}", err);
  assert!(!host.is_active());
  assert_eq!(ctx.memory_used(), 0);
}

#[test]
fn unknown_index_keeps_the_current_scene() {
  let mut ctx = Headless::new();
  let mut platform = FakePlatform::default();
  let mut host = host();

  host.switch_to_index(3, &mut ctx, &mut platform).unwrap();
  assert_eq!(host.current_kind(), Some(SceneKind::Star));

  for index in [0, 9] {
    match host.switch_to_index(index, &mut ctx, &mut platform) {
      Err(SceneError::UnknownScene(i)) => assert_eq!(i, index),
      r => panic!("unexpected result: {:?}", r),
    }
  }

  assert_eq!(host.current_kind(), Some(SceneKind::Star));
}

#[test]
fn every_scene_renders_cleanly() {
  let mut ctx = Headless::new();
  let mut platform = FakePlatform::default();
  let mut host = host();
  let input = InputState::new();

  for kind in SceneKind::ALL {
    host.switch_to(kind, &mut ctx, &mut platform).unwrap();
    ctx.take_calls();

    let mut time = FrameTime::default();
    for _ in 0..3 {
      time = time.advance(1. / 60.);
      host.frame(&mut ctx, &mut platform, &input, time).unwrap();
    }

    let calls = ctx.take_calls();
    let draws = count(&calls, |c| {
      matches!(c, Call::DrawArrays { .. } | Call::DrawElements { .. })
    });
    let per_frame = if kind == SceneKind::TexturedCubes { 4 } else { 1 };

    assert_eq!(draws, 3 * per_frame, "{}", kind);
    assert!(ctx.violations().is_empty(), "{}: {:?}", kind, ctx.violations());
  }

  host.dispose();
  assert_eq!(ctx.live(), LiveObjects::default());
  assert_eq!(ctx.enabled_attribute_slots(), 0);
}

#[test]
fn draws_use_the_scene_geometry() {
  let mut ctx = Headless::new();
  let mut platform = FakePlatform::default();
  let mut host = host();
  let input = InputState::new();
  let time = FrameTime::new(0.016, 0.016);

  let triangles = |count| Call::DrawArrays {
    mode: Mode::Triangle,
    count,
  };
  let indexed = |mode, count| Call::DrawElements { mode, count };

  let expected = [
    (SceneKind::Triangles, triangles(6)),
    (SceneKind::Square, indexed(Mode::Triangle, 6)),
    (SceneKind::Star, indexed(Mode::Triangle, 9)),
    (SceneKind::Outline, indexed(Mode::Line, 10)),
    (SceneKind::Circle, indexed(Mode::Triangle, 6)),
    (SceneKind::TexturedPlane, indexed(Mode::Triangle, 6)),
    (SceneKind::TexturedCubes, triangles(36)),
    (SceneKind::Terrain, indexed(Mode::Triangle, 600)),
  ];

  for (kind, draw) in expected {
    host.switch_to(kind, &mut ctx, &mut platform).unwrap();
    ctx.take_calls();
    host.frame(&mut ctx, &mut platform, &input, time).unwrap();

    assert!(ctx.take_calls().contains(&draw), "{}", kind);
  }
}

#[test]
fn terrain_rebuild_keeps_the_program() {
  let mut ctx = Headless::new();
  let mut platform = FakePlatform::default();
  let mut host = host();

  host.switch_to(SceneKind::Terrain, &mut ctx, &mut platform).unwrap();
  ctx.take_calls();

  match host.scene_mut() {
    Some(Scene::Terrain(terrain)) => {
      assert_eq!(terrain.subdivisions(), 10);
      terrain.rebuild(&mut ctx, 4).unwrap();
      assert_eq!(terrain.subdivisions(), 4);
    }
    _ => panic!("terrain expected"),
  }

  let calls = ctx.take_calls();
  assert_eq!(count(&calls, |c| matches!(c, Call::CreateProgram(_))), 0);
  assert_eq!(count(&calls, |c| matches!(c, Call::DeleteProgram(_))), 0);
  assert_eq!(count(&calls, |c| matches!(c, Call::DeleteVertexArray(_))), 1);
  assert_eq!(count(&calls, |c| matches!(c, Call::GenVertexArray(_))), 1);

  let release = calls.iter().position(|c| matches!(c, Call::DeleteVertexArray(_)));
  let allocation = calls.iter().position(|c| matches!(c, Call::GenVertexArray(_)));
  assert!(release < allocation);

  host
    .frame(&mut ctx, &mut platform, &InputState::new(), FrameTime::new(0.016, 1.))
    .unwrap();
  assert!(ctx.take_calls().contains(&Call::DrawElements {
    mode: Mode::Triangle,
    count: 6 * 4 * 4,
  }));
}

#[test]
fn terrain_follows_arrow_keys_with_debounce() {
  let mut ctx = Headless::new();
  let mut platform = FakePlatform::default();
  let mut host = host();

  host.switch_to(SceneKind::Terrain, &mut ctx, &mut platform).unwrap();

  let subdivisions = |host: &SceneHost<Headless>| match host.scene() {
    Some(Scene::Terrain(terrain)) => terrain.subdivisions(),
    _ => panic!("terrain expected"),
  };

  let mut input = InputState::new();
  input.set_key(Key::Left, true);

  let mut time = FrameTime::default();
  for _ in 0..3 {
    time = time.advance(0.1);
    host.frame(&mut ctx, &mut platform, &input, time).unwrap();
  }
  assert_eq!(subdivisions(&host), 11);

  time = time.advance(0.3);
  host.frame(&mut ctx, &mut platform, &input, time).unwrap();
  assert_eq!(subdivisions(&host), 12);

  input.set_key(Key::Left, false);
  input.set_key(Key::Right, true);
  time = time.advance(0.5);
  host.frame(&mut ctx, &mut platform, &input, time).unwrap();
  assert_eq!(subdivisions(&host), 11);
}

#[test]
fn shape_moves_with_wasd() {
  let mut ctx = Headless::new();
  let mut platform = FakePlatform::default();
  let mut host = host();

  host.switch_to(SceneKind::Square, &mut ctx, &mut platform).unwrap();

  let mut input = InputState::new();
  input.set_key(Key::D, true);
  host
    .frame(&mut ctx, &mut platform, &input, FrameTime::new(0.5, 0.5))
    .unwrap();

  match host.scene() {
    Some(Scene::Shape(shape)) => assert_eq!(shape.position(), [5., 0.]),
    _ => panic!("shape expected"),
  }
}

#[test]
fn frames_without_a_scene_still_clear() {
  let mut ctx = Headless::new();
  let mut platform = FakePlatform::default();
  let mut host = host();

  host
    .frame(&mut ctx, &mut platform, &InputState::new(), FrameTime::new(0.016, 0.016))
    .unwrap();

  let calls = ctx.take_calls();
  assert!(calls.contains(&Call::Viewport([0, 0, 800, 600])));
  assert!(calls.contains(&Call::Clear {
    color: true,
    depth: true
  }));
  assert!(!host.is_active());
}
