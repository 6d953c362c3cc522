mod platform;

use anyhow::Context as _;
use glfw::{Action, Context as _, Key as GlfwKey, MouseButton as GlfwButton, WindowEvent};
use otome_challenges::{
  FrameTime, HostConfig, InputState, Key, MouseButton, SceneEnv, SceneHost, SceneKind, WindowSize,
};
use otome_gl::GL33;
use otome_glfw::{GlfwSurface, WindowDim, WindowOpt};
use platform::DesktopPlatformServices;
use std::{path::PathBuf, time::Instant};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "otome-desktop")]
pub struct CLIOpts {
  #[structopt(long)]
  /// Directory to read shaders from, laid out as `vertex/*.glsl` and `fragment/*.glsl`; the
  /// built-in shaders are used if absent.
  shaders: Option<PathBuf>,

  #[structopt(short, long, default_value = "assets/textures")]
  /// Directory where to pick textures from.
  textures: PathBuf,

  #[structopt(long, default_value = "960")]
  /// Window width.
  width: u32,

  #[structopt(long, default_value = "540")]
  /// Window height.
  height: u32,

  #[structopt(short, long)]
  /// Start in fullscreen mode.
  fullscreen: bool,

  #[structopt(long, default_value = "10")]
  /// Side of the textured cube field.
  cubes: usize,

  #[structopt(long)]
  /// Seed of the cube field textures; random if absent.
  seed: Option<u64>,

  #[structopt(short, long)]
  /// List available scenes.
  list_scenes: bool,

  #[structopt(default_value = "square")]
  /// Scene to start with, by name or index.
  scene: SceneKind,
}

fn show_available_scenes() {
  println!("available scenes:");

  for kind in SceneKind::ALL {
    println!("  {} - {}", kind.index(), kind);
  }
}

fn run(cli_opts: CLIOpts) -> anyhow::Result<()> {
  let dim = if cli_opts.fullscreen {
    WindowDim::Fullscreen
  } else {
    WindowDim::Windowed {
      width: cli_opts.width,
      height: cli_opts.height,
    }
  };

  let surface = GlfwSurface::new_gl33("otome", WindowOpt::default().set_dim(dim))
    .context("cannot create the GLFW surface")?;
  let mut context = surface.context;
  let events = surface.events_rx;

  let mut services = DesktopPlatformServices::new(cli_opts.shaders, cli_opts.textures);
  let seed = cli_opts.seed.unwrap_or_else(clock_seed);
  let env = SceneEnv::default()
    .set_size(WindowSize::from(context.size()))
    .set_cube_field(cli_opts.cubes)
    .set_seed(seed);
  let mut host = SceneHost::<GL33>::new(env, HostConfig::default());

  if let Err(e) = host.switch_to(cli_opts.scene, &mut context, &mut services) {
    log::error!("starting without a scene: {}", e);
  }

  let mut input = InputState::new();
  let mut time = FrameTime::default();
  let mut last_t = Instant::now();

  'app: loop {
    context.window.glfw.poll_events();

    for (_, event) in glfw::flush_messages(&events) {
      match event {
        WindowEvent::Close | WindowEvent::Key(GlfwKey::Escape, _, Action::Release, _) => {
          break 'app
        }

        WindowEvent::Key(GlfwKey::F1, _, Action::Press, _) => context.toggle_fullscreen(),

        WindowEvent::Key(key, _, action, _) => {
          if let Some(key) = adapt_key(key) {
            input.set_key(key, action != Action::Release);
          }
        }

        WindowEvent::MouseButton(button, action, _) => {
          if let Some(button) = adapt_button(button) {
            input.set_button(button, action != Action::Release);
          }
        }

        WindowEvent::CursorPos(x, y) => input.set_cursor(x as _, y as _),

        WindowEvent::Scroll(dx, dy) => input.add_scroll(dx as _, dy as _),

        WindowEvent::FramebufferSize(width, height) => {
          let size = WindowSize::new(width.max(0) as _, height.max(0) as _);
          log::debug!("framebuffer resized to {}×{}", size.width, size.height);
          host.resize(size);
        }

        WindowEvent::Focus(false) => input.release_all(),

        _ => (),
      }
    }

    let now = Instant::now();
    time = time.advance(now.duration_since(last_t).as_secs_f32());
    last_t = now;

    if let Err(e) = host.frame(&mut context, &mut services, &input, time) {
      log::error!("{}", e);
    }

    context.window.swap_buffers();
  }

  host.dispose();

  Ok(())
}

fn adapt_key(key: GlfwKey) -> Option<Key> {
  match key {
    GlfwKey::Num1 | GlfwKey::Kp1 => Some(Key::Num1),
    GlfwKey::Num2 | GlfwKey::Kp2 => Some(Key::Num2),
    GlfwKey::Num3 | GlfwKey::Kp3 => Some(Key::Num3),
    GlfwKey::Num4 | GlfwKey::Kp4 => Some(Key::Num4),
    GlfwKey::Num5 | GlfwKey::Kp5 => Some(Key::Num5),
    GlfwKey::Num6 | GlfwKey::Kp6 => Some(Key::Num6),
    GlfwKey::Num7 | GlfwKey::Kp7 => Some(Key::Num7),
    GlfwKey::Num8 | GlfwKey::Kp8 => Some(Key::Num8),
    GlfwKey::W => Some(Key::W),
    GlfwKey::A => Some(Key::A),
    GlfwKey::S => Some(Key::S),
    GlfwKey::D => Some(Key::D),
    GlfwKey::Left => Some(Key::Left),
    GlfwKey::Right => Some(Key::Right),
    GlfwKey::Up => Some(Key::Up),
    GlfwKey::Down => Some(Key::Down),
    _ => None,
  }
}

fn adapt_button(button: GlfwButton) -> Option<MouseButton> {
  match button {
    GlfwButton::Button1 => Some(MouseButton::Left),
    GlfwButton::Button2 => Some(MouseButton::Right),
    GlfwButton::Button3 => Some(MouseButton::Middle),
    _ => None,
  }
}

fn clock_seed() -> u64 {
  std::time::SystemTime::now()
    .duration_since(std::time::UNIX_EPOCH)
    .map(|d| d.as_secs())
    .unwrap_or_default()
}

fn main() -> anyhow::Result<()> {
  env_logger::builder()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();
  let cli_opts = CLIOpts::from_args();

  if cli_opts.list_scenes {
    show_available_scenes();
    return Ok(());
  }

  run(cli_opts)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn number_keys_pick_scenes() {
    for kind in SceneKind::ALL {
      let glfw_key = [
        GlfwKey::Num1,
        GlfwKey::Num2,
        GlfwKey::Num3,
        GlfwKey::Num4,
        GlfwKey::Num5,
        GlfwKey::Num6,
        GlfwKey::Num7,
        GlfwKey::Num8,
      ][kind.index() - 1];

      assert_eq!(adapt_key(glfw_key), Some(kind.key()));
    }

    assert_eq!(adapt_key(GlfwKey::Num9), None);
  }

  #[test]
  fn cli_defaults() {
    let opts = CLIOpts::from_iter(&["otome-desktop"]);

    assert_eq!(opts.scene, SceneKind::Square);
    assert_eq!((opts.width, opts.height), (960, 540));
    assert_eq!(opts.cubes, 10);
    assert_eq!(opts.textures, PathBuf::from("assets/textures"));
    assert!(opts.shaders.is_none());
  }

  #[test]
  fn scenes_by_index_on_the_command_line() {
    let opts = CLIOpts::from_iter(&["otome-desktop", "--seed", "3", "8"]);

    assert_eq!(opts.scene, SceneKind::Terrain);
    assert_eq!(opts.seed, Some(3));
  }
}
