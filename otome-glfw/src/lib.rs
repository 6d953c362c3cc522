//! [GLFW](https://crates.io/crates/glfw) backend for otome.
//!
//! [`GlfwSurface`] opens a window, makes an OpenGL 3.3 core context current on the calling thread
//! and wraps it in a [`GL33Context`], the [`GraphicsContext`] scenes render with.

#![deny(missing_docs)]

pub mod windowing;

use glfw::{self, Context as _, Glfw, InitError, SwapInterval, Window, WindowEvent, WindowMode};
use otome::context::GraphicsContext;
pub use otome_gl::gl33::StateQueryError;
use otome_gl::GL33;
use std::{convert::Infallible, error, fmt, os::raw::c_void, sync::mpsc::Receiver};
pub use windowing::{CursorMode, WindowDim, WindowOpt};

/// Error that can be risen while creating a surface.
#[non_exhaustive]
#[derive(Debug)]
pub enum GlfwSurfaceError<E> {
  /// Initialization of the surface went wrong.
  ///
  /// This variant exposes a **glfw** error for further information about what went wrong.
  InitError(InitError),

  /// Window creation failed.
  NoWindow,

  /// No primary monitor detected.
  NoPrimaryMonitor,

  /// No available video mode.
  NoVideoMode,

  /// User error.
  UserError(E),

  /// The graphics state is not available.
  ///
  /// This error is generated when the initialization code is called on a thread on which the
  /// graphics state has already been acquired.
  GraphicsStateError(StateQueryError),
}

impl<E> fmt::Display for GlfwSurfaceError<E>
where
  E: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GlfwSurfaceError::InitError(ref e) => write!(f, "initialization error: {}", e),
      GlfwSurfaceError::NoWindow => f.write_str("cannot create window"),
      GlfwSurfaceError::NoPrimaryMonitor => f.write_str("no primary monitor"),
      GlfwSurfaceError::NoVideoMode => f.write_str("no video mode"),
      GlfwSurfaceError::UserError(ref e) => write!(f, "user error: {}", e),
      GlfwSurfaceError::GraphicsStateError(ref e) => {
        write!(f, "failed to get graphics state: {}", e)
      }
    }
  }
}

impl<E> From<InitError> for GlfwSurfaceError<E> {
  fn from(e: InitError) -> Self {
    GlfwSurfaceError::InitError(e)
  }
}

impl<E> error::Error for GlfwSurfaceError<E>
where
  E: 'static + error::Error,
{
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      GlfwSurfaceError::InitError(e) => Some(e),
      GlfwSurfaceError::UserError(e) => Some(e),
      GlfwSurfaceError::GraphicsStateError(e) => Some(e),
      _ => None,
    }
  }
}

/// GLFW surface.
///
/// This type is a helper that exposes two important concepts: the GLFW event receiver that you can
/// use it with to poll events and the [`GL33Context`], which allows you to perform the rendering
/// part.
#[derive(Debug)]
pub struct GlfwSurface {
  /// Wrapped GLFW events queue.
  pub events_rx: Receiver<(f64, WindowEvent)>,

  /// Wrapped otome context.
  pub context: GL33Context,
}

impl GlfwSurface {
  /// Initialize GLFW to provide an otome environment.
  ///
  /// `create_window` receives GLFW with the OpenGL 3.3 core hints already set and must return a
  /// window whose context is current.
  pub fn new<E>(
    create_window: impl FnOnce(
      &mut Glfw,
    )
      -> Result<(Window, Receiver<(f64, WindowEvent)>), GlfwSurfaceError<E>>,
  ) -> Result<Self, GlfwSurfaceError<E>> {
    #[cfg(feature = "log-errors")]
    let error_cbk = glfw::LOG_ERRORS;
    #[cfg(not(feature = "log-errors"))]
    let error_cbk = glfw::FAIL_ON_ERRORS;

    let mut glfw = glfw::init(error_cbk)?;

    // OpenGL hints
    glfw.window_hint(glfw::WindowHint::OpenGlProfile(
      glfw::OpenGlProfileHint::Core,
    ));
    glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
    glfw.window_hint(glfw::WindowHint::ContextVersionMajor(3));
    glfw.window_hint(glfw::WindowHint::ContextVersionMinor(3));

    let (mut window, events_rx) = create_window(&mut glfw)?;

    // init OpenGL
    gl::load_with(|s| window.get_proc_address(s) as *const c_void);

    let gl = GL33::new().map_err(GlfwSurfaceError::GraphicsStateError)?;

    let (width, height) = window.get_size();
    let context = GL33Context {
      window,
      gl,
      windowed_size: [width.max(1) as u32, height.max(1) as u32],
    };
    let surface = GlfwSurface { events_rx, context };

    Ok(surface)
  }

  /// Open a window titled `title` following `win_opt` and bootstrap an OpenGL 3.3 context in it.
  pub fn new_gl33(
    title: impl AsRef<str>,
    win_opt: WindowOpt,
  ) -> Result<Self, GlfwSurfaceError<Infallible>> {
    GlfwSurface::new(|glfw| {
      glfw.window_hint(glfw::WindowHint::Samples(win_opt.num_samples()));

      let (mut window, events_rx) = match *win_opt.dim() {
        WindowDim::Windowed { width, height } => glfw
          .create_window(width, height, title.as_ref(), WindowMode::Windowed)
          .ok_or(GlfwSurfaceError::NoWindow)?,

        WindowDim::Fullscreen => glfw.with_primary_monitor(|glfw, monitor| {
          let monitor = monitor.ok_or(GlfwSurfaceError::NoPrimaryMonitor)?;
          let vmode = monitor
            .get_video_mode()
            .ok_or(GlfwSurfaceError::NoVideoMode)?;

          glfw
            .create_window(
              vmode.width,
              vmode.height,
              title.as_ref(),
              WindowMode::FullScreen(monitor),
            )
            .ok_or(GlfwSurfaceError::NoWindow)
        })?,
      };

      window.make_current();
      window.set_all_polling(true);
      window.set_cursor_mode(match win_opt.cursor_mode() {
        CursorMode::Visible => glfw::CursorMode::Normal,
        CursorMode::Invisible => glfw::CursorMode::Hidden,
        CursorMode::Disabled => glfw::CursorMode::Disabled,
      });
      glfw.set_swap_interval(SwapInterval::Sync(1));

      log::info!("opened {:?} window", win_opt.dim());

      Ok((window, events_rx))
    })
  }
}

/// OpenGL 3.3 context.
///
/// This type also re-exports the GLFW window, if you need access to it.
#[derive(Debug)]
pub struct GL33Context {
  /// Wrapped GLFW window.
  pub window: Window,

  /// OpenGL 3.3 state.
  gl: GL33,

  // size to restore when leaving fullscreen
  windowed_size: [u32; 2],
}

impl GL33Context {
  /// Size of the framebuffer, in pixels.
  pub fn size(&self) -> [u32; 2] {
    let (w, h) = self.window.get_framebuffer_size();
    [w.max(0) as u32, h.max(0) as u32]
  }

  /// Whether the window covers a monitor.
  pub fn is_fullscreen(&self) -> bool {
    self
      .window
      .with_window_mode(|mode| matches!(mode, WindowMode::FullScreen(_)))
  }

  /// Switch between windowed and fullscreen mode on the primary monitor.
  pub fn toggle_fullscreen(&mut self) {
    if self.is_fullscreen() {
      let [width, height] = self.windowed_size;
      self
        .window
        .set_monitor(WindowMode::Windowed, 64, 64, width, height, None);
      log::info!("leaving fullscreen");
      return;
    }

    let (width, height) = self.window.get_size();
    self.windowed_size = [width.max(1) as u32, height.max(1) as u32];

    let mut glfw = self.window.glfw.clone();
    let window = &mut self.window;

    glfw.with_primary_monitor(|_, monitor| {
      match monitor.and_then(|m| m.get_video_mode().map(|vmode| (m, vmode))) {
        Some((monitor, vmode)) => {
          window.set_monitor(
            WindowMode::FullScreen(monitor),
            0,
            0,
            vmode.width,
            vmode.height,
            Some(vmode.refresh_rate),
          );
          log::info!("entering fullscreen ({}×{})", vmode.width, vmode.height);
        }

        None => log::warn!("cannot go fullscreen: no primary monitor"),
      }
    });
  }
}

unsafe impl GraphicsContext for GL33Context {
  type Backend = GL33;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.gl
  }
}
