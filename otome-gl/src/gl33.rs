//! OpenGL 3.3 backend.
//!
//! This module implements an OpenGL 3.3 backend for otome. The backend type is [`GL33`].

mod geometry;
mod pipeline;
mod shader;
mod state;
mod texture;

pub use self::geometry::Geometry;
pub use self::shader::{Program, Stage};
pub use self::state::GLState;
pub use self::state::StateQueryError;
pub use self::texture::Texture;

use std::cell::RefCell;
use std::rc::Rc;

/// An OpenGL 3.3 backend.
///
/// This type is to be used as an otome backend type. It implements every backend trait.
#[derive(Debug)]
pub struct GL33 {
  pub(crate) state: Rc<RefCell<GLState>>,
}

impl GL33 {
  /// Create a new OpenGL 3.3 backend.
  ///
  /// Fails if a backend was already created on this thread.
  pub fn new() -> Result<Self, StateQueryError> {
    GLState::new().map(|state| GL33 {
      state: Rc::new(RefCell::new(state)),
    })
  }

  /// Internal access to the backend state.
  ///
  /// # Unsafety
  ///
  /// This method is **highly unsafe** as it exposes the internals of the backend. Playing with it
  /// should be done with extreme caution.
  pub unsafe fn state(&self) -> &Rc<RefCell<GLState>> {
    &self.state
  }
}
