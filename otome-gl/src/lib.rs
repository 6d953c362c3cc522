//! OpenGL backends.
//!
//! This crate exports [OpenGL](https://www.khronos.org/opengl/) backends for otome. The only one
//! so far is [`GL33`], targeting OpenGL 3.3 core profile. Function pointers must be loaded (with
//! [`gl::load_with`]) and a context must be current on the calling thread before creating it;
//! windowing crates such as `otome-glfw` do that for you.

pub mod gl33;

pub use gl33::GL33;
