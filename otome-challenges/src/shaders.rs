//! Built-in GLSL sources, by logical path.

macro_rules! builtin_sources {
  ($($path:literal),* $(,)?) => {
    /// Logical paths of every built-in source.
    pub const PATHS: &[&str] = &[$($path),*];

    /// Source of a built-in shader.
    pub fn builtin(path: &str) -> Option<&'static str> {
      match path {
        $($path => Some(include_str!($path)),)*
        _ => None,
      }
    }
  };
}

builtin_sources!(
  "shaders/vertex/colored.glsl",
  "shaders/vertex/base.glsl",
  "shaders/vertex/texture.glsl",
  "shaders/vertex/terrain.glsl",
  "shaders/fragment/colored.glsl",
  "shaders/fragment/circle.glsl",
  "shaders/fragment/texture.glsl",
  "shaders/fragment/combined_texture.glsl",
  "shaders/fragment/terrain.glsl",
);
