//! Scene errors.

use image::ImageError;
use otome::{
  geometry::{GeometryError, LayoutError},
  shader::ProgramError,
  texture::TextureError,
};
use std::{error, fmt, io};

/// Errors raised while fetching scene assets from the platform.
#[non_exhaustive]
#[derive(Debug)]
pub enum FetchError {
  /// Nothing is known under this logical path.
  NotFound(String),

  /// The asset exists but could not be read.
  Io {
    /// Logical path of the asset.
    path: String,
    /// Underlying error.
    source: io::Error,
  },

  /// The image bytes could not be decoded.
  Decode {
    /// Logical path of the image.
    path: String,
    /// Underlying error.
    source: ImageError,
  },
}

impl FetchError {
  /// Logical path of the asset that failed.
  pub fn path(&self) -> &str {
    match self {
      FetchError::NotFound(path) => path,
      FetchError::Io { path, .. } | FetchError::Decode { path, .. } => path,
    }
  }
}

impl fmt::Display for FetchError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      FetchError::NotFound(ref path) => write!(f, "unknown asset: {}", path),
      FetchError::Io { ref path, ref source } => write!(f, "cannot read {}: {}", path, source),
      FetchError::Decode { ref path, ref source } => {
        write!(f, "cannot decode {}: {}", path, source)
      }
    }
  }
}

impl error::Error for FetchError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      FetchError::NotFound(_) => None,
      FetchError::Io { source, .. } => Some(source),
      FetchError::Decode { source, .. } => Some(source),
    }
  }
}

/// Errors that abort a scene initialization (and hence a switch).
#[non_exhaustive]
#[derive(Debug)]
pub enum SceneError {
  /// An asset could not be fetched.
  Fetch(FetchError),
  /// A shader stage failed to compile or the program failed to link.
  Program(ProgramError),
  /// A geometry could not be built.
  Geometry(GeometryError),
  /// A texture could not be created.
  Texture(TextureError),
  /// No scene has this index.
  UnknownScene(usize),
}

impl fmt::Display for SceneError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      SceneError::Fetch(ref e) => write!(f, "asset error: {}", e),
      SceneError::Program(ref e) => write!(f, "shader error: {}", e),
      SceneError::Geometry(ref e) => write!(f, "geometry error: {}", e),
      SceneError::Texture(ref e) => write!(f, "texture error: {}", e),
      SceneError::UnknownScene(index) => write!(f, "no scene at index {}", index),
    }
  }
}

impl error::Error for SceneError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      SceneError::Fetch(e) => Some(e),
      SceneError::Program(e) => Some(e),
      SceneError::Geometry(e) => Some(e),
      SceneError::Texture(e) => Some(e),
      SceneError::UnknownScene(_) => None,
    }
  }
}

impl From<FetchError> for SceneError {
  fn from(e: FetchError) -> Self {
    SceneError::Fetch(e)
  }
}

impl From<ProgramError> for SceneError {
  fn from(e: ProgramError) -> Self {
    SceneError::Program(e)
  }
}

impl From<GeometryError> for SceneError {
  fn from(e: GeometryError) -> Self {
    SceneError::Geometry(e)
  }
}

impl From<LayoutError> for SceneError {
  fn from(e: LayoutError) -> Self {
    SceneError::Geometry(e.into())
  }
}

impl From<TextureError> for SceneError {
  fn from(e: TextureError) -> Self {
    SceneError::Texture(e)
  }
}
