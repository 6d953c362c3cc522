//! Asset loading from disk.

use image::{DynamicImage, ImageError};
use otome_challenges::{shaders, FetchError, PlatformServices};
use std::{
  fs, io,
  path::{Path, PathBuf},
};

const SHADER_PREFIX: &str = "shaders/";
const TEXTURE_PREFIX: &str = "textures/";

/// Desktop implementation of [`PlatformServices`].
///
/// Shaders are read from a directory mirroring the logical `shaders/…` layout when one is given,
/// and come from the sources built into the scene library otherwise. Images are read from the
/// texture directory, the `textures/` prefix of their logical path stripped.
#[derive(Debug)]
pub struct DesktopPlatformServices {
  shader_root: Option<PathBuf>,
  texture_root: PathBuf,
}

impl DesktopPlatformServices {
  pub fn new(shader_root: Option<PathBuf>, texture_root: PathBuf) -> Self {
    Self {
      shader_root,
      texture_root,
    }
  }

  fn resolve(root: &Path, prefix: &str, path: &str) -> Result<PathBuf, FetchError> {
    path
      .strip_prefix(prefix)
      .map(|relative| root.join(relative))
      .ok_or_else(|| FetchError::NotFound(path.to_owned()))
  }
}

impl PlatformServices for DesktopPlatformServices {
  fn fetch_shader(&mut self, path: &str) -> Result<String, FetchError> {
    let root = match self.shader_root {
      Some(ref root) => root,
      None => {
        return shaders::builtin(path)
          .map(str::to_owned)
          .ok_or_else(|| FetchError::NotFound(path.to_owned()));
      }
    };

    let file = Self::resolve(root, SHADER_PREFIX, path)?;
    log::debug!("reading shader {}", file.display());

    fs::read_to_string(&file).map_err(|source| io_error(path, source))
  }

  fn fetch_image(&mut self, path: &str) -> Result<DynamicImage, FetchError> {
    let file = Self::resolve(&self.texture_root, TEXTURE_PREFIX, path)?;
    log::debug!("reading image {}", file.display());

    image::open(&file).map_err(|e| match e {
      ImageError::IoError(source) => io_error(path, source),
      source => FetchError::Decode {
        path: path.to_owned(),
        source,
      },
    })
  }
}

fn io_error(path: &str, source: io::Error) -> FetchError {
  if source.kind() == io::ErrorKind::NotFound {
    FetchError::NotFound(path.to_owned())
  } else {
    FetchError::Io {
      path: path.to_owned(),
      source,
    }
  }
}
