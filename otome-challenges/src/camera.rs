//! Projection and view matrices.

use cgmath::{perspective, Deg, Matrix4, Point3, Rad, Vector3};
use otome::shader::types::Mat44;

use crate::platform::WindowSize;

/// Vertical field of view.
pub const FOV: Deg<f32> = Deg(45.);

/// Near clipping plane.
pub const Z_NEAR: f32 = 0.01;

/// Far clipping plane.
pub const Z_FAR: f32 = 10000.;

/// Perspective projection for a window of the given size.
pub fn projection(size: WindowSize) -> Matrix4<f32> {
  perspective(FOV, size.aspect_ratio(), Z_NEAR, Z_FAR)
}

/// View matrix of a camera at `eye` looking at `target`, with +Y up.
pub fn look_at(eye: [f32; 3], target: [f32; 3]) -> Matrix4<f32> {
  Matrix4::look_at_rh(Point3::from(eye), Point3::from(target), Vector3::unit_y())
}

/// Position on a horizontal circle of `radius` around the Y axis, at `height`.
///
/// `angle` is measured from +Z towards +X.
pub fn orbit<A>(angle: A, radius: f32, height: f32) -> [f32; 3]
where
  A: Into<Rad<f32>>,
{
  let angle = angle.into().0;
  [radius * angle.sin(), height, radius * angle.cos()]
}

/// Convert to the uniform representation.
pub fn to_mat44(m: Matrix4<f32>) -> Mat44<f32> {
  Mat44::from(Into::<[[f32; 4]; 4]>::into(m))
}

#[cfg(test)]
mod tests {
  use super::*;
  use cgmath::{SquareMatrix, Vector4};

  fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
  }

  #[test]
  fn orbit_starts_on_z() {
    let [x, y, z] = orbit(Rad(0.), 12., 10.);
    assert!(close(x, 0.) && close(y, 10.) && close(z, 12.));

    let [x, _, z] = orbit(Deg(90.), 12., 10.);
    assert!(close(x, 12.) && close(z, 0.));
  }

  #[test]
  fn look_at_puts_target_in_front() {
    let view = look_at([0., 0., 2.], [0., 0., 0.]);
    let p = view * Vector4::new(0., 0., 0., 1.);

    // right-handed view space looks down -Z
    assert!(close(p.x, 0.) && close(p.y, 0.) && close(p.z, -2.));
  }

  #[test]
  fn projection_survives_empty_windows() {
    let m = projection(WindowSize::new(0, 0));
    assert!(m.x.x.is_finite() && m.y.y.is_finite());
  }

  #[test]
  fn identity_converts_to_identity() {
    assert_eq!(to_mat44(Matrix4::identity()), Mat44::IDENTITY);
  }

  #[test]
  fn translation_lands_in_the_last_column() {
    let m = to_mat44(Matrix4::from_translation(Vector3::new(1., 2., 3.)));
    assert_eq!(m[12..15], [1., 2., 3.]);
  }
}
