//! Uniform value wrappers.
//!
//! Plain arrays wrapped so that backends can tell a `vec3` from a `float[3]`. Matrices are
//! column-major, as GLSL expects them.

use std::ops::{Deref, DerefMut};

macro_rules! wrapper {
  ($(#[$doc:meta])* $name:ident, [$t:ident; $($n:tt)+]) => {
    $(#[$doc])*
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct $name<$t>(pub [$t; $($n)+]);

    impl<$t> From<[$t; $($n)+]> for $name<$t> {
      fn from(a: [$t; $($n)+]) -> Self {
        $name(a)
      }
    }

    impl<$t> From<$name<$t>> for [$t; $($n)+] {
      fn from($name(a): $name<$t>) -> Self {
        a
      }
    }

    impl<$t> Deref for $name<$t> {
      type Target = [$t; $($n)+];

      fn deref(&self) -> &Self::Target {
        &self.0
      }
    }

    impl<$t> DerefMut for $name<$t> {
      fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
      }
    }
  };
}

wrapper!(
  /// A 2 dimensional vector.
  Vec2, [T; 2]
);
wrapper!(
  /// A 3 dimensional vector.
  Vec3, [T; 3]
);
wrapper!(
  /// A 4 dimensional vector.
  Vec4, [T; 4]
);
wrapper!(
  /// A 3×3 matrix, as three columns.
  Mat33, [T; 3 * 3]
);
wrapper!(
  /// A 4×4 matrix, as four columns.
  Mat44, [T; 4 * 4]
);

impl<T> Vec2<T> {
  /// Create a new vector.
  pub const fn new(x: T, y: T) -> Self {
    Vec2([x, y])
  }
}

impl<T> Vec3<T> {
  /// Create a new vector.
  pub const fn new(x: T, y: T, z: T) -> Self {
    Vec3([x, y, z])
  }
}

impl<T> Vec4<T> {
  /// Create a new vector.
  pub const fn new(x: T, y: T, z: T, w: T) -> Self {
    Vec4([x, y, z, w])
  }
}

impl<T: Copy> From<[[T; 3]; 3]> for Mat33<T> {
  fn from(cols: [[T; 3]; 3]) -> Self {
    let [a, b, c] = cols;
    Mat33([
      a[0], a[1], a[2], //
      b[0], b[1], b[2], //
      c[0], c[1], c[2],
    ])
  }
}

impl<T: Copy> From<[[T; 4]; 4]> for Mat44<T> {
  fn from(cols: [[T; 4]; 4]) -> Self {
    let mut m = [cols[0][0]; 16];

    for (i, col) in cols.iter().enumerate() {
      m[i * 4..i * 4 + 4].copy_from_slice(col);
    }

    Mat44(m)
  }
}

impl Mat44<f32> {
  /// The identity matrix.
  pub const IDENTITY: Self = Mat44([
    1., 0., 0., 0., //
    0., 1., 0., 0., //
    0., 0., 1., 0., //
    0., 0., 0., 1.,
  ]);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mat44_from_columns_is_column_major() {
    let m = Mat44::from([
      [1., 2., 3., 4.],
      [5., 6., 7., 8.],
      [9., 10., 11., 12.],
      [13., 14., 15., 16.],
    ]);

    assert_eq!(m[0..4], [1., 2., 3., 4.]);
    assert_eq!(m[12..16], [13., 14., 15., 16.]);
  }

  #[test]
  fn mat44_identity_diagonal() {
    for (i, v) in Mat44::IDENTITY.iter().enumerate() {
      let expected = if i % 5 == 0 { 1. } else { 0. };
      assert_eq!(*v, expected);
    }
  }
}
