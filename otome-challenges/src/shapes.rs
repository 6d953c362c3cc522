//! Vertex data of the built-in shapes.
//!
//! Colored shapes interleave an RGBA color and an XYZ position, 7 floats per vertex. Textured
//! shapes interleave an XYZ position and UV coordinates, 5 floats per vertex.

/// Floats per colored vertex.
pub const COLORED_FLOATS: usize = 7;

/// Floats per textured vertex.
pub const TEXTURED_FLOATS: usize = 5;

#[rustfmt::skip]
pub const TRIANGLES: [f32; 6 * COLORED_FLOATS] = [
  // color                 position
  1.0, 0.0, 0.0, 1.0,     -0.9, -0.5, 0.0,
  0.0, 1.0, 0.0, 1.0,     -0.1, -0.5, 0.0,
  0.0, 0.0, 1.0, 1.0,     -0.5,  0.5, 0.0,
  1.0, 1.0, 0.0, 1.0,      0.1, -0.5, 0.0,
  0.0, 1.0, 1.0, 1.0,      0.9, -0.5, 0.0,
  1.0, 0.0, 1.0, 1.0,      0.5,  0.5, 0.0,
];

#[rustfmt::skip]
pub const SQUARE: [f32; 4 * COLORED_FLOATS] = [
  1.0, 0.0, 0.0, 1.0,     -0.5,  0.5, 0.0,
  0.0, 1.0, 0.0, 1.0,      0.5, -0.5, 0.0,
  0.0, 0.0, 1.0, 1.0,     -0.5, -0.5, 0.0,
  1.0, 1.0, 0.0, 1.0,      0.5,  0.5, 0.0,
];

pub const SQUARE_INDICES: [u32; 6] = [3, 0, 2, 3, 1, 0];

#[rustfmt::skip]
pub const STAR: [f32; 9 * COLORED_FLOATS] = [
  1.0, 1.0, 0.0, 1.0,      0.0,  0.8, 0.0,
  1.0, 0.5, 0.0, 1.0,      0.2,  0.25, 0.0,
  1.0, 1.0, 0.0, 1.0,      0.75, 0.25, 0.0,
  1.0, 0.5, 0.0, 1.0,      0.3, -0.1, 0.0,
  1.0, 1.0, 0.0, 1.0,      0.45, -0.65, 0.0,
  1.0, 0.5, 0.0, 1.0,      0.0, -0.3, 0.0,
  1.0, 1.0, 0.0, 1.0,     -0.45, -0.65, 0.0,
  1.0, 0.5, 0.0, 1.0,     -0.3, -0.1, 0.0,
  1.0, 1.0, 0.0, 1.0,     -0.75, 0.25, 0.0,
];

pub const STAR_INDICES: [u32; 9] = [7, 1, 5, 3, 4, 5, 6, 7, 8];

#[rustfmt::skip]
pub const OUTLINE: [f32; 4 * COLORED_FLOATS] = [
  1.0, 1.0, 1.0, 1.0,     -0.5,  0.5, 0.0,
  1.0, 1.0, 1.0, 1.0,      0.5,  0.5, 0.0,
  1.0, 1.0, 1.0, 1.0,     -0.5, -0.5, 0.0,
  1.0, 1.0, 1.0, 1.0,      0.5, -0.5, 0.0,
];

/// Line pairs of the outline.
pub const OUTLINE_INDICES: [u32; 10] = [3, 1, 1, 0, 0, 2, 2, 3, 3, 0];

/// A unit square centered on the origin, positions only.
#[rustfmt::skip]
pub const UNIT_SQUARE: [f32; 4 * 3] = [
  -0.5,  0.5, 0.0,
   0.5,  0.5, 0.0,
   0.5, -0.5, 0.0,
  -0.5, -0.5, 0.0,
];

pub const UNIT_SQUARE_INDICES: [u32; 6] = [2, 1, 0, 2, 0, 3];

#[rustfmt::skip]
pub const PLANE: [f32; 4 * TEXTURED_FLOATS] = [
  // position          uv
  -0.5, -0.5, 0.0,     0.0, 0.0,
   0.5, -0.5, 0.0,     1.0, 0.0,
  -0.5,  0.5, 0.0,     0.0, 1.0,
   0.5,  0.5, 0.0,     1.0, 1.0,
];

pub const PLANE_INDICES: [u32; 6] = [1, 3, 2, 1, 2, 0];

#[rustfmt::skip]
const CUBE_CORNERS: [[f32; 3]; 8] = [
  [-0.5, -0.5, -0.5],
  [ 0.5, -0.5, -0.5],
  [-0.5,  0.5, -0.5],
  [ 0.5,  0.5, -0.5],
  [-0.5, -0.5,  0.5],
  [ 0.5, -0.5,  0.5],
  [-0.5,  0.5,  0.5],
  [ 0.5,  0.5,  0.5],
];

// back, front, top, bottom, left, right
#[rustfmt::skip]
const CUBE_FACES: [u32; 36] = [
  1, 3, 2, 1, 2, 0,
  5, 7, 6, 5, 6, 4,
  7, 3, 2, 7, 2, 6,
  5, 1, 0, 5, 0, 4,
  4, 6, 2, 4, 2, 0,
  5, 7, 3, 5, 3, 1,
];

// per face, in the order the face indices above go around
const CUBE_FACE_UVS: [[f32; 2]; 6] = [[1., 0.], [1., 1.], [0., 1.], [1., 0.], [0., 1.], [0., 0.]];

/// Vertices in a textured cube.
pub const CUBE_VERTICES: usize = CUBE_FACES.len();

/// A unit cube centered on the origin, as 36 textured vertices (no index buffer).
pub fn cube() -> Vec<f32> {
  CUBE_FACES
    .iter()
    .enumerate()
    .flat_map(|(i, &corner)| {
      let [x, y, z] = CUBE_CORNERS[corner as usize];
      let [u, v] = CUBE_FACE_UVS[i % CUBE_FACE_UVS.len()];
      [x, y, z, u, v]
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn max_index(indices: &[u32]) -> usize {
    indices.iter().copied().max().unwrap_or(0) as usize
  }

  #[test]
  fn indices_stay_in_bounds() {
    assert!(max_index(&SQUARE_INDICES) < SQUARE.len() / COLORED_FLOATS);
    assert!(max_index(&STAR_INDICES) < STAR.len() / COLORED_FLOATS);
    assert!(max_index(&OUTLINE_INDICES) < OUTLINE.len() / COLORED_FLOATS);
    assert!(max_index(&UNIT_SQUARE_INDICES) < UNIT_SQUARE.len() / 3);
    assert!(max_index(&PLANE_INDICES) < PLANE.len() / TEXTURED_FLOATS);
  }

  #[test]
  fn outline_is_made_of_line_pairs() {
    assert_eq!(OUTLINE_INDICES.len() % 2, 0);
  }

  #[test]
  fn cube_is_expanded() {
    let cube = cube();
    assert_eq!(cube.len(), CUBE_VERTICES * TEXTURED_FLOATS);

    // first vertex: corner 1 with the first face uv
    assert_eq!(cube[..5], [0.5, -0.5, -0.5, 1., 0.]);

    for v in cube.chunks(TEXTURED_FLOATS) {
      assert!(v[..3].iter().all(|c| c.abs() == 0.5));
      assert!(v[3..].iter().all(|&c| c == 0. || c == 1.));
    }
  }
}
