//! Subdivided terrain grid.

/// Side length of the grid, in world units.
pub const SIZE: f32 = 12.;

/// Height of the grid plane.
pub const HEIGHT: f32 = -2.;

/// A square grid on the XZ plane, centered on the origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
  /// XYZ positions, row-major (rows along Z).
  pub vertices: Vec<f32>,
  /// Two triangles per cell.
  pub indices: Vec<u32>,
}

impl Grid {
  /// Number of vertices.
  pub fn vertex_count(&self) -> usize {
    self.vertices.len() / 3
  }
}

/// Build a grid with `subdivisions` cells per side.
///
/// The grid has `(n + 1)²` vertices and `6n²` indices. `subdivisions` is clamped to at least 1.
pub fn grid(subdivisions: u32) -> Grid {
  let n = subdivisions.max(1);
  let side = n + 1;
  let step = SIZE / n as f32;
  let half = SIZE / 2.;

  let mut vertices = Vec::with_capacity((side * side) as usize * 3);
  for r in 0..side {
    for c in 0..side {
      vertices.extend_from_slice(&[c as f32 * step - half, HEIGHT, r as f32 * step - half]);
    }
  }

  let mut indices = Vec::with_capacity((6 * n * n) as usize);
  for r in 0..n {
    for c in 0..n {
      let base = r * side + c;
      indices.extend_from_slice(&[
        base + side + 1,
        base,
        base + side,
        base + side + 1,
        base + 1,
        base,
      ]);
    }
  }

  Grid { vertices, indices }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn counts_and_bounds() {
    for n in 1..=64u32 {
      let g = grid(n);
      let side = (n + 1) as usize;

      assert_eq!(g.vertex_count(), side * side, "n = {}", n);
      assert_eq!(g.indices.len(), 6 * (n * n) as usize, "n = {}", n);
      assert!(
        g.indices.iter().all(|&i| (i as usize) < g.vertex_count()),
        "n = {}",
        n
      );
    }
  }

  #[test]
  fn zero_subdivisions_is_one_cell() {
    assert_eq!(grid(0), grid(1));
  }

  #[test]
  fn spans_the_whole_size() {
    let g = grid(4);
    let xs = g.vertices.chunks(3).map(|v| v[0]);
    let (min, max) = xs.fold((f32::MAX, f32::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));

    assert!((min + 6.).abs() < 1e-5);
    assert!((max - 6.).abs() < 1e-5);
    assert!(g.vertices.chunks(3).all(|v| v[1] == HEIGHT));
  }

  #[test]
  fn single_cell_triangles() {
    assert_eq!(grid(1).indices, [3, 0, 2, 3, 1, 0]);
  }
}
