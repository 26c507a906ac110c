//! Triangulation of crossing polygons (3 to 6 vertices).
//!
//! Splits are chosen by squared world-space diagonal length. A diagonal whose
//! two ends lie on a common cell face runs inside that face, where the
//! neighbouring cell never cuts, so it is skipped whenever another split
//! exists. Exact length ties go to the first candidate in loop order.
//!
//! ```text
//! quad:      cut the shorter of 0-2 / 1-3 (ties cut 0-2)
//! pentagon:  cut the ear (i-1, i, i+1) with the shortest diagonal,
//!            then split the remaining quad
//! hexagon:   cut the shortest long diagonal (i, i+3) into two quads,
//!            else cut the inner triangle (i, i+2, i+4)
//! ```

use crate::mesh::IsoMesh;
use crate::topology::FaceMask;

/// Triangulate `polygon` (vertex indices into `mesh`, in loop order) and
/// append the triangles. With `reverse` every triangle is emitted with the
/// opposite winding.
///
/// Returns the number of triangles added; degenerate triangles are dropped.
pub fn decompose(mesh: &mut IsoMesh, polygon: &[usize], reverse: bool) -> usize {
  decompose_in_cell(mesh, polygon, &[], reverse)
}

/// [`decompose`] for a polygon traced inside one cell, where `faces[i]` holds
/// the cell faces that vertex `i` lies on.
pub fn decompose_in_cell(
  mesh: &mut IsoMesh,
  polygon: &[usize],
  faces: &[FaceMask],
  reverse: bool,
) -> usize {
  let mut emitter = Emitter {
    mesh,
    polygon,
    faces,
    reverse,
    added: 0,
  };

  match polygon.len() {
    3 => emitter.triangle(0, 1, 2),
    4 => emitter.quad([0, 1, 2, 3]),
    5 => emitter.pentagon(),
    6 => emitter.hexagon(),
    n => tracing::warn!(vertices = n, "skipping polygon outside 3..=6 vertices"),
  }
  emitter.added
}

/// How a hexagon is cut.
enum HexagonCut {
  /// Long diagonal `(i, i + 3)`.
  Long(usize),
  /// Inner triangle `(i, i + 2, i + 4)`.
  Inner(usize),
}

/// Emits triangles by position in the polygon loop.
struct Emitter<'m, 'p> {
  mesh: &'m mut IsoMesh,
  polygon: &'p [usize],
  faces: &'p [FaceMask],
  reverse: bool,
  added: usize,
}

impl Emitter<'_, '_> {
  #[inline]
  fn triangle(&mut self, i: usize, j: usize, k: usize) {
    let [a, b, c] = [i, j, k].map(|p| self.polygon[p]);
    let corners = if self.reverse { [a, c, b] } else { [a, b, c] };
    if self.mesh.add_triangle(corners) {
      self.added += 1;
    }
  }

  #[inline]
  fn diagonal(&self, i: usize, j: usize) -> f64 {
    dist_sq(
      self.mesh.position(self.polygon[i]),
      self.mesh.position(self.polygon[j]),
    )
  }

  /// Whether the segment `i`-`j` stays off every cell face.
  #[inline]
  fn cuttable(&self, i: usize, j: usize) -> bool {
    match (self.faces.get(i), self.faces.get(j)) {
      (Some(a), Some(b)) => a & b == 0,
      _ => true,
    }
  }

  /// `Some(true)` to cut `a`-`c`, `Some(false)` for `b`-`d`, `None` when both
  /// run inside a face.
  fn quad_cut(&self, [a, b, c, d]: [usize; 4]) -> Option<bool> {
    match (self.cuttable(a, c), self.cuttable(b, d)) {
      (true, true) => Some(self.diagonal(a, c) <= self.diagonal(b, d)),
      (true, false) => Some(true),
      (false, true) => Some(false),
      (false, false) => None,
    }
  }

  fn quad(&mut self, q: [usize; 4]) {
    let [a, b, c, d] = q;
    // Split along shorter diagonal for better triangle quality
    let cut_ac = self
      .quad_cut(q)
      .unwrap_or_else(|| self.diagonal(a, c) <= self.diagonal(b, d));
    if cut_ac {
      self.triangle(a, b, c);
      self.triangle(a, c, d);
    } else {
      self.triangle(a, b, d);
      self.triangle(b, c, d);
    }
  }

  fn pentagon(&mut self) {
    let at = |ear: usize, k: usize| (ear + k) % 5;
    let ear = {
      let key = |ear: usize| self.diagonal(at(ear, 4), at(ear, 1));
      let usable = |ear: usize| {
        self.cuttable(at(ear, 4), at(ear, 1))
          && self
            .quad_cut([at(ear, 1), at(ear, 2), at(ear, 3), at(ear, 4)])
            .is_some()
      };
      shortest(5, &key, &usable)
        .or_else(|| shortest(5, &key, |_| true))
        .unwrap_or(0)
    };

    self.triangle(at(ear, 4), at(ear, 0), at(ear, 1));
    self.quad([at(ear, 1), at(ear, 2), at(ear, 3), at(ear, 4)]);
  }

  fn hexagon(&mut self) {
    let at = |start: usize, k: usize| (start + k) % 6;
    let cut = {
      let long = |i: usize| self.diagonal(i, i + 3);
      let long_usable = |i: usize| {
        self.cuttable(i, i + 3)
          && self.quad_cut([i, i + 1, i + 2, i + 3]).is_some()
          && self.quad_cut([at(i, 3), at(i, 4), at(i, 5), i]).is_some()
      };
      let inner = |i: usize| {
        (0..3)
          .map(|k| self.diagonal(at(i, 2 * k), at(i, 2 * k + 2)))
          .sum::<f64>()
      };
      let inner_usable =
        |i: usize| (0..3).all(|k| self.cuttable(at(i, 2 * k), at(i, 2 * k + 2)));

      shortest(3, &long, &long_usable)
        .map(HexagonCut::Long)
        .or_else(|| shortest(2, &inner, &inner_usable).map(HexagonCut::Inner))
        .unwrap_or_else(|| HexagonCut::Long(shortest(3, &long, |_| true).unwrap_or(0)))
    };

    match cut {
      HexagonCut::Long(i) => {
        self.quad([at(i, 0), at(i, 1), at(i, 2), at(i, 3)]);
        self.quad([at(i, 3), at(i, 4), at(i, 5), at(i, 0)]);
      }
      HexagonCut::Inner(i) => {
        for k in 0..3 {
          self.triangle(at(i, 2 * k), at(i, 2 * k + 1), at(i, 2 * k + 2));
        }
        self.triangle(at(i, 0), at(i, 2), at(i, 4));
      }
    }
  }
}

/// Index in `0..count` passing `usable` with the smallest key, first on ties.
fn shortest(
  count: usize,
  key: impl Fn(usize) -> f64,
  usable: impl Fn(usize) -> bool,
) -> Option<usize> {
  let mut best: Option<(usize, f64)> = None;
  for i in (0..count).filter(|&i| usable(i)) {
    let k = key(i);
    if best.map_or(true, |(_, b)| k < b) {
      best = Some((i, k));
    }
  }
  best.map(|(i, _)| i)
}

/// Squared distance between two points.
#[inline(always)]
fn dist_sq(a: [f64; 3], b: [f64; 3]) -> f64 {
  let dx = a[0] - b[0];
  let dy = a[1] - b[1];
  let dz = a[2] - b[2];
  dx * dx + dy * dy + dz * dz
}

#[cfg(test)]
#[path = "polygon_test.rs"]
mod polygon_test;
