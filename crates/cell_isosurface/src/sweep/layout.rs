//! Lattice layout of one sweep: which xi axis is swept, how many samples each
//! axis gets, and how the sub-cells of a layer are laid out.
//!
//! The sweep works in a local `(u, v, w)` frame. `u` and `v` span a sample
//! plane, `w` is the sweep axis. Lattice keys and xi are reported in xi-axis
//! order.
//!
//! ```text
//!  cube             simplex prism     polygon prism
//!  ┌───┬───┐        ┐                 ┌───┬───┬───┐  ▲ radial
//!  │   │   │        │ ╲               │   │   │   │  │
//!  ├───┼───┤        ├───┐             ├───┼───┼───┤  cubes
//!  │   │   │        │ ╲ │ ╲           │ ╱ │ ╱ │ ╱ │  wedges
//!  └───┴───┘        └───┴───┘         └───┴───┴───┘  centre
//!                                       angular ►
//!
//!  tetrahedron: per lattice cube an upright tetrahedron, an octahedron and
//!  an inverted tetrahedron, each while its corners stay inside the simplex
//! ```

use smallvec::SmallVec;

use crate::error::IsoError;
use crate::shape::{CellShape, ShapeClass};
use crate::topology::{corner_position, CellKind};

/// Lattice position in the local `(u, v, w)` frame.
pub type Node = [u32; 3];

/// Sub-cell corner positions, in the cell kind's corner order.
pub type CellCorners = SmallVec<[Node; 8]>;

/// Upright tetrahedron corner offsets within a lattice cube.
const TETRAHEDRON_OFFSETS: [Node; 4] = [[0, 0, 0], [1, 0, 0], [0, 1, 0], [0, 0, 1]];

/// Octahedron corner offsets within a lattice cube.
const OCTAHEDRON_OFFSETS: [Node; 6] = [
  [1, 0, 0],
  [0, 1, 0],
  [0, 0, 1],
  [0, 1, 1],
  [1, 0, 1],
  [1, 1, 0],
];

/// Inverted tetrahedron corner offsets within a lattice cube.
const INVERTED_TETRAHEDRON_OFFSETS: [Node; 4] = [[1, 1, 1], [1, 0, 1], [0, 1, 1], [1, 1, 0]];

/// How a layer is cut into sub-cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lattice {
  Cube,
  /// Triangles in the `(u, v)` plane, extruded along `w`.
  Wedge,
  /// `u` angular (periodic), `v` radial with the centre at `v == 0`.
  Polygon,
  Tetrahedron,
}

/// Axis mapping and sample counts for one sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepLayout {
  /// xi axis of `u`, `v` and `w`.
  axes: [usize; 3],
  /// Intervals along `u`, `v` and `w`.
  counts: [u32; 3],
  lattice: Lattice,
  mirrored: bool,
}

impl SweepLayout {
  /// Layout for a validated shape and per-xi sample counts.
  pub fn new(shape: &CellShape, number_in_xi: [u32; 3]) -> Result<Self, IsoError> {
    if let Some(axis) = number_in_xi.iter().position(|&n| n == 0) {
      return Err(IsoError::InvalidSampleCount { axis });
    }

    let (axes, counts, lattice) = match shape.class() {
      ShapeClass::Cube => ([0, 1, 2], number_in_xi, Lattice::Cube),
      ShapeClass::SimplexPrism { plane: [a, b], line } => {
        let n = number_in_xi[a].max(number_in_xi[b]);
        ([a, b, line], [n, n, number_in_xi[line]], Lattice::Wedge)
      }
      ShapeClass::PolygonPrism {
        angular,
        radial,
        line,
        vertex_count,
      } => {
        let angular_count = number_in_xi[angular].div_ceil(vertex_count) * vertex_count;
        (
          [angular, radial, line],
          [angular_count, number_in_xi[radial], number_in_xi[line]],
          Lattice::Polygon,
        )
      }
      ShapeClass::Tetrahedron => {
        let n = number_in_xi.iter().copied().max().unwrap_or(1);
        ([0, 1, 2], [n; 3], Lattice::Tetrahedron)
      }
    };

    // Polar maps (x = r cos t, y = r sin t) are right-handed in (radial,
    // angular), so the angular-first order flips once more.
    let mirrored = is_odd_permutation(axes) ^ (lattice == Lattice::Polygon);
    Ok(Self {
      axes,
      counts,
      lattice,
      mirrored,
    })
  }

  #[inline]
  pub fn lattice(&self) -> Lattice {
    self.lattice
  }

  /// Intervals along `u`, `v` and `w`.
  #[inline]
  pub fn counts(&self) -> [u32; 3] {
    self.counts
  }

  /// Whether emitted winding flips: `(u, v, w)` is an odd permutation of the
  /// xi axes, toggled once more for polygon layouts.
  #[inline]
  pub fn mirrored(&self) -> bool {
    self.mirrored
  }

  /// xi axes of the polygon's angular and radial directions.
  pub fn polar_axes(&self) -> Option<[usize; 2]> {
    match self.lattice {
      Lattice::Polygon => Some([self.axes[0], self.axes[1]]),
      _ => None,
    }
  }

  /// Whether a node carries a sample.
  #[inline]
  pub fn is_node(&self, [u, v, w]: Node) -> bool {
    let n = self.counts[0];
    match self.lattice {
      Lattice::Cube | Lattice::Polygon => true,
      Lattice::Wedge => u + v <= n,
      Lattice::Tetrahedron => u + v + w <= n,
    }
  }

  /// Representative of a node. Polygon nodes wrap in angle and collapse at
  /// the centre; every other lattice maps nodes to themselves.
  #[inline]
  pub fn canonical(&self, [u, v, w]: Node) -> Node {
    match self.lattice {
      Lattice::Polygon if v == 0 || u == self.counts[0] => [0, v, w],
      _ => [u, v, w],
    }
  }

  /// Lattice key of a node in xi-axis order.
  pub fn key(&self, node: Node) -> [u32; 3] {
    let local = self.canonical(node);
    let mut key = [0; 3];
    for (i, &axis) in self.axes.iter().enumerate() {
      key[axis] = local[i];
    }
    key
  }

  /// xi of a node, without canonicalization.
  pub fn xi(&self, node: Node) -> [f64; 3] {
    let mut xi = [0.0; 3];
    for (i, &axis) in self.axes.iter().enumerate() {
      xi[axis] = f64::from(node[i]) / f64::from(self.counts[i]);
    }
    xi
  }

  /// Visit every sub-cell of the layer between planes `w` and `w + 1`.
  pub fn for_each_cell<F>(&self, w: u32, mut visit: F) -> Result<(), IsoError>
  where
    F: FnMut(CellKind, &CellCorners) -> Result<(), IsoError>,
  {
    let [nu, nv, _] = self.counts;
    match self.lattice {
      Lattice::Cube => {
        for v in 0..nv {
          for u in 0..nu {
            visit(CellKind::Cube, &cube_corners([u, v, w]))?;
          }
        }
      }
      Lattice::Wedge => {
        for v in 0..nv {
          for u in 0..nu - v {
            let upright = [[u, v], [u + 1, v], [u, v + 1]];
            visit(CellKind::Wedge, &prism_corners(upright, w))?;
            if u + v + 2 <= nu {
              let inverted = [[u + 1, v], [u + 1, v + 1], [u, v + 1]];
              visit(CellKind::Wedge, &prism_corners(inverted, w))?;
            }
          }
        }
      }
      Lattice::Polygon => {
        for v in 0..nv {
          for u in 0..nu {
            if v == 0 {
              let centre = [[u, 0], [u + 1, 1], [u, 1]];
              visit(CellKind::Wedge, &prism_corners(centre, w))?;
            } else {
              visit(CellKind::Cube, &cube_corners([u, v, w]))?;
            }
          }
        }
      }
      Lattice::Tetrahedron => {
        let n = nu;
        for v in 0..n - w {
          for u in 0..n - w - v {
            let base = [u, v, w];
            let sum = u + v + w;
            visit(CellKind::Tetrahedron, &offset_corners(base, &TETRAHEDRON_OFFSETS))?;
            if sum + 2 <= n {
              visit(CellKind::Octahedron, &offset_corners(base, &OCTAHEDRON_OFFSETS))?;
            }
            if sum + 3 <= n {
              let corners = offset_corners(base, &INVERTED_TETRAHEDRON_OFFSETS);
              visit(CellKind::Tetrahedron, &corners)?;
            }
          }
        }
      }
    }
    Ok(())
  }
}

#[inline]
fn cube_corners([u, v, w]: Node) -> CellCorners {
  (0..8u8)
    .map(|c| {
      let [du, dv, dw] = corner_position(c);
      [u + du, v + dv, w + dw]
    })
    .collect()
}

/// Triangle extruded from plane `w` to `w + 1`.
#[inline]
fn prism_corners(triangle: [[u32; 2]; 3], w: u32) -> CellCorners {
  [w, w + 1]
    .into_iter()
    .flat_map(|layer| triangle.map(|[u, v]| [u, v, layer]))
    .collect()
}

#[inline]
fn offset_corners([u, v, w]: Node, offsets: &[Node]) -> CellCorners {
  offsets
    .iter()
    .map(|[du, dv, dw]| [u + du, v + dv, w + dw])
    .collect()
}

fn is_odd_permutation(axes: [usize; 3]) -> bool {
  let inversions = (0..3)
    .flat_map(|i| (i + 1..3).map(move |j| (i, j)))
    .filter(|&(i, j)| axes[i] > axes[j])
    .count();
  inversions % 2 == 1
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;
