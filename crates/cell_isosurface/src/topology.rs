//! Corner, edge and face layout of every cell shape the crossing routines
//! handle, plus the generators of each shape's rotation group.
//!
//! # Cube Topology
//!
//! ```text
//!       6──────7         Corners (binary ZYX):
//!      /│     /│           0=(0,0,0)  1=(1,0,0)  2=(0,1,0)  3=(1,1,0)
//!     4─┼────5 │           4=(0,0,1)  5=(1,0,1)  6=(0,1,1)  7=(1,1,1)
//!     │ 2────┼─3
//!     │/     │/          +Z
//!     0──────1            │  +Y
//!                         │ /
//!                         └───+X
//! ```
//!
//! # Other shapes
//!
//! ```text
//! Tetrahedron   0=(0,0,0) 1=(1,0,0) 2=(0,1,0) 3=(0,0,1)
//! Pyramid       base 0=(0,0,0) 1=(1,0,0) 2=(0,1,0) 3=(1,1,0), apex 4 above
//! Wedge         bottom cap 0=(0,0,0) 1=(1,0,0) 2=(0,1,0)
//!               top cap    3=(0,0,1) 4=(1,0,1) 5=(0,1,1)
//! Octahedron    0=(1,0,0) 1=(0,1,0) 2=(0,0,1) 3=(0,1,1) 4=(1,0,1) 5=(1,1,0)
//!               opposite corners: 0-3, 1-4, 2-5
//! ```
//!
//! # Face orientation
//!
//! Every face lists its corners counter-clockwise when seen from outside the
//! cell, so the right-hand normal of a face points outwards. Crossing loops
//! traced over these faces inherit a consistent winding, and every rotation
//! generator preserves this orientation.

use std::fmt;

/// Largest corner count of any supported shape.
pub const MAX_CORNERS: usize = 8;

/// One bit per face of a shape, in face order.
pub type FaceMask = u16;

/// A corner permutation: entry `c` is the image of corner `c`. Slots past the
/// shape's corner count are unused and hold the identity.
pub type Permutation = [u8; MAX_CORNERS];

/// Cell shapes with a crossing routine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
  Cube,
  Tetrahedron,
  Octahedron,
  Pyramid,
  Wedge,
}

impl CellKind {
  pub const ALL: [CellKind; 5] = [
    CellKind::Cube,
    CellKind::Tetrahedron,
    CellKind::Octahedron,
    CellKind::Pyramid,
    CellKind::Wedge,
  ];

  /// Static layout of this shape.
  pub fn topology(self) -> &'static Topology {
    match self {
      CellKind::Cube => &CUBE,
      CellKind::Tetrahedron => &TETRAHEDRON,
      CellKind::Octahedron => &OCTAHEDRON,
      CellKind::Pyramid => &PYRAMID,
      CellKind::Wedge => &WEDGE,
    }
  }
}

impl fmt::Display for CellKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      CellKind::Cube => "cube",
      CellKind::Tetrahedron => "tetrahedron",
      CellKind::Octahedron => "octahedron",
      CellKind::Pyramid => "pyramid",
      CellKind::Wedge => "wedge",
    };
    f.write_str(name)
  }
}

/// Canonical corner pattern of one final case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanonicalPattern {
  /// Bit `c` set when corner `c` is over the iso-value.
  pub pattern: u8,
  /// Also map the bitwise complement of every rotation onto this case.
  pub inverse: bool,
}

const fn canonical(pattern: u8, inverse: bool) -> CanonicalPattern {
  CanonicalPattern { pattern, inverse }
}

/// Corner, edge and face layout of one cell shape.
#[derive(Debug)]
pub struct Topology {
  pub kind: CellKind,
  pub corner_count: usize,
  pub edges: &'static [[u8; 2]],
  /// Faces, counter-clockwise from outside.
  pub faces: &'static [&'static [u8]],
  /// Rotations generating the shape's full rotation group.
  pub generators: &'static [Permutation],
  /// Canonical patterns; final case `i + 1` is `final_cases[i]`.
  pub final_cases: &'static [CanonicalPattern],
}

impl Topology {
  /// Bit mask with one bit per corner.
  #[inline]
  pub fn full_pattern(&self) -> u8 {
    ((1u16 << self.corner_count) - 1) as u8
  }

  /// Faces containing both corners `a` and `b`.
  pub fn edge_faces(&self, a: u8, b: u8) -> FaceMask {
    self
      .faces
      .iter()
      .enumerate()
      .filter(|(_, face)| face.contains(&a) && face.contains(&b))
      .fold(0, |mask, (index, _)| mask | 1 << index)
  }

  /// Edges whose endpoints lie on opposite sides of the iso-value.
  pub fn crossing_edges(&self, pattern: u8) -> impl Iterator<Item = [u8; 2]> + '_ {
    self
      .edges
      .iter()
      .copied()
      .filter(move |&[a, b]| ((pattern >> a) ^ (pattern >> b)) & 1 == 1)
  }
}

// =============================================================================
// Cube
// =============================================================================

/// Edge endpoint corner indices.
/// Each edge connects two corners of the 2×2×2 cube.
pub const CUBE_EDGES: [[u8; 2]; 12] = [
  [0, 1], // Edge 0:  X axis at Y=0, Z=0
  [0, 2], // Edge 1:  Y axis at X=0, Z=0
  [0, 4], // Edge 2:  Z axis at X=0, Y=0
  [1, 3], // Edge 3:  Y axis at X=1, Z=0
  [1, 5], // Edge 4:  Z axis at X=1, Y=0
  [2, 3], // Edge 5:  X axis at Y=1, Z=0
  [2, 6], // Edge 6:  Z axis at X=0, Y=1
  [3, 7], // Edge 7:  Z axis at X=1, Y=1
  [4, 5], // Edge 8:  X axis at Y=0, Z=1
  [4, 6], // Edge 9:  Y axis at X=0, Z=1
  [5, 7], // Edge 10: Y axis at X=1, Z=1
  [6, 7], // Edge 11: X axis at Y=1, Z=1
];

pub const CUBE_FACES: [&[u8]; 6] = [
  &[0, 4, 6, 2], // -X
  &[1, 3, 7, 5], // +X
  &[0, 1, 5, 4], // -Y
  &[2, 6, 7, 3], // +Y
  &[0, 2, 3, 1], // -Z
  &[4, 5, 7, 6], // +Z
];

/// The 14 canonical cube cases. The first seven (one to three corners over)
/// also cover their complements; the four-corner cases are each closed under
/// complement already.
pub const CUBE_FINAL_CASES: [CanonicalPattern; 14] = [
  canonical(0b0000_0001, true),  // 1: single corner
  canonical(0b0000_0011, true),  // 2: edge
  canonical(0b0000_0110, true),  // 3: face diagonal (1 ambiguous face)
  canonical(0b0001_1000, true),  // 4: body diagonal
  canonical(0b0000_0111, true),  // 5: three corners of a face
  canonical(0b0001_1001, true),  // 6: edge + far corner (1 ambiguous face)
  canonical(0b0001_0110, true),  // 7: three face diagonals (3 ambiguous faces)
  canonical(0b0000_1111, false), // 8: whole face
  canonical(0b0001_0111, false), // 9: corner and its three neighbours
  canonical(0b0001_1011, false), // 10: zigzag
  canonical(0b0001_1101, false), // 11: mirrored zigzag
  canonical(0b0001_1110, false), // 12: face corner triple + isolated corner
  canonical(0b0011_1100, false), // 13: opposite edges (2 ambiguous faces)
  canonical(0b0110_1001, false), // 14: alternating corners (6 ambiguous faces)
];

pub static CUBE: Topology = Topology {
  kind: CellKind::Cube,
  corner_count: 8,
  edges: &CUBE_EDGES,
  faces: &CUBE_FACES,
  generators: &[
    [0, 2, 4, 6, 1, 3, 5, 7], // 120° about the 0-7 diagonal
    [1, 0, 5, 4, 3, 2, 7, 6], // 180° about the axis through edges 0-1 and 6-7
  ],
  final_cases: &CUBE_FINAL_CASES,
};

/// Get corner position within unit cube.
#[inline(always)]
pub const fn corner_position(corner: u8) -> [u32; 3] {
  [
    (corner & 1) as u32,
    ((corner >> 1) & 1) as u32,
    ((corner >> 2) & 1) as u32,
  ]
}

// =============================================================================
// Tetrahedron
// =============================================================================

pub static TETRAHEDRON: Topology = Topology {
  kind: CellKind::Tetrahedron,
  corner_count: 4,
  edges: &[[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]],
  faces: &[&[0, 2, 1], &[0, 1, 3], &[0, 3, 2], &[1, 2, 3]],
  generators: &[
    [0, 2, 3, 1, 4, 5, 6, 7], // 120° about corner 0
    [1, 0, 3, 2, 4, 5, 6, 7], // 180° about opposite edge midpoints
  ],
  final_cases: &[
    canonical(0b0001, true),  // 1: one corner (triangle)
    canonical(0b0011, false), // 2: two corners (quad)
  ],
};

// =============================================================================
// Octahedron
// =============================================================================

pub static OCTAHEDRON: Topology = Topology {
  kind: CellKind::Octahedron,
  corner_count: 6,
  edges: &[
    [0, 1],
    [0, 2],
    [0, 4],
    [0, 5],
    [1, 2],
    [1, 3],
    [1, 5],
    [2, 3],
    [2, 4],
    [3, 4],
    [3, 5],
    [4, 5],
  ],
  faces: &[
    &[0, 2, 1],
    &[0, 1, 5],
    &[0, 4, 2],
    &[0, 5, 4],
    &[3, 1, 2],
    &[3, 5, 1],
    &[3, 2, 4],
    &[3, 4, 5],
  ],
  generators: &[
    [0, 2, 4, 3, 5, 1, 6, 7], // 90° about the 0-3 axis
    [1, 0, 5, 4, 3, 2, 6, 7], // 180° swapping 0 and 1
  ],
  final_cases: &[
    canonical(0b00_0001, true),  // 1: one corner (quad)
    canonical(0b00_0011, true),  // 2: adjacent pair (hexagon)
    canonical(0b00_0111, false), // 3: face (hexagon)
    canonical(0b00_1001, true),  // 4: opposite pair (two quads)
    canonical(0b00_1011, false), // 5: path of three (split into tetrahedra)
  ],
};

/// Opposite corner of every octahedron corner.
pub const OCTAHEDRON_OPPOSITE: [u8; 6] = [3, 4, 5, 0, 1, 2];

// =============================================================================
// Pyramid
// =============================================================================

/// Apex corner of the pyramid.
pub const PYRAMID_APEX: u8 = 4;

pub static PYRAMID: Topology = Topology {
  kind: CellKind::Pyramid,
  corner_count: 5,
  edges: &[
    [0, 1],
    [0, 2],
    [1, 3],
    [2, 3],
    [0, 4],
    [1, 4],
    [2, 4],
    [3, 4],
  ],
  faces: &[&[0, 2, 3, 1], &[0, 1, 4], &[1, 3, 4], &[3, 2, 4], &[2, 0, 4]],
  generators: &[[1, 3, 0, 2, 4, 5, 6, 7]], // 90° about the apex axis
  final_cases: &[
    canonical(0b0_0001, true), // 1: base corner
    canonical(0b1_0000, true), // 2: apex
    canonical(0b0_0011, true), // 3: base edge
    canonical(0b0_0110, true), // 4: base diagonal (ambiguous base)
    canonical(0b1_0001, true), // 5: apex + base corner
  ],
};

// =============================================================================
// Wedge
// =============================================================================

pub static WEDGE: Topology = Topology {
  kind: CellKind::Wedge,
  corner_count: 6,
  edges: &[
    [0, 1],
    [0, 2],
    [1, 2],
    [3, 4],
    [3, 5],
    [4, 5],
    [0, 3],
    [1, 4],
    [2, 5],
  ],
  faces: &[
    &[0, 2, 1],    // bottom cap
    &[3, 4, 5],    // top cap
    &[0, 1, 4, 3], // side
    &[1, 2, 5, 4], // side
    &[2, 0, 3, 5], // side
  ],
  generators: &[
    [1, 2, 0, 4, 5, 3, 6, 7], // 120° about the prism axis
    [3, 5, 4, 0, 2, 1, 6, 7], // 180° swapping the caps
  ],
  final_cases: &[
    canonical(0b00_0001, true),  // 1: one corner
    canonical(0b00_0011, true),  // 2: cap edge
    canonical(0b00_0111, false), // 3: whole cap
    canonical(0b00_1001, true),  // 4: side edge
    canonical(0b00_1010, true),  // 5: side diagonal (ambiguous side)
    canonical(0b00_1011, false), // 6: cap edge + side edge
    canonical(0b00_1100, true),  // 7: other side diagonal (ambiguous side)
    canonical(0b00_1101, false), // 8: side edge + cap corner
    canonical(0b00_1110, false), // 9: two ambiguous sides
  ],
};

#[cfg(test)]
#[path = "topology_test.rs"]
mod topology_test;
