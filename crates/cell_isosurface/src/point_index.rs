//! Sample identities and canonical edge keys.
//!
//! A sample is either a node of the cell's sampling lattice or a synthesized
//! point at an exact xi (the centroid of a subdivided cell). Edges between two
//! samples are keyed by an ordered [`PointPair`], so every cell crossing the
//! same lattice edge finds the same vertex in the mesh cache.
//!
//! # Ordering
//!
//! ```text
//! Lattice(i, j, k)          by (i, j, k)
//! Exact { xi, scalar }      by (xi1, xi2, xi3, scalar), IEEE total order
//! Lattice < Exact           always
//! ```

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Identity of one sample point within a cell.
#[derive(Clone, Copy, Debug)]
pub enum PointIndex {
  /// Lattice node, indices in xi-axis order.
  Lattice([u32; 3]),
  /// Synthesized interior sample.
  Exact { xi: [f64; 3], scalar: f64 },
}

impl PointIndex {
  #[inline]
  pub const fn lattice(i: u32, j: u32, k: u32) -> Self {
    PointIndex::Lattice([i, j, k])
  }

  #[inline]
  pub const fn exact(xi: [f64; 3], scalar: f64) -> Self {
    PointIndex::Exact { xi, scalar }
  }

  #[inline]
  pub fn is_exact(&self) -> bool {
    matches!(self, PointIndex::Exact { .. })
  }
}

impl Ord for PointIndex {
  fn cmp(&self, other: &Self) -> Ordering {
    match (self, other) {
      (PointIndex::Lattice(a), PointIndex::Lattice(b)) => a.cmp(b),
      (PointIndex::Lattice(_), PointIndex::Exact { .. }) => Ordering::Less,
      (PointIndex::Exact { .. }, PointIndex::Lattice(_)) => Ordering::Greater,
      (
        PointIndex::Exact { xi: a, scalar: sa },
        PointIndex::Exact { xi: b, scalar: sb },
      ) => a[0]
        .total_cmp(&b[0])
        .then_with(|| a[1].total_cmp(&b[1]))
        .then_with(|| a[2].total_cmp(&b[2]))
        .then_with(|| sa.total_cmp(sb)),
    }
  }
}

impl PartialOrd for PointIndex {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl PartialEq for PointIndex {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for PointIndex {}

// Bit patterns agree with `total_cmp` equality.
impl Hash for PointIndex {
  fn hash<H: Hasher>(&self, state: &mut H) {
    match self {
      PointIndex::Lattice(ijk) => {
        state.write_u8(0);
        ijk.hash(state);
      }
      PointIndex::Exact { xi, scalar } => {
        state.write_u8(1);
        for x in xi {
          x.to_bits().hash(state);
        }
        scalar.to_bits().hash(state);
      }
    }
  }
}

/// Unordered pair of samples, smaller first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointPair {
  first: PointIndex,
  second: PointIndex,
}

impl PointPair {
  #[inline]
  pub fn new(a: PointIndex, b: PointIndex) -> Self {
    if b < a {
      Self {
        first: b,
        second: a,
      }
    } else {
      Self {
        first: a,
        second: b,
      }
    }
  }

  #[inline]
  pub fn first(&self) -> &PointIndex {
    &self.first
  }

  #[inline]
  pub fn second(&self) -> &PointIndex {
    &self.second
  }
}

#[cfg(test)]
#[path = "point_index_test.rs"]
mod point_index_test;
