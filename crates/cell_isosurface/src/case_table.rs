//! Rotation-reduced case tables for every cell shape.
//!
//! # Table Construction
//!
//! ```text
//! canonical final cases ──┐
//!                         ├─► for each case, for each rotation g:
//! generators ─► closure ──┘      slot[g(P)]   ← (case, g, inverse = false)
//!                                slot[!g(P)]  ← (case, g, inverse = true)   if flagged
//!                                (first writer wins)
//! ```
//!
//! Each slot answers, for an unrotated corner pattern, which canonical case it
//! is and how the canonical corners map onto the actual ones. Patterns with no
//! corner over (or every corner over) stay final case 0.
//!
//! # Polygon Templates
//!
//! Every final case also carries one [`Resolution`] per combination of its
//! ambiguous quad faces (joined or separated). Templates are traced once,
//! at construction, by walking the oriented faces of the canonical pattern:
//!
//! ```text
//!   face (CCW from outside)        crossings in face order
//!   ●────○                          L = leaves the over region
//!   │    │        ──►               E = enters the over region
//!   ○────●                          joined:    L → next E
//!                                   separated: L → previous E
//! ```
//!
//! Chaining the segments gives closed loops whose right-hand normal points
//! toward the over corners. Loops longer than six vertices are replaced by
//! [`Resolution::Subdivide`].

use smallvec::SmallVec;

use crate::topology::{CellKind, Permutation, Topology, MAX_CORNERS};

/// Corner pair of a canonical edge, lower corner first.
pub type EdgeKey = [u8; 2];

/// One polygon of a template: canonical edges in loop order.
pub type PolygonTemplate = SmallVec<[EdgeKey; 6]>;

/// Identity corner permutation.
pub const IDENTITY: Permutation = [0, 1, 2, 3, 4, 5, 6, 7];

/// Longest polygon the decomposer accepts.
pub const MAX_POLYGON_VERTICES: usize = 6;

/// Table slot for one unrotated corner pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaseEntry {
  /// Final case id; 0 means no crossing.
  pub final_case: u8,
  /// Canonical corner `c` is actual corner `rotation[c]`.
  pub rotation: Permutation,
  /// The actual over corners are the complement of the rotated canonical ones.
  pub inverse: bool,
}

impl CaseEntry {
  const EMPTY: CaseEntry = CaseEntry {
    final_case: 0,
    rotation: IDENTITY,
    inverse: false,
  };
}

/// Geometry for one resolution of a final case's ambiguous faces.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
  Polygons(Vec<PolygonTemplate>),
  /// No polygon of at most six vertices exists; split the cell instead.
  Subdivide,
}

/// A canonical case with its traced templates.
#[derive(Clone, Debug)]
pub struct FinalCase {
  pub id: u8,
  pub pattern: u8,
  /// Indices into the shape's faces of the quads with alternating corners.
  pub ambiguous_faces: SmallVec<[u8; 6]>,
  /// Indexed by a mask over `ambiguous_faces`, bit set when that face joins
  /// its over corners.
  pub variants: Vec<Resolution>,
}

impl FinalCase {
  /// Template for the given ambiguous-face mask.
  #[inline]
  pub fn resolution(&self, joined_mask: usize) -> Option<&Resolution> {
    self.variants.get(joined_mask)
  }
}

/// Case table of one cell shape.
#[derive(Clone, Debug)]
pub struct CaseTable {
  topology: &'static Topology,
  entries: Vec<CaseEntry>,
  final_cases: Vec<FinalCase>,
}

impl CaseTable {
  /// Expand the shape's canonical cases over its rotation group.
  pub fn build(topology: &'static Topology) -> Self {
    let n = topology.corner_count;
    let group = rotation_group(topology);
    let full = topology.full_pattern();
    let mut entries = vec![CaseEntry::EMPTY; 1 << n];

    for (index, canonical) in topology.final_cases.iter().enumerate() {
      let final_case = (index + 1) as u8;
      let mut fill = |slot: u8, rotation: Permutation, inverse: bool| {
        let entry = &mut entries[slot as usize];
        if entry.final_case == 0 {
          *entry = CaseEntry {
            final_case,
            rotation,
            inverse,
          };
        }
      };

      for g in &group {
        fill(rotate_pattern(canonical.pattern, g, n), *g, false);
      }
      if canonical.inverse {
        for g in &group {
          fill(full ^ rotate_pattern(canonical.pattern, g, n), *g, true);
        }
      }
    }

    // Homogeneous cells never cross.
    entries[0] = CaseEntry::EMPTY;
    entries[full as usize] = CaseEntry::EMPTY;

    let final_cases = topology
      .final_cases
      .iter()
      .enumerate()
      .map(|(index, canonical)| trace_final_case(topology, (index + 1) as u8, canonical.pattern))
      .collect();

    Self {
      topology,
      entries,
      final_cases,
    }
  }

  #[inline]
  pub fn kind(&self) -> CellKind {
    self.topology.kind
  }

  #[inline]
  pub fn topology(&self) -> &'static Topology {
    self.topology
  }

  /// Number of slots (`2^corners`).
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Slot for an unrotated pattern.
  #[inline]
  pub fn lookup(&self, pattern: u8) -> CaseEntry {
    self
      .entries
      .get(pattern as usize)
      .copied()
      .unwrap_or(CaseEntry::EMPTY)
  }

  /// Final case by id (1-based).
  #[inline]
  pub fn final_case(&self, id: u8) -> Option<&FinalCase> {
    (id as usize)
      .checked_sub(1)
      .and_then(|index| self.final_cases.get(index))
  }

  pub fn final_cases(&self) -> &[FinalCase] {
    &self.final_cases
  }

  /// Overwrite one slot, for exercising the unknown-case path.
  #[cfg(test)]
  pub(crate) fn with_entry(mut self, pattern: u8, entry: CaseEntry) -> Self {
    self.entries[pattern as usize] = entry;
    self
  }
}

/// Case tables for every supported shape, built once and shared.
#[derive(Clone, Debug)]
pub struct CaseTables {
  cube: CaseTable,
  tetrahedron: CaseTable,
  octahedron: CaseTable,
  pyramid: CaseTable,
  wedge: CaseTable,
}

impl CaseTables {
  #[tracing::instrument(skip_all, name = "case_tables::build")]
  pub fn new() -> Self {
    let tables = Self {
      cube: CaseTable::build(CellKind::Cube.topology()),
      tetrahedron: CaseTable::build(CellKind::Tetrahedron.topology()),
      octahedron: CaseTable::build(CellKind::Octahedron.topology()),
      pyramid: CaseTable::build(CellKind::Pyramid.topology()),
      wedge: CaseTable::build(CellKind::Wedge.topology()),
    };
    tracing::debug!(
      cube_cases = tables.cube.final_cases.len(),
      wedge_cases = tables.wedge.final_cases.len(),
      "built case tables"
    );
    tables
  }

  #[inline]
  pub fn get(&self, kind: CellKind) -> &CaseTable {
    match kind {
      CellKind::Cube => &self.cube,
      CellKind::Tetrahedron => &self.tetrahedron,
      CellKind::Octahedron => &self.octahedron,
      CellKind::Pyramid => &self.pyramid,
      CellKind::Wedge => &self.wedge,
    }
  }

  /// Replace one shape's table.
  #[cfg(test)]
  pub(crate) fn with_table(mut self, table: CaseTable) -> Self {
    match table.kind() {
      CellKind::Cube => self.cube = table,
      CellKind::Tetrahedron => self.tetrahedron = table,
      CellKind::Octahedron => self.octahedron = table,
      CellKind::Pyramid => self.pyramid = table,
      CellKind::Wedge => self.wedge = table,
    }
    self
  }
}

impl Default for CaseTables {
  fn default() -> Self {
    Self::new()
  }
}

// =============================================================================
// Rotations
// =============================================================================

/// `(h ∘ g)[c] = h[g[c]]`.
#[inline]
pub fn compose(h: &Permutation, g: &Permutation) -> Permutation {
  std::array::from_fn(|c| h[g[c] as usize])
}

/// Image of a corner pattern under a rotation.
#[inline]
pub fn rotate_pattern(pattern: u8, g: &Permutation, corner_count: usize) -> u8 {
  (0..corner_count)
    .filter(|&c| pattern >> c & 1 == 1)
    .fold(0u8, |q, c| q | 1 << g[c])
}

/// Every rotation of the shape, identity first, by closure over the
/// generators.
pub fn rotation_group(topology: &Topology) -> Vec<Permutation> {
  let mut group = vec![IDENTITY];
  let mut next = 0;
  while next < group.len() {
    let g = group[next];
    next += 1;
    for h in topology.generators {
      let composed = compose(h, &g);
      if !group.contains(&composed) {
        group.push(composed);
      }
    }
  }
  group
}

// =============================================================================
// Template tracing
// =============================================================================

#[inline]
fn edge_key(a: u8, b: u8) -> EdgeKey {
  if a < b {
    [a, b]
  } else {
    [b, a]
  }
}

#[inline]
fn is_over(pattern: u8, corner: u8) -> bool {
  pattern >> corner & 1 == 1
}

/// Quad faces whose corners alternate over/under around the face.
pub fn ambiguous_faces(topology: &Topology, pattern: u8) -> SmallVec<[u8; 6]> {
  topology
    .faces
    .iter()
    .enumerate()
    .filter(|(_, face)| {
      face.len() == 4 && {
        let s: [bool; 4] = std::array::from_fn(|i| is_over(pattern, face[i]));
        s[0] == s[2] && s[1] == s[3] && s[0] != s[1]
      }
    })
    .map(|(index, _)| index as u8)
    .collect()
}

fn trace_final_case(topology: &Topology, id: u8, pattern: u8) -> FinalCase {
  let ambiguous = ambiguous_faces(topology, pattern);
  let variants = (0..1usize << ambiguous.len())
    .map(|mask| {
      let joined = |face: usize| {
        ambiguous
          .iter()
          .position(|&f| f as usize == face)
          .is_some_and(|bit| mask >> bit & 1 == 1)
      };
      let loops = trace_loops(topology, pattern, joined);
      if loops.iter().any(|l| l.len() > MAX_POLYGON_VERTICES) {
        Resolution::Subdivide
      } else {
        Resolution::Polygons(loops.into_iter().map(|l| l.into_iter().collect()).collect())
      }
    })
    .collect();

  FinalCase {
    id,
    pattern,
    ambiguous_faces: ambiguous,
    variants,
  }
}

/// Chain face segments into closed crossing loops.
fn trace_loops(
  topology: &Topology,
  pattern: u8,
  joined: impl Fn(usize) -> bool,
) -> Vec<Vec<EdgeKey>> {
  let mut successor: SmallVec<[(EdgeKey, EdgeKey); 16]> = SmallVec::new();

  for (index, face) in topology.faces.iter().enumerate() {
    let m = face.len();
    // (edge, leaves the over region)
    let crossings: SmallVec<[(EdgeKey, bool); 4]> = (0..m)
      .filter_map(|i| {
        let (a, b) = (face[i], face[(i + 1) % m]);
        let over = is_over(pattern, a);
        (over != is_over(pattern, b)).then_some((edge_key(a, b), over))
      })
      .collect();

    let step = if crossings.len() == 4 && !joined(index) {
      crossings.len() - 1
    } else {
      1
    };
    for (i, &(edge, leaving)) in crossings.iter().enumerate() {
      if leaving {
        successor.push((edge, crossings[(i + step) % crossings.len()].0));
      }
    }
  }

  let mut remaining: SmallVec<[EdgeKey; 16]> = successor.iter().map(|&(from, _)| from).collect();
  remaining.sort_unstable();
  remaining.reverse();

  let mut loops = Vec::new();
  while let Some(start) = remaining.pop() {
    let mut current = start;
    let mut polygon = vec![start];
    while let Some(&(_, next)) = successor.iter().find(|(from, _)| *from == current) {
      if next == start {
        break;
      }
      remaining.retain(|e| *e != next);
      polygon.push(next);
      current = next;
      if polygon.len() > MAX_CORNERS * 2 {
        break;
      }
    }
    loops.push(polygon);
  }
  loops
}

#[cfg(test)]
#[path = "case_table_test.rs"]
mod case_table_test;
