//! Cell crossing: corner classification, ambiguity resolution and polygon
//! emission for every supported cell shape.
//!
//! # Dispatch
//!
//! ```text
//! corner scalars ─► pattern (bit c = scalar > iso)
//!                      │
//!                      ▼
//!                case table ─► (final case, rotation g, inverse)
//!                      │
//!                      ▼
//!       ambiguous faces (through g) ─► face test ^ inverse ─► variant mask
//!                      │
//!          ┌───────────┴────────────┐
//!          ▼                        ▼
//!    Polygons                   Subdivide
//!    edges mapped through g     cube / wedge: centroid apex, one pyramid
//!    vertices from the cache    per quad face, one tetrahedron per
//!    decomposed off the cell's  triangle face
//!    faces, winding reversed    octahedron: four tetrahedra around the
//!    for inverse (or mirrored)  0-3 diagonal
//!    cells
//! ```

use glam::DVec3;
use smallvec::SmallVec;

use crate::case_table::{CaseTables, Resolution};
use crate::error::IsoError;
use crate::mesh::{IsoMesh, Sample, VertexSource};
use crate::polygon;
use crate::topology::{CellKind, FaceMask, OCTAHEDRON, OCTAHEDRON_OPPOSITE};

/// Crosses single cells into a mesh.
pub struct CellCrosser<'a, S: ?Sized> {
  tables: &'a CaseTables,
  source: &'a S,
  mirrored: bool,
}

impl<'a, S> CellCrosser<'a, S>
where
  S: VertexSource + ?Sized,
{
  /// `mirrored` flips the winding of everything emitted, for lattices whose
  /// axis order has odd parity.
  pub fn new(tables: &'a CaseTables, source: &'a S, mirrored: bool) -> Self {
    Self {
      tables,
      source,
      mirrored,
    }
  }

  /// Cross one cell whose corners are given in the shape's corner order.
  pub fn cross(
    &self,
    kind: CellKind,
    corners: &[Sample],
    mesh: &mut IsoMesh,
  ) -> Result<(), IsoError> {
    let table = self.tables.get(kind);
    let topology = table.topology();
    debug_assert_eq!(corners.len(), topology.corner_count);

    let pattern = classify(corners, mesh.iso_value());
    let entry = table.lookup(pattern);
    if entry.final_case == 0 {
      return if pattern == 0 || pattern == topology.full_pattern() {
        Ok(())
      } else {
        Err(IsoError::UnknownCaseId { kind, case: 0 })
      };
    }

    let unknown = || IsoError::UnknownCaseId {
      kind,
      case: entry.final_case,
    };
    let case = table.final_case(entry.final_case).ok_or_else(unknown)?;
    let g = &entry.rotation;

    let mut joined_mask = 0usize;
    for (bit, &face) in case.ambiguous_faces.iter().enumerate() {
      let face = topology.faces[face as usize];
      let scalars: [f64; 4] =
        std::array::from_fn(|i| corners[g[face[i] as usize] as usize].scalar);
      if face_is_joined(scalars, mesh.iso_value()) ^ entry.inverse {
        joined_mask |= 1 << bit;
      }
    }

    match case.resolution(joined_mask).ok_or_else(unknown)? {
      Resolution::Polygons(polygons) => {
        let reverse = entry.inverse ^ self.mirrored;
        for template in polygons {
          let mut vertices: SmallVec<[usize; 6]> = SmallVec::new();
          let mut faces: SmallVec<[FaceMask; 6]> = SmallVec::new();
          for &[a, b] in template {
            let (ca, cb) = (g[a as usize], g[b as usize]);
            let (sa, sb) = (&corners[ca as usize], &corners[cb as usize]);
            vertices.push(mesh.vertex_for(sa, sb, self.source)?);
            faces.push(topology.edge_faces(ca, cb));
          }
          polygon::decompose_in_cell(mesh, &vertices, &faces, reverse);
        }
        Ok(())
      }
      Resolution::Subdivide => match kind {
        CellKind::Cube | CellKind::Wedge => self.subdivide_around_centroid(kind, corners, mesh),
        CellKind::Octahedron => self.split_octahedron(corners, mesh),
        CellKind::Tetrahedron | CellKind::Pyramid => Err(unknown()),
      },
    }
  }

  /// Fan the cell into one sub-cell per face, sharing a synthesized apex at
  /// the centroid.
  fn subdivide_around_centroid(
    &self,
    kind: CellKind,
    corners: &[Sample],
    mesh: &mut IsoMesh,
  ) -> Result<(), IsoError> {
    let centroid = corners
      .iter()
      .fold(DVec3::ZERO, |sum, s| sum + DVec3::from_array(s.xi))
      / corners.len() as f64;
    let xi = centroid.to_array();
    let apex = Sample::exact(xi, self.source.scalar_at(xi)?);
    tracing::trace!(%kind, ?xi, scalar = apex.scalar, "subdividing cell");

    let corner = |c: u8| corners[c as usize];
    for face in kind.topology().faces {
      match **face {
        // Pyramid base [0, 2, 3, 1] runs along the face.
        [a, b, c, d] => self.cross(
          CellKind::Pyramid,
          &[corner(a), corner(d), corner(b), corner(c), apex],
          mesh,
        )?,
        // Tetrahedron face [0, 2, 1] runs along the face.
        [a, b, c] => self.cross(
          CellKind::Tetrahedron,
          &[corner(a), corner(c), corner(b), apex],
          mesh,
        )?,
        _ => return Err(IsoError::UnknownCaseId { kind, case: 0 }),
      }
    }
    Ok(())
  }

  /// Split into four tetrahedra sharing the 0-3 diagonal.
  fn split_octahedron(&self, corners: &[Sample], mesh: &mut IsoMesh) -> Result<(), IsoError> {
    let corner = |c: u8| corners[c as usize];
    let apex = corner(OCTAHEDRON_OPPOSITE[0]);
    for face in OCTAHEDRON.faces.iter().filter(|f| f[0] == 0) {
      let (a, b, c) = (face[0], face[1], face[2]);
      self.cross(
        CellKind::Tetrahedron,
        &[corner(a), corner(c), corner(b), apex],
        mesh,
      )?;
    }
    Ok(())
  }
}

/// Corner pattern: bit `c` set when corner `c` is over the iso-value.
#[inline]
pub fn classify(corners: &[Sample], iso_value: f64) -> u8 {
  corners
    .iter()
    .enumerate()
    .filter(|(_, s)| s.scalar > iso_value)
    .fold(0u8, |pattern, (c, _)| pattern | 1 << c)
}

/// Whether some corner is over and some is not.
#[inline]
pub fn may_cross(corners: &[Sample], iso_value: f64) -> bool {
  let (min, max) = corners.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
    (lo.min(s.scalar), hi.max(s.scalar))
  });
  min <= iso_value && max > iso_value
}

/// Ambiguous-face test: the over corners of a face are joined when the mean
/// of its four scalars is over the iso-value.
///
/// The scalars are sorted before summing, so every ordering of the same face
/// gives a bit-identical answer.
#[inline]
pub fn face_is_joined(scalars: [f64; 4], iso_value: f64) -> bool {
  let mut s = scalars;
  // Optimal 4-element sorting network
  for (i, j) in [(0, 1), (2, 3), (0, 2), (1, 3), (1, 2)] {
    if s[j] < s[i] {
      s.swap(i, j);
    }
  }
  (s[0] + s[1] + s[2] + s[3]) * 0.25 > iso_value
}

#[cfg(test)]
#[path = "crossing_test.rs"]
mod crossing_test;
