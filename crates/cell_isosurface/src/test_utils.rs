//! Test utilities shared by the unit tests.
//!
//! Provides mock fields, vertex sources and mesh checks so each stage can be
//! tested in isolation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::IsoError;
use crate::field::{Field, FieldError};
use crate::mesh::{IsoMesh, IsoVertex, Sample, VertexSource};
use crate::point_index::PointIndex;
use crate::topology::CellKind;

// =============================================================================
// Mock fields
// =============================================================================

/// Coordinate field returning xi unchanged.
pub struct IdentityField;

impl Field for IdentityField {
  fn component_count(&self) -> usize {
    3
  }

  fn evaluate(&self, xi: [f64; 3], _time: f64, values: &mut [f64]) -> Result<(), FieldError> {
    values[..3].copy_from_slice(&xi);
    Ok(())
  }
}

/// Single-component field from a closure.
pub struct ScalarField<F> {
  function: F,
  calls: AtomicUsize,
}

impl<F: Fn([f64; 3]) -> f64> ScalarField<F> {
  pub fn new(function: F) -> Self {
    Self {
      function,
      calls: AtomicUsize::new(0),
    }
  }

  /// Number of evaluations so far.
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::Relaxed)
  }
}

impl<F: Fn([f64; 3]) -> f64> Field for ScalarField<F> {
  fn component_count(&self) -> usize {
    1
  }

  fn evaluate(&self, xi: [f64; 3], _time: f64, values: &mut [f64]) -> Result<(), FieldError> {
    self.calls.fetch_add(1, Ordering::Relaxed);
    values[0] = (self.function)(xi);
    Ok(())
  }
}

/// Field that fails after a number of successful evaluations.
pub struct FailingField {
  remaining: AtomicUsize,
  components: usize,
}

impl FailingField {
  pub fn after(successes: usize, components: usize) -> Self {
    Self {
      remaining: AtomicUsize::new(successes),
      components,
    }
  }
}

impl Field for FailingField {
  fn component_count(&self) -> usize {
    self.components
  }

  fn evaluate(&self, xi: [f64; 3], _time: f64, values: &mut [f64]) -> Result<(), FieldError> {
    let left = self.remaining.load(Ordering::Relaxed);
    if left == 0 {
      return Err(FieldError::new("evaluator gave up"));
    }
    self.remaining.store(left - 1, Ordering::Relaxed);
    values.fill(xi[0]);
    Ok(())
  }
}

/// Field with a fixed component count, writing the xi sum everywhere.
pub struct ConstantWidthField(pub usize);

impl Field for ConstantWidthField {
  fn component_count(&self) -> usize {
    self.0
  }

  fn evaluate(&self, xi: [f64; 3], _time: f64, values: &mut [f64]) -> Result<(), FieldError> {
    values.fill(xi[0] + xi[1] + xi[2]);
    Ok(())
  }
}

// =============================================================================
// Vertex sources
// =============================================================================

/// Vertex source with identity coordinates and a closure scalar.
pub struct XiSource<F> {
  scalar: F,
}

impl<F: Fn([f64; 3]) -> f64> XiSource<F> {
  pub fn new(scalar: F) -> Self {
    Self { scalar }
  }
}

impl<F: Fn([f64; 3]) -> f64> VertexSource for XiSource<F> {
  fn scalar_at(&self, xi: [f64; 3]) -> Result<f64, IsoError> {
    Ok((self.scalar)(xi))
  }

  fn vertex_at(&self, xi: [f64; 3]) -> Result<IsoVertex, IsoError> {
    Ok(IsoVertex::at(xi, xi))
  }
}

/// Sample at a lattice node whose xi equals its indices.
pub fn lattice_sample(ijk: [u32; 3], scalar: f64) -> Sample {
  Sample::new(PointIndex::Lattice(ijk), ijk.map(f64::from), scalar)
}

/// Reference corner locations of every shape, in corner order.
pub fn reference_corners(kind: CellKind) -> Vec<[f64; 3]> {
  let corners: &[[f64; 3]] = match kind {
    CellKind::Cube => &[
      [0., 0., 0.],
      [1., 0., 0.],
      [0., 1., 0.],
      [1., 1., 0.],
      [0., 0., 1.],
      [1., 0., 1.],
      [0., 1., 1.],
      [1., 1., 1.],
    ],
    CellKind::Tetrahedron => &[[0., 0., 0.], [1., 0., 0.], [0., 1., 0.], [0., 0., 1.]],
    CellKind::Octahedron => &[
      [1., 0., 0.],
      [0., 1., 0.],
      [0., 0., 1.],
      [0., 1., 1.],
      [1., 0., 1.],
      [1., 1., 0.],
    ],
    CellKind::Pyramid => &[
      [0., 0., 0.],
      [1., 0., 0.],
      [0., 1., 0.],
      [1., 1., 0.],
      [0.5, 0.5, 1.],
    ],
    CellKind::Wedge => &[
      [0., 0., 0.],
      [1., 0., 0.],
      [0., 1., 0.],
      [0., 0., 1.],
      [1., 0., 1.],
      [0., 1., 1.],
    ],
  };
  corners.to_vec()
}

/// Corner samples of a reference cell. Lattice keys are the doubled xi so the
/// pyramid apex stays on the lattice.
pub fn cell_samples(kind: CellKind, scalars: &[f64]) -> Vec<Sample> {
  reference_corners(kind)
    .into_iter()
    .zip(scalars)
    .map(|(xi, &scalar)| {
      let key = xi.map(|x| (x * 2.0) as u32);
      Sample::new(PointIndex::Lattice(key), xi, scalar)
    })
    .collect()
}

// =============================================================================
// Mesh checks
// =============================================================================

/// Assert every directed edge is used once and every undirected edge twice,
/// except edges `on_boundary` accepts (given both endpoint xi), which may be
/// used once.
pub fn assert_oriented_manifold(mesh: &IsoMesh, on_boundary: impl Fn([f64; 3], [f64; 3]) -> bool) {
  let mut directed: HashMap<(usize, usize), usize> = HashMap::new();
  for triangle in mesh.triangles() {
    let [a, b, c] = triangle.0;
    for edge in [(a, b), (b, c), (c, a)] {
      *directed.entry(edge).or_default() += 1;
    }
  }

  for (&(a, b), &count) in &directed {
    assert_eq!(count, 1, "directed edge {a}->{b} used {count} times");
    if !directed.contains_key(&(b, a)) {
      let (xa, xb) = (mesh.vertices()[a].xi, mesh.vertices()[b].xi);
      assert!(
        on_boundary(xa, xb),
        "interior edge {xa:?} -> {xb:?} has no opposite twin"
      );
    }
  }
}

/// Both points lie on a common face of the unit cube.
pub fn on_unit_cube_boundary(a: [f64; 3], b: [f64; 3]) -> bool {
  const EPS: f64 = 1e-9;
  (0..3).any(|axis| {
    (a[axis].abs() < EPS && b[axis].abs() < EPS)
      || ((a[axis] - 1.0).abs() < EPS && (b[axis] - 1.0).abs() < EPS)
  })
}
