use std::f64::consts::TAU;
use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::*;
use crate::crossing::face_is_joined;
use crate::error::ErrorKind;
use crate::field::{Field, FieldRole, FnField, IsoValues};
use crate::shape::ShapeClass;
use crate::test_utils::{
  assert_oriented_manifold, on_unit_cube_boundary, ConstantWidthField, FailingField,
  IdentityField, ScalarField,
};

const EPS: f64 = 1e-9;

fn tables() -> Arc<CaseTables> {
  static TABLES: OnceLock<Arc<CaseTables>> = OnceLock::new();
  TABLES.get_or_init(|| Arc::new(CaseTables::new())).clone()
}

fn builder(counts: [u32; 3]) -> IsoSurfaceBuilder {
  IsoSurfaceBuilder::new(tables(), SweepConfig::new().with_number_in_xi(counts))
}

fn list(values: &[f64]) -> IsoValues {
  IsoValues::List(values.to_vec())
}

/// Sum of a few random plane waves.
struct Waves {
  terms: Vec<([f64; 3], f64, f64)>,
}

impl Waves {
  fn random(rng: &mut StdRng) -> Self {
    let terms = (0..4)
      .map(|_| {
        let frequency = [0; 3].map(|_| rng.random_range(-1.5..1.5));
        (frequency, rng.random_range(0.0..TAU), rng.random_range(0.3..1.0))
      })
      .collect();
    Self { terms }
  }

  fn value(&self, p: [f64; 3]) -> f64 {
    self
      .terms
      .iter()
      .map(|(k, phase, amplitude)| {
        amplitude * (TAU * (k[0] * p[0] + k[1] * p[1] + k[2] * p[2]) + phase).sin()
      })
      .sum()
  }
}

/// Polar position of a polygon prism with angular, radial and line axes.
fn polar([angular, radial, line]: [usize; 3], xi: [f64; 3]) -> [f64; 3] {
  let theta = TAU * xi[angular];
  [xi[radial] * theta.cos(), xi[radial] * theta.sin(), xi[line]]
}

fn polar_field(axes: [usize; 3]) -> impl Field {
  FnField::new(3, move |xi, _time, out| {
    out.copy_from_slice(&polar(axes, xi));
    Ok(())
  })
}

fn on_face(a: [f64; 3], b: [f64; 3], face: impl Fn([f64; 3]) -> bool) -> bool {
  face(a) && face(b)
}

// =============================================================================
// Reference cases
// =============================================================================

#[test]
fn test_unit_cube_single_crossing() {
  let scalar = ScalarField::new(|xi| 1.0 - xi[0]);
  let spec = IsoSpec::new(&IdentityField, &scalar, list(&[0.5]));

  let meshes = builder([1, 1, 1]).sweep(&spec, &CellShape::cube()).unwrap();
  assert_eq!(meshes.len(), 1);
  let mesh = &meshes[&0];
  assert_eq!(mesh.triangle_count(), 2);
  assert_eq!(mesh.vertex_count(), 4);
  for vertex in mesh.vertices() {
    assert!((vertex.position[0] - 0.5).abs() < EPS);
    assert!(vertex.position[1] == 0.0 || vertex.position[1] == 1.0);
    assert!(vertex.position[2] == 0.0 || vertex.position[2] == 1.0);
  }

  let surfaces = builder([1, 1, 1]).build(&spec, &CellShape::cube()).unwrap();
  assert_eq!(surfaces.len(), 1);
  let normal = surfaces[0].vertices[0].normal;
  assert_eq!(normal[0].abs(), 1.0);
  assert!(surfaces[0].vertices.iter().all(|v| v.normal == normal));
}

#[test]
fn test_tetrahedron_single_corner() {
  let scalar = ScalarField::new(|xi| xi[2]);
  let spec = IsoSpec::new(&IdentityField, &scalar, list(&[0.5]));

  let meshes = builder([1, 1, 1])
    .sweep(&spec, &CellShape::tetrahedron())
    .unwrap();
  let mesh = &meshes[&0];
  assert_eq!(mesh.triangle_count(), 1);

  let mut positions: Vec<[f64; 3]> = mesh.vertices().iter().map(|v| v.position).collect();
  positions.sort_by(|a, b| a.partial_cmp(b).unwrap());
  assert_eq!(
    positions,
    vec![[0.0, 0.0, 0.5], [0.0, 0.5, 0.5], [0.5, 0.0, 0.5]]
  );
}

#[test]
fn test_multiple_iso_values_are_independent() {
  let scalar = ScalarField::new(|xi| xi[0]);
  let spec = IsoSpec::new(&IdentityField, &scalar, list(&[0.2, 0.5, 0.8]));

  let meshes = builder([1, 1, 1]).sweep(&spec, &CellShape::cube()).unwrap();
  assert_eq!(meshes.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
  for (index, mesh) in &meshes {
    assert_eq!(mesh.triangle_count(), 2);
    assert_eq!(mesh.vertex_count(), 4);
    let iso = [0.2, 0.5, 0.8][*index];
    assert_eq!(mesh.iso_value(), iso);
    assert!(mesh
      .vertices()
      .iter()
      .all(|v| (v.position[0] - iso).abs() < EPS));
  }
}

#[test]
fn test_iso_range_resolved() {
  let scalar = ScalarField::new(|xi| xi[1]);
  let range = IsoValues::Range {
    first: 0.25,
    last: 0.75,
    count: 3,
  };
  let spec = IsoSpec::new(&IdentityField, &scalar, range);

  let surfaces = builder([2, 2, 2]).build(&spec, &CellShape::cube()).unwrap();
  let values: Vec<f64> = surfaces.iter().map(|s| s.iso_value).collect();
  assert_eq!(values, vec![0.25, 0.5, 0.75]);
  // Iso 0.5 runs along the lattice plane y = 0.5 and still yields a surface
  for surface in &surfaces {
    let y = surface.iso_value as f32;
    assert!(surface.vertices.iter().all(|v| (v.position[1] - y).abs() < 1e-6));
  }
}

#[test]
fn test_time_reaches_fields() {
  let scalar = FnField::new(1, |xi, time, out| {
    out[0] = xi[0] - time;
    Ok(())
  });
  let spec = IsoSpec::new(&IdentityField, &scalar, list(&[0.0]));
  let builder = IsoSurfaceBuilder::new(tables(), SweepConfig::new().with_time(0.25));

  let meshes = builder.sweep(&spec, &CellShape::cube()).unwrap();
  assert!(meshes[&0]
    .vertices()
    .iter()
    .all(|v| (v.position[0] - 0.25).abs() < EPS));
}

#[test]
fn test_no_crossing_yields_nothing() {
  let scalar = ScalarField::new(|xi| xi[0]);
  let spec = IsoSpec::new(&IdentityField, &scalar, list(&[5.0, -5.0]));

  let meshes = builder([3, 3, 3]).sweep(&spec, &CellShape::cube()).unwrap();
  assert!(meshes.is_empty());
  let surfaces = builder([3, 3, 3]).build(&spec, &CellShape::cube()).unwrap();
  assert!(surfaces.is_empty());
}

#[test]
fn test_texture_and_data_reach_output() {
  let scalar = ScalarField::new(|xi| xi[2]);
  let texture = FnField::new(1, |xi, _time, out| {
    out[0] = xi[0];
    Ok(())
  });
  let data = ConstantWidthField(2);
  let spec = IsoSpec::new(&IdentityField, &scalar, list(&[0.5]))
    .with_texture_coordinate(&texture)
    .with_data(&data);

  let surfaces = builder([2, 2, 1]).build(&spec, &CellShape::cube()).unwrap();
  assert_eq!(surfaces[0].triangle_count(), 8);
  for vertex in &surfaces[0].vertices {
    let [x, y, z] = vertex.position;
    assert_eq!(vertex.texture_coordinate, Some([x, 0.0, 0.0]));
    assert_eq!(vertex.data.len(), 2);
    assert!((vertex.data[0] - (x + y + z)).abs() < 1e-6);
  }
}

// =============================================================================
// Sampling
// =============================================================================

#[test]
fn test_each_node_sampled_once() {
  let cases = [
    (CellShape::cube(), [2, 3, 4], 3 * 4 * 5),
    (CellShape::triangular_prism(2).unwrap(), [3, 3, 1], 10 * 2),
    // 4 angles × 2 rings + centre, on 2 planes
    (CellShape::polygon_prism(2, 4).unwrap(), [4, 2, 1], (4 * 2 + 1) * 2),
    (CellShape::tetrahedron(), [2, 2, 2], 10),
  ];

  for (shape, counts, expected) in cases {
    let scalar = ScalarField::new(|xi| xi[0] + 0.5 * xi[1] + 0.25 * xi[2]);
    let spec = IsoSpec::new(&IdentityField, &scalar, list(&[0.4]));
    builder(counts).sweep(&spec, &shape).unwrap();
    assert_eq!(scalar.calls(), expected, "{shape:?}");
  }
}

#[test]
fn test_sweep_is_repeatable() {
  let mut rng = StdRng::seed_from_u64(7);
  let waves = Waves::random(&mut rng);
  let scalar = ScalarField::new(|xi| waves.value(xi));
  let spec = IsoSpec::new(&IdentityField, &scalar, list(&[-0.2, 0.0, 0.3]));
  let builder = builder([5, 4, 6]);

  let first = builder.sweep(&spec, &CellShape::cube()).unwrap();
  let second = builder.sweep(&spec, &CellShape::cube()).unwrap();
  assert_eq!(first.len(), second.len());
  for (index, mesh) in &first {
    let other = &second[index];
    assert_eq!(mesh.vertices(), other.vertices());
    assert_eq!(mesh.triangles(), other.triangles());
  }
}

#[test]
fn test_concurrent_sweeps_share_tables() {
  let builder = builder([4, 4, 4]);
  let counts: Vec<usize> = (0..4)
    .into_par_iter()
    .map(|i| {
      let scalar = ScalarField::new(move |xi| xi[0] + xi[1] - 0.1 * i as f64);
      let spec = IsoSpec::new(&IdentityField, &scalar, list(&[0.9]));
      builder.build(&spec, &CellShape::cube()).unwrap()[0].triangle_count()
    })
    .collect();
  assert!(counts.iter().all(|&c| c > 0));
}

#[test]
fn test_build_timed_reports_totals() {
  let scalar = ScalarField::new(|xi| xi[0] + xi[2]);
  let spec = IsoSpec::new(&IdentityField, &scalar, list(&[0.5, 0.9, 10.0]));

  let (surfaces, stats) = builder([3, 3, 3])
    .build_timed(&spec, &CellShape::cube())
    .unwrap();
  assert_eq!(stats.surface_count, 2);
  assert_eq!(stats.surface_count, surfaces.len());
  assert_eq!(
    stats.triangle_count,
    surfaces.iter().map(|s| s.triangle_count()).sum::<usize>()
  );
  assert_eq!(stats.vertex_count, stats.triangle_count * 3);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_invalid_input_rejected_before_sampling() {
  let scalar = ScalarField::new(|xi| xi[0]);
  let wide = ConstantWidthField(2);

  let spec = IsoSpec::new(&IdentityField, &scalar, list(&[0.5]));
  let err = builder([2, 0, 2]).sweep(&spec, &CellShape::cube()).unwrap_err();
  assert!(matches!(err, IsoError::InvalidSampleCount { axis: 1 }));

  let spec = IsoSpec::new(&wide, &scalar, list(&[0.5]));
  let err = builder([2, 2, 2]).sweep(&spec, &CellShape::cube()).unwrap_err();
  assert!(matches!(
    err,
    IsoError::ComponentMismatch {
      role: FieldRole::Coordinate,
      actual: 2,
      ..
    }
  ));

  let spec = IsoSpec::new(&IdentityField, &scalar, list(&[]));
  let err = builder([2, 2, 2]).sweep(&spec, &CellShape::cube()).unwrap_err();
  assert!(matches!(err, IsoError::NoIsoValues));

  let spec = IsoSpec::new(&IdentityField, &scalar, list(&[0.5, f64::NAN]));
  let err = builder([2, 2, 2]).sweep(&spec, &CellShape::cube()).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidInput);

  assert_eq!(scalar.calls(), 0);
}

#[test]
fn test_scalar_failure_aborts_sweep() {
  let scalar = FailingField::after(10, 1);
  let spec = IsoSpec::new(&IdentityField, &scalar, list(&[0.5]));

  let err = builder([2, 2, 2]).build(&spec, &CellShape::cube()).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::EvaluationFailure);
  assert!(matches!(
    err,
    IsoError::EvaluationFailure {
      role: FieldRole::Scalar,
      ..
    }
  ));
}

#[test]
fn test_coordinate_failure_aborts_sweep() {
  let scalar = ScalarField::new(|xi| xi[0]);
  let coordinates = FailingField::after(3, 3);
  let spec = IsoSpec::new(&coordinates, &scalar, list(&[0.5]));

  let err = builder([2, 2, 2]).sweep(&spec, &CellShape::cube()).unwrap_err();
  assert!(matches!(
    err,
    IsoError::EvaluationFailure {
      role: FieldRole::Coordinate,
      ..
    }
  ));
}

// =============================================================================
// Randomized surface checks
// =============================================================================

const ISO_VALUES: [f64; 3] = [-0.4, 0.0, 0.35];

/// Check every mesh and return the total triangle count.
fn assert_all_manifold(
  meshes: &MeshMap,
  on_boundary: impl Fn([f64; 3], [f64; 3]) -> bool,
) -> usize {
  for mesh in meshes.values() {
    assert_oriented_manifold(mesh, &on_boundary);
  }
  meshes.values().map(IsoMesh::triangle_count).sum()
}

/// Trilinear interpolation over two cubes side by side along xi1, with node
/// values indexed by `[i][j][k]` and nodes at xi1 = 0, 0.5, 1.
fn two_cube_field(values: [[[f64; 2]; 2]; 3]) -> impl Fn([f64; 3]) -> f64 {
  move |xi| {
    let x = xi[0] * 2.0;
    let i = (x.floor() as usize).min(1);
    let tx = x - i as f64;
    let lerp = |a: f64, b: f64, t: f64| a + (b - a) * t;
    let along_x = |j: usize, k: usize| lerp(values[i][j][k], values[i + 1][j][k], tx);
    lerp(
      lerp(along_x(0, 0), along_x(1, 0), xi[1]),
      lerp(along_x(0, 1), along_x(1, 1), xi[1]),
      xi[2],
    )
  }
}

#[test]
fn test_subdivided_cube_meets_neighbour_across_ambiguous_face() {
  // Left cube: corners 0, 3, 5 over with the -Y and -Z faces joined, so it
  // fans around its centroid. The shared face x = 0.5 alternates and is
  // separated; the right cube has its two under corners on that face.
  let values = [
    [[6.0, 0.0], [0.0, 0.0]],
    [[0.45, 0.54], [0.54, 0.45]],
    [[0.8, 0.8], [0.8, 0.8]],
  ];
  assert!(!face_is_joined([0.45, 0.54, 0.45, 0.54], 0.5));

  let scalar = ScalarField::new(two_cube_field(values));
  let spec = IsoSpec::new(&IdentityField, &scalar, list(&[0.5]));
  let meshes = builder([2, 1, 1]).sweep(&spec, &CellShape::cube()).unwrap();

  // 12 nodes plus the left centroid
  assert_eq!(scalar.calls(), 13);
  let mesh = &meshes[&0];
  assert!(mesh.triangle_count() > 0);
  assert_oriented_manifold(mesh, on_unit_cube_boundary);

  // Nothing lies flat in the shared face
  for triangle in mesh.triangles() {
    let flat = triangle
      .0
      .iter()
      .all(|&v| (mesh.vertices()[v].xi[0] - 0.5).abs() < EPS);
    assert!(!flat, "triangle {triangle:?} lies in the shared face");
  }
}

#[test]
fn test_random_cube_sweeps_are_closed() {
  let mut triangles = 0;
  for seed in 0..6 {
    let mut rng = StdRng::seed_from_u64(seed);
    let waves = Waves::random(&mut rng);
    let counts = [0; 3].map(|_| rng.random_range(2..6));
    let scalar = ScalarField::new(|xi| waves.value(xi));
    let spec = IsoSpec::new(&IdentityField, &scalar, list(&ISO_VALUES));

    let meshes = builder(counts).sweep(&spec, &CellShape::cube()).unwrap();
    triangles += assert_all_manifold(&meshes, on_unit_cube_boundary);
  }
  assert!(triangles > 0);
}

#[test]
fn test_random_prism_sweeps_are_closed() {
  let mut triangles = 0;
  for line in 0..3 {
    for seed in 0..4 {
      let mut rng = StdRng::seed_from_u64(seed * 3 + line as u64);
      let waves = Waves::random(&mut rng);
      let counts = [0; 3].map(|_| rng.random_range(2..6));
      let scalar = ScalarField::new(|xi| waves.value(xi));
      let spec = IsoSpec::new(&IdentityField, &scalar, list(&ISO_VALUES));
      let shape = CellShape::triangular_prism(line).unwrap();
      let ShapeClass::SimplexPrism { plane: [a, b], .. } = shape.class() else {
        unreachable!()
      };

      let meshes = builder(counts).sweep(&spec, &shape).unwrap();
      triangles += assert_all_manifold(&meshes, |p, q| {
        on_face(p, q, |x| x[line].abs() < EPS || (x[line] - 1.0).abs() < EPS)
          || on_face(p, q, |x| x[a].abs() < EPS)
          || on_face(p, q, |x| x[b].abs() < EPS)
          || on_face(p, q, |x| (x[a] + x[b] - 1.0).abs() < EPS)
      });
    }
  }
  assert!(triangles > 0);
}

#[test]
fn test_random_polygon_sweeps_are_closed() {
  let mut triangles = 0;
  for (line, vertex_count) in [(2, 3), (0, 5), (1, 4)] {
    let shape = CellShape::polygon_prism(line, vertex_count).unwrap();
    let ShapeClass::PolygonPrism {
      angular, radial, ..
    } = shape.class()
    else {
      unreachable!()
    };
    let axes = [angular, radial, line];
    let coordinates = polar_field(axes);

    for seed in 0..4 {
      let mut rng = StdRng::seed_from_u64(100 + seed);
      let waves = Waves::random(&mut rng);
      let counts = [0; 3].map(|_| rng.random_range(2..7));
      let scalar = ScalarField::new(|xi| waves.value(polar(axes, xi)));
      let spec = IsoSpec::new(&coordinates, &scalar, list(&ISO_VALUES));

      let meshes = builder(counts).sweep(&spec, &shape).unwrap();
      triangles += assert_all_manifold(&meshes, |p, q| {
        on_face(p, q, |x| x[line].abs() < EPS || (x[line] - 1.0).abs() < EPS)
          || on_face(p, q, |x| (x[radial] - 1.0).abs() < EPS)
      });
    }
  }
  assert!(triangles > 0);
}

#[test]
fn test_random_tetrahedron_sweeps_are_closed() {
  let mut triangles = 0;
  for seed in 0..6 {
    let mut rng = StdRng::seed_from_u64(200 + seed);
    let waves = Waves::random(&mut rng);
    let n = rng.random_range(2..7);
    let scalar = ScalarField::new(|xi| waves.value(xi));
    let spec = IsoSpec::new(&IdentityField, &scalar, list(&ISO_VALUES));

    let meshes = builder([n, 1, 1])
      .sweep(&spec, &CellShape::tetrahedron())
      .unwrap();
    triangles += assert_all_manifold(&meshes, |p, q| {
      (0..3).any(|axis| on_face(p, q, |x| x[axis].abs() < EPS))
        || on_face(p, q, |x| (x[0] + x[1] + x[2] - 1.0).abs() < EPS)
    });
  }
  assert!(triangles > 0);
}

#[test]
fn test_orientation_agrees_across_shapes() {
  let gradient = [1.0f32, 2.0, 3.0];
  let scalar = ScalarField::new(|xi| xi[0] + 2.0 * xi[1] + 3.0 * xi[2]);
  let spec = IsoSpec::new(&IdentityField, &scalar, list(&[1.1, 2.5]));

  let mut shapes = vec![CellShape::cube(), CellShape::tetrahedron()];
  shapes.extend((0..3).map(|line| CellShape::triangular_prism(line).unwrap()));

  let mut signs = Vec::new();
  for shape in shapes {
    let surfaces = builder([3, 3, 3]).build(&spec, &shape).unwrap();
    assert!(!surfaces.is_empty(), "{shape:?}");
    for vertex in surfaces.iter().flat_map(|s| &s.vertices) {
      let dot: f32 = (0..3).map(|i| vertex.normal[i] * gradient[i]).sum();
      signs.push(dot.signum());
    }
  }

  // Polygon prism around z: surface is a horizontal disc
  let disc = ScalarField::new(|xi| xi[2]);
  let coordinates = polar_field([0, 1, 2]);
  let spec = IsoSpec::new(&coordinates, &disc, list(&[0.3]));
  let shape = CellShape::polygon_prism(2, 6).unwrap();
  let surfaces = builder([6, 2, 2]).build(&spec, &shape).unwrap();
  for vertex in &surfaces[0].vertices {
    signs.push(vertex.normal[2].signum());
  }

  assert!(signs.iter().all(|&s| s == signs[0]), "mixed orientation");
}

#[test]
fn test_reverse_normals_flips_every_triangle() {
  let scalar = ScalarField::new(|xi| xi[0] * xi[1] + xi[2]);
  let spec = IsoSpec::new(&IdentityField, &scalar, list(&[0.6]));
  let forward = builder([3, 3, 3]).build(&spec, &CellShape::cube()).unwrap();
  let reversed = IsoSurfaceBuilder::new(
    tables(),
    SweepConfig::new()
      .with_number_in_xi([3, 3, 3])
      .with_reverse_normals(true),
  )
  .build(&spec, &CellShape::cube())
  .unwrap();

  assert_eq!(forward[0].vertices.len(), reversed[0].vertices.len());
  for (f, r) in forward[0].triangles().zip(reversed[0].triangles()) {
    assert_eq!(f[0].position, r[0].position);
    assert_eq!(f[1].position, r[2].position);
    if f[0].normal != [0.0, 1.0, 0.0] {
      assert_eq!(f[0].normal.map(|x| -x), r[0].normal);
    }
  }
}
