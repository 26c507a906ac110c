//! Per-iso-value mesh accumulation with the shared-vertex cache.
//!
//! Every crossing vertex is keyed by the [`PointPair`] of the edge it lies on.
//! The first cell to cross an edge materializes the vertex; every later cell
//! sharing the edge gets the cached index back.

use std::collections::{BTreeMap, HashMap};

use glam::DVec3;
use smallvec::SmallVec;

use crate::error::IsoError;
use crate::point_index::{PointIndex, PointPair};

/// One corner sample handed to the crossing routines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
  pub point: PointIndex,
  /// Parametric location. May differ from the lattice key on wrapped axes.
  pub xi: [f64; 3],
  pub scalar: f64,
}

impl Sample {
  #[inline]
  pub fn new(point: PointIndex, xi: [f64; 3], scalar: f64) -> Self {
    Self { point, xi, scalar }
  }

  /// Synthesized sample at an exact xi.
  #[inline]
  pub fn exact(xi: [f64; 3], scalar: f64) -> Self {
    Self {
      point: PointIndex::exact(xi, scalar),
      xi,
      scalar,
    }
  }
}

/// Field access needed while crossing cells.
pub trait VertexSource {
  /// Scalar value at an arbitrary xi.
  fn scalar_at(&self, xi: [f64; 3]) -> Result<f64, IsoError>;

  /// Fully evaluated vertex at xi.
  fn vertex_at(&self, xi: [f64; 3]) -> Result<IsoVertex, IsoError>;

  /// Location `r` of the way from `a` to `b`.
  fn crossing_xi(&self, a: &Sample, b: &Sample, r: f64) -> [f64; 3] {
    let xa = DVec3::from_array(a.xi);
    let xb = DVec3::from_array(b.xi);
    xa.lerp(xb, r).to_array()
  }
}

/// A crossing vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct IsoVertex {
  pub xi: [f64; 3],
  pub position: [f64; 3],
  /// Zero-padded to three components.
  pub texture_coordinate: Option<[f64; 3]>,
  /// Empty when no data field is configured.
  pub data: SmallVec<[f64; 4]>,
}

impl IsoVertex {
  /// Vertex with only a position.
  pub fn at(xi: [f64; 3], position: [f64; 3]) -> Self {
    Self {
      xi,
      position,
      texture_coordinate: None,
      data: SmallVec::new(),
    }
  }
}

/// Three vertex indices into the owning mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IsoTriangle(pub [usize; 3]);

/// Iso-value index → mesh, ascending.
pub type MeshMap = BTreeMap<usize, IsoMesh>;

/// Vertices and triangles for exactly one iso-value.
#[derive(Clone, Debug)]
pub struct IsoMesh {
  iso_value: f64,
  vertices: Vec<IsoVertex>,
  cache: HashMap<PointPair, usize>,
  triangles: Vec<IsoTriangle>,
}

impl IsoMesh {
  pub fn new(iso_value: f64) -> Self {
    Self {
      iso_value,
      vertices: Vec::new(),
      cache: HashMap::new(),
      triangles: Vec::new(),
    }
  }

  #[inline]
  pub fn iso_value(&self) -> f64 {
    self.iso_value
  }

  #[inline]
  pub fn vertices(&self) -> &[IsoVertex] {
    &self.vertices
  }

  #[inline]
  pub fn triangles(&self) -> &[IsoTriangle] {
    &self.triangles
  }

  pub fn vertex_count(&self) -> usize {
    self.vertices.len()
  }

  pub fn triangle_count(&self) -> usize {
    self.triangles.len()
  }

  /// Returns true if no triangle was emitted.
  pub fn is_empty(&self) -> bool {
    self.triangles.is_empty()
  }

  /// World position of a vertex.
  #[inline]
  pub fn position(&self, vertex: usize) -> [f64; 3] {
    self.vertices[vertex].position
  }

  /// Cached vertex for an edge, if already materialized.
  pub fn cached(&self, a: &PointIndex, b: &PointIndex) -> Option<usize> {
    self.cache.get(&PointPair::new(*a, *b)).copied()
  }

  /// Index of the crossing vertex on edge `a`–`b`, materializing it on a miss.
  pub fn vertex_for<S>(&mut self, a: &Sample, b: &Sample, source: &S) -> Result<usize, IsoError>
  where
    S: VertexSource + ?Sized,
  {
    let key = PointPair::new(a.point, b.point);
    if let Some(&index) = self.cache.get(&key) {
      return Ok(index);
    }

    // Interpolate from the canonical end so the result is independent of
    // which cell asks first.
    let (a, b) = if b.point < a.point { (b, a) } else { (a, b) };
    let xi = source.crossing_xi(a, b, crossing_ratio(a, b, self.iso_value));
    let vertex = source.vertex_at(xi)?;

    let index = self.vertices.len();
    self.vertices.push(vertex);
    self.cache.insert(key, index);
    Ok(index)
  }

  /// Append an uncached vertex.
  #[cfg(test)]
  pub(crate) fn push_vertex(&mut self, position: [f64; 3]) -> usize {
    self.vertices.push(IsoVertex::at(position, position));
    self.vertices.len() - 1
  }

  /// Append a triangle unless two of its corners coincide in world space.
  pub fn add_triangle(&mut self, corners: [usize; 3]) -> bool {
    let [p0, p1, p2] = corners.map(|c| self.vertices[c].position);
    if p0 == p1 || p1 == p2 || p0 == p2 {
      return false;
    }
    self.triangles.push(IsoTriangle(corners));
    true
  }
}

/// Fraction of the way from `a` to `b` where the scalar meets the iso-value.
fn crossing_ratio(a: &Sample, b: &Sample, iso_value: f64) -> f64 {
  let r = (iso_value - a.scalar) / (b.scalar - a.scalar);
  if r.is_finite() {
    r.clamp(0.0, 1.0)
  } else {
    0.5
  }
}

#[cfg(test)]
#[path = "mesh_test.rs"]
mod mesh_test;
