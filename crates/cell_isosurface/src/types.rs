//! Core data types for iso-surface extraction.

use smallvec::SmallVec;

use crate::error::IsoError;

/// Output vertex of the triangle soup.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceVertex {
  /// World position from the coordinate field.
  pub position: [f32; 3],

  /// Flat normal of the owning triangle (unit vector).
  pub normal: [f32; 3],

  /// Texture coordinate, zero-padded to three components.
  pub texture_coordinate: Option<[f32; 3]>,

  /// Data field payload; empty when no data field is configured.
  pub data: SmallVec<[f32; 4]>,
}

impl Default for SurfaceVertex {
  fn default() -> Self {
    Self {
      position: [0.0; 3],
      normal: [0.0, 1.0, 0.0],
      texture_coordinate: None,
      data: SmallVec::new(),
    }
  }
}

/// Axis-aligned bounding box.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAABB {
  pub min: [f32; 3],
  pub max: [f32; 3],
}

impl MinMaxAABB {
  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: [f32::INFINITY; 3],
      max: [f32::NEG_INFINITY; 3],
    }
  }

  /// Create AABB from min/max corners.
  pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
    Self { min, max }
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: [f32; 3]) {
    for i in 0..3 {
      self.min[i] = self.min[i].min(point[i]);
      self.max[i] = self.max[i].max(point[i]);
    }
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min[0] <= self.max[0] && self.min[1] <= self.max[1] && self.min[2] <= self.max[2]
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// Flat-shaded surface for one iso-value.
#[derive(Clone, Debug, Default)]
pub struct IsoSurface {
  /// Position of the iso-value in the requested list.
  pub iso_index: usize,

  pub iso_value: f64,

  /// Triangle soup: three consecutive vertices per triangle.
  pub vertices: Vec<SurfaceVertex>,

  /// Bounding box encompassing all vertices.
  pub bounds: MinMaxAABB,
}

impl IsoSurface {
  /// Returns true if no geometry was generated.
  pub fn is_empty(&self) -> bool {
    self.vertices.is_empty()
  }

  /// Number of triangles in the surface.
  pub fn triangle_count(&self) -> usize {
    self.vertices.len() / 3
  }

  /// Iterate triangles as vertex triples.
  pub fn triangles(&self) -> impl Iterator<Item = &[SurfaceVertex]> {
    self.vertices.chunks_exact(3)
  }
}

/// Configuration for one sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepConfig {
  /// Sample intervals along each xi axis.
  pub number_in_xi: [u32; 3],

  /// Time passed to every field evaluation.
  pub time: f64,

  /// Flip winding and normals of the output surfaces.
  pub reverse_normals: bool,
}

impl Default for SweepConfig {
  fn default() -> Self {
    Self {
      number_in_xi: [1; 3],
      time: 0.0,
      reverse_normals: false,
    }
  }
}

impl SweepConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_number_in_xi(mut self, number_in_xi: [u32; 3]) -> Self {
    self.number_in_xi = number_in_xi;
    self
  }

  pub fn with_time(mut self, time: f64) -> Self {
    self.time = time;
    self
  }

  pub fn with_reverse_normals(mut self, reverse: bool) -> Self {
    self.reverse_normals = reverse;
    self
  }

  /// Reject zero sample counts.
  pub fn validate(&self) -> Result<(), IsoError> {
    match self.number_in_xi.iter().position(|&n| n == 0) {
      Some(axis) => Err(IsoError::InvalidSampleCount { axis }),
      None => Ok(()),
    }
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
