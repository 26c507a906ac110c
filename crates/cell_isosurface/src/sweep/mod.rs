//! Sweep driver: samples the cell plane by plane and crosses each layer.
//!
//! # Usage
//!
//! ```ignore
//! let tables = Arc::new(CaseTables::new());
//! let builder = IsoSurfaceBuilder::new(tables, SweepConfig::new().with_number_in_xi([8; 3]));
//!
//! let spec = IsoSpec::new(&coordinates, &pressure, IsoValues::List(vec![0.5]));
//! let surfaces = builder.build(&spec, &CellShape::cube())?;
//! ```
//!
//! # Sweep
//!
//! ```text
//!  w = n ─── sample plane ──► slot n & 1
//!  w = n-1 ─ sample plane ──► slot (n-1) & 1 ─► cross layer (n-1, n)
//!  ...                                          every sub-cell
//!  w = 0 ─── sample plane ──► slot 0           × every iso-value it may cross
//!                                               └► mesh created on first use
//! ```
//!
//! A failed evaluation aborts the sweep; meshes built so far are discarded.

mod layout;
mod plane_buffer;
mod sampler;

use std::sync::Arc;

use smallvec::SmallVec;
use web_time::Instant;

pub use layout::{Lattice, SweepLayout};
pub use sampler::FieldSampler;

use self::plane_buffer::PlaneBuffer;
use crate::case_table::CaseTables;
use crate::crossing::{may_cross, CellCrosser};
use crate::error::IsoError;
use crate::field::IsoSpec;
use crate::mesh::{IsoMesh, MeshMap, Sample, VertexSource};
use crate::output::build_surfaces;
use crate::point_index::PointIndex;
use crate::shape::CellShape;
use crate::types::{IsoSurface, SweepConfig};

/// Statistics from a timed build.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepStats {
  /// Surfaces returned (iso-values with at least one triangle).
  pub surface_count: usize,
  pub triangle_count: usize,
  /// Output vertices (three per triangle).
  pub vertex_count: usize,
  /// Total wall time in microseconds.
  pub total_us: u64,
}

/// Extracts iso-surfaces from single cells.
///
/// Holds the shared case tables and the sweep configuration; both are
/// immutable, so one builder can serve any number of sweeps.
#[derive(Clone, Debug)]
pub struct IsoSurfaceBuilder {
  tables: Arc<CaseTables>,
  config: SweepConfig,
}

impl IsoSurfaceBuilder {
  pub fn new(tables: Arc<CaseTables>, config: SweepConfig) -> Self {
    Self { tables, config }
  }

  #[inline]
  pub fn config(&self) -> &SweepConfig {
    &self.config
  }

  #[inline]
  pub fn tables(&self) -> &Arc<CaseTables> {
    &self.tables
  }

  /// Sweep one cell into per-iso-value meshes.
  ///
  /// Input is validated before any field is sampled.
  #[tracing::instrument(skip_all, name = "sweep::sweep")]
  pub fn sweep(&self, spec: &IsoSpec<'_>, shape: &CellShape) -> Result<MeshMap, IsoError> {
    self.config.validate()?;
    spec.validate()?;
    let iso_values = spec.iso_values.resolve()?;
    let layout = SweepLayout::new(shape, self.config.number_in_xi)?;
    let sampler = FieldSampler::new(spec, self.config.time, layout.polar_axes());

    match run(&self.tables, &layout, &sampler, &iso_values) {
      Ok(meshes) => {
        tracing::debug!(
          lattice = ?layout.lattice(),
          counts = ?layout.counts(),
          iso_values = iso_values.len(),
          meshes = meshes.len(),
          triangles = meshes.values().map(IsoMesh::triangle_count).sum::<usize>(),
          "sweep complete"
        );
        Ok(meshes)
      }
      Err(err) => {
        tracing::warn!(%err, "sweep aborted");
        Err(err)
      }
    }
  }

  /// Sweep one cell and build flat-shaded surfaces, ascending by iso index.
  pub fn build(&self, spec: &IsoSpec<'_>, shape: &CellShape) -> Result<Vec<IsoSurface>, IsoError> {
    let meshes = self.sweep(spec, shape)?;
    Ok(build_surfaces(&meshes, self.config.reverse_normals))
  }

  /// [`build`](Self::build) with timing statistics.
  pub fn build_timed(
    &self,
    spec: &IsoSpec<'_>,
    shape: &CellShape,
  ) -> Result<(Vec<IsoSurface>, SweepStats), IsoError> {
    let start = Instant::now();
    let surfaces = self.build(spec, shape)?;
    let total_us = start.elapsed().as_micros() as u64;

    let stats = SweepStats {
      surface_count: surfaces.len(),
      triangle_count: surfaces.iter().map(IsoSurface::triangle_count).sum(),
      vertex_count: surfaces.iter().map(|s| s.vertices.len()).sum(),
      total_us,
    };
    Ok((surfaces, stats))
  }
}

/// Walk planes from the high boundary down, crossing each completed layer.
fn run(
  tables: &CaseTables,
  layout: &SweepLayout,
  sampler: &FieldSampler<'_, '_>,
  iso_values: &[f64],
) -> Result<MeshMap, IsoError> {
  let [nu, nv, nw] = layout.counts();
  let crosser = CellCrosser::new(tables, sampler, layout.mirrored());
  let mut planes = PlaneBuffer::new(nu as usize + 1, nv as usize + 1);
  let mut meshes = MeshMap::new();

  for w in (0..=nw).rev() {
    sample_plane(layout, sampler, &mut planes, w)?;
    if w == nw {
      continue;
    }

    let _span = tracing::trace_span!("cross_layer", w).entered();
    layout.for_each_cell(w, |kind, nodes| {
      let corners: SmallVec<[Sample; 8]> = nodes
        .iter()
        .map(|&node| {
          let point = PointIndex::Lattice(layout.key(node));
          Sample::new(point, layout.xi(node), planes.get(node))
        })
        .collect();

      for (index, &iso_value) in iso_values.iter().enumerate() {
        if !may_cross(&corners, iso_value) {
          continue;
        }
        let mesh = meshes
          .entry(index)
          .or_insert_with(|| IsoMesh::new(iso_value));
        crosser.cross(kind, &corners, mesh)?;
      }
      Ok(())
    })?;
  }

  Ok(meshes)
}

/// Evaluate the scalar at every node of plane `w`, once per distinct key.
fn sample_plane(
  layout: &SweepLayout,
  sampler: &FieldSampler<'_, '_>,
  planes: &mut PlaneBuffer,
  w: u32,
) -> Result<(), IsoError> {
  planes.clear(w);
  let [nu, nv, _] = layout.counts();
  for v in 0..=nv {
    for u in 0..=nu {
      let node = [u, v, w];
      if !layout.is_node(node) {
        continue;
      }
      // Canonical nodes come first in each row
      let canonical = layout.canonical(node);
      let scalar = if canonical == node {
        sampler.scalar_at(layout.xi(node))?
      } else {
        planes.get(canonical)
      };
      planes.set(node, scalar);
    }
  }
  Ok(())
}

#[cfg(test)]
#[path = "sweep_test.rs"]
mod sweep_test;
