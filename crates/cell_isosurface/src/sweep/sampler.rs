//! Field evaluation for one sweep.

use glam::DVec3;
use smallvec::{smallvec, SmallVec};

use crate::error::IsoError;
use crate::field::{Field, FieldRole, IsoSpec};
use crate::mesh::{IsoVertex, Sample, VertexSource};

/// Evaluates the fields of an [`IsoSpec`] at a fixed time.
pub struct FieldSampler<'s, 'f> {
  spec: &'s IsoSpec<'f>,
  time: f64,
  /// Angular and radial xi axes of a polygon lattice.
  polar: Option<[usize; 2]>,
}

impl<'s, 'f> FieldSampler<'s, 'f> {
  pub fn new(spec: &'s IsoSpec<'f>, time: f64, polar: Option<[usize; 2]>) -> Self {
    Self { spec, time, polar }
  }

  fn evaluate(
    &self,
    role: FieldRole,
    field: &dyn Field,
    xi: [f64; 3],
    values: &mut [f64],
  ) -> Result<(), IsoError> {
    field
      .evaluate(xi, self.time, values)
      .map_err(|source| IsoError::EvaluationFailure { role, xi, source })
  }
}

impl VertexSource for FieldSampler<'_, '_> {
  fn scalar_at(&self, xi: [f64; 3]) -> Result<f64, IsoError> {
    let mut value = [0.0];
    self.evaluate(FieldRole::Scalar, self.spec.scalar, xi, &mut value)?;
    Ok(value[0])
  }

  fn vertex_at(&self, xi: [f64; 3]) -> Result<IsoVertex, IsoError> {
    let mut position = [0.0; 3];
    self.evaluate(FieldRole::Coordinate, self.spec.coordinate, xi, &mut position)?;
    let mut vertex = IsoVertex::at(xi, position);

    if let Some(field) = self.spec.texture_coordinate {
      let mut texture = [0.0; 3];
      let n = field.component_count();
      self.evaluate(FieldRole::TextureCoordinate, field, xi, &mut texture[..n])?;
      vertex.texture_coordinate = Some(texture);
    }

    if let Some(field) = self.spec.data {
      let mut data: SmallVec<[f64; 4]> = smallvec![0.0; field.component_count()];
      self.evaluate(FieldRole::Data, field, xi, &mut data)?;
      vertex.data = data;
    }

    Ok(vertex)
  }

  /// On a polygon lattice the centre sample takes the angle of the other end,
  /// so crossings on spokes stay on the spoke.
  fn crossing_xi(&self, a: &Sample, b: &Sample, r: f64) -> [f64; 3] {
    let (mut xa, mut xb) = (a.xi, b.xi);
    if let Some([angular, radial]) = self.polar {
      match (xa[radial] == 0.0, xb[radial] == 0.0) {
        (true, false) => xa[angular] = xb[angular],
        (false, true) => xb[angular] = xa[angular],
        _ => {}
      }
    }
    DVec3::from_array(xa)
      .lerp(DVec3::from_array(xb), r)
      .to_array()
  }
}

#[cfg(test)]
#[path = "sampler_test.rs"]
mod sampler_test;
