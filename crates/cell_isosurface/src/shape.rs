//! Cell shape contract: per-axis classification reported by the mesh layer.
//!
//! ```text
//! Line, Line, Line                     cube
//! Simplex(b), Simplex(a), Line         triangular prism (wedge) over axes a, b
//! Polygon(b, n), Polygon(a, n), Line   n-gon prism; lower axis angular,
//!                                      higher axis radial
//! Simplex, Simplex, Simplex            tetrahedron (links connect all three)
//! ```

use crate::error::IsoError;

/// Shape of one xi axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisShape {
  Line,
  /// Simplex-linked with `partner`.
  Simplex { partner: usize },
  /// Polygon-linked with `partner`; the polygon has `vertex_count` sides.
  Polygon { partner: usize, vertex_count: u32 },
}

/// Validated decomposition family of a 3-D cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeClass {
  Cube,
  /// Triangle in `plane`, extruded along `line`.
  SimplexPrism { plane: [usize; 2], line: usize },
  /// Polygon over (`angular`, `radial`), extruded along `line`.
  PolygonPrism {
    angular: usize,
    radial: usize,
    line: usize,
    vertex_count: u32,
  },
  Tetrahedron,
}

/// A validated 3-D cell shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellShape {
  axes: [AxisShape; 3],
  class: ShapeClass,
}

impl CellShape {
  /// Validate per-axis shapes. Only 3-D cells are supported.
  pub fn new(axes: &[AxisShape]) -> Result<Self, IsoError> {
    let axes: [AxisShape; 3] = axes
      .try_into()
      .map_err(|_| IsoError::UnsupportedDimension(axes.len()))?;

    for (axis, shape) in axes.iter().enumerate() {
      if let AxisShape::Simplex { partner } | AxisShape::Polygon { partner, .. } = *shape {
        if partner >= 3 || partner == axis {
          return Err(invalid(format!("axis {axis} links to axis {partner}")));
        }
      }
    }

    let lines: Vec<usize> = (0..3).filter(|&a| axes[a] == AxisShape::Line).collect();
    let simplex = (0..3)
      .filter(|&a| matches!(axes[a], AxisShape::Simplex { .. }))
      .count();
    let polygon = (0..3)
      .filter(|&a| matches!(axes[a], AxisShape::Polygon { .. }))
      .count();

    let class = match (lines.len(), simplex, polygon) {
      (3, 0, 0) => ShapeClass::Cube,
      (0, 3, 0) => ShapeClass::Tetrahedron,
      (1, 2, 0) => {
        let line = lines[0];
        let [a, b] = other_axes(line);
        let linked = axes[a] == AxisShape::Simplex { partner: b }
          && axes[b] == AxisShape::Simplex { partner: a };
        if !linked {
          return Err(invalid(format!(
            "simplex axes {a} and {b} must link to each other"
          )));
        }
        ShapeClass::SimplexPrism { plane: [a, b], line }
      }
      (1, 0, 2) => {
        let line = lines[0];
        let [a, b] = other_axes(line);
        let (
          AxisShape::Polygon {
            partner: pa,
            vertex_count: na,
          },
          AxisShape::Polygon {
            partner: pb,
            vertex_count: nb,
          },
        ) = (axes[a], axes[b])
        else {
          return Err(invalid("polygon axes must come in a pair".into()));
        };
        if pa != b || pb != a {
          return Err(invalid(format!(
            "polygon axes {a} and {b} must link to each other"
          )));
        }
        if na != nb {
          return Err(invalid(format!(
            "polygon vertex counts differ ({na} and {nb})"
          )));
        }
        if na < 3 {
          return Err(invalid(format!(
            "polygon needs at least 3 vertices, got {na}"
          )));
        }
        ShapeClass::PolygonPrism {
          angular: a,
          radial: b,
          line,
          vertex_count: na,
        }
      }
      _ => {
        return Err(invalid(format!(
          "unsupported axis combination ({} line, {simplex} simplex, {polygon} polygon)",
          lines.len()
        )))
      }
    };

    Ok(Self { axes, class })
  }

  /// Hexahedron.
  pub fn cube() -> Self {
    Self {
      axes: [AxisShape::Line; 3],
      class: ShapeClass::Cube,
    }
  }

  /// Tetrahedron over all three axes.
  pub fn tetrahedron() -> Self {
    Self {
      axes: [
        AxisShape::Simplex { partner: 1 },
        AxisShape::Simplex { partner: 2 },
        AxisShape::Simplex { partner: 0 },
      ],
      class: ShapeClass::Tetrahedron,
    }
  }

  /// Triangular prism extruded along `line_axis`.
  pub fn triangular_prism(line_axis: usize) -> Result<Self, IsoError> {
    if line_axis >= 3 {
      return Err(invalid(format!("line axis {line_axis} out of range")));
    }
    let [a, b] = other_axes(line_axis);
    let mut axes = [AxisShape::Line; 3];
    axes[a] = AxisShape::Simplex { partner: b };
    axes[b] = AxisShape::Simplex { partner: a };
    Self::new(&axes)
  }

  /// Polygon prism extruded along `line_axis`; the lower remaining axis is
  /// angular.
  pub fn polygon_prism(line_axis: usize, vertex_count: u32) -> Result<Self, IsoError> {
    if line_axis >= 3 {
      return Err(invalid(format!("line axis {line_axis} out of range")));
    }
    let [a, b] = other_axes(line_axis);
    let mut axes = [AxisShape::Line; 3];
    axes[a] = AxisShape::Polygon {
      partner: b,
      vertex_count,
    };
    axes[b] = AxisShape::Polygon {
      partner: a,
      vertex_count,
    };
    Self::new(&axes)
  }

  #[inline]
  pub fn axes(&self) -> &[AxisShape; 3] {
    &self.axes
  }

  #[inline]
  pub fn class(&self) -> ShapeClass {
    self.class
  }
}

/// The two axes other than `axis`, ascending.
#[inline]
fn other_axes(axis: usize) -> [usize; 2] {
  match axis {
    0 => [1, 2],
    1 => [0, 2],
    _ => [0, 1],
  }
}

fn invalid(message: String) -> IsoError {
  IsoError::InvalidShape(message)
}

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;
