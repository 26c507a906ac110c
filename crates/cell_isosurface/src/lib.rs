//! cell_isosurface - Iso-surface extraction inside single finite-element cells
//!
//! This crate samples a scalar field on a regular lattice in a cell's
//! parametric (xi) space and extracts one triangle mesh per requested
//! iso-value. Cubes, triangular prisms, polygon prisms and tetrahedra are
//! supported; their layers decompose into cubes, wedges, tetrahedra,
//! octahedra and (when resolving ambiguous cubes and wedges) pyramids.
//!
//! # Features
//!
//! - **Generated case tables**: Per-shape lookup of every corner pattern to a
//!   canonical case, built once from the shape's rotation group
//! - **Ambiguity resolution**: Face-mean test on ambiguous faces, with
//!   centroid subdivision for the interior-ambiguous cases
//! - **Shared vertices**: Crossings cached per lattice edge, so neighbouring
//!   sub-cells stitch without cracks
//! - **Flat-shaded output**: Triangle soups with unit normals, built in
//!   parallel across iso-values
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cell_isosurface::{CaseTables, CellShape, FnField, IsoSpec, IsoSurfaceBuilder, IsoValues,
//!   SweepConfig};
//!
//! let coordinates = FnField::new(3, |xi, _t, out| { out.copy_from_slice(&xi); Ok(()) });
//! let pressure = FnField::new(1, |xi, _t, out| { out[0] = 1.0 - xi[0]; Ok(()) });
//!
//! let tables = Arc::new(CaseTables::new());
//! let builder = IsoSurfaceBuilder::new(tables, SweepConfig::default());
//! let spec = IsoSpec::new(&coordinates, &pressure, IsoValues::List(vec![0.5]));
//! let surfaces = builder.build(&spec, &CellShape::cube())?;
//!
//! println!("{} triangles", surfaces[0].triangle_count());
//! ```

pub mod error;
pub mod types;

pub use error::{ErrorKind, IsoError};
pub use types::{IsoSurface, MinMaxAABB, SurfaceVertex, SweepConfig};

// Field evaluation contract and run specification
pub mod field;
pub use field::{Field, FieldError, FieldRole, FnField, IsoSpec, IsoValues};

// Cell shapes and their topologies
pub mod shape;
pub mod topology;
pub use shape::{AxisShape, CellShape, ShapeClass};
pub use topology::{CellKind, Topology};

// Case tables generated from rotation groups
pub mod case_table;
pub use case_table::{CaseEntry, CaseTable, CaseTables, FinalCase, Resolution};

// Per-iso-value meshes and the shared-vertex cache
pub mod mesh;
pub mod point_index;
pub use mesh::{IsoMesh, IsoTriangle, IsoVertex, MeshMap, Sample, VertexSource};
pub use point_index::{PointIndex, PointPair};

// Cell crossing and polygon decomposition
pub mod crossing;
pub mod polygon;
pub use crossing::CellCrosser;

// Sweep driver and output builder
pub mod output;
pub mod sweep;
pub use sweep::{IsoSurfaceBuilder, SweepStats};

#[cfg(test)]
pub mod test_utils;
