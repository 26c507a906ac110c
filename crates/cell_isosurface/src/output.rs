//! Output builder: turns per-iso-value meshes into flat-shaded triangle soups.
//!
//! Meshes for different iso-values share nothing, so they are built in
//! parallel. Each triangle gets three fresh vertices carrying the triangle's
//! unit normal.

use glam::DVec3;
use rayon::prelude::*;

use crate::mesh::{IsoMesh, IsoVertex, MeshMap};
use crate::types::{IsoSurface, MinMaxAABB, SurfaceVertex};

/// Build one surface per mesh with at least one triangle, ascending by iso
/// index.
#[tracing::instrument(skip_all, name = "output::build_surfaces")]
pub fn build_surfaces(meshes: &MeshMap, reverse_normals: bool) -> Vec<IsoSurface> {
  let meshes: Vec<(usize, &IsoMesh)> = meshes.iter().map(|(&i, mesh)| (i, mesh)).collect();

  meshes
    .into_par_iter()
    .filter_map(|(iso_index, mesh)| {
      if mesh.is_empty() {
        return None;
      }
      Some(build_surface(iso_index, mesh, reverse_normals))
    })
    .collect()
}

/// Flat-shaded soup for one mesh.
pub fn build_surface(iso_index: usize, mesh: &IsoMesh, reverse_normals: bool) -> IsoSurface {
  let mut vertices = Vec::with_capacity(mesh.triangle_count() * 3);
  let mut bounds = MinMaxAABB::empty();

  for triangle in mesh.triangles() {
    let [a, b, c] = triangle.0;
    let corners = if reverse_normals { [a, c, b] } else { [a, b, c] };
    let normal = face_normal(corners.map(|i| mesh.position(i)));

    for i in corners {
      let vertex = surface_vertex(&mesh.vertices()[i], normal);
      bounds.encapsulate(vertex.position);
      vertices.push(vertex);
    }
  }

  IsoSurface {
    iso_index,
    iso_value: mesh.iso_value(),
    vertices,
    bounds,
  }
}

/// Unit normal of a counter-clockwise triangle; up for degenerate ones.
pub fn face_normal([p0, p1, p2]: [[f64; 3]; 3]) -> [f32; 3] {
  let p0 = DVec3::from_array(p0);
  let e01 = DVec3::from_array(p1) - p0;
  let e02 = DVec3::from_array(p2) - p0;

  // Fallback to up
  let normal = e01.cross(e02).try_normalize().unwrap_or(DVec3::Y);
  normal.as_vec3().to_array()
}

fn surface_vertex(vertex: &IsoVertex, normal: [f32; 3]) -> SurfaceVertex {
  SurfaceVertex {
    position: vertex.position.map(|x| x as f32),
    normal,
    texture_coordinate: vertex.texture_coordinate.map(|t| t.map(|x| x as f32)),
    data: vertex.data.iter().map(|&x| x as f32).collect(),
  }
}

#[cfg(test)]
#[path = "output_test.rs"]
mod output_test;
