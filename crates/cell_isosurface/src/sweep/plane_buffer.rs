//! Scalar samples of the two planes bounding the current layer.

/// Scalar samples for two consecutive planes, ping-ponged on `w & 1`.
///
/// Nodes outside a simplex lattice hold NaN.
pub struct PlaneBuffer {
  data: Vec<f64>,
  width: usize,
  plane_len: usize,
}

impl PlaneBuffer {
  /// Buffer for planes of `width × height` nodes.
  pub fn new(width: usize, height: usize) -> Self {
    let plane_len = width * height;
    Self {
      data: vec![f64::NAN; plane_len * 2],
      width,
      plane_len,
    }
  }

  #[inline]
  fn index(&self, u: u32, v: u32, w: u32) -> usize {
    (w & 1) as usize * self.plane_len + v as usize * self.width + u as usize
  }

  #[inline]
  pub fn get(&self, [u, v, w]: [u32; 3]) -> f64 {
    self.data[self.index(u, v, w)]
  }

  #[inline]
  pub fn set(&mut self, [u, v, w]: [u32; 3], scalar: f64) {
    let idx = self.index(u, v, w);
    self.data[idx] = scalar;
  }

  /// Reset the slot plane `w` is about to occupy.
  pub fn clear(&mut self, w: u32) {
    let start = (w & 1) as usize * self.plane_len;
    self.data[start..start + self.plane_len].fill(f64::NAN);
  }
}
