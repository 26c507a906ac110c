//! External field evaluation contract and the per-run specification.
//!
//! The core never computes field values itself. It samples fields through
//! [`Field`], which the surrounding finite-element layer implements. Fields are
//! borrowed for the duration of one run and never owned.

use std::fmt;

use thiserror::Error;

use crate::error::IsoError;

/// Failure reported by an external field evaluator.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{0}")]
pub struct FieldError(pub String);

impl FieldError {
  pub fn new(message: impl Into<String>) -> Self {
    Self(message.into())
  }
}

/// A field that can be evaluated at any xi inside the cell.
///
/// Implementations must be deterministic: identical `(xi, time)` must give
/// identical values for the duration of a run.
pub trait Field {
  /// Number of values written by [`Field::evaluate`].
  fn component_count(&self) -> usize;

  /// Evaluate at `xi` and `time`, writing `component_count()` values.
  fn evaluate(&self, xi: [f64; 3], time: f64, values: &mut [f64]) -> Result<(), FieldError>;
}

/// Adapter turning a closure into a [`Field`].
///
/// ```ignore
/// let scalar = FnField::new(1, |xi, _time, out| {
///   out[0] = 1.0 - xi[0];
///   Ok(())
/// });
/// ```
pub struct FnField<F> {
  components: usize,
  function: F,
}

impl<F> FnField<F>
where
  F: Fn([f64; 3], f64, &mut [f64]) -> Result<(), FieldError>,
{
  pub fn new(components: usize, function: F) -> Self {
    Self {
      components,
      function,
    }
  }
}

impl<F> Field for FnField<F>
where
  F: Fn([f64; 3], f64, &mut [f64]) -> Result<(), FieldError>,
{
  fn component_count(&self) -> usize {
    self.components
  }

  fn evaluate(&self, xi: [f64; 3], time: f64, values: &mut [f64]) -> Result<(), FieldError> {
    (self.function)(xi, time, values)
  }
}

/// Which of the specification's fields an operation refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRole {
  Coordinate,
  Scalar,
  TextureCoordinate,
  Data,
}

impl fmt::Display for FieldRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      FieldRole::Coordinate => "coordinate",
      FieldRole::Scalar => "scalar",
      FieldRole::TextureCoordinate => "texture coordinate",
      FieldRole::Data => "data",
    };
    f.write_str(name)
  }
}

/// Requested iso-values: an explicit list or a linearly spaced range.
#[derive(Clone, Debug, PartialEq)]
pub enum IsoValues {
  List(Vec<f64>),
  /// `count` values from `first` to `last` inclusive. A count of one yields
  /// just `first`.
  Range { first: f64, last: f64, count: usize },
}

impl IsoValues {
  /// Number of iso-values requested.
  pub fn len(&self) -> usize {
    match self {
      IsoValues::List(values) => values.len(),
      IsoValues::Range { count, .. } => *count,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Expand into concrete values, rejecting empty or non-finite requests.
  pub fn resolve(&self) -> Result<Vec<f64>, IsoError> {
    let values: Vec<f64> = match self {
      IsoValues::List(values) => values.clone(),
      IsoValues::Range { first, last, count } => match *count {
        0 => Vec::new(),
        1 => vec![*first],
        n => (0..n)
          .map(|i| first + (last - first) * i as f64 / (n - 1) as f64)
          .collect(),
      },
    };

    if values.is_empty() {
      return Err(IsoError::NoIsoValues);
    }
    if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
      return Err(IsoError::NonFiniteIsoValue { index, value });
    }
    Ok(values)
  }
}

/// Immutable input bundle for one extraction run.
///
/// Borrows the caller's fields; the builder never takes ownership.
#[derive(Clone)]
pub struct IsoSpec<'f> {
  pub iso_values: IsoValues,
  pub coordinate: &'f dyn Field,
  pub scalar: &'f dyn Field,
  pub texture_coordinate: Option<&'f dyn Field>,
  pub data: Option<&'f dyn Field>,
}

impl<'f> IsoSpec<'f> {
  pub fn new(coordinate: &'f dyn Field, scalar: &'f dyn Field, iso_values: IsoValues) -> Self {
    Self {
      iso_values,
      coordinate,
      scalar,
      texture_coordinate: None,
      data: None,
    }
  }

  pub fn with_texture_coordinate(mut self, field: &'f dyn Field) -> Self {
    self.texture_coordinate = Some(field);
    self
  }

  pub fn with_data(mut self, field: &'f dyn Field) -> Self {
    self.data = Some(field);
    self
  }

  /// Check component counts of every configured field.
  pub fn validate(&self) -> Result<(), IsoError> {
    check_components(FieldRole::Coordinate, self.coordinate, "3", |n| n == 3)?;
    check_components(FieldRole::Scalar, self.scalar, "1", |n| n == 1)?;
    if let Some(field) = self.texture_coordinate {
      check_components(FieldRole::TextureCoordinate, field, "1 to 3", |n| {
        (1..=3).contains(&n)
      })?;
    }
    if let Some(field) = self.data {
      check_components(FieldRole::Data, field, "at least 1", |n| n > 0)?;
    }
    Ok(())
  }
}

impl fmt::Debug for IsoSpec<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("IsoSpec")
      .field("iso_values", &self.iso_values)
      .field("texture_coordinate", &self.texture_coordinate.is_some())
      .field("data", &self.data.is_some())
      .finish()
  }
}

fn check_components(
  role: FieldRole,
  field: &dyn Field,
  expected: &'static str,
  accept: impl Fn(usize) -> bool,
) -> Result<(), IsoError> {
  let actual = field.component_count();
  if accept(actual) {
    Ok(())
  } else {
    Err(IsoError::ComponentMismatch {
      role,
      expected,
      actual,
    })
  }
}

#[cfg(test)]
#[path = "field_test.rs"]
mod field_test;
