//! Error taxonomy for iso-surface extraction.
//!
//! Every failure surfaces as a single [`IsoError`] from the top-level entry
//! points. Errors fall into three kinds:
//!
//! ```text
//! InvalidInput       rejected before any sampling, nothing is produced
//! EvaluationFailure  an external field failed mid-sweep, all meshes dropped
//! UnknownCaseId      a case table produced a final case with no template
//! ```

use thiserror::Error;

use crate::field::{FieldError, FieldRole};
use crate::topology::CellKind;

/// Broad classification of an [`IsoError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
  /// Bad sample counts, cell shape, iso-values or field components.
  InvalidInput,
  /// An external field reported failure at some xi.
  EvaluationFailure,
  /// Internal invariant violation in the case tables.
  UnknownCaseId,
}

/// Errors produced while building iso-surfaces.
#[derive(Debug, Error)]
pub enum IsoError {
  #[error("sample count on xi axis {axis} must be positive")]
  InvalidSampleCount { axis: usize },

  #[error("only 3-D cells are supported, got a {0}-D cell")]
  UnsupportedDimension(usize),

  #[error("invalid cell shape: {0}")]
  InvalidShape(String),

  #[error("no iso-values requested")]
  NoIsoValues,

  #[error("iso-value {index} is not finite ({value})")]
  NonFiniteIsoValue { index: usize, value: f64 },

  #[error("{role} field has {actual} components, expected {expected}")]
  ComponentMismatch {
    role: FieldRole,
    expected: &'static str,
    actual: usize,
  },

  #[error("failed to evaluate {role} field at xi {xi:?}")]
  EvaluationFailure {
    role: FieldRole,
    xi: [f64; 3],
    #[source]
    source: FieldError,
  },

  #[error("{kind} case table produced unhandled final case {case}")]
  UnknownCaseId { kind: CellKind, case: u8 },
}

impl IsoError {
  /// Classify this error.
  pub fn kind(&self) -> ErrorKind {
    match self {
      IsoError::EvaluationFailure { .. } => ErrorKind::EvaluationFailure,
      IsoError::UnknownCaseId { .. } => ErrorKind::UnknownCaseId,
      _ => ErrorKind::InvalidInput,
    }
  }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;
