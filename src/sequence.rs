//! Input sequence parsing and shape validation.
//!
//! A request carries an untyped list of rows. Before any numeric work the
//! rows are checked against the fixed `(SEQUENCE_LENGTH, NUM_FEATURES)`
//! window the model was trained on and copied into a dense matrix.

use ndarray::Array2;
use std::fmt;

/// Number of time steps in one input window.
pub const SEQUENCE_LENGTH: usize = 7;

/// Number of features per time step (cash-in, cash-out and 4 engineered features).
pub const NUM_FEATURES: usize = 6;

/// Shape of a parsed input, as an array constructor would report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservedShape {
    /// Rows of equal length: `(rows, cols)`.
    Matrix { rows: usize, cols: usize },
    /// Empty outer list or rows of unequal length: `(rows,)`.
    Vector { rows: usize },
}

impl ObservedShape {
    /// Infer the shape of a list of rows.
    pub fn of(rows: &[Vec<f64>]) -> Self {
        let Some(first) = rows.first() else {
            return ObservedShape::Vector { rows: 0 };
        };

        let cols = first.len();
        if rows.iter().all(|row| row.len() == cols) {
            ObservedShape::Matrix {
                rows: rows.len(),
                cols,
            }
        } else {
            ObservedShape::Vector { rows: rows.len() }
        }
    }
}

impl fmt::Display for ObservedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservedShape::Matrix { rows, cols } => write!(f, "({}, {})", rows, cols),
            ObservedShape::Vector { rows } => write!(f, "({},)", rows),
        }
    }
}

/// Rejected input whose shape is not `(SEQUENCE_LENGTH, NUM_FEATURES)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeMismatch {
    pub actual: ObservedShape,
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expected input shape ({}, {}), got {}",
            SEQUENCE_LENGTH, NUM_FEATURES, self.actual
        )
    }
}

impl std::error::Error for ShapeMismatch {}

/// A validated `(SEQUENCE_LENGTH, NUM_FEATURES)` window of raw feature values.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    values: Array2<f64>,
}

impl Sequence {
    /// Validate the shape of `rows` and build a sequence from them.
    ///
    /// # Example
    /// ```
    /// use cashflow_forecast::Sequence;
    ///
    /// let rows = vec![vec![100.0, 50.0, 0.0, 0.0, 0.0, 0.0]; 7];
    /// let sequence = Sequence::parse(rows).unwrap();
    /// assert_eq!(sequence.values().dim(), (7, 6));
    ///
    /// let err = Sequence::parse(vec![vec![0.0; 6]; 6]).unwrap_err();
    /// assert_eq!(err.to_string(), "Expected input shape (7, 6), got (6, 6)");
    /// ```
    pub fn parse(rows: Vec<Vec<f64>>) -> Result<Self, ShapeMismatch> {
        match ObservedShape::of(&rows) {
            ObservedShape::Matrix {
                rows: SEQUENCE_LENGTH,
                cols: NUM_FEATURES,
            } => {}
            actual => return Err(ShapeMismatch { actual }),
        }

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let values = Array2::from_shape_vec((SEQUENCE_LENGTH, NUM_FEATURES), flat)
            .map_err(|_| ShapeMismatch {
                actual: ObservedShape::Vector {
                    rows: SEQUENCE_LENGTH,
                },
            })?;

        Ok(Self { values })
    }

    /// Raw feature values, one row per time step.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}
