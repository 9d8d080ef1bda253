#![forbid(unsafe_code)]

//! Scalar value model for civil-registry tables.
//!
//! Registry CSVs are loosely typed: the same `annee` column holds `"1951"`,
//! `"0"`, and free text depending on the row. Cells are therefore stored as
//! [`Scalar`]s and coerced per aggregation, with failed coercions dropping
//! the row rather than failing the operation.

pub mod repair;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    Null,
    Int64,
    Float64,
    Utf8,
}

/// One cell of a registry table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Scalar {
    Null,
    Int64(i64),
    Float64(f64),
    Utf8(String),
}

impl Scalar {
    #[must_use]
    pub fn dtype(&self) -> DType {
        match self {
            Self::Null => DType::Null,
            Self::Int64(_) => DType::Int64,
            Self::Float64(_) => DType::Float64,
            Self::Utf8(_) => DType::Utf8,
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Float64(v) => v.is_nan(),
            _ => false,
        }
    }

    pub fn to_f64(&self) -> Result<f64, TypeError> {
        match self {
            Self::Int64(v) => Ok(*v as f64),
            Self::Float64(v) => Ok(*v),
            Self::Null => Err(TypeError::ValueIsMissing),
            Self::Utf8(v) => Err(TypeError::NonNumericValue { value: v.clone() }),
        }
    }

    /// Best-effort coercion to a calendar year.
    ///
    /// Mirrors a tolerant numeric coercion: integers pass through, whole
    /// floats are narrowed, text is trimmed and parsed. Anything else is
    /// `None` — the caller drops the row, it never errors.
    #[must_use]
    pub fn to_year(&self) -> Option<i64> {
        match self {
            Self::Int64(v) => Some(*v),
            Self::Float64(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            Self::Utf8(v) => {
                let trimmed = v.trim();
                trimmed.parse::<i64>().ok().or_else(|| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                })
            }
            Self::Float64(_) | Self::Null => None,
        }
    }

    /// Textual grouping key for categorical aggregation; `None` for missing
    /// cells (they are excluded from category counts).
    #[must_use]
    pub fn group_label(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Float64(v) if v.is_nan() => None,
            Self::Int64(v) => Some(v.to_string()),
            Self::Float64(v) => Some(v.to_string()),
            Self::Utf8(v) => Some(v.clone()),
        }
    }

    /// Borrowed string content, `None` for anything non-textual.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Utf8(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Utf8(value)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("value {value:?} is not numeric")]
    NonNumericValue { value: String },
    #[error("value is missing")]
    ValueIsMissing,
}

#[cfg(test)]
mod tests {
    use super::{DType, Scalar};

    #[test]
    fn dtype_follows_the_variant() {
        assert_eq!(Scalar::Null.dtype(), DType::Null);
        assert_eq!(Scalar::Int64(1951).dtype(), DType::Int64);
        assert_eq!(Scalar::Float64(3.5).dtype(), DType::Float64);
        assert_eq!(Scalar::from("Jean").dtype(), DType::Utf8);
    }

    #[test]
    fn year_coercion_accepts_trimmed_numeric_text() {
        assert_eq!(Scalar::from(" 1951 ").to_year(), Some(1951));
        assert_eq!(Scalar::from("1951.0").to_year(), Some(1951));
        assert_eq!(Scalar::Int64(1891).to_year(), Some(1891));
    }

    #[test]
    fn year_coercion_rejects_free_text_and_missing() {
        assert_eq!(Scalar::from("environ 1900").to_year(), None);
        assert_eq!(Scalar::from("1951.5").to_year(), None);
        assert_eq!(Scalar::Null.to_year(), None);
    }

    #[test]
    fn year_coercion_rejects_fractional_and_non_finite_floats() {
        assert_eq!(Scalar::Float64(1951.5).to_year(), None);
        assert_eq!(Scalar::Float64(f64::NAN).to_year(), None);
        assert_eq!(Scalar::Float64(f64::INFINITY).to_year(), None);
        assert_eq!(Scalar::Float64(1951.0).to_year(), Some(1951));
    }

    #[test]
    fn group_label_skips_missing_cells() {
        assert_eq!(Scalar::Null.group_label(), None);
        assert_eq!(Scalar::Float64(f64::NAN).group_label(), None);
        assert_eq!(Scalar::Int64(3).group_label(), Some("3".to_owned()));
        assert_eq!(
            Scalar::from("Masculin").group_label(),
            Some("Masculin".to_owned())
        );
    }
}
