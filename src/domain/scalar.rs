//! Typed cell values and join keys.
//!
//! [`Scalar`] is the value of one CSV cell after type inference. Cells are
//! inferred one at a time: a recognised missing-value token becomes
//! [`Scalar::Null`], an integer literal becomes [`Scalar::Integer`], any other
//! finite number becomes [`Scalar::Float`], and everything else is kept
//! verbatim as [`Scalar::Text`].

use std::fmt;

use mongodb::bson::Bson;
use serde::Serialize;

/// Cell contents treated as missing values.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A single inferred cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Empty or missing cell.
    Null,
    /// Integer literal that fits in `i64`.
    Integer(i64),
    /// Finite floating-point literal.
    Float(f64),
    /// Any other cell, untouched.
    Text(String),
}

impl Scalar {
    /// Infers the value of a raw cell.
    #[must_use]
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if NA_TOKENS.contains(&trimmed) {
            return Self::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::Integer(i);
        }
        // `f64::from_str` also accepts "inf" and "infinity"; those stay text.
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => Self::Float(f),
            _ => Self::Text(raw.to_string()),
        }
    }

    /// Returns the join key for this value, or `None` for nulls.
    ///
    /// Integral floats share a key with the equal integer so that `7` and
    /// `7.0` join to each other.
    #[must_use]
    pub fn group_key(&self) -> Option<GroupKey> {
        match self {
            Self::Null => None,
            Self::Integer(i) => Some(GroupKey(i.to_string())),
            Self::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => {
                Some(GroupKey((*f as i64).to_string()))
            }
            Self::Float(f) => Some(GroupKey(f.to_string())),
            Self::Text(s) => Some(GroupKey(s.clone())),
        }
    }

    /// Converts the value into its BSON representation.
    #[must_use]
    pub fn to_bson(&self) -> Bson {
        match self {
            Self::Null => Bson::Null,
            Self::Integer(i) => Bson::Int64(*i),
            Self::Float(f) => Bson::Double(*f),
            Self::Text(s) => Bson::String(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Canonical text form of a join key cell.
///
/// Used as the `HashMap` key when grouping child rows under their parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey(String);
