//! Untagged unions of the metadata scheme.
//!
//! Several metadata fields accept either a typed value or one of the
//! [`NaString`] markers. The unions below try the typed alternative
//! first and fall back to the marker.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use super::enums::NaString;

/// A boolean or `notAvailable`/`notApplicable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoolOrNa {
    Bool(bool),
    Na(NaString),
}

impl BoolOrNa {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::Na(_) => None,
        }
    }
}

impl Display for BoolOrNa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Na(na) => write!(f, "{na}"),
        }
    }
}

/// An integer or `notAvailable`/`notApplicable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntOrNa {
    Int(i64),
    Na(NaString),
}

impl IntOrNa {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Na(_) => None,
        }
    }
}

/// A number (integer or decimal) or `notAvailable`/`notApplicable`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrNa {
    Int(i64),
    Float(f64),
    Na(NaString),
}

impl NumberOrNa {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Na(_) => None,
        }
    }
}

/// A score or count that is given as a number in some corpora and as
/// free text (ranges, `notAvailable`, ...) in others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberOrText {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl Display for NumberOrText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}
