//! The Value Tree: the recursive data shape the checker can diff and
//! reconcile.
//!
//! The variant is closed on purpose. The harness never constructs array
//! leaves itself; callers build them via the `From` conversions or
//! [`ArrayBuf::new`] and hand them in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A shaped, contiguous `f64` buffer.
///
/// Invariant: the product of `shape` equals `data.len()`. A rank-0 shape
/// (`[]`) denotes a single element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayBuf {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl ArrayBuf {
    /// Create a shaped buffer, validating that the shape matches the data.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(Error::ShapeMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Create a 1-D buffer from a flat vector.
    pub fn from_vec(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Overwrite this buffer's contents with `other`'s, keeping the
    /// existing allocation. Returns false (and leaves the buffer untouched)
    /// if the shapes differ.
    pub fn copy_from(&mut self, other: &ArrayBuf) -> bool {
        if self.shape != other.shape {
            return false;
        }
        self.data.copy_from_slice(&other.data);
        true
    }
}

/// A recursively defined output value.
///
/// `Seq` is order-significant; `Map` keys are unique and unordered
/// (`BTreeMap` gives deterministic serialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// An opaque numeric scalar.
    Scalar(f64),
    /// An array-like numeric buffer.
    Array(ArrayBuf),
    /// An ordered list of values.
    Seq(Vec<Value>),
    /// A string-keyed mapping of values.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Human-readable variant name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::Array(_) => "array",
            Value::Seq(_) => "seq",
            Value::Map(_) => "map",
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayBuf> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(v)
    }
}

impl From<ArrayBuf> for Value {
    fn from(a: ArrayBuf) -> Self {
        Value::Array(a)
    }
}

impl From<Vec<f64>> for Value {
    fn from(data: Vec<f64>) -> Self {
        Value::Array(ArrayBuf::from_vec(data))
    }
}

impl From<&[f64]> for Value {
    fn from(data: &[f64]) -> Self {
        Value::Array(ArrayBuf::from_vec(data.to_vec()))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}
