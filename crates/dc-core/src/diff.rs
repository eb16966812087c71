//! Recursive structural diff over value trees.
//!
//! Pure and total: shape, length, and variant mismatches are the condition
//! this tool exists to surface, so they produce a warn-level diagnostic and
//! [`DiffStats::ZERO`] rather than an error. The harness must never abort
//! the host computation it is instrumenting.

use serde::{Deserialize, Serialize};
use tracing::warn;

use dc_common::Value;

/// Three-number summary of absolute elementwise difference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffStats {
    pub mean: f64,
    pub max: f64,
    pub sum: f64,
}

impl DiffStats {
    pub const ZERO: DiffStats = DiffStats {
        mean: 0.0,
        max: 0.0,
        sum: 0.0,
    };

    pub fn is_zero(&self) -> bool {
        self.mean == 0.0 && self.max == 0.0 && self.sum == 0.0
    }

    /// Aggregate child results: mean of means, max of maxes, sum of sums.
    fn aggregate(children: &[DiffStats]) -> DiffStats {
        if children.is_empty() {
            return DiffStats::ZERO;
        }
        DiffStats {
            mean: children.iter().map(|s| s.mean).sum::<f64>() / children.len() as f64,
            max: children.iter().map(|s| s.max).fold(0.0, f64::max),
            sum: children.iter().map(|s| s.sum).sum(),
        }
    }

    fn from_abs_diffs(diffs: impl Iterator<Item = f64>) -> DiffStats {
        let mut count = 0usize;
        let mut max = 0.0f64;
        let mut sum = 0.0f64;
        for d in diffs {
            count += 1;
            max = max.max(d);
            sum += d;
        }
        if count == 0 {
            return DiffStats::ZERO;
        }
        DiffStats {
            mean: sum / count as f64,
            max,
            sum,
        }
    }
}

/// Compute the (mean, max, sum) of absolute elementwise difference between
/// two value trees.
pub fn diff(a: &Value, b: &Value) -> DiffStats {
    match (a, b) {
        (Value::Scalar(x), Value::Scalar(y)) => {
            let d = (x - y).abs();
            DiffStats {
                mean: d,
                max: d,
                sum: d,
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            if x.shape() != y.shape() {
                warn!(
                    left = ?x.shape(),
                    right = ?y.shape(),
                    "arrays have different shapes"
                );
                return DiffStats::ZERO;
            }
            DiffStats::from_abs_diffs(
                x.data()
                    .iter()
                    .zip(y.data().iter())
                    .map(|(u, v)| (u - v).abs()),
            )
        }
        (Value::Seq(xs), Value::Seq(ys)) => {
            if xs.len() != ys.len() {
                warn!(left = xs.len(), right = ys.len(), "sequences have different lengths");
                return DiffStats::ZERO;
            }
            let children: Vec<DiffStats> =
                xs.iter().zip(ys.iter()).map(|(x, y)| diff(x, y)).collect();
            DiffStats::aggregate(&children)
        }
        (Value::Map(xs), Value::Map(ys)) => {
            if !same_keys(xs, ys) {
                warn!(
                    left = ?xs.keys().collect::<Vec<_>>(),
                    right = ?ys.keys().collect::<Vec<_>>(),
                    "mappings have different key sets"
                );
                return DiffStats::ZERO;
            }
            let children: Vec<DiffStats> = xs
                .iter()
                .map(|(key, x)| diff(x, &ys[key]))
                .collect();
            DiffStats::aggregate(&children)
        }
        _ => {
            warn!(left = a.kind(), right = b.kind(), "values have different types");
            DiffStats::ZERO
        }
    }
}

fn same_keys(
    a: &std::collections::BTreeMap<String, Value>,
    b: &std::collections::BTreeMap<String, Value>,
) -> bool {
    a.len() == b.len() && a.keys().zip(b.keys()).all(|(x, y)| x == y)
}
