//! Verify-phase reconciliation: substitute recorded leaf values into the
//! structure of a freshly computed value.
//!
//! In iterative computations, returning the live (possibly drifted) value
//! would compound floating-point divergence across repeated invocations, so
//! after diffing the checker anchors downstream state to the reference run.
//! Leaf buffer contents are overwritten in place; container and buffer
//! allocations of the live value are preserved. On a structural mismatch the
//! affected subtree of the live value is replaced with a clone of the
//! recorded one as best effort.

use tracing::warn;

use dc_common::Value;

/// Overwrite `live`'s leaves with `recorded`'s values, mirroring the diff
/// traversal.
pub fn reconcile(recorded: &Value, live: &mut Value) {
    let replacement = match (recorded, &mut *live) {
        (Value::Scalar(prev), Value::Scalar(cur)) => {
            *cur = *prev;
            None
        }
        (Value::Array(prev), Value::Array(cur)) => {
            if cur.copy_from(prev) {
                None
            } else {
                warn!(
                    left = ?prev.shape(),
                    right = ?cur.shape(),
                    "arrays have different shapes, keeping recorded value"
                );
                Some(Value::Array(prev.clone()))
            }
        }
        (Value::Seq(prev), Value::Seq(cur)) => {
            if prev.len() == cur.len() {
                for (p, c) in prev.iter().zip(cur.iter_mut()) {
                    reconcile(p, c);
                }
                None
            } else {
                warn!(
                    left = prev.len(),
                    right = cur.len(),
                    "sequences have different lengths, keeping recorded value"
                );
                Some(Value::Seq(prev.clone()))
            }
        }
        (Value::Map(prev), Value::Map(cur)) => {
            let keys_match =
                prev.len() == cur.len() && prev.keys().zip(cur.keys()).all(|(a, b)| a == b);
            if keys_match {
                for (key, c) in cur.iter_mut() {
                    reconcile(&prev[key], c);
                }
                None
            } else {
                warn!(
                    left = ?prev.keys().collect::<Vec<_>>(),
                    right = ?cur.keys().collect::<Vec<_>>(),
                    "mappings have different key sets, keeping recorded value"
                );
                Some(Value::Map(prev.clone()))
            }
        }
        (recorded, cur) => {
            warn!(
                left = recorded.kind(),
                right = cur.kind(),
                "values have different types, keeping recorded value"
            );
            Some(recorded.clone())
        }
    };

    if let Some(value) = replacement {
        *live = value;
    }
}
