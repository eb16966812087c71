//! Driftcheck output checker.
//!
//! A two-phase instrumentation harness for reproducibility verification:
//! during a *collect* session the checker records the outputs of named
//! computation steps; during a later *verify* session it compares freshly
//! produced outputs against the recorded ones, reports numerical drift, and
//! substitutes the recorded values back so drift never compounds across
//! iterative computations.
//!
//! # Collecting
//!
//! ```ignore
//! use dc_core::OutputChecker;
//! use dc_common::Value;
//!
//! let checker = OutputChecker::new();
//! {
//!     let session = checker.collect(Some("run/outputs.json".as_ref()))?;
//!     let loss = checker.check("loss", || Value::Scalar(train_step()));
//!     session.finish()?;
//! }
//! ```
//!
//! # Verifying
//!
//! ```ignore
//! let checker = OutputChecker::new();
//! {
//!     let _session = checker.verify(Some("run/outputs.json".as_ref()))?;
//!     // prints one drift row per name; returns the recorded value
//!     let loss = checker.check("loss", || Value::Scalar(train_step()));
//! }
//! ```

pub mod checker;
pub mod config;
pub mod diff;
pub mod reconcile;
pub mod report;
pub mod seed;
pub mod store;

pub use checker::{
    CollectGuard, HookRegistrable, OutputChecker, OutputHook, Phase, ScopeGuard, VerifyGuard,
};
pub use config::CheckerConfig;
pub use diff::{diff, DiffStats};
pub use reconcile::reconcile;
pub use report::DiffRow;
pub use seed::{seeded_rng, SeedHook};
pub use store::{OutputStore, STORE_SCHEMA_VERSION};

/// Seed handed to the seed hook at the start of every session.
/// Constant across collect and verify so both phases observe comparable
/// pseudo-random state.
pub const DEFAULT_SEED: u64 = 0;
