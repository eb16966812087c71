//! The output checker: session state machine, scoped naming, and the
//! capture/compare operation.
//!
//! # State machine
//!
//! ```text
//! Inactive ──▶ Collecting ──▶ Inactive
//! Inactive ──▶ Verifying  ──▶ Inactive
//! ```
//!
//! Sessions and scopes are RAII guards, so the phase reset and the scope
//! pop happen on every exit path, including unwinding out of the
//! instrumented body. Inside a running session nothing is fatal: protocol
//! misuse and structural drift are warn-level diagnostics with safe
//! defaults, because a crash in the diagnostic layer would be strictly
//! worse than a missed comparison.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{info, warn};

use dc_common::{Error, Result, Value};

use crate::config::CheckerConfig;
use crate::diff;
use crate::reconcile::reconcile;
use crate::report::{self, DiffRow};
use crate::seed::SeedHook;
use crate::store::OutputStore;

mod hook;

pub use hook::{HookRegistrable, OutputHook};

/// Checker phase. Exactly one is active at a time; always `Inactive`
/// outside a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Inactive,
    Collecting,
    Verifying,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::Inactive => "inactive",
            Phase::Collecting => "collect",
            Phase::Verifying => "verify",
        }
    }
}

struct Inner {
    phase: Phase,
    scopes: Vec<String>,
    store: OutputStore,
    config: CheckerConfig,
    seed_hook: Option<SeedHook>,
    name_width: usize,
    rows: Vec<DiffRow>,
}

impl Inner {
    fn qualified(&self, name: &str) -> String {
        if self.scopes.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.scopes.join("."), name)
        }
    }
}

/// Cheaply cloneable handle to one checker instance.
///
/// Clones share state: session guards, scope guards, and registered hooks
/// all talk to the same store and scope stack. The checker is
/// single-threaded by design; all suspension is ordinary nested call and
/// return.
#[derive(Clone)]
pub struct OutputChecker {
    inner: Rc<RefCell<Inner>>,
}

impl OutputChecker {
    pub fn new() -> Self {
        Self::with_config(CheckerConfig::default())
    }

    pub fn with_config(config: CheckerConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                phase: Phase::Inactive,
                scopes: Vec::new(),
                store: OutputStore::new(),
                config,
                seed_hook: None,
                name_width: 0,
                rows: Vec::new(),
            })),
        }
    }

    /// Install the determinism hook fired with the configured seed at the
    /// start of every session.
    pub fn set_seed_hook(&self, hook: SeedHook) {
        self.inner.borrow_mut().seed_hook = Some(hook);
    }

    pub fn phase(&self) -> Phase {
        self.inner.borrow().phase
    }

    /// Qualified names recorded so far, in sorted order. Read-only view;
    /// the store itself is private to the checker.
    pub fn recorded_names(&self) -> Vec<String> {
        let inner = self.inner.borrow();
        let mut names: Vec<String> = Vec::with_capacity(inner.store.len());
        for name in inner.store.names() {
            names.push(name.to_string());
        }
        names
    }

    /// Drift rows retained by the most recent verify session.
    pub fn last_report(&self) -> Vec<DiffRow> {
        self.inner.borrow().rows.clone()
    }

    /// Begin a collect session. Fails if a session is already active.
    ///
    /// The returned guard resets the phase on drop. If `persist` is given,
    /// the store is saved there by [`CollectGuard::finish`], or best-effort
    /// on drop when the guard is not finished explicitly.
    pub fn collect(&self, persist: Option<&Path>) -> Result<CollectGuard> {
        {
            let mut inner = self.inner.borrow_mut();
            ensure_inactive(&inner)?;
            info!("collecting outputs");
            inner.phase = Phase::Collecting;
        }
        self.fire_seed_hook();
        Ok(CollectGuard {
            checker: self.clone(),
            persist: persist.map(Path::to_path_buf),
        })
    }

    /// Begin a verify session. Fails if a session is already active, if the
    /// persisted store cannot be loaded, or if the store is empty.
    pub fn verify(&self, persist: Option<&Path>) -> Result<VerifyGuard> {
        {
            let mut inner = self.inner.borrow_mut();
            ensure_inactive(&inner)?;
            if let Some(path) = persist {
                inner.store = OutputStore::load(path)?;
            }
            if inner.store.is_empty() {
                return Err(Error::EmptyStore);
            }
            inner.name_width = inner.store.name_width();
            inner.rows.clear();
            info!("verifying outputs");
            inner.phase = Phase::Verifying;
        }
        self.fire_seed_hook();
        Ok(VerifyGuard {
            checker: self.clone(),
        })
    }

    /// Push a scope segment; the guard pops it on drop, unwinding included.
    pub fn scope(&self, name: &str) -> ScopeGuard {
        self.inner.borrow_mut().scopes.push(name.to_string());
        ScopeGuard {
            checker: self.clone(),
        }
    }

    /// Capture or compare one named output.
    ///
    /// The thunk runs inside `scope(name)`, so checks it performs itself
    /// nest under this name. Afterwards the output is recorded
    /// (collecting), diffed and reconciled against the recorded value
    /// (verifying), or passed through unchanged (inactive).
    pub fn check<F>(&self, name: &str, thunk: F) -> Value
    where
        F: FnOnce() -> Value,
    {
        self.check_with(name, thunk, false)
    }

    /// [`check`](Self::check) with an explicit disable switch: when
    /// `disable` is true the output passes through without recording or
    /// comparison.
    pub fn check_with<F>(&self, name: &str, thunk: F, disable: bool) -> Value
    where
        F: FnOnce() -> Value,
    {
        let mut out = {
            let _scope = self.scope(name);
            thunk()
        };
        if !disable {
            self.record_or_verify(name, &mut out);
        }
        out
    }

    /// Instrument a long-lived component: every output it produces from now
    /// on is routed through the checker under `name`, and reconciled in
    /// place during verification.
    pub fn observe<M: HookRegistrable>(&self, name: &str, module: &mut M) {
        let checker = self.clone();
        let name = name.to_string();
        module.register_output_hook(Box::new(move |out| {
            checker.record_or_verify(&name, out);
        }));
    }

    /// Clear phase, scope stack, store, and report. A fresh session after
    /// reset behaves like a brand-new checker instance.
    pub fn reset(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.phase = Phase::Inactive;
        inner.scopes.clear();
        inner.store.clear();
        inner.rows.clear();
        inner.name_width = 0;
    }

    fn record_or_verify(&self, name: &str, out: &mut Value) {
        let phase = self.inner.borrow().phase;
        match phase {
            Phase::Inactive => {}
            Phase::Collecting => {
                let mut inner = self.inner.borrow_mut();
                let qualified = inner.qualified(name);
                if !inner.store.insert(qualified.clone(), out.clone()) {
                    warn!(name = %qualified, "output has already been collected");
                }
            }
            Phase::Verifying => {
                let (qualified, recorded, width, sig) = {
                    let inner = self.inner.borrow();
                    let qualified = inner.qualified(name);
                    let recorded = inner.store.get(&qualified).cloned();
                    (
                        qualified,
                        recorded,
                        inner.name_width,
                        inner.config.significant_digits,
                    )
                };
                match recorded {
                    Some(recorded) => {
                        let stats = diff::diff(out, &recorded);
                        let row = DiffRow {
                            name: qualified,
                            stats,
                        };
                        report::print_row(&row, width, sig);
                        // substitute the recorded values so drift does not
                        // accumulate across iterative computations
                        reconcile(&recorded, out);
                        self.inner.borrow_mut().rows.push(row);
                    }
                    None => {
                        warn!(name = %qualified, "output has not been collected");
                    }
                }
            }
        }
    }

    // Temporarily takes the hook out so it can run without the checker
    // borrowed; the hook may call back into us.
    fn fire_seed_hook(&self) {
        let (mut hook, seed) = {
            let mut inner = self.inner.borrow_mut();
            let seed = inner.config.seed;
            (inner.seed_hook.take(), seed)
        };
        if let Some(h) = hook.as_mut() {
            h(seed);
        }
        if hook.is_some() {
            self.inner.borrow_mut().seed_hook = hook;
        }
    }
}

impl Default for OutputChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_inactive(inner: &Inner) -> Result<()> {
    if inner.phase != Phase::Inactive {
        return Err(Error::SessionActive {
            phase: inner.phase.name().to_string(),
        });
    }
    Ok(())
}

/// Guard for a collect session; resets the phase on drop.
#[must_use]
pub struct CollectGuard {
    checker: OutputChecker,
    persist: Option<PathBuf>,
}

impl CollectGuard {
    /// End the session, persisting the store if a path was given. Prefer
    /// this over dropping so persistence failures surface as errors.
    pub fn finish(mut self) -> Result<()> {
        if let Some(path) = self.persist.take() {
            let store = self.checker.inner.borrow().store.clone();
            store.save(&path)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for CollectGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectGuard")
            .field("persist", &self.persist)
            .finish_non_exhaustive()
    }
}

impl Drop for CollectGuard {
    fn drop(&mut self) {
        if let Some(path) = self.persist.take() {
            let store = self.checker.inner.borrow().store.clone();
            if let Err(error) = store.save(&path) {
                warn!(error = %error, path = %path.display(), "failed to save collected outputs");
            }
        }
        self.checker.inner.borrow_mut().phase = Phase::Inactive;
    }
}

/// Guard for a verify session; resets the phase on drop.
#[must_use]
pub struct VerifyGuard {
    checker: OutputChecker,
}

impl VerifyGuard {
    /// Drift rows produced so far in this session.
    pub fn rows(&self) -> Vec<DiffRow> {
        self.checker.inner.borrow().rows.clone()
    }
}

impl std::fmt::Debug for VerifyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyGuard").finish_non_exhaustive()
    }
}

impl Drop for VerifyGuard {
    fn drop(&mut self) {
        self.checker.inner.borrow_mut().phase = Phase::Inactive;
    }
}

/// Guard for one scope segment; pops it on drop.
#[must_use]
pub struct ScopeGuard {
    checker: OutputChecker,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if self.checker.inner.borrow_mut().scopes.pop().is_none() {
            warn!("scope stack underflow");
        }
    }
}
