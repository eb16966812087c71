//! Capability interface for instrumenting long-lived, stateful components
//! without re-wrapping every call site.

use dc_common::Value;

/// Callback invoked with each output a hooked component produces. The
/// checker may mutate the output in place (verify-phase reconciliation).
pub type OutputHook = Box<dyn FnMut(&mut Value)>;

/// Components that can append a callback to be run on every future forward
/// invocation with its output. The checker depends on exactly this one
/// capability, not on any concrete component type.
pub trait HookRegistrable {
    fn register_output_hook(&mut self, hook: OutputHook);
}
