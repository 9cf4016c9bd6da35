//! Transition and state listeners.
//!
//! Listeners are registered closures. Hooks are functions the entity type
//! itself exposes through [`LifecycleHooks`]. Both fire in a fixed order:
//!
//! - transition phase: listeners for the transition, listeners for every
//!   transition, then hooks. A listener registered with `bubble = false`
//!   ends the phase right after it runs, hooks included.
//! - state entry: listeners for the state, then hooks. Always all of them.

mod hooks;
mod registry;

pub use hooks::{LifecycleHooks, StateHook, TransitionHook};
pub use registry::{
    ListenerRegistry, Phase, Scope, StateCallback, TransitionCallback, TransitionListener,
};

pub(crate) use hooks::ResolvedHooks;
