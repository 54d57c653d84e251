//! Topic generators grouped by area.
//!
//! Every public generator has the same shape:
//!
//! ```ignore
//! pub fn generate_<name>(ctx: &mut GenerationContext<'_>) -> Result<Exercise>
//! ```
//!
//! Generators read limits only through `ctx.limits` (already bound to the
//! normalized tier), draw randomness only from `ctx.session`, and hand the
//! correct answer first to `ctx.choice`.  The registry maps topic IDs to them.

/// T1 operaciones básicas, T8 potencias, T10 porcentajes
pub mod arithmetic;
/// T3 números primos, T5 múltiplos y divisores
pub mod number_theory;
/// T14 probabilidad simple
pub mod probability;
/// T56..T85, one template per declared kind
pub mod generic;
