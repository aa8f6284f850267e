//! Use cases
//!
//! - [`fan_out`]: concurrent invocation of several model backends
//! - [`evaluate_architecture`]: fan-out plus consensus into a technical evaluation
//! - [`gate_stage`]: score a stored stage and record the gate decision
//! - [`advance_stage`]: readiness check and context hand-off to the next stage

pub mod advance_stage;
pub mod evaluate_architecture;
pub mod fan_out;
pub mod gate_stage;

#[cfg(test)]
pub(crate) mod test_support;
