//! Engine-agnostic building blocks: path evaluation, pooling, state machines.
//!
//! Nothing in here touches the ECS. Gameplay plugins own instances of these types
//! (as resources/components) and drive them once per frame.

pub mod pool;
pub mod spline;
pub mod state_machine;
