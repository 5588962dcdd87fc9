//! Common, shared types.

pub mod state;
pub mod tunables;
pub mod waves;

#[cfg(test)]
pub mod test_utils;
