//! Solver-side pieces of the resin proof core: run configuration and the
//! restart-time subsumption engine.
//!
//! The search loop, propagation and the theory plugins live elsewhere; this
//! crate covers what they share with the proof machinery.

pub mod config;
pub mod subsume;

pub use config::{Options, Phase};
pub use subsume::Subsumption;
