//! Deploy Convergence Checker.
//!
//! Polls a platform management API until a deployment converges to a
//! healthy, ready state, fails outright, or exhausts its time budget.
//! The binary in `main.rs` is thin glue over these modules.

pub mod evaluate;
pub mod platform;
pub mod report;
pub mod scheduler;
