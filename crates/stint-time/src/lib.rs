//! stint Time - Clocks and the cumulative deadline budget
//!
//! This crate implements the timing side of an exchange:
//! - Clock sources (OS monotonic, manually advanced)
//! - DeadlineBudget: one total allowance drawn down by every stage

pub mod budget;
pub mod clock;

pub use budget::*;
pub use clock::*;
