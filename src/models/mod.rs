//! # Models
//!
//! Thermodynamic model functions of simple repression and the Bayesian
//! posterior of the MWC mutant model built on top of them.

pub mod matrix_ops;
pub mod mwc;
pub mod thermo;
