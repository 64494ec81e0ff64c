//! Population-based evolutionary search.
//!
//! Grows a ranked population of complete, valid schedules with the
//! OR-tree solver, then evolves it: the best schedule is perturbed by
//! crossover with the second best or by mutation, and the solver repairs
//! the perturbed template. Overflowing populations lose their worst
//! members in batches until the plateau rule stops the run.
//!
//! # Submodules
//!
//! - [`operators`]: Crossover/mutation template construction and selection
//!
//! # Reference
//! - Eiben & Smith (2015), "Introduction to Evolutionary Computing", Ch. 5 (Steady-State Models)
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

mod config;
pub mod operators;
mod population;
mod runner;

pub use config::GaConfig;
pub use operators::{GeneticOperators, Operator};
pub use population::Population;
pub use runner::{GaError, GaResult, GaRunner, PoolState};
