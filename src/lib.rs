//! League game and practice scheduling.
//!
//! Assigns every game and practice of a league to a weekly time slot so
//! that the hard constraints hold (slot kind and capacity, evening
//! divisions, incompatible events never overlapping, fixed assignments)
//! while a weighted penalty over soft constraints is minimized.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Division`, `Event`, `Slot`, `Instance`,
//!   `Schedule`, and the penalty evaluation
//! - **`parser`**: Sectioned text input format
//! - **`cp`**: `OrTree`, a randomized backtracking search that completes a
//!   schedule, optionally guided by a template
//! - **`ga`**: Fitness-ordered population and the evolutionary controller
//!   that alternates solver runs, crossover, mutation and eviction
//! - **`scheduler`**: Printable report and KPIs of a finished schedule
//! - **`validation`**: Hard-constraint checks and pre-flight instance checks
//!
//! # Example
//!
//! ```
//! use league_schedule::ga::{GaConfig, GaRunner};
//! use league_schedule::models::{Penalties, Weights};
//! use league_schedule::parser::parse_instance;
//!
//! let text = "\
//! Game slots:
//! MO, 8:00, 2, 1
//! TU, 9:30, 2, 0
//!
//! Games:
//! CMSA U13T3 DIV 01
//! CMSA U14T3 DIV 01
//! ";
//! let instance = parse_instance(text, Weights::new(1, 1, 1, 1), Penalties::new(5, 5, 1, 1)).unwrap();
//! let config = GaConfig::default().with_population(4, 8).with_eviction_batch(5).with_seed(1);
//! let result = GaRunner::run(&instance, &config).unwrap();
//! assert!(result.best.complete());
//! ```

pub mod cp;
pub mod ga;
pub mod models;
pub mod parser;
pub mod scheduler;
pub mod validation;
